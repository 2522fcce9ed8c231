//! Brightness-threshold detector.

use kickbot_common::error::{KickbotError, KickbotResult};
use kickbot_platform_core::{Detector, ModelInput};
use kickbot_tracking_model::{Detection, FrameSize};

/// Finds the centroid of bright pixels.
///
/// Confidence is the bright-pixel count relative to the count a fully
/// visible target would produce, capped at 1. A target partly out of view
/// therefore reports lower confidence.
#[derive(Debug, Clone)]
pub struct ColorCentroidDetector {
    shape: FrameSize,
    /// Mean RGB value a pixel must reach to count.
    threshold: f32,
    expected_pixels: f32,
}

impl ColorCentroidDetector {
    /// `coverage` is the fraction of the input a fully visible target fills.
    pub fn new(shape: FrameSize, threshold: f32, coverage: f32) -> Self {
        Self {
            shape,
            threshold,
            expected_pixels: (coverage * shape.area() as f32).max(1.0),
        }
    }
}

impl Detector for ColorCentroidDetector {
    fn name(&self) -> &str {
        "color-centroid"
    }

    fn input_shape(&self) -> FrameSize {
        self.shape
    }

    fn parse(&mut self, input: &ModelInput) -> KickbotResult<Detection> {
        if input.size != self.shape {
            return Err(KickbotError::inference(format!(
                "input is {}x{}, detector expects {}x{}",
                input.size.width, input.size.height, self.shape.width, self.shape.height
            )));
        }

        let width = self.shape.width as usize;
        let mut count = 0u64;
        let mut sum_x = 0f64;
        let mut sum_y = 0f64;
        for (i, [r, g, b]) in input.data.iter().enumerate() {
            if (r + g + b) / 3.0 >= self.threshold {
                count += 1;
                sum_x += (i % width) as f64 + 0.5;
                sum_y += (i / width) as f64 + 0.5;
            }
        }

        if count == 0 {
            return Ok(Detection::LOST);
        }

        let n = count as f64;
        let x = sum_x / n / self.shape.width as f64;
        // Rows count down from the top, detections count up from the bottom
        let y = 1.0 - sum_y / n / self.shape.height as f64;
        let confidence = (count as f32 / self.expected_pixels).min(1.0);
        Ok(Detection::new(x as f32, y as f32, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with_block(size: FrameSize, x0: usize, y0: usize, side: usize) -> ModelInput {
        let mut input = ModelInput::new(size);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                input.data[x + y * size.width as usize] = [1.0, 1.0, 1.0];
            }
        }
        input
    }

    #[test]
    fn test_centroid_with_flipped_y() {
        let size = FrameSize::new(10, 10);
        let mut detector = ColorCentroidDetector::new(size, 0.8, 0.04);
        // 2x2 block covering pixels 6..8 horizontally and 1..3 vertically
        let det = detector
            .parse(&input_with_block(size, 6, 1, 2))
            .unwrap();
        assert!((det.x - 0.7).abs() < 1e-6);
        assert!((det.y - 0.8).abs() < 1e-6);
        assert_eq!(det.confidence, 1.0);
    }

    #[test]
    fn test_partial_target_lowers_confidence() {
        let size = FrameSize::new(10, 10);
        let mut detector = ColorCentroidDetector::new(size, 0.8, 0.16);
        let det = detector
            .parse(&input_with_block(size, 0, 0, 2))
            .unwrap();
        assert!((det.confidence - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input_is_lost() {
        let size = FrameSize::new(4, 4);
        let mut detector = ColorCentroidDetector::new(size, 0.8, 0.1);
        let det = detector.parse(&ModelInput::new(size)).unwrap();
        assert_eq!(det, Detection::LOST);
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let mut detector = ColorCentroidDetector::new(FrameSize::new(4, 4), 0.8, 0.1);
        let err = detector
            .parse(&ModelInput::new(FrameSize::new(2, 2)))
            .unwrap_err();
        assert!(matches!(err, KickbotError::Inference { .. }));
    }
}
