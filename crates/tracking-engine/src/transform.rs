//! Frame resize and colour conversion into detector input.

use kickbot_common::error::{KickbotError, KickbotResult};
use kickbot_platform_core::frame::BGRA_CHANNELS;
use kickbot_platform_core::{Frame, ModelInput};
use kickbot_tracking_model::FrameSize;

/// Reusable buffers that turn a BGRA capture into detector input.
pub struct FrameTransform {
    /// BGRA image at detector resolution.
    resized: Vec<u8>,
    input: ModelInput,
}

impl FrameTransform {
    pub fn new(input_size: FrameSize) -> Self {
        Self {
            resized: vec![0; input_size.area() * BGRA_CHANNELS],
            input: ModelInput::new(input_size),
        }
    }

    /// Resample the visible part of `frame` to detector resolution.
    ///
    /// Rows are copied directly when the sizes match; otherwise each
    /// output pixel takes its nearest source pixel.
    pub fn resize(&mut self, frame: &Frame) -> KickbotResult<()> {
        let src = frame.size;
        if src.is_empty() {
            return Err(KickbotError::transform(format!(
                "captured frame has no visible area ({}x{})",
                src.width, src.height
            )));
        }
        if src.width > frame.buffer_size.width || src.height > frame.buffer_size.height {
            return Err(KickbotError::transform(format!(
                "visible size {}x{} exceeds buffer {}x{}",
                src.width, src.height, frame.buffer_size.width, frame.buffer_size.height
            )));
        }

        let dst = self.input.size;
        let dst_stride = dst.width as usize * BGRA_CHANNELS;

        if src == dst {
            for y in 0..dst.height as usize {
                let out = &mut self.resized[y * dst_stride..(y + 1) * dst_stride];
                out.copy_from_slice(frame.visible_row(y));
            }
            return Ok(());
        }

        let sx_scale = src.width as f32 / dst.width as f32;
        let sy_scale = src.height as f32 / dst.height as f32;
        for y in 0..dst.height as usize {
            let sy = (((y as f32 + 0.5) * sy_scale) as usize).min(src.height as usize - 1);
            let row = frame.visible_row(sy);
            let out = &mut self.resized[y * dst_stride..(y + 1) * dst_stride];
            for x in 0..dst.width as usize {
                let sx = (((x as f32 + 0.5) * sx_scale) as usize).min(src.width as usize - 1);
                let s = sx * BGRA_CHANNELS;
                let d = x * BGRA_CHANNELS;
                out[d..d + BGRA_CHANNELS].copy_from_slice(&row[s..s + BGRA_CHANNELS]);
            }
        }
        Ok(())
    }

    /// Convert the resized BGRA bytes into normalized RGB floats.
    pub fn convert(&mut self) -> &ModelInput {
        for (px, bgra) in self
            .input
            .data
            .iter_mut()
            .zip(self.resized.chunks_exact(BGRA_CHANNELS))
        {
            *px = [
                bgra[2] as f32 / 255.0,
                bgra[1] as f32 / 255.0,
                bgra[0] as f32 / 255.0,
            ];
        }
        &self.input
    }
}
