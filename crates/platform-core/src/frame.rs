//! Captured frames and model input buffers.

use kickbot_tracking_model::FrameSize;

/// Bytes per BGRA pixel.
pub const BGRA_CHANNELS: usize = 4;

/// A BGRA capture buffer.
///
/// The allocation always covers `buffer_size` (the capture's maximum
/// size). When the capture is cropped near a screen edge, the visible
/// `size` is smaller and its rows are the *last* `size.height` rows of the
/// allocation: the missing rows are skipped from the top.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub buffer_size: FrameSize,
    pub size: FrameSize,
}

impl Frame {
    /// A zeroed, uncropped frame.
    pub fn new(buffer_size: FrameSize) -> Self {
        Self {
            pixels: vec![0; buffer_size.area() * BGRA_CHANNELS],
            buffer_size,
            size: buffer_size,
        }
    }

    /// Bytes per row of the allocation.
    pub fn stride(&self) -> usize {
        self.buffer_size.width as usize * BGRA_CHANNELS
    }

    /// Number of allocation rows above the first visible row.
    pub fn rows_skipped(&self) -> usize {
        self.buffer_size.height.saturating_sub(self.size.height) as usize
    }

    /// Visible row `y` (0 = top of the visible area).
    pub fn visible_row(&self, y: usize) -> &[u8] {
        let start = (self.rows_skipped() + y) * self.stride();
        &self.pixels[start..start + self.size.width as usize * BGRA_CHANNELS]
    }

    /// Mutable visible row `y`.
    pub fn visible_row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = (self.rows_skipped() + y) * self.stride();
        let len = self.size.width as usize * BGRA_CHANNELS;
        &mut self.pixels[start..start + len]
    }
}

/// Normalized RGB input for a detector, row-major from the top row.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub data: Vec<[f32; 3]>,
    pub size: FrameSize,
}

impl ModelInput {
    pub fn new(size: FrameSize) -> Self {
        Self {
            data: vec![[0.0; 3]; size.area()],
            size,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.data[x + y * self.size.width as usize]
    }
}
