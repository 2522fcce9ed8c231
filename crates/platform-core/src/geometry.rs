//! Normalized-to-screen coordinate translation.

use kickbot_tracking_model::{CaptureRegion, Detection, FrameSize, ScreenPoint};

/// Translate a normalized position into absolute screen pixels.
///
/// Detection `y` grows upward from the bottom of the capture while screen
/// rows grow downward, so the vertical axis is flipped. `size` is the size
/// actually captured this cycle, which may be cropped.
///
/// Positions outside `[0, 1]` map outside the region; the result saturates
/// at the `i32` range instead of overflowing.
pub fn to_screen_point(pos: &Detection, region: CaptureRegion, size: FrameSize) -> ScreenPoint {
    let w = size.width as f32;
    let h = size.height as f32;
    let x = (region.left as i64).saturating_add((pos.x * w) as i64);
    let y = (region.top as i64 + size.height as i64).saturating_sub((pos.y * h) as i64);
    ScreenPoint::new(saturate(x), saturate(y))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Clamp a screen point so it stays `padding` pixels inside the capture
/// region. If the padding leaves no room, the point collapses onto the
/// region centre along that axis.
pub fn clamp_inward(
    point: ScreenPoint,
    region: CaptureRegion,
    size: FrameSize,
    padding: u32,
) -> ScreenPoint {
    ScreenPoint::new(
        clamp_axis(point.x, region.left, size.width, padding),
        clamp_axis(point.y, region.top, size.height, padding),
    )
}

fn clamp_axis(value: i32, origin: i32, extent: u32, padding: u32) -> i32 {
    let origin = origin as i64;
    let extent = extent as i64;
    let padding = padding as i64;
    let lo = origin + padding;
    let hi = origin + extent - 1 - padding;
    if lo > hi {
        return (origin + extent / 2) as i32;
    }
    (value as i64).clamp(lo, hi) as i32
}
