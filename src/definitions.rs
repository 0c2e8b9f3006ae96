//! Type aliases and small helpers shared by every filtering stage.

use image::{Rgba, RgbaImage};

/// An 8-bit RGBA buffer. Sources may carry colour; every filtered
/// buffer produced by this crate is gray with an opaque alpha channel.
pub type PixelBuffer = RgbaImage;

/// Luminance weights applied to the red, green and blue channels.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Returns the luminance of a pixel. Alpha is ignored.
#[inline]
pub fn luminance(p: &Rgba<u8>) -> f64 {
    LUMA_WEIGHTS[0] * p[0] as f64 + LUMA_WEIGHTS[1] * p[1] as f64 + LUMA_WEIGHTS[2] * p[2] as f64
}

/// Returns the luminance of every pixel of `image` in row-major order.
pub fn luminance_plane(image: &PixelBuffer) -> Vec<f64> {
    image.pixels().map(luminance).collect()
}

/// Clamps `x` to `[0, 255]` and rounds to the nearest integer, ties to even.
///
/// This matches the storage rule of clamped 8-bit arrays, so intermediate
/// buffers round identically no matter which stage wrote them.
/// NaN maps to 0.
#[inline]
pub fn clamp_channel(x: f64) -> u8 {
    if x.is_nan() {
        return 0;
    }
    x.clamp(0.0, 255.0).round_ties_even() as u8
}

/// An opaque gray pixel with the given intensity.
#[inline]
pub fn gray(value: u8) -> Rgba<u8> {
    Rgba([value, value, value, 255])
}

/// Intensity of a processed pixel. Processed buffers are gray, so the
/// red channel carries the value.
#[inline]
pub fn intensity(p: &Rgba<u8>) -> u8 {
    p[0]
}
