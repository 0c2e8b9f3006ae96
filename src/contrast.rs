//! Functions for manipulating the contrast of processed buffers.

use crate::definitions::{clamp_channel, gray, intensity, PixelBuffer};
use crate::filter::suppress_below;

/// Linearly rescales intensities so that the darkest pixel maps to 0 and the
/// brightest to 255.
///
/// A constant buffer has a range of zero; the range is floored at 1, so such a
/// buffer maps to all zeros. Applying this to its own output is a no-op.
///
/// # Examples
/// ```
/// # extern crate image;
/// # #[macro_use]
/// # extern crate edgelab;
/// # fn main() {
/// use edgelab::contrast::auto_contrast;
///
/// let image = gray_rgba!(10, 20, 30);
/// assert_pixels_eq!(auto_contrast(&image), gray_rgba!(0, 128, 255));
/// # }
/// ```
pub fn auto_contrast(image: &PixelBuffer) -> PixelBuffer {
    let (min, max) = image.pixels().fold((255u8, 0u8), |(lo, hi), p| {
        let v = intensity(p);
        (lo.min(v), hi.max(v))
    });
    let min = min as f64;
    let range = f64::max(1.0, max as f64 - min);

    let (width, height) = image.dimensions();
    let mut out = PixelBuffer::new(width, height);
    for (p, o) in image.pixels().zip(out.pixels_mut()) {
        let scaled = (intensity(p) as f64 - min) * 255.0 / range;
        *o = gray(clamp_channel(scaled));
    }
    out
}

/// Sets every pixel with intensity below `threshold` to zero and keeps the
/// others unchanged. The output is always opaque gray.
pub fn threshold_below(image: &PixelBuffer, threshold: f64) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let mut out = PixelBuffer::new(width, height);
    for (p, o) in image.pixels().zip(out.pixels_mut()) {
        let v = suppress_below(intensity(p) as f64, threshold);
        *o = gray(clamp_channel(v));
    }
    out
}
