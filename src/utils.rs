//! Utils for testing and debugging.

use crate::definitions::PixelBuffer;
use image::Rgba;
use itertools::Itertools;
use std::cmp;

/// Helper for defining opaque gray RGBA buffers.
///
/// Rows are separated by `;` and every value is used for the red, green and
/// blue channels with alpha 255.
///
/// # Examples
/// ```
/// # extern crate image;
/// # #[macro_use]
/// # extern crate edgelab;
/// # fn main() {
/// let image = gray_rgba!(
///     1, 2, 3;
///     4, 5, 6);
///
/// assert_eq!(image.dimensions(), (3, 2));
/// assert_eq!(image.get_pixel(2, 1).0, [6, 6, 6, 255]);
/// # }
/// ```
#[macro_export]
macro_rules! gray_rgba {
    () => {
        $crate::definitions::PixelBuffer::new(0, 0)
    };
    ($( $( $x: expr ),*);*) => {{
        let nested_array = [ $( [ $($x as u8),* ] ),* ];
        let height = nested_array.len() as u32;
        let width = nested_array[0].len() as u32;
        let flat: Vec<u8> = nested_array
            .iter()
            .flatten()
            .flat_map(|&g| [g, g, g, 255u8])
            .collect();
        $crate::definitions::PixelBuffer::from_raw(width, height, flat)
            .expect("rows must all have the same length")
    }};
}

/// Panics if any pixels differ between the two input buffers.
#[macro_export]
macro_rules! assert_pixels_eq {
    ($actual:expr, $expected:expr) => {{
        if let Some(err) = $crate::utils::pixel_diff_summary(&$actual, &$expected) {
            panic!("{}", err)
        }
    }};
}

/// Describes how two buffers differ, or returns `None` if they are equal.
/// At most five differing pixels are listed.
pub fn pixel_diff_summary(actual: &PixelBuffer, expected: &PixelBuffer) -> Option<String> {
    if actual.dimensions() != expected.dimensions() {
        return Some(format!(
            "dimensions do not match. actual: {:?}, expected: {:?}",
            actual.dimensions(),
            expected.dimensions()
        ));
    }

    let diffs = actual
        .enumerate_pixels()
        .zip(expected.pixels())
        .filter(|((_, _, p), q)| p != q)
        .take(5)
        .map(|((x, y, p), q)| format!("\n({}, {}): actual: {:?}, expected {:?}", x, y, p.0, q.0))
        .join("");

    if diffs.is_empty() {
        None
    } else {
        Some(format!("pixels do not match. {}", diffs))
    }
}

/// Buffer to use in benchmarks and smoke tests. This is neither noise nor
/// similar to natural images - it's just a convenience method to produce a
/// buffer that's not constant.
pub fn rgba_bench_image(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let r = (x % 7 + y % 6) as u8;
        let g = 255u8 - r;
        let b = cmp::min(r, g);
        Rgba([r, g, b, 255])
    })
}

/// Builds an opaque buffer of the given size filled with one color.
pub fn uniform_buffer(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
    PixelBuffer::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Counts the pixels with a nonzero intensity.
pub fn count_nonzero(image: &PixelBuffer) -> usize {
    image.pixels().filter(|p| p[0] > 0).count()
}
