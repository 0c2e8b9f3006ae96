//! Direct 2D convolution of the luminance of an image with a kernel.

use crate::definitions::{clamp_channel, gray, luminance_plane, PixelBuffer};
use crate::kernel::KernelMatrix;

/// Kernels whose weights sum to within this distance of 0 (or 1) are
/// classified as high-pass (or low-pass).
pub const CLASS_TOLERANCE: f64 = 0.001;

/// Lower bound on the squared L2 norm used to normalize high-pass output.
pub const MIN_ENERGY: f64 = 1e-9;

/// How the raw response of a kernel is normalized, decided once per kernel
/// from the sum of its weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelClass {
    /// Weights sum to approximately 0 (derivative and edge kernels). The
    /// output is the absolute response divided by the kernel's L2 norm.
    HighPass,
    /// Weights sum to approximately 1 (identity and smoothing kernels). The
    /// output is the raw response.
    LowPass,
    /// Any other sum. Treated like [`KernelClass::LowPass`].
    Other,
}

impl KernelClass {
    /// Classifies `kernel` by the sum of its weights.
    pub fn of(kernel: &KernelMatrix) -> KernelClass {
        let sum = kernel.sum();
        if sum.abs() < CLASS_TOLERANCE {
            KernelClass::HighPass
        } else if (sum - 1.0).abs() < CLASS_TOLERANCE {
            KernelClass::LowPass
        } else {
            KernelClass::Other
        }
    }
}

/// Convolves the luminance of `image` with `kernel` and returns an opaque
/// gray buffer of the same dimensions.
///
/// Taps that fall outside the image contribute nothing, i.e. the image is
/// zero padded rather than extended at its borders. The raw response is
/// normalized according to [`KernelClass`], clamped to `[0, 255]`, and
/// set to zero if it is below `threshold`.
///
/// # Examples
/// ```
/// # extern crate image;
/// # #[macro_use]
/// # extern crate edgelab;
/// # fn main() {
/// use edgelab::filter::convolve;
/// use edgelab::kernel::KernelMatrix;
///
/// let image = gray_rgba!(
///     0, 0, 90;
///     0, 0, 90;
///     0, 0, 90);
///
/// let expected = gray_rgba!(
///     0,  78, 0;
///     0, 104, 0;
///     0,  78, 0);
///
/// let filtered = convolve(&image, &KernelMatrix::sobel_horizontal_3x3(), 0.0);
/// assert_pixels_eq!(filtered, expected);
/// # }
/// ```
pub fn convolve(image: &PixelBuffer, kernel: &KernelMatrix, threshold: f64) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let mut out = PixelBuffer::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let luma = luminance_plane(image);
    let class = KernelClass::of(kernel);
    let norm = kernel.energy().max(MIN_ENERGY).sqrt();
    let taps: Vec<(i64, i64, f64)> = kernel.taps().collect();
    tracing::trace!(?class, norm, taps = taps.len(), "convolve");

    let (w, h) = (width as i64, height as i64);
    for (x, y, p) in out.enumerate_pixels_mut() {
        let (x, y) = (x as i64, y as i64);
        let mut acc = 0f64;
        for &(dx, dy, weight) in &taps {
            let (px, py) = (x + dx, y + dy);
            if px < 0 || px >= w || py < 0 || py >= h {
                continue;
            }
            acc += luma[(py * w + px) as usize] * weight;
        }

        let value = match class {
            KernelClass::HighPass => f64::min(255.0, acc.abs() / norm),
            KernelClass::LowPass | KernelClass::Other => acc.clamp(0.0, 255.0),
        };
        *p = gray(clamp_channel(suppress_below(value, threshold)));
    }

    out
}

/// Returns zero if `value` is below `threshold`, and `value` otherwise.
#[inline]
pub(crate) fn suppress_below(value: f64, threshold: f64) -> f64 {
    if value < threshold {
        0.0
    } else {
        value
    }
}


#[cfg(not(miri))]
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::proptest_utils::{arbitrary_buffer, arbitrary_kernel, arbitrary_zero_sum_kernel};
    use crate::utils::{count_nonzero, uniform_buffer};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn proptest_convolve_output_is_opaque_gray(
            img in arbitrary_buffer(0..12, 0..12),
            kernel in arbitrary_kernel(3, 5.0),
            threshold in 0.0..255.0f64,
        ) {
            let out = convolve(&img, &kernel, threshold);
            prop_assert_eq!(out.dimensions(), img.dimensions());
            for p in out.pixels() {
                prop_assert_eq!(p[3], 255);
                prop_assert!(p[0] == p[1] && p[1] == p[2]);
            }
        }

        #[test]
        fn proptest_convolve_threshold_is_monotone(
            img in arbitrary_buffer(1..12, 1..12),
            kernel in arbitrary_kernel(2, 3.0),
            t1 in 0.0..255.0f64,
            t2 in 0.0..255.0f64,
        ) {
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            let weak = count_nonzero(&convolve(&img, &kernel, lo));
            let strong = count_nonzero(&convolve(&img, &kernel, hi));
            prop_assert!(strong <= weak);
        }

        #[test]
        fn proptest_zero_sum_kernel_ignores_uniform_regions(
            kernel in arbitrary_zero_sum_kernel(2, 4.0),
            rgb in any::<[u8; 3]>(),
        ) {
            let image = uniform_buffer(11, 11, rgb);
            let out = convolve(&image, &kernel, 0.0);
            let (rx, ry) = kernel.center();
            for y in ry..(11 - ry) {
                for x in rx..(11 - rx) {
                    prop_assert_eq!(out.get_pixel(x, y)[0], 0);
                }
            }
        }
    }
}
