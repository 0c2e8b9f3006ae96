//! Functions for computing gradient magnitudes from pairs of directional
//! responses.

use crate::definitions::{clamp_channel, gray, intensity, PixelBuffer};
use crate::filter::{convolve, suppress_below};
use crate::kernel::{prewitt_x, prewitt_y, sobel_x, sobel_y, KernelDescriptor};

/// Scale applied to the Euclidean magnitude so that combined gradients stay in
/// a displayable range. Calibrated for 8-bit buffers.
pub const MAGNITUDE_DIVISOR: f64 = 4.0;

/// Used for specifying a pair of gradient kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKernel {
    /// Sobel operator, with smoothing across the derivative direction.
    Sobel,
    /// Prewitt operator, without extra smoothing.
    Prewitt,
}

impl GradientKernel {
    /// Kernel detecting horizontal gradients.
    pub fn horizontal_kernel(&self) -> KernelDescriptor {
        match self {
            GradientKernel::Sobel => sobel_x(),
            GradientKernel::Prewitt => prewitt_x(),
        }
    }

    /// Kernel detecting vertical gradients.
    pub fn vertical_kernel(&self) -> KernelDescriptor {
        match self {
            GradientKernel::Sobel => sobel_y(),
            GradientKernel::Prewitt => prewitt_y(),
        }
    }

    /// Normalized absolute response to the horizontal kernel.
    pub fn horizontal_gradient(&self, image: &PixelBuffer, threshold: f64) -> PixelBuffer {
        convolve(image, self.horizontal_kernel().matrix(), threshold)
    }

    /// Normalized absolute response to the vertical kernel.
    pub fn vertical_gradient(&self, image: &PixelBuffer, threshold: f64) -> PixelBuffer {
        convolve(image, self.vertical_kernel().matrix(), threshold)
    }

    /// Computes both directional responses with `threshold` and combines them
    /// with [`combine_magnitude`] using the same threshold.
    pub fn gradient_magnitude(&self, image: &PixelBuffer, threshold: f64) -> PixelBuffer {
        let horizontal = self.horizontal_gradient(image, threshold);
        let vertical = self.vertical_gradient(image, threshold);
        combine_magnitude(&horizontal, &vertical, threshold)
    }
}

/// A synonym for `method.gradient_magnitude(image, threshold)`.
pub fn gradient_magnitude(image: &PixelBuffer, method: GradientKernel, threshold: f64) -> PixelBuffer {
    method.gradient_magnitude(image, threshold)
}

/// Combines two directional responses into a gradient magnitude.
///
/// Each output pixel is `sqrt(a² + b²) / 4`, computed from the intensities of
/// `a` and `b`, set to zero when below `threshold` and clamped to 255. The
/// result never exceeds `sqrt(2) * 255 / 4`, about 90.
///
/// # Panics
///
/// If `a` and `b` have different dimensions.
pub fn combine_magnitude(a: &PixelBuffer, b: &PixelBuffer, threshold: f64) -> PixelBuffer {
    assert_eq!(
        a.dimensions(),
        b.dimensions(),
        "gradient buffers must have matching dimensions"
    );

    let (width, height) = a.dimensions();
    let mut out = PixelBuffer::new(width, height);

    for ((p, q), o) in a.pixels().zip(b.pixels()).zip(out.pixels_mut()) {
        let (ga, gb) = (intensity(p) as f64, intensity(q) as f64);
        let magnitude = (ga * ga + gb * gb).sqrt() / MAGNITUDE_DIVISOR;
        *o = gray(clamp_channel(suppress_below(magnitude, threshold)));
    }

    out
}
