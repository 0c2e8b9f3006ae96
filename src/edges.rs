//! Functions for detecting edges in images.

use crate::contrast::{auto_contrast, threshold_below};
use crate::definitions::PixelBuffer;
use crate::filter::convolve;
use crate::kernel::log_kernel;
use crate::stats::percentile;

/// Percentile of the rescaled response used as the threshold when the caller
/// passes a threshold of zero.
pub const LOG_FALLBACK_PERCENTILE: f64 = 90.0;

/// Detects edges with a Laplacian of Gaussian of standard deviation `sigma`.
///
/// The image is convolved with [`log_kernel`] without a threshold, the response
/// is stretched to the full range with [`auto_contrast`], and pixels below the
/// effective threshold are zeroed. The effective threshold is `threshold` when
/// it is positive, and otherwise the 90th percentile of the stretched response.
///
/// Values of `threshold` are compared against the stretched response, so they
/// select a fraction of the full `[0, 255]` range regardless of `sigma`.
///
/// # Panics
///
/// If `sigma` is not strictly positive and finite.
pub fn laplacian_of_gaussian(image: &PixelBuffer, sigma: f64, threshold: f64) -> PixelBuffer {
    let kernel = log_kernel(sigma);
    let response = convolve(image, kernel.matrix(), 0.0);
    let stretched = auto_contrast(&response);

    let effective = if threshold > 0.0 {
        threshold
    } else {
        percentile(&stretched, LOG_FALLBACK_PERCENTILE) as f64
    };
    tracing::debug!(sigma, threshold, effective, "laplacian of gaussian");

    threshold_below(&stretched, effective)
}
