//! The render pipeline: noise injection, optional pre-smoothing, the selected
//! filter, and the spectrum of the kernel being shown.

use crate::definitions::PixelBuffer;
use crate::edges::laplacian_of_gaussian;
use crate::error::FilterError;
use crate::filter::convolve;
use crate::gradients::{gradient_magnitude, GradientKernel};
use crate::kernel::{
    gaussian_kernel, laplacian, prewitt_x, prewitt_y, sobel_x, sobel_y, FilterKind,
    KernelDescriptor,
};
use crate::noise::{apply_noise, NoiseKind};
use crate::spectrum::{kernel_spectrum, SpectrumGrid, DEFAULT_SPECTRUM_SIZE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Parameters of a single [`render`] call. Every field has a default, so a
/// partial configuration deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Filter applied to the (noisy, optionally smoothed) source.
    pub filter: FilterKind,
    /// Noise injected into the source before filtering.
    pub noise: NoiseKind,
    /// Standard deviation of the LoG kernel. Ignored by other filters.
    pub sigma: f64,
    /// Responses below this value are set to zero. For LoG, zero selects a
    /// percentile threshold instead.
    pub threshold: f64,
    /// Standard deviation of a Gaussian applied before the filter, if any.
    /// Not applied for LoG, which smooths on its own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_smoothing_sigma: Option<f64>,
    /// Seed for the noise generator. A fresh seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_seed: Option<u64>,
    /// Side length of the kernel spectrum grid.
    pub spectrum_size: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            filter: FilterKind::None,
            noise: NoiseKind::None,
            sigma: 1.4,
            threshold: 0.0,
            pre_smoothing_sigma: None,
            noise_seed: None,
            spectrum_size: DEFAULT_SPECTRUM_SIZE,
        }
    }
}

impl RenderParams {
    /// Checks the parameters that [`render`] would otherwise panic on or
    /// silently misuse.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.filter == FilterKind::LoG && !is_valid_sigma(self.sigma) {
            return Err(FilterError::InvalidSigma {
                name: "sigma",
                value: self.sigma,
            });
        }
        if let Some(s) = self.pre_smoothing_sigma {
            if !is_valid_sigma(s) {
                return Err(FilterError::InvalidSigma {
                    name: "pre_smoothing_sigma",
                    value: s,
                });
            }
        }
        if !(0.0..=255.0).contains(&self.threshold) {
            return Err(FilterError::InvalidThreshold(self.threshold));
        }
        if self.spectrum_size == 0 {
            return Err(FilterError::InvalidSpectrumSize);
        }
        Ok(())
    }
}

fn is_valid_sigma(sigma: f64) -> bool {
    sigma > 0.0 && sigma.is_finite()
}

/// Buffers and analyses produced by [`render`].
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The source after noise injection.
    pub original: PixelBuffer,
    /// The filtered buffer.
    pub processed: PixelBuffer,
    /// The kernel shown for this configuration, see [`active_kernel`].
    pub kernel: Option<KernelDescriptor>,
    /// Magnitude spectrum of `kernel`.
    pub spectrum: Option<SpectrumGrid>,
}

/// The kernel that represents a configuration: the LoG kernel for
/// [`FilterKind::LoG`], the pre-smoothing Gaussian when no filter is selected,
/// the horizontal kernel of magnitude filters, and the filter's only kernel
/// otherwise.
///
/// # Panics
///
/// For [`FilterKind::LoG`] if `params.sigma` is not strictly positive and
/// finite. [`RenderParams::validate`] rejects such parameters.
pub fn active_kernel(params: &RenderParams) -> Option<KernelDescriptor> {
    match (params.filter, params.pre_smoothing_sigma) {
        (FilterKind::None, Some(s)) => Some(gaussian_kernel(s)),
        (kind, _) => kind.kernels(params.sigma).primary().cloned(),
    }
}

/// Runs the full pipeline on `source`.
///
/// 1. Noise of kind `params.noise` is added, giving `original`.
/// 2. If `params.pre_smoothing_sigma` is set and the filter is not LoG,
///    `original` is convolved with a Gaussian.
/// 3. The selected filter is applied with `params.threshold`.
/// 4. The active kernel and its spectrum are computed.
///
/// `source` is never modified.
pub fn render(source: &PixelBuffer, params: &RenderParams) -> Result<RenderOutput, FilterError> {
    params.validate()?;

    let seed = params
        .noise_seed
        .unwrap_or_else(|| rand::thread_rng().gen());
    let original = apply_noise(source, params.noise, seed);
    tracing::debug!(noise = ?params.noise, seed, "noise applied");

    let t = params.threshold;
    let processed = {
        let input = match params.pre_smoothing_sigma {
            Some(s) if params.filter != FilterKind::LoG => {
                tracing::debug!(sigma = s, "pre-smoothing");
                Cow::Owned(convolve(&original, gaussian_kernel(s).matrix(), 0.0))
            }
            _ => Cow::Borrowed(&original),
        };

        match params.filter {
            FilterKind::None => input.into_owned(),
            FilterKind::SobelX => convolve(&input, sobel_x().matrix(), t),
            FilterKind::SobelY => convolve(&input, sobel_y().matrix(), t),
            FilterKind::SobelMagnitude => gradient_magnitude(&input, GradientKernel::Sobel, t),
            FilterKind::PrewittX => convolve(&input, prewitt_x().matrix(), t),
            FilterKind::PrewittY => convolve(&input, prewitt_y().matrix(), t),
            FilterKind::PrewittMagnitude => {
                gradient_magnitude(&input, GradientKernel::Prewitt, t)
            }
            FilterKind::Laplacian => convolve(&input, laplacian().matrix(), t),
            FilterKind::LoG => laplacian_of_gaussian(&input, params.sigma, t),
        }
    };
    tracing::debug!(filter = %params.filter, threshold = t, "filter applied");

    let kernel = active_kernel(params);
    let spectrum = kernel
        .as_ref()
        .map(|k| kernel_spectrum(k.matrix(), params.spectrum_size));

    Ok(RenderOutput {
        original,
        processed,
        kernel,
        spectrum,
    })
}
