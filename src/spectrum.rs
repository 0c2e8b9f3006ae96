//! Frequency response of convolution kernels, evaluated with a direct 2D
//! discrete Fourier transform.

use crate::definitions::clamp_channel;
use crate::kernel::KernelMatrix;
use image::{GrayImage, Luma};
use num::Complex;
use std::f64::consts::PI;

/// Default side length of a [`SpectrumGrid`].
pub const DEFAULT_SPECTRUM_SIZE: u32 = 128;

/// Normalized magnitude response of a kernel on a square grid of
/// frequencies. Frequency zero sits at the center of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumGrid {
    size: u32,
    data: Vec<f64>,
}

impl SpectrumGrid {
    /// Number of frequencies along each axis.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Magnitude at frequency index `(u, v)`, in `[0, 1]`.
    ///
    /// # Panics
    ///
    /// If `u` or `v` is not less than [`SpectrumGrid::size`].
    pub fn get(&self, u: u32, v: u32) -> f64 {
        assert!(
            u < self.size && v < self.size,
            "({}, {}) is outside a spectrum of size {}",
            u,
            v,
            self.size
        );
        self.data[(u * self.size + v) as usize]
    }

    /// All magnitudes, indexed by `u * size + v`.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Largest magnitude in the grid: 1 unless the grid is all zeros.
    pub fn max(&self) -> f64 {
        self.data.iter().cloned().fold(0.0, f64::max)
    }

    /// Renders the grid as an 8-bit image with `u` along the x axis.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.size, self.size, |x, y| {
            Luma([clamp_channel(self.get(x, y) * 255.0)])
        })
    }
}

/// Computes the magnitude response of `kernel` on a `size` x `size` grid.
///
/// For frequency index `(u, v)` the response is the sum over nonzero taps of
/// `w * exp(i * angle)` with
/// `angle = -((u - c) * k * dx + (v - c) * k * dy)`, where `k = 2π / size`,
/// `c = size / 2`, and `(dx, dy)` is the tap offset from the kernel center.
/// Magnitudes are divided by their maximum; a kernel with no response gives
/// an all-zero grid.
///
/// # Panics
///
/// If `size` is zero.
pub fn kernel_spectrum(kernel: &KernelMatrix, size: u32) -> SpectrumGrid {
    assert!(size > 0, "spectrum size must be positive");

    let taps: Vec<(f64, f64, f64)> = kernel
        .taps()
        .filter(|&(_, _, w)| w != 0.0)
        .map(|(dx, dy, w)| (dx as f64, dy as f64, w))
        .collect();
    let k = 2.0 * PI / size as f64;
    let c = size as f64 / 2.0;

    let mut data = Vec::with_capacity((size as usize) * (size as usize));
    for u in 0..size {
        let fu = (u as f64 - c) * k;
        for v in 0..size {
            let fv = (v as f64 - c) * k;
            let response: Complex<f64> = taps
                .iter()
                .map(|&(dx, dy, w)| Complex::from_polar(w, -(fu * dx + fv * dy)))
                .sum();
            data.push(response.norm());
        }
    }

    let max = data.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        data.iter_mut().for_each(|m| *m /= max);
    }
    tracing::trace!(size, taps = taps.len(), max, "kernel spectrum");

    SpectrumGrid { size, data }
}
