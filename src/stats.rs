//! Summary statistics of processed buffers.
//!
//! All functions read the intensity (red channel) of each pixel, have no side
//! effects, and return zero for empty input.

use crate::definitions::{intensity, PixelBuffer};

/// Horizontal distance between consecutive samples of a [`line_profile`].
pub const PROFILE_STRIDE: u32 = 2;

/// Returns the histogram of intensities in a buffer.
pub fn histogram(image: &PixelBuffer) -> [u32; 256] {
    let mut hist = [0u32; 256];

    for p in image.pixels() {
        hist[intensity(p) as usize] += 1;
    }

    hist
}

/// Returns the cumulative histogram of intensities in a buffer.
pub fn cumulative_histogram(image: &PixelBuffer) -> [u32; 256] {
    let mut hist = histogram(image);

    for i in 1..hist.len() {
        hist[i] += hist[i - 1];
    }

    hist
}

/// Returns the `p`th percentile of the intensities in a buffer.
///
/// With the intensities sorted ascending, this is the value at index
/// `floor(p / 100 * (n - 1))`. `p` is clamped to `[0, 100]`; an empty buffer
/// yields 0.
///
/// # Examples
/// ```
/// # extern crate image;
/// # #[macro_use]
/// # extern crate edgelab;
/// # fn main() {
/// use edgelab::stats::percentile;
///
/// let image = gray_rgba!(
///     1, 2, 3, 4, 5;
///     6, 7, 8, 9, 10);
///
/// assert_eq!(percentile(&image, 0.0), 1);
/// // floor(0.9 * 9) = 8, the ninth smallest value.
/// assert_eq!(percentile(&image, 90.0), 9);
/// assert_eq!(percentile(&image, 100.0), 10);
/// # }
/// ```
pub fn percentile(image: &PixelBuffer, p: f64) -> u8 {
    let n = image.width() as u64 * image.height() as u64;
    if n == 0 {
        return 0;
    }

    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let index = ((p / 100.0) * (n - 1) as f64).floor() as u64;

    let cum_hist = cumulative_histogram(image);
    cum_hist
        .iter()
        .position(|&c| c as u64 > index)
        .map_or(255, |i| i as u8)
}

/// Mean of the squared intensities, a focus measure for gradient buffers.
pub fn tenengrad(image: &PixelBuffer) -> f64 {
    let n = image.pixels().len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = image
        .pixels()
        .map(|p| {
            let v = intensity(p) as f64;
            v * v
        })
        .sum();
    sum / n as f64
}

/// Fraction of pixels with intensity strictly above `threshold`.
pub fn edge_density(image: &PixelBuffer, threshold: f64) -> f64 {
    fraction(image, |v| v > threshold)
}

/// Fraction of pixels with nonzero intensity.
pub fn nonzero_fraction(image: &PixelBuffer) -> f64 {
    fraction(image, |v| v > 0.0)
}

fn fraction(image: &PixelBuffer, pred: impl Fn(f64) -> bool) -> f64 {
    let n = image.pixels().len();
    if n == 0 {
        return 0.0;
    }
    let hits = image.pixels().filter(|p| pred(intensity(p) as f64)).count();
    hits as f64 / n as f64
}

/// Running sums for the mean and variance of a group of intensities.
#[derive(Debug, Default, Clone, Copy)]
struct Moments {
    sum: f64,
    sum_sq: f64,
    count: u64,
}

impl Moments {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.sum_sq += v * v;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    fn variance(&self) -> f64 {
        let mean = self.mean();
        f64::max(0.0, self.sum_sq / self.count as f64 - mean * mean)
    }
}

/// Contrast-to-noise ratio between edge pixels (intensity above `threshold`)
/// and background pixels (the rest).
///
/// Computed as `|mean_e - mean_b| / sqrt(var_e + var_b)`. Returns 0 if either
/// group is empty or both groups are constant.
pub fn contrast_to_noise_ratio(image: &PixelBuffer, threshold: f64) -> f64 {
    let mut edges = Moments::default();
    let mut background = Moments::default();
    for p in image.pixels() {
        let v = intensity(p) as f64;
        if v > threshold {
            edges.push(v);
        } else {
            background.push(v);
        }
    }

    if edges.count == 0 || background.count == 0 {
        return 0.0;
    }
    let denom = (edges.variance() + background.variance()).sqrt();
    if denom > 0.0 {
        (edges.mean() - background.mean()).abs() / denom
    } else {
        0.0
    }
}

/// Mean over standard deviation of the background pixels, i.e. those with
/// intensity at most `threshold`. Returns 0 if there are none or they are
/// constant.
pub fn background_snr(image: &PixelBuffer, threshold: f64) -> f64 {
    let mut background = Moments::default();
    for p in image.pixels() {
        let v = intensity(p) as f64;
        if v <= threshold {
            background.push(v);
        }
    }

    if background.count == 0 {
        return 0.0;
    }
    let sigma = background.variance().sqrt();
    if sigma > 0.0 {
        background.mean() / sigma
    } else {
        0.0
    }
}

/// One sample of a [`line_profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSample {
    /// Column of the sample.
    pub x: u32,
    /// Intensity at that column.
    pub intensity: u8,
}

/// Samples row `row` of `image` every [`PROFILE_STRIDE`] columns, starting at
/// column 0. Rows outside the image give an empty profile.
pub fn line_profile(image: &PixelBuffer, row: u32) -> Vec<ProfileSample> {
    if row >= image.height() {
        return Vec::new();
    }
    (0..image.width())
        .step_by(PROFILE_STRIDE as usize)
        .map(|x| ProfileSample {
            x,
            intensity: intensity(image.get_pixel(x, row)),
        })
        .collect()
}

/// Peak sharpness measures of a [`line_profile`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    /// Highest intensity in the profile.
    pub peak: u8,
    /// Full width at half maximum around the first highest sample, in
    /// columns.
    pub fwhm: u32,
    /// Peak over the mean of the lowest quarter of samples (at least one).
    /// Zero when that mean is zero.
    pub peak_to_background: f64,
}

/// Computes [`LineMetrics`] for a profile.
///
/// The half maximum width is found by walking outwards from the first peak
/// sample while samples stay strictly above half the peak.
pub fn line_metrics(profile: &[ProfileSample]) -> LineMetrics {
    if profile.is_empty() {
        return LineMetrics::default();
    }

    let mut peak = 0u8;
    let mut peak_idx = 0;
    for (i, s) in profile.iter().enumerate() {
        if s.intensity > peak {
            peak = s.intensity;
            peak_idx = i;
        }
    }

    let half = peak as f64 / 2.0;
    let above_half = |i: usize| profile[i].intensity as f64 > half;
    let mut left = peak_idx;
    while left > 0 && above_half(left) {
        left -= 1;
    }
    let mut right = peak_idx;
    while right < profile.len() - 1 && above_half(right) {
        right += 1;
    }
    let fwhm = profile[right].x.saturating_sub(profile[left].x);

    let mut sorted: Vec<u8> = profile.iter().map(|s| s.intensity).collect();
    sorted.sort_unstable();
    let q = usize::max(1, sorted.len() / 4);
    let background = sorted[..q].iter().map(|&v| v as f64).sum::<f64>() / q as f64;
    let peak_to_background = if background > 0.0 {
        peak as f64 / background
    } else {
        0.0
    };

    LineMetrics {
        peak,
        fwhm,
        peak_to_background,
    }
}
