//! Kernels used by the convolution engine, and the catalog that maps each
//! [`FilterKind`] to the kernels it applies.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A 2D kernel of real-valued weights with odd width and height, stored in
/// row-major order.
///
/// Fixed 3x3 operators and generated NxN kernels share this type so the
/// convolution and spectral code have a single code path.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMatrix {
    data: Vec<f64>,
    width: u32,
    height: u32,
}

impl KernelMatrix {
    /// Construct a kernel from row-major data and its dimensions.
    ///
    /// # Panics
    ///
    /// If either dimension is zero or even, or if `data.len() != width * height`.
    pub fn new(data: Vec<f64>, width: u32, height: u32) -> KernelMatrix {
        assert!(width > 0 && height > 0, "width and height must be non-zero");
        assert!(
            width % 2 == 1 && height % 2 == 1,
            "kernel dimensions must be odd, found {}x{}",
            width,
            height
        );
        assert!(
            (width * height) as usize == data.len(),
            "Invalid kernel len: expecting {}, found {}",
            width * height,
            data.len()
        );
        KernelMatrix {
            data,
            width,
            height,
        }
    }

    /// Construct a kernel from nested rows.
    pub fn from_rows<const W: usize, const H: usize>(rows: [[f64; W]; H]) -> KernelMatrix {
        let data = rows.iter().flatten().copied().collect();
        KernelMatrix::new(data, W as u32, H as u32)
    }

    /// The 1x1 kernel with weight 1. Convolving with it returns the luminance
    /// of its input.
    pub fn identity() -> KernelMatrix {
        KernelMatrix::new(vec![1.0], 1, 1)
    }

    /// Returns the sobel horizontal 3x3 kernel.
    pub fn sobel_horizontal_3x3() -> Self {
        Self::from_rows([[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]])
    }

    /// Returns the sobel vertical 3x3 kernel.
    pub fn sobel_vertical_3x3() -> Self {
        Self::from_rows([[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]])
    }

    /// Returns the prewitt horizontal 3x3 kernel.
    pub fn prewitt_horizontal_3x3() -> Self {
        Self::from_rows([[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]])
    }

    /// Returns the prewitt vertical 3x3 kernel.
    pub fn prewitt_vertical_3x3() -> Self {
        Self::from_rows([[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])
    }

    /// Returns the laplacian 3x3 kernel.
    pub fn laplacian_3x3() -> Self {
        Self::from_rows([[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]])
    }

    /// The width of the kernel
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the kernel
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Column and row of the center tap.
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    /// Access an element of the kernel
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.data[(y * self.width + x) as usize]
    }

    /// The weights in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Iterates over the rows of the kernel.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.width as usize)
    }

    /// Enumerate all elements of the kernel as `(x, y, weight)`.
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        (0..self.height)
            .cartesian_product(0..self.width)
            .zip(self.data.iter())
            .map(|((y, x), w)| (x, y, *w))
    }

    /// Enumerate all elements as `(dx, dy, weight)`, where `dx` and `dy` are
    /// offsets from the center tap.
    pub fn taps(&self) -> impl Iterator<Item = (i64, i64, f64)> + '_ {
        let (cx, cy) = self.center();
        self.enumerate()
            .map(move |(x, y, w)| (x as i64 - cx as i64, y as i64 - cy as i64, w))
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Sum of the strictly positive weights.
    pub fn positive_sum(&self) -> f64 {
        self.data.iter().filter(|w| **w > 0.0).sum()
    }

    /// Sum of squared weights.
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|w| w * w).sum()
    }

    /// Largest absolute weight.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, w| f64::max(acc, w.abs()))
    }

    /// Returns the transposed kernel.
    pub fn transpose(&self) -> KernelMatrix {
        let data = (0..self.width)
            .cartesian_product(0..self.height)
            .map(|(x, y)| self.get(x, y))
            .collect();
        KernelMatrix::new(data, self.height, self.width)
    }

    /// Maps every weight through `f`.
    pub fn map(self, f: impl Fn(f64) -> f64) -> KernelMatrix {
        KernelMatrix {
            data: self.data.into_iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

/// A kernel together with the name and description shown to users.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDescriptor {
    name: String,
    matrix: KernelMatrix,
    description: String,
}

impl KernelDescriptor {
    /// Bundles a kernel with its display metadata.
    pub fn new(
        name: impl Into<String>,
        matrix: KernelMatrix,
        description: impl Into<String>,
    ) -> KernelDescriptor {
        KernelDescriptor {
            name: name.into(),
            matrix,
            description: description.into(),
        }
    }

    /// Display name, e.g. `Sobel X` or `LoG (σ=1.4)`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kernel weights.
    pub fn matrix(&self) -> &KernelMatrix {
        &self.matrix
    }

    /// Human readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Sobel kernel for detecting horizontal gradients (vertical edges).
pub fn sobel_x() -> KernelDescriptor {
    KernelDescriptor::new(
        "Sobel X",
        KernelMatrix::sobel_horizontal_3x3(),
        "Detects vertical edges with vertical smoothing.",
    )
}

/// Sobel kernel for detecting vertical gradients (horizontal edges).
pub fn sobel_y() -> KernelDescriptor {
    KernelDescriptor::new(
        "Sobel Y",
        KernelMatrix::sobel_vertical_3x3(),
        "Detects horizontal edges with horizontal smoothing.",
    )
}

/// Prewitt kernel for detecting horizontal gradients (vertical edges).
pub fn prewitt_x() -> KernelDescriptor {
    KernelDescriptor::new(
        "Prewitt X",
        KernelMatrix::prewitt_horizontal_3x3(),
        "Detects vertical edges without extra smoothing.",
    )
}

/// Prewitt kernel for detecting vertical gradients (horizontal edges).
pub fn prewitt_y() -> KernelDescriptor {
    KernelDescriptor::new(
        "Prewitt Y",
        KernelMatrix::prewitt_vertical_3x3(),
        "Detects horizontal edges without extra smoothing.",
    )
}

/// Second derivative operator.
pub fn laplacian() -> KernelDescriptor {
    KernelDescriptor::new(
        "Laplacian",
        KernelMatrix::laplacian_3x3(),
        "Second derivative filter. Sensitive to noise.",
    )
}

/// Side length of the square Gaussian and LoG kernels for `sigma`:
/// `max(3, 2 * ceil(3 * sigma) + 1)`. Always odd.
pub fn kernel_size(sigma: f64) -> u32 {
    let radius = (3.0 * sigma).ceil().max(0.0) as u32;
    let size = radius.saturating_mul(2).saturating_add(1).max(3);
    if size % 2 == 0 {
        size - 1
    } else {
        size
    }
}

/// Builds a normalized Gaussian smoothing kernel of standard deviation `sigma`.
///
/// The weights sum to one. A `sigma` that is not strictly positive and finite
/// yields the 1x1 identity kernel.
pub fn gaussian_kernel(sigma: f64) -> KernelDescriptor {
    let name = format!("Gaussian (σ={:.1})", sigma);
    let description = format!(
        "Low-pass smoothing filter. Sigma={:.1} controls the strength.",
        sigma
    );

    if !(sigma > 0.0 && sigma.is_finite()) {
        return KernelDescriptor::new(name, KernelMatrix::identity(), description);
    }

    let size = kernel_size(sigma);
    let center = (size / 2) as i64;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let raw: Vec<f64> = (0..size as i64)
        .cartesian_product(0..size as i64)
        .map(|(y, x)| {
            let (dx, dy) = (x - center, y - center);
            (-((dx * dx + dy * dy) as f64) / two_sigma_sq).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();

    let matrix = KernelMatrix::new(raw, size, size).map(|w| w / sum);
    KernelDescriptor::new(name, matrix, description)
}

/// Laplacian of Gaussian weights for `sigma`, shifted to zero mean and scaled by
/// `1 / (2 * sigma)`, before any rounding.
///
/// # Panics
///
/// If `sigma` is not strictly positive and finite.
pub fn log_weights(sigma: f64) -> KernelMatrix {
    assert!(
        sigma > 0.0 && sigma.is_finite(),
        "sigma must be > 0.0, found {}",
        sigma
    );

    let size = kernel_size(sigma);
    let center = (size / 2) as i64;
    let sigma2 = sigma * sigma;
    let sigma4 = sigma2 * sigma2;

    let raw: Vec<f64> = (0..size as i64)
        .cartesian_product(0..size as i64)
        .map(|(y, x)| {
            let (dx, dy) = (x - center, y - center);
            let r2 = (dx * dx + dy * dy) as f64;
            let gauss = (-r2 / (2.0 * sigma2)).exp();
            let poly = 1.0 - r2 / (2.0 * sigma2);
            -(1.0 / (PI * sigma4)) * poly * gauss
        })
        .collect();

    let mean = raw.iter().sum::<f64>() / raw.len() as f64;
    // Wider smoothing gives a weaker raw edge response.
    let scale = 1.0 / (2.0 * sigma);

    KernelMatrix::new(raw, size, size).map(|w| (w - mean) * scale)
}

/// Builds the Laplacian of Gaussian kernel for `sigma`, rounded to three
/// decimals.
///
/// Rounding means the weights only approximately sum to zero; the
/// description records the sum reached before rounding.
///
/// # Panics
///
/// If `sigma` is not strictly positive and finite.
pub fn log_kernel(sigma: f64) -> KernelDescriptor {
    let weights = log_weights(sigma);
    let size = weights.width();
    let achieved_sum = weights.sum();

    // Half-up rounding at three decimals.
    let matrix = weights.map(|w| (w * 1000.0 + 0.5).floor() / 1000.0);

    KernelDescriptor::new(
        format!("LoG (σ={:.1})", sigma),
        matrix,
        format!(
            "Laplacian of Gaussian. Sigma={:.1}. Kernel {}x{}. Sum ≈ {:.3}",
            sigma, size, size, achieved_sum
        ),
    )
}

/// The filters offered by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// No filtering; the source is passed through.
    #[default]
    None,
    /// Horizontal Sobel gradient.
    SobelX,
    /// Vertical Sobel gradient.
    SobelY,
    /// Combined Sobel gradient magnitude.
    SobelMagnitude,
    /// Horizontal Prewitt gradient.
    PrewittX,
    /// Vertical Prewitt gradient.
    PrewittY,
    /// Combined Prewitt gradient magnitude.
    PrewittMagnitude,
    /// 3x3 Laplacian.
    Laplacian,
    /// Laplacian of Gaussian with auto-contrast and thresholding.
    #[serde(rename = "log")]
    LoG,
}

impl FilterKind {
    /// Every filter kind, in display order.
    pub const ALL: [FilterKind; 9] = [
        FilterKind::None,
        FilterKind::SobelX,
        FilterKind::SobelY,
        FilterKind::SobelMagnitude,
        FilterKind::PrewittX,
        FilterKind::PrewittY,
        FilterKind::PrewittMagnitude,
        FilterKind::Laplacian,
        FilterKind::LoG,
    ];

    /// Name shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterKind::None => "Original",
            FilterKind::SobelX => "Sobel X",
            FilterKind::SobelY => "Sobel Y",
            FilterKind::SobelMagnitude => "Sobel Magnitude",
            FilterKind::PrewittX => "Prewitt X",
            FilterKind::PrewittY => "Prewitt Y",
            FilterKind::PrewittMagnitude => "Prewitt Magnitude",
            FilterKind::Laplacian => "Laplacian",
            FilterKind::LoG => "LoG (Laplacian of Gaussian)",
        }
    }

    /// The kernels this filter applies. `sigma` is only used by
    /// [`FilterKind::LoG`].
    ///
    /// # Panics
    ///
    /// For [`FilterKind::LoG`] if `sigma` is not strictly positive and finite.
    pub fn kernels(&self, sigma: f64) -> FilterKernels {
        match self {
            FilterKind::None => FilterKernels::None,
            FilterKind::SobelX => FilterKernels::Single(sobel_x()),
            FilterKind::SobelY => FilterKernels::Single(sobel_y()),
            FilterKind::SobelMagnitude => FilterKernels::Pair(sobel_x(), sobel_y()),
            FilterKind::PrewittX => FilterKernels::Single(prewitt_x()),
            FilterKind::PrewittY => FilterKernels::Single(prewitt_y()),
            FilterKind::PrewittMagnitude => FilterKernels::Pair(prewitt_x(), prewitt_y()),
            FilterKind::Laplacian => FilterKernels::Single(laplacian()),
            FilterKind::LoG => FilterKernels::Single(log_kernel(sigma)),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Kernels selected for a [`FilterKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKernels {
    /// The filter does not convolve.
    None,
    /// A single kernel.
    Single(KernelDescriptor),
    /// Horizontal and vertical kernels whose responses are combined.
    Pair(KernelDescriptor, KernelDescriptor),
}

impl FilterKernels {
    /// The kernel shown to visualization: the only kernel, or the horizontal
    /// one of a pair.
    pub fn primary(&self) -> Option<&KernelDescriptor> {
        match self {
            FilterKernels::None => None,
            FilterKernels::Single(k) | FilterKernels::Pair(k, _) => Some(k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sobel_kernels_are_transposes() {
        assert_eq!(
            KernelMatrix::sobel_horizontal_3x3().transpose(),
            KernelMatrix::sobel_vertical_3x3()
        );
        assert_eq!(
            KernelMatrix::sobel_vertical_3x3().transpose(),
            KernelMatrix::sobel_horizontal_3x3()
        );
    }

    #[test]
    fn test_prewitt_kernels_are_transposes() {
        assert_eq!(
            KernelMatrix::prewitt_horizontal_3x3().transpose(),
            KernelMatrix::prewitt_vertical_3x3()
        );
    }

    #[test]
    fn test_fixed_kernel_properties() {
        let sobel = KernelMatrix::sobel_horizontal_3x3();
        assert_eq!(sobel.sum(), 0.0);
        assert_eq!(sobel.positive_sum(), 4.0);
        assert_eq!(sobel.energy(), 12.0);
        assert_eq!(sobel.center(), (1, 1));

        let laplacian = KernelMatrix::laplacian_3x3();
        assert_eq!(laplacian.sum(), 0.0);
        assert_eq!(laplacian.energy(), 20.0);
        assert_eq!(laplacian.get(1, 1), -4.0);
    }

    #[test]
    fn test_taps_are_centered() {
        let k = KernelMatrix::prewitt_horizontal_3x3();
        let taps: Vec<_> = k.taps().collect();
        assert_eq!(taps.len(), 9);
        assert_eq!(taps[0], (-1, -1, -1.0));
        assert_eq!(taps[4], (0, 0, 0.0));
        assert_eq!(taps[8], (1, 1, 1.0));
    }

    #[test]
    fn test_transpose_of_rectangular_kernel() {
        let k = KernelMatrix::new(vec![1.0, 2.0, 3.0], 3, 1);
        let t = k.transpose();
        assert_eq!((t.width(), t.height()), (1, 3));
        assert_eq!(t.data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic]
    fn test_kernel_must_be_nonempty() {
        let _ = KernelMatrix::new(vec![], 0, 0);
    }

    #[test]
    #[should_panic]
    fn test_kernel_sides_must_be_odd() {
        let _ = KernelMatrix::new(vec![1.0, 2.0], 2, 1);
    }

    #[test]
    #[should_panic]
    fn test_kernel_len_must_match_dimensions() {
        let _ = KernelMatrix::new(vec![1.0, 2.0], 3, 1);
    }

    #[test]
    fn test_kernel_size() {
        assert_eq!(kernel_size(0.1), 3);
        assert_eq!(kernel_size(0.5), 5);
        assert_eq!(kernel_size(1.0), 7);
        assert_eq!(kernel_size(1.4), 11);
        assert_eq!(kernel_size(2.0), 13);
    }

    #[test]
    fn test_gaussian_kernel_sums_to_one() {
        for sigma in [0.3, 0.5, 1.0, 1.4, 2.0, 3.7] {
            let k = gaussian_kernel(sigma);
            assert_abs_diff_eq!(k.matrix().sum(), 1.0, epsilon = 1e-6);
            assert_eq!(k.matrix().width(), kernel_size(sigma));
        }
    }

    #[test]
    fn test_gaussian_kernel_peaks_at_center() {
        let k = gaussian_kernel(1.0);
        let (cx, cy) = k.matrix().center();
        assert_eq!(k.matrix().get(cx, cy), k.matrix().max_abs());
    }

    #[test]
    fn test_gaussian_kernel_degenerates_to_identity() {
        assert_eq!(*gaussian_kernel(0.0).matrix(), KernelMatrix::identity());
        assert_eq!(*gaussian_kernel(-1.0).matrix(), KernelMatrix::identity());
        assert_eq!(*gaussian_kernel(f64::NAN).matrix(), KernelMatrix::identity());
    }

    #[test]
    fn test_log_weights_sum_to_zero() {
        for sigma in [0.5, 1.0, 1.4, 2.0, 3.0] {
            let w = log_weights(sigma);
            let area = (w.width() * w.height()) as f64;
            assert_abs_diff_eq!(w.sum() / area, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log_kernel_size_grows_and_peak_shrinks_with_sigma() {
        let sigmas = [1.0, 1.4, 2.0, 3.0, 5.0];
        for pair in sigmas.windows(2) {
            let (a, b) = (log_weights(pair[0]), log_weights(pair[1]));
            assert!(b.width() > a.width());
            assert!(b.max_abs() < a.max_abs());
        }
    }

    #[test]
    fn test_log_kernel_for_sigma_1_4() {
        let k = log_kernel(1.4);
        let m = k.matrix();
        assert_eq!((m.width(), m.height()), (11, 11));

        let (cx, cy) = m.center();
        let center = m.get(cx, cy);
        for (x, y, w) in m.enumerate() {
            if (x, y) != (cx, cy) {
                assert!(w > center, "({}, {}) = {} not above center {}", x, y, w, center);
            }
        }
        assert_eq!(k.name(), "LoG (σ=1.4)");
        assert!(k.description().contains("Kernel 11x11"));
    }

    #[test]
    fn test_log_kernel_is_rounded_to_three_decimals() {
        let k = log_kernel(1.0);
        for w in k.matrix().data() {
            assert_abs_diff_eq!(w * 1000.0, (w * 1000.0).round(), epsilon = 1e-6);
        }
        assert!(k.matrix().sum().abs() < 0.05);
    }

    #[test]
    #[should_panic]
    fn test_log_kernel_rejects_zero_sigma() {
        let _ = log_kernel(0.0);
    }

    #[test]
    fn test_filter_kind_kernels() {
        assert_eq!(FilterKind::None.kernels(1.0), FilterKernels::None);
        assert_eq!(
            FilterKind::SobelMagnitude.kernels(1.0),
            FilterKernels::Pair(sobel_x(), sobel_y())
        );
        assert_eq!(
            FilterKind::PrewittMagnitude.kernels(1.0).primary(),
            Some(&prewitt_x())
        );
        assert_eq!(
            FilterKind::LoG.kernels(2.0).primary().map(|k| k.matrix().width()),
            Some(13)
        );
    }

    #[test]
    fn test_filter_kind_display() {
        assert_eq!(FilterKind::SobelMagnitude.to_string(), "Sobel Magnitude");
        assert_eq!(FilterKind::None.to_string(), "Original");
    }
}
