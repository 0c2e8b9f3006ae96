//! Functions for adding synthetic noise to images.

use crate::definitions::{clamp_channel, PixelBuffer};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Standard deviation of [`gaussian_noise`], in intensity levels.
pub const GAUSSIAN_NOISE_STDDEV: f64 = 8.0;

/// Probability that [`salt_and_pepper_noise`] replaces a pixel.
pub const SALT_PEPPER_PROBABILITY: f64 = 0.01;

/// The kinds of noise that can be injected into a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Leave the image untouched.
    #[default]
    None,
    /// Additive Gaussian noise, see [`gaussian_noise`].
    Gaussian,
    /// Impulse noise, see [`salt_and_pepper_noise`].
    SaltPepper,
}

/// Applies noise of the given `kind` to a copy of `image`.
///
/// Each call seeds its own generator from `seed`, so equal seeds give equal
/// output.
pub fn apply_noise(image: &PixelBuffer, kind: NoiseKind, seed: u64) -> PixelBuffer {
    match kind {
        NoiseKind::None => image.clone(),
        NoiseKind::Gaussian => gaussian_noise(image, seed),
        NoiseKind::SaltPepper => salt_and_pepper_noise(image, seed),
    }
}

/// Adds zero-mean Gaussian noise with standard deviation
/// [`GAUSSIAN_NOISE_STDDEV`].
///
/// Samples are drawn with the Box-Muller transform. One sample is drawn per
/// pixel and added to its red, green and blue channels; alpha is left as is.
pub fn gaussian_noise(image: &PixelBuffer, seed: u64) -> PixelBuffer {
    let mut out = image.clone();
    gaussian_noise_mut(&mut out, seed);
    out
}

/// An in-place version of [`gaussian_noise`].
pub fn gaussian_noise_mut(image: &mut PixelBuffer, seed: u64) {
    let mut rng: StdRng = SeedableRng::seed_from_u64(seed);
    let uniform = Uniform::new(0.0, 1.0);

    for p in image.pixels_mut() {
        let mut u1: f64 = uniform.sample(&mut rng);
        while u1 <= 0.0 {
            u1 = uniform.sample(&mut rng);
        }
        let u2: f64 = uniform.sample(&mut rng);
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        let noise = z * GAUSSIAN_NOISE_STDDEV;

        for c in p.0.iter_mut().take(3) {
            *c = clamp_channel(*c as f64 + noise);
        }
    }
}

/// Sets pixels to black or white with probability [`SALT_PEPPER_PROBABILITY`].
/// Black and white occur with equal probability; alpha is left as is.
pub fn salt_and_pepper_noise(image: &PixelBuffer, seed: u64) -> PixelBuffer {
    let mut out = image.clone();
    salt_and_pepper_noise_mut(&mut out, seed);
    out
}

/// An in-place version of [`salt_and_pepper_noise`].
pub fn salt_and_pepper_noise_mut(image: &mut PixelBuffer, seed: u64) {
    let mut rng: StdRng = SeedableRng::seed_from_u64(seed);
    let uniform = Uniform::new(0.0, 1.0);

    for p in image.pixels_mut() {
        if uniform.sample(&mut rng) >= SALT_PEPPER_PROBABILITY {
            continue;
        }
        let v = if uniform.sample(&mut rng) < 0.5 { 0 } else { 255 };
        p.0[..3].fill(v);
    }
}


#[cfg(not(miri))]
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::proptest_utils::arbitrary_buffer;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn proptest_noise_preserves_dimensions_and_alpha(
            img in arbitrary_buffer(0..16, 0..16),
            seed in any::<u64>(),
        ) {
            for kind in [NoiseKind::None, NoiseKind::Gaussian, NoiseKind::SaltPepper] {
                let out = apply_noise(&img, kind, seed);
                prop_assert_eq!(out.dimensions(), img.dimensions());
                for (p, q) in img.pixels().zip(out.pixels()) {
                    prop_assert_eq!(p[3], q[3]);
                }
            }
        }
    }
}
