use crate::definitions::PixelBuffer;
use crate::kernel::KernelMatrix;
use proptest::{
    arbitrary::any,
    sample::SizeRange,
    strategy::{BoxedStrategy, Just, Strategy},
};
use std::ops::RangeInclusive;

/// Create a strategy to generate RGBA buffers with arbitrary dimensions
/// selected within the specified ranges. Alpha is arbitrary too, since
/// sources are not required to be opaque.
pub(crate) fn arbitrary_buffer(
    width_range: impl Into<SizeRange>,
    height_range: impl Into<SizeRange>,
) -> BoxedStrategy<PixelBuffer> {
    dims(width_range, height_range)
        .prop_flat_map(|(w, h)| arbitrary_buffer_fixed(w, h))
        .boxed()
}

fn arbitrary_buffer_fixed(width: u32, height: u32) -> BoxedStrategy<PixelBuffer> {
    let size = (width * height * 4) as usize;
    let vecs = proptest::collection::vec(any::<u8>(), size);

    vecs.prop_map(move |v| PixelBuffer::from_vec(width, height, v).unwrap())
        .boxed()
}

/// Create a strategy to generate buffers in which every pixel is an opaque
/// gray, matching what the filtering stages produce.
pub(crate) fn arbitrary_gray_buffer(
    width_range: impl Into<SizeRange>,
    height_range: impl Into<SizeRange>,
) -> BoxedStrategy<PixelBuffer> {
    dims(width_range, height_range)
        .prop_flat_map(|(w, h)| {
            proptest::collection::vec(any::<u8>(), (w * h) as usize).prop_map(move |v| {
                let data = v.iter().flat_map(|&g| [g, g, g, 255]).collect();
                PixelBuffer::from_vec(w, h, data).unwrap()
            })
        })
        .boxed()
}

/// Create a strategy to generate kernels with odd sides of at most
/// `2 * max_radius + 1` and weights in `-weight..=weight`.
pub(crate) fn arbitrary_kernel(max_radius: u32, weight: f64) -> BoxedStrategy<KernelMatrix> {
    (0..=max_radius, 0..=max_radius)
        .prop_flat_map(move |(rx, ry)| {
            let (w, h) = (2 * rx + 1, 2 * ry + 1);
            (
                Just((w, h)),
                proptest::collection::vec(-weight..=weight, (w * h) as usize),
            )
        })
        .prop_map(|((w, h), data)| KernelMatrix::new(data, w, h))
        .boxed()
}

/// Like [`arbitrary_kernel`], but shifted so that the weights sum to zero.
pub(crate) fn arbitrary_zero_sum_kernel(max_radius: u32, weight: f64) -> BoxedStrategy<KernelMatrix> {
    arbitrary_kernel(max_radius, weight)
        .prop_map(|k| {
            let mean = k.sum() / k.data().len() as f64;
            k.map(|w| w - mean)
        })
        .boxed()
}

fn dims(width: impl Into<SizeRange>, height: impl Into<SizeRange>) -> BoxedStrategy<(u32, u32)> {
    let width = dim(width);
    let height = dim(height);
    width
        .prop_flat_map(move |w| height.clone().prop_map(move |h| (w, h)))
        .boxed()
}

fn dim(range: impl Into<SizeRange>) -> RangeInclusive<u32> {
    let range = range.into();
    range.start() as u32..=range.end_incl() as u32
}

#[cfg(not(miri))]
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_arbitrary_fixed_buffer(img in arbitrary_buffer(3, 7)) {
            assert_eq!(img.width(), 3);
            assert_eq!(img.height(), 7);
        }

        #[test]
        fn test_arbitrary_gray_buffer(img in arbitrary_gray_buffer(1..30, 2..=15)) {
            assert!((1..30).contains(&img.width()));
            assert!((2..=15).contains(&img.height()));
            assert!(img.pixels().all(|p| p[0] == p[1] && p[1] == p[2] && p[3] == 255));
        }

        #[test]
        fn test_arbitrary_kernel_has_odd_sides(k in arbitrary_kernel(3, 4.0)) {
            assert_eq!(k.width() % 2, 1);
            assert_eq!(k.height() % 2, 1);
            assert!(k.width() <= 7 && k.height() <= 7);
        }

        #[test]
        fn test_arbitrary_zero_sum_kernel(k in arbitrary_zero_sum_kernel(2, 4.0)) {
            assert!(k.sum().abs() < 1e-9);
        }
    }
}
