//! A spatial filtering engine for grayscale edge detection, built on the
//! [image] crate.
//!
//! Buffers are [`definitions::PixelBuffer`]s (`RgbaImage`). Filters work on
//! the luminance of their input and return opaque gray buffers of the same
//! size. The [`pipeline::render`] function chains noise injection, optional
//! pre-smoothing, a filter from [`kernel::FilterKind`] and the spectrum of the
//! kernel in use; the individual stages are also available on their own.
//!
//! [image]: https://github.com/image-rs/image
#![deny(missing_docs)]
#![allow(
    clippy::cast_lossless,
    clippy::needless_range_loop,
    clippy::needless_doctest_main,
    clippy::range_plus_one,
    clippy::trivially_copy_pass_by_ref,
    clippy::many_single_char_names
)]

#[macro_use]
pub mod utils;
pub mod contrast;
pub mod definitions;
pub mod edges;
pub mod error;
pub mod filter;
pub mod gradients;
pub mod kernel;
pub mod noise;
pub mod pipeline;
#[cfg(test)]
mod proptest_utils;
pub mod report;
pub mod spectrum;
pub mod stats;

pub use crate::error::{FilterError, ReportError};
pub use crate::pipeline::{render, RenderOutput, RenderParams};
