//! Textual reports about a finished render.
//!
//! Producers implement [`ReportProducer`]; [`SummaryReport`] is the built-in
//! one and writes Markdown from the scalar metrics in [`crate::stats`].

use crate::error::ReportError;
use crate::kernel::{FilterKind, KernelMatrix};
use crate::pipeline::RenderOutput;
use crate::stats::{
    background_snr, contrast_to_noise_ratio, edge_density, line_metrics, line_profile,
    nonzero_fraction, tenengrad,
};
use itertools::Itertools;
use std::fmt::Write;

/// What a report is about.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    /// Name of the source image, e.g. a file name or test pattern.
    pub source: &'a str,
    /// The filter that produced `output`.
    pub filter: FilterKind,
    /// Result of the render being reported on.
    pub output: &'a RenderOutput,
}

/// Something that turns a finished render into text.
pub trait ReportProducer {
    /// Produces the report for `request`.
    fn produce_report(&self, request: &ReportRequest<'_>) -> Result<String, ReportError>;
}

/// Markdown summary of the filter, its kernel, and metrics of the processed
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SummaryReport {
    /// Intensities above this count as edges in the metrics.
    pub threshold: f64,
}

impl SummaryReport {
    /// A summary that splits edges from background at `threshold`.
    pub fn new(threshold: f64) -> Self {
        SummaryReport { threshold }
    }
}

impl ReportProducer for SummaryReport {
    fn produce_report(&self, request: &ReportRequest<'_>) -> Result<String, ReportError> {
        let processed = &request.output.processed;
        let t = self.threshold;
        let mut out = String::new();

        writeln!(out, "# {} on {}", request.filter, request.source)?;
        writeln!(out)?;
        writeln!(
            out,
            "Image size: {}x{}",
            processed.width(),
            processed.height()
        )?;
        writeln!(out)?;

        match &request.output.kernel {
            Some(kernel) => {
                writeln!(out, "## Kernel: {}", kernel.name())?;
                writeln!(out)?;
                writeln!(out, "{}", kernel.description())?;
                writeln!(out)?;
                write_matrix(&mut out, kernel.matrix())?;
            }
            None => {
                writeln!(out, "## Kernel")?;
                writeln!(out)?;
                writeln!(out, "No convolution was applied.")?;
            }
        }
        writeln!(out)?;

        writeln!(out, "## Metrics (threshold {})", t)?;
        writeln!(out)?;
        writeln!(out, "| Metric | Value |")?;
        writeln!(out, "| --- | --- |")?;
        writeln!(out, "| Edge density | {:.4} |", edge_density(processed, t))?;
        writeln!(out, "| Non-zero fraction | {:.4} |", nonzero_fraction(processed))?;
        writeln!(
            out,
            "| Contrast-to-noise ratio | {:.3} |",
            contrast_to_noise_ratio(processed, t)
        )?;
        writeln!(out, "| Background SNR | {:.3} |", background_snr(processed, t))?;
        writeln!(out, "| Tenengrad | {:.1} |", tenengrad(processed))?;

        let row = processed.height() / 2;
        let line = line_metrics(&line_profile(processed, row));
        writeln!(out)?;
        writeln!(out, "## Line profile (row {})", row)?;
        writeln!(out)?;
        writeln!(out, "- Peak: {}", line.peak)?;
        writeln!(out, "- FWHM: {} px", line.fwhm)?;
        writeln!(out, "- Peak-to-background: {:.2}", line.peak_to_background)?;

        Ok(out)
    }
}

fn write_matrix(out: &mut String, matrix: &KernelMatrix) -> std::fmt::Result {
    writeln!(out, "```text")?;
    for row in matrix.rows() {
        writeln!(out, "{}", row.iter().map(|&w| format_weight(w)).join(" "))?;
    }
    writeln!(out, "```")
}

fn format_weight(w: f64) -> String {
    if w.fract() == 0.0 {
        format!("{:>6}", w as i64)
    } else {
        format!("{:>6.3}", w)
    }
}
