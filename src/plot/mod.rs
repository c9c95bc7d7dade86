//! Views: where the presentation series end up.
//!
//! The pipeline only knows `SalesView`; what a view does with the series (print
//! ASCII charts, draw a TUI, record them in a test) is its own business.

use std::io::Write;

use crate::domain::SalesSummary;
use crate::error::AppError;

pub mod ascii;

pub use ascii::{render_bar_chart, render_line_chart};

/// Consumer of the by-article (bar) and by-time (line) series.
pub trait SalesView {
    fn show(&mut self, summary: &SalesSummary) -> Result<(), AppError>;
}

/// Prints both charts as ASCII to a writer (stdout for the CLI).
pub struct AsciiView<W: Write> {
    out: W,
    width: usize,
    height: usize,
}

impl<W: Write> AsciiView<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self { out, width, height }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SalesView for AsciiView<W> {
    fn show(&mut self, summary: &SalesSummary) -> Result<(), AppError> {
        let bars = render_bar_chart(&summary.by_article, self.width);
        let line = render_line_chart(&summary.by_time, self.width, self.height);
        writeln!(self.out, "{bars}\n{line}")
            .map_err(|e| AppError::runtime(format!("Failed to write charts: {e}")))
    }
}
