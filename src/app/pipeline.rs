//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! list store -> load range -> summarize -> (optionally) hand to a view
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{DateRange, SalesSummary};
use crate::error::AppError;
use crate::plot::SalesView;
use crate::query::{load_range, RangeDataset};
use crate::report::summarize;
use crate::store::StoreLayout;

/// All computed outputs of one dashboard query.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    pub dataset: RangeDataset,
    pub summary: SalesSummary,
}

/// Load and summarize `range`, then show it on `view` if one is given.
///
/// `Ok(None)` means the range holds no data; the view is not invoked.
pub fn run_dashboard(
    layout: &StoreLayout,
    range: &DateRange,
    view: Option<&mut dyn SalesView>,
) -> Result<Option<DashboardRun>, AppError> {
    let Some(dataset) = load_range(layout, range) else {
        return Ok(None);
    };

    let summary = summarize(&dataset)?;

    if let Some(view) = view {
        view.show(&summary)?;
    }

    Ok(Some(DashboardRun { dataset, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use chrono::NaiveDate;

    #[derive(Default)]
    struct RecordingView {
        shown: Vec<SalesSummary>,
    }

    impl SalesView for RecordingView {
        fn show(&mut self, summary: &SalesSummary) -> Result<(), AppError> {
            self.shown.push(summary.clone());
            Ok(())
        }
    }

    fn range(d0: u32, d1: u32) -> DateRange {
        DateRange::from_days(
            NaiveDate::from_ymd_opt(2024, 11, d0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, d1).unwrap(),
        )
    }

    #[test]
    fn empty_range_never_reaches_view() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path().join("logs"), dir.path().join("output"));
        let mut view = RecordingView::default();

        let run = run_dashboard(&layout, &range(20, 21), Some(&mut view)).unwrap();
        assert!(run.is_none());
        assert!(view.shown.is_empty());
    }

    #[test]
    fn view_receives_summary() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path().join("logs"), dir.path().join("output"));
        fs::create_dir_all(&layout.output_root).unwrap();
        fs::write(layout.output_root.join("2024112010.txt"), "2024/11/20 10|A|5.0\n").unwrap();
        let mut view = RecordingView::default();

        let run = run_dashboard(&layout, &range(20, 20), Some(&mut view)).unwrap().unwrap();
        assert_eq!(view.shown, vec![run.summary.clone()]);
        assert_eq!(run.dataset.files.len(), 1);
    }
}
