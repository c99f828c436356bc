use std::collections::BTreeSet;
use std::sync::Arc;

use crate::charts::{render_battery, ChartInput, RenderedChart};
use crate::color::CategoryColors;
use crate::config::PipelineOptions;
use crate::data::filter::{apply_filters, FilterSelection, MonthRange, FIRST_MONTH, LAST_MONTH};
use crate::data::model::RetailTable;
use crate::view::ViewMode;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The loaded dataset plus everything derived from the sidebar.
///
/// Widget changes only record the new selection and mark the state dirty;
/// [`Dashboard::refresh`] then recomputes filtered table → chart list in one
/// synchronous pass.
pub struct Dashboard {
    raw: Arc<RetailTable>,
    options: PipelineOptions,

    view: ViewMode,
    selection: FilterSelection,

    /// Rows passing the current selection.
    filtered: RetailTable,
    /// Charts of the active view, rebuilt on refresh.
    charts: Vec<RenderedChart>,
    /// One colour per payment method / location, fixed for the session.
    pub series_colors: CategoryColors,
    dirty: bool,
}

impl Dashboard {
    pub fn new(raw: Arc<RetailTable>, options: PipelineOptions) -> Self {
        let selection = FilterSelection::all(&raw);
        let series_colors = CategoryColors::new(
            raw.payment_methods()
                .iter()
                .map(String::as_str)
                .chain(raw.rows().iter().map(|t| t.location.as_str())),
        );
        let mut dashboard = Self {
            raw,
            options,
            view: ViewMode::default(),
            selection,
            filtered: RetailTable::default(),
            charts: Vec::new(),
            series_colors,
            dirty: true,
        };
        dashboard.refresh();
        dashboard
    }

    pub fn raw(&self) -> &RetailTable {
        &self.raw
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn filtered(&self) -> &RetailTable {
        &self.filtered
    }

    pub fn charts(&self) -> &[RenderedChart] {
        &self.charts
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute derived state if any input changed since the last call.
    pub fn refresh(&mut self) {
        if !self.is_dirty() {
            return;
        }
        self.filtered = apply_filters(&self.raw, &self.selection);
        let input = ChartInput {
            filtered: &self.filtered,
            raw: &self.raw,
            filter_top_products: self.options.filter_top_products,
        };
        self.charts = render_battery(self.view.battery(), &input);
        self.dirty = false;
        log::debug!(
            "{}: {} of {} rows after filters, {} charts",
            self.view,
            self.filtered.len(),
            self.raw.len(),
            self.charts.len()
        );
    }

    pub fn set_view(&mut self, view: ViewMode) {
        if self.view != view {
            self.view = view;
            self.dirty = true;
        }
    }

    pub fn toggle_category(&mut self, category: &str) {
        toggle(&mut self.selection.categories, category);
        self.dirty = true;
    }

    pub fn toggle_payment_method(&mut self, method: &str) {
        toggle(&mut self.selection.payment_methods, method);
        self.dirty = true;
    }

    pub fn select_all_categories(&mut self) {
        self.selection.categories = self.raw.categories().iter().cloned().collect();
        self.dirty = true;
    }

    pub fn select_no_categories(&mut self) {
        self.selection.categories.clear();
        self.dirty = true;
    }

    pub fn select_all_payment_methods(&mut self) {
        self.selection.payment_methods = self.raw.payment_methods().iter().cloned().collect();
        self.dirty = true;
    }

    pub fn select_no_payment_methods(&mut self) {
        self.selection.payment_methods.clear();
        self.dirty = true;
    }

    /// Set the month interval. Out-of-calendar values are clamped and an
    /// inverted pair is collapsed onto `lo`.
    pub fn set_month_range(&mut self, lo: u8, hi: u8) {
        let lo = lo.clamp(FIRST_MONTH, LAST_MONTH);
        let hi = hi.clamp(lo, LAST_MONTH);
        let months = MonthRange::new(lo, hi).unwrap_or_default();
        if months != self.selection.months {
            self.selection.months = months;
            self.dirty = true;
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// What the window shows: a working dashboard or a fatal startup error.
pub enum AppState {
    Ready(Box<Dashboard>),
    /// The dataset could not be loaded. Shown as-is; there is no retry.
    Failed(String),
}

impl AppState {
    pub fn ready(raw: Arc<RetailTable>, options: PipelineOptions) -> Self {
        AppState::Ready(Box::new(Dashboard::new(raw, options)))
    }

    pub fn failed(message: impl Into<String>) -> Self {
        AppState::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartError, Figure};
    use crate::data::model::fixtures::hundred_rows;

    fn dashboard() -> Dashboard {
        Dashboard::new(Arc::new(hundred_rows()), PipelineOptions::default())
    }

    #[test]
    fn starts_with_identity_filter_and_univariate_view() {
        let d = dashboard();
        assert!(!d.is_dirty());
        assert_eq!(d.view(), ViewMode::Univariate);
        assert_eq!(d.filtered().len(), d.raw().len());
        assert_eq!(d.charts().len(), 5);
        assert_eq!(d.selection().months, MonthRange::full_year());
    }

    #[test]
    fn switching_view_rebuilds_the_battery() {
        let mut d = dashboard();
        d.set_view(ViewMode::Multivariate);
        assert!(d.is_dirty());
        d.refresh();
        assert_eq!(d.charts().len(), 7);
        assert_eq!(d.charts()[0].title, "Correlation Heatmap");

        d.set_view(ViewMode::Conclusion);
        d.refresh();
        assert!(d.charts().is_empty());
    }

    #[test]
    fn toggling_filters_refilters() {
        let mut d = dashboard();
        d.toggle_category("B");
        d.refresh();
        assert!(d.filtered().rows().iter().all(|t| t.category == "A"));

        d.toggle_category("B");
        d.refresh();
        assert_eq!(d.filtered().len(), 100);

        d.select_no_payment_methods();
        d.refresh();
        assert!(d.filtered().is_empty());
        for chart in d.charts() {
            if let Ok(Figure::Histogram(h)) = &chart.outcome {
                assert!(h.bins.is_empty());
            }
        }

        d.select_all_payment_methods();
        d.select_no_categories();
        d.set_view(ViewMode::Multivariate);
        d.refresh();
        assert_eq!(d.charts()[6].outcome, Err(ChartError::EmptyGroup));

        d.select_all_categories();
        d.refresh();
        assert_eq!(d.filtered().len(), 100);
    }

    #[test]
    fn month_range_is_clamped() {
        let mut d = dashboard();
        d.set_month_range(0, 3);
        assert_eq!(d.selection().months, MonthRange::new(1, 3).unwrap());
        d.set_month_range(9, 4);
        assert_eq!(d.selection().months, MonthRange::new(9, 9).unwrap());
        d.refresh();
        assert!(d.filtered().rows().iter().all(|t| t.month == 9));
    }

    #[test]
    fn unchanged_state_is_not_recomputed() {
        let mut d = dashboard();
        d.set_view(ViewMode::Univariate);
        d.set_month_range(1, 12);
        assert!(!d.is_dirty());
    }
}
