use std::fmt;

use crate::charts::{multivariate, univariate, ChartSpec};

/// Top-level navigation. Each mode is entered only by direct selection and
/// carries no sub-state across a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Univariate,
    Multivariate,
    Conclusion,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [
        ViewMode::Univariate,
        ViewMode::Multivariate,
        ViewMode::Conclusion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Univariate => "Univariate Analysis",
            ViewMode::Multivariate => "BI/Multi-variate Analysis",
            ViewMode::Conclusion => "Conclusion",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ViewMode::Univariate => "📌 Univariate Analysis",
            ViewMode::Multivariate => "📌 BI/Multi-variate Analysis",
            ViewMode::Conclusion => "📌 Conclusion & Insights",
        }
    }

    /// Charts shown in this mode, in display order. Conclusion has none.
    pub fn battery(self) -> &'static [ChartSpec] {
        match self {
            ViewMode::Univariate => univariate::BATTERY,
            ViewMode::Multivariate => multivariate::BATTERY,
            ViewMode::Conclusion => &[],
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batteries_have_fixed_sizes() {
        assert_eq!(ViewMode::Univariate.battery().len(), 5);
        assert_eq!(ViewMode::Multivariate.battery().len(), 7);
        assert!(ViewMode::Conclusion.battery().is_empty());
        assert_eq!(ViewMode::default(), ViewMode::Univariate);
    }

    #[test]
    fn labels_are_distinct() {
        let labels: Vec<String> = ViewMode::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            ["Univariate Analysis", "BI/Multi-variate Analysis", "Conclusion"]
        );
    }
}
