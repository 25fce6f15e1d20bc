use std::fmt;

/// Shown when a plan carries no item counts.
pub const PLACEHOLDER_PERCENT: u32 = 25;

/// Display-only completion of a meal plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Derived from completed/total item counts.
    Computed(u32),
    /// No counts available; renders as [`PLACEHOLDER_PERCENT`].
    Placeholder,
}

impl Progress {
    pub fn from_counts(completed: Option<u32>, total: Option<u32>) -> Self {
        match (completed, total) {
            (Some(done), Some(total)) if total > 0 => {
                let pct = (f64::from(done) * 100.0 / f64::from(total)).round();
                Progress::Computed(pct as u32)
            }
            _ => Progress::Placeholder,
        }
    }

    pub fn percent(&self) -> u32 {
        match self {
            Progress::Computed(pct) => *pct,
            Progress::Placeholder => PLACEHOLDER_PERCENT,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Progress::Placeholder)
    }

    /// Ratio for gauge widgets, capped at 1.0.
    pub fn ratio(&self) -> f64 {
        (f64::from(self.percent()) / 100.0).min(1.0)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_from_counts_rounds() {
        assert_eq!(Progress::from_counts(Some(1), Some(3)).percent(), 33);
        assert_eq!(Progress::from_counts(Some(2), Some(3)).percent(), 67);
        assert_eq!(Progress::from_counts(Some(1), Some(8)).percent(), 13);
        assert_eq!(Progress::from_counts(Some(4), Some(4)).percent(), 100);
    }

    #[test]
    fn zero_completed_is_computed_not_placeholder() {
        let p = Progress::from_counts(Some(0), Some(5));
        assert_eq!(p, Progress::Computed(0));
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn missing_counts_fall_back_to_placeholder() {
        assert_eq!(Progress::from_counts(None, None).percent(), 25);
        assert_eq!(Progress::from_counts(Some(3), None).percent(), 25);
        assert_eq!(Progress::from_counts(None, Some(3)).percent(), 25);
        assert!(Progress::from_counts(None, None).is_placeholder());
    }

    #[test]
    fn zero_total_is_placeholder() {
        assert!(Progress::from_counts(Some(2), Some(0)).is_placeholder());
    }

    #[test]
    fn over_complete_is_not_clamped_but_ratio_is() {
        let p = Progress::from_counts(Some(6), Some(4));
        assert_eq!(p.percent(), 150);
        assert_eq!(p.ratio(), 1.0);
    }

    #[test]
    fn display_appends_percent_sign() {
        assert_eq!(Progress::from_counts(Some(1), Some(2)).to_string(), "50%");
        assert_eq!(Progress::Placeholder.to_string(), "25%");
    }
}
