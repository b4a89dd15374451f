use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::config::DueConfig;

/// Urgency of an item's due date relative to today.
///
/// Display colors and icons belong to the presentation layer; this is the
/// classification only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueWarning {
    /// No due date set
    None,
    Normal,
    Warning,
    Critical,
    Overdue,
}

/// Classify with the default thresholds (critical ≤ 2 days, warning ≤ 7)
pub fn classify(due_date: Option<NaiveDate>, today: NaiveDate) -> DueWarning {
    classify_with(&DueConfig::default(), due_date, today)
}

/// Classify a due date against `today` using configured thresholds
pub fn classify_with(
    config: &DueConfig,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DueWarning {
    let Some(due) = due_date else {
        return DueWarning::None;
    };
    let remaining = due.signed_duration_since(today).num_days();
    if remaining < 0 {
        DueWarning::Overdue
    } else if remaining <= config.critical_within_days {
        DueWarning::Critical
    } else if remaining <= config.warning_within_days {
        DueWarning::Warning
    } else {
        DueWarning::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 26).unwrap()
    }

    fn in_days(days: i64) -> Option<NaiveDate> {
        Some(today() + Duration::days(days))
    }

    #[test]
    fn no_date_is_none() {
        assert_eq!(classify(None, today()), DueWarning::None);
    }

    #[test]
    fn past_date_is_overdue() {
        assert_eq!(classify(in_days(-1), today()), DueWarning::Overdue);
        assert_eq!(classify(in_days(-30), today()), DueWarning::Overdue);
    }

    #[test]
    fn zero_to_two_days_is_critical() {
        assert_eq!(classify(in_days(0), today()), DueWarning::Critical);
        assert_eq!(classify(in_days(1), today()), DueWarning::Critical);
        assert_eq!(classify(in_days(2), today()), DueWarning::Critical);
    }

    #[test]
    fn three_to_seven_days_is_warning() {
        assert_eq!(classify(in_days(3), today()), DueWarning::Warning);
        assert_eq!(classify(in_days(7), today()), DueWarning::Warning);
    }

    #[test]
    fn beyond_seven_days_is_normal() {
        assert_eq!(classify(in_days(8), today()), DueWarning::Normal);
        assert_eq!(classify(in_days(10), today()), DueWarning::Normal);
        assert_eq!(classify(in_days(365), today()), DueWarning::Normal);
    }

    #[test]
    fn custom_thresholds_move_the_boundaries() {
        let config = DueConfig {
            critical_within_days: 0,
            warning_within_days: 3,
        };
        assert_eq!(classify_with(&config, in_days(0), today()), DueWarning::Critical);
        assert_eq!(classify_with(&config, in_days(1), today()), DueWarning::Warning);
        assert_eq!(classify_with(&config, in_days(4), today()), DueWarning::Normal);
    }
}
