use serde::{Deserialize, Serialize};

/// Due-date classification thresholds (days remaining, inclusive).
///
/// Defaults: within 2 days → critical, within 7 → warning, beyond → normal.
/// A negative remainder is always overdue regardless of thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueConfig {
    #[serde(default = "default_critical_within")]
    pub critical_within_days: i64,
    #[serde(default = "default_warning_within")]
    pub warning_within_days: i64,
}

impl Default for DueConfig {
    fn default() -> Self {
        DueConfig {
            critical_within_days: default_critical_within(),
            warning_within_days: default_warning_within(),
        }
    }
}

fn default_critical_within() -> i64 {
    2
}

fn default_warning_within() -> i64 {
    7
}
