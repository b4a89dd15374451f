use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A top-level plan owned by a workspace.
///
/// A map optionally targets one key result and a date period. The
/// `item_count` / `completed_item_count` / `progress_rate` fields are derived
/// from the map's flat item set (`ops::progress`) — nested items count as
/// independent members, they are not recursively weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMap {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Referenced key result, never mutated through this crate
    #[serde(default)]
    pub key_result_id: Option<String>,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub archived: bool,

    // --- Derived (see ops::progress) ---
    #[serde(default)]
    pub item_count: u32,
    #[serde(default)]
    pub completed_item_count: u32,
    /// 0–100
    #[serde(default)]
    pub progress_rate: u8,

    /// Optimistic concurrency stamp, incremented by the store on every write
    pub version: u64,
}

impl ActionMap {
    /// Create a new empty map at version 1
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        ActionMap {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            key_result_id: None,
            period_start: None,
            period_end: None,
            archived: false,
            item_count: 0,
            completed_item_count: 0,
            progress_rate: 0,
            version: 1,
        }
    }
}
