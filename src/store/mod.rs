pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::item::{ActionItem, ItemStatus, Priority};
use crate::model::map::ActionMap;
use crate::model::task::Task;

/// Error taxonomy of the persistence collaborator.
///
/// `Conflict` is recoverable through the three-way resolution protocol and is
/// never resolved silently. `Validation` and `Transient` leave the caller's
/// local edit intact for retry. `NotFound` is terminal for the entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Submitted version did not match the stored version
    #[error("version conflict: store holds version {current_version}")]
    Conflict { current_version: u64 },
    /// Malformed patch (e.g. empty title)
    #[error("validation failed: {0}")]
    Validation(String),
    /// Entity does not exist (possibly deleted concurrently)
    #[error("not found: {0}")]
    NotFound(String),
    /// Network/timeout class failure, retryable
    #[error("transient store failure: {0}")]
    Transient(String),
}

/// PATCH-style edit of an action map. `None` leaves a field unchanged; the
/// nested options clear an optional field with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub key_result_id: Option<Option<String>>,
    #[serde(default)]
    pub period_start: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub period_end: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub archived: Option<bool>,
}

/// PATCH-style edit of an action item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub parent_item_id: Option<Option<String>>,
}

impl ItemPatch {
    /// Patch that only changes status — the board's drag-and-drop edit
    pub fn set_status(status: ItemStatus) -> Self {
        ItemPatch {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// The persistence collaborator.
///
/// Per entity type the core needs exactly fetch-all, fetch-one, and a
/// version-checked write. A write with `force` set skips the version check
/// for that single call; the store still increments the version. The store
/// must never apply a non-forced write whose `expected_version` mismatches
/// its stored version.
pub trait Store {
    fn fetch_maps(&self) -> Result<Vec<ActionMap>, StoreError>;
    fn fetch_map(&self, id: &str) -> Result<ActionMap, StoreError>;
    fn write_map(
        &mut self,
        id: &str,
        patch: &MapPatch,
        expected_version: u64,
        force: bool,
    ) -> Result<ActionMap, StoreError>;

    fn fetch_items(&self, map_id: &str) -> Result<Vec<ActionItem>, StoreError>;
    fn fetch_item(&self, id: &str) -> Result<ActionItem, StoreError>;
    fn write_item(
        &mut self,
        id: &str,
        patch: &ItemPatch,
        expected_version: u64,
        force: bool,
    ) -> Result<ActionItem, StoreError>;

    /// Tasks linked to any item of the given map, for rollup snapshots
    fn fetch_tasks(&self, map_id: &str) -> Result<Vec<Task>, StoreError>;
}
