use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workflow status of an action item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Blocked,
    Done,
}

impl ItemStatus {
    /// All statuses in board-column order
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::NotStarted,
        ItemStatus::InProgress,
        ItemStatus::Blocked,
        ItemStatus::Done,
    ];

    pub fn is_done(self) -> bool {
        self == ItemStatus::Done
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::NotStarted => write!(f, "not_started"),
            ItemStatus::InProgress => write!(f, "in_progress"),
            ItemStatus::Blocked => write!(f, "blocked"),
            ItemStatus::Done => write!(f, "done"),
        }
    }
}

/// Priority of an action item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A unit of work inside an action map.
///
/// Items form a tree via `parent_item_id` (siblings ordered by `sort_order`)
/// and link to ground-level tasks by id. The `task_count` /
/// `completed_task_count` / `progress_rate` fields are derived — they are
/// recomputed from the linked tasks on every read (`ops::progress`) and never
/// treated as independently authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: String,
    pub map_id: String,
    /// Parent item in the same map, or `None` for a root
    #[serde(default)]
    pub parent_item_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: ItemStatus,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Ordering among siblings only — not global
    #[serde(default)]
    pub sort_order: i64,
    /// Ids of linked tasks; the authoritative side of the item↔task link
    #[serde(default)]
    pub linked_task_ids: Vec<String>,

    // --- Derived (see ops::progress) ---
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub completed_task_count: u32,
    /// 0–100
    #[serde(default)]
    pub progress_rate: u8,

    /// Optimistic concurrency stamp, incremented by the store on every write
    pub version: u64,
}

impl ActionItem {
    /// Create a new root item with default status/priority, version 1
    pub fn new(id: impl Into<String>, map_id: impl Into<String>, title: impl Into<String>) -> Self {
        ActionItem {
            id: id.into(),
            map_id: map_id.into(),
            parent_item_id: None,
            title: title.into(),
            description: String::new(),
            status: ItemStatus::NotStarted,
            priority: Priority::Medium,
            due_date: None,
            sort_order: 0,
            linked_task_ids: Vec::new(),
            task_count: 0,
            completed_task_count: 0,
            progress_rate: 0,
            version: 1,
        }
    }
}
