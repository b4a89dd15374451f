use serde::{Deserialize, Serialize};

/// Status of a ground-level task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

/// Quadrant classification of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Urgent and important
    Spade,
    /// Important, not urgent
    Heart,
    /// Urgent, not important
    Diamond,
    /// Neither urgent nor important
    Club,
}

/// A ground-level to-do, referenced (not owned) by action items.
///
/// `action_item_id` is the back side of `ActionItem::linked_task_ids`; the
/// store keeps the two in step, and rollups trust only the item-held set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub suit: Suit,
    /// Back-reference to the action item this task is linked to
    #[serde(default)]
    pub action_item_id: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, suit: Suit) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::NotStarted,
            suit,
            action_item_id: None,
        }
    }
}
