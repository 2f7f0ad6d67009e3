use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum task title length, in characters
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum task description length, in characters
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Task model
///
/// Tasks have no storage key of their own: they live inside the record of
/// the stage that owns them, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Due/completion timestamp, stored as an RFC 3339 string
    pub date: DateTime<Utc>,
    pub is_done: bool,
}

impl Task {
    /// Create a new open task. The date defaults to now when not given.
    pub fn new(title: String, description: String, date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            date: date.unwrap_or_else(Utc::now),
            is_done: false,
        }
    }
}

/// Partial update applied by `BoardState::update_task`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.date.is_none()
    }

    /// Apply the patch to a copy of `task`
    pub fn applied_to(&self, task: &Task) -> Task {
        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(date) = self.date {
            updated.date = date;
        }
        updated
    }
}
