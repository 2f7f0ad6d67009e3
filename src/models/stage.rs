use serde::{Deserialize, Serialize};
use crate::models::Task;

/// Maximum stage label length, in characters
pub const MAX_LABEL_LEN: usize = 255;

/// Color given to stages created without one
pub const DEFAULT_STAGE_COLOR: &str = "ffffff";

/// Stage model
///
/// One stage is one persistence record: it embeds its full task list and
/// its position among the other stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub label: String,
    pub tasks: Vec<Task>,
    /// Hex color without the leading '#'
    pub color: String,
    pub order: i64,
}

impl Stage {
    /// Create a new empty stage at order 0
    pub fn new(label: String, color: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label,
            tasks: Vec::new(),
            color,
            order: 0,
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_done).count()
    }
}

/// Check that a color is a bare hex triplet (`fff`) or sextet (`ffcc00`)
pub fn is_hex_color(color: &str) -> bool {
    matches!(color.len(), 3 | 6) && color.chars().all(|c| c.is_ascii_hexdigit())
}
