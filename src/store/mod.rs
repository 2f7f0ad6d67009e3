//! Flat key-value persistence for stage records.
//!
//! Every stage is stored as one JSON document under `todolist<stage id>`.
//! Backends only need single-key set/get/delete plus key enumeration;
//! [`PersistenceStore::write_batch`] lets a backend make multi-key writes
//! atomic when it can.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;
use crate::models::Stage;

/// Namespace prefix shared by all stage record keys
pub const STAGE_KEY_PREFIX: &str = "todolist";

/// Errors raised by persistence backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded writing '{key}' ({needed} bytes needed, limit {limit})")]
    QuotaExceeded { key: String, needed: usize, limit: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode stage record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A single write in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set { key: String, value: String },
    Delete { key: String },
}

impl StoreOp {
    pub fn key(&self) -> &str {
        match self {
            StoreOp::Set { key, .. } | StoreOp::Delete { key } => key,
        }
    }
}

/// Capabilities the board needs from its host storage
pub trait PersistenceStore {
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Apply several writes in order.
    ///
    /// The default applies them one at a time, so a failure part way through
    /// leaves the earlier writes in place. Backends with transactions should
    /// override this to apply all or nothing.
    fn write_batch(&mut self, ops: &[StoreOp]) -> Result<(), StoreError> {
        for op in ops {
            match op {
                StoreOp::Set { key, value } => self.set(key, value)?,
                StoreOp::Delete { key } => self.delete(key)?,
            }
        }
        Ok(())
    }

    /// Whether `write_batch` is all-or-nothing
    fn atomic_batches(&self) -> bool {
        false
    }
}

/// Storage key for a stage id
pub fn stage_key(stage_id: &str) -> String {
    format!("{}{}", STAGE_KEY_PREFIX, stage_id)
}

pub fn is_stage_key(key: &str) -> bool {
    key.starts_with(STAGE_KEY_PREFIX)
}

pub fn encode_stage(stage: &Stage) -> Result<String, StoreError> {
    Ok(serde_json::to_string(stage)?)
}

pub fn decode_stage(raw: &str) -> Result<Stage, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Build the `Set` op that persists a stage's full record
pub fn put_stage(stage: &Stage) -> Result<StoreOp, StoreError> {
    Ok(StoreOp::Set {
        key: stage_key(&stage.id),
        value: encode_stage(stage)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    #[test]
    fn test_stage_key() {
        assert_eq!(stage_key("abc"), "todolistabc");
        assert!(is_stage_key(&stage_key("abc")));
        assert!(!is_stage_key("theme"));
        assert!(!is_stage_key("my-todolist"));
    }

    #[test]
    fn test_record_shape() {
        let mut stage = Stage::new("Inbox".to_string(), "ffffff".to_string());
        stage.order = 3;
        stage.tasks.push(Task::new("t".to_string(), "d".to_string(), None));
        let value: serde_json::Value = serde_json::from_str(&encode_stage(&stage).unwrap()).unwrap();
        for field in ["id", "label", "tasks", "color", "order"] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        let task = &value["tasks"][0];
        for field in ["id", "title", "description", "date", "isDone"] {
            assert!(task.get(field).is_some(), "missing task field {}", field);
        }
        assert_eq!(value["order"], 3);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_stage("not json").is_err());
        assert!(decode_stage(r#"{"id":"x"}"#).is_err());
    }

    #[test]
    fn test_default_batch_applies_in_order() {
        let mut store = MemoryStore::new();
        store.set("todolistb", "old").unwrap();
        store
            .write_batch(&[
                StoreOp::Set { key: "todolista".to_string(), value: "1".to_string() },
                StoreOp::Delete { key: "todolistb".to_string() },
            ])
            .unwrap();
        assert_eq!(store.get("todolista").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("todolistb").unwrap(), None);
    }
}
