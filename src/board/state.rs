use crate::models::{Stage, Task, TaskPatch};
use crate::store::{decode_stage, is_stage_key, put_stage, stage_key, PersistenceStore, StoreError, StoreOp, STAGE_KEY_PREFIX};
use super::error::{BoardError, BoardResult};
use super::validate::{validate_color, validate_label, validate_task};

/// The board: an ordered list of stages kept in step with a key-value store.
///
/// `BoardState` is the only writer of the store. Each mutation builds the
/// new state on a copy, writes every affected stage record, and only then
/// swaps the copy in, so a rejected write leaves the snapshot untouched.
///
/// Structural changes (adding, removing, reordering stages) rewrite every
/// stage record with `order` renumbered to its position. On stores without
/// atomic batches these writes are not atomic across keys: a crash part way
/// through can leave gaps or duplicates in `order` until the next structural
/// change renumbers. `SqliteStore` runs them in one transaction.
///
/// # Example
///
/// ```
/// use stageboard::board::BoardState;
/// use stageboard::models::Task;
/// use stageboard::store::MemoryStore;
///
/// let mut board = BoardState::load(MemoryStore::new()).unwrap();
/// let stage = board.add_stage("Backlog", "ffcc00").unwrap();
/// board
///     .add_task(&stage.id, Task::new("Write docs".to_string(), String::new(), None))
///     .unwrap();
/// assert_eq!(board.stages()[0].tasks.len(), 1);
/// ```
pub struct BoardState<S: PersistenceStore> {
    store: S,
    stages: Vec<Stage>,
    loaded: bool,
}

impl<S: PersistenceStore> BoardState<S> {
    /// Wrap a store without reading it. Until `reload` runs, the board
    /// behaves as if it had no stages.
    pub fn new(store: S) -> Self {
        Self {
            store,
            stages: Vec::new(),
            loaded: false,
        }
    }

    /// Build a board from every stage record in the store
    pub fn load(store: S) -> BoardResult<Self> {
        let mut board = Self::new(store);
        board.reload()?;
        Ok(board)
    }

    /// Re-read all stage records, replacing the in-memory snapshot
    pub fn reload(&mut self) -> BoardResult<&[Stage]> {
        self.stages = read_stages(&self.store)?;
        self.loaded = true;
        Ok(&self.stages)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current stages in display order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Owned copy of the current stages
    pub fn snapshot(&self) -> Vec<Stage> {
        self.stages.clone()
    }

    pub fn stage(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn position(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == stage_id)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Create a stage at the front of the board.
    ///
    /// Every stage is renumbered and rewritten. Returns the new stage.
    pub fn add_stage(&mut self, label: &str, color: &str) -> BoardResult<Stage> {
        validate_label(label)?;
        validate_color(color)?;

        let stage = Stage::new(label.to_string(), color.to_string());
        let mut next = Vec::with_capacity(self.stages.len() + 1);
        next.push(stage.clone());
        next.extend(self.stages.iter().cloned());
        renumber(&mut next);

        self.commit_structure(next, None)?;
        log::debug!("Added stage {} ({} stages)", stage.id, self.stages.len());
        Ok(self.stages[0].clone())
    }

    /// Delete a stage and renumber the rest.
    ///
    /// The record is deleted even when the stage is not in the snapshot.
    /// Returns whether the stage was on the board.
    pub fn remove_stage(&mut self, stage_id: &str) -> BoardResult<bool> {
        let existed = self.position(stage_id).is_some();
        let mut next: Vec<Stage> = self
            .stages
            .iter()
            .filter(|s| s.id != stage_id)
            .cloned()
            .collect();
        renumber(&mut next);

        self.commit_structure(next, Some(stage_id))?;
        if existed {
            log::debug!("Removed stage {}", stage_id);
        }
        Ok(existed)
    }

    /// Move the stage at `from` so it ends up at `to`, then renumber.
    ///
    /// Both indices must be below the stage count; otherwise nothing is
    /// changed and `IndexOutOfRange` is returned.
    pub fn reorder_stages(&mut self, from: usize, to: usize) -> BoardResult<()> {
        let len = self.stages.len();
        if from >= len || to >= len {
            return Err(BoardError::IndexOutOfRange { from, to, len });
        }

        let mut next = self.stages.clone();
        let moved = next.remove(from);
        next.insert(to, moved);
        renumber(&mut next);

        self.commit_structure(next, None)?;
        log::debug!("Moved stage from {} to {}", from, to);
        Ok(())
    }

    /// Set a stage's color. Returns false if the stage does not exist.
    pub fn set_stage_color(&mut self, stage_id: &str, color: &str) -> BoardResult<bool> {
        validate_color(color)?;
        self.update_stage(stage_id, |stage| {
            stage.color = color.to_string();
            true
        })
    }

    /// Append a task to a stage
    pub fn add_task(&mut self, stage_id: &str, task: Task) -> BoardResult<()> {
        validate_task(&task)?;
        let stage = self
            .stage(stage_id)
            .ok_or_else(|| BoardError::StageNotFound(stage_id.to_string()))?;
        if stage.task(&task.id).is_some() {
            return Err(BoardError::DuplicateTask {
                task_id: task.id,
                stage_id: stage_id.to_string(),
            });
        }

        self.update_stage(stage_id, move |stage| {
            stage.tasks.push(task);
            true
        })?;
        Ok(())
    }

    /// Remove a task from a stage. Returns whether anything was removed.
    pub fn remove_task(&mut self, task_id: &str, stage_id: &str) -> BoardResult<bool> {
        self.update_stage(stage_id, |stage| match stage.task_position(task_id) {
            Some(idx) => {
                stage.tasks.remove(idx);
                true
            }
            None => false,
        })
    }

    /// Mark a task done or not done. Returns whether the task was found.
    pub fn set_task_done(&mut self, task_id: &str, stage_id: &str, is_done: bool) -> BoardResult<bool> {
        self.update_stage(stage_id, |stage| {
            match stage.tasks.iter_mut().find(|t| t.id == task_id) {
                Some(task) => {
                    task.is_done = is_done;
                    true
                }
                None => false,
            }
        })
    }

    /// Change a task's title, description or date.
    ///
    /// The patched task is validated like a new one. Returns whether the
    /// task was found.
    pub fn update_task(&mut self, task_id: &str, stage_id: &str, patch: &TaskPatch) -> BoardResult<bool> {
        let Some(current) = self.stage(stage_id).and_then(|s| s.task(task_id)) else {
            return Ok(false);
        };
        let updated = patch.applied_to(current);
        validate_task(&updated)?;

        self.update_stage(stage_id, move |stage| {
            match stage.tasks.iter_mut().find(|t| t.id == updated.id) {
                Some(task) => {
                    *task = updated;
                    true
                }
                None => false,
            }
        })
    }

    /// Apply `edit` to a copy of one stage and persist it.
    ///
    /// `edit` returns false when it changed nothing, in which case no write
    /// happens. Returns false as well when the stage is missing.
    fn update_stage<F>(&mut self, stage_id: &str, edit: F) -> BoardResult<bool>
    where
        F: FnOnce(&mut Stage) -> bool,
    {
        let Some(idx) = self.position(stage_id) else {
            return Ok(false);
        };

        let mut stage = self.stages[idx].clone();
        if !edit(&mut stage) {
            return Ok(false);
        }

        let op = put_stage(&stage)?;
        self.write(std::slice::from_ref(&op))?;
        self.stages[idx] = stage;
        Ok(true)
    }

    /// Persist a whole new sequence, optionally deleting one record first,
    /// then make it the current snapshot.
    fn commit_structure(&mut self, next: Vec<Stage>, deleted: Option<&str>) -> BoardResult<()> {
        let mut ops = Vec::with_capacity(next.len() + 1);
        if let Some(stage_id) = deleted {
            ops.push(StoreOp::Delete { key: stage_key(stage_id) });
        }
        for stage in &next {
            ops.push(put_stage(stage)?);
        }

        self.write(&ops)?;
        self.stages = next;
        Ok(())
    }

    fn write(&mut self, ops: &[StoreOp]) -> BoardResult<()> {
        for op in ops {
            match op {
                StoreOp::Set { key, .. } => log::debug!("Writing record {}", key),
                StoreOp::Delete { key } => log::debug!("Deleting record {}", key),
            }
        }

        if let Err(err) = self.store.write_batch(ops) {
            log::error!("Failed to persist {} record(s): {}", ops.len(), err);
            if ops.len() > 1 && !self.store.atomic_batches() {
                // Some writes may have landed; show what the store now holds
                self.resync();
            }
            return Err(err.into());
        }
        Ok(())
    }

    fn resync(&mut self) {
        match read_stages(&self.store) {
            Ok(stages) => self.stages = stages,
            Err(err) => log::error!("Failed to re-read board after write failure: {}", err),
        }
    }
}

/// Assign `order = position` to every stage
fn renumber(stages: &mut [Stage]) {
    for (idx, stage) in stages.iter_mut().enumerate() {
        stage.order = idx as i64;
    }
}

/// Read and parse every stage record, sorted by `order`.
///
/// Records that fail to parse, or whose id does not match their key, are
/// skipped with a warning rather than failing the whole load.
pub fn read_stages<S: PersistenceStore + ?Sized>(store: &S) -> Result<Vec<Stage>, StoreError> {
    let mut stages = Vec::new();
    for key in store.keys()?.into_iter().filter(|k| is_stage_key(k)) {
        let Some(raw) = store.get(&key)? else {
            continue;
        };
        match decode_stage(&raw) {
            Ok(stage) if key[STAGE_KEY_PREFIX.len()..] == stage.id => stages.push(stage),
            Ok(stage) => {
                log::warn!("Skipping record {}: it holds stage {}", key, stage.id);
            }
            Err(err) => {
                log::warn!("Skipping malformed record {}: {}", key, err);
            }
        }
    }
    stages.sort_by_key(|s| s.order);
    Ok(stages)
}
