// Input validation for board mutations.
// The core rejects bad input outright; truncating to the caps is the front end's job.

use crate::models::{is_hex_color, Task, MAX_DESCRIPTION_LEN, MAX_LABEL_LEN, MAX_TITLE_LEN};
use super::error::{BoardError, BoardResult};

fn check_required(value: &str, field: &'static str, max: usize) -> BoardResult<()> {
    if value.trim().is_empty() {
        return Err(BoardError::EmptyField { field });
    }
    check_len(value, field, max)
}

fn check_len(value: &str, field: &'static str, max: usize) -> BoardResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(BoardError::TooLong { field, len, max });
    }
    Ok(())
}

pub fn validate_label(label: &str) -> BoardResult<()> {
    check_required(label, "label", MAX_LABEL_LEN)
}

pub fn validate_color(color: &str) -> BoardResult<()> {
    if is_hex_color(color) {
        Ok(())
    } else {
        Err(BoardError::InvalidColor(color.to_string()))
    }
}

pub fn validate_task(task: &Task) -> BoardResult<()> {
    check_required(&task.title, "title", MAX_TITLE_LEN)?;
    check_len(&task.description, "description", MAX_DESCRIPTION_LEN)
}
