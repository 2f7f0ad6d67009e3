// Error handling and input shaping for the command line front end

use std::process;
use crate::board::{BoardError, ErrorKind};
use crate::store::StoreError;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing stages or tasks, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit code for an error returned from `run`.
///
/// Storage failures are internal errors (2); everything else is a user
/// error (1).
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(board_err) = cause.downcast_ref::<BoardError>() {
            return match board_err.kind() {
                ErrorKind::Persistence => 2,
                _ => 1,
            };
        }
        if cause.is::<StoreError>() || cause.is::<rusqlite::Error>() || cause.is::<std::io::Error>() {
            return 2;
        }
    }
    1
}

/// Cut a string to at most `max` characters
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Strip a leading '#' and lowercase a color typed by the user
pub fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_ascii_lowercase()
}

/// Parse a 1-based position as typed by the user
pub fn parse_position(value: &str, what: &str) -> Result<usize, String> {
    value.parse::<usize>()
        .map_err(|_| format!("Invalid {} position: '{}'. Position must be a number.", what, value))
        .and_then(|pos| {
            if pos > 0 {
                Ok(pos)
            } else {
                Err(format!("Invalid {} position: 0. Positions start at 1.", what))
            }
        })
}

/// Join trailing words into one string, as typed on the command line
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}
