// Output formatting utilities

use crate::models::{Stage, Task};
use crate::utils::format_date;
use anyhow::Result;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_STRIKE: &str = "\x1b[9m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_BLACK: &str = "\x1b[30m";
const ANSI_FG_WHITE: &str = "\x1b[97m";

/// Indent for task lines under a stage header
const TASK_INDENT: &str = "   ";
/// Indent for description lines under a task
const DESCRIPTION_INDENT: &str = "         ";

/// Rendering options for the board view
#[derive(Debug, Clone, Copy)]
pub struct BoardViewOptions {
    pub use_color: bool,
    pub width: usize,
}

impl BoardViewOptions {
    /// Options for the current stdout
    pub fn detect() -> Self {
        Self {
            use_color: is_tty(),
            width: get_terminal_width(),
        }
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    100
}

/// Parse a bare hex color (`fc0` or `ffcc00`) into RGB
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let expanded: String = match color.len() {
        3 => color.chars().flat_map(|c| [c, c]).collect(),
        6 => color.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Pick black or white text for readability on a background color
fn contrasting_fg(rgb: (u8, u8, u8)) -> &'static str {
    let (r, g, b) = rgb;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 150.0 {
        ANSI_FG_BLACK
    } else {
        ANSI_FG_WHITE
    }
}

/// Cut text to `max` characters, marking the cut with "..."
fn truncate_display(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut cut: String = text.chars().take(max - 3).collect();
    cut.push_str("...");
    cut
}

fn format_stage_header(position: usize, stage: &Stage, opts: &BoardViewOptions) -> String {
    let text = format!(
        " {}. {} ({}/{} done) ",
        position,
        stage.label,
        stage.done_count(),
        stage.tasks.len()
    );
    let text = truncate_display(&text, opts.width.max(10));

    if !opts.use_color {
        return format!("{} #{}", text, stage.color);
    }
    match hex_to_rgb(&stage.color) {
        Some(rgb) => format!(
            "{}\x1b[48;2;{};{};{}m{}{}{}",
            ANSI_BOLD, rgb.0, rgb.1, rgb.2, contrasting_fg(rgb), text, ANSI_RESET
        ),
        None => format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET),
    }
}

fn format_task_line(position: usize, task: &Task, opts: &BoardViewOptions) -> String {
    let checkbox = if task.is_done { "[x]" } else { "[ ]" };
    let prefix = format!("{}{}. {} ", TASK_INDENT, position, checkbox);
    let date = format!("  {}", format_date(&task.date));
    let room = opts
        .width
        .saturating_sub(prefix.chars().count() + date.chars().count())
        .max(10);
    let title = truncate_display(&task.title, room);

    if opts.use_color && task.is_done {
        format!("{}{}{}{}{}{}{}", prefix, ANSI_STRIKE, title, ANSI_RESET, ANSI_DIM, date, ANSI_RESET)
    } else {
        format!("{}{}{}", prefix, title, date)
    }
}

/// Render the whole board as text
pub fn format_board(stages: &[Stage], opts: &BoardViewOptions) -> String {
    if stages.is_empty() {
        return "No stages. Add one with: stageboard stage add <label>\n".to_string();
    }

    let mut out = String::new();
    for (idx, stage) in stages.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format_stage_header(idx + 1, stage, opts));
        out.push('\n');

        if stage.tasks.is_empty() {
            out.push_str(TASK_INDENT);
            out.push_str("(no tasks)\n");
            continue;
        }
        for (task_idx, task) in stage.tasks.iter().enumerate() {
            out.push_str(&format_task_line(task_idx + 1, task, opts));
            out.push('\n');
            if !task.description.is_empty() {
                let room = opts.width.saturating_sub(DESCRIPTION_INDENT.len()).max(10);
                // Descriptions can be multi-line; show the first line only
                let first_line = task.description.lines().next().unwrap_or("");
                out.push_str(DESCRIPTION_INDENT);
                out.push_str(&truncate_display(first_line, room));
                out.push('\n');
            }
        }
    }
    out
}

/// Render the board as pretty JSON, in stored record shape
pub fn format_board_json(stages: &[Stage]) -> Result<String> {
    Ok(serde_json::to_string_pretty(stages)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(width: usize) -> BoardViewOptions {
        BoardViewOptions { use_color: false, width }
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("ffcc00"), Some((255, 204, 0)));
        assert_eq!(hex_to_rgb("fc0"), Some((255, 204, 0)));
        assert_eq!(hex_to_rgb("zzzzzz"), None);
        assert_eq!(hex_to_rgb("ffff"), None);
    }

    #[test]
    fn test_contrasting_fg() {
        assert_eq!(contrasting_fg((255, 255, 255)), ANSI_FG_BLACK);
        assert_eq!(contrasting_fg((0, 0, 80)), ANSI_FG_WHITE);
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("short", 10), "short");
        assert_eq!(truncate_display("a long title here", 10), "a long ...");
    }

    #[test]
    fn test_format_empty_board() {
        assert!(format_board(&[], &plain(80)).contains("No stages"));
    }

    #[test]
    fn test_format_board_lists_stages_and_tasks() {
        let mut todo = Stage::new("Todo".to_string(), "ffffff".to_string());
        let mut task = Task::new("Buy milk".to_string(), "2 litres".to_string(), None);
        task.is_done = true;
        todo.tasks.push(task);
        let doing = Stage::new("Doing".to_string(), "00ff00".to_string());

        let out = format_board(&[todo, doing], &plain(80));
        assert!(out.contains("1. Todo (1/1 done)"));
        assert!(out.contains("[x] Buy milk"));
        assert!(out.contains("2 litres"));
        assert!(out.contains("2. Doing (0/0 done)"));
        assert!(out.contains("(no tasks)"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_format_board_colors_header_on_tty() {
        let stage = Stage::new("Todo".to_string(), "000000".to_string());
        let out = format_board(&[stage], &BoardViewOptions { use_color: true, width: 80 });
        assert!(out.contains("\x1b[48;2;0;0;0m"));
    }

    #[test]
    fn test_format_board_json_shape() {
        let stage = Stage::new("Todo".to_string(), "ffffff".to_string());
        let json = format_board_json(&[stage]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["label"], "Todo");
        assert_eq!(value[0]["order"], 0);
    }
}
