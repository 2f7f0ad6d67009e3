use clap::{Parser, Subcommand};
use crate::board::{BoardError, BoardState};
use crate::models::{Task, TaskPatch, DEFAULT_STAGE_COLOR, MAX_DESCRIPTION_LEN, MAX_LABEL_LEN, MAX_TITLE_LEN};
use crate::store::{PersistenceStore, SqliteStore};
use crate::cli::error::{join_words, normalize_color, parse_position, truncate_chars, user_error};
use crate::cli::output::{format_board, format_board_json, BoardViewOptions};
use crate::utils::parse_date_expr;
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "stageboard")]
#[command(about = "Stage board - organize tasks into ordered, colored stages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Stage management commands
    Stage {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Task management commands
    Task {
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// Add a stage at the front of the board
    Add {
        /// Background color as hex (e.g. ffcc00 or #ffcc00)
        #[arg(long, default_value = DEFAULT_STAGE_COLOR)]
        color: String,
        /// Stage label
        #[arg(trailing_var_arg = true, required = true)]
        label: Vec<String>,
    },
    /// Remove a stage and all of its tasks
    Remove {
        /// Stage position, id, or id prefix
        stage: String,
    },
    /// Change a stage's color
    Color {
        /// Stage position, id, or id prefix
        stage: String,
        /// New color as hex
        color: String,
    },
    /// Move a stage to another position
    Move {
        /// Stage position, id, or id prefix
        stage: String,
        /// Target position (1-based)
        to: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to the end of a stage
    Add {
        /// Stage position, id, or id prefix
        stage: String,
        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Due date (YYYY-MM-DD, YYYY-MM-DDTHH:MM, now, today, tomorrow)
        #[arg(long)]
        date: Option<String>,
        /// Task title
        #[arg(trailing_var_arg = true, required = true)]
        title: Vec<String>,
    },
    /// Remove a task
    Remove {
        stage: String,
        /// Task position within the stage, id, or id prefix
        task: String,
    },
    /// Mark a task as done
    Done {
        stage: String,
        task: String,
    },
    /// Mark a task as not done
    Undone {
        stage: String,
        task: String,
    },
    /// Change a task's title, description or date
    Edit {
        stage: String,
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let store = SqliteStore::open().context("Failed to open board storage")?;
    let mut board = BoardState::load(store).context("Failed to load board")?;

    match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::List { json } => handle_list(&board, json),
        Commands::Stage { subcommand } => handle_stage(&mut board, subcommand),
        Commands::Task { subcommand } => handle_task(&mut board, subcommand),
    }
}

fn handle_list<S: PersistenceStore>(board: &BoardState<S>, json: bool) -> Result<()> {
    if json {
        println!("{}", format_board_json(board.stages())?);
    } else {
        print!("{}", format_board(board.stages(), &BoardViewOptions::detect()));
    }
    Ok(())
}

fn handle_stage<S: PersistenceStore>(board: &mut BoardState<S>, cmd: StageCommands) -> Result<()> {
    match cmd {
        StageCommands::Add { color, label } => {
            let label = truncate_chars(&join_words(&label), MAX_LABEL_LEN);
            let stage = board
                .add_stage(&label, &normalize_color(&color))
                .context("Failed to add stage")?;
            println!("Created stage 1: {} ({})", stage.label, short_id(&stage.id));
        }
        StageCommands::Remove { stage } => {
            let stage_id = resolve_stage(board, &stage)?;
            let label = board.stage(&stage_id).map(|s| s.label.clone()).unwrap_or_default();
            if board.remove_stage(&stage_id).context("Failed to remove stage")? {
                println!("Removed stage: {}", label);
            }
        }
        StageCommands::Color { stage, color } => {
            let stage_id = resolve_stage(board, &stage)?;
            let color = normalize_color(&color);
            if board.set_stage_color(&stage_id, &color).context("Failed to set stage color")? {
                println!("Set color of stage {} to #{}", short_id(&stage_id), color);
            }
        }
        StageCommands::Move { stage, to } => {
            let stage_id = resolve_stage(board, &stage)?;
            let to = parse_position(&to, "stage").unwrap_or_else(|e| user_error(&e));
            if to > board.len() {
                user_error(&format!("Invalid stage position: {}. Board has {} stages.", to, board.len()));
            }
            let from = board
                .position(&stage_id)
                .ok_or_else(|| BoardError::StageNotFound(stage_id.clone()))?;
            board.reorder_stages(from, to - 1).context("Failed to move stage")?;
            println!("Moved stage {} to position {}", short_id(&stage_id), to);
        }
    }
    Ok(())
}

fn handle_task<S: PersistenceStore>(board: &mut BoardState<S>, cmd: TaskCommands) -> Result<()> {
    match cmd {
        TaskCommands::Add { stage, description, date, title } => {
            let stage_id = resolve_stage(board, &stage)?;
            let date = date.as_deref().map(parse_date_expr).transpose()?;
            let task = Task::new(
                truncate_chars(&join_words(&title), MAX_TITLE_LEN),
                truncate_chars(&description, MAX_DESCRIPTION_LEN),
                date,
            );
            let (id, title) = (task.id.clone(), task.title.clone());
            board.add_task(&stage_id, task).context("Failed to add task")?;
            println!("Created task: {} ({})", title, short_id(&id));
        }
        TaskCommands::Remove { stage, task } => {
            let stage_id = resolve_stage(board, &stage)?;
            let task_id = resolve_task(board, &stage_id, &task)?;
            if board.remove_task(&task_id, &stage_id).context("Failed to remove task")? {
                println!("Removed task {}", short_id(&task_id));
            }
        }
        TaskCommands::Done { stage, task } => set_done(board, &stage, &task, true)?,
        TaskCommands::Undone { stage, task } => set_done(board, &stage, &task, false)?,
        TaskCommands::Edit { stage, task, title, description, date } => {
            let stage_id = resolve_stage(board, &stage)?;
            let task_id = resolve_task(board, &stage_id, &task)?;
            let patch = TaskPatch {
                title: title.map(|t| truncate_chars(&t, MAX_TITLE_LEN)),
                description: description.map(|d| truncate_chars(&d, MAX_DESCRIPTION_LEN)),
                date: date.as_deref().map(parse_date_expr).transpose()?,
            };
            if patch.is_empty() {
                user_error("Nothing to change. Use --title, --description or --date.");
            }
            if board.update_task(&task_id, &stage_id, &patch).context("Failed to edit task")? {
                println!("Updated task {}", short_id(&task_id));
            }
        }
    }
    Ok(())
}

fn set_done<S: PersistenceStore>(board: &mut BoardState<S>, stage: &str, task: &str, is_done: bool) -> Result<()> {
    let stage_id = resolve_stage(board, stage)?;
    let task_id = resolve_task(board, &stage_id, task)?;
    if board.set_task_done(&task_id, &stage_id, is_done).context("Failed to update task")? {
        let state = if is_done { "done" } else { "not done" };
        println!("Marked task {} {}", short_id(&task_id), state);
    }
    Ok(())
}

/// Length of the id prefix shown to users
const SHORT_ID_LEN: usize = 8;

/// First characters of an id, for display
fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Read a reference as a 1-based position. Digit strings as long as a
/// short id are left to id matching.
fn as_position(reference: &str) -> Option<usize> {
    if reference.len() >= SHORT_ID_LEN {
        return None;
    }
    reference.parse::<usize>().ok()
}

/// Match `reference` against ids: exact match first, then a unique prefix
fn match_id<'a, I>(ids: I, reference: &str) -> Result<Option<&'a str>, String>
where
    I: Iterator<Item = &'a str> + Clone,
{
    if let Some(exact) = ids.clone().find(|id| *id == reference) {
        return Ok(Some(exact));
    }
    let mut matches = ids.filter(|id| id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(Some(id)),
        (Some(_), Some(_)) => Err(format!("Ambiguous id prefix '{}'", reference)),
        _ => Ok(None),
    }
}

/// Resolve a stage reference: 1-based position, full id, or unique id prefix
pub fn resolve_stage<S: PersistenceStore>(board: &BoardState<S>, reference: &str) -> Result<String> {
    if let Some(pos) = as_position(reference) {
        return match pos.checked_sub(1).and_then(|idx| board.stages().get(idx)) {
            Some(stage) => Ok(stage.id.clone()),
            None => Err(BoardError::StageNotFound(reference.to_string()).into()),
        };
    }
    let ids = board.stages().iter().map(|s| s.id.as_str());
    match match_id(ids, reference).map_err(anyhow::Error::msg)? {
        Some(id) => Ok(id.to_string()),
        None => Err(BoardError::StageNotFound(reference.to_string()).into()),
    }
}

/// Resolve a task reference within a stage: 1-based position, full id, or unique id prefix
pub fn resolve_task<S: PersistenceStore>(board: &BoardState<S>, stage_id: &str, reference: &str) -> Result<String> {
    let not_found = || BoardError::TaskNotFound {
        task_id: reference.to_string(),
        stage_id: stage_id.to_string(),
    };
    let stage = board
        .stage(stage_id)
        .ok_or_else(|| BoardError::StageNotFound(stage_id.to_string()))?;

    if let Some(pos) = as_position(reference) {
        return match pos.checked_sub(1).and_then(|idx| stage.tasks.get(idx)) {
            Some(task) => Ok(task.id.clone()),
            None => Err(not_found().into()),
        };
    }
    let ids = stage.tasks.iter().map(|t| t.id.as_str());
    match match_id(ids, reference).map_err(anyhow::Error::msg)? {
        Some(id) => Ok(id.to_string()),
        None => Err(not_found().into()),
    }
}
