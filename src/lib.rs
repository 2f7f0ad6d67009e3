//! Stageboard - an ordered, colored task board with local key-value persistence
//!
//! This library provides:
//! - Data models for stages and their tasks
//! - A key-value persistence layer (in-memory and SQLite backends)
//! - The board state engine that keeps stage order and records in sync
//! - CLI command parsing and board rendering
//!
//! # Example
//!
//! ```no_run
//! use stageboard::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod board;
pub mod cli;
pub mod db;
pub mod models;
pub mod store;
pub mod utils;
