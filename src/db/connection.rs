use rusqlite::Connection;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::db::migrations::MigrationManager;

/// Directory under the home directory holding the rc file and default database
const CONFIG_DIR: &str = ".stageboard";

/// Database connection manager
pub struct DbConnection;

impl DbConnection {
    /// Resolve the home directory, preferring $HOME so tests can redirect it
    fn home_dir() -> Result<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
            _ => dirs::home_dir().context("Could not determine home directory"),
        }
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(CONFIG_DIR).join("board.db"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(CONFIG_DIR).join("rc"))
    }

    /// Get database path from configuration file or default
    pub fn resolve_path() -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let config = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            if let Some(path) = parse_data_location(&config, &config_path) {
                return Ok(path);
            }
        }

        Self::default_path()
    }

    /// Connect to the database, creating it and parent directories if needed
    pub fn connect() -> Result<Connection> {
        let db_path = Self::resolve_path()?;
        Self::connect_at(&db_path)
    }

    /// Connect to a database at an explicit path
    pub fn connect_at(db_path: &Path) -> Result<Connection> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        log::debug!("Opened board database at {}", db_path.display());

        MigrationManager::initialize(&conn)
            .context("Failed to initialize database schema")?;

        Ok(conn)
    }

    /// Connect to an in-memory database (for testing)
    pub fn connect_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory()
            .context("Failed to open in-memory database")?;

        MigrationManager::initialize(&conn)
            .context("Failed to initialize database schema")?;

        Ok(conn)
    }
}

/// Find a `data.location=` line in rc file contents.
/// Relative paths resolve against the directory holding the rc file.
fn parse_data_location(config: &str, config_path: &Path) -> Option<PathBuf> {
    for line in config.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data.location=") {
            let path = PathBuf::from(value.trim());
            if path.is_relative() {
                let base = config_path.parent().unwrap_or_else(|| Path::new("."));
                return Some(base.join(path));
            }
            return Some(path);
        }
    }
    None
}
