// Shared harness for tests that run the stageboard binary.
// HOME is process-global, so tests that touch it take the lock first.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

pub fn lock_test_env() -> MutexGuard<'static, ()> {
    static TEST_ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    TEST_ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// A temporary home directory with an rc file pointing at a fresh database
pub struct TestHome {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    _guard: MutexGuard<'static, ()>,
}

impl TestHome {
    pub fn new() -> Self {
        let guard = lock_test_env();
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("board.db");

        let config_dir = temp_dir.path().join(".stageboard");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("rc"), format!("data.location={}\n", db_path.display())).unwrap();

        Self {
            temp_dir,
            db_path,
            _guard: guard,
        }
    }

    /// The stageboard binary with HOME redirected here
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("stageboard").unwrap();
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run a command that must succeed and return its stdout
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).assert().success();
        String::from_utf8(output.get_output().stdout.clone()).unwrap()
    }

    /// Board contents as JSON, via `list --json`
    pub fn board_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.run_ok(&["list", "--json"])).unwrap()
    }
}
