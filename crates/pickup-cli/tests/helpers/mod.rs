use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary database
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("pickup.db");

        Self { temp_dir, db_path }
    }

    /// Command running in the temp dir, so no stray `pickup.toml` is picked up
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pickup").expect("Failed to find pickup binary");
        cmd.current_dir(self.temp_dir.path())
            .env("PICKUP_DATABASE_PATH", &self.db_path)
            .env_remove("PICKUP_PRINCIPAL")
            .env_remove("PICKUP_OUTPUT")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs as `login` with JSON output and parses stdout.
    pub fn json_as(&self, login: &str, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .args(["--as", login, "--output", "json"])
            .args(args)
            .output()
            .expect("Failed to run pickup");
        assert!(
            output.status.success(),
            "pickup {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }

    /// Two groups, three students, an office admin and a supervisor of the
    /// first group.
    ///
    /// Ids: Ladybirds = 1 (Anna = 1, Ben = 2), Hedgehogs = 2 (Carl = 3).
    pub fn seed_school(&self) {
        let commands: [&[&str]; 9] = [
            &["roster", "group-add", "Ladybirds"],
            &["roster", "group-add", "Hedgehogs"],
            &["roster", "student-add", "Anna", "--group", "1"],
            &["roster", "student-add", "Ben", "--group", "1"],
            &["roster", "student-add", "Carl", "--group", "2"],
            &["roster", "staff-add", "office", "School Office"],
            &["roster", "grant", "office", "pickup:admin"],
            &["roster", "staff-add", "meier", "Ms Meier"],
            &["roster", "supervise", "1", "meier"],
        ];
        for args in commands {
            self.run_success(args);
        }
    }
}

pub mod assertions {
    use predicates::prelude::*;

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
    }
}
