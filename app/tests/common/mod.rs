//! Test helper module for E2E tests
//!
//! Provides `TestFixture` for easy test setup with file and git operations.

#![allow(dead_code)] // Test helpers may not be used in all test modules
#![allow(deprecated)] // cargo_bin() deprecation

pub mod mcp;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::path::PathBuf;
use std::process::Command as StdCommand;

/// Test fixture providing a temporary project tree with helper methods
/// for file operations, git commands, and running the `rf` CLI.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Root path of the project tree (canonical, so it matches tracked paths)
    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    // ============ File Operations ============

    /// Add a file with content (creates parent dirs automatically)
    pub fn add_file(&self, path: &str, content: &str) -> &Self {
        self.dir.child(path).write_str(content).unwrap();
        self
    }

    /// Add a file with raw bytes
    pub fn add_binary(&self, path: &str, bytes: &[u8]) -> &Self {
        self.dir.child(path).write_binary(bytes).unwrap();
        self
    }

    pub fn remove_file(&self, path: &str) -> &Self {
        std::fs::remove_file(self.root().join(path)).unwrap();
        self
    }

    // ============ Git Operations ============

    /// Initialize as git repo with test user config
    pub fn git_init(&self) -> &Self {
        self.git(&["init"]);
        self.git(&["config", "user.email", "test@test.com"]);
        self.git(&["config", "user.name", "Test"]);
        self
    }

    /// Stage all files and create a commit
    pub fn git_commit(&self, msg: &str) -> &Self {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-m", msg, "--allow-empty"]);
        self
    }

    pub fn git(&self, args: &[&str]) -> std::process::Output {
        StdCommand::new("git")
            .args(args)
            .current_dir(self.root())
            .output()
            .expect("git command failed")
    }

    // ============ rf CLI ============

    /// Create a Command for running `rf` - note: --root must come AFTER subcommand
    pub fn rf(&self) -> Command {
        let mut cmd = Command::cargo_bin("rf").unwrap();
        cmd.current_dir(self.root());
        cmd.env_remove("REFFIND_SKIP_EXTS");
        cmd
    }

    /// Run `rf find` for one reference, excluding `item`
    pub fn find(&self, item: &str, reference: &str) -> std::process::Output {
        self.rf()
            .arg("find")
            .arg("--root")
            .arg(self.root())
            .arg("--item")
            .arg(self.path(item))
            .arg(reference)
            .output()
            .expect("rf find failed")
    }

    /// Run `rf find-file`, excluding `item`
    pub fn find_file(&self, item: &str, path: &str, keyword: Option<&str>) -> std::process::Output {
        let mut cmd = self.rf();
        cmd.arg("find-file")
            .arg("--root")
            .arg(self.root())
            .arg("--item")
            .arg(self.path(item));
        if let Some(keyword) = keyword {
            cmd.arg("--keyword").arg(keyword);
        }
        cmd.arg(path).output().expect("rf find-file failed")
    }

    /// Run `rf tracked` and return the listed paths
    pub fn tracked(&self) -> Vec<String> {
        let output = self
            .rf()
            .arg("tracked")
            .arg("--root")
            .arg(self.root())
            .output()
            .expect("rf tracked failed");
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(String::from)
            .collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
