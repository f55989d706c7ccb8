//! Git-backed sync of the skills directory.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const COMMIT_MESSAGE: &str = "Update skills";
const BRANCHES: [&str; 2] = ["main", "master"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub remote: Option<String>,
    /// `git status --short` lines
    pub changes: Vec<String>,
}

impl SyncStatus {
    pub fn is_synced(&self) -> bool {
        self.changes.is_empty()
    }
}

pub struct GitSync {
    dir: PathBuf,
}

impl GitSync {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_repo(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// Point `origin` at `url`, initializing the repository first if needed.
    pub fn set_remote(&self, url: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        if !self.is_repo() {
            self.run_checked(&["init"])?;
            tracing::info!(dir = %self.dir.display(), "Initialized skills repository");
        }

        // Absent on a fresh repository
        self.run(&["remote", "remove", "origin"])?;
        self.run_checked(&["remote", "add", "origin", url])?;
        tracing::info!(remote = %url, "Set sync remote");
        Ok(())
    }

    /// Commit any local changes and push them, trying `main` then `master`.
    pub fn push(&self) -> Result<()> {
        self.ensure_repo()?;
        self.run_checked(&["add", "-A"])?;

        let status = self.run_checked(&["status", "--porcelain"])?;
        if !stdout(&status).trim().is_empty() {
            self.run_checked(&["commit", "-m", COMMIT_MESSAGE])?;
        }

        self.on_first_branch(|branch| vec!["push", "-u", "origin", branch])
            .context("git push failed")
    }

    /// Pull from `origin`, trying `main` then `master`.
    pub fn pull(&self) -> Result<()> {
        self.ensure_repo()?;
        self.on_first_branch(|branch| vec!["pull", "origin", branch])
            .context("git pull failed")
    }

    pub fn status(&self) -> Result<SyncStatus> {
        self.ensure_repo()?;

        let remote = self.run(&["remote", "get-url", "origin"])?;
        let remote = remote
            .status
            .success()
            .then(|| stdout(&remote).trim().to_string())
            .filter(|r| !r.is_empty());

        let status = self.run_checked(&["status", "--short"])?;
        let changes = stdout(&status)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();

        Ok(SyncStatus { remote, changes })
    }

    fn ensure_repo(&self) -> Result<()> {
        if self.is_repo() {
            Ok(())
        } else {
            Err(anyhow!(
                "skills directory {} is not a git repository. Use 'skillforge sync --remote <url>' to initialize",
                self.dir.display()
            ))
        }
    }

    fn on_first_branch<'a>(&self, args: impl Fn(&'a str) -> Vec<&'a str>) -> Result<()> {
        let mut last_error = String::new();
        for branch in BRANCHES {
            let output = self.run(&args(branch))?;
            if output.status.success() {
                return Ok(());
            }
            last_error = String::from_utf8_lossy(&output.stderr).trim().to_string();
        }
        Err(anyhow!(last_error))
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(args = ?args, dir = %self.dir.display(), "Running git command");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .with_context(|| format!("Failed to run git in {}", self.dir.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(args = ?args, stderr = %stderr.trim(), "Git command failed");
        }
        Ok(output)
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
