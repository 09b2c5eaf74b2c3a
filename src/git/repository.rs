use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{AppError, Result};

/// Execution context for git subcommands against one working copy.
///
/// Holds a single permit: at most one git process runs per repository at a time.
#[derive(Debug)]
pub struct RepositoryHandle {
    pub name: String,
    pub path: PathBuf,
    permits: Semaphore,
}

impl RepositoryHandle {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            permits: Semaphore::new(1),
        }
    }

    /// Run `git <args>` in the working copy and return its stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let _permit = self.lock().await?;
        run_git(&self.path, args).await
    }

    /// Wait until no git process is running for this repository and keep it that way
    /// while the returned permit is alive.
    pub async fn lock(&self) -> Result<SemaphorePermit<'_>> {
        self.permits.acquire().await.map_err(|_| AppError::Git {
            command: "lock".to_string(),
            message: format!("handle for {} is closed", self.name),
        })
    }
}

/// Run `git <args>` with `dir` as working directory and return its stdout.
///
/// Repository discovery never leaves `dir`: a plain directory nested inside
/// another checkout is not treated as part of it.
pub async fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let command = args.first().copied().unwrap_or_default().to_string();
    tracing::debug!(dir = %dir.display(), ?args, "running git");

    let mut cmd = Command::new("git");
    cmd.args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .kill_on_drop(true);

    // Ceiling entries must be absolute and symlink-free to match git's own view of the cwd
    if let Some(ceiling) = ceiling_for(dir).await {
        cmd.env("GIT_CEILING_DIRECTORIES", ceiling);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| AppError::Git {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(AppError::Git {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn ceiling_for(dir: &Path) -> Option<PathBuf> {
    let dir = tokio::fs::canonicalize(dir).await.ok()?;
    dir.parent().map(Path::to_path_buf)
}
