//! Repository lifecycle: clone, fetch and delete working copies under the root.
//!
//! Every immediate, non-hidden subdirectory of the root is one tracked repository.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use futures::future::try_join_all;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::git::cache::HandleCache;
use crate::git::repository::run_git;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid repository name pattern")
});

pub struct RepositoryManager {
    root: PathBuf,
    handles: Arc<HandleCache>,
}

impl RepositoryManager {
    pub fn new(root: impl Into<PathBuf>, handles: Arc<HandleCache>) -> Self {
        Self {
            root: root.into(),
            handles,
        }
    }

    /// Names of all tracked repositories, sorted.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let mut read_dir = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            AppError::Configuration(format!(
                "cannot read repository directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// Clone `url` into the root. A missing or blank name defaults to the last
    /// segment of the url.
    pub async fn clone_repository(&self, url: &str, name: Option<&str>) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidRequest("url is required".to_string()));
        }

        let name = match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => derive_name(url).ok_or_else(|| AppError::InvalidName(url.to_string()))?,
        };
        validate_name(&name)?;

        if tokio::fs::metadata(&self.root).await.is_err() {
            return Err(AppError::Configuration(format!(
                "repository directory {} does not exist",
                self.root.display()
            )));
        }

        let dest = self.root.join(&name);
        if tokio::fs::try_exists(&dest).await? {
            return Err(AppError::DuplicateName(name));
        }

        tracing::info!("Cloning repo {} ({}) into {}", name, url, dest.display());
        run_git(&self.root, &["clone", "--quiet", "--", url, name.as_str()]).await?;
        tracing::info!("Cloned {}", name);

        Ok(name)
    }

    /// Fetch all remotes of every tracked repository. Stops at the first failure.
    pub async fn fetch_all(&self) -> Result<Vec<String>> {
        let names = self.list_names().await?;
        tracing::info!("Updating repositories: {}", names.join(", "));

        try_join_all(names.iter().map(|name| async move {
            let handle = self.handles.get(name);
            handle
                .run(&["fetch", "--all", "--prune", "--quiet"])
                .await
                .map_err(|e| AppError::Fetch {
                    repo: name.clone(),
                    source: Box::new(e),
                })?;
            tracing::info!("Fetched {}", name);
            Ok::<_, AppError>(())
        }))
        .await?;

        Ok(names)
    }

    /// Remove a tracked repository's working copy.
    pub async fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        let dest = self.root.join(name);
        let is_dir = tokio::fs::metadata(&dest)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(AppError::NotFound(name.to_string()));
        }

        // Wait for git processes already running in this working copy
        let handle = self.handles.get(name);
        let _permit = handle.lock().await?;

        tokio::fs::remove_dir_all(&dest).await?;
        tracing::info!("Deleted repository {}", name);
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(AppError::InvalidName(name.to_string()))
    }
}

/// Last path segment of a clone url without its extension:
/// `https://host/org/tool.git` and `git@host:org/tool.git` both give `tool`.
pub fn derive_name(url: &str) -> Option<String> {
    let segment = url
        .trim_end_matches('/')
        .rsplit(['/', ':', '\\'])
        .next()
        .filter(|segment| !segment.is_empty())?;

    let stem = match segment.rfind('.') {
        Some(0) | None => segment,
        Some(idx) => &segment[..idx],
    };

    Some(stem.to_string())
}
