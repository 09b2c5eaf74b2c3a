//! Runtime configuration.
//!
//! Built once in `main` from CLI flags / environment variables and shared
//! read-only through `AppContext`.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{AppError, Result};

/// Common source-file extensions.
pub const DEFAULT_FILE_FILTER: &str =
    r"\.(ts|tsx|js|jsx|mjs|cjs|rs|go|py|java|kt|c|h|cc|cpp|hpp|cs|rb|php|swift|scala)$";

#[derive(Debug, Clone)]
pub struct Config {
    pub repository_dir: PathBuf,
    pub file_filter: FileFilter,
    /// Maximum number of items in one activity response
    pub activity_limit: usize,
    /// Commits read from each repository per activity query
    pub commits_per_repository: usize,
}

impl Config {
    pub fn new(
        repository_dir: impl AsRef<Path>,
        file_filter: &str,
        activity_limit: usize,
        commits_per_repository: usize,
    ) -> Result<Self> {
        if activity_limit == 0 {
            return Err(AppError::Configuration("activity limit must be positive".to_string()));
        }
        if commits_per_repository == 0 {
            return Err(AppError::Configuration(
                "commits per repository must be positive".to_string(),
            ));
        }

        Ok(Self {
            repository_dir: repository_dir.as_ref().to_path_buf(),
            file_filter: FileFilter::new(file_filter)?,
            activity_limit,
            commits_per_repository,
        })
    }
}

/// Compiled pattern matched against the new path of each changed file.
#[derive(Debug, Clone)]
pub struct FileFilter(Regex);

impl FileFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| {
                AppError::Configuration(format!("invalid file filter {:?}: {}", pattern, e))
            })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.0.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_matches_source_files() {
        let filter = FileFilter::new(DEFAULT_FILE_FILTER).unwrap();
        assert!(filter.is_match("src/a.ts"));
        assert!(filter.is_match("crates/core/src/lib.rs"));
        assert!(!filter.is_match("README.md"));
        assert!(!filter.is_match("src/a.ts.bak"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(FileFilter::new("(unclosed"), Err(AppError::Configuration(_))));
        assert!(Config::new("repos", "[", 20, 20).is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(Config::new("repos", DEFAULT_FILE_FILTER, 0, 20).is_err());
        assert!(Config::new("repos", DEFAULT_FILE_FILTER, 20, 0).is_err());
        assert!(Config::new("repos", DEFAULT_FILE_FILTER, 20, 20).is_ok());
    }
}
