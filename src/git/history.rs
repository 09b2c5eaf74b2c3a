use crate::error::Result;
use crate::git::repository::RepositoryHandle;
use crate::models::CommitRecord;

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// hash, author name, author email, strict ISO 8601 author date, subject
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%s%x1e";

impl RepositoryHandle {
    /// Most recent non-merge commits whose author matches `author`.
    ///
    /// Matching is git's `--author`: a case-sensitive basic regular expression
    /// against `Name <email>`. All refs are walked so fetched remote branches count.
    pub async fn commits_by_author(&self, author: &str, limit: usize) -> Result<Vec<CommitRecord>> {
        let max_count = format!("--max-count={}", limit);
        let author_arg = format!("--author={}", author);

        let output = self
            .run(&[
                "log",
                "--all",
                "--no-merges",
                max_count.as_str(),
                author_arg.as_str(),
                LOG_FORMAT,
            ])
            .await?;

        Ok(parse_log(&output, &self.name))
    }

    /// Diff introduced by `hash` against its parent, ignoring whitespace-only changes.
    ///
    /// `git show` also covers root commits, which have no `hash^` to diff against.
    pub async fn commit_diff(&self, hash: &str) -> Result<String> {
        self.run(&[
            "show",
            "--format=",
            "--no-color",
            "--no-ext-diff",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            "-M",
            "--ignore-all-space",
            hash,
        ])
        .await
    }
}

/// Parse `git log` output produced with `LOG_FORMAT`.
pub fn parse_log(output: &str, repo: &str) -> Vec<CommitRecord> {
    output
        .split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let fields: Vec<&str> = record.split(FIELD_SEP).collect();
            match fields.as_slice() {
                [hash, author_name, author_email, date, message] => Some(CommitRecord {
                    hash: hash.to_string(),
                    author_name: author_name.to_string(),
                    author_email: author_email.to_string(),
                    date: date.to_string(),
                    message: message.trim_end().to_string(),
                    repo: repo.to_string(),
                }),
                _ => {
                    tracing::warn!("Skipping unreadable log record in {}: {:?}", repo, record);
                    None
                }
            }
        })
        .collect()
}
