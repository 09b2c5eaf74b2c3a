use serde::{Deserialize, Serialize};

/// One commit from a repository's history, without its diff text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    /// Author date, strict ISO 8601 as printed by git
    pub date: String,
    pub message: String,
    pub repo: String,
}

impl CommitRecord {
    /// Milliseconds since the Unix epoch, or `None` if the date does not parse.
    pub fn timestamp_millis(&self) -> Option<i64> {
        chrono::DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|date| date.timestamp_millis())
    }
}
