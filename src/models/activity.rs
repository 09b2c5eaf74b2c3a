use serde::{Deserialize, Serialize};

use super::{CommitRecord, FileChange};

/// A changed file from one commit, as returned by the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityItem {
    #[serde(flatten)]
    pub change: FileChange,
    pub commit: CommitRecord,
    /// Commit date in milliseconds since the Unix epoch
    pub timestamp: i64,
}
