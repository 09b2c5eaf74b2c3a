//! Parsed unified-diff DTOs.
//!
//! - `FileChange`: One file's changes within a single commit
//! - `Hunk`: Contiguous block of changes with its `@@` range header
//! - `LineChange`: Single line (insert, delete, or normal context)
//!
//! Produced by `git::diff::parse_unified_diff`, serialized inside activity items.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileChange {
    /// Path after the change, `None` when the file was deleted
    pub new_path: Option<String>,
    /// Path before the change, `None` when the file was added
    pub old_path: Option<String>,
    pub kind: ChangeKind,
    pub is_binary: bool,
    pub additions: usize,
    pub deletions: usize,
    pub hunks: Vec<Hunk>,
}

impl FileChange {
    /// True if any hunk holds at least one inserted line.
    pub fn has_insertions(&self) -> bool {
        self.hunks
            .iter()
            .flat_map(|hunk| hunk.changes.iter())
            .any(|change| change.line_type == LineType::Insert)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hunk {
    pub header: String,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub changes: Vec<LineChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineChange {
    #[serde(rename = "type")]
    pub line_type: LineType,
    pub content: String,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Insert,
    Delete,
    Normal,
}
