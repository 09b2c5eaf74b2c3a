//! Unified diff parsing.
//!
//! Turns the text printed by `git show`/`git diff` into `FileChange` records.
//! Parsing never fails: lines that do not fit the format are skipped, so a
//! malformed or binary section degrades to a file with no hunks.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ChangeKind, FileChange, Hunk, LineChange, LineType};

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header pattern")
});

/// Parse a unified diff covering any number of files.
pub fn parse_unified_diff(text: &str) -> Vec<FileChange> {
    let mut files = Vec::new();
    let mut current: Option<FileBuilder> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                files.push(file.finish());
            }
            current = Some(FileBuilder::new(rest));
            continue;
        }

        // Anything before the first file header (commit preamble) is ignored
        if let Some(file) = current.as_mut() {
            file.push_line(line);
        }
    }

    if let Some(file) = current.take() {
        files.push(file.finish());
    }

    files
}

struct FileBuilder {
    old_path: Option<String>,
    new_path: Option<String>,
    new_file: bool,
    deleted_file: bool,
    renamed: bool,
    is_binary: bool,
    hunks: Vec<Hunk>,
    open: Option<OpenHunk>,
}

/// A hunk still receiving lines, with the counts left from its header.
struct OpenHunk {
    hunk: Hunk,
    old_remaining: u32,
    new_remaining: u32,
    old_line: u32,
    new_line: u32,
}

impl FileBuilder {
    fn new(header: &str) -> Self {
        let (old_path, new_path) = match split_header_paths(header) {
            Some((old, new)) => (clean_path(old, "a/"), clean_path(new, "b/")),
            None => (None, None),
        };

        Self {
            old_path,
            new_path,
            new_file: false,
            deleted_file: false,
            renamed: false,
            is_binary: false,
            hunks: Vec::new(),
            open: None,
        }
    }

    fn push_line(&mut self, line: &str) {
        if let Some(open) = self.open.as_mut() {
            if open.is_open() && open.accept(line) {
                return;
            }
            self.close_hunk();
        }

        if line.starts_with("@@") {
            self.open = OpenHunk::parse(line);
        } else if let Some(path) = line.strip_prefix("--- ") {
            self.old_path = clean_path(path, "a/");
        } else if let Some(path) = line.strip_prefix("+++ ") {
            self.new_path = clean_path(path, "b/");
        } else if let Some(path) = line.strip_prefix("rename from ") {
            self.renamed = true;
            self.old_path = Some(unquote(path));
        } else if let Some(path) = line.strip_prefix("rename to ") {
            self.renamed = true;
            self.new_path = Some(unquote(path));
        } else if line.starts_with("new file mode") {
            self.new_file = true;
        } else if line.starts_with("deleted file mode") {
            self.deleted_file = true;
        } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
            self.is_binary = true;
        }
    }

    fn close_hunk(&mut self) {
        if let Some(open) = self.open.take() {
            self.hunks.push(open.hunk);
        }
    }

    fn finish(mut self) -> FileChange {
        self.close_hunk();

        if self.new_file {
            self.old_path = None;
        }
        if self.deleted_file {
            self.new_path = None;
        }

        let kind = if self.renamed {
            ChangeKind::Renamed
        } else if self.old_path.is_none() && self.new_path.is_some() {
            ChangeKind::Added
        } else if self.new_path.is_none() && self.old_path.is_some() {
            ChangeKind::Deleted
        } else {
            ChangeKind::Modified
        };

        let count = |line_type: LineType| {
            self.hunks
                .iter()
                .flat_map(|hunk| hunk.changes.iter())
                .filter(|change| change.line_type == line_type)
                .count()
        };
        let additions = count(LineType::Insert);
        let deletions = count(LineType::Delete);

        FileChange {
            new_path: self.new_path,
            old_path: self.old_path,
            kind,
            is_binary: self.is_binary,
            additions,
            deletions,
            hunks: self.hunks,
        }
    }
}

impl OpenHunk {
    fn parse(header: &str) -> Option<Self> {
        let caps = HUNK_HEADER_RE.captures(header)?;
        let number = |idx: usize, default: u32| -> Option<u32> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(default),
            }
        };

        let old_start = number(1, 0)?;
        let old_lines = number(2, 1)?;
        let new_start = number(3, 0)?;
        let new_lines = number(4, 1)?;

        Some(Self {
            hunk: Hunk {
                header: header.to_string(),
                old_start,
                old_lines,
                new_start,
                new_lines,
                changes: Vec::new(),
            },
            old_remaining: old_lines,
            new_remaining: new_lines,
            old_line: old_start,
            new_line: new_start,
        })
    }

    fn is_open(&self) -> bool {
        self.old_remaining > 0 || self.new_remaining > 0
    }

    /// Record one body line. Returns false if the line does not belong to a hunk.
    fn accept(&mut self, line: &str) -> bool {
        let (line_type, content) = match line.as_bytes().first() {
            Some(b'+') => (LineType::Insert, &line[1..]),
            Some(b'-') => (LineType::Delete, &line[1..]),
            Some(b' ') => (LineType::Normal, &line[1..]),
            // Some tools strip the trailing space of empty context lines
            None => (LineType::Normal, ""),
            Some(b'\\') => return true,
            Some(_) => return false,
        };

        let (old_line, new_line) = match line_type {
            LineType::Insert => {
                let new = self.new_line;
                self.new_line += 1;
                self.new_remaining = self.new_remaining.saturating_sub(1);
                (None, Some(new))
            }
            LineType::Delete => {
                let old = self.old_line;
                self.old_line += 1;
                self.old_remaining = self.old_remaining.saturating_sub(1);
                (Some(old), None)
            }
            LineType::Normal => {
                let (old, new) = (self.old_line, self.new_line);
                self.old_line += 1;
                self.new_line += 1;
                self.old_remaining = self.old_remaining.saturating_sub(1);
                self.new_remaining = self.new_remaining.saturating_sub(1);
                (Some(old), Some(new))
            }
        };

        self.hunk.changes.push(LineChange {
            line_type,
            content: content.to_string(),
            old_line,
            new_line,
        });
        true
    }
}

/// Split `a/<old> b/<new>` from a `diff --git` line into its two raw paths.
fn split_header_paths(header: &str) -> Option<(&str, &str)> {
    if header.starts_with('"') {
        let end = closing_quote(header)?;
        let (old, rest) = header.split_at(end + 1);
        return Some((old, rest.trim_start()));
    }

    if let Some(idx) = header.find(" \"b/") {
        return Some((&header[..idx], &header[idx + 1..]));
    }

    // Paths may contain spaces: prefer the split where both sides name the same file
    let splits: Vec<usize> = header.match_indices(" b/").map(|(idx, _)| idx).collect();
    let idx = splits
        .iter()
        .copied()
        .find(|&idx| header[..idx].strip_prefix("a/") == Some(&header[idx + 3..]))
        .or_else(|| splits.last().copied())?;

    Some((&header[..idx], &header[idx + 1..]))
}

fn closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices().skip(1) {
        match ch {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

fn clean_path(raw: &str, prefix: &str) -> Option<String> {
    let raw = raw.trim_end_matches('\t');
    if raw == "/dev/null" {
        return None;
    }
    let path = unquote(raw);
    Some(path.strip_prefix(prefix).map(str::to_string).unwrap_or(path))
}

/// Undo git's C-style quoting of unusual paths (`"a/caf\303\251.ts"`).
fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return raw.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let next = bytes[i + 1];
        match next {
            b'0'..=b'7' => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take(3)
                    .take_while(|b| (b'0'..=b'7').contains(b))
                    .count();
                let value = bytes[i + 1..i + 1 + digits]
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                out.push(value as u8);
                i += 1 + digits;
            }
            _ => {
                out.push(match next {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    other => other,
                });
                i += 2;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADD_ONE_LINE: &str = "\
diff --git a/src/a.ts b/src/a.ts
index 83db48f..bf269f4 100644
--- a/src/a.ts
+++ b/src/a.ts
@@ -1,2 +1,3 @@
 export const a = 1;
+export const b = 2;
 export const c = 3;
";

    #[test]
    fn empty_diff_yields_no_files() {
        assert!(parse_unified_diff("").is_empty());
        assert!(parse_unified_diff("\n\n").is_empty());
    }

    #[test]
    fn single_insertion() {
        let files = parse_unified_diff(ADD_ONE_LINE);
        assert_eq!(files.len(), 1);

        let file = &files[0];
        assert_eq!(file.new_path.as_deref(), Some("src/a.ts"));
        assert_eq!(file.old_path.as_deref(), Some("src/a.ts"));
        assert_eq!(file.kind, ChangeKind::Modified);
        assert_eq!(file.hunks.len(), 1);
        assert_eq!((file.additions, file.deletions), (1, 0));

        let hunk = &file.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines), (1, 2, 1, 3));
        let inserts: Vec<_> = hunk
            .changes
            .iter()
            .filter(|c| c.line_type == LineType::Insert)
            .collect();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].content, "export const b = 2;");
        assert_eq!(inserts[0].new_line, Some(2));
        assert_eq!(inserts[0].old_line, None);
        assert!(file.has_insertions());
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(parse_unified_diff(ADD_ONE_LINE), parse_unified_diff(ADD_ONE_LINE));
    }

    #[test]
    fn preamble_before_first_file_is_ignored() {
        let text = format!("\n{}", ADD_ONE_LINE);
        assert_eq!(parse_unified_diff(&text), parse_unified_diff(ADD_ONE_LINE));
    }

    #[test]
    fn new_and_deleted_files() {
        let text = "\
diff --git a/src/new.ts b/src/new.ts
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/src/new.ts
@@ -0,0 +1 @@
+hello
diff --git a/src/old.ts b/src/old.ts
deleted file mode 100644
index e69de29..0000000
--- a/src/old.ts
+++ /dev/null
@@ -1 +0,0 @@
-bye
";
        let files = parse_unified_diff(text);
        assert_eq!(files.len(), 2);

        assert_eq!(files[0].kind, ChangeKind::Added);
        assert_eq!(files[0].old_path, None);
        assert_eq!(files[0].new_path.as_deref(), Some("src/new.ts"));
        assert!(files[0].has_insertions());

        assert_eq!(files[1].kind, ChangeKind::Deleted);
        assert_eq!(files[1].new_path, None);
        assert_eq!(files[1].old_path.as_deref(), Some("src/old.ts"));
        assert!(!files[1].has_insertions());
        assert_eq!(files[1].deletions, 1);
    }

    #[test]
    fn pure_rename_has_no_hunks() {
        let text = "\
diff --git a/src/before.ts b/src/after.ts
similarity index 100%
rename from src/before.ts
rename to src/after.ts
";
        let files = parse_unified_diff(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind, ChangeKind::Renamed);
        assert_eq!(files[0].old_path.as_deref(), Some("src/before.ts"));
        assert_eq!(files[0].new_path.as_deref(), Some("src/after.ts"));
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn rename_with_edits_keeps_hunks() {
        let text = "\
diff --git a/lib/x.rs b/lib/y.rs
similarity index 80%
rename from lib/x.rs
rename to lib/y.rs
index 1111111..2222222 100644
--- a/lib/x.rs
+++ b/lib/y.rs
@@ -1 +1,2 @@
 fn x() {}
+fn y() {}
";
        let files = parse_unified_diff(text);
        assert_eq!(files[0].kind, ChangeKind::Renamed);
        assert_eq!(files[0].new_path.as_deref(), Some("lib/y.rs"));
        assert_eq!(files[0].additions, 1);
    }

    #[test]
    fn binary_file_has_no_hunks() {
        let text = "\
diff --git a/assets/logo.png b/assets/logo.png
new file mode 100644
index 0000000..3f4e2a1
Binary files /dev/null and b/assets/logo.png differ
";
        let files = parse_unified_diff(text);
        assert_eq!(files.len(), 1);
        assert!(files[0].is_binary);
        assert!(files[0].hunks.is_empty());
        assert!(!files[0].has_insertions());
        assert_eq!(files[0].new_path.as_deref(), Some("assets/logo.png"));
        assert_eq!(files[0].kind, ChangeKind::Added);
    }

    #[test]
    fn removed_line_that_looks_like_a_header_stays_in_hunk() {
        let text = "\
diff --git a/notes.md b/notes.md
index 1111111..2222222 100644
--- a/notes.md
+++ b/notes.md
@@ -1,2 +1,1 @@
--- old rule
 keep
";
        let files = parse_unified_diff(text);
        assert_eq!(files[0].old_path.as_deref(), Some("notes.md"));
        assert_eq!(files[0].hunks[0].changes.len(), 2);
        assert_eq!(files[0].hunks[0].changes[0].line_type, LineType::Delete);
        assert_eq!(files[0].hunks[0].changes[0].content, "-- old rule");
    }

    #[test]
    fn multiple_hunks_and_no_newline_marker() {
        let text = "\
diff --git a/a.py b/a.py
index 1111111..2222222 100644
--- a/a.py
+++ b/a.py
@@ -1,2 +1,2 @@ def top():
-x = 1
+x = 2
 y = 3
@@ -10 +10 @@
-z = 1
\\ No newline at end of file
+z = 2
\\ No newline at end of file
";
        let files = parse_unified_diff(text);
        let hunks = &files[0].hunks;
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].header, "@@ -1,2 +1,2 @@ def top():");
        assert_eq!(hunks[1].changes.len(), 2);
        assert_eq!(hunks[1].changes[1].new_line, Some(10));
        assert_eq!((files[0].additions, files[0].deletions), (2, 2));
    }

    #[test]
    fn malformed_hunk_header_degrades_to_no_hunks() {
        let text = "\
diff --git a/a.ts b/a.ts
--- a/a.ts
+++ b/a.ts
@@ garbage @@
+line
";
        let files = parse_unified_diff(text);
        assert_eq!(files.len(), 1);
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn quoted_and_spaced_paths() {
        let text = "\
diff --git \"a/caf\\303\\251.ts\" \"b/caf\\303\\251.ts\"
new file mode 100644
Binary files /dev/null and \"b/caf\\303\\251.ts\" differ
diff --git a/my dir/b.ts b/my dir/b.ts
similarity index 100%
";
        let files = parse_unified_diff(text);
        assert_eq!(files[0].new_path.as_deref(), Some("café.ts"));
        assert_eq!(files[1].new_path.as_deref(), Some("my dir/b.ts"));
        assert_eq!(files[1].old_path.as_deref(), Some("my dir/b.ts"));
    }
}
