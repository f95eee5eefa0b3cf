use serde::{Deserialize, Serialize};
use std::fmt;

/// The `@@ -old_start,old_lines +new_start,new_lines @@` line of a hunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

impl HunkHeader {
    pub const fn new(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> Self {
        Self {
            old_start,
            old_lines,
            new_start,
            new_lines,
        }
    }

    /// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()".
    ///
    /// Signs are dropped and a missing count means 1. Anything after the
    /// closing `@@` is ignored. Ranges that would run past `u32::MAX` are
    /// rejected.
    pub fn parse(line: &str) -> Option<Self> {
        let after_first = line.trim_start().strip_prefix("@@")?;
        let end_idx = after_first.find("@@")?;
        let range_str = &after_first[..end_idx];

        let mut parts = range_str.split_whitespace();
        let old = parts.next()?;
        let new = parts.next()?;
        if !old.starts_with('-') || !new.starts_with('+') {
            return None;
        }

        let (old_start, old_lines) = parse_range(old)?;
        let (new_start, new_lines) = parse_range(new)?;
        // Both ranges must end inside u32
        old_start.checked_add(old_lines)?;
        new_start.checked_add(new_lines)?;

        Some(Self::new(old_start, old_lines, new_start, new_lines))
    }

    /// One past the last old-side line covered by this header
    pub fn old_end(&self) -> u32 {
        self.old_start.saturating_add(self.old_lines)
    }

    /// One past the last new-side line covered by this header
    pub fn new_end(&self) -> u32 {
        self.new_start.saturating_add(self.new_lines)
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

/// Parse "start,count" or just "start" (count defaults to 1).
/// Leading signs are stripped so "-3,2" and "+3,2" read the same.
fn parse_range(s: &str) -> Option<(u32, u32)> {
    let s = s.trim_start_matches(['-', '+']);
    if let Some((start, count)) = s.split_once(',') {
        Some((parse_abs(start)?, parse_abs(count)?))
    } else {
        Some((parse_abs(s)?, 1))
    }
}

fn parse_abs(s: &str) -> Option<u32> {
    let n: i64 = s.trim().parse().ok()?;
    u32::try_from(n.unsigned_abs()).ok()
}

/// A hunk as handed over by the backend: its header fields plus the full
/// diff text, header line included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub diff: String,
}

impl Hunk {
    /// Build a hunk whose ranges are read from the diff's own header line.
    pub fn from_diff(diff: impl Into<String>) -> Self {
        let diff = diff.into();
        let header = diff
            .lines()
            .next()
            .and_then(HunkHeader::parse)
            .unwrap_or_default();
        Self {
            old_start: header.old_start,
            old_lines: header.old_lines,
            new_start: header.new_start,
            new_lines: header.new_lines,
            diff,
        }
    }

    pub fn header(&self) -> HunkHeader {
        HunkHeader::new(self.old_start, self.old_lines, self.new_start, self.new_lines)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

/// A single line in a diff hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine<'a> {
    pub kind: LineKind,
    pub content: &'a str,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
}

/// Split a hunk's diff text into its parsed header and its body lines.
/// Returns `None` when the first line is not a hunk header.
pub fn split_hunk(diff: &str) -> Option<(HunkHeader, std::str::Lines<'_>)> {
    let mut lines = diff.lines();
    let header = HunkHeader::parse(lines.next()?)?;
    Some((header, lines))
}

/// Number the body lines of a hunk, starting from the header's start lines.
///
/// Lines that start with neither `+` nor `-` count as context, blank lines
/// included. The `\\ No newline at end of file` marker is dropped. Numbering
/// stops at the first line whose successor would not fit in a `u32`.
pub fn tokenize<'a>(
    header: HunkHeader,
    body: impl IntoIterator<Item = &'a str>,
) -> Vec<DiffLine<'a>> {
    let mut old_line = header.old_start;
    let mut new_line = header.new_start;
    let mut out = Vec::new();

    for line in body {
        if line.starts_with('\\') {
            continue;
        }
        let (kind, content) = if let Some(content) = line.strip_prefix('-') {
            (LineKind::Removed, content)
        } else if let Some(content) = line.strip_prefix('+') {
            (LineKind::Added, content)
        } else {
            (LineKind::Context, line.strip_prefix(' ').unwrap_or(line))
        };

        let diff_line = DiffLine {
            kind,
            content,
            old_line: (kind != LineKind::Added).then_some(old_line),
            new_line: (kind != LineKind::Removed).then_some(new_line),
        };
        let next_old = advance(old_line, diff_line.old_line);
        let next_new = advance(new_line, diff_line.new_line);
        out.push(diff_line);

        let (Some(next_old), Some(next_new)) = (next_old, next_new) else {
            tracing::debug!("line numbers overflow, ignoring the rest of the hunk");
            break;
        };
        old_line = next_old;
        new_line = next_new;
    }

    out
}

fn advance(counter: u32, used: Option<u32>) -> Option<u32> {
    match used {
        Some(_) => counter.checked_add(1),
        None => Some(counter),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "subject")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed(String), // old path
}

/// A file in a `git diff` listing with its hunks
#[derive(Debug, Clone)]
pub struct DiffFile {
    pub path: String,
    pub status: FileStatus,
    pub hunks: Vec<Hunk>,
}

impl DiffFile {
    pub fn previous_path(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Renamed(old) => Some(old),
            _ => None,
        }
    }
}

/// Parse `git diff` output into files with per-hunk diff text.
///
/// Input without any `diff --git` line is treated as the hunks of a single
/// anonymous file.
pub fn parse_diff(raw: &str) -> Vec<DiffFile> {
    let mut files: Vec<DiffFile> = Vec::new();
    let mut current_file: Option<DiffFile> = None;
    let mut current_hunk: Option<String> = None;
    // File header lines are only recognized before the file's first hunk
    let mut in_file_header = false;

    fn flush_hunk(hunk: Option<String>, file: &mut Option<DiffFile>) {
        if let (Some(text), Some(file)) = (hunk, file.as_mut()) {
            file.hunks.push(Hunk::from_diff(text));
        }
    }

    for line in raw.lines() {
        // New file header: diff --git a/path b/path
        if line.starts_with("diff --git") {
            flush_hunk(current_hunk.take(), &mut current_file);
            if let Some(file) = current_file.take() {
                files.push(file);
            }

            let path = line.split(" b/").last().unwrap_or("").to_string();
            current_file = Some(DiffFile {
                path,
                status: FileStatus::Modified, // refined below
                hunks: Vec::new(),
            });
            in_file_header = true;
            continue;
        }

        if in_file_header {
            if let Some(ref mut file) = current_file {
                if line.starts_with("new file") {
                    file.status = FileStatus::Added;
                    continue;
                }
                if line.starts_with("deleted file") {
                    file.status = FileStatus::Deleted;
                    continue;
                }
                if let Some(old_path) = line.strip_prefix("rename from ") {
                    file.status = FileStatus::Renamed(old_path.to_string());
                    continue;
                }
                if !line.starts_with("@@") {
                    // index, ---, +++, mode and similarity lines
                    continue;
                }
            }
        }

        if line.starts_with("@@") {
            flush_hunk(current_hunk.take(), &mut current_file);
            if current_file.is_none() {
                current_file = Some(DiffFile {
                    path: String::new(),
                    status: FileStatus::Modified,
                    hunks: Vec::new(),
                });
            }
            in_file_header = false;
            current_hunk = Some(line.to_string());
            continue;
        }

        if let Some(ref mut hunk) = current_hunk {
            hunk.push('\n');
            hunk.push_str(line);
        }
    }

    flush_hunk(current_hunk, &mut current_file);
    if let Some(file) = current_file {
        files.push(file);
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hunk_header() {
        let h = HunkHeader::parse("@@ -10,4 +10,15 @@ impl Foo").unwrap();
        assert_eq!(h, HunkHeader::new(10, 4, 10, 15));
    }

    #[test]
    fn test_parse_hunk_header_without_counts() {
        let h = HunkHeader::parse("@@ -3 +5 @@").unwrap();
        assert_eq!(h, HunkHeader::new(3, 1, 5, 1));
    }

    #[test]
    fn test_parse_hunk_header_zero_sides() {
        assert_eq!(
            HunkHeader::parse("@@ -0,0 +1,3 @@"),
            Some(HunkHeader::new(0, 0, 1, 3))
        );
        assert_eq!(
            HunkHeader::parse("@@ -1,3 +0,0 @@"),
            Some(HunkHeader::new(1, 3, 0, 0))
        );
    }

    #[test]
    fn test_parse_hunk_header_rejects_garbage() {
        assert_eq!(HunkHeader::parse("not a real diff"), None);
        assert_eq!(HunkHeader::parse("@@ nope @@"), None);
        assert_eq!(HunkHeader::parse("@@ -1,x +1,2 @@"), None);
        assert_eq!(HunkHeader::parse(""), None);
    }

    #[test]
    fn test_parse_hunk_header_rejects_overflowing_ranges() {
        assert_eq!(HunkHeader::parse("@@ -4294967295,1 +1,1 @@"), None);
        assert_eq!(HunkHeader::parse("@@ -1,1 +4294967290,10 @@"), None);
        assert_eq!(
            HunkHeader::parse("@@ -4294967294,1 +1,1 @@"),
            Some(HunkHeader::new(u32::MAX - 1, 1, 1, 1))
        );
    }

    #[test]
    fn test_header_display_round_trips() {
        let h = HunkHeader::new(3, 7, 3, 8);
        assert_eq!(h.to_string(), "@@ -3,7 +3,8 @@");
        assert_eq!(HunkHeader::parse(&h.to_string()), Some(h));
    }

    #[test]
    fn test_header_serializes_camel_case() {
        let json = serde_json::to_string(&HunkHeader::new(2, 1, 0, 0)).unwrap();
        assert_eq!(
            json,
            r#"{"oldStart":2,"oldLines":1,"newStart":0,"newLines":0}"#
        );
    }

    #[test]
    fn test_tokenize_numbers_lines() {
        let (header, body) = split_hunk("@@ -1,3 +1,3 @@\n a\n-b\n+B\n c").unwrap();
        let lines = tokenize(header, body);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].kind, LineKind::Removed);
        assert_eq!((lines[1].old_line, lines[1].new_line), (Some(2), None));
        assert_eq!(lines[2].kind, LineKind::Added);
        assert_eq!((lines[2].old_line, lines[2].new_line), (None, Some(2)));
        assert_eq!((lines[3].old_line, lines[3].new_line), (Some(3), Some(3)));
        assert_eq!(lines[3].content, "c");
    }

    #[test]
    fn test_tokenize_skips_no_newline_marker() {
        let (header, body) =
            split_hunk("@@ -1,1 +1,1 @@\n-old\n\\ No newline at end of file\n+new").unwrap();
        let lines = tokenize(header, body);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].new_line, Some(1));
    }

    #[test]
    fn test_tokenize_context_without_leading_space() {
        let (header, body) = split_hunk("@@ -1,3 +1,3 @@\n line 1\nline 2\n\n-line 3").unwrap();
        let lines = tokenize(header, body);
        assert_eq!(lines[1].kind, LineKind::Context);
        assert_eq!(lines[1].content, "line 2");
        assert_eq!((lines[1].old_line, lines[1].new_line), (Some(2), Some(2)));
        assert_eq!(lines[2].content, "");
        assert_eq!(lines[3].old_line, Some(4));
    }

    #[test]
    fn test_tokenize_stops_at_last_line_number() {
        let header = HunkHeader::new(u32::MAX - 1, 3, 1, 0);
        let lines = tokenize(header, ["-a", "-b", "-c"]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].old_line, Some(u32::MAX));
    }

    #[test]
    fn test_hunk_from_diff_reads_header() {
        let hunk = Hunk::from_diff("@@ -3,7 +3,8 @@\n a");
        assert_eq!(hunk.header(), HunkHeader::new(3, 7, 3, 8));
        assert_eq!(Hunk::from_diff("garbage").header(), HunkHeader::default());
    }

    #[test]
    fn test_parse_simple_diff() {
        let raw = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@ fn main()
 fn main() {
+    println!("hello");
     let x = 1;
 }
"#;
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/main.rs");
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(files[0].hunks.len(), 1);
        assert_eq!(files[0].hunks[0].header(), HunkHeader::new(1, 3, 1, 4));
        assert_eq!(files[0].hunks[0].diff.lines().count(), 5);
    }

    #[test]
    fn test_parse_new_file() {
        let raw = r#"diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn hello() {}
+fn world() {}
"#;
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Added);
        assert_eq!(files[0].hunks[0].header(), HunkHeader::new(0, 0, 1, 2));
    }

    #[test]
    fn test_parse_rename_and_multiple_files() {
        let raw = r#"diff --git a/old.rs b/new.rs
similarity index 90%
rename from old.rs
rename to new.rs
--- a/old.rs
+++ b/new.rs
@@ -1,2 +1,2 @@
-a
+b
 c
diff --git a/gone.rs b/gone.rs
deleted file mode 100644
--- a/gone.rs
+++ /dev/null
@@ -1,1 +0,0 @@
-bye
"#;
        let files = parse_diff(raw);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].previous_path(), Some("old.rs"));
        assert_eq!(files[1].status, FileStatus::Deleted);
        assert_eq!(files[1].hunks[0].diff, "@@ -1,1 +0,0 @@\n-bye");
    }

    #[test]
    fn test_parse_keeps_removed_lines_that_look_like_headers() {
        let raw = "diff --git a/a.md b/a.md\n--- a/a.md\n+++ b/a.md\n@@ -1,2 +1,1 @@\n--- a rule\n keep\n";
        let files = parse_diff(raw);
        assert_eq!(files[0].hunks[0].diff, "@@ -1,2 +1,1 @@\n--- a rule\n keep");
    }

    #[test]
    fn test_parse_bare_hunks() {
        let raw = "@@ -1,1 +1,1 @@\n-a\n+b\n@@ -9,1 +9,2 @@\n x\n+y\n";
        let files = parse_diff(raw);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "");
        assert_eq!(files[0].hunks.len(), 2);
        assert_eq!(files[0].hunks[1].header(), HunkHeader::new(9, 1, 9, 2));
    }
}
