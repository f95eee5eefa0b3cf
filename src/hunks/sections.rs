//! Display sections for a file: unchanged file content interleaved with
//! hunks, each hunk broken into context, removed and added runs.

use super::diff::{split_hunk, tokenize, Hunk, LineKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionType {
    AddedLines,
    RemovedLines,
    Context,
}

impl From<LineKind> for SectionType {
    fn from(kind: LineKind) -> Self {
        match kind {
            LineKind::Added => SectionType::AddedLines,
            LineKind::Removed => SectionType::RemovedLines,
            LineKind::Context => SectionType::Context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub before_line_number: Option<u32>,
    pub after_line_number: Option<u32>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    pub section_type: SectionType,
    pub expanded: bool,
    pub lines: Vec<Line>,
}

impl ContentSection {
    fn new(section_type: SectionType) -> Self {
        Self {
            section_type,
            expanded: true,
            lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkSectionHeader {
    pub before_start: u32,
    pub before_length: u32,
    pub after_start: u32,
    pub after_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkSection {
    pub hunk: Hunk,
    pub header: HunkSectionHeader,
    pub sub_sections: Vec<ContentSection>,
    pub has_conflict_markers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FileSection {
    Content(ContentSection),
    Hunk(HunkSection),
}

/// A file's current hunks plus the text that context lines are read from.
/// `content` is indexed by old-side line numbers.
#[derive(Debug, Clone, Default)]
pub struct LocalFile {
    pub path: String,
    pub hunks: Vec<Hunk>,
    pub content: String,
}

fn is_conflict_marker(content: &str) -> bool {
    content.starts_with("<<<<<<<")
        || content.starts_with(">>>>>>>")
        || content.trim_end() == "======="
}

/// Split a hunk into runs of context, removed and added lines.
///
/// A diff without a readable header gives a zeroed header and no runs.
pub fn parse_hunk_section(hunk: &Hunk) -> HunkSection {
    let Some((header, body)) = split_hunk(&hunk.diff) else {
        tracing::debug!("hunk has no readable header");
        return HunkSection {
            hunk: hunk.clone(),
            header: HunkSectionHeader::default(),
            sub_sections: Vec::new(),
            has_conflict_markers: false,
        };
    };

    let mut sub_sections: Vec<ContentSection> = Vec::new();
    let mut has_conflict_markers = false;

    for line in tokenize(header, body) {
        has_conflict_markers |= is_conflict_marker(line.content);

        let section_type = SectionType::from(line.kind);
        let line = Line {
            before_line_number: line.old_line,
            after_line_number: line.new_line,
            content: line.content.to_string(),
        };
        match sub_sections.last_mut() {
            Some(section) if section.section_type == section_type => section.lines.push(line),
            _ => {
                let mut section = ContentSection::new(section_type);
                section.lines.push(line);
                sub_sections.push(section);
            }
        }
    }

    HunkSection {
        hunk: hunk.clone(),
        header: HunkSectionHeader {
            before_start: header.old_start,
            before_length: header.old_lines,
            after_start: header.new_start,
            after_length: header.new_lines,
        },
        sub_sections,
        has_conflict_markers,
    }
}

/// Unchanged lines `from..to` (old-side, 1-based, end exclusive), shifted by
/// `offset` on the new side.
fn context_section(file_lines: &[&str], from: u32, to: u32, offset: i64) -> Option<ContentSection> {
    let mut section = ContentSection::new(SectionType::Context);
    for before in from..to {
        let Some(content) = file_lines.get(before as usize - 1) else {
            break;
        };
        let after = u32::try_from(i64::from(before) + offset).ok();
        section.lines.push(Line {
            before_line_number: Some(before),
            after_line_number: after,
            content: content.to_string(),
        });
    }
    (!section.lines.is_empty()).then_some(section)
}

/// Interleave a file's hunks, ordered by position, with the unchanged
/// content around them. Whole-file creations and deletions come back as
/// their hunk alone.
pub fn parse_file_sections(file: &LocalFile) -> Vec<FileSection> {
    let mut hunk_sections: Vec<HunkSection> = file.hunks.iter().map(parse_hunk_section).collect();
    hunk_sections.sort_by_key(|s| s.header.before_start);

    let whole_file = hunk_sections
        .iter()
        .any(|s| s.header.before_length == 0 || s.header.after_length == 0);
    if whole_file {
        return hunk_sections.into_iter().map(FileSection::Hunk).collect();
    }

    let file_lines: Vec<&str> = file.content.lines().collect();
    let line_count = u32::try_from(file_lines.len()).unwrap_or(u32::MAX);
    let mut sections = Vec::new();
    let mut cursor: u32 = 1;
    let mut offset: i64 = 0;

    for section in hunk_sections {
        let header = section.header;
        if let Some(context) = context_section(&file_lines, cursor, header.before_start, offset) {
            sections.push(FileSection::Content(context));
        }
        let before_end = header.before_start.saturating_add(header.before_length);
        let after_end = header.after_start.saturating_add(header.after_length);
        cursor = cursor.max(before_end);
        offset = i64::from(after_end) - i64::from(before_end);
        sections.push(FileSection::Hunk(section));
    }

    let end = line_count.saturating_add(1);
    if let Some(context) = context_section(&file_lines, cursor, end, offset) {
        sections.push(FileSection::Content(context));
    }

    sections
}
