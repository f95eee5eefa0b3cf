mod diff;
mod geometry;
mod groups;
mod headers;
mod locks;
mod sections;

pub use diff::{
    parse_diff, split_hunk, tokenize, DiffFile, DiffLine, FileStatus, Hunk, HunkHeader, LineKind,
};
pub use geometry::{hunk_contains_hunk, hunk_contains_line};
pub use groups::{
    changed_lines, extract_all_groups, extract_line_groups, GroupKind, LineGroup, LineId, Side,
};
pub use headers::{
    diff_to_hunk_headers, hunk_header_equals, line_ids_to_hunk_headers, order_headers, Action,
};
pub use locks::{get_line_locks, HunkLock, LineLock, Lock};
pub use sections::{
    parse_file_sections, parse_hunk_section, ContentSection, FileSection, HunkSection,
    HunkSectionHeader, Line, LocalFile, SectionType,
};
