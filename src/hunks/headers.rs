use super::diff::HunkHeader;
use super::groups::{extract_all_groups, extract_line_groups, GroupKind, LineGroup, LineId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// What the generated headers will be used for on the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Revert the lines in the working tree. The untouched side keeps the
    /// whole range of the parent hunk.
    Discard,
    /// Take the lines into a commit. The untouched side is zeroed.
    #[default]
    Commit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Discard => write!(f, "discard"),
            Action::Commit => write!(f, "commit"),
        }
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discard" => Ok(Action::Discard),
            "commit" => Ok(Action::Commit),
            other => anyhow::bail!("unknown action {other:?}, expected commit or discard"),
        }
    }
}

/// Header for one group: the group's own side covers exactly its lines, the
/// other side follows `action`.
fn group_header(group: &LineGroup, parent: HunkHeader, action: Action) -> Option<HunkHeader> {
    let first = group.lines.first()?;
    let count = u32::try_from(group.lines.len()).unwrap_or(u32::MAX);

    let header = match (group.kind, action) {
        (GroupKind::Removed, Action::Discard) => {
            HunkHeader::new(first.old_line?, count, parent.new_start, parent.new_lines)
        }
        (GroupKind::Removed, Action::Commit) => HunkHeader::new(first.old_line?, count, 0, 0),
        (GroupKind::Added, Action::Discard) => {
            HunkHeader::new(parent.old_start, parent.old_lines, first.new_line?, count)
        }
        (GroupKind::Added, Action::Commit) => HunkHeader::new(0, 0, first.new_line?, count),
    };
    Some(header)
}

fn groups_to_headers(groups: &[LineGroup], parent: HunkHeader, action: Action) -> Vec<HunkHeader> {
    groups
        .iter()
        .filter_map(|group| group_header(group, parent, action))
        .collect()
}

/// Headers that describe exactly the selected lines of one hunk.
///
/// One header is produced per contiguous run of selected lines, in diff
/// order, whatever the order of `line_ids`.
pub fn line_ids_to_hunk_headers(line_ids: &[LineId], diff: &str, action: Action) -> Vec<HunkHeader> {
    if line_ids.is_empty() {
        return Vec::new();
    }
    let (groups, parent) = extract_line_groups(line_ids, diff);
    groups_to_headers(&groups, parent, action)
}

/// Headers for every change in a hunk: one per removed run and one per
/// added run.
pub fn diff_to_hunk_headers(diff: &str, action: Action) -> Vec<HunkHeader> {
    let (groups, parent) = extract_all_groups(diff);
    groups_to_headers(&groups, parent, action)
}

/// Position used to interleave headers: the new start, or the old start when
/// the new side is zeroed.
fn sort_key(header: &HunkHeader) -> u32 {
    if header.new_start != 0 {
        header.new_start
    } else {
        header.old_start
    }
}

/// Comparator for `sort_by`. Being a stable sort, headers with the same
/// position keep their input order.
pub fn order_headers(a: &HunkHeader, b: &HunkHeader) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

pub fn hunk_header_equals(a: &HunkHeader, b: &HunkHeader) -> bool {
    a == b
}
