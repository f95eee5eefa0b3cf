use super::diff::{split_hunk, tokenize, DiffLine, HunkHeader, LineKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A reference to one line of a hunk by its old and/or new line number.
///
/// Removed lines carry only `old_line`, added lines only `new_line`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
    Both,
}

impl LineId {
    /// A removed line
    pub const fn old(line: u32) -> Self {
        Self {
            old_line: Some(line),
            new_line: None,
        }
    }

    /// An added line
    pub const fn new(line: u32) -> Self {
        Self {
            old_line: None,
            new_line: Some(line),
        }
    }

    /// A context line, present on both sides
    pub const fn both(old_line: u32, new_line: u32) -> Self {
        Self {
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    /// Which side(s) of the diff this id points into, or `None` for an id
    /// with neither number set.
    pub fn side(&self) -> Option<Side> {
        match (self.old_line, self.new_line) {
            (Some(_), Some(_)) => Some(Side::Both),
            (Some(_), None) => Some(Side::Old),
            (None, Some(_)) => Some(Side::New),
            (None, None) => None,
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.old_line, self.new_line) {
            (Some(old), Some(new)) => write!(f, "{old}:{new}"),
            (Some(old), None) => write!(f, "-{old}"),
            (None, Some(new)) => write!(f, "+{new}"),
            (None, None) => write!(f, "?"),
        }
    }
}

/// Parses `-N` (removed line N), `+N` (added line N) or `N:M` (both sides).
impl FromStr for LineId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let number = |n: &str| -> anyhow::Result<u32> {
            n.parse()
                .map_err(|_| anyhow::anyhow!("invalid line number {n:?} in line id {s:?}"))
        };

        if let Some(rest) = s.strip_prefix('-') {
            Ok(Self::old(number(rest)?))
        } else if let Some(rest) = s.strip_prefix('+') {
            Ok(Self::new(number(rest)?))
        } else if let Some((old, new)) = s.split_once(':') {
            Ok(Self::both(number(old)?, number(new)?))
        } else {
            anyhow::bail!("line id {s:?} must look like -N, +N or N:M")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Added,
    Removed,
}

/// A maximal run of consecutive same-kind changed lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineGroup {
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub lines: Vec<LineId>,
}

/// Accumulator for the grouping scan. Anything that isn't a kept changed
/// line closes the open run.
#[derive(Default)]
struct GroupFold {
    groups: Vec<LineGroup>,
    current: Option<LineGroup>,
}

impl GroupFold {
    fn push(mut self, kind: GroupKind, id: LineId) -> Self {
        match self.current.as_mut() {
            Some(group) if group.kind == kind => group.lines.push(id),
            _ => {
                self.close();
                self.current = Some(LineGroup {
                    kind,
                    lines: vec![id],
                });
            }
        }
        self
    }

    fn split(mut self) -> Self {
        self.close();
        self
    }

    fn close(&mut self) {
        if let Some(group) = self.current.take() {
            self.groups.push(group);
        }
    }

    fn finish(mut self) -> Vec<LineGroup> {
        self.close();
        self.groups
    }
}

fn changed_line_id(line: &DiffLine<'_>) -> Option<(GroupKind, LineId)> {
    match (line.kind, line.old_line, line.new_line) {
        (LineKind::Removed, Some(old), _) => Some((GroupKind::Removed, LineId::old(old))),
        (LineKind::Added, _, Some(new)) => Some((GroupKind::Added, LineId::new(new))),
        _ => None,
    }
}

fn group_lines<F>(diff: &str, keep: F) -> (Vec<LineGroup>, HunkHeader)
where
    F: Fn(&LineId) -> bool,
{
    let Some((header, body)) = split_hunk(diff) else {
        tracing::debug!("no hunk header found, treating diff as empty");
        return (Vec::new(), HunkHeader::default());
    };

    let groups = tokenize(header, body)
        .iter()
        .fold(GroupFold::default(), |acc, line| match changed_line_id(line) {
            Some((kind, id)) if keep(&id) => acc.push(kind, id),
            _ => acc.split(),
        })
        .finish();

    (groups, header)
}

/// Group every changed line of a hunk into runs, in diff order, and return
/// them with the hunk's own header.
///
/// Input without a hunk header yields no groups and a zeroed header.
pub fn extract_all_groups(diff: &str) -> (Vec<LineGroup>, HunkHeader) {
    group_lines(diff, |_| true)
}

/// Like [`extract_all_groups`], but only selected lines are kept, and an
/// unselected changed line splits a run just like a context line does.
///
/// The order of `line_ids` does not matter; ids that match nothing in the
/// diff are ignored. Context ids (both numbers set) select nothing.
pub fn extract_line_groups(line_ids: &[LineId], diff: &str) -> (Vec<LineGroup>, HunkHeader) {
    let selected: HashSet<LineId> = line_ids
        .iter()
        .filter(|id| matches!(id.side(), Some(Side::Old | Side::New)))
        .copied()
        .collect();

    group_lines(diff, |id| selected.contains(id))
}

/// All changed lines of a hunk, in diff order.
pub fn changed_lines(diff: &str) -> Vec<LineId> {
    let (groups, _) = extract_all_groups(diff);
    groups.into_iter().flat_map(|g| g.lines).collect()
}
