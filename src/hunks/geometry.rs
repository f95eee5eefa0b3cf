use super::diff::HunkHeader;
use super::groups::LineId;

fn range_contains(outer_start: u32, outer_end: u32, inner_start: u32, inner_end: u32) -> bool {
    inner_start >= outer_start && inner_end <= outer_end
}

/// True when both of `b`'s ranges lie inside `a`'s. Equal ranges count.
pub fn hunk_contains_hunk(a: &HunkHeader, b: &HunkHeader) -> bool {
    range_contains(a.old_start, a.old_end(), b.old_start, b.old_end())
        && range_contains(a.new_start, a.new_end(), b.new_start, b.new_end())
}

/// True when either of the line's numbers falls in the matching range of
/// the hunk.
pub fn hunk_contains_line(hunk: &HunkHeader, line: &LineId) -> bool {
    let old = line
        .old_line
        .is_some_and(|n| n >= hunk.old_start && n < hunk.old_end());
    let new = line
        .new_line
        .is_some_and(|n| n >= hunk.new_start && n < hunk.new_end());
    old || new
}
