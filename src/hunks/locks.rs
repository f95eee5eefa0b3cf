use super::diff::{Hunk, HunkHeader};
use super::geometry::hunk_contains_line;
use super::groups::changed_lines;
use serde::{Deserialize, Serialize};

/// Ownership of a change by another stack's commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    pub stack_id: String,
    pub commit_id: String,
}

/// A range owned by the given locks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunkLock {
    pub hunk: HunkHeader,
    pub locks: Vec<Lock>,
}

/// The locks that apply to a single changed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineLock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line: Option<u32>,
    pub locks: Vec<Lock>,
}

/// Attribute locks to the changed lines of `hunk`.
///
/// Only lines with at least one lock are returned. The flag is true when
/// the hunk has changed lines and every one of them is locked.
pub fn get_line_locks(hunk: &Hunk, hunk_locks: &[HunkLock]) -> (bool, Vec<LineLock>) {
    let lines = changed_lines(&hunk.diff);
    let mut line_locks = Vec::new();

    for line in &lines {
        let mut locks: Vec<Lock> = Vec::new();
        for entry in hunk_locks {
            if !hunk_contains_line(&entry.hunk, line) {
                continue;
            }
            for lock in &entry.locks {
                if !locks.contains(lock) {
                    locks.push(lock.clone());
                }
            }
        }
        if !locks.is_empty() {
            line_locks.push(LineLock {
                old_line: line.old_line,
                new_line: line.new_line,
                locks,
            });
        }
    }

    let fully_locked = !lines.is_empty() && line_locks.len() == lines.len();
    (fully_locked, line_locks)
}
