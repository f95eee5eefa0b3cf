use crate::hunks::{
    diff_to_hunk_headers, line_ids_to_hunk_headers, order_headers, Action, DiffFile, Hunk,
    HunkHeader, LineId,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of a hunk's diff text (for staleness detection)
pub fn diff_fingerprint(diff: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(diff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The selected lines of one hunk. No lines means the whole hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkSelection {
    pub header: HunkHeader,
    #[serde(default)]
    pub lines: Vec<LineId>,
    /// Fingerprint of the hunk's diff when the selection was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_hash: Option<String>,
}

impl HunkSelection {
    pub fn whole(header: HunkHeader) -> Self {
        Self {
            header,
            lines: Vec::new(),
            diff_hash: None,
        }
    }

    pub fn lines(header: HunkHeader, lines: Vec<LineId>) -> Self {
        Self {
            header,
            lines,
            diff_hash: None,
        }
    }

    pub fn is_whole(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Selections for one file of a diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSelection {
    pub path: String,
    #[serde(default)]
    pub hunks: Vec<HunkSelection>,
}

/// What the backend's commit command takes for one file. Empty
/// `hunk_headers` means the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSpec {
    pub path: String,
    pub previous_path: Option<String>,
    pub hunk_headers: Vec<HunkHeader>,
}

fn find_hunk<'a>(file_hunks: &'a [Hunk], header: &HunkHeader) -> Option<&'a Hunk> {
    file_hunks.iter().find(|hunk| hunk.header() == *header)
}

fn is_whole_file(file_hunks: &[Hunk], selections: &[HunkSelection]) -> bool {
    selections.len() == file_hunks.len()
        && selections
            .iter()
            .all(|s| s.is_whole() && find_hunk(file_hunks, &s.header).is_some())
}

/// Turn the selections within one file into commit headers, ordered by
/// position in the file.
///
/// Returns an empty list when the selections add up to every hunk of the
/// file. Selections whose hunk no longer exists are skipped.
pub fn process_hunk_headers(file_hunks: &[Hunk], selections: &[HunkSelection]) -> Vec<HunkHeader> {
    if is_whole_file(file_hunks, selections) {
        return Vec::new();
    }

    let mut headers = Vec::new();
    for selection in selections {
        let Some(hunk) = find_hunk(file_hunks, &selection.header) else {
            tracing::warn!(header = %selection.header, "selected hunk is no longer in the diff, skipping");
            continue;
        };

        if let Some(expected) = &selection.diff_hash {
            if *expected != diff_fingerprint(&hunk.diff) {
                tracing::warn!(header = %selection.header, "hunk changed since it was selected");
            }
        }

        if selection.is_whole() {
            headers.extend(diff_to_hunk_headers(&hunk.diff, Action::Commit));
        } else {
            headers.extend(line_ids_to_hunk_headers(
                &selection.lines,
                &hunk.diff,
                Action::Commit,
            ));
        }
    }

    headers.sort_by(order_headers);
    headers
}

/// Assemble the commit payload for one file.
pub fn build_diff_spec(file: &DiffFile, selections: &[HunkSelection]) -> DiffSpec {
    DiffSpec {
        path: file.path.clone(),
        previous_path: file.previous_path().map(str::to_string),
        hunk_headers: process_hunk_headers(&file.hunks, selections),
    }
}
