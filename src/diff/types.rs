use serde::Serialize;

/// How a file changed in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Added => write!(f, "added"),
            FileStatus::Deleted => write!(f, "deleted"),
            FileStatus::Renamed => write!(f, "renamed"),
        }
    }
}

/// A single file within a commit diff, reduced to counts and a bounded excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    /// Path after the change (the old path for deleted files)
    pub path: String,
    /// Path before the change, set for renames only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub status: FileStatus,
    /// Lines added in this file
    pub additions: usize,
    /// Lines removed in this file
    pub deletions: usize,
    /// additions + deletions
    pub changed_lines: usize,
    pub is_binary: bool,
    /// Up to `max_excerpt_lines` changed lines, plus an optional "more lines" marker
    pub excerpt: Vec<String>,
}

/// Structured, size-bounded view of a whole commit diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitDiffSummary {
    /// Files in the order their sections appeared in the raw diff
    pub files: Vec<FileDiff>,
    pub total_additions: usize,
    pub total_deletions: usize,
    pub total_files_changed: usize,
}

impl CommitDiffSummary {
    /// Build a summary whose totals are derived from `files`.
    pub fn from_files(files: Vec<FileDiff>) -> Self {
        let total_additions = files.iter().map(|f| f.additions).sum();
        let total_deletions = files.iter().map(|f| f.deletions).sum();
        let total_files_changed = files.len();
        Self {
            files,
            total_additions,
            total_deletions,
            total_files_changed,
        }
    }
}

/// Why a diff section produced no [`FileDiff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The `diff --git a/<path> b/<path>` pair could not be resolved
    MissingHeader,
    /// Neither hunk headers nor a `+++` line followed by `@@` were found
    NoHunks,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingHeader => write!(f, "missing a/ b/ header pair"),
            SkipReason::NoHunks => write!(f, "no hunks found"),
        }
    }
}

/// Result of parsing one `diff --git` section. Sections never fail the parse;
/// unusable ones are reported as `Skipped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    Parsed(FileDiff),
    Skipped(SkipReason),
}
