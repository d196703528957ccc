use serde::Serialize;
use std::collections::HashMap;

use crate::diff::{CommitDiffSummary, FileDiff};
use crate::github::CommitRecord;

/// A changed file together with its full text at the ported commit.
#[derive(Debug, Clone, Serialize)]
pub struct FileToPort {
    #[serde(flatten)]
    pub diff: FileDiff,
    /// `None` for deleted files, when content fetching is disabled, or when
    /// the fetch failed
    pub full_file_content: Option<String>,
}

/// The oldest source commit that has no tracking issue yet.
#[derive(Debug, Clone, Serialize)]
pub struct CommitToPort {
    pub commit: CommitRecord,
    pub files: Vec<FileToPort>,
    pub total_additions: usize,
    pub total_deletions: usize,
    pub total_files_changed: usize,
}

impl CommitToPort {
    /// Attach fetched contents (keyed by path) to the summary's files, keeping
    /// the diff order.
    pub fn new(
        commit: CommitRecord,
        summary: CommitDiffSummary,
        mut contents: HashMap<String, Option<String>>,
    ) -> Self {
        let files = summary
            .files
            .into_iter()
            .map(|diff| {
                let full_file_content = contents.remove(&diff.path).flatten();
                FileToPort {
                    diff,
                    full_file_content,
                }
            })
            .collect();

        Self {
            commit,
            files,
            total_additions: summary.total_additions,
            total_deletions: summary.total_deletions,
            total_files_changed: summary.total_files_changed,
        }
    }

    /// Paths of all changed files, in diff order.
    pub fn changed_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.diff.path.as_str())
    }
}
