use serde::Serialize;

use crate::github::RepoRef;
use crate::resolver::marker::format_commit_marker;
use crate::resolver::CommitToPort;

const TITLE_PREFIX: &str = "[NEW COMMIT IN PYTHON VERSION]";
const SUBJECT_MAX_CHARS: usize = 60;
const LISTED_FILES: usize = 10;

/// Title and markdown body of the tracking issue that claims a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    /// Feature branch the port is expected to land on
    pub branch: String,
}

/// Render the tracking issue for `commit_to_port`. The title carries the
/// `[commit:<short_sha>]` marker the resolver reads back.
pub fn render_issue_draft(commit_to_port: &CommitToPort, source: &RepoRef) -> IssueDraft {
    let commit = &commit_to_port.commit;
    let short = commit.short_sha();

    let title = format!(
        "{} {} {}",
        TITLE_PREFIX,
        format_commit_marker(&commit.sha),
        brief_subject(commit.subject())
    );

    let mut body = String::new();
    body.push_str("## Commit Information\n\n");
    body.push_str(&format!(
        "- **Source commit:** [`{}`](https://github.com/{}/commit/{})\n",
        short, source, commit.sha
    ));
    body.push_str(&format!("- **Repository:** {}\n", source));
    if !commit.author.name.is_empty() {
        body.push_str(&format!("- **Author:** {}\n", commit.author.name));
    }
    if let Some(date) = &commit.author.date {
        body.push_str(&format!("- **Date:** {}\n", date));
    }
    body.push_str(&format!("- **Message:** {}\n\n", commit.message.trim()));

    body.push_str(&format!(
        "## Files Changed ({} files)\n\n",
        commit_to_port.total_files_changed
    ));
    for file in commit_to_port.files.iter().take(LISTED_FILES) {
        body.push_str(&format!("- `{}` ({})\n", file.diff.path, file.diff.status));
    }
    if commit_to_port.files.len() > LISTED_FILES {
        body.push_str(&format!(
            "- ... and {} more files\n",
            commit_to_port.files.len() - LISTED_FILES
        ));
    }

    body.push_str("\n## Change Statistics\n\n");
    body.push_str(&format!("- **Total additions:** {}\n", commit_to_port.total_additions));
    body.push_str(&format!("- **Total deletions:** {}\n", commit_to_port.total_deletions));

    IssueDraft {
        title,
        body,
        branch: format!("port-{}", short),
    }
}

fn brief_subject(subject: &str) -> String {
    if subject.chars().count() > SUBJECT_MAX_CHARS {
        let cut: String = subject.chars().take(SUBJECT_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        subject.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_diff;
    use crate::github::types::{CommitAuthor, CommitRecord};
    use crate::resolver::marker::extract_commit_marker;
    use std::collections::HashMap;

    const SHA: &str = "3f2a9c1d4e5b6a7980112233445566778899aabb";

    fn sample(message: &str) -> CommitToPort {
        let commit = CommitRecord {
            sha: SHA.to_string(),
            message: message.to_string(),
            author: CommitAuthor {
                name: "Ada".to_string(),
                date: Some("2025-05-01T10:00:00Z".to_string()),
                ..Default::default()
            },
            html_url: None,
        };
        let summary = parse_diff(include_str!("../../tests/fixtures/sample_commit.patch"), 10);
        CommitToPort::new(commit, summary, HashMap::new())
    }

    fn source() -> RepoRef {
        "google/adk-python".parse().unwrap()
    }

    #[test]
    fn test_title_carries_short_marker() {
        let draft = render_issue_draft(&sample("Add retry helper\n\nLonger body"), &source());
        assert_eq!(
            draft.title,
            "[NEW COMMIT IN PYTHON VERSION] [commit:3f2a9c1] Add retry helper"
        );
        assert_eq!(extract_commit_marker(&draft.title), Some("3f2a9c1"));
        assert_eq!(draft.branch, "port-3f2a9c1");
    }

    #[test]
    fn test_long_subject_is_cut() {
        let subject = "x".repeat(75);
        let draft = render_issue_draft(&sample(&subject), &source());
        assert!(draft.title.ends_with(&format!("{}...", "x".repeat(60))));
        assert!(!draft.title.contains(&"x".repeat(61)));
    }

    #[test]
    fn test_subject_of_exactly_sixty_chars_is_kept() {
        let subject = "y".repeat(60);
        let draft = render_issue_draft(&sample(&subject), &source());
        assert!(draft.title.ends_with(&subject));
        assert!(!draft.title.ends_with("..."));
    }

    #[test]
    fn test_body_lists_files_and_stats() {
        let draft = render_issue_draft(&sample("Add retry helper"), &source());
        assert!(draft
            .body
            .contains("https://github.com/google/adk-python/commit/3f2a9c1d4e5b6a7980112233445566778899aabb"));
        assert!(draft.body.contains("## Files Changed (5 files)"));
        assert!(draft.body.contains("- `src/google/adk/tools/retry.py` (added)"));
        assert!(draft.body.contains("- **Total additions:** 7"));
        assert!(draft.body.contains("- **Total deletions:** 5"));
        assert!(draft.body.contains("- **Author:** Ada"));
    }
}
