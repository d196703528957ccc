pub mod issue;

pub use issue::{render_issue_draft, IssueDraft};

use crate::diff::{CommitDiffSummary, FileDiff, FileStatus};
use crate::github::RepoRef;
use crate::resolver::CommitToPort;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What `next` writes when an output path is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Pretty-printed JSON snapshot of the resolved commit
    Json,
    /// Markdown tracking-issue draft
    Issue,
}

/// Output the resolver result to terminal (default) or to a file.
///
/// With no pending commit, a JSON snapshot holds `null` and no issue draft is
/// written.
#[instrument(skip(next, source), fields(pending = next.is_some()))]
pub fn output_next(
    next: Option<&CommitToPort>,
    source: &RepoRef,
    output_path: Option<&Path>,
    format: FileFormat,
) -> Result<(), ReportError> {
    match (output_path, format) {
        (None, _) => {
            debug!("writing result to terminal");
            match next {
                Some(commit_to_port) => print_commit_to_port(commit_to_port),
                None => print_nothing_pending(source),
            }
            Ok(())
        }
        (Some(path), FileFormat::Json) => {
            debug!(path = %path.display(), "writing JSON snapshot");
            write_json_snapshot(&next, path)
        }
        (Some(path), FileFormat::Issue) => match next {
            Some(commit_to_port) => {
                debug!(path = %path.display(), "writing issue draft");
                write_issue_draft(&render_issue_draft(commit_to_port, source), path)
            }
            None => {
                print_nothing_pending(source);
                Ok(())
            }
        },
    }
}

/// Output a parsed diff to terminal (default) or as a JSON snapshot.
#[instrument(skip(summary), fields(files = summary.total_files_changed))]
pub fn output_summary(
    summary: &CommitDiffSummary,
    heading: &str,
    output_path: Option<&Path>,
) -> Result<(), ReportError> {
    match output_path {
        None => {
            print_summary(summary, heading);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing JSON snapshot");
            write_json_snapshot(summary, path)
        }
    }
}

/// Write any serializable value as pretty JSON.
pub fn write_json_snapshot<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ReportError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// Write the issue draft as markdown: the title as a heading, the branch, then the body.
pub fn write_issue_draft(draft: &IssueDraft, path: &Path) -> Result<(), ReportError> {
    let md = format!(
        "# {}\n\n- **Branch:** `{}`\n\n{}",
        draft.title, draft.branch, draft.body
    );
    std::fs::write(path, md)?;
    Ok(())
}

fn print_nothing_pending(source: &RepoRef) {
    println!();
    println!(
        "{} every recent commit in {} already has a tracking issue",
        "✓".green().bold(),
        source
    );
    println!();
}

/// Format and print the commit to port:
///
/// Commit 3f2a9c1: "Add retry helper"
/// Author: Ada | 2025-05-01T10:00:00Z
/// Files changed: 5 | +7 -5
///
/// ═══ src/google/adk/tools/retry.py (added) +3 -0 ═══
/// +line
fn print_commit_to_port(commit_to_port: &CommitToPort) {
    let commit = &commit_to_port.commit;
    println!();
    println!(
        "Commit {}: \"{}\"",
        commit.short_sha().yellow().bold(),
        commit.subject()
    );
    match &commit.author.date {
        Some(date) => println!("Author: {} | {}", commit.author.name, date),
        None => println!("Author: {}", commit.author.name),
    }
    println!(
        "Files changed: {} | {} {}",
        commit_to_port.total_files_changed,
        format!("+{}", commit_to_port.total_additions).green(),
        format!("-{}", commit_to_port.total_deletions).red()
    );
    println!();

    for file in &commit_to_port.files {
        print_file(&file.diff);
        if let Some(content) = &file.full_file_content {
            println!("  {}", format!("({} bytes of full content)", content.len()).dimmed());
        }
        println!();
    }
}

fn print_summary(summary: &CommitDiffSummary, heading: &str) {
    println!();
    println!("{}", heading.bold());
    println!(
        "Files changed: {} | {} {}",
        summary.total_files_changed,
        format!("+{}", summary.total_additions).green(),
        format!("-{}", summary.total_deletions).red()
    );
    println!();

    for file in &summary.files {
        print_file(file);
        println!();
    }
}

fn print_file(file: &FileDiff) {
    let path = match &file.old_path {
        Some(old) => format!("{} -> {}", old, file.path),
        None => file.path.clone(),
    };
    println!(
        "═══ {} ({}) +{} -{} ═══",
        path,
        colorize_status(file.status),
        file.additions,
        file.deletions
    );
    for line in &file.excerpt {
        println!("  {}", colorize_line(line));
    }
}

/// Helper to colorize a file status for terminal output.
fn colorize_status(status: FileStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        FileStatus::Added => label.green(),
        FileStatus::Deleted => label.red(),
        FileStatus::Renamed => label.cyan(),
        FileStatus::Modified => label.yellow(),
    }
}

fn colorize_line(line: &str) -> colored::ColoredString {
    if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.dimmed()
    }
}
