pub mod excerpt;
pub mod types;

pub use types::{CommitDiffSummary, FileDiff, FileStatus, SectionOutcome, SkipReason};

use tracing::debug;

const SECTION_HEADER: &str = "diff --git ";

/// Parse a unified diff (as served by GitHub's `application/vnd.github.diff`
/// media type) into a size-bounded summary.
///
/// Parsing is best-effort: a section without a resolvable `a/` `b/` header
/// pair or without hunks is dropped rather than failing the whole diff.
/// Binary sections are kept with a sentinel excerpt and zero line counts.
pub fn parse_diff(raw_diff: &str, max_excerpt_lines: usize) -> CommitDiffSummary {
    let files: Vec<FileDiff> = parse_sections(raw_diff, max_excerpt_lines)
        .into_iter()
        .filter_map(|outcome| match outcome {
            SectionOutcome::Parsed(file) => Some(file),
            SectionOutcome::Skipped(reason) => {
                debug!(%reason, "skipping diff section");
                None
            }
        })
        .collect();

    CommitDiffSummary::from_files(files)
}

/// Parse every `diff --git` section, reporting skipped sections explicitly.
///
/// Text before the first section header is ignored.
pub fn parse_sections(raw_diff: &str, max_excerpt_lines: usize) -> Vec<SectionOutcome> {
    if raw_diff.trim().is_empty() {
        return Vec::new();
    }

    split_sections(raw_diff)
        .iter()
        .map(|section| parse_section(section, max_excerpt_lines))
        .collect()
}

fn split_sections(raw_diff: &str) -> Vec<Vec<&str>> {
    let mut sections = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in raw_diff.lines() {
        if line.starts_with(SECTION_HEADER) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(vec![line]);
        } else if let Some(section) = current.as_mut() {
            section.push(line);
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

fn parse_section(lines: &[&str], max_excerpt_lines: usize) -> SectionOutcome {
    let Some((from_path, to_path)) = lines.first().and_then(|line| parse_header(line)) else {
        return SectionOutcome::Skipped(SkipReason::MissingHeader);
    };

    // Markers count anywhere in the section, changed lines included.
    let has_marker = |marker: &str| lines.iter().any(|line| line.contains(marker));

    let (status, path) = if has_marker("new file mode") {
        (FileStatus::Added, to_path)
    } else if has_marker("deleted file mode") {
        (FileStatus::Deleted, from_path)
    } else if from_path != to_path {
        (FileStatus::Renamed, to_path)
    } else {
        (FileStatus::Modified, to_path)
    };
    let old_path = (status == FileStatus::Renamed).then(|| from_path.to_string());

    if has_marker("Binary files") || has_marker("GIT binary patch") {
        return SectionOutcome::Parsed(FileDiff {
            path: path.to_string(),
            old_path,
            status,
            additions: 0,
            deletions: 0,
            changed_lines: 0,
            is_binary: true,
            excerpt: vec![excerpt::BINARY_SENTINEL.to_string()],
        });
    }

    let hunk_lines = match lines.iter().position(|line| line.starts_with("@@")) {
        Some(start) => lines[start..].to_vec(),
        None => match fallback_hunk_lines(lines) {
            Some(found) => found,
            None => return SectionOutcome::Skipped(SkipReason::NoHunks),
        },
    };

    let changed: Vec<&str> = hunk_lines
        .into_iter()
        .filter(|line| line.starts_with('+') || line.starts_with('-'))
        .collect();
    let additions = changed.iter().filter(|line| line.starts_with('+')).count();
    let deletions = changed.len() - additions;

    SectionOutcome::Parsed(FileDiff {
        path: path.to_string(),
        old_path,
        status,
        additions,
        deletions,
        changed_lines: additions + deletions,
        is_binary: false,
        excerpt: excerpt::build_excerpt(&changed, max_excerpt_lines),
    })
}

/// Split `diff --git a/<from> b/<to>` into its two paths. `<from>` ends at the
/// first ` b/`.
fn parse_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("diff --git a/")?;
    let (from_path, to_path) = rest.split_once(" b/")?;
    if from_path.is_empty() || to_path.is_empty() {
        return None;
    }
    Some((from_path, to_path))
}

/// Hunk region for sections whose hunk headers do not start a line: everything
/// from the first `@@` at or after the `+++` line.
fn fallback_hunk_lines<'a>(lines: &[&'a str]) -> Option<Vec<&'a str>> {
    let plus_header = lines.iter().position(|line| line.starts_with("+++"))?;
    lines
        .iter()
        .enumerate()
        .skip(plus_header)
        .find_map(|(index, line)| line.find("@@").map(|offset| (index, offset)))
        .map(|(index, offset)| {
            let first: &'a str = lines[index];
            let mut region = vec![&first[offset..]];
            region.extend_from_slice(&lines[index + 1..]);
            region
        })
}
