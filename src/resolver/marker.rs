//! The `[commit:<sha>]` convention that links a tracking issue in the target
//! repository to the source commit it ports. Everything that reads or writes
//! the marker goes through this module.

use std::collections::HashSet;

use crate::github::types::{short_sha, SHORT_SHA_LEN};

const MARKER_OPEN: &str = "[commit:";
const MARKER_CLOSE: char = ']';
const FULL_SHA_LEN: usize = 40;

/// Return the commit id inside the first `[commit:...]` marker of `title`.
///
/// Surrounding whitespace inside the brackets is ignored; an empty marker
/// yields `None`.
pub fn extract_commit_marker(title: &str) -> Option<&str> {
    let start = title.find(MARKER_OPEN)? + MARKER_OPEN.len();
    let end = start + title[start..].find(MARKER_CLOSE)?;
    let token = title[start..end].trim();
    (!token.is_empty()).then_some(token)
}

/// Render the marker for a commit, always using the short sha.
pub fn format_commit_marker(sha: &str) -> String {
    format!("{}{}{}", MARKER_OPEN, short_sha(sha), MARKER_CLOSE)
}

fn is_full_sha(token: &str) -> bool {
    token.len() == FULL_SHA_LEN && token.chars().all(|c| c.is_ascii_hexdigit())
}

/// Commit ids already claimed by a tracking issue.
///
/// Built fresh for every resolution pass. A full 40-character sha is stored
/// together with its short form so that producers and consumers may disagree
/// on which form they write.
#[derive(Debug, Default)]
pub struct ProcessedCommits {
    ids: HashSet<String>,
}

impl ProcessedCommits {
    pub fn from_titles<'a, I>(titles: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut processed = Self::default();
        for token in titles.into_iter().filter_map(extract_commit_marker) {
            processed.insert(token);
        }
        processed
    }

    pub fn insert(&mut self, token: &str) {
        if is_full_sha(token) {
            self.ids.insert(token[..SHORT_SHA_LEN].to_string());
        }
        self.ids.insert(token.to_string());
    }

    /// True when either the full sha or its short form has been claimed.
    pub fn contains_commit(&self, sha: &str) -> bool {
        self.ids.contains(sha) || self.ids.contains(short_sha(sha))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
