use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use super::{GitHubError, RepoRef, RepositoryHost};

/// Upper bound on simultaneous content requests when the caller does not set one.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 10;

/// Outcome of fetching one file in a batch.
pub type FileFetch = Result<String, GitHubError>;

/// Fetch several files concurrently, at most `concurrency` at a time.
///
/// Results are gathered in completion order and keyed by path. A failed fetch
/// is recorded under its own path and does not cancel the others.
#[instrument(skip(host, repo, paths), fields(repo = %repo, files = paths.len()))]
pub async fn fetch_file_contents<H>(
    host: &H,
    repo: &RepoRef,
    paths: &[String],
    git_ref: Option<&str>,
    concurrency: usize,
) -> HashMap<String, FileFetch>
where
    H: RepositoryHost + ?Sized,
{
    if paths.is_empty() {
        return HashMap::new();
    }
    let workers = concurrency.clamp(1, paths.len());

    let results: HashMap<String, FileFetch> = stream::iter(paths)
        .map(|path| async move {
            let fetched = host.fetch_file_content(repo, path, git_ref).await;
            (path.clone(), fetched)
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    for (path, result) in &results {
        if let Err(error) = result {
            warn!(%path, %error, "failed to fetch file content");
        }
    }
    let fetched = results.values().filter(|r| r.is_ok()).count();
    debug!(fetched, requested = paths.len(), workers, "batch content fetch complete");

    results
}
