mod config;
mod diff;
mod github;
mod report;
mod resolver;

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::github::{GitHubClient, RepoRef};
use crate::resolver::Resolver;

/// commit-porter: finds the oldest commit of a Python repository that has no
/// `[commit:<sha>]` tracking issue in its TypeScript sibling yet, and
/// summarizes its diff for porting.
#[derive(Parser, Debug)]
#[command(name = "commit-porter", version, about)]
struct Cli {
    /// Config file (defaults to .commit-porter.toml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the next commit to port
    Next {
        /// Source repository as owner/name
        #[arg(long)]
        source: Option<RepoRef>,

        /// Target repository as owner/name
        #[arg(long)]
        target: Option<RepoRef>,

        /// Recent commits and issues to inspect
        #[arg(long)]
        max_items: Option<usize>,

        /// Skip fetching full file contents
        #[arg(long)]
        no_contents: bool,

        /// Write the result to this file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File format used with --output
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },

    /// Fetch and summarize the diff of one commit
    Diff {
        sha: String,

        /// Repository as owner/name (defaults to the configured source)
        #[arg(long)]
        repo: Option<RepoRef>,

        #[arg(long)]
        max_excerpt_lines: Option<usize>,

        /// Write a JSON snapshot to this file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a local patch file, or stdin with `-`
    Parse {
        patch: PathBuf,

        #[arg(long)]
        max_excerpt_lines: Option<usize>,

        /// Write a JSON snapshot to this file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Json,
    Issue,
}

impl From<FormatArg> for report::FileFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => report::FileFormat::Json,
            FormatArg::Issue => report::FileFormat::Issue,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Next {
            source,
            target,
            max_items,
            no_contents,
            output,
            format,
        } => {
            let source = source.unwrap_or_else(|| config.repos.source.clone());
            let target = target.unwrap_or_else(|| config.repos.target.clone());
            if let Some(max_items) = max_items {
                config.resolver.max_items = max_items;
            }
            if no_contents {
                config.resolver.fetch_file_contents = false;
            }
            config.validate()?;

            let _span = info_span!("next", source = %source, target = %target).entered();
            let client = GitHubClient::from_config(&config)?;
            debug!(authenticated = client.has_token(), "built GitHub client");
            let resolver = Resolver::new(&client, config.resolver.clone());

            info!("resolving next commit to port");
            let next = resolver
                .find_next_commit_to_port(&source, &target, config.resolver.max_items)
                .await?;
            match &next {
                Some(commit_to_port) => {
                    info!(
                        sha = %commit_to_port.commit.short_sha(),
                        files = commit_to_port.total_files_changed,
                        "commit to port resolved"
                    );
                    debug!(paths = ?commit_to_port.changed_paths().collect::<Vec<_>>(), "changed files");
                }
                None => info!("nothing to port"),
            }

            report::output_next(next.as_ref(), &source, output.as_deref(), format.into())?;
        }

        Command::Diff {
            sha,
            repo,
            max_excerpt_lines,
            output,
        } => {
            let repo = repo.unwrap_or_else(|| config.repos.source.clone());
            if let Some(max_excerpt_lines) = max_excerpt_lines {
                config.resolver.max_excerpt_lines = max_excerpt_lines;
            }
            config.validate()?;

            let _span = info_span!("diff", repo = %repo, sha = %sha).entered();
            let client = GitHubClient::from_config(&config)?;
            let resolver = Resolver::new(&client, config.resolver.clone());

            info!("fetching commit diff");
            let summary = resolver.commit_diff(&repo, &sha).await?;
            let heading = format!("{} @ {}", repo, github::types::short_sha(&sha));
            report::output_summary(&summary, &heading, output.as_deref())?;
        }

        Command::Parse {
            patch,
            max_excerpt_lines,
            output,
        } => {
            if let Some(max_excerpt_lines) = max_excerpt_lines {
                config.resolver.max_excerpt_lines = max_excerpt_lines;
            }
            config.validate()?;

            let raw_diff = read_patch(&patch)?;
            let summary = diff::parse_diff(&raw_diff, config.resolver.max_excerpt_lines);
            info!(files = summary.total_files_changed, "parsed local patch");
            report::output_summary(&summary, &patch.display().to_string(), output.as_deref())?;
        }
    }

    info!("done");
    Ok(())
}

/// Read a patch from `path`, or from stdin when the path is `-`.
fn read_patch(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(path)
    }
}
