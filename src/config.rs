use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::batch::DEFAULT_FETCH_CONCURRENCY;
use crate::github::RepoRef;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".commit-porter.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration loaded from .commit-porter.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub repos: ReposConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// REST API root, overridable for GitHub Enterprise
    pub api_base: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.github.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Which repository is ported from and which one is ported to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReposConfig {
    pub source: RepoRef,
    pub target: RepoRef,
}

impl Default for ReposConfig {
    fn default() -> Self {
        Self {
            source: RepoRef {
                owner: "google".to_string(),
                name: "adk-python".to_string(),
            },
            target: RepoRef {
                owner: "njraladdin".to_string(),
                name: "adk-typescript".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How many recent commits and issues are inspected
    pub max_items: usize,
    /// Changed lines kept per file in a diff excerpt
    pub max_excerpt_lines: usize,
    /// Attach the full post-commit text of every non-deleted changed file
    pub fetch_file_contents: bool,
    /// Simultaneous content requests
    pub fetch_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            max_excerpt_lines: 10,
            fetch_file_contents: true,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from .commit-porter.toml in the
    /// current directory when no path is given. A missing default file yields
    /// the default config; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.max_items == 0 {
            return Err(ConfigError::Invalid("resolver.max_items must be at least 1".into()));
        }
        if self.resolver.max_excerpt_lines == 0 {
            return Err(ConfigError::Invalid(
                "resolver.max_excerpt_lines must be at least 1".into(),
            ));
        }
        if self.resolver.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "resolver.fetch_concurrency must be at least 1".into(),
            ));
        }
        if self.github.timeout_secs == 0 {
            return Err(ConfigError::Invalid("github.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var. Blank values count as unset.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.repos.source.to_string(), "google/adk-python");
        assert_eq!(config.repos.target.to_string(), "njraladdin/adk-typescript");
        assert_eq!(config.resolver.max_items, 10);
        assert_eq!(config.resolver.max_excerpt_lines, 10);
        assert!(config.resolver.fetch_file_contents);
        assert_eq!(config.resolver.fetch_concurrency, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
api_base = "https://ghe.example.com/api/v3"

[repos]
source = "acme/widgets-py"
target = "acme/widgets-ts"

[resolver]
max_items = 30
fetch_file_contents = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.repos.source.owner, "acme");
        assert_eq!(config.repos.target.name, "widgets-ts");
        assert_eq!(config.resolver.max_items, 30);
        assert_eq!(config.resolver.max_excerpt_lines, 10);
        assert!(!config.resolver.fetch_file_contents);
    }

    #[test]
    fn test_invalid_repo_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[repos]\nsource = \"not-a-repo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_excerpt_lines() {
        let mut config = Config::default();
        config.resolver.max_excerpt_lines = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\nmax_excerpt_lines = 4").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.resolver.max_excerpt_lines, 4);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/commit-porter.toml")));
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_config_token_wins() {
        let mut config = Config::default();
        config.github.token = Some("from-file".to_string());
        assert_eq!(config.github_token().as_deref(), Some("from-file"));
    }
}
