use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{CredentialSource, Credentials};
use crate::server::ServerKind;
use crate::session::DEFAULT_QUERY_LIMIT;

const CANDIDATES: [&str; 4] = [
    "gitquery.toml",
    "gitquery.json",
    "gitquery.yaml",
    "gitquery.yml",
];

/// Configuration file structure for gitquery.
///
/// Holds the settings a user would otherwise pass on every run: which server
/// to query, how to authenticate and where clones go.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub clone: CloneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueryConfig {
    /// Gerrit or GitLab server to query
    #[serde(default = "default_server")]
    pub server: String,

    /// Forces the server kind instead of guessing it from the URL
    pub server_kind: Option<ServerKind>,

    /// Token used for GitLab authentication
    pub gitlab_token: Option<String>,

    /// User login used for Gerrit authentication
    pub gerrit_user: Option<String>,

    /// Password used for Gerrit authentication
    pub gerrit_password: Option<String>,

    /// Maximum number of projects a query returns
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Upper bound for the listing request, in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CloneConfig {
    /// Folder projects are cloned into
    pub workspace: Option<PathBuf>,

    /// Git executable to run
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// Upper bound for a clone, in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            server_kind: None,
            gitlab_token: None,
            gerrit_user: None,
            gerrit_password: None,
            limit: default_limit(),
            timeout_secs: None,
        }
    }
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            git_binary: default_git_binary(),
            timeout_secs: None,
        }
    }
}

fn default_server() -> String {
    "https://git.eclipse.org/r".to_string()
}

fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn default_git_binary() -> String {
    "git".to_string()
}

impl QueryConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl CloneConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Clone destination, `./` when none is configured.
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace.clone().unwrap_or_else(|| PathBuf::from("./"))
    }
}

impl CredentialSource for Config {
    fn credentials(&self) -> Credentials {
        Credentials::new(
            self.query.gitlab_token.clone(),
            self.query.gerrit_user.clone(),
            self.query.gerrit_password.clone(),
        )
    }

    fn query_limit(&self) -> usize {
        self.query.limit
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./gitquery.toml, ./gitquery.json, ./gitquery.yaml, ./gitquery.yml
    /// 3. `<config dir>/gitquery/config.toml`
    ///
    /// Returns default configuration if no file is found. A specified path
    /// that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        if let Some(config) = Self::load_from_dir(Path::new("."))? {
            return Ok(config);
        }

        if let Some(user_config) = dirs::config_dir().map(|dir| dir.join("gitquery").join("config.toml")) {
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Loads the first candidate file found in `dir`, if any.
    fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        for candidate in &CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                return Self::load_from_path(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
