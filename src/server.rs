use std::fmt;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

const GITLAB_MARKER: &str = "://gitlab.com";

/// Which API a server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    Gerrit,
    #[value(name = "gitlab")]
    #[serde(rename = "gitlab")]
    GitLab,
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gerrit => f.write_str("Gerrit"),
            Self::GitLab => f.write_str("GitLab"),
        }
    }
}

/// The server a search and clone run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    base_url: String,
    kind: ServerKind,
}

impl ServerTarget {
    pub fn new(base_url: &str, kind: ServerKind) -> Self {
        Self {
            base_url: strip_trailing_slash(base_url).to_owned(),
            kind,
        }
    }

    /// Builds a target whose kind is guessed from the URL.
    pub fn from_url(base_url: &str) -> Self {
        Self::new(base_url, classify(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn kind(&self) -> ServerKind {
        self.kind
    }
}

/// Picks the server URL for a request.
///
/// A command-line override wins over the stored preference when it is not
/// blank. Trailing slashes are removed from whichever value is used.
pub fn resolve(cli_override: Option<&str>, preference_url: &str) -> String {
    let server = match cli_override.map(str::trim) {
        Some(cli) if !cli.is_empty() => {
            info!("Query server from command line: {cli}");
            cli
        }
        _ => {
            info!("Query server from preferences: {preference_url}");
            preference_url.trim()
        }
    };

    strip_trailing_slash(server).to_owned()
}

/// Classifies a server URL.
///
/// Only hosts reached through `://gitlab.com` are recognised as GitLab; a
/// self-hosted GitLab on another domain comes back as Gerrit and needs an
/// explicit [`ServerKind`].
pub fn classify(url: &str) -> ServerKind {
    if url.contains(GITLAB_MARKER) {
        ServerKind::GitLab
    } else {
        ServerKind::Gerrit
    }
}

fn strip_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}
