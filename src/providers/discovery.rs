use log::{debug, info};

use crate::auth::Credentials;
use crate::error::{GitQueryError, Result};
use crate::server::{ServerKind, ServerTarget};

use super::client::QueryClient;
use super::types::ProjectListing;
use super::{gerrit, gitlab};

const BODY_SNIPPET_CHARS: usize = 200;

/// Lists the projects a Gerrit or GitLab server exposes.
pub struct ProjectDiscovery {
    client: QueryClient,
}

impl ProjectDiscovery {
    pub fn new(client: QueryClient) -> Self {
        Self { client }
    }

    /// Runs one listing query against `server`.
    ///
    /// The server kind picks the query path, auth header and parser. An empty
    /// listing is a success.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The server cannot be reached (`Network`)
    /// - The request outlives the client timeout (`TimedOut`)
    /// - The server answers with a status of 400 or above (`Server`)
    /// - The body is not the expected JSON (`Parse`)
    pub async fn search(
        &self,
        server: &ServerTarget,
        credentials: &Credentials,
        limit: usize,
    ) -> Result<ProjectListing> {
        let kind = server.kind();
        let query = match kind {
            ServerKind::Gerrit => gerrit::query_path(limit, credentials),
            ServerKind::GitLab => gitlab::query_path(limit),
        };
        let url = format!("{}/{query}", server.base_url());

        info!("Query site for projects: {url}");

        let request = self
            .client
            .auth_request(self.client.client().get(&url), kind, credentials);
        let response = self.client.send(request).await?;

        let status = response.status();
        info!("{kind} search responded with status {status}");

        let body = response.text().await?;

        if status.as_u16() >= 400 {
            return Err(GitQueryError::Server {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        debug!("Message body received: {body}");

        let listing = match kind {
            ServerKind::Gerrit => ProjectListing::Gerrit(gerrit::parse_listing(&body)?),
            ServerKind::GitLab => ProjectListing::GitLab(gitlab::parse_listing(&body)?),
        };

        if listing.is_empty() {
            info!("No projects found on {}", server.base_url());
        } else {
            info!("Found {} projects on {}", listing.len(), server.base_url());
        }

        Ok(listing)
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_SNIPPET_CHARS {
        return trimmed.to_owned();
    }
    let mut cut: String = trimmed.chars().take(BODY_SNIPPET_CHARS).collect();
    cut.push_str("...");
    cut
}
