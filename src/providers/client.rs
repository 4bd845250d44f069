use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::auth::Credentials;
use crate::error::{GitQueryError, Result};
use crate::server::ServerKind;

const USER_AGENT: &str = concat!("gitquery/", env!("CARGO_PKG_VERSION"));
const PRIVATE_TOKEN_HEADER: &str = "Private-Token";

pub struct QueryClient {
    client: Client,
    timeout: Option<Duration>,
}

impl QueryClient {
    /// Builds the HTTP client. `timeout` bounds each whole request.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| GitQueryError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends `request`, reporting an elapsed request timeout as `TimedOut`.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| match self.timeout {
            Some(limit) if e.is_timeout() => GitQueryError::TimedOut(limit),
            _ => GitQueryError::Network(e),
        })
    }

    /// Adds the auth header for `kind`, or nothing for anonymous access.
    pub fn auth_request(
        &self,
        request: RequestBuilder,
        kind: ServerKind,
        credentials: &Credentials,
    ) -> RequestBuilder {
        match kind {
            ServerKind::Gerrit => match credentials.basic() {
                Some((user, password)) => request.basic_auth(user, Some(password)),
                None => request,
            },
            ServerKind::GitLab => match credentials.token() {
                Some(token) => request.header(PRIVATE_TOKEN_HEADER, token.as_str()),
                None => request,
            },
        }
    }
}
