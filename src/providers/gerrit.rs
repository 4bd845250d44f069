use indexmap::IndexMap;
use log::debug;

use crate::auth::Credentials;
use crate::error::Result;

use super::types::GerritProjectInfo;

/// Gerrit prefixes JSON bodies with this to stop them running as a script.
pub(super) const XSSI_PREFIX: &str = ")]}'";

/// Listing path for the `master` branch, relative to the server URL.
///
/// The `a/` prefix selects Gerrit's authenticated endpoint and is only used
/// when both user and password are known.
pub fn query_path(limit: usize, credentials: &Credentials) -> String {
    let auth_prefix = if credentials.basic().is_some() { "a/" } else { "" };
    format!("{auth_prefix}projects/?b=master&limit={limit}")
}

/// Parses a Gerrit project map into names, keeping the server's key order.
pub fn parse_listing(body: &str) -> Result<Vec<String>> {
    let json = strip_xssi_prefix(body);
    let projects: IndexMap<String, GerritProjectInfo> = serde_json::from_str(json)?;

    Ok(projects
        .into_iter()
        .map(|(name, info)| {
            debug!("project: {name} id: {}", info.id.as_deref().unwrap_or("-"));
            name
        })
        .collect())
}

pub(super) fn strip_xssi_prefix(body: &str) -> &str {
    body.strip_prefix(XSSI_PREFIX).unwrap_or(body)
}
