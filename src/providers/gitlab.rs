use serde::de::Error as _;

use crate::error::Result;

use super::gerrit::strip_xssi_prefix;
use super::types::GitLabProject;

/// Listing path for GitLab's REST API, relative to the server URL.
pub fn query_path(limit: usize) -> String {
    format!("api/v4/projects?&per_page={limit}")
}

/// Parses a GitLab project array.
///
/// Anything around the outermost `[...]` is discarded before parsing.
pub fn parse_listing(body: &str) -> Result<Vec<GitLabProject>> {
    let json = outermost_array(strip_xssi_prefix(body)).ok_or_else(|| {
        serde_json::Error::custom("response does not contain a JSON array")
    })?;

    Ok(serde_json::from_str(json)?)
}

fn outermost_array(body: &str) -> Option<&str> {
    let start = body.find('[')?;
    let end = body.rfind(']')?;
    (start < end).then(|| &body[start..=end])
}
