use indexmap::IndexMap;
use serde::Deserialize;

/// Project metadata as returned by Gerrit's `projects/` endpoint.
///
/// Only the id is read; the rest of the entry is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GerritProjectInfo {
    #[serde(default)]
    pub id: Option<String>,
}

/// A project entry from GitLab's `api/v4/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitLabProject {
    pub name: String,
    pub http_url_to_repo: String,
}

/// A parsed listing, tagged by the API that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectListing {
    /// Project names in the order Gerrit's JSON object yields them.
    Gerrit(Vec<String>),
    /// Projects with their HTTP clone URLs, in response order.
    GitLab(Vec<GitLabProject>),
}

impl ProjectListing {
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Gerrit(names) => names.clone(),
            Self::GitLab(projects) => projects.iter().map(|p| p.name.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Gerrit(names) => names.len(),
            Self::GitLab(projects) => projects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Project name to clone URL, filled from the latest GitLab listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRepoMap(IndexMap<String, String>);

impl ProjectRepoMap {
    pub fn get(&self, project: &str) -> Option<&str> {
        self.0.get(project).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a GitLabProject> for ProjectRepoMap {
    fn from_iter<I: IntoIterator<Item = &'a GitLabProject>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|p| (p.name.clone(), p.http_url_to_repo.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, String)> for ProjectRepoMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
