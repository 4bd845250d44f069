use std::path::Path;

use log::{debug, info, warn};

use crate::auth::{CredentialSource, Credentials};
use crate::clone::{CloneReport, ProjectCloner};
use crate::error::Result;
use crate::host::{Notifier, Prompter};
use crate::providers::{ProjectDiscovery, ProjectListing, ProjectRepoMap};
use crate::server::ServerTarget;

pub const DEFAULT_QUERY_LIMIT: usize = 20;

const SEARCH_NOTICE: &str = "Potential list of projects to clone will show shortly";
const PICK_PROMPT: &str = "Type the name of the project you want to clone";

/// State shared by one search and the clone that follows it.
///
/// Credentials and the query limit are replaced wholesale by each
/// [`QuerySession::apply`]; the repo map is replaced by each successful
/// GitLab search and left alone when a search fails.
pub struct QuerySession {
    target: ServerTarget,
    credentials: Credentials,
    limit: usize,
    discovery: ProjectDiscovery,
    cloner: ProjectCloner,
    repo_map: ProjectRepoMap,
}

impl QuerySession {
    pub fn new(target: ServerTarget, discovery: ProjectDiscovery, cloner: ProjectCloner) -> Self {
        Self {
            target,
            credentials: Credentials::anonymous(),
            limit: DEFAULT_QUERY_LIMIT,
            discovery,
            cloner,
            repo_map: ProjectRepoMap::default(),
        }
    }

    pub fn target(&self) -> &ServerTarget {
        &self.target
    }

    pub fn repo_map(&self) -> &ProjectRepoMap {
        &self.repo_map
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn set_query_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Takes credentials and limit from `source` for the next search.
    pub fn apply(&mut self, source: &impl CredentialSource) {
        self.set_credentials(source.credentials());
        self.set_query_limit(source.query_limit());
    }

    /// Lists projects on the session's server.
    pub async fn search(&mut self) -> Result<Vec<String>> {
        let listing = self
            .discovery
            .search(&self.target, &self.credentials, self.limit)
            .await?;

        let names = listing.names();
        if let ProjectListing::GitLab(projects) = &listing {
            self.repo_map = projects.iter().collect();
            debug!("Repo map holds {} clone URLs", self.repo_map.len());
        }

        Ok(names)
    }

    /// Clones `project` from the session's server into `workspace_root`.
    pub async fn clone_project(&self, project: &str, workspace_root: &Path) -> Result<CloneReport> {
        self.cloner
            .clone(
                project,
                workspace_root,
                &self.target,
                &self.credentials,
                &self.repo_map,
            )
            .await
    }
}

/// How an interactive pick ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    NoProjects,
    Cancelled,
    Cloned(CloneReport),
}

/// Searches, reporting a failure as a persistent warning.
pub async fn search_projects(session: &mut QuerySession, notifier: &dyn Notifier) -> Result<Vec<String>> {
    notifier.info(SEARCH_NOTICE);

    session.search().await.inspect_err(|e| {
        warn!("Project search failed: {e}");
        notifier.warn(&e.to_string());
    })
}

/// Clones `project`, reporting the result through `notifier`.
pub async fn clone_selected(
    session: &QuerySession,
    project: &str,
    workspace_root: &Path,
    notifier: &dyn Notifier,
) -> Result<CloneReport> {
    match session.clone_project(project, workspace_root).await {
        Ok(report) => {
            notifier.info(&report.message());
            Ok(report)
        }
        Err(e) => {
            notifier.error(&e.to_string());
            Err(e)
        }
    }
}

/// Search, let the user pick one project, clone it.
///
/// `candidates` replaces the searched names in the picker when given; the
/// search still runs first so GitLab clone URLs are known.
pub async fn search_and_clone(
    session: &mut QuerySession,
    notifier: &dyn Notifier,
    prompter: &dyn Prompter,
    workspace_root: &Path,
    candidates: Option<Vec<String>>,
) -> Result<PickOutcome> {
    let found = search_projects(session, notifier).await?;
    let items = candidates.unwrap_or(found);

    if items.is_empty() {
        info!("No projects to pick from");
        return Ok(PickOutcome::NoProjects);
    }

    let Some(project) = prompter.select(PICK_PROMPT, &items)? else {
        info!("Project selection cancelled");
        return Ok(PickOutcome::Cancelled);
    };

    let report = clone_selected(session, &project, workspace_root, notifier).await?;
    Ok(PickOutcome::Cloned(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitQueryError;
    use crate::providers::QueryClient;
    use crate::server::ServerKind;
    use mockito::Matcher;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<(&'static str, String)>>,
    }

    impl RecordingNotifier {
        fn levels(&self) -> Vec<&'static str> {
            self.messages.borrow().iter().map(|(level, _)| *level).collect()
        }

        fn last(&self) -> (&'static str, String) {
            self.messages.borrow().last().cloned().unwrap()
        }
    }

    impl Notifier for RecordingNotifier {
        fn info(&self, message: &str) {
            self.messages.borrow_mut().push(("info", message.to_owned()));
        }

        fn warn(&self, message: &str) {
            self.messages.borrow_mut().push(("warn", message.to_owned()));
        }

        fn error(&self, message: &str) {
            self.messages.borrow_mut().push(("error", message.to_owned()));
        }
    }

    struct ScriptedPrompter {
        choice: Option<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl Prompter for ScriptedPrompter {
        fn select(&self, _prompt: &str, items: &[String]) -> Result<Option<String>> {
            *self.seen.borrow_mut() = items.to_vec();
            Ok(self.choice.map(str::to_owned))
        }
    }

    struct FixedSource;

    impl CredentialSource for FixedSource {
        fn credentials(&self) -> Credentials {
            Credentials::new(Some("glpat-1".into()), None, None)
        }

        fn query_limit(&self) -> usize {
            7
        }
    }

    fn session(url: &str, kind: ServerKind, git: &str) -> QuerySession {
        QuerySession::new(
            ServerTarget::new(url, kind),
            ProjectDiscovery::new(QueryClient::new(None).unwrap()),
            ProjectCloner::new(git, None),
        )
    }

    #[test]
    fn test_apply_replaces_credentials_and_limit() {
        let mut session = session("https://gitlab.com", ServerKind::GitLab, "git");
        assert_eq!(session.limit(), DEFAULT_QUERY_LIMIT);

        session.apply(&FixedSource);
        assert_eq!(session.limit(), 7);
        assert_eq!(session.credentials.token().map(|t| t.as_str()), Some("glpat-1"));
    }

    #[tokio::test]
    async fn test_gerrit_search_leaves_repo_map_alone() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects/")
            .match_query(Matcher::Any)
            .with_body(r#"{"proj1":{"id":"x"},"proj2":{"id":"y"}}"#)
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::Gerrit, "git");
        let names = session.search().await.unwrap();

        assert_eq!(names, vec!["proj1", "proj2"]);
        assert!(session.repo_map().is_empty());
    }

    #[tokio::test]
    async fn test_gitlab_search_replaces_repo_map() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects")
            .match_query(Matcher::UrlEncoded("per_page".into(), "20".into()))
            .with_body(r#"[{"name":"old","http_url_to_repo":"https://gitlab.com/old.git"}]"#)
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::GitLab, "git");
        session.search().await.unwrap();
        assert_eq!(session.repo_map().get("old"), Some("https://gitlab.com/old.git"));

        server
            .mock("GET", "/api/v4/projects")
            .match_query(Matcher::UrlEncoded("per_page".into(), "5".into()))
            .with_body(r#"Projects: [{"name":"a","http_url_to_repo":"https://gitlab.com/a.git"}] end"#)
            .create_async()
            .await;

        session.set_query_limit(5);
        let names = session.search().await.unwrap();

        assert_eq!(names, vec!["a"]);
        assert_eq!(session.repo_map().len(), 1);
        assert_eq!(session.repo_map().get("a"), Some("https://gitlab.com/a.git"));
        assert_eq!(session.repo_map().get("old"), None);
    }

    #[tokio::test]
    async fn test_failed_search_keeps_previous_repo_map() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects")
            .match_query(Matcher::UrlEncoded("per_page".into(), "20".into()))
            .with_body(r#"[{"name":"a","http_url_to_repo":"https://gitlab.com/a.git"}]"#)
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::GitLab, "git");
        session.search().await.unwrap();

        server
            .mock("GET", "/api/v4/projects")
            .match_query(Matcher::UrlEncoded("per_page".into(), "5".into()))
            .with_status(404)
            .with_body(r#"{"message":"404 Not Found"}"#)
            .create_async()
            .await;

        session.set_query_limit(5);
        let err = session.search().await.unwrap_err();
        assert!(matches!(err, GitQueryError::Server { status: 404, .. }));
        assert_eq!(session.repo_map().get("a"), Some("https://gitlab.com/a.git"));
    }

    #[tokio::test]
    async fn test_search_failure_is_a_persistent_warning() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::Gerrit, "git");
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter {
            choice: Some("never"),
            seen: RefCell::new(Vec::new()),
        };

        let result =
            search_and_clone(&mut session, &notifier, &prompter, Path::new("/ws"), None).await;

        assert!(result.is_err());
        assert_eq!(notifier.levels(), vec!["info", "warn"]);
        assert!(notifier.last().1.contains("500"));
        assert!(prompter.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing_skips_picker() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body(")]}'\n{}")
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::Gerrit, "git");
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter {
            choice: None,
            seen: RefCell::new(Vec::new()),
        };

        let outcome = search_and_clone(&mut session, &notifier, &prompter, Path::new("/ws"), None)
            .await
            .unwrap();

        assert_eq!(outcome, PickOutcome::NoProjects);
    }

    #[tokio::test]
    async fn test_cancelled_pick_does_not_clone() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body(r#"{"jgit":{"id":"jgit"}}"#)
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::Gerrit, "git");
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter {
            choice: None,
            seen: RefCell::new(Vec::new()),
        };

        let outcome = search_and_clone(&mut session, &notifier, &prompter, Path::new("/ws"), None)
            .await
            .unwrap();

        assert_eq!(outcome, PickOutcome::Cancelled);
        assert_eq!(*prompter.seen.borrow(), vec!["jgit".to_string()]);
        assert_eq!(notifier.levels(), vec!["info"]);
    }

    #[tokio::test]
    async fn test_gitlab_project_outside_last_search_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body(r#"[{"name":"a","http_url_to_repo":"https://gitlab.com/a.git"}]"#)
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::GitLab, "git");
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter {
            choice: Some("stale"),
            seen: RefCell::new(Vec::new()),
        };

        let err = search_and_clone(
            &mut session,
            &notifier,
            &prompter,
            Path::new("/ws"),
            Some(vec!["stale".into()]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GitQueryError::UnknownProject(_)));
        assert_eq!(notifier.last().0, "error");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pick_and_clone_reports_completion() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let git = temp.path().join("fake-git");
        std::fs::write(&git, "#!/bin/sh\necho \"Cloning into '$3'...\" >&2\n").unwrap();
        std::fs::set_permissions(&git, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body(")]}'\n{\"egerrit/org.eclipse.egerrit\":{\"id\":\"egerrit%2Forg.eclipse.egerrit\"}}")
            .create_async()
            .await;

        let mut session = session(&server.url(), ServerKind::Gerrit, &git.to_string_lossy());
        let notifier = RecordingNotifier::default();
        let prompter = ScriptedPrompter {
            choice: Some("egerrit/org.eclipse.egerrit"),
            seen: RefCell::new(Vec::new()),
        };

        let outcome = search_and_clone(&mut session, &notifier, &prompter, Path::new("/ws"), None)
            .await
            .unwrap();

        let PickOutcome::Cloned(report) = outcome else {
            panic!("expected a clone");
        };
        assert_eq!(report.target, Path::new("/ws/org.eclipse.egerrit"));
        let (level, message) = notifier.last();
        assert_eq!(level, "info");
        assert_eq!(
            message,
            "Cloning into '/ws/org.eclipse.egerrit'...\n Clone completed"
        );
    }
}
