use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info, warn};
use tokio::process::Command;
use url::Url;

use crate::auth::Credentials;
use crate::error::{GitQueryError, Result};
use crate::providers::ProjectRepoMap;
use crate::server::{ServerKind, ServerTarget};

const FATAL_MARKER: &str = "fatal";
const WARNING_MARKER: &str = "warning";
const REDACTED: &str = "***";

/// A fully resolved `git clone` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneCommand {
    pub program: String,
    pub url: String,
    pub target: PathBuf,
}

impl CloneCommand {
    /// The command line with any embedded credentials masked.
    pub fn redacted(&self) -> String {
        format!(
            "{} clone {} {}",
            self.program,
            redact_url(&self.url),
            self.target.display()
        )
    }
}

impl fmt::Display for CloneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} clone {} {}", self.program, self.url, self.target.display())
    }
}

/// What a finished `git clone` printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneResult {
    pub output: String,
    /// Git reported `fatal` even though it exited cleanly.
    pub failed: bool,
}

impl CloneResult {
    pub fn from_output(output: String) -> Self {
        let failed = output.starts_with(FATAL_MARKER);
        Self { output, failed }
    }

    pub fn has_warnings(&self) -> bool {
        self.output.to_lowercase().contains(WARNING_MARKER)
    }
}

/// A clone that went through, ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub target: PathBuf,
    pub output: String,
    pub warnings: bool,
}

impl CloneReport {
    pub fn message(&self) -> String {
        if self.warnings {
            self.output.clone()
        } else {
            format!("{}\n Clone completed", self.output)
        }
    }
}

/// Runs `git clone` for projects found by a search.
pub struct ProjectCloner {
    git_binary: String,
    timeout: Option<Duration>,
}

impl ProjectCloner {
    pub fn new(git_binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            git_binary: git_binary.into(),
            timeout,
        }
    }

    /// Builds the clone command for `project` without running it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProject` for a GitLab project missing from `repo_map`,
    /// or `Config` when a URL cannot carry credentials.
    pub fn command(
        &self,
        project: &str,
        workspace_root: &Path,
        server: &ServerTarget,
        credentials: &Credentials,
        repo_map: &ProjectRepoMap,
    ) -> Result<CloneCommand> {
        Ok(CloneCommand {
            program: self.git_binary.clone(),
            url: clone_url(project, server, credentials, repo_map)?,
            target: target_directory(project, workspace_root),
        })
    }

    /// Clones `project` into the workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The clone URL cannot be built (see [`ProjectCloner::command`])
    /// - Git cannot be started or exits with a failure status (`Clone`)
    /// - Git exits cleanly but its output starts with `fatal` (`ReportedCloneFailure`)
    /// - The configured timeout elapses (`TimedOut`)
    pub async fn clone(
        &self,
        project: &str,
        workspace_root: &Path,
        server: &ServerTarget,
        credentials: &Credentials,
        repo_map: &ProjectRepoMap,
    ) -> Result<CloneReport> {
        let command = self.command(project, workspace_root, server, credentials, repo_map)?;
        info!("Clone selected project command: {}", command.redacted());

        let result = self.run(&command).await?;
        interpret(result, command.target)
    }

    async fn run(&self, command: &CloneCommand) -> Result<CloneResult> {
        let pending = Command::new(&command.program)
            .arg("clone")
            .arg(&command.url)
            .arg(&command.target)
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| GitQueryError::TimedOut(limit))?,
            None => pending.await,
        };

        let output = output.map_err(|e| GitQueryError::Clone {
            reason: format!("unable to run {}", command.program),
            output: e.to_string(),
        })?;

        let text = combined_output(&output.stderr, &output.stdout);

        if !output.status.success() {
            error!("git clone failed with {}: {text}", output.status);
            return Err(GitQueryError::Clone {
                reason: output.status.to_string(),
                output: text,
            });
        }

        Ok(CloneResult::from_output(text))
    }
}

fn interpret(result: CloneResult, target: PathBuf) -> Result<CloneReport> {
    if result.failed {
        warn!("git clone reported a failure: {}", result.output);
        return Err(GitQueryError::ReportedCloneFailure(result.output));
    }

    let warnings = result.has_warnings();
    if warnings {
        warn!("git clone finished with warnings");
    }

    Ok(CloneReport {
        target,
        output: result.output,
        warnings,
    })
}

/// Folder a project is cloned into.
///
/// Nested names such as `egerrit/org.eclipse.egerrit` use their second
/// segment; anything past it is ignored.
pub fn target_directory(project: &str, workspace_root: &Path) -> PathBuf {
    let mut segments = project.split('/');
    let first = segments.next().unwrap_or(project);
    let folder = segments.next().filter(|s| !s.is_empty()).unwrap_or(first);
    workspace_root.join(folder)
}

/// URL handed to `git clone`, with credentials embedded when available.
pub fn clone_url(
    project: &str,
    server: &ServerTarget,
    credentials: &Credentials,
    repo_map: &ProjectRepoMap,
) -> Result<String> {
    match server.kind() {
        ServerKind::GitLab => {
            let repo = repo_map
                .get(project)
                .ok_or_else(|| GitQueryError::UnknownProject(project.to_owned()))?;

            match credentials.token() {
                Some(token) => {
                    let mut url = parse_url(repo)?;
                    set_user_info(&mut url, token.as_str(), None)?;
                    Ok(url.to_string())
                }
                None => Ok(repo.to_owned()),
            }
        }
        ServerKind::Gerrit => match credentials.basic() {
            Some((user, password)) => {
                let mut url = parse_url(server.base_url())?;
                set_user_info(&mut url, user, Some(password))?;
                url.set_path(&format!("a/{project}"));
                url.set_query(None);
                url.set_fragment(None);
                Ok(url.to_string())
            }
            None => Ok(format!("{}/{project}.git", server.base_url())),
        },
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| GitQueryError::Config(format!("Invalid clone URL '{raw}': {e}")))
}

fn set_user_info(url: &mut Url, user: &str, password: Option<&str>) -> Result<()> {
    url.set_username(user)
        .and_then(|()| url.set_password(password))
        .map_err(|()| GitQueryError::Config(format!("URL cannot carry credentials: {url}")))
}

fn redact_url(raw: &str) -> String {
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) if raw.contains('@') => return REDACTED.to_owned(),
        Err(_) => return raw.to_owned(),
    };

    if url.username().is_empty() && url.password().is_none() {
        return raw.to_owned();
    }

    let masked = url.set_username(REDACTED).and_then(|()| match url.password() {
        Some(_) => url.set_password(Some(REDACTED)),
        None => Ok(()),
    });

    match masked {
        Ok(()) => url.to_string(),
        Err(()) => REDACTED.to_owned(),
    }
}

fn combined_output(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stdout = String::from_utf8_lossy(stdout);
    [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
