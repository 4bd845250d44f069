use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::clone::ProjectCloner;
use crate::config::Config;
use crate::host::{join_project_list, parse_project_list, Notifier};
use crate::output::{project_table, ConsoleNotifier, ConsolePrompter, StepProgress};
use crate::providers::{ProjectDiscovery, QueryClient};
use crate::server::{self, ServerKind, ServerTarget};
use crate::session::{search_and_clone, search_projects, PickOutcome, QuerySession};

#[derive(Parser)]
#[command(name = "gitquery")]
#[command(author, version, about = "Find and clone Gerrit and GitLab projects", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./gitquery.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server to query, overrides the configured one
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Server kind, for GitLab instances not hosted on gitlab.com
    #[arg(short, long, global = true, value_enum)]
    kind: Option<ServerKind>,

    #[arg(short, long, global = true)]
    limit: Option<usize>,

    #[arg(short, long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(short, long, global = true, env = "GERRIT_USER")]
    user: Option<String>,

    #[arg(long, global = true, env = "GERRIT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the projects on the server
    Search {
        #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Clone one project by name
    Clone {
        project: String,

        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
    /// Pick a project from the server's list and clone it
    Pick {
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Comma-separated names to offer instead of the full listing
        #[arg(long)]
        from: Option<String>,
    },
    /// Write a configuration file with default values
    Init {
        #[arg(default_value = "gitquery.toml")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Table,
    Json,
    Joined,
}

#[derive(Serialize)]
struct ListingOutput<'a> {
    server: &'a str,
    kind: ServerKind,
    projects: Vec<ProjectEntry<'a>>,
}

#[derive(Serialize)]
struct ProjectEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    clone_url: Option<&'a str>,
}

impl Cli {
    /// Loads the configuration and layers command-line values on top.
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(kind) = self.kind {
            config.query.server_kind = Some(kind);
        }
        if let Some(limit) = self.limit {
            config.query.limit = limit;
        }
        if self.token.is_some() {
            config.query.gitlab_token.clone_from(&self.token);
        }
        if self.user.is_some() {
            config.query.gerrit_user.clone_from(&self.user);
        }
        if self.password.is_some() {
            config.query.gerrit_password.clone_from(&self.password);
        }

        Ok(config)
    }

    fn build_session(&self, config: &Config) -> Result<QuerySession> {
        let url = server::resolve(self.server.as_deref(), &config.query.server);
        if url.is_empty() {
            bail!("No server configured; pass --server or set query.server");
        }
        url::Url::parse(&url).with_context(|| format!("Invalid server URL: {url}"))?;

        let target = match config.query.server_kind {
            Some(kind) => ServerTarget::new(&url, kind),
            None => ServerTarget::from_url(&url),
        };
        info!("Using {} server {}", target.kind(), target.base_url());

        let client = QueryClient::new(config.query.timeout())?;
        let cloner = ProjectCloner::new(config.clone.git_binary.clone(), config.clone.timeout());

        let mut session = QuerySession::new(
            target,
            ProjectDiscovery::new(client),
            cloner,
        );
        session.apply(config);

        Ok(session)
    }

    async fn execute_search(
        &self,
        session: &mut QuerySession,
        format: ListFormat,
        output: Option<&Path>,
    ) -> Result<()> {
        let progress = StepProgress::start(format!(
            "Querying {} (limit {})",
            session.target().base_url(),
            session.limit()
        ));
        let names = match session.search().await {
            Ok(names) => {
                progress.succeed(&format!("{} projects", names.len()));
                names
            }
            Err(e) => {
                progress.fail();
                ConsoleNotifier.warn(&e.to_string());
                return Err(e.into());
            }
        };

        let rendered = match format {
            ListFormat::Table => project_table(&names, session.repo_map()).to_string(),
            ListFormat::Joined => join_project_list(&names),
            ListFormat::Json => {
                let listing = ListingOutput {
                    server: session.target().base_url(),
                    kind: session.target().kind(),
                    projects: names
                        .iter()
                        .map(|name| ProjectEntry {
                            name,
                            clone_url: session.repo_map().get(name),
                        })
                        .collect(),
                };
                serde_json::to_string_pretty(&listing)?
            }
        };

        if let Some(output_path) = output {
            std::fs::write(output_path, rendered)?;
            info!("Project list written to: {}", output_path.display());
        } else {
            println!("{rendered}");
        }

        Ok(())
    }

    async fn execute_clone(
        &self,
        session: &mut QuerySession,
        project: &str,
        workspace: &Path,
    ) -> Result<()> {
        let notifier = ConsoleNotifier;

        // GitLab clone URLs are only known after a search.
        let names = search_projects(session, &notifier).await?;
        if !names.iter().any(|name| name == project) {
            info!("{project} was not in the first {} results", names.len());
        }

        let progress = StepProgress::start(format!("Cloning {project}"));
        match session.clone_project(project, workspace).await {
            Ok(report) => {
                progress.succeed(&report.target.display().to_string());
                notifier.info(&report.message());
                Ok(())
            }
            Err(e) => {
                progress.fail();
                notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    async fn execute_pick(
        &self,
        session: &mut QuerySession,
        workspace: &Path,
        from: Option<&str>,
    ) -> Result<()> {
        let candidates = from.map(parse_project_list);
        let outcome = search_and_clone(
            session,
            &ConsoleNotifier,
            &ConsolePrompter::new(),
            workspace,
            candidates,
        )
        .await?;

        match outcome {
            PickOutcome::NoProjects => ConsoleNotifier.info("No projects found"),
            PickOutcome::Cancelled => info!("Nothing cloned"),
            PickOutcome::Cloned(report) => info!("Cloned into {}", report.target.display()),
        }

        Ok(())
    }

    fn execute_init(&self, path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Refusing to overwrite existing file: {}", path.display());
        }
        Config::default().save(path)?;
        ConsoleNotifier.info(&format!("Wrote default configuration to {}", path.display()));
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        if let Commands::Init { path } = &self.command {
            return self.execute_init(path);
        }

        let config = self.load_config()?;
        let mut session = self.build_session(&config)?;

        match &self.command {
            Commands::Search { format, output } => {
                self.execute_search(&mut session, *format, output.as_deref())
                    .await
            }
            Commands::Clone { project, workspace } => {
                let workspace = workspace
                    .clone()
                    .unwrap_or_else(|| config.clone.workspace_root());
                self.execute_clone(&mut session, project, &workspace).await
            }
            Commands::Pick { workspace, from } => {
                let workspace = workspace
                    .clone()
                    .unwrap_or_else(|| config.clone.workspace_root());
                self.execute_pick(&mut session, &workspace, from.as_deref())
                    .await
            }
            Commands::Init { .. } => Ok(()),
        }
    }
}
