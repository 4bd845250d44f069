mod progress;
mod styling;
mod tables;
mod terminal;

pub use progress::StepProgress;
pub use styling::{muted, title};
pub use tables::project_table;
pub use terminal::{ConsoleNotifier, ConsolePrompter};

/// Prints the gitquery banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        title("gitquery"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Find and clone Gerrit and GitLab projects")
    );
}
