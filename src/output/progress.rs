use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{done, failed, pending};

/// Spinner for one step of a search-and-clone run
pub struct StepProgress {
    pb: ProgressBar,
    label: String,
}

impl StepProgress {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let pb = create_spinner(pending(&label).to_string());
        Self { pb, label }
    }

    pub fn succeed(self, detail: &str) {
        self.pb
            .finish_with_message(done(format!("{}: {detail} ✓", self.label)).to_string());
    }

    pub fn fail(self) {
        self.pb
            .finish_with_message(failed(format!("{} ✗", self.label)).to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
