use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::Tone;

const TOTAL_STAGES: usize = 3;

/// Spinner for one polling stage.
pub struct StageProgress {
    pb: ProgressBar,
    label: String,
}

impl StageProgress {
    pub fn print_header() {
        eprintln!(
            "{}  {}",
            Tone::Heading.paint("⚙️"),
            Tone::Heading.paint("Stages").underlined()
        );
    }

    pub fn start(index: usize, message: &str) -> Self {
        let label = format!("Stage {index}/{TOTAL_STAGES}");
        let pb = create_spinner(Tone::Waiting.paint(format!("{label}: {message}")).to_string());
        Self { pb, label }
    }

    pub fn finish(self, message: &str) {
        let message = Tone::Done.paint(format!("{}: {message} ✓", self.label));
        self.pb.finish_with_message(message.to_string());
    }

    pub fn fail(self, message: &str) {
        let message = Tone::Failed.paint(format!("{}: {message} ✗", self.label));
        self.pb.abandon_with_message(message.to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
