mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{export_json, github_error_command, write_github_outputs};
pub use progress::StageProgress;
pub use summary::print_summary;

use styling::Tone;

/// Prints the `deploywait` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        Tone::Brand.paint("⏳ deploywait"),
        Tone::Muted.paint(env!("CARGO_PKG_VERSION")),
        Tone::Muted.paint("Wait for a deployment preview to go live")
    );
}
