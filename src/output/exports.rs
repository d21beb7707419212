use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::report::WaitReport;

/// Writes the report as a single JSON document.
pub fn export_json(report: &WaitReport, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

/// Appends the report's outputs to a GitHub Actions `GITHUB_OUTPUT` file as `key=value` lines.
pub fn write_github_outputs(report: &WaitReport, path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open outputs file: {}", path.display()))?;

    for (key, value) in report.outputs() {
        writeln!(file, "{key}={value}")
            .with_context(|| format!("Failed to write outputs file: {}", path.display()))?;
    }

    Ok(())
}

/// Formats a failure as a GitHub Actions `::error::` workflow command.
pub fn github_error_command(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}
