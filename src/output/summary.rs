use std::fmt::Write;

use comfy_table::Cell;

use crate::report::WaitReport;

use super::styling::Tone;
use super::tables::{color_coded_attempts_cell, color_coded_elapsed_cell, create_table, cyan_header};

/// Prints a human-readable summary of a successful wait to stderr.
///
/// Stdout is left for the JSON report so it can be piped.
pub fn print_summary(report: &WaitReport) {
    eprintln!("{}", render_summary(report));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(
        output,
        "{} {}",
        Tone::Heading.paint(emoji),
        Tone::Heading.paint(title).underlined()
    );
}

fn render_summary(report: &WaitReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "🚀", "Deployment");

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        Tone::Muted.paint("Repository:"),
        Tone::Accent.paint(&report.repository),
        Tone::Muted.paint("Commit:"),
        Tone::Accent.paint(&report.sha),
        Tone::Muted.paint("Deployment:"),
        Tone::Accent.paint(format!(
            "{} ({}, by {})",
            report.deployment_id, report.environment, report.creator
        )),
        Tone::Muted.paint("State:"),
        Tone::from(report.state).paint(report.state),
        Tone::Muted.paint("URL:"),
        Tone::Done.paint(&report.url),
        Tone::Muted.paint("Completed:"),
        Tone::Muted.paint(report.completed_at.format("%Y-%m-%d %H:%M:%S UTC"))
    );

    add_section_header(&mut output, "⏱️", "Stages");

    let mut table = create_table();
    table.set_header(cyan_header(&["Stage", "Attempts", "Elapsed"]));
    for stage in &report.stages {
        table.add_row(vec![
            Cell::new(stage.stage),
            color_coded_attempts_cell(stage.attempts),
            color_coded_elapsed_cell(stage.elapsed_ms),
        ]);
    }
    let _ = writeln!(output, "{table}");

    output
}
