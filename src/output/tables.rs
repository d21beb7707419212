use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Attempts used by a stage; anything past the first try means the stage had to wait.
pub fn color_coded_attempts_cell(attempts: u64) -> Cell {
    let color = match attempts {
        0 | 1 => TableColor::Green,
        2..=10 => TableColor::Yellow,
        _ => TableColor::Red,
    };
    Cell::new(attempts).fg(color)
}

pub fn color_coded_elapsed_cell(elapsed_ms: u64) -> Cell {
    #[allow(clippy::cast_precision_loss)]
    let seconds = elapsed_ms as f64 / 1000.0;
    let text = format!("{seconds:.1}s");
    if seconds <= 30.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if seconds <= 120.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}
