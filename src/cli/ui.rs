use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::Trend;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Styles a rate according to its trend: green when rising, red when falling.
pub fn style_rate(text: &str, trend: Trend) -> String {
    let styled = match trend {
        Trend::Up => style(text).green().bold(),
        Trend::Down => style(text).red().bold(),
        Trend::Flat => style(text).bold(),
    };
    styled.to_string()
}

pub fn trend_arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "▲",
        Trend::Down => "▼",
        Trend::Flat => "=",
    }
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Creates a cell for displaying a rate change with color coding.
pub fn change_cell(change: f64) -> Cell {
    let text = format!("{change:+.2}");
    let color = if change > 0.0 {
        Color::Green
    } else if change < 0.0 {
        Color::Red
    } else {
        Color::DarkGrey
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// Creates a cell for "N/A" values.
pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Creates a spinner shown while a request is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
