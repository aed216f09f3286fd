use super::ui;
use crate::core::{CurrencyPair, HistoryBuffer};
use comfy_table::{Cell, CellAlignment};

impl HistoryBuffer {
    pub fn display_as_table(&self, pair: &CurrencyPair) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell(&format!("Rate ({}/{})", pair.from, pair.to)),
            ui::header_cell("Change"),
        ]);

        let mut previous: Option<f64> = None;
        for observation in self.iter() {
            let change = previous.map_or(ui::na_cell(), |p| ui::change_cell(observation.rate - p));
            table.add_row(vec![
                Cell::new(observation.index).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", observation.rate)).set_alignment(CellAlignment::Right),
                change,
            ]);
            previous = Some(observation.rate);
        }

        table.to_string()
    }

    pub fn display_summary(&self, pair: &CurrencyPair) -> String {
        let Some(latest) = self.latest() else {
            return ui::style_text("No rates recorded yet", ui::StyleType::Subtle);
        };
        let current = format!("1 {} = {:.2} {}", pair.from, latest, pair.to);
        let mut lines = vec![format!(
            "{} {}",
            ui::style_rate(&current, self.trend()),
            ui::trend_arrow(self.trend())
        )];
        if let Some((low, high)) = self.range() {
            lines.push(format!(
                "{} {:.2} .. {:.2} over {} of {} observations",
                ui::style_text("Range:", ui::StyleType::TotalLabel),
                low,
                high,
                self.len(),
                self.capacity()
            ));
        }
        lines.join("\n")
    }
}

pub fn run(history: &HistoryBuffer, pair: &CurrencyPair) {
    println!(
        "{}",
        ui::style_text(&format!("{pair} rate history"), ui::StyleType::Title)
    );
    println!("{}", history.display_as_table(pair));
    println!("{}", history.display_summary(pair));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_table_lists_observations() {
        let pair = CurrencyPair::new("BRL", "COP").unwrap();
        let mut buffer = HistoryBuffer::seeded(30).unwrap();
        buffer.append(727.4);

        let table = buffer.display_as_table(&pair);
        assert!(table.contains("Rate (BRL/COP)"));
        assert!(table.contains("700.00"));
        assert!(table.contains("727.40"));
        assert!(table.contains("-2.60"));
        assert!(table.contains("N/A"));
    }

    #[test]
    fn test_summary_reports_range() {
        let pair = CurrencyPair::new("BRL", "COP").unwrap();
        let buffer = HistoryBuffer::seeded(30).unwrap();

        let summary = buffer.display_summary(&pair);
        assert!(summary.contains("730.00"));
        assert!(summary.contains("700.00 .. 730.00 over 3 of 30 observations"));
    }

    #[test]
    fn test_summary_of_empty_history() {
        let pair = CurrencyPair::new("BRL", "COP").unwrap();
        let buffer = HistoryBuffer::new(5).unwrap();
        assert!(buffer.display_summary(&pair).contains("No rates recorded yet"));
    }
}
