use super::ui;
use crate::core::config::ChartConfig;
use crate::core::{ChartRenderer, PriceHistory};
use anyhow::Result;
use comfy_table::Cell;

/// Prints the most recent part of the history to the terminal.
pub struct TableRenderer {
    rows: usize,
    buy_label: String,
    sell_label: String,
}

impl TableRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            rows: config.table_rows,
            buy_label: config.buy_label.clone(),
            sell_label: config.sell_label.clone(),
        }
    }

    pub fn display_as_table(&self, history: &PriceHistory) -> String {
        let records = history.records();
        if records.is_empty() {
            return ui::style_text("No price history yet.", ui::StyleType::Subtle);
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell(&self.buy_label),
            ui::header_cell("Change"),
            ui::header_cell(&self.sell_label),
            ui::header_cell("Change"),
        ]);

        let start = records.len().saturating_sub(self.rows);
        for (i, record) in records.iter().enumerate().skip(start) {
            let previous = i.checked_sub(1).map(|p| records[p]);
            table.add_row(vec![
                Cell::new(record.date.format("%Y-%m-%d")),
                ui::price_cell(record.buy_price),
                ui::change_cell(previous.map(|p| record.buy_price - p.buy_price)),
                ui::price_cell(record.sell_price),
                ui::change_cell(previous.map(|p| record.sell_price - p.sell_price)),
            ]);
        }

        let mut output = table.to_string();
        if start > 0 {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("({start} earlier rows not shown)"),
                    ui::StyleType::Subtle
                )
            ));
        }
        output
    }
}

impl ChartRenderer for TableRenderer {
    fn render(&self, history: &PriceHistory) -> Result<()> {
        println!("{}", self.display_as_table(history));
        Ok(())
    }
}
