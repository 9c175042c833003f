pub mod chart;
pub mod setup;
pub mod table;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::{ChartRenderer, PriceHistory};
use anyhow::Result;
use chart::SvgChartRenderer;
use table::TableRenderer;

/// Terminal table followed by the SVG chart.
pub struct Presenter {
    table: TableRenderer,
    chart: SvgChartRenderer,
}

impl Presenter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            table: TableRenderer::new(&config.chart),
            chart: SvgChartRenderer::new(config.chart_path(), &config.chart),
        }
    }
}

impl ChartRenderer for Presenter {
    fn render(&self, history: &PriceHistory) -> Result<()> {
        self.table.render(history)?;
        self.chart.render(history)
    }
}
