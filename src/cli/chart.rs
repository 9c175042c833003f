use crate::core::chart::callout_indices;
use crate::core::config::ChartConfig;
use crate::core::{ChartRenderer, PriceHistory};
use anyhow::{Context, Result, anyhow};
use plotters::prelude::*;
use std::ops::Range;
use std::path::PathBuf;
use tracing::{debug, info};

const BUY_COLOR: RGBColor = RGBColor(31, 119, 180);
const SELL_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Draws the buy and sell series as an SVG line chart.
pub struct SvgChartRenderer {
    path: PathBuf,
    config: ChartConfig,
}

impl SvgChartRenderer {
    pub fn new<P: Into<PathBuf>>(path: P, config: &ChartConfig) -> Self {
        Self {
            path: path.into(),
            config: config.clone(),
        }
    }

    fn draw(&self, history: &PriceHistory) -> Result<()> {
        let records = history.records();
        let dates: Vec<String> = records
            .iter()
            .map(|r| r.date.format("%Y-%m-%d").to_string())
            .collect();
        let buy: Vec<(usize, i64)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.buy_price))
            .collect();
        let sell: Vec<(usize, i64)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.sell_price))
            .collect();

        let x_range = 0..records.len().max(2);
        let y_range = price_range(history);

        let root = SVGBackend::new(&self.path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("Failed to draw chart background: {e}"))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.config.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow!("Failed to build chart axes: {e}"))?;

        let x_label = |i: &usize| dates.get(*i).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .x_desc(&self.config.x_axis_label)
            .y_desc(&self.config.y_axis_label)
            .x_labels(dates.len().clamp(2, 12))
            .x_label_formatter(&x_label)
            .draw()
            .map_err(|e| anyhow!("Failed to draw chart mesh: {e}"))?;

        for (points, label, color) in [
            (&buy, &self.config.buy_label, BUY_COLOR),
            (&sell, &self.config.sell_label, SELL_COLOR),
        ] {
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(|e| anyhow!("Failed to draw {label} series: {e}"))?
                .label(label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });

            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )
                .map_err(|e| anyhow!("Failed to draw {label} markers: {e}"))?;

            chart
                .draw_series(callout_indices(points.len()).into_iter().map(|i| {
                    let (x, y) = points[i];
                    EmptyElement::at((x, y))
                        + Circle::new((0, 0), 6, color.filled())
                        + Text::new(y.to_string(), (-12, -24), ("sans-serif", 15).into_font())
                }))
                .map_err(|e| anyhow!("Failed to draw {label} callouts: {e}"))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| anyhow!("Failed to draw chart legend: {e}"))?;

        root.present()
            .map_err(|e| anyhow!("Failed to write chart: {e}"))?;
        Ok(())
    }
}

/// Vertical axis bounds: every price plus a tenth of the spread (at least 10)
/// on both sides, clamped to the `i64` range.
fn price_range(history: &PriceHistory) -> Range<i64> {
    let (low, high) = history
        .records()
        .iter()
        .flat_map(|r| [r.buy_price, r.sell_price])
        .fold((i64::MAX, i64::MIN), |(lo, hi), p| (lo.min(p), hi.max(p)));
    let pad = (high.saturating_sub(low) / 10).max(10);
    low.saturating_sub(pad)..high.saturating_add(pad)
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, history: &PriceHistory) -> Result<()> {
        if history.is_empty() {
            info!("No price history to chart");
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        debug!(path = %self.path.display(), rows = history.len(), "Drawing price chart");
        self.draw(history)
            .with_context(|| format!("Failed to render chart to {}", self.path.display()))?;
        println!("Chart written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PriceRecord;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn record(date: &str, buy: i64, sell: i64) -> PriceRecord {
        PriceRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            buy_price: buy,
            sell_price: sell,
        }
    }

    #[test]
    fn test_chart_contains_series_and_callouts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("charts").join("gold.svg");
        let renderer = SvgChartRenderer::new(&path, &ChartConfig::default());
        let history = PriceHistory::from(vec![
            record("2024-01-02", 2900, 2860),
            record("2024-01-03", 2911, 2871),
            record("2024-01-04", 2922, 2882),
            record("2024-01-05", 2933, 2893),
        ]);

        renderer.render(&history).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("台灣銀行黃金牌價"));
        assert!(svg.contains("賣出價格"));
        assert!(svg.contains("買進價格"));
        // Callouts at index 0 and len / 2
        assert!(svg.contains(">2900<"));
        assert!(svg.contains(">2922<"));
        assert!(svg.contains(">2860<"));
        assert!(svg.contains(">2882<"));
    }

    #[test]
    fn test_single_record_chart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gold.svg");
        let renderer = SvgChartRenderer::new(&path, &ChartConfig::default());

        renderer
            .render(&PriceHistory::from(vec![record("2024-01-02", 2900, 2860)]))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_history_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gold.svg");
        let renderer = SvgChartRenderer::new(&path, &ChartConfig::default());

        renderer.render(&PriceHistory::new()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_price_range_pads_spread() {
        let history = PriceHistory::from(vec![
            record("2024-01-02", 2900, 2800),
            record("2024-01-03", 3000, 2850),
        ]);
        assert_eq!(price_range(&history), 2780..3020);

        let flat = PriceHistory::from(vec![record("2024-01-02", 2900, 2900)]);
        assert_eq!(price_range(&flat), 2890..2910);
    }

    #[test]
    fn test_price_range_extreme_prices_saturate() {
        let history = PriceHistory::from(vec![record("2024-01-02", i64::MAX, i64::MIN)]);
        assert_eq!(price_range(&history), i64::MIN..i64::MAX);

        let high = PriceHistory::from(vec![record("2024-01-02", i64::MAX, i64::MAX - 5)]);
        assert_eq!(price_range(&high), (i64::MAX - 15)..i64::MAX);
    }
}
