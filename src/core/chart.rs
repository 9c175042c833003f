//! Presentation abstractions

use crate::core::history::PriceHistory;
use anyhow::Result;

/// Receives the final history of a run for display.
pub trait ChartRenderer {
    fn render(&self, history: &PriceHistory) -> Result<()>;
}

/// Indices that get a value label on each series: the first and the middle one.
pub fn callout_indices(len: usize) -> Vec<usize> {
    match len {
        0 => Vec::new(),
        1 => vec![0],
        n => vec![0, n / 2],
    }
}
