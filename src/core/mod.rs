//! Core business logic abstractions

pub mod chart;
pub mod config;
pub mod error;
pub mod history;
pub mod log;
pub mod quote;

// Re-export main types for cleaner imports
pub use chart::ChartRenderer;
pub use error::TrackerError;
pub use history::{HistoryStore, PriceHistory, PriceRecord};
pub use quote::{PriceQuote, QuoteProvider};
