//! Price history types and the storage abstraction

use crate::core::error::TrackerError;
use crate::core::quote::PriceQuote;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column names of the persisted history file, in order.
pub const HISTORY_HEADER: [&str; 3] = ["Date", "Buy Price", "Sell Price"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Buy Price")]
    pub buy_price: i64,
    #[serde(rename = "Sell Price")]
    pub sell_price: i64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, quote: PriceQuote) -> Self {
        Self {
            date,
            buy_price: quote.buy_price,
            sell_price: quote.sell_price,
        }
    }
}

/// Daily records in insertion order. Insertion order is expected to match
/// date order but nothing enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceHistory {
    records: Vec<PriceRecord>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    /// Date of the most recent known quote.
    pub fn most_recent_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub(crate) fn push(&mut self, record: PriceRecord) {
        self.records.push(record);
    }

    /// Dates that occur more than once, in order of their second occurrence.
    pub fn duplicate_dates(&self) -> Vec<NaiveDate> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| !seen.insert(r.date))
            .map(|r| r.date)
            .collect()
    }
}

impl From<Vec<PriceRecord>> for PriceHistory {
    fn from(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }
}

pub trait HistoryStore {
    /// Reads the whole persisted history. A missing backing file is
    /// `TrackerError::HistoryNotFound`; the caller decides how to react.
    fn load(&self) -> Result<PriceHistory, TrackerError>;

    /// Overwrites the persisted history with `history`.
    fn save(&self, history: &PriceHistory) -> Result<(), TrackerError>;

    /// Adds `record` as the last element and persists the full history.
    /// `history` is only extended once the save succeeded.
    fn append(&self, history: &mut PriceHistory, record: PriceRecord) -> Result<(), TrackerError> {
        let mut updated = history.clone();
        updated.push(record);
        self.save(&updated)?;
        *history = updated;
        Ok(())
    }
}
