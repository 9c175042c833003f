//! Quote abstractions and core types

use crate::core::error::TrackerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A buy/sell price pair as published by the source on the day it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub buy_price: i64,
    pub sell_price: i64,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_current_quote(&self) -> Result<PriceQuote, TrackerError>;
}
