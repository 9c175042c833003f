//! Daily update of the gold price history

use crate::core::{
    ChartRenderer, HistoryStore, PriceHistory, PriceQuote, PriceRecord, QuoteProvider,
    TrackerError,
};
use chrono::{Datelike, NaiveDate, Weekday};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Weekend,
    AlreadyCurrent,
    SourceUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// History could not be loaded; nothing was fetched or rendered.
    Aborted,
    Skipped(SkipReason),
    Updated(PriceRecord),
}

/// No quotes are fetched on Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Keeps the persisted history in step with the quote source for one run.
///
/// `today` is fixed at construction. A successfully fetched quote is kept for
/// the rest of the run and shared by the update step and the
/// `current_*_price` accessors; failed fetches are not cached.
pub struct GoldTracker<'a> {
    provider: &'a (dyn QuoteProvider + Send + Sync),
    store: &'a dyn HistoryStore,
    today: NaiveDate,
    history: PriceHistory,
    quote: OnceCell<PriceQuote>,
}

impl<'a> GoldTracker<'a> {
    pub fn new(
        provider: &'a (dyn QuoteProvider + Send + Sync),
        store: &'a dyn HistoryStore,
        today: NaiveDate,
    ) -> Self {
        Self {
            provider,
            store,
            today,
            history: PriceHistory::new(),
            quote: OnceCell::new(),
        }
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    /// Loads the persisted history unless one is already in memory.
    pub fn ensure_loaded(&mut self) -> Result<(), TrackerError> {
        if self.history.is_empty() {
            self.history = self.store.load()?;
            debug!(rows = self.history.len(), "History loaded");
        }
        Ok(())
    }

    async fn cached_quote(&self) -> Result<PriceQuote, TrackerError> {
        self.quote
            .get_or_try_init(|| self.provider.fetch_current_quote())
            .await
            .copied()
    }

    pub async fn current_buy_price(&self) -> Result<i64, TrackerError> {
        Ok(self.cached_quote().await?.buy_price)
    }

    pub async fn current_sell_price(&self) -> Result<i64, TrackerError> {
        Ok(self.cached_quote().await?.sell_price)
    }

    /// Appends today's quote unless it is the weekend or today is already
    /// recorded. An unavailable source leaves the history untouched.
    pub async fn update(&mut self) -> Result<RunOutcome, TrackerError> {
        if is_weekend(self.today) {
            info!(today = %self.today, "Weekend, not updating prices from the web");
            return Ok(RunOutcome::Skipped(SkipReason::Weekend));
        }

        let latest = self.history.most_recent_date();
        if latest == Some(self.today) {
            info!(today = %self.today, "Already have the latest price");
            return Ok(RunOutcome::Skipped(SkipReason::AlreadyCurrent));
        }
        if latest.is_some_and(|d| d > self.today) {
            warn!(today = %self.today, latest = ?latest, "History ends after today");
        }

        match self.cached_quote().await {
            Ok(quote) => {
                let record = PriceRecord::new(self.today, quote);
                self.store.append(&mut self.history, record)?;
                info!(?record, "Appended today's price");
                Ok(RunOutcome::Updated(record))
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Can't get current prices for now");
                Ok(RunOutcome::Skipped(SkipReason::SourceUnavailable))
            }
            Err(e) => Err(e),
        }
    }

    /// Full run: load, update, render.
    pub async fn run(&mut self, renderer: &dyn ChartRenderer) -> anyhow::Result<RunOutcome> {
        if let Err(e) = self.ensure_loaded() {
            return match e {
                TrackerError::HistoryNotFound(path) => {
                    error!(path = %path.display(), "Price history is not loaded, cannot proceed");
                    Ok(RunOutcome::Aborted)
                }
                other => Err(other.into()),
            };
        }

        let outcome = self.update().await?;
        renderer.render(&self.history)?;
        Ok(outcome)
    }
}
