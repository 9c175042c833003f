pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod tracker;

use crate::cli::{Presenter, ui};
use crate::core::ChartRenderer;
use crate::core::config::AppConfig;
use crate::providers::BankTableProvider;
use crate::store::CsvHistoryStore;
use crate::tracker::{GoldTracker, RunOutcome, SkipReason};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Update the history with today's quote, then render it
    Update,
    /// Render the stored history without contacting the source
    Show,
    /// Print the current buy and sell prices
    Quote,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    today: Option<NaiveDate>,
) -> Result<()> {
    info!("Gold price tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let provider = BankTableProvider::new(&config.bot_url, config.table_layout.clone())?;
    let store = CsvHistoryStore::new(config.history_path());
    let mut tracker = GoldTracker::new(&provider, &store, today);

    match command {
        AppCommand::Update => {
            let presenter = Presenter::new(&config);
            let outcome = tracker.run(&presenter).await?;
            report_outcome(&outcome);
            if outcome == RunOutcome::Aborted {
                bail!(
                    "Price history is not loaded properly from {}. Cannot proceed.",
                    store.path().display()
                );
            }
        }
        AppCommand::Show => {
            tracker.ensure_loaded()?;
            Presenter::new(&config).render(tracker.history())?;
        }
        AppCommand::Quote => {
            let buy = tracker.current_buy_price().await?;
            let sell = tracker.current_sell_price().await?;
            println!(
                "{}: {}  {}: {}",
                config.chart.buy_label,
                ui::style_text(&buy.to_string(), ui::StyleType::Value),
                config.chart.sell_label,
                ui::style_text(&sell.to_string(), ui::StyleType::Value),
            );
        }
    }

    Ok(())
}

fn report_outcome(outcome: &RunOutcome) {
    let message = match outcome {
        RunOutcome::Aborted => return,
        RunOutcome::Updated(record) => ui::style_text(
            &format!(
                "Recorded {}: buy {} / sell {}",
                record.date, record.buy_price, record.sell_price
            ),
            ui::StyleType::Value,
        ),
        RunOutcome::Skipped(SkipReason::Weekend) => ui::style_text(
            "It's the weekend, no need to update the price from the web.",
            ui::StyleType::Subtle,
        ),
        RunOutcome::Skipped(SkipReason::AlreadyCurrent) => ui::style_text(
            "No need to update, already have the latest price.",
            ui::StyleType::Subtle,
        ),
        RunOutcome::Skipped(SkipReason::SourceUnavailable) => ui::style_text(
            "Can't get current prices for now; showing stored history.",
            ui::StyleType::Warning,
        ),
    };
    println!("{message}");
}
