use anyhow::Result;
use aurum::core::log::init_logging;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Date to treat as today (YYYY-MM-DD), defaults to the local date
    #[arg(short, long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for aurum::AppCommand {
    fn from(cmd: Commands) -> aurum::AppCommand {
        match cmd {
            Commands::Update => aurum::AppCommand::Update,
            Commands::Show => aurum::AppCommand::Show,
            Commands::Quote => aurum::AppCommand::Quote,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record today's price if needed and chart the history (default)
    Update,
    /// Chart the stored history without fetching
    Show,
    /// Print the current buy and sell prices
    Quote,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Update) {
        Commands::Setup => aurum::cli::setup::setup(),
        cmd => aurum::run_command(cmd.into(), cli.config_path.as_deref(), cli.date).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
