use anyhow::Result;
use cambio::core::CurrencyPair;
use cambio::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount at the current rate
    Convert {
        /// Amount in the source currency
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Currency pair such as BRL/COP (defaults to the configured pair)
        #[arg(long)]
        pair: Option<CurrencyPair>,
    },
    /// Fetch the current rate once, record it and notify
    Refresh,
    /// Display the recorded rate history
    History,
    /// Refresh on the configured weekday schedule until interrupted
    Watch,
}

impl From<Commands> for cambio::AppCommand {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Convert { amount, pair } => cambio::AppCommand::Convert { amount, pair },
            Commands::Refresh => cambio::AppCommand::Refresh,
            Commands::History => cambio::AppCommand::History,
            Commands::Watch => cambio::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => cambio::cli::setup::setup_at_path(path),
            None => cambio::cli::setup::setup(),
        },
        Some(cmd) => cambio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
