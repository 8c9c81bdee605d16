use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use preciodolar::core::alert::AlertCondition;
use preciodolar::core::history::HistoryWindow;
use preciodolar::core::log::init_logging;
use preciodolar::core::settings::Theme;
use preciodolar::{AlertsCommand, AppCommand, SettingsCommand};
use rust_decimal::Decimal;

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
    /// Display current exchange rates
    Rates,
    /// Keep the rates on screen, refreshing periodically
    Watch,
    /// Convert between pesos and another currency
    Convert {
        /// Amount to convert; omit to show a reference table
        amount: Option<Decimal>,
        /// Currency to convert with (Blue, Oficial, MEP, CCL, Real Blue, ...)
        #[arg(short = 'C', long)]
        currency: Option<String>,
        /// Treat the amount as pesos
        #[arg(short, long)]
        reverse: bool,
    },
    /// Display historical rates for a dollar house
    History {
        /// House: blue, oficial, bolsa, contadoconliqui, tarjeta, mayorista, cripto
        #[arg(default_value = "blue")]
        house: String,
        /// Period: 30d, 6m, ytd, 1y, 5y, all
        #[arg(short, long, default_value = "30d")]
        window: HistoryWindow,
    },
    /// Display a single currency quote by code (brl, eur, clp, uyu, ...)
    Quote { code: String },
    /// Manage price alerts
    #[command(subcommand)]
    Alerts(AlertsCommands),
    /// View or change preferences
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
enum AlertsCommands {
    /// List configured alerts
    List,
    /// Create an alert
    Add {
        /// Blue, Oficial, MEP, CCL, Tarjeta, Real Blue or Euro
        currency: String,
        /// above or below
        condition: AlertCondition,
        /// Target sell price in pesos
        target: Decimal,
    },
    /// Pause or resume an alert
    Toggle { id: String },
    /// Delete an alert
    Remove { id: String },
    /// Compare alerts with the current rates
    Check,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current preferences
    Show,
    /// Set the color theme: light, dark or system
    Theme { theme: Theme },
    /// Open the converter when no command is given
    Pin {
        #[arg(action = ArgAction::Set)]
        pinned: bool,
    },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Rates => AppCommand::Rates,
            Commands::Watch => AppCommand::Watch,
            Commands::Convert {
                amount,
                currency,
                reverse,
            } => AppCommand::Convert {
                amount,
                currency,
                reverse,
            },
            Commands::History { house, window } => AppCommand::History { house, window },
            Commands::Quote { code } => AppCommand::Quote { code },
            Commands::Alerts(command) => AppCommand::Alerts(command.into()),
            Commands::Settings(command) => AppCommand::Settings(command.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

impl From<AlertsCommands> for AlertsCommand {
    fn from(cmd: AlertsCommands) -> AlertsCommand {
        match cmd {
            AlertsCommands::List => AlertsCommand::List,
            AlertsCommands::Add {
                currency,
                condition,
                target,
            } => AlertsCommand::Add {
                currency,
                condition,
                target,
            },
            AlertsCommands::Toggle { id } => AlertsCommand::Toggle { id },
            AlertsCommands::Remove { id } => AlertsCommand::Remove { id },
            AlertsCommands::Check => AlertsCommand::Check,
        }
    }
}

impl From<SettingsCommands> for SettingsCommand {
    fn from(cmd: SettingsCommands) -> SettingsCommand {
        match cmd {
            SettingsCommands::Show => SettingsCommand::Show,
            SettingsCommands::Theme { theme } => SettingsCommand::Theme(theme),
            SettingsCommands::Pin { pinned } => SettingsCommand::Pin(pinned),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => preciodolar::cli::setup::setup_at_path(path),
            None => preciodolar::cli::setup::setup(),
        },
        Some(cmd) => preciodolar::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => preciodolar::run_command(AppCommand::Default, cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
