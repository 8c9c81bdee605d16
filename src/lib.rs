pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::ui::Palette;
use crate::core::alert::{AlertBook, AlertCondition};
use crate::core::config::AppConfig;
use crate::core::history::{HistoryProvider, HistoryWindow};
use crate::core::poller::Poller;
use crate::core::quote::QuoteProvider;
use crate::core::service::RatesService;
use crate::core::settings::{SETTINGS_COLLECTION, SettingsStore, Theme};
use crate::providers::{ArgentinaDatosProvider, DolarApiProvider};
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Converter when pinned, rates otherwise.
    Default,
    Rates,
    Watch,
    Convert {
        amount: Option<Decimal>,
        currency: Option<String>,
        reverse: bool,
    },
    History {
        house: String,
        window: HistoryWindow,
    },
    Quote {
        code: String,
    },
    Alerts(AlertsCommand),
    Settings(SettingsCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertsCommand {
    List,
    Add {
        currency: String,
        condition: AlertCondition,
        target: Decimal,
    },
    Toggle {
        id: String,
    },
    Remove {
        id: String,
    },
    Check,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsCommand {
    Show,
    Theme(Theme),
    Pin(bool),
}

/// Everything a command needs, built once per invocation.
pub struct App {
    pub config: AppConfig,
    pub settings: SettingsStore,
    pub service: Arc<RatesService>,
    _store: KeyValueStore,
}

impl App {
    pub async fn open(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        let store = KeyValueStore::open(&data_path)?;
        let settings = SettingsStore::load(store.get_collection(SETTINGS_COLLECTION, true)?)
            .await
            .context("Failed to load settings")?;

        let quotes: Arc<dyn QuoteProvider> =
            Arc::new(DolarApiProvider::new(&config.providers.dolarapi.base_url)?);
        let history: Arc<dyn HistoryProvider> = Arc::new(ArgentinaDatosProvider::new(
            &config.providers.argentinadatos.base_url,
        )?);
        let service = Arc::new(RatesService::new(
            quotes,
            history,
            config.polling.query_options(),
            config.history.query_options(),
        ));

        Ok(Self {
            config,
            settings,
            service,
            _store: store,
        })
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.settings.settings().theme)
    }

    pub async fn alert_book(&self) -> Result<AlertBook> {
        AlertBook::load(self.settings.collection())
            .await
            .context("Failed to load alerts")
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("preciodolar starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let mut app = App::open(config).await?;
    let palette = app.palette();

    match command {
        AppCommand::Default => {
            if app.settings.settings().calculator_pinned {
                cli::convert::run(&app.service, &palette, None, None, false).await
            } else {
                cli::rates::run(&app.service, &palette).await
            }
        }
        AppCommand::Rates => cli::rates::run(&app.service, &palette).await,
        AppCommand::Watch => {
            let book = app.alert_book().await?;
            let interval = app.config.polling.refetch_interval();
            let mut poller = Poller::new(Arc::clone(&app.service), interval);
            cli::watch::run(&mut poller, &book, &palette, interval).await
        }
        AppCommand::Convert {
            amount,
            currency,
            reverse,
        } => {
            cli::convert::run(&app.service, &palette, amount, currency.as_deref(), reverse).await
        }
        AppCommand::History { house, window } => {
            cli::history::run(&app.service, &palette, &house, window).await
        }
        AppCommand::Quote { code } => cli::quote::run(&app.service, &palette, &code).await,
        AppCommand::Alerts(command) => {
            let mut book = app.alert_book().await?;
            match command {
                AlertsCommand::List => cli::alerts::list(&book, &palette),
                AlertsCommand::Add {
                    currency,
                    condition,
                    target,
                } => cli::alerts::add(&mut book, &currency, condition, target).await,
                AlertsCommand::Toggle { id } => cli::alerts::toggle(&mut book, &id).await,
                AlertsCommand::Remove { id } => cli::alerts::remove(&mut book, &id).await,
                AlertsCommand::Check => cli::alerts::check(&book, &app.service, &palette).await,
            }
        }
        AppCommand::Settings(command) => match command {
            SettingsCommand::Show => cli::settings::show(&app.settings, &palette),
            SettingsCommand::Theme(theme) => cli::settings::set_theme(&mut app.settings, theme).await,
            SettingsCommand::Pin(pinned) => {
                cli::settings::set_pinned(&mut app.settings, pinned).await
            }
        },
    }
}
