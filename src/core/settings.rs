//! User preferences persisted in the local key-value store
//!
//! Loaded once at startup and written through on every change. The store is
//! passed explicitly to whatever needs it.

use crate::core::kv::KeyValueCollection;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SETTINGS_COLLECTION: &str = "settings";

const THEME_KEY: &[u8] = b"theme";
const CALCULATOR_PINNED_KEY: &[u8] = b"calculator_pinned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Theme::Light => "light",
                Theme::Dark => "dark",
                Theme::System => "system",
            }
        )
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(anyhow!("Invalid theme: {}", s)),
        }
    }
}

impl Theme {
    /// Resolves `System` from the terminal's `COLORFGBG` hint, defaulting to dark.
    pub fn resolve(self) -> Theme {
        match self {
            Theme::System => match std::env::var("COLORFGBG") {
                Ok(value) => Self::from_colorfgbg(&value),
                Err(_) => Theme::Dark,
            },
            other => other,
        }
    }

    fn from_colorfgbg(value: &str) -> Theme {
        // "fg;bg", background 7 or 15 is a light terminal
        match value.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()) {
            Some(7) | Some(15) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub theme: Theme,
    pub calculator_pinned: bool,
}

pub struct SettingsStore {
    collection: Arc<dyn KeyValueCollection>,
    current: Settings,
}

impl SettingsStore {
    /// Reads the stored preferences. Unreadable entries fall back to defaults.
    pub async fn load(collection: Arc<dyn KeyValueCollection>) -> Result<Self> {
        let theme: Theme = read_json(collection.as_ref(), THEME_KEY)
            .await?
            .unwrap_or_default();
        let calculator_pinned: bool = read_json(collection.as_ref(), CALCULATOR_PINNED_KEY)
            .await?
            .unwrap_or_default();
        let current = Settings {
            theme,
            calculator_pinned,
        };
        debug!(?current, "Loaded settings");

        Ok(Self {
            collection,
            current,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    pub fn collection(&self) -> Arc<dyn KeyValueCollection> {
        Arc::clone(&self.collection)
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Result<()> {
        write_json(self.collection.as_ref(), THEME_KEY, &theme).await?;
        self.current.theme = theme;
        Ok(())
    }

    pub async fn set_calculator_pinned(&mut self, pinned: bool) -> Result<()> {
        write_json(self.collection.as_ref(), CALCULATOR_PINNED_KEY, &pinned).await?;
        self.current.calculator_pinned = pinned;
        Ok(())
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    collection: &dyn KeyValueCollection,
    key: &[u8],
) -> Result<Option<T>> {
    let Some(bytes) = collection.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(
                key = %String::from_utf8_lossy(key),
                error = %e,
                "Ignoring unreadable stored value"
            );
            Ok(None)
        }
    }
}

pub(crate) async fn write_json<T: Serialize>(
    collection: &dyn KeyValueCollection,
    key: &[u8],
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value).context("Failed to serialize setting")?;
    collection.put(key, &bytes).await
}
