//! Price alerts and their evaluation against a snapshot

use crate::core::kv::KeyValueCollection;
use crate::core::quote::Snapshot;
use crate::core::settings::{read_json, write_json};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const ALERTS_KEY: &[u8] = b"alerts";

/// Currency labels an alert can watch.
pub const ALERT_CURRENCIES: [&str; 7] = [
    "Blue",
    "Oficial",
    "MEP",
    "CCL",
    "Tarjeta",
    "Real Blue",
    "Euro",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
        }
    }
}

impl FromStr for AlertCondition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            _ => Err(anyhow!("Invalid alert condition: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: String,
    pub currency: String,
    pub target_price: Decimal,
    pub condition: AlertCondition,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Whether `current_price` satisfies the alert. Both bounds are inclusive.
/// A zero price counts as unknown.
pub fn is_triggered(alert: &PriceAlert, current_price: Option<Decimal>) -> bool {
    let Some(price) = current_price.filter(|price| !price.is_zero()) else {
        return false;
    };
    match alert.condition {
        AlertCondition::Above => price >= alert.target_price,
        AlertCondition::Below => price <= alert.target_price,
    }
}

/// The user's alert list, persisted as one JSON array.
pub struct AlertBook {
    collection: Arc<dyn KeyValueCollection>,
    alerts: Vec<PriceAlert>,
}

impl AlertBook {
    pub async fn load(collection: Arc<dyn KeyValueCollection>) -> Result<Self> {
        let alerts: Vec<PriceAlert> = read_json(collection.as_ref(), ALERTS_KEY)
            .await?
            .unwrap_or_default();
        debug!(count = alerts.len(), "Loaded alerts");
        Ok(Self { collection, alerts })
    }

    pub fn list(&self) -> &[PriceAlert] {
        &self.alerts
    }

    /// Expands a unique id prefix to the full alert id.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        let mut matches = self.alerts.iter().filter(|a| a.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(alert), None) => Ok(alert.id.clone()),
            (Some(_), Some(_)) => bail!("Alert id prefix '{}' is ambiguous", prefix),
            (None, _) => bail!("No alert with id {}", prefix),
        }
    }

    async fn save(&self) -> Result<()> {
        write_json(self.collection.as_ref(), ALERTS_KEY, &self.alerts).await
    }

    pub async fn add(
        &mut self,
        currency: &str,
        target_price: Decimal,
        condition: AlertCondition,
    ) -> Result<PriceAlert> {
        let Some(currency) = ALERT_CURRENCIES
            .iter()
            .find(|c| c.eq_ignore_ascii_case(currency))
        else {
            bail!(
                "Unknown currency '{}', expected one of: {}",
                currency,
                ALERT_CURRENCIES.join(", ")
            );
        };
        if target_price <= Decimal::ZERO {
            bail!("Target price must be positive, got {}", target_price);
        }

        let alert = PriceAlert {
            id: uuid::Uuid::new_v4().to_string(),
            currency: currency.to_string(),
            target_price,
            condition,
            active: true,
            created_at: Utc::now(),
        };
        self.alerts.push(alert.clone());
        self.save().await?;
        info!(id = %alert.id, currency = %alert.currency, "Created alert");
        Ok(alert)
    }

    /// Flips the active flag and returns the new state.
    pub async fn toggle(&mut self, id: &str) -> Result<bool> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| anyhow!("No alert with id {}", id))?;
        alert.active = !alert.active;
        let active = alert.active;
        self.save().await?;
        Ok(active)
    }

    pub async fn remove(&mut self, id: &str) -> Result<PriceAlert> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| anyhow!("No alert with id {}", id))?;
        let removed = self.alerts.remove(index);
        self.save().await?;
        Ok(removed)
    }

    /// Pairs every alert with its trigger state for the snapshot's sell prices.
    pub fn evaluate<'a>(&'a self, snapshot: &Snapshot) -> Vec<(&'a PriceAlert, bool)> {
        let prices = snapshot.sell_prices();
        self.alerts
            .iter()
            .map(|alert| (alert, is_triggered(alert, prices.get(&alert.currency).copied())))
            .collect()
    }

    /// Active alerts whose condition currently holds.
    pub fn triggered<'a>(&'a self, snapshot: &Snapshot) -> Vec<&'a PriceAlert> {
        self.evaluate(snapshot)
            .into_iter()
            .filter(|(alert, triggered)| alert.active && *triggered)
            .map(|(alert, _)| alert)
            .collect()
    }
}
