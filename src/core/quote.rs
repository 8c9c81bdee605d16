//! Quote abstractions and core types

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const BLUE: &str = "Blue";
pub const OFICIAL: &str = "Oficial";
pub const REAL_BLUE: &str = "Real Blue";
pub const EURO: &str = "Euro";

/// Buy and sell price of one currency variant, in pesos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyQuote {
    pub name: String,
    pub house: String,
    pub buy: Decimal,
    pub sell: Decimal,
    pub currency_code: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CurrencyQuote {
    /// Short name used in tables, alerts and the converter.
    pub fn label(&self) -> &str {
        match self.name.as_str() {
            "Contado con liquidación" => "CCL",
            "Bolsa" => "MEP",
            other => other,
        }
    }
}

/// One complete set of quotes produced by a single poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub dollars: Vec<CurrencyQuote>,
    pub real_blue: Option<CurrencyQuote>,
    pub euro: Option<CurrencyQuote>,
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    /// Every quote in display order: dollars, then Real Blue, then Euro.
    pub fn quotes(&self) -> impl Iterator<Item = &CurrencyQuote> {
        self.dollars
            .iter()
            .chain(self.real_blue.iter())
            .chain(self.euro.iter())
    }

    pub fn find(&self, label: &str) -> Option<&CurrencyQuote> {
        self.quotes().find(|q| {
            q.label().eq_ignore_ascii_case(label) || q.name.eq_ignore_ascii_case(label)
        })
    }

    /// Sell price per label.
    pub fn sell_prices(&self) -> HashMap<String, Decimal> {
        self.quotes()
            .map(|q| (q.label().to_string(), q.sell))
            .collect()
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// All dollar variants, in source order.
    async fn fetch_dollars(&self) -> Result<Vec<CurrencyQuote>, FetchError>;

    /// A single currency quote by its ISO-ish code (`brl`, `eur`, `clp`, ...).
    async fn fetch_quote(&self, code: &str) -> Result<CurrencyQuote, FetchError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn quote(name: &str, house: &str, buy: Decimal, sell: Decimal) -> CurrencyQuote {
        CurrencyQuote {
            name: name.to_string(),
            house: house.to_string(),
            buy,
            sell,
            currency_code: "USD".to_string(),
            updated_at: None,
        }
    }
}
