//! Historical price series and time windows

use crate::core::error::FetchError;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Houses the history endpoint knows about.
pub const HOUSES: [&str; 7] = [
    "blue",
    "oficial",
    "bolsa",
    "contadoconliqui",
    "tarjeta",
    "mayorista",
    "cripto",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub house: String,
    pub buy: Decimal,
    pub sell: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum HistoryWindow {
    ThirtyDays,
    SixMonths,
    YearToDate,
    OneYear,
    FiveYears,
    All,
}

impl Display for HistoryWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                HistoryWindow::ThirtyDays => "30d",
                HistoryWindow::SixMonths => "6m",
                HistoryWindow::YearToDate => "ytd",
                HistoryWindow::OneYear => "1y",
                HistoryWindow::FiveYears => "5y",
                HistoryWindow::All => "all",
            }
        )
    }
}

impl FromStr for HistoryWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "30d" => Ok(HistoryWindow::ThirtyDays),
            "6m" => Ok(HistoryWindow::SixMonths),
            "ytd" => Ok(HistoryWindow::YearToDate),
            "1y" => Ok(HistoryWindow::OneYear),
            "5y" => Ok(HistoryWindow::FiveYears),
            "all" => Ok(HistoryWindow::All),
            _ => Err(anyhow!("Invalid history window: {}", s)),
        }
    }
}

impl HistoryWindow {
    /// Number of trailing entries kept, `None` for the whole series.
    pub fn entry_count(&self, today: NaiveDate) -> Option<usize> {
        match self {
            HistoryWindow::ThirtyDays => Some(30),
            HistoryWindow::SixMonths => Some(180),
            HistoryWindow::YearToDate => Some(today.ordinal() as usize),
            HistoryWindow::OneYear => Some(365),
            HistoryWindow::FiveYears => Some(365 * 5),
            HistoryWindow::All => None,
        }
    }

    pub fn slice<'a>(&self, points: &'a [HistoricalPoint], today: NaiveDate) -> &'a [HistoricalPoint] {
        match self.entry_count(today) {
            Some(n) => &points[points.len().saturating_sub(n)..],
            None => points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    pub house: String,
    pub window: HistoryWindow,
    pub points: Vec<HistoricalPoint>,
}

impl HistorySeries {
    pub fn first(&self) -> Option<&HistoricalPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&HistoricalPoint> {
        self.points.last()
    }

    /// Percentage change of the sell price across the window.
    pub fn variation(&self) -> Decimal {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => calculate_variation(last.sell, first.sell),
            _ => Decimal::ZERO,
        }
    }

    pub fn sell_range(&self) -> Option<(Decimal, Decimal)> {
        let min = self.points.iter().map(|p| p.sell).min()?;
        let max = self.points.iter().map(|p| p.sell).max()?;
        Some((min, max))
    }
}

/// Percentage change from `previous` to `current`; zero when `previous` is zero.
pub fn calculate_variation(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    (current - previous) / previous * Decimal::ONE_HUNDRED
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Full chronological series for a dollar house.
    async fn fetch_history(&self, house: &str) -> Result<Vec<HistoricalPoint>, FetchError>;
}
