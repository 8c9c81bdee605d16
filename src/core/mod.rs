//! Core business logic abstractions

pub mod aggregate;
pub mod alert;
pub mod config;
pub mod converter;
pub mod error;
pub mod history;
pub mod kv;
pub mod log;
pub mod poller;
pub mod query;
pub mod quote;
pub mod retry;
pub mod service;
pub mod settings;

// Re-export main types for cleaner imports
pub use error::{FetchError, QuoteFetchError};
pub use history::{HistoricalPoint, HistoryProvider, HistorySeries, HistoryWindow};
pub use quote::{CurrencyQuote, QuoteProvider, Snapshot};
