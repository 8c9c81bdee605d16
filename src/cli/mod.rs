pub mod alerts;
pub mod convert;
pub mod history;
pub mod quote;
pub mod rates;
pub mod settings;
pub mod setup;
pub mod ui;
pub mod watch;
