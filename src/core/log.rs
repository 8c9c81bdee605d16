use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// the tables printed on stdout.
///
/// `RUST_LOG`, when set, decides everything. Otherwise only this crate logs,
/// at DEBUG with `verbose` and not at all without it.
pub fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter.boxed(),
        Err(_) => app_targets(verbose).boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

fn app_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    Targets::new()
        .with_target("preciodolar", level)
        .with_target("fjall", LevelFilter::WARN.min(level))
}
