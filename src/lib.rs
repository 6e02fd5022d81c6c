//! costwatch - daily cloud billing aggregation and spend recommendations

pub mod cli;
pub mod config;
pub mod format;
pub mod services;
pub mod sources;
pub mod tui;
pub mod types;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter (e.g. `debug`, `costwatch=info`)
pub const LOG_ENV: &str = "COSTWATCH_LOG";

/// Install the global tracing subscriber writing to stderr.
///
/// `$COSTWATCH_LOG` wins over `default_filter`. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
