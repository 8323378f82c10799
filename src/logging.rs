//! Structured logging setup.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "jms_toolkit=info";

/// Install the console subscriber. Safe to call more than once.
///
/// The level comes from `RUST_LOG` when set, otherwise [`DEFAULT_FILTER`].
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter),
        );

        // Another subscriber may already be installed (tests, embedding apps)
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already set; keeping it");
        }
    });
}
