//! jms-toolkit: serve the toolkit over HTTP on the in-memory broker.
//!
//! Usage: `jms-toolkit [config.toml]`. Without an argument the path is read
//! from `JMS_TOOLKIT_CONFIG`; without either, built-in defaults are used.

use std::sync::Arc;

use jms_toolkit::config::CONFIG_ENV;
use jms_toolkit::{http, logging, Dispatcher, InMemoryBroker, ToolkitConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());
    let config = match &path {
        Some(path) => {
            tracing::info!(path = %path, "loading configuration");
            ToolkitConfig::load(path)?
        }
        None => ToolkitConfig::default(),
    };

    let directory = config.directory()?;
    let broker = InMemoryBroker::new();
    tracing::info!(url = %config.broker.url, "using in-memory broker");

    let bind = config.http.bind.clone();
    let dispatcher = tokio::task::spawn_blocking(move || {
        Arc::new(Dispatcher::bootstrap(Arc::new(broker), directory, config.gateway))
    })
    .await?;

    tracing::info!(bind = %bind, "listening");
    http::serve(dispatcher, &bind).await?;
    Ok(())
}
