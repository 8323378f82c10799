//! Queue gateway.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::{drain_consumer, Gateway, Listing};
use crate::broker::{ConnectionFactory, MessageProducer, QueueBrowser};
use crate::config::GatewayConfig;
use crate::resource::ResourceKind;
use crate::session::{DestinationSession, Mode};

/// Send, browse and drain for queues.
///
/// Each operation uses its own fixed client id from [`GatewayConfig`].
/// Browsing goes through a queue browser and never removes anything.
pub struct QueueGateway {
    factory: Arc<dyn ConnectionFactory>,
    config: GatewayConfig,
}

impl QueueGateway {
    pub fn new(factory: Arc<dyn ConnectionFactory>, config: GatewayConfig) -> Self {
        Self { factory, config }
    }

    fn session(&self, client_id: &str, mode: Mode) -> DestinationSession<'_> {
        DestinationSession::new(self.factory.as_ref(), client_id, mode)
    }
}

impl Gateway for QueueGateway {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Queue
    }

    fn send(&self, code: &str, body: &str) -> bool {
        info!(queue = code, "send - start");

        let outcome = self
            .session(&self.config.queue_send_client_id, Mode::Produce)
            .run(|scope| {
                let queue = scope.queue(code)?;
                let message = scope.text_message(body)?;
                scope.producer(&queue)?.send(message)
            });

        let sent = match outcome {
            Ok(()) => {
                debug!(queue = code, body, "message sent");
                true
            }
            Err(e) => {
                error!(queue = code, error = %e, "send failed");
                false
            }
        };
        info!(queue = code, "send - end");
        sent
    }

    fn browse(&self, code: &str) -> Listing {
        info!(queue = code, "browse - start");

        let mut listing = Listing::new();
        let outcome = self
            .session(&self.config.queue_browse_client_id, Mode::Browse)
            .run(|scope| {
                let queue = scope.queue(code)?;
                let mut browser = scope.browser(&queue)?;
                for message in browser.enumeration()?.unwrap_or_default() {
                    let text = message.text_body()?;
                    debug!(queue = code, message = text, "browsed");
                    listing.push(text);
                }
                Ok(())
            });

        if let Err(e) = outcome {
            error!(queue = code, error = %e, read = listing.len(), "browse failed");
        }
        info!(queue = code, "browse - end");
        listing
    }

    fn drain(&self, code: &str) -> bool {
        info!(queue = code, "drain - start");

        let timeout = self.config.receive_timeout();
        let outcome = self
            .session(&self.config.queue_drain_client_id, Mode::Consume)
            .run(|scope| {
                let queue = scope.queue(code)?;
                let mut consumer = scope.consumer(&queue)?;
                drain_consumer(&mut *consumer, timeout)
            });

        let drained = match outcome {
            Ok(count) => {
                debug!(queue = code, count, "queue drained");
                true
            }
            Err(e) => {
                error!(queue = code, error = %e, "drain failed");
                false
            }
        };
        info!(queue = code, "drain - end");
        drained
    }
}
