//! Topic gateway and startup subscription pre-creation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{drain_consumer, receive_texts, Gateway, Listing, SubscriptionRegistry};
use crate::broker::{ConnectionFactory, MessageProducer};
use crate::config::GatewayConfig;
use crate::error::BrokerError;
use crate::resource::ResourceKind;
use crate::session::{DestinationSession, Mode};

/// Send, browse and drain for topics.
///
/// Topic operations identify their connection with the topic code itself,
/// which is also the client id every durable subscription is created under.
///
/// Browsing reads through the canonical durable subscriber and therefore
/// *consumes* what it lists: a second browse without a new send comes back
/// empty. Queue browsing, by contrast, is a non-destructive snapshot.
pub struct TopicGateway {
    factory: Arc<dyn ConnectionFactory>,
    config: GatewayConfig,
    registry: SubscriptionRegistry,
}

impl TopicGateway {
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        config: GatewayConfig,
        registry: SubscriptionRegistry,
    ) -> Self {
        Self {
            factory,
            config,
            registry,
        }
    }

    /// Create the durable subscribers for every topic, then build the gateway.
    ///
    /// A durable subscription only collects messages sent after it exists,
    /// so the canonical subscriber (plus `extra_subscribers` more) is created
    /// up front for each topic. Each creation is its own connection/session
    /// lifecycle; a failure is logged and the remaining subscribers are still
    /// attempted. Only successfully created subscribers are registered.
    pub fn bootstrap<'t>(
        factory: Arc<dyn ConnectionFactory>,
        config: GatewayConfig,
        topics: impl IntoIterator<Item = &'t str>,
    ) -> Self {
        let mut registry = SubscriptionRegistry::new();
        for topic in topics {
            for name in config.subscriber_names(topic) {
                match create_durable_subscriber(factory.as_ref(), topic, &name) {
                    Ok(()) => {
                        debug!(topic, subscriber = %name, "durable subscriber ready");
                        registry.register(name, topic);
                    }
                    Err(e) => {
                        error!(topic, subscriber = %name, error = %e, "could not create durable subscriber");
                    }
                }
            }
        }
        info!(subscribers = registry.len(), "topic subscribers initialized");
        Self::new(factory, config, registry)
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    fn session(&self, code: &str, mode: Mode) -> DestinationSession<'_> {
        DestinationSession::new(self.factory.as_ref(), code, mode)
    }
}

fn create_durable_subscriber(
    factory: &dyn ConnectionFactory,
    topic_code: &str,
    subscriber_name: &str,
) -> Result<(), BrokerError> {
    DestinationSession::new(factory, topic_code, Mode::Subscribe).run(|scope| {
        let topic = scope.topic(topic_code)?;
        scope.durable_subscriber(&topic, subscriber_name)?;
        Ok(())
    })
}

impl Gateway for TopicGateway {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Topic
    }

    fn send(&self, code: &str, body: &str) -> bool {
        info!(topic = code, "send - start");

        let outcome = self.session(code, Mode::Produce).run(|scope| {
            let topic = scope.topic(code)?;
            let message = scope.text_message(body)?;
            scope.producer(&topic)?.send(message)
        });

        let sent = match outcome {
            Ok(()) => {
                debug!(topic = code, body, "message sent");
                true
            }
            Err(e) => {
                error!(topic = code, error = %e, "send failed");
                false
            }
        };
        info!(topic = code, "send - end");
        sent
    }

    fn browse(&self, code: &str) -> Listing {
        info!(topic = code, "browse - start");

        let subscriber = self.config.canonical_subscriber(code);
        let timeout = self.config.receive_timeout();
        let mut listing = Listing::new();
        let outcome = self.session(code, Mode::Browse).run(|scope| {
            let topic = scope.topic(code)?;
            debug!(topic = code, subscriber = %subscriber, "reading through durable subscriber");
            let mut consumer = scope.durable_subscriber(&topic, &subscriber)?;
            receive_texts(&mut *consumer, timeout, &mut listing)
        });

        if let Err(e) = outcome {
            error!(topic = code, error = %e, read = listing.len(), "browse failed");
        }
        info!(topic = code, "browse - end");
        listing
    }

    fn drain(&self, code: &str) -> bool {
        info!(topic = code, "drain - start");

        let subscribers = self.registry.subscribers_of(code);
        if subscribers.is_empty() {
            warn!(topic = code, "no registered subscribers to drain");
        }

        let timeout = self.config.receive_timeout();
        let outcome = self.session(code, Mode::Consume).run(|scope| {
            let topic = scope.topic(code)?;
            let mut drained = 0;
            for name in &subscribers {
                debug!(topic = code, subscriber = name, "draining subscriber");
                let mut consumer = scope.durable_subscriber(&topic, name)?;
                drained += drain_consumer(&mut *consumer, timeout)?;
            }
            Ok(drained)
        });

        let purged = match outcome {
            Ok(count) => {
                debug!(topic = code, count, "topic drained");
                true
            }
            Err(e) => {
                error!(topic = code, error = %e, "drain failed");
                false
            }
        };
        info!(topic = code, "drain - end");
        purged
    }
}
