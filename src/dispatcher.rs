//! Dispatcher - resolves a resource code and routes to the matching gateway.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::broker::ConnectionFactory;
use crate::config::GatewayConfig;
use crate::gateway::{Gateway, Listing, QueueGateway, TopicGateway};
use crate::resource::{ResourceDescriptor, ResourceDirectory, ResourceKind};

/// Entry point for callers: send, browse and purge by resource code.
///
/// Unknown, empty and absent codes never fail: `send_to` and `purge`
/// return `false`, `browse` returns an empty listing.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use jms_toolkit::broker::InMemoryBroker;
/// use jms_toolkit::config::GatewayConfig;
/// use jms_toolkit::resource::ResourceDirectory;
/// use jms_toolkit::Dispatcher;
///
/// let config = GatewayConfig { receive_timeout_ms: 10, ..GatewayConfig::default() };
/// let dispatcher = Dispatcher::bootstrap(
///     Arc::new(InMemoryBroker::new()),
///     ResourceDirectory::default(),
///     config,
/// );
///
/// assert!(dispatcher.send_to("QUEUE_001", "hello"));
/// assert_eq!(dispatcher.browse("QUEUE_001").get("1"), Some("hello"));
/// assert!(dispatcher.purge("QUEUE_001"));
/// assert!(dispatcher.browse("QUEUE_001").is_empty());
/// assert!(!dispatcher.send_to("UNKNOWN_CODE", "x"));
/// ```
pub struct Dispatcher {
    directory: Arc<ResourceDirectory>,
    queues: QueueGateway,
    topics: TopicGateway,
}

impl Dispatcher {
    pub fn new(directory: Arc<ResourceDirectory>, queues: QueueGateway, topics: TopicGateway) -> Self {
        Self {
            directory,
            queues,
            topics,
        }
    }

    /// Build both gateways and pre-create the topic subscribers.
    ///
    /// Returns only once every configured topic has been initialized, so the
    /// subscription registry is complete before the first request.
    pub fn bootstrap(
        factory: Arc<dyn ConnectionFactory>,
        directory: ResourceDirectory,
        config: GatewayConfig,
    ) -> Self {
        let topics = TopicGateway::bootstrap(
            Arc::clone(&factory),
            config.clone(),
            directory.of_kind(ResourceKind::Topic).map(|r| r.code.as_str()),
        );
        let queues = QueueGateway::new(factory, config);
        info!(resources = directory.len(), "dispatcher ready");
        Self::new(Arc::new(directory), queues, topics)
    }

    pub fn directory(&self) -> &ResourceDirectory {
        &self.directory
    }

    pub fn topics(&self) -> &TopicGateway {
        &self.topics
    }

    fn gateway(&self, kind: ResourceKind) -> &dyn Gateway {
        match kind {
            ResourceKind::Queue => &self.queues,
            ResourceKind::Topic => &self.topics,
        }
    }

    fn resolve<'c>(&self, code: impl Into<Option<&'c str>>) -> Option<&ResourceDescriptor> {
        let code = code.into();
        let resource = self.directory.resolve(code);
        if resource.is_none() {
            debug!(code = ?code, "unknown resource");
        }
        resource
    }

    /// Send a text message to the resource.
    pub fn send_to<'c>(&self, code: impl Into<Option<&'c str>>, body: &str) -> bool {
        info!("send_to - start");
        let sent = match self.resolve(code) {
            Some(resource) => self.gateway(resource.kind).send(&resource.code, body),
            None => false,
        };
        info!(sent, "send_to - end");
        sent
    }

    /// List the messages of the resource, keyed by ordinal.
    pub fn browse<'c>(&self, code: impl Into<Option<&'c str>>) -> Listing {
        info!("browse - start");
        let listing = match self.resolve(code) {
            Some(resource) => self.gateway(resource.kind).browse(&resource.code),
            None => Listing::new(),
        };
        info!(messages = listing.len(), "browse - end");
        listing
    }

    /// Consume and discard every message of the resource.
    pub fn purge<'c>(&self, code: impl Into<Option<&'c str>>) -> bool {
        info!("purge - start");
        let purged = match self.resolve(code) {
            Some(resource) => self.gateway(resource.kind).drain(&resource.code),
            None => false,
        };
        info!(purged, "purge - end");
        purged
    }

    /// Every configured resource code mapped to its display name.
    pub fn list_resources(&self) -> BTreeMap<String, String> {
        self.directory.list_all()
    }
}
