//! jms_toolkit: send, browse and purge queues and topics on a message broker.
//!
//! A resource code (e.g. `"QUEUE_001"`) is resolved through the
//! [`resource::ResourceDirectory`], routed by its kind to the queue or topic
//! [`gateway`], and executed as one scoped [`session::DestinationSession`]:
//! connect, open a session, do exactly one thing, release everything.
//!
//! ```text
//! caller → Dispatcher::resolve(code) → QueueGateway | TopicGateway
//!        → DestinationSession (connect → session → operate → release)
//!        → broker driver
//! ```
//!
//! No broker fault ever reaches the caller: operations answer `bool` or a
//! (possibly empty) [`gateway::Listing`].

pub mod broker;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod resource;
pub mod session;

#[cfg(feature = "http")]
pub mod http;

pub use broker::InMemoryBroker;
pub use config::{GatewayConfig, ToolkitConfig};
pub use dispatcher::Dispatcher;
pub use error::{BrokerError, ConfigError};
pub use gateway::{Gateway, Listing};
pub use resource::{ResourceDescriptor, ResourceDirectory, ResourceKind};
