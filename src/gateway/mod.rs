//! Gateways - send, browse and drain for one kind of destination.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  Gateway (one per kind)                      │
//! │  send(code, body) -> bool                                    │
//! │  browse(code)     -> Listing                                 │
//! │  drain(code)      -> bool                                    │
//! └──────────────────────────────────────────────────────────────┘
//!            │                                  │
//!            ▼                                  ▼
//! ┌─────────────────────────┐      ┌─────────────────────────────┐
//! │ QueueGateway            │      │ TopicGateway                │
//! │ browser snapshot        │      │ canonical durable subscriber│
//! │ (non-destructive)       │      │ (destructive read)          │
//! │ drain: one consumer     │      │ drain: every registered     │
//! │                         │      │ subscriber, one session     │
//! └─────────────────────────┘      └─────────────────────────────┘
//! ```
//!
//! Gateways never return errors. Every broker fault is logged and folded
//! into `false` or into the `Listing` accumulated so far.

mod listing;
mod queue;
mod subscriptions;
mod topic;

use std::time::Duration;

pub use listing::Listing;
pub use queue::QueueGateway;
pub use subscriptions::SubscriptionRegistry;
pub use topic::TopicGateway;

use crate::broker::MessageConsumer;
use crate::error::BrokerError;
use crate::resource::ResourceKind;

/// The three operations every destination kind supports.
pub trait Gateway: Send + Sync {
    /// The kind of destination this gateway serves.
    fn kind(&self) -> ResourceKind;

    /// Send one text message. `true` iff the producer accepted it.
    fn send(&self, code: &str, body: &str) -> bool;

    /// Read the messages currently available, keyed by ordinal.
    fn browse(&self, code: &str) -> Listing;

    /// Consume and discard everything available. `true` iff no fault occurred.
    fn drain(&self, code: &str) -> bool;
}

/// Receive until a timeout, appending text bodies to `listing`.
///
/// On a fault the bodies read so far stay in `listing`.
pub(crate) fn receive_texts(
    consumer: &mut dyn MessageConsumer,
    timeout: Duration,
    listing: &mut Listing,
) -> Result<(), BrokerError> {
    while let Some(message) = consumer.receive(timeout)? {
        listing.push(message.text_body()?);
    }
    Ok(())
}

/// Receive until a timeout, discarding everything. Returns how many
/// messages were consumed.
pub(crate) fn drain_consumer(
    consumer: &mut dyn MessageConsumer,
    timeout: Duration,
) -> Result<usize, BrokerError> {
    let mut drained = 0;
    while consumer.receive(timeout)?.is_some() {
        drained += 1;
    }
    Ok(drained)
}
