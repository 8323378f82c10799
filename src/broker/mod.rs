//! Broker driver - the messaging client seam
//!
//! The toolkit never talks to a broker directly. It goes through a small set
//! of synchronous, object-safe traits shaped after a classic JMS client:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ConnectionFactory::create_connection()                      │
//! └──────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Connection: set_client_id / start / create_session / close  │
//! └──────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Session: create_queue / create_topic / create_text_message  │
//! │           create_producer / create_consumer / create_browser │
//! │           create_durable_subscriber / close                  │
//! └──────────────────────────────────────────────────────────────┘
//!          │                  │                     │
//!          ▼                  ▼                     ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────────┐
//! │ MessageProducer │ │ MessageConsumer │ │   QueueBrowser      │
//! │  send / close   │ │ receive / close │ │ enumeration / close │
//! └─────────────────┘ └─────────────────┘ └─────────────────────┘
//! ```
//!
//! `InMemoryBroker` implements every trait in-process and is what the binary
//! and the tests run against.

mod driver;
mod in_memory;
mod message;

pub use driver::{
    AckMode, Close, Connection, ConnectionFactory, Destination, MessageConsumer,
    MessageProducer, QueueBrowser, Session,
};
pub use in_memory::InMemoryBroker;
pub use message::{Body, Message};
