//! Core driver traits.

use std::fmt;
use std::time::Duration;

use super::message::Message;
use crate::error::BrokerError;

/// Acknowledgement mode of a session.
///
/// The toolkit only opens auto-acknowledge sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckMode {
    /// The session acknowledges each message as it is received.
    Auto,
}

/// A broker-side destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Point-to-point: each message goes to exactly one consumer.
    Queue(String),
    /// Fan-out: each message goes to every subscription.
    Topic(String),
}

impl Destination {
    /// The destination name.
    pub fn name(&self) -> &str {
        match self {
            Destination::Queue(name) | Destination::Topic(name) => name,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Queue(name) => write!(f, "queue://{}", name),
            Destination::Topic(name) => write!(f, "topic://{}", name),
        }
    }
}

/// Anything the caller must release when done with it.
pub trait Close {
    /// Release the underlying broker resource.
    ///
    /// Closing an already closed handle is a no-op.
    fn close(&mut self) -> Result<(), BrokerError>;
}

/// Creates connections to the broker.
pub trait ConnectionFactory: Send + Sync {
    /// Open a new, stopped connection.
    fn create_connection(&self) -> Result<Box<dyn Connection>, BrokerError>;
}

/// A live connection to the broker.
pub trait Connection: Close + Send {
    /// Assign the client identifier. Must happen before the connection is used.
    fn set_client_id(&mut self, client_id: &str) -> Result<(), BrokerError>;

    /// Start delivery of incoming messages.
    fn start(&mut self) -> Result<(), BrokerError>;

    /// Create a session on this connection.
    fn create_session(
        &mut self,
        transacted: bool,
        ack_mode: AckMode,
    ) -> Result<Box<dyn Session>, BrokerError>;
}

/// A single-threaded context for producing and consuming messages.
pub trait Session: Close + Send {
    fn create_queue(&mut self, name: &str) -> Result<Destination, BrokerError>;

    fn create_topic(&mut self, name: &str) -> Result<Destination, BrokerError>;

    fn create_producer(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn MessageProducer>, BrokerError>;

    fn create_consumer(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError>;

    /// Create a browser over a queue. Browsing never removes messages.
    fn create_browser(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn QueueBrowser>, BrokerError>;

    /// Create (or re-attach to) a durable subscription on a topic.
    ///
    /// The subscription keeps collecting messages while no consumer is
    /// attached, identified by the connection's client id and `name`.
    fn create_durable_subscriber(
        &mut self,
        topic: &Destination,
        name: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError>;

    fn create_text_message(&mut self, body: &str) -> Result<Message, BrokerError>;
}

/// Sends messages to one destination.
pub trait MessageProducer: Close + Send {
    fn send(&mut self, message: Message) -> Result<(), BrokerError>;
}

/// Receives messages from one destination or subscription.
pub trait MessageConsumer: Close + Send {
    /// Block until a message arrives or `timeout` elapses (`Ok(None)`).
    fn receive(&mut self, timeout: Duration) -> Result<Option<Message>, BrokerError>;
}

/// Non-destructive view over the messages waiting on a queue.
pub trait QueueBrowser: Close + Send {
    /// Snapshot of the queue, or `None` when the broker offers no enumeration.
    fn enumeration(&mut self) -> Result<Option<Vec<Message>>, BrokerError>;
}
