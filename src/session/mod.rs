//! DestinationSession - one broker operation with guaranteed release.
//!
//! Every operation the toolkit performs follows the same lifecycle:
//!
//! ```text
//! INIT → CONNECTING → SESSION_READY → DESTINATION_READY → EXECUTING
//!      → {SUCCEEDED | FAILED} → RELEASING → DONE
//! ```
//!
//! 1. Open a connection and assign the client id.
//! 2. Start the connection when the operation receives (browse/consume).
//! 3. Create a non-transacted, auto-acknowledge session.
//! 4. Hand a [`Scope`] to the operation body, which creates the destination
//!    and its producer, consumer or browser, and performs one operation.
//! 5. Release consumer/producer/browser, session and connection, in that
//!    order, whatever the outcome.
//!
//! Every acquired handle lives in a [`Released`] guard, so an early return
//! at any step still closes exactly what was opened.
//!
//! ## Example
//!
//! ```
//! use jms_toolkit::broker::{InMemoryBroker, MessageProducer};
//! use jms_toolkit::session::{DestinationSession, Mode};
//!
//! let broker = InMemoryBroker::new();
//! let sent = DestinationSession::new(&broker, "SendQueueSample", Mode::Produce).run(|scope| {
//!     let queue = scope.queue("QUEUE_001")?;
//!     let message = scope.text_message("hello")?;
//!     scope.producer(&queue)?.send(message)
//! });
//! assert!(sent.is_ok());
//! assert_eq!(broker.queue_depth("QUEUE_001"), 1);
//! ```

mod release;

use std::fmt;

use tracing::trace;

pub use release::Released;

use crate::broker::{
    AckMode, Connection, ConnectionFactory, Destination, Message, MessageConsumer, MessageProducer,
    QueueBrowser, Session,
};
use crate::error::BrokerError;

/// What the operation does with its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Send only; the connection is never started.
    Produce,
    /// Non-destructive enumeration (or a destructive read through a
    /// durable subscription on topics).
    Browse,
    /// Destructive receive loop.
    Consume,
    /// Create a durable subscription without receiving from it.
    Subscribe,
}

impl Mode {
    /// Whether the connection must be started before the session is created.
    pub fn receives(self) -> bool {
        matches!(self, Mode::Browse | Mode::Consume)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Produce => write!(f, "produce"),
            Mode::Browse => write!(f, "browse"),
            Mode::Consume => write!(f, "consume"),
            Mode::Subscribe => write!(f, "subscribe"),
        }
    }
}

/// Lifecycle phase of a single operation, emitted as trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Connecting,
    SessionReady,
    DestinationReady,
    Executing,
    Succeeded,
    Failed,
    Releasing,
    Done,
}

/// A single-operation unit of work against the broker.
pub struct DestinationSession<'f> {
    factory: &'f dyn ConnectionFactory,
    client_id: String,
    mode: Mode,
}

impl<'f> DestinationSession<'f> {
    pub fn new(factory: &'f dyn ConnectionFactory, client_id: impl Into<String>, mode: Mode) -> Self {
        Self {
            factory,
            client_id: client_id.into(),
            mode,
        }
    }

    /// Run `op` inside a fresh connection and session.
    ///
    /// Any fault while connecting, identifying, starting or opening the
    /// session aborts before `op` runs. Whatever was acquired is released
    /// before this returns, and release faults never change the result.
    pub fn run<T, F>(&self, op: F) -> Result<T, BrokerError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<T, BrokerError>,
    {
        self.enter(Phase::Init);
        let outcome = self.execute(op);
        self.enter(Phase::Done);
        outcome
    }

    fn execute<T, F>(&self, op: F) -> Result<T, BrokerError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<T, BrokerError>,
    {
        // Declared here so both guards outlive the RELEASING event;
        // the session drops before the connection.
        let mut connection = None;
        let mut session = None;

        let outcome = self.open_and_run(&mut connection, &mut session, op);
        self.enter(if outcome.is_ok() {
            Phase::Succeeded
        } else {
            Phase::Failed
        });
        self.enter(Phase::Releasing);
        outcome
    }

    fn open_and_run<T, F>(
        &self,
        connection: &mut Option<Released<dyn Connection>>,
        session: &mut Option<Released<dyn Session>>,
        op: F,
    ) -> Result<T, BrokerError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<T, BrokerError>,
    {
        self.enter(Phase::Connecting);
        let connection =
            connection.insert(Released::new(self.factory.create_connection()?, "connection"));
        connection.set_client_id(&self.client_id)?;
        if self.mode.receives() {
            connection.start()?;
        }

        let session = session.insert(Released::new(
            connection.create_session(false, AckMode::Auto)?,
            "session",
        ));
        self.enter(Phase::SessionReady);

        let mut scope = Scope {
            session: &mut **session,
            client_id: &self.client_id,
            mode: self.mode,
        };
        op(&mut scope)
    }

    fn enter(&self, phase: Phase) {
        trace!(client_id = %self.client_id, mode = %self.mode, ?phase, "destination session");
    }
}

/// The session-side view handed to an operation body.
///
/// Producers, consumers and browsers come back as [`Released`] guards owned
/// by the body, so they are closed when the body returns and always before
/// the session itself.
pub struct Scope<'s> {
    session: &'s mut dyn Session,
    client_id: &'s str,
    mode: Mode,
}

impl Scope<'_> {
    pub fn queue(&mut self, name: &str) -> Result<Destination, BrokerError> {
        let destination = self.session.create_queue(name)?;
        self.enter(Phase::DestinationReady);
        Ok(destination)
    }

    pub fn topic(&mut self, name: &str) -> Result<Destination, BrokerError> {
        let destination = self.session.create_topic(name)?;
        self.enter(Phase::DestinationReady);
        Ok(destination)
    }

    pub fn producer(
        &mut self,
        destination: &Destination,
    ) -> Result<Released<dyn MessageProducer>, BrokerError> {
        let producer = self.session.create_producer(destination)?;
        self.enter(Phase::Executing);
        Ok(Released::new(producer, "producer"))
    }

    pub fn consumer(
        &mut self,
        destination: &Destination,
    ) -> Result<Released<dyn MessageConsumer>, BrokerError> {
        let consumer = self.session.create_consumer(destination)?;
        self.enter(Phase::Executing);
        Ok(Released::new(consumer, "consumer"))
    }

    pub fn browser(
        &mut self,
        destination: &Destination,
    ) -> Result<Released<dyn QueueBrowser>, BrokerError> {
        let browser = self.session.create_browser(destination)?;
        self.enter(Phase::Executing);
        Ok(Released::new(browser, "browser"))
    }

    pub fn durable_subscriber(
        &mut self,
        topic: &Destination,
        name: &str,
    ) -> Result<Released<dyn MessageConsumer>, BrokerError> {
        let subscriber = self.session.create_durable_subscriber(topic, name)?;
        self.enter(Phase::Executing);
        Ok(Released::new(subscriber, "durable subscriber"))
    }

    pub fn text_message(&mut self, body: &str) -> Result<Message, BrokerError> {
        self.session.create_text_message(body)
    }

    fn enter(&self, phase: Phase) {
        trace!(client_id = %self.client_id, mode = %self.mode, ?phase, "destination session");
    }
}
