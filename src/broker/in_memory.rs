//! In-memory broker for tests and single-process deployments.
//!
//! This module provides a thread-safe broker that implements every driver
//! trait, useful for:
//! - Unit and integration testing without an external broker
//! - Running the HTTP toolkit standalone
//! - Development and prototyping

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::warn;

use super::driver::{
    AckMode, Close, Connection, ConnectionFactory, Destination, MessageConsumer,
    MessageProducer, QueueBrowser, Session,
};
use super::message::Message;
use crate::error::BrokerError;

/// In-memory broker for testing and single-process scenarios.
///
/// Features:
/// - Thread-safe (clones share the same broker state)
/// - Queues are FIFO; browsers see a snapshot without consuming
/// - Topics fan out to every durable subscription and open consumer
/// - Durable subscriptions keep collecting while no consumer is attached
/// - A client id can be held by one open connection at a time
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use jms_toolkit::broker::{
///     AckMode, Connection, ConnectionFactory, InMemoryBroker, MessageConsumer, MessageProducer,
///     Session,
/// };
///
/// let broker = InMemoryBroker::new();
/// let mut connection = broker.create_connection().unwrap();
/// connection.set_client_id("example").unwrap();
/// connection.start().unwrap();
///
/// let mut session = connection.create_session(false, AckMode::Auto).unwrap();
/// let queue = session.create_queue("QUEUE_001").unwrap();
/// let message = session.create_text_message("hello").unwrap();
/// session.create_producer(&queue).unwrap().send(message).unwrap();
///
/// let mut consumer = session.create_consumer(&queue).unwrap();
/// let received = consumer.receive(Duration::from_millis(10)).unwrap().unwrap();
/// assert_eq!(received.text_body().unwrap(), "hello");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

#[derive(Default)]
struct BrokerState {
    queues: HashMap<String, VecDeque<Message>>,
    topics: HashMap<String, TopicState>,
    client_ids: HashSet<String>,
    next_message: u64,
    next_consumer: u64,
}

#[derive(Default)]
struct TopicState {
    /// Durable subscriptions keyed by (client id, subscription name)
    durable: BTreeMap<(String, String), VecDeque<Message>>,
    /// Open non-durable consumers
    live: HashMap<u64, VecDeque<Message>>,
}

impl BrokerState {
    fn deliver(&mut self, destination: &Destination, mut message: Message, sender: &str) {
        self.next_message += 1;
        message.id = Some(format!("ID:{}-{}", sender, self.next_message));

        match destination {
            Destination::Queue(name) => {
                self.queues.entry(name.clone()).or_default().push_back(message);
            }
            Destination::Topic(name) => {
                let topic = self.topics.entry(name.clone()).or_default();
                for backlog in topic.durable.values_mut() {
                    backlog.push_back(message.clone());
                }
                for backlog in topic.live.values_mut() {
                    backlog.push_back(message.clone());
                }
            }
        }
    }

    fn take(&mut self, source: &Source) -> Option<Message> {
        match source {
            Source::Queue(name) => self.queues.get_mut(name)?.pop_front(),
            Source::Durable {
                topic,
                client_id,
                name,
            } => self
                .topics
                .get_mut(topic)?
                .durable
                .get_mut(&(client_id.clone(), name.clone()))?
                .pop_front(),
            Source::Live { topic, id } => self.topics.get_mut(topic)?.live.get_mut(id)?.pop_front(),
        }
    }
}

impl InMemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, BrokerState>, BrokerError> {
        self.state
            .lock()
            .map_err(|_| BrokerError::LockPoisoned(operation))
    }

    // Introspection recovers the state from a poisoned lock.
    fn inspect(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of messages waiting on a queue.
    pub fn queue_depth(&self, queue: &str) -> usize {
        self.inspect().queues.get(queue).map_or(0, VecDeque::len)
    }

    /// Number of messages waiting on a durable subscription, if it exists.
    pub fn subscription_depth(&self, client_id: &str, topic: &str, name: &str) -> Option<usize> {
        self.inspect()
            .topics
            .get(topic)?
            .durable
            .get(&(client_id.to_string(), name.to_string()))
            .map(VecDeque::len)
    }

    /// Durable subscriptions on a topic as (client id, subscription name) pairs.
    pub fn subscriptions(&self, topic: &str) -> Vec<(String, String)> {
        self.inspect()
            .topics
            .get(topic)
            .map(|t| t.durable.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Client ids held by open connections, sorted.
    pub fn active_client_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inspect().client_ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every queue, topic and subscription (useful for test cleanup).
    pub fn clear(&self) {
        let mut state = self.inspect();
        state.queues.clear();
        state.topics.clear();
    }
}

impl ConnectionFactory for InMemoryBroker {
    fn create_connection(&self) -> Result<Box<dyn Connection>, BrokerError> {
        Ok(Box::new(MemoryConnection {
            broker: self.clone(),
            client_id: None,
            link: Arc::new(Link::default()),
        }))
    }
}

/// State shared between a connection and everything created from it.
#[derive(Default)]
struct Link {
    started: AtomicBool,
    closed: AtomicBool,
}

impl Link {
    fn ensure_open(&self) -> Result<(), BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrokerError::Closed("connection"));
        }
        Ok(())
    }

    fn started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

struct MemoryConnection {
    broker: InMemoryBroker,
    client_id: Option<String>,
    link: Arc<Link>,
}

impl Connection for MemoryConnection {
    fn set_client_id(&mut self, client_id: &str) -> Result<(), BrokerError> {
        self.link.ensure_open()?;
        if client_id.is_empty() {
            return Err(BrokerError::InvalidClientId("client id is empty".into()));
        }
        if let Some(current) = &self.client_id {
            return Err(BrokerError::InvalidClientId(format!(
                "connection already identified as {}",
                current
            )));
        }

        let mut state = self.broker.lock("set_client_id")?;
        if !state.client_ids.insert(client_id.to_string()) {
            return Err(BrokerError::InvalidClientId(format!(
                "{} is already connected",
                client_id
            )));
        }
        self.client_id = Some(client_id.to_string());
        Ok(())
    }

    fn start(&mut self) -> Result<(), BrokerError> {
        self.link.ensure_open()?;
        self.link.started.store(true, Ordering::Release);
        Ok(())
    }

    fn create_session(
        &mut self,
        _transacted: bool,
        _ack_mode: AckMode,
    ) -> Result<Box<dyn Session>, BrokerError> {
        self.link.ensure_open()?;
        Ok(Box::new(MemorySession {
            broker: self.broker.clone(),
            client_id: self.client_id.clone(),
            link: Arc::clone(&self.link),
            closed: false,
        }))
    }
}

impl Close for MemoryConnection {
    fn close(&mut self) -> Result<(), BrokerError> {
        if self.link.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        // The id is only forgotten once the broker has released it
        if let Some(client_id) = &self.client_id {
            self.broker.lock("close connection")?.client_ids.remove(client_id);
        }
        self.client_id = None;
        self.link.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(client_id = ?self.client_id, error = %e, "connection dropped without release");
        }
    }
}

struct MemorySession {
    broker: InMemoryBroker,
    client_id: Option<String>,
    link: Arc<Link>,
    closed: bool,
}

impl MemorySession {
    fn ensure_open(&self) -> Result<(), BrokerError> {
        self.link.ensure_open()?;
        if self.closed {
            return Err(BrokerError::Closed("session"));
        }
        Ok(())
    }

    fn sender(&self) -> String {
        self.client_id.clone().unwrap_or_else(|| "anonymous".to_string())
    }
}

fn checked_name(name: &str) -> Result<(), BrokerError> {
    if name.trim().is_empty() {
        return Err(BrokerError::InvalidDestination(
            "destination name is empty".into(),
        ));
    }
    Ok(())
}

impl Session for MemorySession {
    fn create_queue(&mut self, name: &str) -> Result<Destination, BrokerError> {
        self.ensure_open()?;
        checked_name(name)?;
        self.broker
            .lock("create_queue")?
            .queues
            .entry(name.to_string())
            .or_default();
        Ok(Destination::Queue(name.to_string()))
    }

    fn create_topic(&mut self, name: &str) -> Result<Destination, BrokerError> {
        self.ensure_open()?;
        checked_name(name)?;
        self.broker
            .lock("create_topic")?
            .topics
            .entry(name.to_string())
            .or_default();
        Ok(Destination::Topic(name.to_string()))
    }

    fn create_producer(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn MessageProducer>, BrokerError> {
        self.ensure_open()?;
        Ok(Box::new(MemoryProducer {
            broker: self.broker.clone(),
            destination: destination.clone(),
            sender: self.sender(),
            link: Arc::clone(&self.link),
            closed: false,
        }))
    }

    fn create_consumer(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        self.ensure_open()?;
        let source = match destination {
            Destination::Queue(name) => Source::Queue(name.clone()),
            Destination::Topic(name) => {
                let mut state = self.broker.lock("create_consumer")?;
                state.next_consumer += 1;
                let id = state.next_consumer;
                state
                    .topics
                    .entry(name.clone())
                    .or_default()
                    .live
                    .insert(id, VecDeque::new());
                Source::Live {
                    topic: name.clone(),
                    id,
                }
            }
        };
        Ok(Box::new(MemoryConsumer {
            broker: self.broker.clone(),
            link: Arc::clone(&self.link),
            source,
            closed: false,
        }))
    }

    fn create_browser(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn QueueBrowser>, BrokerError> {
        self.ensure_open()?;
        match destination {
            Destination::Queue(name) => Ok(Box::new(MemoryBrowser {
                broker: self.broker.clone(),
                link: Arc::clone(&self.link),
                queue: name.clone(),
                closed: false,
            })),
            Destination::Topic(_) => Err(BrokerError::InvalidDestination(format!(
                "cannot browse {}",
                destination
            ))),
        }
    }

    fn create_durable_subscriber(
        &mut self,
        topic: &Destination,
        name: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        self.ensure_open()?;
        let Destination::Topic(topic_name) = topic else {
            return Err(BrokerError::InvalidDestination(format!(
                "durable subscriptions need a topic, got {}",
                topic
            )));
        };
        if name.is_empty() {
            return Err(BrokerError::InvalidDestination(
                "subscription name is empty".into(),
            ));
        }
        let client_id = self.client_id.clone().ok_or_else(|| {
            BrokerError::InvalidClientId("durable subscriptions need a client id".into())
        })?;

        self.broker
            .lock("create_durable_subscriber")?
            .topics
            .entry(topic_name.clone())
            .or_default()
            .durable
            .entry((client_id.clone(), name.to_string()))
            .or_default();

        Ok(Box::new(MemoryConsumer {
            broker: self.broker.clone(),
            link: Arc::clone(&self.link),
            source: Source::Durable {
                topic: topic_name.clone(),
                client_id,
                name: name.to_string(),
            },
            closed: false,
        }))
    }

    fn create_text_message(&mut self, body: &str) -> Result<Message, BrokerError> {
        self.ensure_open()?;
        Ok(Message::text(body))
    }
}

impl Close for MemorySession {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.closed = true;
        Ok(())
    }
}

struct MemoryProducer {
    broker: InMemoryBroker,
    destination: Destination,
    sender: String,
    link: Arc<Link>,
    closed: bool,
}

impl MessageProducer for MemoryProducer {
    fn send(&mut self, message: Message) -> Result<(), BrokerError> {
        self.link.ensure_open()?;
        if self.closed {
            return Err(BrokerError::Closed("producer"));
        }
        self.broker
            .lock("send")?
            .deliver(&self.destination, message, &self.sender);
        Ok(())
    }
}

impl Close for MemoryProducer {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.closed = true;
        Ok(())
    }
}

enum Source {
    Queue(String),
    Durable {
        topic: String,
        client_id: String,
        name: String,
    },
    Live {
        topic: String,
        id: u64,
    },
}

struct MemoryConsumer {
    broker: InMemoryBroker,
    link: Arc<Link>,
    source: Source,
    closed: bool,
}

impl MessageConsumer for MemoryConsumer {
    fn receive(&mut self, timeout: Duration) -> Result<Option<Message>, BrokerError> {
        let deadline = Instant::now() + timeout;

        loop {
            self.link.ensure_open()?;
            if self.closed {
                return Err(BrokerError::Closed("consumer"));
            }

            if self.link.started() {
                if let Some(message) = self.broker.lock("receive")?.take(&self.source) {
                    return Ok(Some(message));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Close for MemoryConsumer {
    fn close(&mut self) -> Result<(), BrokerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Source::Live { topic, id } = &self.source {
            if let Some(state) = self.broker.lock("close consumer")?.topics.get_mut(topic) {
                state.live.remove(id);
            }
        }
        Ok(())
    }
}

struct MemoryBrowser {
    broker: InMemoryBroker,
    link: Arc<Link>,
    queue: String,
    closed: bool,
}

impl QueueBrowser for MemoryBrowser {
    fn enumeration(&mut self) -> Result<Option<Vec<Message>>, BrokerError> {
        self.link.ensure_open()?;
        if self.closed {
            return Err(BrokerError::Closed("browser"));
        }
        if !self.link.started() {
            return Ok(Some(Vec::new()));
        }
        let state = self.broker.lock("enumeration")?;
        Ok(Some(
            state
                .queues
                .get(&self.queue)
                .map(|q| q.iter().cloned().collect())
                .unwrap_or_default(),
        ))
    }
}

impl Close for MemoryBrowser {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.closed = true;
        Ok(())
    }
}
