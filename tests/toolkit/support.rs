//! Fault-injecting broker for exercising every lifecycle step.
//!
//! `FaultyBroker` wraps an `InMemoryBroker`, journals every open and close,
//! and fails any chosen step on demand.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jms_toolkit::broker::{
    AckMode, Close, Connection, ConnectionFactory, Destination, InMemoryBroker, Message,
    MessageConsumer, MessageProducer, QueueBrowser, Session,
};
use jms_toolkit::config::GatewayConfig;
use jms_toolkit::resource::ResourceDirectory;
use jms_toolkit::{BrokerError, Dispatcher};

/// Receive timeout used throughout the tests.
pub const FAST_RECEIVE_MS: u64 = 10;

pub fn fast_config() -> GatewayConfig {
    GatewayConfig {
        receive_timeout_ms: FAST_RECEIVE_MS,
        ..GatewayConfig::default()
    }
}

/// Dispatcher over the built-in resources on the given factory.
pub fn dispatcher_on(factory: Arc<dyn ConnectionFactory>) -> Dispatcher {
    Dispatcher::bootstrap(factory, ResourceDirectory::default(), fast_config())
}

/// A step of the connection/session lifecycle that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Connect,
    ClientId,
    Start,
    Session,
    Destination,
    Producer,
    Consumer,
    Browser,
    DurableSubscriber,
    TextMessage,
    Send,
    Receive,
    Enumerate,
    CloseConnection,
    CloseSession,
    CloseProducer,
    CloseConsumer,
    CloseBrowser,
}

#[derive(Clone, Default)]
pub struct FaultyBroker {
    inner: InMemoryBroker,
    /// Step -> number of calls still allowed to succeed
    faults: Arc<Mutex<HashMap<Step, usize>>>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl FaultyBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broker(&self) -> &InMemoryBroker {
        &self.inner
    }

    /// Fail every call of `step` from now on.
    pub fn fail(&self, step: Step) {
        self.fail_after(step, 0);
    }

    /// Let `successes` calls of `step` through, then fail the rest.
    pub fn fail_after(&self, step: Step, successes: usize) {
        self.faults.lock().unwrap().insert(step, successes);
    }

    pub fn heal(&self) {
        self.faults.lock().unwrap().clear();
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().unwrap().clear();
    }

    fn record(&self, entry: impl Into<String>) {
        self.journal.lock().unwrap().push(entry.into());
    }

    fn check(&self, step: Step) -> Result<(), BrokerError> {
        let mut faults = self.faults.lock().unwrap();
        match faults.get_mut(&step) {
            Some(0) => Err(BrokerError::Other(format!("injected fault at {:?}", step))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Assert every opened handle was closed, innermost first.
pub fn assert_released_in_reverse(journal: &[String]) {
    let mut open: Vec<&str> = Vec::new();
    for entry in journal {
        if let Some(what) = entry.strip_prefix("open ") {
            open.push(what);
        } else if let Some(what) = entry.strip_prefix("close ") {
            assert_eq!(
                open.pop(),
                Some(what),
                "close out of order in journal {:?}",
                journal
            );
        }
    }
    assert!(open.is_empty(), "never closed: {:?} in {:?}", open, journal);
}

impl ConnectionFactory for FaultyBroker {
    fn create_connection(&self) -> Result<Box<dyn Connection>, BrokerError> {
        self.check(Step::Connect)?;
        let inner = self.inner.create_connection()?;
        self.record("open connection");
        Ok(Box::new(FaultyConnection {
            inner,
            broker: self.clone(),
        }))
    }
}

struct FaultyConnection {
    inner: Box<dyn Connection>,
    broker: FaultyBroker,
}

impl Connection for FaultyConnection {
    fn set_client_id(&mut self, client_id: &str) -> Result<(), BrokerError> {
        self.broker.check(Step::ClientId)?;
        self.inner.set_client_id(client_id)
    }

    fn start(&mut self) -> Result<(), BrokerError> {
        self.broker.check(Step::Start)?;
        self.inner.start()
    }

    fn create_session(
        &mut self,
        transacted: bool,
        ack_mode: AckMode,
    ) -> Result<Box<dyn Session>, BrokerError> {
        self.broker.check(Step::Session)?;
        let inner = self.inner.create_session(transacted, ack_mode)?;
        self.broker.record("open session");
        Ok(Box::new(FaultySession {
            inner,
            broker: self.broker.clone(),
        }))
    }
}

impl Close for FaultyConnection {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.broker.record("close connection");
        self.inner.close()?;
        self.broker.check(Step::CloseConnection)
    }
}

struct FaultySession {
    inner: Box<dyn Session>,
    broker: FaultyBroker,
}

impl Session for FaultySession {
    fn create_queue(&mut self, name: &str) -> Result<Destination, BrokerError> {
        self.broker.check(Step::Destination)?;
        self.inner.create_queue(name)
    }

    fn create_topic(&mut self, name: &str) -> Result<Destination, BrokerError> {
        self.broker.check(Step::Destination)?;
        self.inner.create_topic(name)
    }

    fn create_producer(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn MessageProducer>, BrokerError> {
        self.broker.check(Step::Producer)?;
        let inner = self.inner.create_producer(destination)?;
        self.broker.record("open producer");
        Ok(Box::new(FaultyProducer {
            inner,
            broker: self.broker.clone(),
        }))
    }

    fn create_consumer(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        self.broker.check(Step::Consumer)?;
        let inner = self.inner.create_consumer(destination)?;
        self.broker.record("open consumer");
        Ok(Box::new(FaultyConsumer {
            inner,
            broker: self.broker.clone(),
        }))
    }

    fn create_browser(
        &mut self,
        destination: &Destination,
    ) -> Result<Box<dyn QueueBrowser>, BrokerError> {
        self.broker.check(Step::Browser)?;
        let inner = self.inner.create_browser(destination)?;
        self.broker.record("open browser");
        Ok(Box::new(FaultyBrowser {
            inner,
            broker: self.broker.clone(),
        }))
    }

    fn create_durable_subscriber(
        &mut self,
        topic: &Destination,
        name: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        self.broker.check(Step::DurableSubscriber)?;
        let inner = self.inner.create_durable_subscriber(topic, name)?;
        self.broker.record("open consumer");
        Ok(Box::new(FaultyConsumer {
            inner,
            broker: self.broker.clone(),
        }))
    }

    fn create_text_message(&mut self, body: &str) -> Result<Message, BrokerError> {
        self.broker.check(Step::TextMessage)?;
        self.inner.create_text_message(body)
    }
}

impl Close for FaultySession {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.broker.record("close session");
        self.inner.close()?;
        self.broker.check(Step::CloseSession)
    }
}

struct FaultyProducer {
    inner: Box<dyn MessageProducer>,
    broker: FaultyBroker,
}

impl MessageProducer for FaultyProducer {
    fn send(&mut self, message: Message) -> Result<(), BrokerError> {
        self.broker.check(Step::Send)?;
        self.inner.send(message)
    }
}

impl Close for FaultyProducer {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.broker.record("close producer");
        self.inner.close()?;
        self.broker.check(Step::CloseProducer)
    }
}

struct FaultyConsumer {
    inner: Box<dyn MessageConsumer>,
    broker: FaultyBroker,
}

impl MessageConsumer for FaultyConsumer {
    fn receive(&mut self, timeout: Duration) -> Result<Option<Message>, BrokerError> {
        self.broker.check(Step::Receive)?;
        self.inner.receive(timeout)
    }
}

impl Close for FaultyConsumer {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.broker.record("close consumer");
        self.inner.close()?;
        self.broker.check(Step::CloseConsumer)
    }
}

struct FaultyBrowser {
    inner: Box<dyn QueueBrowser>,
    broker: FaultyBroker,
}

impl QueueBrowser for FaultyBrowser {
    fn enumeration(&mut self) -> Result<Option<Vec<Message>>, BrokerError> {
        self.broker.check(Step::Enumerate)?;
        self.inner.enumeration()
    }
}

impl Close for FaultyBrowser {
    fn close(&mut self) -> Result<(), BrokerError> {
        self.broker.record("close browser");
        self.inner.close()?;
        self.broker.check(Step::CloseBrowser)
    }
}
