//! Topic behaviour: durable subscriptions, destructive browse, drain sweep.

use std::sync::Arc;

use jms_toolkit::gateway::{Gateway, SubscriptionRegistry, TopicGateway};
use jms_toolkit::resource::ResourceDirectory;
use jms_toolkit::{Dispatcher, InMemoryBroker};

use crate::support::{dispatcher_on, fast_config};

#[test]
fn topic_browse_is_destructive() {
    let broker = InMemoryBroker::new();
    let dispatcher = dispatcher_on(Arc::new(broker.clone()));

    assert!(dispatcher.send_to("TOPIC_001", "news"));
    let first = dispatcher.browse("TOPIC_001");
    let second = dispatcher.browse("TOPIC_001");

    assert_eq!(first.get("1"), Some("news"));
    assert!(second.is_empty());
}

#[test]
fn messages_sent_before_startup_are_not_seen() {
    let broker = InMemoryBroker::new();

    // No subscription exists yet, so the message reaches nobody
    let bare = TopicGateway::new(
        Arc::new(broker.clone()),
        fast_config(),
        SubscriptionRegistry::new(),
    );
    assert!(bare.send("TOPIC_001", "lost"));
    assert!(broker.subscriptions("TOPIC_001").is_empty());

    let dispatcher = Dispatcher::bootstrap(
        Arc::new(broker.clone()),
        ResourceDirectory::default(),
        fast_config(),
    );
    assert!(dispatcher.send_to("TOPIC_001", "kept"));
    assert_eq!(dispatcher.browse("TOPIC_001").bodies(), ["kept"]);
}

#[test]
fn purge_empties_every_registered_subscriber() {
    let broker = InMemoryBroker::new();
    let dispatcher = dispatcher_on(Arc::new(broker.clone()));

    assert!(dispatcher.send_to("TOPIC_002", "one"));
    assert!(dispatcher.send_to("TOPIC_002", "two"));
    for (client_id, name) in broker.subscriptions("TOPIC_002") {
        assert_eq!(broker.subscription_depth(&client_id, "TOPIC_002", &name), Some(2));
    }

    assert!(dispatcher.purge("TOPIC_002"));
    for (client_id, name) in broker.subscriptions("TOPIC_002") {
        assert_eq!(broker.subscription_depth(&client_id, "TOPIC_002", &name), Some(0));
    }
    assert!(dispatcher.browse("TOPIC_002").is_empty());
}

#[test]
fn purge_leaves_other_topics_alone() {
    let broker = InMemoryBroker::new();
    let dispatcher = dispatcher_on(Arc::new(broker.clone()));

    assert!(dispatcher.send_to("TOPIC_001", "a"));
    assert!(dispatcher.send_to("TOPIC_003", "b"));
    assert!(dispatcher.purge("TOPIC_001"));

    assert!(dispatcher.browse("TOPIC_001").is_empty());
    assert_eq!(dispatcher.browse("TOPIC_003").get("1"), Some("b"));
}

#[test]
fn bootstrap_twice_reattaches_without_losing_backlog() {
    let broker = InMemoryBroker::new();
    let first = dispatcher_on(Arc::new(broker.clone()));
    assert!(first.send_to("TOPIC_001", "survives"));

    let second = dispatcher_on(Arc::new(broker.clone()));
    assert_eq!(broker.subscriptions("TOPIC_001").len(), 3);
    assert_eq!(second.topics().registry().subscribers_of("TOPIC_001").len(), 3);
    assert_eq!(second.browse("TOPIC_001").get("1"), Some("survives"));
}
