//! End-to-end dispatcher scenarios on the in-memory broker.

use std::sync::Arc;

use jms_toolkit::resource::{ResourceDescriptor, ResourceDirectory};
use jms_toolkit::{Dispatcher, InMemoryBroker, Listing};

use crate::support::{dispatcher_on, fast_config};

fn dispatcher() -> (Dispatcher, InMemoryBroker) {
    let broker = InMemoryBroker::new();
    (dispatcher_on(Arc::new(broker.clone())), broker)
}

#[test]
fn queue_send_browse_purge_browse() {
    let (dispatcher, _broker) = dispatcher();

    assert!(dispatcher.send_to("QUEUE_001", "hello"));
    assert_eq!(dispatcher.browse("QUEUE_001"), Listing::from_iter(["hello"]));
    assert!(dispatcher.purge("QUEUE_001"));
    assert_eq!(dispatcher.browse("QUEUE_001"), Listing::new());
}

#[test]
fn unknown_code_degrades_everywhere() {
    let (dispatcher, broker) = dispatcher();

    assert!(dispatcher.directory().resolve("UNKNOWN_CODE").is_none());
    assert!(!dispatcher.send_to("UNKNOWN_CODE", "x"));
    assert!(dispatcher.browse("UNKNOWN_CODE").is_empty());
    assert!(!dispatcher.purge("UNKNOWN_CODE"));

    assert!(!dispatcher.send_to("", "x"));
    assert!(!dispatcher.purge(None::<&str>));
    assert_eq!(broker.queue_depth("UNKNOWN_CODE"), 0);
}

#[test]
fn queue_browse_is_idempotent() {
    let (dispatcher, broker) = dispatcher();
    for body in ["a", "b", "c"] {
        assert!(dispatcher.send_to("QUEUE_002", body));
    }

    let first = dispatcher.browse("QUEUE_002");
    let second = dispatcher.browse("QUEUE_002");
    assert_eq!(first, second);
    assert_eq!(first.get("3"), Some("c"));
    assert_eq!(broker.queue_depth("QUEUE_002"), 3);
}

#[test]
fn sending_n_then_draining_consumes_n() {
    let (dispatcher, broker) = dispatcher();
    let n = 12;
    for i in 0..n {
        assert!(dispatcher.send_to("QUEUE_001", &format!("message {}", i)));
    }
    assert_eq!(broker.queue_depth("QUEUE_001"), n);
    assert_eq!(dispatcher.browse("QUEUE_001").len(), n);

    assert!(dispatcher.purge("QUEUE_001"));
    assert_eq!(broker.queue_depth("QUEUE_001"), 0);
    assert!(dispatcher.browse("QUEUE_001").is_empty());
}

#[test]
fn queues_are_independent() {
    let (dispatcher, _broker) = dispatcher();
    assert!(dispatcher.send_to("QUEUE_001", "one"));
    assert!(dispatcher.send_to("QUEUE_002", "two"));

    assert!(dispatcher.purge("QUEUE_001"));
    assert!(dispatcher.browse("QUEUE_001").is_empty());
    assert_eq!(dispatcher.browse("QUEUE_002").get("1"), Some("two"));
}

#[test]
fn listing_returns_every_configured_resource() {
    let (dispatcher, _broker) = dispatcher();
    let resources = dispatcher.list_resources();

    assert_eq!(resources.len(), 5);
    assert_eq!(resources["QUEUE_001"], "QUEUE 001 in ActiveMQ");
    assert_eq!(resources["TOPIC_002"], "TOPIC 002 in ActiveMQ");
}

#[test]
fn empty_directory_lists_nothing() {
    let dispatcher = Dispatcher::bootstrap(
        Arc::new(InMemoryBroker::new()),
        ResourceDirectory::new(Vec::new()).unwrap(),
        fast_config(),
    );
    assert!(dispatcher.list_resources().is_empty());
    assert!(!dispatcher.send_to("QUEUE_001", "x"));
}

#[test]
fn custom_directory_routes_by_kind() {
    let broker = InMemoryBroker::new();
    let directory = ResourceDirectory::new(vec![
        ResourceDescriptor::queue("ORDERS", "Orders"),
        ResourceDescriptor::topic("EVENTS", "Events"),
    ])
    .unwrap();
    let dispatcher = Dispatcher::bootstrap(Arc::new(broker.clone()), directory, fast_config());

    assert!(dispatcher.send_to("ORDERS", "order-1"));
    assert!(dispatcher.send_to("EVENTS", "event-1"));

    assert_eq!(broker.queue_depth("ORDERS"), 1);
    assert_eq!(broker.queue_depth("EVENTS"), 0);
    assert_eq!(broker.subscriptions("EVENTS").len(), 3);
    assert_eq!(dispatcher.browse("EVENTS").get("1"), Some("event-1"));
}

#[test]
fn concurrent_callers_on_distinct_topics() {
    let (dispatcher, _broker) = dispatcher();
    let dispatcher = Arc::new(dispatcher);

    let handles: Vec<_> = ["TOPIC_001", "TOPIC_002", "TOPIC_003"]
        .into_iter()
        .map(|code| {
            let dispatcher = Arc::clone(&dispatcher);
            std::thread::spawn(move || {
                assert!(dispatcher.send_to(code, code));
                dispatcher.browse(code)
            })
        })
        .collect();

    for (handle, code) in handles.into_iter().zip(["TOPIC_001", "TOPIC_002", "TOPIC_003"]) {
        let listing = handle.join().unwrap();
        assert_eq!(listing.bodies(), [code]);
    }
}
