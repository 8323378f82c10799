//! Registry of pre-created durable subscribers, per topic.

/// One durable subscriber known to belong to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SubscriptionEntry {
    subscriber_name: String,
    topic_code: String,
}

/// Append-only record of the durable subscribers created at startup.
///
/// Filled before any request is served and only read afterwards; the topic
/// drain sweeps every subscriber registered for its topic.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    entries: Vec<SubscriptionEntry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscriber. Registering the same pair twice is a no-op.
    pub fn register(&mut self, subscriber_name: impl Into<String>, topic_code: impl Into<String>) {
        let entry = SubscriptionEntry {
            subscriber_name: subscriber_name.into(),
            topic_code: topic_code.into(),
        };
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Subscriber names registered for a topic, in registration order.
    pub fn subscribers_of(&self, topic_code: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.topic_code == topic_code)
            .map(|e| e.subscriber_name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
