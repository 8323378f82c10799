//! Resource directory - the configured queues and topics, looked up by code.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Whether a resource is a queue or a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[serde(alias = "Q", alias = "QUEUE")]
    Queue,
    #[serde(alias = "T", alias = "TOPIC")]
    Topic,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Queue => write!(f, "queue"),
            ResourceKind::Topic => write!(f, "topic"),
        }
    }
}

/// A configured resource: a code, its kind, and a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub code: String,
    pub kind: ResourceKind,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl ResourceDescriptor {
    pub fn new(code: impl Into<String>, kind: ResourceKind, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind,
            display_name: display_name.into(),
        }
    }

    pub fn queue(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(code, ResourceKind::Queue, display_name)
    }

    pub fn topic(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(code, ResourceKind::Topic, display_name)
    }
}

/// The five resources the toolkit ships with.
pub fn builtin_resources() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor::queue("QUEUE_001", "QUEUE 001 in ActiveMQ"),
        ResourceDescriptor::queue("QUEUE_002", "QUEUE 002 in ActiveMQ"),
        ResourceDescriptor::topic("TOPIC_001", "TOPIC 001 in ActiveMQ"),
        ResourceDescriptor::topic("TOPIC_002", "TOPIC 002 in ActiveMQ"),
        ResourceDescriptor::topic("TOPIC_003", "TOPIC 003 in ActiveMQ"),
    ]
}

/// Read-only lookup from resource code to descriptor.
///
/// Built once before any request is served and never mutated afterwards,
/// so it can be shared across threads without synchronization.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    resources: Vec<ResourceDescriptor>,
    by_code: HashMap<String, usize>,
}

impl Default for ResourceDirectory {
    fn default() -> Self {
        let resources = builtin_resources();
        let by_code = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.code.clone(), i))
            .collect();
        Self { resources, by_code }
    }
}

impl ResourceDirectory {
    /// Build a directory, rejecting empty and duplicate codes.
    pub fn new(
        resources: impl IntoIterator<Item = ResourceDescriptor>,
    ) -> Result<Self, ConfigError> {
        let mut directory = Self {
            resources: Vec::new(),
            by_code: HashMap::new(),
        };
        for resource in resources {
            if resource.code.is_empty() {
                return Err(ConfigError::EmptyResourceCode);
            }
            if directory.by_code.contains_key(&resource.code) {
                return Err(ConfigError::DuplicateResource(resource.code));
            }
            directory
                .by_code
                .insert(resource.code.clone(), directory.resources.len());
            directory.resources.push(resource);
        }
        Ok(directory)
    }

    /// Look up a resource by exact code.
    ///
    /// Total over every input: unknown, empty and absent codes all yield `None`.
    pub fn resolve<'c>(&self, code: impl Into<Option<&'c str>>) -> Option<&ResourceDescriptor> {
        let index = *self.by_code.get(code.into()?)?;
        self.resources.get(index)
    }

    /// Every configured code mapped to its display name.
    pub fn list_all(&self) -> BTreeMap<String, String> {
        self.resources
            .iter()
            .map(|r| (r.code.clone(), r.display_name.clone()))
            .collect()
    }

    /// Resources of one kind, in configuration order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
