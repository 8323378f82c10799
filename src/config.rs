//! Toolkit configuration, loaded from TOML.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) gives the built-in resources on the in-memory broker.
//!
//! ```toml
//! [broker]
//! url = "memory://local"
//!
//! [http]
//! bind = "127.0.0.1:8080"
//!
//! [gateway]
//! receive_timeout_ms = 5000
//! subscriber_prefix = "theSubscriber"
//! extra_subscribers = 2
//!
//! [[resources]]
//! code = "QUEUE_001"
//! kind = "queue"
//! name = "QUEUE 001 in ActiveMQ"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::resource::{builtin_resources, ResourceDescriptor, ResourceDirectory};

/// Environment variable naming the config file for the binary.
pub const CONFIG_ENV: &str = "JMS_TOOLKIT_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub broker: BrokerConfig,
    pub http: HttpConfig,
    pub gateway: GatewayConfig,
    pub resources: Vec<ResourceDescriptor>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            http: HttpConfig::default(),
            gateway: GatewayConfig::default(),
            resources: builtin_resources(),
        }
    }
}

impl ToolkitConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.broker.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Build the resource directory from the configured resources.
    pub fn directory(&self) -> Result<ResourceDirectory, ConfigError> {
        ResourceDirectory::new(self.resources.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker location. Only the in-process broker (`memory://` or `vm://`)
    /// is available.
    pub url: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: "memory://local".to_string(),
        }
    }
}

impl BrokerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.starts_with("memory://") || self.url.starts_with("vm://") {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedBroker(self.url.clone()))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Naming and timing used by the queue and topic gateways.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bound on each individual receive call.
    pub receive_timeout_ms: u64,
    /// Prefix of the canonical durable subscriber name ("theSubscriberTOPIC_001").
    pub subscriber_prefix: String,
    /// Extra durable subscribers pre-created per topic ("..._1", "..._2").
    pub extra_subscribers: u32,
    pub queue_send_client_id: String,
    pub queue_browse_client_id: String,
    pub queue_drain_client_id: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: 5000,
            subscriber_prefix: "theSubscriber".to_string(),
            extra_subscribers: 2,
            queue_send_client_id: "SendQueueSample".to_string(),
            queue_browse_client_id: "BrowseQueueSample".to_string(),
            queue_drain_client_id: "ConsumeQueueSample".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// The durable subscriber used to browse a topic.
    pub fn canonical_subscriber(&self, topic_code: &str) -> String {
        format!("{}{}", self.subscriber_prefix, topic_code)
    }

    /// Every subscriber pre-created for a topic, canonical one first.
    pub fn subscriber_names(&self, topic_code: &str) -> Vec<String> {
        let canonical = self.canonical_subscriber(topic_code);
        let mut names = vec![canonical.clone()];
        names.extend((1..=self.extra_subscribers).map(|n| format!("{}_{}", canonical, n)));
        names
    }
}
