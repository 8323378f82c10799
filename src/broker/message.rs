//! Messages carried by the broker.

use crate::error::BrokerError;

/// Message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

/// A message as seen by producers and consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Broker-assigned identifier, set when the message is sent
    pub id: Option<String>,
    /// Message body
    pub body: Body,
    /// String properties (headers, correlation ids, etc.)
    pub properties: Vec<(String, String)>,
}

impl Message {
    /// Create a text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            id: None,
            body: Body::Text(body.into()),
            properties: Vec::new(),
        }
    }

    /// Create a bytes message.
    pub fn bytes(payload: Vec<u8>) -> Self {
        Self {
            id: None,
            body: Body::Bytes(payload),
            properties: Vec::new(),
        }
    }

    /// Add a property to the message.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The text body, or `NotText` for a bytes message.
    pub fn text_body(&self) -> Result<&str, BrokerError> {
        match &self.body {
            Body::Text(text) => Ok(text),
            Body::Bytes(_) => Err(BrokerError::NotText(
                self.id.clone().unwrap_or_else(|| "<unsent>".to_string()),
            )),
        }
    }
}
