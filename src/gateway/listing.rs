//! Ordinal-keyed browse results.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Message bodies keyed "1", "2", "3", ... in the order they were read.
///
/// Serializes as a JSON object whose keys stay in read order (so "10"
/// follows "9", not "1").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    bodies: Vec<String>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next body; it gets the next ordinal.
    pub fn push(&mut self, body: impl Into<String>) {
        self.bodies.push(body.into());
    }

    /// Body stored under an ordinal key such as `"1"`.
    ///
    /// Only the exact key matches: `"01"` and `"+1"` are not ordinals.
    pub fn get(&self, ordinal: &str) -> Option<&str> {
        let position: usize = ordinal.parse().ok()?;
        if position.to_string() != ordinal {
            return None;
        }
        self.bodies
            .get(position.checked_sub(1)?)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies in read order.
    pub fn bodies(&self) -> &[String] {
        &self.bodies
    }

    /// (ordinal, body) pairs in read order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| ((i + 1).to_string(), body.as_str()))
    }

}

impl<S: Into<String>> FromIterator<S> for Listing {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            bodies: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Serialize for Listing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bodies.len()))?;
        for (ordinal, body) in self.iter() {
            map.serialize_entry(&ordinal, body)?;
        }
        map.end()
    }
}
