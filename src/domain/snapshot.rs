// Response bundles and accepted snapshots
use crate::domain::endpoint::EndpointSet;
use crate::error::AttemptError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Everything one poll attempt brought back, keyed by endpoint name.
///
/// A name maps to `None` when its request failed; the failure reason is kept
/// alongside so the attempt can be logged as a whole.
#[derive(Debug, Clone, Default)]
pub struct RawResponseBundle {
    responses: HashMap<&'static str, Option<Value>>,
    failures: Vec<(&'static str, String)>,
}

impl RawResponseBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, body: Value) {
        self.responses.insert(name, Some(body));
    }

    pub fn record_failure(&mut self, name: &'static str, reason: impl Into<String>) {
        self.responses.insert(name, None);
        self.failures.push((name, reason.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.responses.get(name).and_then(Option::as_ref)
    }

    pub fn failures(&self) -> &[(&'static str, String)] {
        &self.failures
    }

    /// Names of descriptors in `endpoints` with no usable response, in set order.
    pub fn missing(&self, endpoints: &EndpointSet) -> Vec<&'static str> {
        endpoints
            .names()
            .filter(|name| self.get(name).is_none())
            .collect()
    }

    /// Decode one response into its typed schema.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T, AttemptError> {
        let body = self
            .get(name)
            .ok_or_else(|| AttemptError::NotReady(format!("no response for {}", name)))?;

        T::deserialize(body).map_err(|e| AttemptError::malformed(name, e))
    }
}

#[cfg(test)]
impl RawResponseBundle {
    pub fn with(mut self, name: &'static str, body: Value) -> Self {
        self.insert(name, body);
        self
    }
}

/// A validated bundle that has been decoded and bound for display.
///
/// Installed once per page activation and shared behind an `Arc`.
#[derive(Debug)]
pub struct Snapshot<V> {
    pub view: V,
    pub accepted_at: DateTime<Utc>,
    pub attempts: u32,
}

impl<V> Snapshot<V> {
    pub fn new(view: V, attempts: u32) -> Self {
        Self {
            view,
            accepted_at: Utc::now(),
            attempts,
        }
    }
}
