// Readiness checks deciding whether a response bundle can become a snapshot
use crate::domain::endpoint::EndpointSet;
use crate::domain::snapshot::RawResponseBundle;
use serde_json::Value;
use thiserror::Error;

/// Reason a bundle was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Rejection(pub String);

pub trait SnapshotValidator: Send + Sync {
    fn validate(&self, bundle: &RawResponseBundle) -> Result<(), Rejection>;
}

/// A single readiness condition on one endpoint's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessRule {
    /// Body is an object with at least one key.
    NonEmptyObject(&'static str),
    /// Body is an object carrying a non-null `field`.
    FieldPresent(&'static str, &'static str),
    /// Body's `field` is an object with at least one key.
    NonEmptyMapField(&'static str, &'static str),
}

impl ReadinessRule {
    fn check(&self, bundle: &RawResponseBundle) -> Result<(), Rejection> {
        match *self {
            ReadinessRule::NonEmptyObject(endpoint) => match bundle.get(endpoint) {
                Some(Value::Object(map)) if !map.is_empty() => Ok(()),
                Some(Value::Object(_)) => Err(Rejection(format!("{} is empty", endpoint))),
                _ => Err(Rejection(format!("{} is not an object", endpoint))),
            },
            ReadinessRule::FieldPresent(endpoint, field) => {
                match bundle.get(endpoint).and_then(|body| body.get(field)) {
                    Some(value) if !value.is_null() => Ok(()),
                    _ => Err(Rejection(format!("{}.{} is absent", endpoint, field))),
                }
            }
            ReadinessRule::NonEmptyMapField(endpoint, field) => {
                match bundle.get(endpoint).and_then(|body| body.get(field)) {
                    Some(Value::Object(map)) if !map.is_empty() => Ok(()),
                    Some(Value::Object(_)) => {
                        Err(Rejection(format!("{}.{} is empty", endpoint, field)))
                    }
                    _ => Err(Rejection(format!("{}.{} is absent", endpoint, field))),
                }
            }
        }
    }
}

/// Requires a response for every descriptor, then applies the rules in order.
#[derive(Debug, Clone)]
pub struct Readiness {
    endpoints: EndpointSet,
    rules: Vec<ReadinessRule>,
}

impl Readiness {
    pub fn new(endpoints: EndpointSet) -> Self {
        Self {
            endpoints,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: ReadinessRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl SnapshotValidator for Readiness {
    fn validate(&self, bundle: &RawResponseBundle) -> Result<(), Rejection> {
        let missing = bundle.missing(&self.endpoints);
        if !missing.is_empty() {
            return Err(Rejection(format!("missing responses: {}", missing.join(", "))));
        }

        self.rules.iter().try_for_each(|rule| rule.check(bundle))
    }
}
