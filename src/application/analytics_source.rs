// Source trait for analytics API access
use crate::domain::endpoint::EndpointDescriptor;
use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Issue one request and return its decoded JSON body.
    ///
    /// Non-success statuses are errors; the body is only returned for 2xx.
    async fn fetch(&self, endpoint: &EndpointDescriptor) -> Result<Value, SourceError>;
}
