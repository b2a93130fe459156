// Analytics API client over reqwest
use crate::application::analytics_source::AnalyticsSource;
use crate::domain::endpoint::{EndpointDescriptor, Method};
use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpAnalyticsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalyticsSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, endpoint: &EndpointDescriptor) -> String {
        format!("{}/{}", self.base_url, endpoint.path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AnalyticsSource for HttpAnalyticsSource {
    async fn fetch(&self, endpoint: &EndpointDescriptor) -> Result<Value, SourceError> {
        let url = self.build_url(endpoint);
        let request = match endpoint.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        tracing::debug!(endpoint = endpoint.name, %url, "fetching");
        let response = request.header("Accept", "application/json").send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}
