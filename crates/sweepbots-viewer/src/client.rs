//! HTTP client for the remote simulation server.

use crate::sync::FrameSource;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use sweepbots_core::{Error, Result, ViewerConfig};
use tracing::instrument;

/// Client side of the two-call polling protocol: one request for the
/// iteration count, then one request per frame. Holds a single HTTP
/// client for the whole run.
pub struct SimulationClient {
    config: ViewerConfig,
    http_client: Client,
    session_id: String,
}

impl SimulationClient {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let session_id = config
            .session_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// GET a plain-text body, surfacing transport failures and non-2xx
    /// statuses as network errors. The server expects a JSON content type
    /// even though both bodies are plain text; sent as observed.
    #[instrument(skip(self))]
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

impl FrameSource for SimulationClient {
    async fn iteration_count(&self) -> Result<i64> {
        let url = format!("{}/iterations", self.config.server_url);
        let body = self.get_text(&url).await?;
        body.trim().parse().map_err(|_| {
            Error::Format(format!(
                "iteration count is not an integer: {:?}",
                body.trim()
            ))
        })
    }

    async fn frame_body(&self, iteration: u64) -> Result<String> {
        let url = format!("{}/grid?ite={}", self.config.server_url, iteration);
        self.get_text(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_client_creation() {
        let client = SimulationClient::new(ViewerConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_configured_session_id_is_kept() {
        let config = ViewerConfig {
            session_id: Some("bench-rig-2".to_string()),
            ..ViewerConfig::default()
        };
        let client = SimulationClient::new(config).unwrap();
        assert_eq!(client.session_id(), "bench-rig-2");
    }
}
