//! HTTP client for the remote gaze-processing service.
//!
//! All calls are best-effort: callers log failures and keep operating on
//! their last known state. The client never retries and never surfaces
//! errors to the user.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::protocol::{
    ActionRequest, ComposeState, FrameReport, FrameRequest, LayoutResponse, SensitivityRequest,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure or a non-2xx status.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered, but not with the shape the contract promises.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The six-endpoint contract the session client consumes. The detection and
/// suggestion logic behind it is opaque; command tokens pass through verbatim.
#[async_trait]
pub trait GazeService: Send + Sync {
    async fn keyboard_layout(&self) -> Result<Vec<String>, RemoteError>;
    async fn process_frame(&self, image: &str) -> Result<FrameReport, RemoteError>;
    async fn send_action(&self, action: &str) -> Result<ComposeState, RemoteError>;
    async fn toggle_tracking(&self) -> Result<(), RemoteError>;
    async fn clear_text(&self) -> Result<ComposeState, RemoteError>;
    async fn update_sensitivity(&self, value: f32) -> Result<(), RemoteError>;
}

pub struct HttpGazeService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGazeService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        response
            .json()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        response
            .json()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))
    }

    /// POST with an empty JSON body, response body discarded.
    async fn post_discarding<B>(&self, path: &str, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + Sync,
    {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl GazeService for HttpGazeService {
    async fn keyboard_layout(&self) -> Result<Vec<String>, RemoteError> {
        let layout: LayoutResponse = self.get_json("/api/keyboard-layout").await?;
        Ok(layout.keys)
    }

    async fn process_frame(&self, image: &str) -> Result<FrameReport, RemoteError> {
        self.post_json("/api/process-frame", &FrameRequest { image })
            .await
    }

    async fn send_action(&self, action: &str) -> Result<ComposeState, RemoteError> {
        self.post_json("/api/type", &ActionRequest { action }).await
    }

    async fn toggle_tracking(&self) -> Result<(), RemoteError> {
        self.post_discarding("/api/toggle-tracking", &serde_json::json!({}))
            .await
    }

    async fn clear_text(&self) -> Result<ComposeState, RemoteError> {
        self.post_json("/api/clear-text", &serde_json::json!({}))
            .await
    }

    async fn update_sensitivity(&self, value: f32) -> Result<(), RemoteError> {
        self.post_discarding("/api/update-sensitivity", &SensitivityRequest { sensitivity: value })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let service = HttpGazeService::new("http://localhost:5000/");
        assert_eq!(
            service.url("/api/keyboard-layout"),
            "http://localhost:5000/api/keyboard-layout"
        );
    }

    #[test]
    fn default_base_url_is_local() {
        let service = HttpGazeService::new(DEFAULT_BASE_URL);
        assert_eq!(service.url("/api/type"), "http://localhost:5000/api/type");
    }
}
