use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{AssistantBackend, BackendError, MessageRequest};
use crate::config::AssistantConfig;

/// Assistant backend reached over HTTP.
pub struct HttpAssistantBackend {
    client: Client,
    base_url: String,
    status_path: String,
    message_path: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpAssistantBackend {
    pub fn new(config: &AssistantConfig) -> Result<Self, BackendError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            status_path: config.status_path.clone(),
            message_path: config.message_path.clone(),
            api_token: config.api_token.clone(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Http(e.to_string())
        }
    }

    async fn read_json(&self, response: Response) -> Result<Value, BackendError> {
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or(error_text);
            return Err(BackendError::Api { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Json(e.to_string()))
    }
}

/// Error bodies carry the reason under `error`, `detail` or `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error.or(self.detail).or(self.message)
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_status(&self) -> Result<Value, BackendError> {
        let url = self.url(&self.status_path);
        debug!("Assistant status probe: {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.read_json(response).await
    }

    async fn send_message(&self, request: &MessageRequest) -> Result<Value, BackendError> {
        let url = self.url(&self.message_path);
        debug!(
            "Assistant message #{} -> {} (provider hint: {:?})",
            request.metadata.sequence, url, request.metadata.provider
        );

        let response = self
            .authorize(self.client.post(&url))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.read_json(response).await
    }
}
