// Thin JSON client for the remote workspace REST API.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const NOTION_VERSION_HEADER: &str = "Notion-Version";
const NOT_FOUND_CODE: &str = "object_not_found";

/// A failed remote call: transport failure, undecodable body, or the
/// API's own error envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct NotionApiError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl NotionApiError {
    fn transport(error: reqwest::Error) -> Self {
        Self { status: error.status().map(|s| s.as_u16()), code: None, message: error.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(NOT_FOUND_CODE) || self.status == Some(404)
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Connection settings for [`NotionHttpClient`].
#[derive(Debug, Clone)]
pub struct NotionClientConfig {
    pub api_key: String,
    pub base_url: Url,
    pub notion_version: String,
    pub timeout: Option<Duration>,
}

/// Shared handle used by both repositories. Holds no per-call state.
#[derive(Debug, Clone)]
pub struct NotionHttpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    notion_version: String,
}

impl NotionHttpClient {
    pub fn new(config: NotionClientConfig) -> Result<Self, NotionApiError> {
        if config.api_key.trim().is_empty() {
            return Err(NotionApiError {
                status: None,
                code: None,
                message: "Notion API key is required".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(NotionApiError::transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key,
            notion_version: config.notion_version,
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value, NotionApiError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, NotionApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, NotionApiError> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    /// `true` when the credential is accepted by `GET /users/me`.
    pub async fn validate_api_key(&self) -> bool {
        match self.get("/users/me").await {
            Ok(_) => true,
            Err(error) => {
                debug!(%error, "credential check failed");
                false
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, NotionApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "remote request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.api_key)
            .header(NOTION_VERSION_HEADER, &self.notion_version);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(NotionApiError::transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(NotionApiError::transport)?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|error| NotionApiError {
                status: Some(status.as_u16()),
                code: None,
                message: format!("response body is not valid JSON: {error}"),
            });
        }

        Err(decode_error(status, &bytes))
    }
}

fn decode_error(status: StatusCode, bytes: &[u8]) -> NotionApiError {
    let body = serde_json::from_slice::<ErrorBody>(bytes).ok();
    let code = body.as_ref().and_then(|body| body.code.clone());
    let message = body
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    NotionApiError { status: Some(status.as_u16()), code, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> NotionClientConfig {
        NotionClientConfig {
            api_key: api_key.to_string(),
            base_url: Url::parse(DEFAULT_API_BASE_URL).unwrap(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: None,
        }
    }

    #[test]
    fn blank_api_key_is_rejected() {
        for key in ["", "   "] {
            let error = NotionHttpClient::new(config(key)).expect_err("blank key should fail");
            assert_eq!(error.message, "Notion API key is required");
        }
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let mut config = config("secret_test123");
        config.base_url = Url::parse("http://127.0.0.1:9999/v1/").unwrap();
        let client = NotionHttpClient::new(config).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9999/v1");
    }

    #[test]
    fn error_envelope_is_decoded() {
        let body = br#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find page"}"#;
        let error = decode_error(StatusCode::NOT_FOUND, body);
        assert_eq!(error.code.as_deref(), Some("object_not_found"));
        assert_eq!(error.message, "Could not find page");
        assert!(error.is_not_found());
    }

    #[test]
    fn undecodable_error_body_falls_back_to_status() {
        let error = decode_error(StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(error.status, Some(502));
        assert!(error.code.is_none());
        assert!(error.message.contains("502"));
        assert!(!error.is_not_found());
    }

    #[test]
    fn validation_errors_are_not_not_found() {
        let body = br#"{"object":"error","status":400,"code":"validation_error","message":"bad"}"#;
        assert!(!decode_error(StatusCode::BAD_REQUEST, body).is_not_found());
    }
}
