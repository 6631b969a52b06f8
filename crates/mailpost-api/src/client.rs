//! HTTP client for the send endpoints.

use crate::error::{Error, Result};
use crate::message::{Message, RawMessage};
use crate::response::{ApiResponse, SendResult};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Header carrying the server API key.
pub const API_KEY_HEADER: &str = "X-Server-API-Key";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MESSAGE_PATH: &str = "api/v1/send/message";
const RAW_PATH: &str = "api/v1/send/raw";

/// Prepends `prefix` to `value`, collapsing any copies already at its start.
///
/// `ensure_prefix("https://https://host", "https://")` is `https://host`.
#[must_use]
pub fn ensure_prefix(value: &str, prefix: &str) -> String {
    let mut rest = value;
    if !prefix.is_empty() {
        while let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
        }
    }
    format!("{prefix}{rest}")
}

/// Client for one mail server on the API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    api_key: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Creates a client for `host` with the default timeout.
    ///
    /// `host` may be given with or without its `https://` scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty or not a valid URL, the key is
    /// empty, or the HTTP client cannot be built.
    pub fn new(host: &str, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(host, api_key, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn with_timeout(host: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::InvalidConfig("API host is empty".into()));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("API key is empty".into()));
        }

        let base_url = Url::parse(&format!("{}/", ensure_prefix(host, "https://")))?;
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            http_client,
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends a structured message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the message.
    pub async fn send_message(&self, message: &Message) -> Result<SendResult> {
        debug!(
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            "Sending structured message"
        );
        self.post(MESSAGE_PATH, message).await
    }

    /// Sends a raw message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the message.
    pub async fn send_raw(&self, message: &RawMessage) -> Result<SendResult> {
        debug!(
            mail_from = %message.mail_from,
            rcpt_to = ?message.rcpt_to,
            bytes = message.data.len(),
            "Sending raw message"
        );
        self.post(RAW_PATH, message).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Into::into)
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<SendResult> {
        let response = self
            .http_client
            .post(self.endpoint(path)?)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        match ApiResponse::parse(&text) {
            Ok(document) => document.into_send_result(),
            Err(_) if !status.is_success() => {
                Err(Error::InvalidResponse(format!("HTTP {status}")))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_prefix() {
        assert_eq!(ensure_prefix("postal.example.com", "https://"), "https://postal.example.com");
        assert_eq!(ensure_prefix("https://postal.example.com", "https://"), "https://postal.example.com");
        assert_eq!(
            ensure_prefix("https://https://postal.example.com", "https://"),
            "https://postal.example.com"
        );
        assert_eq!(ensure_prefix("", "https://"), "https://");
    }

    #[test]
    fn test_client_base_url() {
        let client = Client::new("postal.example.com/", "key").unwrap();
        assert_eq!(client.base_url().as_str(), "https://postal.example.com/");
        assert_eq!(
            client.endpoint(MESSAGE_PATH).unwrap().as_str(),
            "https://postal.example.com/api/v1/send/message"
        );
        assert_eq!(
            client.endpoint(RAW_PATH).unwrap().as_str(),
            "https://postal.example.com/api/v1/send/raw"
        );
    }

    #[test]
    fn test_client_rejects_empty_config() {
        assert!(matches!(Client::new("  ", "key"), Err(Error::InvalidConfig(_))));
        assert!(matches!(Client::new("postal.example.com", ""), Err(Error::InvalidConfig(_))));
    }
}
