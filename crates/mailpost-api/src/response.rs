//! Response documents returned by the send endpoints.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status value of a successful response.
const SUCCESS: &str = "success";

/// Envelope every endpoint answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// `success`, `error` or `parameter-error`.
    pub status: String,
    /// Server-side processing time in seconds.
    #[serde(default)]
    pub time: Option<f64>,
    /// Endpoint-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload of an error response.
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorData {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ApiResponse {
    /// Parses a response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a response document.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(Into::into)
    }

    /// Converts the document into a send result.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` for a non-success status, or a JSON error if the
    /// success payload is malformed.
    pub fn into_send_result(self) -> Result<SendResult> {
        if self.status != SUCCESS {
            let data: ErrorData = serde_json::from_value(self.data).unwrap_or_default();
            return Err(Error::api_error(self.status, data.code, data.message));
        }
        serde_json::from_value(self.data).map_err(Into::into)
    }
}

/// Identifier of one queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    /// Numeric message id.
    pub id: u64,
    /// Message token.
    pub token: String,
}

/// Result of a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    /// Message-ID assigned by the server.
    pub message_id: String,
    /// Queued message per recipient address.
    #[serde(default)]
    pub messages: HashMap<String, MessageRef>,
}

impl SendResult {
    /// Number of recipients the server queued a message for.
    #[must_use]
    pub fn size(&self) -> usize {
        self.messages.len()
    }

    /// Looks up the queued message for a recipient, ignoring case.
    #[must_use]
    pub fn recipient(&self, address: &str) -> Option<&MessageRef> {
        self.messages
            .iter()
            .find(|(addr, _)| addr.eq_ignore_ascii_case(address))
            .map(|(_, message)| message)
    }
}
