//! Request payloads for the send endpoints.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

fn as_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

/// An attachment on a structured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    /// File name shown to the recipient.
    pub name: String,
    /// MIME content type.
    pub content_type: String,
    /// Raw content, sent Base64-encoded.
    #[serde(serialize_with = "as_base64")]
    pub data: Vec<u8>,
}

/// A structured message for `send/message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// CC addresses.
    pub cc: Vec<String>,
    /// BCC addresses.
    pub bcc: Vec<String>,
    /// From header value.
    pub from: String,
    /// Sender header value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Tag for grouping messages in the API's dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Reply-To address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Plain text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain_body: Option<String>,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    /// Additional headers.
    pub headers: BTreeMap<String, String>,
    /// Attachments.
    pub attachments: Vec<AttachmentPayload>,
    /// Whether this message is a bounce.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bounce: bool,
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<String>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Sets the From header.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Sets the Sender header.
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Sets the plain text body.
    #[must_use]
    pub fn plain_body(mut self, body: impl Into<String>) -> Self {
        self.plain_body = Some(body.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Adds a header, replacing any earlier value for the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(
        mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.attachments.push(AttachmentPayload {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }
}

/// A pre-formatted message for `send/raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawMessage {
    /// Envelope sender.
    pub mail_from: String,
    /// Envelope recipients.
    pub rcpt_to: Vec<String>,
    /// Full RFC 822 message, sent Base64-encoded.
    #[serde(serialize_with = "as_base64")]
    pub data: Vec<u8>,
    /// Whether this message is a bounce.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bounce: bool,
}

impl RawMessage {
    /// Creates an empty raw message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the envelope sender.
    #[must_use]
    pub fn mail_from(mut self, address: impl Into<String>) -> Self {
        self.mail_from = address.into();
        self
    }

    /// Adds an envelope recipient.
    #[must_use]
    pub fn rcpt_to(mut self, address: impl Into<String>) -> Self {
        self.rcpt_to.push(address.into());
        self
    }

    /// Sets the message data.
    #[must_use]
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Returns the message data as text, replacing invalid UTF-8.
    #[must_use]
    pub fn data_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_builder_serializes() {
        let message = Message::new()
            .to("a@example.com")
            .to("b@example.com")
            .cc("c@example.com")
            .from("Shop <shop@example.com>")
            .subject("Order")
            .html_body("<p>Hi</p>")
            .plain_body("Hi")
            .header("X-Campaign", "spring")
            .attach("a.txt", "text/plain", b"hello".to_vec());

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "to": ["a@example.com", "b@example.com"],
                "cc": ["c@example.com"],
                "bcc": [],
                "from": "Shop <shop@example.com>",
                "subject": "Order",
                "plain_body": "Hi",
                "html_body": "<p>Hi</p>",
                "headers": {"X-Campaign": "spring"},
                "attachments": [
                    {"name": "a.txt", "content_type": "text/plain", "data": "aGVsbG8="}
                ]
            })
        );
    }

    #[test]
    fn test_message_optional_fields() {
        let value = serde_json::to_value(Message::new().reply_to("r@example.com").tag("t").bcc("x@y.z")).unwrap();
        assert_eq!(value["reply_to"], "r@example.com");
        assert_eq!(value["tag"], "t");
        assert_eq!(value["bcc"], json!(["x@y.z"]));
        assert!(value.get("bounce").is_none());
        assert!(value.get("sender").is_none());
    }

    #[test]
    fn test_raw_message_serializes() {
        let raw = RawMessage::new()
            .mail_from("shop@example.com")
            .rcpt_to("a@example.com")
            .data("Subject: Hi\r\n\r\nHello");

        let value = serde_json::to_value(&raw).unwrap();
        assert_eq!(value["mail_from"], "shop@example.com");
        assert_eq!(value["rcpt_to"], json!(["a@example.com"]));
        assert_eq!(value["data"], "U3ViamVjdDogSGkNCg0KSGVsbG8=");
        assert_eq!(raw.data_text(), "Subject: Hi\r\n\r\nHello");
    }
}
