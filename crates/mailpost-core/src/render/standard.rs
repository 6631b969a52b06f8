//! Structured message assembly.

use mailpost_api::{AttachmentPayload, Message};
use mailpost_mime::strip_tags;

use crate::attributes::MessageAttributes;

/// Builds the structured message for `attributes`.
///
/// HTML bodies are sent alongside a tag-stripped plain-text version; any
/// other body is sent as plain text only.
pub(super) fn build(attributes: &MessageAttributes) -> Message {
    let (html_body, plain_body) = if attributes.is_html() {
        (
            Some(attributes.message.clone()),
            Some(strip_tags(&attributes.message)),
        )
    } else {
        (None, Some(attributes.message.clone()))
    };

    Message {
        to: attributes.to.clone(),
        cc: attributes.cc.clone(),
        bcc: attributes.bcc.clone(),
        from: attributes.from.clone(),
        subject: attributes.subject.clone(),
        reply_to: (!attributes.reply_to.is_empty()).then(|| attributes.reply_to.clone()),
        plain_body,
        html_body,
        headers: attributes
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        attachments: attributes
            .attachments
            .iter()
            .map(|attachment| AttachmentPayload {
                name: attachment.filename().to_string(),
                content_type: attachment.content_type().to_string(),
                data: attachment.data().to_vec(),
            })
            .collect(),
        ..Message::default()
    }
}
