//! Per-recipient RFC 822 message assembly.

use chrono::{DateTime, FixedOffset};
use mailpost_api::RawMessage;
use mailpost_mime::encoding::{MAX_LINE_LENGTH, encode_base64, encode_base64_wrapped};
use mailpost_mime::token;
use std::fmt::Write;
use tracing::debug;

use crate::attributes::MessageAttributes;

/// `Date` header format, e.g. `Tue, 05 Mar 2024 14:07:09 +0100`.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Separator between the Content-Type line and the body.
const BODY_SEPARATOR: &str = "\r\n\n";

/// Builds one raw message per recipient.
///
/// Header lines end in `\n` except Content-Type, which ends in `\r\n`.
/// The envelope sender is the same `Name <address>` form as the From header.
/// Attachments are not embedded; see [`inject_attachments`].
pub(super) fn build(
    attributes: &MessageAttributes,
    now: DateTime<FixedOffset>,
    message_id: &str,
) -> Vec<RawMessage> {
    let date = now.format(DATE_FORMAT);
    let headers = header_block(attributes);

    attributes
        .to
        .iter()
        .map(|recipient| {
            let data = format!(
                "Date: {date}\nFrom: {from}\nTo: {recipient}\nSubject: {subject}\n\
                 Message-ID: {message_id}\nMIME-Version: 1.0\n{headers}\n{content}",
                from = attributes.from,
                subject = attributes.subject,
                content = attributes.message,
            );
            RawMessage::new()
                .mail_from(attributes.from.as_str())
                .rcpt_to(recipient.as_str())
                .data(data)
        })
        .collect()
}

fn header_block(attributes: &MessageAttributes) -> String {
    let mut block = String::new();
    if !attributes.cc.is_empty() {
        let _ = writeln!(block, "Cc: {}", attributes.cc.join(", "));
    }
    if !attributes.bcc.is_empty() {
        let _ = writeln!(block, "Bcc: {}", attributes.bcc.join(", "));
    }
    if !attributes.reply_to.is_empty() {
        let _ = writeln!(block, "Reply-To: {}", attributes.reply_to);
    }
    let _ = write!(block, "{}", attributes.headers);
    let _ = write!(block, "Content-Type: {}\r\n", attributes.content_type_header());
    block
}

/// Rewrites a raw message as `multipart/mixed` carrying the attachments.
///
/// The original body becomes the first part under its original Content-Type.
/// Each attachment follows as a Base64 part. Messages without attachments,
/// or whose data does not have the layout produced by the renderer, are
/// returned unchanged.
#[must_use]
pub fn inject_attachments(raw: RawMessage, attributes: &MessageAttributes) -> RawMessage {
    if attributes.attachments.is_empty() {
        return raw;
    }

    let text = raw.data_text().into_owned();
    let Some(split) = text.find(BODY_SEPARATOR) else {
        debug!("Raw message has no body separator, leaving attachments out");
        return raw;
    };
    let (head, body) = (&text[..split], &text[split + BODY_SEPARATOR.len()..]);
    let Some(type_line) = head.rfind("Content-Type:") else {
        debug!("Raw message has no Content-Type, leaving attachments out");
        return raw;
    };

    let boundary = token::boundary();
    let mut data = String::with_capacity(text.len());
    data.push_str(&head[..type_line]);
    let _ = write!(
        data,
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"{BODY_SEPARATOR}"
    );
    let _ = write!(
        data,
        "--{boundary}\r\nContent-Type: {}\r\n\r\n{body}\r\n",
        attributes.content_type_header()
    );

    for attachment in &attributes.attachments {
        let encoded = encode_base64_wrapped(attachment.data(), MAX_LINE_LENGTH)
            .unwrap_or_else(|_| encode_base64(attachment.data()));
        let _ = write!(
            data,
            "--{boundary}\r\n\
             Content-Type: {content_type}; name=\"{name}\"\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"{name}\"\r\n\r\n\
             {encoded}",
            content_type = attachment.content_type(),
            name = attachment.filename(),
        );
    }
    let _ = write!(data, "--{boundary}--\r\n");

    debug!(
        attachments = attributes.attachments.len(),
        "Injected attachments into raw message"
    );
    raw.data(data)
}
