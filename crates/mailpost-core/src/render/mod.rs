//! Turning normalized attributes into API payloads.
//!
//! Non-multipart messages become one structured [`Message`]. Multipart
//! messages cannot be expressed field by field, so they become one
//! pre-formatted [`RawMessage`] per recipient.

mod raw;
mod standard;

pub use raw::inject_attachments;

use chrono::{DateTime, FixedOffset, Local, Utc};
use mailpost_api::{Message, RawMessage};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::attributes::MessageAttributes;
use crate::environment::Environment;

/// How a message is handed to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Field-by-field structured message.
    Standard,
    /// Pre-formatted RFC 822 message.
    Raw,
}

impl Mode {
    /// Tag passed to payload filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrites an assembled payload before it is sent.
pub trait PayloadFilter<T>: Send + Sync {
    /// Returns the payload to send in place of `payload`.
    fn filter(&self, payload: T, mode: Mode, attributes: &MessageAttributes) -> T;
}

impl<T, F> PayloadFilter<T> for F
where
    F: Fn(T, Mode, &MessageAttributes) -> T + Send + Sync,
{
    fn filter(&self, payload: T, mode: Mode, attributes: &MessageAttributes) -> T {
        self(payload, mode, attributes)
    }
}

/// Source of the `Date` header.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Source of the local part of generated Message-IDs.
pub trait MessageIdSource: Send + Sync {
    /// A token unique to one send.
    fn token(&self, now: DateTime<FixedOffset>) -> String;
}

/// Time-plus-randomness tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueId;

impl MessageIdSource for UniqueId {
    fn token(&self, now: DateTime<FixedOffset>) -> String {
        mailpost_mime::token::unique_token(now.with_timezone(&Utc))
    }
}

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct FixedId(pub String);

impl MessageIdSource for FixedId {
    fn token(&self, _now: DateTime<FixedOffset>) -> String {
        self.0.clone()
    }
}

/// Output of [`MessageRenderer::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// One structured message for all recipients.
    Standard(Message),
    /// One raw message per recipient, in recipient order.
    Raw(Vec<RawMessage>),
}

impl Rendered {
    /// The mode the payloads were rendered in.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Standard(_) => Mode::Standard,
            Self::Raw(_) => Mode::Raw,
        }
    }
}

/// Chooses the render mode and builds payloads.
pub struct MessageRenderer {
    environment: Arc<dyn Environment>,
    clock: Box<dyn Clock>,
    ids: Box<dyn MessageIdSource>,
    standard_filter: Option<Box<dyn PayloadFilter<Message>>>,
    raw_filter: Option<Box<dyn PayloadFilter<RawMessage>>>,
    embed_attachments: bool,
}

impl MessageRenderer {
    /// Creates a renderer using the system clock and random Message-IDs.
    #[must_use]
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self {
            environment,
            clock: Box::new(SystemClock),
            ids: Box::new(UniqueId),
            standard_filter: None,
            raw_filter: None,
            embed_attachments: false,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the Message-ID token source.
    #[must_use]
    pub fn with_message_ids(mut self, ids: impl MessageIdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Installs a filter run on every structured message.
    #[must_use]
    pub fn with_standard_filter(mut self, filter: impl PayloadFilter<Message> + 'static) -> Self {
        self.standard_filter = Some(Box::new(filter));
        self
    }

    /// Installs a filter run on every raw message.
    #[must_use]
    pub fn with_raw_filter(mut self, filter: impl PayloadFilter<RawMessage> + 'static) -> Self {
        self.raw_filter = Some(Box::new(filter));
        self
    }

    /// Embeds attachments into raw messages before the raw filter runs.
    ///
    /// Off by default: raw messages carry no attachments.
    #[must_use]
    pub const fn with_raw_attachments(mut self, enabled: bool) -> Self {
        self.embed_attachments = enabled;
        self
    }

    /// The environment attributes are parsed and rendered against.
    #[must_use]
    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    /// Renders `attributes` in the mode its content type calls for.
    #[must_use]
    pub fn render(&self, attributes: &MessageAttributes) -> Rendered {
        let rendered = if attributes.is_multipart() {
            Rendered::Raw(self.render_raw(attributes))
        } else {
            Rendered::Standard(self.render_standard(attributes))
        };
        debug!(mode = %rendered.mode(), "Rendered message");
        rendered
    }

    /// Builds the structured message, then runs the standard filter.
    #[must_use]
    pub fn render_standard(&self, attributes: &MessageAttributes) -> Message {
        let message = standard::build(attributes);
        match &self.standard_filter {
            Some(filter) => filter.filter(message, Mode::Standard, attributes),
            None => message,
        }
    }

    /// Builds one raw message per recipient, running the raw filter on each.
    ///
    /// Attachments, when enabled, are embedded before the filter sees the
    /// message.
    #[must_use]
    pub fn render_raw(&self, attributes: &MessageAttributes) -> Vec<RawMessage> {
        let now = self.clock.now();
        let message_id = format!(
            "<{}@{}>",
            self.ids.token(now),
            attributes.domain(self.environment.as_ref())
        );

        raw::build(attributes, now, &message_id)
            .into_iter()
            .map(|message| {
                if self.embed_attachments {
                    inject_attachments(message, attributes)
                } else {
                    message
                }
            })
            .map(|message| match &self.raw_filter {
                Some(filter) => filter.filter(message, Mode::Raw, attributes),
                None => message,
            })
            .collect()
    }
}

impl fmt::Debug for MessageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRenderer")
            .field("standard_filter", &self.standard_filter.is_some())
            .field("raw_filter", &self.raw_filter.is_some())
            .field("embed_attachments", &self.embed_attachments)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::attachment::Attachment;
    use crate::attributes::ParseOptions;
    use crate::environment::SiteEnvironment;
    use crate::input::MailArgs;

    fn renderer() -> MessageRenderer {
        let clock = DateTime::parse_from_rfc3339("2024-03-05T14:07:09+01:00").unwrap();
        MessageRenderer::new(Arc::new(SiteEnvironment::new().with_host("www.example.org")))
            .with_clock(FixedClock(clock))
            .with_message_ids(FixedId("token.1".into()))
    }

    fn attributes(args: MailArgs) -> MessageAttributes {
        MessageAttributes::parse(
            args,
            &ParseOptions::new("shop@example.com", "Shop"),
            &SiteEnvironment::new(),
        )
    }

    #[test]
    fn test_mode_tags() {
        assert_eq!(Mode::Standard.to_string(), "standard");
        assert_eq!(Mode::Raw.as_str(), "raw");
    }

    #[test]
    fn test_html_renders_standard() {
        let attrs = attributes(MailArgs::new().to("a@x.com, b@y.com").message("<p>Hello</p>"));
        let Rendered::Standard(message) = renderer().render(&attrs) else {
            panic!("expected standard mode");
        };
        assert_eq!(message.to, vec!["a@x.com", "b@y.com"]);
        assert_eq!(message.html_body.as_deref(), Some("<p>Hello</p>"));
        assert_eq!(message.plain_body.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_multipart_renders_raw_per_recipient() {
        let attrs = attributes(
            MailArgs::new()
                .to("a@x.com, b@y.com, c@z.com")
                .headers("Content-Type: multipart/mixed; boundary=B"),
        );
        let Rendered::Raw(messages) = renderer().render(&attrs) else {
            panic!("expected raw mode");
        };
        let recipients: Vec<_> = messages.iter().map(|m| m.rcpt_to.clone()).collect();
        assert_eq!(
            recipients,
            vec![vec!["a@x.com"], vec!["b@y.com"], vec!["c@z.com"]]
        );
    }

    #[test]
    fn test_standard_filter_receives_mode() {
        let attrs = attributes(MailArgs::new().to("a@x.com"));
        let renderer = renderer().with_standard_filter(
            |message: Message, mode: Mode, attrs: &MessageAttributes| {
                assert_eq!(mode, Mode::Standard);
                message.tag(format!("{}-{}", mode, attrs.to.len()))
            },
        );
        let message = renderer.render_standard(&attrs);
        assert_eq!(message.tag.as_deref(), Some("standard-1"));
    }

    #[test]
    fn test_raw_filter_runs_per_recipient() {
        let attrs = attributes(
            MailArgs::new()
                .to("a@x.com, b@y.com")
                .headers("Content-Type: multipart/alternative"),
        );
        let renderer = renderer().with_raw_filter(
            |message: RawMessage, mode: Mode, _: &MessageAttributes| {
                let data = format!("X-Mode: {mode}\n{}", message.data_text());
                message.data(data)
            },
        );
        let messages = renderer.render_raw(&attrs);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.data_text().starts_with("X-Mode: raw\nDate: ")));
    }

    #[test]
    fn test_raw_filter_sees_embedded_attachments() {
        let mut attrs = attributes(
            MailArgs::new()
                .to("a@x.com")
                .headers("Content-Type: multipart/alternative; boundary=B"),
        );
        attrs.attachments = vec![Attachment::new("a.txt", "text/plain", b"hello".to_vec())];

        let renderer = renderer().with_raw_attachments(true).with_raw_filter(
            |message: RawMessage, _: Mode, _: &MessageAttributes| {
                assert!(message.data_text().contains("filename=\"a.txt\""));
                let data = message.data_text().replace("aGVsbG8=", "d29ybGQ=");
                message.data(data)
            },
        );
        let messages = renderer.render_raw(&attrs);
        let text = messages[0].data_text();
        assert!(text.contains("Content-Type: multipart/mixed; boundary="));
        assert!(text.contains("d29ybGQ="));
        assert!(!text.contains("aGVsbG8="));
    }

    #[test]
    fn test_unique_ids_differ() {
        let now = SystemClock.now();
        assert_ne!(UniqueId.token(now), UniqueId.token(now));
    }
}
