//! Integration tests for parsing, rendering and dispatch.
//!
//! These tests use a recording transport in place of the HTTP client.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use chrono::DateTime;

use mailpost_api::{Message, RawMessage};
use mailpost_core::{
    Delivery, FailurePolicy, FixedClock, FixedId, MailArgs, Mailer, MessageAttributes,
    MessageRenderer, Mode, ParseOptions, Rendered, SiteEnvironment, Transport,
};

/// Transport that records payloads and fails for chosen recipients.
#[derive(Default)]
struct RecordingTransport {
    messages: Mutex<Vec<Message>>,
    raw: Mutex<Vec<RawMessage>>,
    failing: HashSet<String>,
}

impl RecordingTransport {
    fn failing(recipients: &[&str]) -> Self {
        Self {
            failing: recipients.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    fn raw_recipients(&self) -> Vec<String> {
        self.raw
            .lock()
            .unwrap()
            .iter()
            .flat_map(|m| m.rcpt_to.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    type Receipt = usize;
    type Error = io::Error;

    async fn send_message(&self, message: &Message) -> Result<usize, io::Error> {
        let mut messages = self.messages.lock().unwrap();
        messages.push(message.clone());
        Ok(messages.len())
    }

    async fn send_raw(&self, message: &RawMessage) -> Result<usize, io::Error> {
        let mut raw = self.raw.lock().unwrap();
        raw.push(message.clone());
        if message.rcpt_to.iter().any(|r| self.failing.contains(r)) {
            return Err(io::Error::other(format!("rejected {}", message.rcpt_to[0])));
        }
        Ok(raw.len())
    }
}

fn renderer() -> MessageRenderer {
    let now = DateTime::parse_from_rfc3339("2024-03-05T14:07:09+01:00").unwrap();
    MessageRenderer::new(Arc::new(
        SiteEnvironment::new().with_host("www.example.org"),
    ))
    .with_clock(FixedClock(now))
    .with_message_ids(FixedId("65e7197d0a1b2.12345678".into()))
}

fn mailer(transport: RecordingTransport) -> Mailer<RecordingTransport> {
    Mailer::new(
        transport,
        ParseOptions::new("fallback@x.com", "Fallback"),
        renderer(),
    )
}

fn multipart_args(to: &str) -> MailArgs {
    MailArgs::new()
        .to(to)
        .subject("Hello")
        .message("--B\nContent-Type: text/plain\n\nHi\n--B--")
        .headers(
            "From: Jane <jane@example.com>\n\
             Cc: c@x.com\n\
             Reply-To: r@x.com\n\
             X-Custom: yes\n\
             Content-Type: multipart/alternative; boundary=\"B\"",
        )
}

#[test]
fn test_raw_message_literal_layout() {
    let mailer = mailer(RecordingTransport::default());
    let (attributes, rendered) = mailer.prepare(multipart_args("a@x.com"));

    assert!(attributes.is_multipart());
    let Rendered::Raw(messages) = rendered else {
        panic!("expected raw mode");
    };
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].mail_from, "Jane <jane@example.com>");
    assert_eq!(messages[0].rcpt_to, vec!["a@x.com"]);
    assert_eq!(
        messages[0].data_text(),
        "Date: Tue, 05 Mar 2024 14:07:09 +0100\n\
         From: Jane <jane@example.com>\n\
         To: a@x.com\n\
         Subject: Hello\n\
         Message-ID: <65e7197d0a1b2.12345678@example.com>\n\
         MIME-Version: 1.0\n\
         Cc: c@x.com\n\
         Reply-To: r@x.com\n\
         X-Custom: yes\n\
         Content-Type: multipart/alternative; boundary=\"B\"\r\n\
         \n\
         --B\nContent-Type: text/plain\n\nHi\n--B--"
    );
}

#[test]
fn test_message_id_falls_back_to_site_host() {
    let mailer = Mailer::new(
        RecordingTransport::default(),
        ParseOptions::new("", "WordPress"),
        renderer(),
    );
    let args = MailArgs::new()
        .to("a@x.com")
        .headers("Content-Type: multipart/mixed; boundary=Z");
    let (_, rendered) = mailer.prepare(args);
    let Rendered::Raw(messages) = rendered else {
        panic!("expected raw mode");
    };
    assert!(
        messages[0]
            .data_text()
            .contains("Message-ID: <65e7197d0a1b2.12345678@example.org>\n")
    );
}

#[tokio::test]
async fn test_structured_send() {
    let mailer = mailer(RecordingTransport::default());
    let args = MailArgs::new()
        .to(vec!["a@x.com", "b@y.com"])
        .subject(" Welcome ")
        .message("<p>Hi <b>there</b></p>")
        .headers(vec!["X-Campaign: spring", "Bcc: audit@x.com"]);

    let delivery = mailer.send(args).await.unwrap();
    assert!(matches!(delivery, Delivery::Standard(1)));

    let messages = mailer.transport().messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.to, vec!["a@x.com", "b@y.com"]);
    assert_eq!(message.bcc, vec!["audit@x.com"]);
    assert_eq!(message.from, "Fallback <fallback@x.com>");
    assert_eq!(message.subject, "Welcome");
    assert_eq!(message.html_body.as_deref(), Some("<p>Hi <b>there</b></p>"));
    assert_eq!(message.plain_body.as_deref(), Some("Hi there"));
    assert_eq!(message.headers.len(), 1);
    assert_eq!(message.headers["X-Campaign"], "spring");
    assert!(mailer.transport().raw.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_raw_send_one_per_recipient() {
    let mailer = mailer(RecordingTransport::default());
    let delivery = mailer
        .send(multipart_args("a@x.com, b@y.com, c@z.com"))
        .await
        .unwrap();

    assert!(delivery.is_complete());
    assert_eq!(
        mailer.transport().raw_recipients(),
        vec!["a@x.com", "b@y.com", "c@z.com"]
    );

    let raw = mailer.transport().raw.lock().unwrap();
    let ids: HashSet<_> = raw
        .iter()
        .map(|m| {
            m.data_text()
                .lines()
                .find(|l| l.starts_with("Message-ID:"))
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids.len(), 1);
    assert!(raw[1].data_text().contains("\nTo: b@y.com\n"));
    assert!(mailer.transport().messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_raw_partial_failure_continues() {
    let mailer = mailer(RecordingTransport::failing(&["b@y.com"]));
    let delivery = mailer
        .send(multipart_args("a@x.com, b@y.com, c@z.com"))
        .await
        .unwrap();

    assert!(!delivery.is_complete());
    assert_eq!(delivery.failed_recipients().collect::<Vec<_>>(), vec!["b@y.com"]);
    assert_eq!(
        mailer.transport().raw_recipients(),
        vec!["a@x.com", "b@y.com", "c@z.com"]
    );

    let Delivery::Raw(outcomes) = delivery else {
        panic!("expected raw delivery");
    };
    assert_eq!(outcomes[0].result.as_ref().unwrap(), &1);
    assert!(outcomes[1].result.is_err());
    assert_eq!(outcomes[2].result.as_ref().unwrap(), &3);
}

#[tokio::test]
async fn test_raw_failure_aborts_when_configured() {
    let mailer = mailer(RecordingTransport::failing(&["b@y.com"]))
        .with_failure_policy(FailurePolicy::Abort);
    let err = mailer
        .send(multipart_args("a@x.com, b@y.com, c@z.com"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "rejected b@y.com");
    assert_eq!(
        mailer.transport().raw_recipients(),
        vec!["a@x.com", "b@y.com"]
    );
}

#[tokio::test]
async fn test_raw_attachments_dropped_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();
    let missing = dir.path().join("gone.pdf");

    let args = multipart_args("a@x.com").attachments(vec![path, missing]);

    let plain = mailer(RecordingTransport::default());
    let (attributes, _) = plain.prepare(args.clone());
    assert_eq!(attributes.attachments.len(), 1);
    assert_eq!(attributes.attachments[0].content_type(), "text/csv");

    plain.send(args.clone()).await.unwrap();
    let sent = plain.transport().raw.lock().unwrap()[0].data_text().into_owned();
    assert!(!sent.contains("report.csv"));

    let embedding = mailer(RecordingTransport::default()).with_raw_attachments(true);
    embedding.send(args).await.unwrap();
    let sent = embedding.transport().raw.lock().unwrap()[0]
        .data_text()
        .into_owned();
    assert!(sent.contains("Content-Disposition: attachment; filename=\"report.csv\""));
    assert!(sent.contains("Content-Type: multipart/mixed; boundary="));
}

#[tokio::test]
async fn test_structured_attachments_sent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "remember").unwrap();

    let mailer = mailer(RecordingTransport::default());
    let args = MailArgs::new()
        .to("a@x.com")
        .message("plain body")
        .headers("Content-Type: text/plain; charset=UTF-8")
        .attachments(vec![("Notes.txt".to_string(), path)]);
    mailer.send(args).await.unwrap();

    let messages = mailer.transport().messages.lock().unwrap();
    let message = &messages[0];
    assert!(message.html_body.is_none());
    assert_eq!(message.plain_body.as_deref(), Some("plain body"));
    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].name, "Notes.txt");
    assert_eq!(message.attachments[0].content_type, "text/plain");
    assert_eq!(message.attachments[0].data, b"remember");
}

#[tokio::test]
async fn test_payload_filters_see_mode() {
    let transport = RecordingTransport::default();
    let renderer = renderer()
        .with_standard_filter(|m: Message, mode: Mode, _: &MessageAttributes| m.tag(mode.as_str()))
        .with_raw_filter(|m: RawMessage, mode: Mode, _: &MessageAttributes| {
            let data = format!("X-Render-Mode: {mode}\n{}", m.data_text());
            m.data(data)
        });
    let mailer = Mailer::new(transport, ParseOptions::new("f@x.com", ""), renderer);

    mailer.send(MailArgs::new().to("a@x.com")).await.unwrap();
    mailer.send(multipart_args("b@y.com")).await.unwrap();

    let messages = mailer.transport().messages.lock().unwrap();
    assert_eq!(messages[0].tag.as_deref(), Some("standard"));
    assert_eq!(messages[0].from, "f@x.com");
    let raw = mailer.transport().raw.lock().unwrap();
    assert!(raw[0].data_text().starts_with("X-Render-Mode: raw\nDate: "));
}

#[tokio::test]
async fn test_no_recipients_sends_nothing_raw() {
    let mailer = mailer(RecordingTransport::default());
    let args = MailArgs::new().headers("Content-Type: multipart/mixed");
    let delivery = mailer.send(args).await.unwrap();

    assert!(matches!(&delivery, Delivery::Raw(outcomes) if outcomes.is_empty()));
    assert!(mailer.transport().raw.lock().unwrap().is_empty());
}
