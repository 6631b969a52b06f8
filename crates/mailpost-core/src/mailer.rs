//! Parsing, rendering and dispatching a send.

use mailpost_api::{Client, Message, RawMessage, SendResult};
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::attributes::{MessageAttributes, ParseOptions};
use crate::input::MailArgs;
use crate::render::{MessageRenderer, Rendered};

/// Something that can deliver rendered payloads.
pub trait Transport: Send + Sync {
    /// Value returned for a delivered payload.
    type Receipt: Send;
    /// Delivery failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Delivers a structured message.
    fn send_message(
        &self,
        message: &Message,
    ) -> impl Future<Output = Result<Self::Receipt, Self::Error>> + Send;

    /// Delivers a raw message.
    fn send_raw(
        &self,
        message: &RawMessage,
    ) -> impl Future<Output = Result<Self::Receipt, Self::Error>> + Send;
}

impl Transport for Client {
    type Receipt = SendResult;
    type Error = mailpost_api::Error;

    async fn send_message(&self, message: &Message) -> Result<SendResult, Self::Error> {
        Self::send_message(self, message).await
    }

    async fn send_raw(&self, message: &RawMessage) -> Result<SendResult, Self::Error> {
        Self::send_raw(self, message).await
    }
}

/// What to do when one recipient of a raw send fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and carry on with the remaining recipients.
    #[default]
    Continue,
    /// Stop and return the failure.
    Abort,
}

/// Result of delivering to one recipient in raw mode.
#[derive(Debug)]
pub struct RecipientOutcome<R, E> {
    /// Envelope recipient.
    pub recipient: String,
    /// Transport result.
    pub result: Result<R, E>,
}

impl<R, E> RecipientOutcome<R, E> {
    /// Returns true if the payload was delivered.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of [`Mailer::send`].
#[derive(Debug)]
pub enum Delivery<R, E> {
    /// The structured message was delivered.
    Standard(R),
    /// Per-recipient outcomes of a raw send, in recipient order.
    Raw(Vec<RecipientOutcome<R, E>>),
}

impl<R, E> Delivery<R, E> {
    /// Returns true if every payload was delivered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Standard(_) => true,
            Self::Raw(outcomes) => outcomes.iter().all(RecipientOutcome::is_ok),
        }
    }

    /// Recipients whose raw delivery failed.
    pub fn failed_recipients(&self) -> impl Iterator<Item = &str> {
        let outcomes = match self {
            Self::Standard(_) => &[][..],
            Self::Raw(outcomes) => outcomes.as_slice(),
        };
        outcomes
            .iter()
            .filter(|outcome| !outcome.is_ok())
            .map(|outcome| outcome.recipient.as_str())
    }
}

/// Sends mail arguments through a transport.
#[derive(Debug)]
pub struct Mailer<T> {
    transport: T,
    options: ParseOptions,
    renderer: MessageRenderer,
    policy: FailurePolicy,
}

impl<T: Transport> Mailer<T> {
    /// Creates a mailer that continues past failed recipients.
    #[must_use]
    pub fn new(transport: T, options: ParseOptions, renderer: MessageRenderer) -> Self {
        Self {
            transport,
            options,
            renderer,
            policy: FailurePolicy::default(),
        }
    }

    /// Sets the raw-mode failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Embeds attachments into raw messages.
    ///
    /// Off by default: raw messages are sent without attachments. See
    /// [`MessageRenderer::with_raw_attachments`].
    #[must_use]
    pub fn with_raw_attachments(mut self, enabled: bool) -> Self {
        self.renderer = self.renderer.with_raw_attachments(enabled);
        self
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Parses and renders `args` without sending.
    #[must_use]
    pub fn prepare(&self, args: MailArgs) -> (MessageAttributes, Rendered) {
        let attributes =
            MessageAttributes::parse(args, &self.options, self.renderer.environment());
        let rendered = self.renderer.render(&attributes);
        (attributes, rendered)
    }

    /// Parses, renders and delivers `args`.
    ///
    /// Raw messages are sent one recipient at a time, in order.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the structured send fails, or if a
    /// raw send fails under [`FailurePolicy::Abort`].
    pub async fn send(
        &self,
        args: MailArgs,
    ) -> Result<Delivery<T::Receipt, T::Error>, T::Error> {
        let (_, rendered) = self.prepare(args);

        match rendered {
            Rendered::Standard(message) => {
                debug!(recipients = message.to.len(), "Sending structured message");
                let receipt = self.transport.send_message(&message).await?;
                info!(recipients = message.to.len(), "Message sent");
                Ok(Delivery::Standard(receipt))
            }
            Rendered::Raw(messages) => {
                let mut outcomes = Vec::with_capacity(messages.len());
                for message in messages {
                    let recipient = message.rcpt_to.join(", ");
                    debug!(%recipient, "Sending raw message");
                    let result = match self.transport.send_raw(&message).await {
                        Err(e) if self.policy == FailurePolicy::Abort => {
                            warn!(%recipient, error = %e, "Raw send failed, aborting");
                            return Err(e);
                        }
                        Err(e) => {
                            warn!(%recipient, error = %e, "Raw send failed, continuing");
                            Err(e)
                        }
                        delivered => delivered,
                    };
                    outcomes.push(RecipientOutcome { recipient, result });
                }

                let delivered = outcomes.iter().filter(|o| o.is_ok()).count();
                info!(delivered, total = outcomes.len(), "Raw messages sent");
                Ok(Delivery::Raw(outcomes))
            }
        }
    }
}
