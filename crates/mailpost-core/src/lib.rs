//! # mailpost-core
//!
//! Normalizes loosely-structured mail arguments and renders them for the
//! Postal transactional API.
//!
//! This crate provides:
//! - Argument shapes for recipients, headers and attachments
//! - `MessageAttributes`, the normalized message model
//! - `MessageRenderer`, choosing structured or raw per-recipient payloads
//! - `Mailer`, dispatching payloads through a `Transport`
//! - TOML settings for the API client and sender defaults
//!
//! ## Example
//!
//! ```ignore
//! use mailpost_core::{MailArgs, Mailer, MessageRenderer, Settings};
//! use std::sync::Arc;
//!
//! let settings = Settings::load("config.toml".as_ref())?;
//! let renderer = MessageRenderer::new(Arc::new(settings.environment()?));
//! let mailer = Mailer::new(settings.client()?, settings.parse_options(), renderer);
//!
//! let args = MailArgs::new()
//!     .to("a@example.com, b@example.com")
//!     .subject("Welcome")
//!     .message("<p>Hello</p>");
//! mailer.send(args).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod attributes;
pub mod environment;
mod error;
pub mod input;
pub mod mailer;
pub mod render;
pub mod settings;

pub use attachment::Attachment;
pub use attributes::{MessageAttributes, ParseOptions};
pub use environment::{Environment, Filter, SiteEnvironment};
pub use error::{Error, Result};
pub use input::{AttachmentInput, HeaderInput, MailArgs, Recipients};
pub use mailer::{Delivery, FailurePolicy, Mailer, RecipientOutcome, Transport};
pub use render::{
    Clock, FixedClock, FixedId, MessageIdSource, MessageRenderer, Mode, PayloadFilter, Rendered,
    SystemClock, UniqueId, inject_attachments,
};
pub use settings::Settings;
