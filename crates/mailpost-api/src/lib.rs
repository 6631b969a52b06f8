//! # mailpost-api
//!
//! Client for the Postal transactional mail HTTP API.
//!
//! ## Features
//!
//! - **Structured sends**: [`Message`] with recipients, bodies, headers and attachments
//! - **Raw sends**: [`RawMessage`] carrying a pre-formatted RFC 822 message and its envelope
//! - **Result decoding**: per-recipient message ids and tokens, API errors as [`Error::Api`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpost_api::{Client, Message, RawMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("postal.example.com", "api-key")?;
//!
//!     let message = Message::new()
//!         .to("alice@example.com")
//!         .from("Shop <shop@example.com>")
//!         .subject("Your order")
//!         .plain_body("Thanks!");
//!     let result = client.send_message(&message).await?;
//!     println!("Queued as {}", result.message_id);
//!
//!     let raw = RawMessage::new()
//!         .mail_from("shop@example.com")
//!         .rcpt_to("alice@example.com")
//!         .data("Subject: Hi\r\n\r\nHello");
//!     client.send_raw(&raw).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod message;
mod response;

pub use client::{API_KEY_HEADER, Client, DEFAULT_TIMEOUT, ensure_prefix};
pub use error::{Error, Result};
pub use message::{AttachmentPayload, Message, RawMessage};
pub use response::{ApiResponse, MessageRef, SendResult};
