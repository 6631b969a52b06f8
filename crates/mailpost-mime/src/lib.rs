//! # mailpost-mime
//!
//! Text-level helpers for composing outbound email.
//!
//! ## Features
//!
//! - **Header names**: Case-insensitive canonicalization (`content-type` -> `Content-Type`)
//! - **Header maps**: Insertion-ordered [`Headers`] keyed by canonical name
//! - **Content types**: `type/subtype; charset=...; boundary=...` splitting
//! - **Senders**: `Name <address>` splitting and domain extraction
//! - **Plain-text fallback**: HTML tag stripping
//! - **Encoding**: Base64 with MIME line wrapping, boundary and unique-token generation
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpost_mime::{ContentType, Headers, Sender, canonical_name};
//!
//! assert_eq!(canonical_name("x-mailer"), "X-Mailer");
//!
//! let mut headers = Headers::new();
//! headers.set("reply-to", "support@example.com");
//! assert_eq!(headers.get("Reply-To"), Some("support@example.com"));
//!
//! let ct = ContentType::parse("multipart/mixed; boundary=\"XYZ\"");
//! assert_eq!(ct.media_type, "multipart/mixed");
//!
//! let sender = Sender::parse("Jane Doe <jane@example.com>");
//! assert_eq!(sender.name.as_deref(), Some("Jane Doe"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod header;
mod html;

pub mod encoding;
pub mod token;

pub use address::{Sender, extract_domain, strip_www};
pub use content_type::{ContentType, Parameter, parse_boundary_declaration};
pub use error::{Error, Result};
pub use header::{Headers, canonical_name, split_line};
pub use html::strip_tags;
