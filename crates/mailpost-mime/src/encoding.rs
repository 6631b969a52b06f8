//! Base64 encoding for message bodies and attachments.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Maximum encoded line length for MIME bodies (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 split into `\r\n`-terminated lines of at most
/// `width` characters.
///
/// # Errors
///
/// Returns an error if `width` is zero.
pub fn encode_base64_wrapped(data: &[u8], width: usize) -> Result<String> {
    if width == 0 {
        return Err(Error::InvalidLineWidth(width));
    }

    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / width * 2 + 2);
    // Base64 output is ASCII, so byte chunks are valid UTF-8.
    for line in encoded.as_bytes().chunks(width) {
        result.push_str(&String::from_utf8_lossy(line));
        result.push_str("\r\n");
    }
    Ok(result)
}
