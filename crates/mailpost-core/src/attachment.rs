//! Attachments loaded for an outgoing message.

use std::io;
use std::path::Path;

/// Content type used when the file's type cannot be determined.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content_type: String,
    data: Vec<u8>,
    original_path: Option<String>,
}

impl Attachment {
    /// Creates an attachment from in-memory data.
    ///
    /// The file name and content type are trimmed.
    #[must_use]
    pub fn new(filename: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            filename: filename.trim().to_string(),
            content_type: content_type.trim().to_string(),
            data,
            original_path: None,
        }
    }

    /// Reads an attachment from disk.
    ///
    /// `name` overrides the file name presented to recipients; otherwise the
    /// path's base name is used. The content type is sniffed from the file's
    /// leading bytes, then guessed from the extension, and falls back to
    /// [`DEFAULT_CONTENT_TYPE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path, name: Option<&str>) -> io::Result<Self> {
        let data = std::fs::read(path)?;

        let filename = name.map_or_else(
            || {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            },
            str::to_string,
        );

        let content_type = infer::get(&data)
            .map(|kind| kind.mime_type())
            .or_else(|| mime_guess::from_path(path).first_raw())
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut attachment = Self::new(&filename, content_type, data);
        attachment.original_path = Some(path.to_string_lossy().trim().to_string());
        Ok(attachment)
    }

    /// File name presented to recipients.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Path the attachment was read from, if it came from disk.
    #[must_use]
    pub fn original_path(&self) -> Option<&str> {
        self.original_path.as_deref()
    }
}
