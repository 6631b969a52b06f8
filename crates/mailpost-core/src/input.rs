//! Loosely-typed mail arguments, resolved once into typed sources.
//!
//! Callers hand over recipients, headers and attachments in whichever shape
//! they have them: a delimited string, a list, or a keyed map. Each input
//! enum converts into one typed source, so the normalizer only ever sees a
//! single representation per field.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Normalizes `\r\n` to `\n` and splits on `\n`.
fn split_lines(block: &str) -> Vec<String> {
    block
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Splits on commas, trims, and drops empty entries.
pub(crate) fn split_addresses(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recipient list input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// Comma-separated addresses.
    Delimited(String),
    /// One address per element.
    List(Vec<String>),
}

impl Recipients {
    /// Resolves the input into trimmed addresses, keeping order and duplicates.
    #[must_use]
    pub fn into_addresses(self) -> Vec<String> {
        match self {
            Self::Delimited(list) => split_addresses(&list),
            Self::List(list) => list
                .iter()
                .map(|address| address.trim())
                .filter(|address| !address.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<&str> for Recipients {
    fn from(list: &str) -> Self {
        Self::Delimited(list.to_string())
    }
}

impl From<String> for Recipients {
    fn from(list: String) -> Self {
        Self::Delimited(list)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(list: Vec<&str>) -> Self {
        Self::List(list.into_iter().map(str::to_string).collect())
    }
}

/// Header input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HeaderRepr")]
pub enum HeaderInput {
    /// Newline-separated `Name: value` lines.
    Block(String),
    /// One `Name: value` line per element.
    Lines(Vec<String>),
    /// Name to value pairs.
    Map(Vec<(String, String)>),
}

/// Header input resolved into one of the two shapes the normalizer handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSource {
    /// Raw header lines, possibly including bare `boundary=` declarations.
    Lines(Vec<String>),
    /// Already-keyed name/value pairs.
    Keyed(Vec<(String, String)>),
}

impl HeaderInput {
    /// Resolves the input into lines or keyed pairs.
    #[must_use]
    pub fn into_source(self) -> HeaderSource {
        match self {
            Self::Block(block) => HeaderSource::Lines(split_lines(&block)),
            Self::Lines(lines) => HeaderSource::Lines(lines),
            Self::Map(pairs) => HeaderSource::Keyed(pairs),
        }
    }

    /// Returns true if there is nothing to parse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Block(block) => block.is_empty(),
            Self::Lines(lines) => lines.is_empty(),
            Self::Map(pairs) => pairs.is_empty(),
        }
    }
}

impl From<&str> for HeaderInput {
    fn from(block: &str) -> Self {
        Self::Block(block.to_string())
    }
}

impl From<String> for HeaderInput {
    fn from(block: String) -> Self {
        Self::Block(block)
    }
}

impl From<Vec<String>> for HeaderInput {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl From<Vec<&str>> for HeaderInput {
    fn from(lines: Vec<&str>) -> Self {
        Self::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<(&str, &str)>> for HeaderInput {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderRepr {
    Block(String),
    Lines(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl From<HeaderRepr> for HeaderInput {
    fn from(repr: HeaderRepr) -> Self {
        match repr {
            HeaderRepr::Block(block) => Self::Block(block),
            HeaderRepr::Lines(lines) => Self::Lines(lines),
            HeaderRepr::Map(map) => Self::Map(map.into_iter().collect()),
        }
    }
}

/// Attachment input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "AttachmentRepr")]
pub enum AttachmentInput {
    /// Newline-separated file paths.
    Block(String),
    /// One file path per element.
    Paths(Vec<PathBuf>),
    /// Desired file name to file path.
    Named(Vec<(String, PathBuf)>),
}

/// One attachment to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentEntry {
    /// File name to present, if the caller chose one.
    pub name: Option<String>,
    /// File to read.
    pub path: PathBuf,
}

impl AttachmentInput {
    /// Resolves the input into entries, in input order.
    #[must_use]
    pub fn into_entries(self) -> Vec<AttachmentEntry> {
        match self {
            Self::Block(block) => split_lines(&block)
                .into_iter()
                .map(|line| AttachmentEntry {
                    name: None,
                    path: PathBuf::from(line.trim()),
                })
                .collect(),
            Self::Paths(paths) => paths
                .into_iter()
                .map(|path| AttachmentEntry { name: None, path })
                .collect(),
            Self::Named(pairs) => pairs
                .into_iter()
                .map(|(name, path)| AttachmentEntry {
                    name: Some(name),
                    path,
                })
                .collect(),
        }
    }

    /// Returns true if there is nothing to load.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Block(block) => block.is_empty(),
            Self::Paths(paths) => paths.is_empty(),
            Self::Named(pairs) => pairs.is_empty(),
        }
    }
}

impl From<&str> for AttachmentInput {
    fn from(block: &str) -> Self {
        Self::Block(block.to_string())
    }
}

impl From<Vec<PathBuf>> for AttachmentInput {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::Paths(paths)
    }
}

impl From<Vec<(String, PathBuf)>> for AttachmentInput {
    fn from(pairs: Vec<(String, PathBuf)>) -> Self {
        Self::Named(pairs)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttachmentRepr {
    Block(String),
    Paths(Vec<PathBuf>),
    Named(BTreeMap<String, PathBuf>),
}

impl From<AttachmentRepr> for AttachmentInput {
    fn from(repr: AttachmentRepr) -> Self {
        match repr {
            AttachmentRepr::Block(block) => Self::Block(block),
            AttachmentRepr::Paths(paths) => Self::Paths(paths),
            AttachmentRepr::Named(map) => Self::Named(map.into_iter().collect()),
        }
    }
}

/// The arguments of one send call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailArgs {
    /// Recipients.
    pub to: Option<Recipients>,
    /// Subject line.
    pub subject: Option<String>,
    /// Message body.
    pub message: Option<String>,
    /// Additional headers.
    pub headers: Option<HeaderInput>,
    /// Files to attach.
    pub attachments: Option<AttachmentInput>,
}

impl MailArgs {
    /// Creates empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recipients.
    #[must_use]
    pub fn to(mut self, to: impl Into<Recipients>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: impl Into<HeaderInput>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Sets the attachments.
    #[must_use]
    pub fn attachments(mut self, attachments: impl Into<AttachmentInput>) -> Self {
        self.attachments = Some(attachments.into());
        self
    }
}
