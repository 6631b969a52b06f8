//! Normalization of mail arguments into a canonical message.
//!
//! Parsing never fails. Missing or malformed pieces fall back to defaults or
//! empty collections: unreadable attachments are skipped, header lines
//! without a `:` are dropped unless they declare a boundary, and an absent
//! sender falls back to the configured identity.

use mailpost_mime::{
    ContentType, Headers, Parameter, Sender, extract_domain, parse_boundary_declaration,
    split_line, strip_www,
};
use tracing::debug;

use crate::attachment::Attachment;
use crate::environment::{Environment, Filter};
use crate::input::{
    AttachmentInput, HeaderInput, HeaderSource, MailArgs, Recipients, split_addresses,
};

/// Media type used when none is given.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Domain used in Message-IDs when neither the sender nor the site has one.
pub const FALLBACK_DOMAIN: &str = "localhost";

/// Sender defaults and parsing switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Sender address used when the headers do not name one.
    pub from_address: String,
    /// Sender name used when the headers do not name one.
    pub from_name: String,
    /// Also pull From/Cc/Bcc/Reply-To/Content-Type out of keyed header maps.
    ///
    /// Off by default: keyed maps are stored as generic headers verbatim.
    pub extract_keyed_headers: bool,
}

impl ParseOptions {
    /// Creates options with the given sender defaults.
    #[must_use]
    pub fn new(from_address: impl Into<String>, from_name: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            from_name: from_name.into(),
            extract_keyed_headers: false,
        }
    }

    /// Enables special-header extraction for keyed header maps.
    #[must_use]
    pub const fn with_keyed_header_extraction(mut self, enabled: bool) -> Self {
        self.extract_keyed_headers = enabled;
        self
    }
}

/// A fully normalized outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttributes {
    /// Recipients, trimmed, in input order.
    pub to: Vec<String>,
    /// Sender display form: `Name <address>` or the bare address.
    pub from: String,
    /// Resolved sender name.
    pub from_name: String,
    /// Resolved sender address.
    pub from_address: String,
    /// CC recipients from the headers.
    pub cc: Vec<String>,
    /// BCC recipients from the headers.
    pub bcc: Vec<String>,
    /// Reply-To address, or empty.
    pub reply_to: String,
    /// Subject, trimmed.
    pub subject: String,
    /// Body, trimmed.
    pub message: String,
    /// Remaining generic headers.
    pub headers: Headers,
    /// Attachments, in input order.
    pub attachments: Vec<Attachment>,
    /// Multipart boundary, or empty.
    pub boundary: String,
    /// Media type.
    pub content_type: String,
    /// Charset, or empty.
    pub charset: String,
}

impl Default for MessageAttributes {
    fn default() -> Self {
        Self {
            to: Vec::new(),
            from: String::new(),
            from_name: String::new(),
            from_address: String::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: String::new(),
            subject: String::new(),
            message: String::new(),
            headers: Headers::new(),
            attachments: Vec::new(),
            boundary: String::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            charset: String::new(),
        }
    }
}

impl MessageAttributes {
    /// Normalizes `args` using the sender defaults in `options`.
    ///
    /// The content type, charset, sender name and sender address pass through
    /// the environment's filters once they are resolved.
    #[must_use]
    pub fn parse(args: MailArgs, options: &ParseOptions, env: &dyn Environment) -> Self {
        let mut attrs = Self {
            to: args.to.map(Recipients::into_addresses).unwrap_or_default(),
            subject: args.subject.as_deref().map(str::trim).unwrap_or_default().to_string(),
            message: args.message.as_deref().map(str::trim).unwrap_or_default().to_string(),
            attachments: load_attachments(args.attachments),
            ..Self::default()
        };

        attrs.process_headers(args.headers, options.extract_keyed_headers);
        attrs.resolve_sender(options, env);

        attrs.content_type = env.apply_filter(Filter::ContentType, attrs.content_type);
        attrs.charset = env.apply_filter(Filter::Charset, attrs.charset);

        debug!(
            recipients = attrs.to.len(),
            attachments = attrs.attachments.len(),
            content_type = %attrs.content_type,
            "Normalized message attributes"
        );
        attrs
    }

    /// Returns true if the media type mentions `multipart`.
    ///
    /// Multipart messages are sent raw, one copy per recipient.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        ContentType::is_multipart(&self.content_type)
    }

    /// Returns true if the media type mentions `plain`.
    #[must_use]
    pub fn is_plain_text(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("plain")
    }

    /// Returns true if the media type mentions `html`.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("html")
    }

    /// Domain for generated Message-IDs.
    ///
    /// Taken from the first email-like part of `from`; otherwise the site's
    /// host without a leading `www.`; otherwise [`FALLBACK_DOMAIN`].
    #[must_use]
    pub fn domain(&self, env: &dyn Environment) -> String {
        extract_domain(&self.from)
            .or_else(|| {
                env.base_host()
                    .map(|host| strip_www(&host).to_string())
                    .filter(|host| !host.is_empty())
            })
            .unwrap_or_else(|| FALLBACK_DOMAIN.to_string())
    }

    /// Full Content-Type value: media type plus charset and boundary, if set.
    #[must_use]
    pub fn content_type_header(&self) -> String {
        ContentType::format(&self.content_type, &self.charset, &self.boundary)
    }

    fn process_headers(&mut self, input: Option<HeaderInput>, extract_keyed: bool) {
        let Some(input) = input.filter(|input| !input.is_empty()) else {
            return;
        };

        let mut headers = Headers::new();
        let extract = match input.into_source() {
            HeaderSource::Keyed(pairs) => {
                for (name, value) in pairs {
                    headers.set(name, value.trim());
                }
                extract_keyed
            }
            HeaderSource::Lines(lines) => {
                for line in lines {
                    if !line.contains(':') {
                        if let Some(boundary) = parse_boundary_declaration(&line) {
                            debug!(%boundary, "Found boundary declaration");
                            self.boundary = boundary;
                        }
                        continue;
                    }
                    if let Some((name, value)) = split_line(&line) {
                        if name.is_empty() {
                            debug!(%line, "Dropping header line without a name");
                            continue;
                        }
                        headers.set(name, value);
                    }
                }
                true
            }
        };

        if extract {
            headers.retain(|name, value| !self.consume_special_header(name, value));
        }
        self.headers = headers;
    }

    /// Applies a header that maps onto a dedicated field.
    ///
    /// Returns true if the header was consumed.
    fn consume_special_header(&mut self, name: &str, value: &str) -> bool {
        match name {
            "From" => self.from = value.to_string(),
            "Cc" => self.cc = split_addresses(value),
            "Bcc" => self.bcc = split_addresses(value),
            "Reply-To" => self.reply_to = value.trim().to_string(),
            "Content-Type" => self.apply_content_type(value),
            _ => return false,
        }
        true
    }

    fn apply_content_type(&mut self, value: &str) {
        if value.is_empty() && self.content_type.is_empty() {
            self.content_type = DEFAULT_CONTENT_TYPE.to_string();
            return;
        }

        let parsed = ContentType::parse(value);
        self.content_type = parsed.media_type;
        // Parameters after a boundary are ignored, so at most one of charset
        // and boundary is kept.
        for parameter in parsed.parameters {
            match parameter {
                Parameter::Charset(charset) => self.charset = charset,
                Parameter::Boundary(boundary) => {
                    self.boundary = boundary;
                    self.charset.clear();
                    break;
                }
                Parameter::Other(_) => {}
            }
        }
    }

    fn resolve_sender(&mut self, options: &ParseOptions, env: &dyn Environment) {
        let sender = Sender::parse(&self.from);

        let name = sender.name.unwrap_or_else(|| options.from_name.clone());
        let address = sender
            .address
            .unwrap_or_else(|| options.from_address.clone());

        self.from_name = env.apply_filter(Filter::FromName, name);
        self.from_address = env.apply_filter(Filter::FromAddress, address);
        self.from = Sender::display(&self.from_name, &self.from_address);
    }
}

fn load_attachments(input: Option<AttachmentInput>) -> Vec<Attachment> {
    let Some(input) = input.filter(|input| !input.is_empty()) else {
        return Vec::new();
    };

    input
        .into_entries()
        .into_iter()
        .filter_map(|entry| {
            if entry.path.as_os_str().is_empty() || !entry.path.exists() {
                debug!(path = %entry.path.display(), "Skipping missing attachment");
                return None;
            }
            match Attachment::from_path(&entry.path, entry.name.as_deref()) {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    debug!(path = %entry.path.display(), error = %e, "Skipping unreadable attachment");
                    None
                }
            }
        })
        .collect()
}
