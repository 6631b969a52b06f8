//! Content-Type header splitting.

use std::fmt::Write as _;

/// A parameter following the media type in a Content-Type value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// `charset=...`, quotes removed.
    Charset(String),
    /// `boundary=...`, quotes removed.
    Boundary(String),
    /// Anything else, trimmed and kept verbatim.
    Other(String),
}

/// A Content-Type value split into its media type and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Media type (e.g. `text/html`, `multipart/mixed`), trimmed.
    pub media_type: String,
    /// Parameters in the order they appeared.
    pub parameters: Vec<Parameter>,
}

impl ContentType {
    /// Splits a Content-Type value on `;`.
    ///
    /// Parameter names are matched case-insensitively. A segment mentioning
    /// `charset=` is a charset even if it also mentions `boundary=`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut segments = value.split(';');
        let media_type = segments.next().unwrap_or_default().trim().to_string();

        let parameters = segments
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if let Some(charset) = value_after(segment, "charset=") {
                    Parameter::Charset(strip_quotes(charset, &['"']))
                } else if let Some(boundary) = value_after(segment, "boundary=") {
                    Parameter::Boundary(strip_quotes(boundary, &['"']))
                } else {
                    Parameter::Other(segment.to_string())
                }
            })
            .collect();

        Self {
            media_type,
            parameters,
        }
    }

    /// Returns true if the media type mentions `multipart` in any case.
    #[must_use]
    pub fn is_multipart(media_type: &str) -> bool {
        contains_ignore_case(media_type, "multipart")
    }

    /// Formats a Content-Type value from its parts.
    ///
    /// Empty `charset` or `boundary` are left out; the boundary is always
    /// quoted.
    #[must_use]
    pub fn format(media_type: &str, charset: &str, boundary: &str) -> String {
        let mut value = media_type.to_string();
        if !charset.is_empty() {
            let _ = write!(value, "; charset={charset}");
        }
        if !boundary.is_empty() {
            let _ = write!(value, "; boundary=\"{boundary}\"");
        }
        value
    }
}

/// Parses a bare `boundary=VALUE` declaration given as its own header line.
///
/// The marker is matched case-insensitively; single and double quotes are
/// removed from the value. Returns `None` when there is no marker or the
/// value is empty.
#[must_use]
pub fn parse_boundary_declaration(line: &str) -> Option<String> {
    let boundary = strip_quotes(value_after(line.trim(), "boundary=")?, &['"', '\'']);
    (!boundary.is_empty()).then_some(boundary)
}

/// Case-insensitive substring test.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Returns the text after the first case-insensitive occurrence of `marker`.
fn value_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets stable.
    let start = text.to_ascii_lowercase().find(marker)?;
    Some(&text[start + marker.len()..])
}

fn strip_quotes(value: &str, quotes: &[char]) -> String {
    value
        .chars()
        .filter(|c| !quotes.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_media_type() {
        let ct = ContentType::parse(" text/plain ");
        assert_eq!(ct.media_type, "text/plain");
        assert!(ct.parameters.is_empty());
    }

    #[test]
    fn test_parse_charset() {
        let ct = ContentType::parse("text/plain; charset=UTF-8");
        assert_eq!(ct.media_type, "text/plain");
        assert_eq!(ct.parameters, vec![Parameter::Charset("UTF-8".into())]);
    }

    #[test]
    fn test_parse_boundary_quoted_any_case() {
        let ct = ContentType::parse("multipart/mixed; BOUNDARY=\"----=_Part_123\"");
        assert_eq!(ct.media_type, "multipart/mixed");
        assert_eq!(
            ct.parameters,
            vec![Parameter::Boundary("----=_Part_123".into())]
        );
    }

    #[test]
    fn test_parse_multiple_parameters() {
        let ct = ContentType::parse("multipart/alternative; charset=utf-8; boundary=b1; format=flowed");
        assert_eq!(
            ct.parameters,
            vec![
                Parameter::Charset("utf-8".into()),
                Parameter::Boundary("b1".into()),
                Parameter::Other("format=flowed".into()),
            ]
        );
    }

    #[test]
    fn test_is_multipart() {
        assert!(ContentType::is_multipart("multipart/mixed"));
        assert!(ContentType::is_multipart("MultiPart/Alternative"));
        assert!(!ContentType::is_multipart("text/html"));
    }

    #[test]
    fn test_format() {
        assert_eq!(ContentType::format("text/html", "", ""), "text/html");
        assert_eq!(
            ContentType::format("text/plain", "UTF-8", ""),
            "text/plain; charset=UTF-8"
        );
        assert_eq!(
            ContentType::format("multipart/mixed", "UTF-8", "XYZ"),
            "multipart/mixed; charset=UTF-8; boundary=\"XYZ\""
        );
    }

    #[test]
    fn test_parse_boundary_declaration() {
        assert_eq!(
            parse_boundary_declaration("boundary=\"abc123\"").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            parse_boundary_declaration("  Boundary='xyz' ").as_deref(),
            Some("xyz")
        );
        assert!(parse_boundary_declaration("no marker here").is_none());
        assert!(parse_boundary_declaration("boundary=\"\"").is_none());
    }
}
