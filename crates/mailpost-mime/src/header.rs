//! Header name canonicalization and the ordered header map.

use std::fmt;

/// Canonicalizes a header name to Title-Case-with-hyphens.
///
/// The name is trimmed and lowercased, then the first character of every
/// hyphen-separated word is uppercased, so `CONTENT-TYPE`, `content-type`
/// and ` Content-Type ` all become `Content-Type`.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Splits a `Name: value` header line on its first `:`.
///
/// Returns the canonical name and the trimmed value, or `None` when the line
/// has no `:` delimiter.
#[must_use]
pub fn split_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.trim().split_once(':')?;
    Some((canonical_name(name), value.trim().to_string()))
}

/// Header map keyed by canonical name.
///
/// Setting an existing name replaces its value in place, so the first
/// insertion position of a name is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets a header value, replacing any existing value for that name.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = canonical_name(name.as_ref());
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Gets the value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = canonical_name(name);
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = canonical_name(name);
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Keeps only the headers for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.entries.retain(|(n, v)| keep(n, v));
    }

    /// Returns true if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of headers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

/// One `Name: value` line per header, each terminated by `\n`.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("content-type"), "Content-Type");
        assert_eq!(canonical_name("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_name("  Reply-To "), "Reply-To");
        assert_eq!(canonical_name("x-wp-origin"), "X-Wp-Origin");
        assert_eq!(canonical_name("MIME-Version"), "Mime-Version");
    }

    #[test]
    fn test_split_line() {
        let (name, value) = split_line("content-type:  text/plain ").unwrap();
        assert_eq!(name, "Content-Type");
        assert_eq!(value, "text/plain");

        // Only the first colon splits.
        let (name, value) = split_line("X-Link: https://example.com/a").unwrap();
        assert_eq!(name, "X-Link");
        assert_eq!(value, "https://example.com/a");

        assert!(split_line("boundary=abc").is_none());
    }

    #[test]
    fn test_headers_set_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("x-priority", "1");
        assert_eq!(headers.get("X-Priority"), Some("1"));
        assert_eq!(headers.get("X-PRIORITY"), Some("1"));
    }

    #[test]
    fn test_headers_set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.set("A", "1");
        headers.set("B", "2");
        headers.set("a", "3");
        let all: Vec<_> = headers.iter().collect();
        assert_eq!(all, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.set("Subject", "Test");
        assert_eq!(headers.remove("subject").as_deref(), Some("Test"));
        assert!(headers.is_empty());
        assert!(headers.remove("subject").is_none());
    }

    #[test]
    fn test_headers_display() {
        let headers: Headers = [("x-one", "1"), ("x-two", "2")].into_iter().collect();
        assert_eq!(headers.to_string(), "X-One: 1\nX-Two: 2\n");
    }

    proptest! {
        #[test]
        fn test_canonical_name_idempotent(name in "[a-zA-Z]{1,8}(-[a-zA-Z]{1,8}){0,3}") {
            let once = canonical_name(&name);
            prop_assert_eq!(canonical_name(&once), once.clone());
            prop_assert_eq!(canonical_name(&name.to_uppercase()), once.clone());
            prop_assert_eq!(canonical_name(&name.to_lowercase()), once);
        }
    }
}
