//! Sender identity splitting and domain extraction.

use regex::Regex;
use std::sync::LazyLock;

/// Either a bracketed address or a bare `local@domain.tld`.
#[allow(clippy::expect_used)]
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(.+?)>|([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})")
        .expect("address pattern is valid")
});

/// Name and address candidates split out of a `Name <address>` string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    /// Display name, if a non-empty one preceded the `<`.
    pub name: Option<String>,
    /// Address, if a non-empty one followed the `<`.
    pub address: Option<String>,
}

impl Sender {
    /// Splits `raw` on its first `<`.
    ///
    /// The left side (trimmed) is the name candidate. The right side, with
    /// whitespace and `>` trimmed from both ends, is the address candidate.
    /// Strings without `<` yield no candidates at all.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let Some((name, address)) = raw.split_once('<') else {
            return Self::default();
        };

        let name = name.trim();
        let address = address.trim_matches(|c: char| c.is_whitespace() || c == '>' || c == '\0');

        Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            address: (!address.is_empty()).then(|| address.to_string()),
        }
    }

    /// Formats `Name <address>`, or the bare address when the name is empty.
    #[must_use]
    pub fn display(name: &str, address: &str) -> String {
        if name.is_empty() {
            address.to_string()
        } else {
            format!("{name} <{address}>")
        }
    }
}

/// Extracts the domain of the first email-like substring of `from`.
///
/// A bracketed `<...>` form is preferred when it comes first; otherwise a bare
/// address is matched. The domain is whatever follows the last `@`. Returns
/// `None` when nothing email-like with an `@` is found.
#[must_use]
pub fn extract_domain(from: &str) -> Option<String> {
    let captures = ADDRESS_PATTERN.captures(from)?;
    let email = captures.get(1).or_else(|| captures.get(2))?.as_str();
    let (_, domain) = email.rsplit_once('@')?;
    let domain = domain.trim();
    (!domain.is_empty()).then(|| domain.to_string())
}

/// Strips one leading `www.` label from a host name.
#[must_use]
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
