//! Host capabilities consulted while parsing and rendering.

use std::fmt;
use url::Url;

use crate::error::Result;

/// Values the host may rewrite while attributes are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// The media type, e.g. `text/html`.
    ContentType,
    /// The charset parameter.
    Charset,
    /// The resolved sender name.
    FromName,
    /// The resolved sender address.
    FromAddress,
}

impl Filter {
    /// Stable name of the filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContentType => "content_type",
            Self::Charset => "charset",
            Self::FromName => "from_name",
            Self::FromAddress => "from_address",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host site the mail is sent on behalf of.
pub trait Environment: Send + Sync {
    /// Host name of the site's base URL, e.g. `www.example.org`.
    fn base_host(&self) -> Option<String>;

    /// Lets the host rewrite a value. The default keeps it unchanged.
    fn apply_filter(&self, filter: Filter, value: String) -> String {
        let _ = filter;
        value
    }
}

type FilterFn = Box<dyn Fn(String) -> String + Send + Sync>;

/// Environment backed by a configured site URL and registered filters.
#[derive(Default)]
pub struct SiteEnvironment {
    host: Option<String>,
    filters: Vec<(Filter, FilterFn)>,
}

impl SiteEnvironment {
    /// Creates an environment without a site URL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment from the site's base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn from_site_url(site_url: &str) -> Result<Self> {
        let url = Url::parse(site_url)?;
        Ok(Self {
            host: url.host_str().map(str::to_string),
            filters: Vec::new(),
        })
    }

    /// Sets the site host directly.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Registers a filter. Filters for the same value run in registration order.
    #[must_use]
    pub fn with_filter(
        mut self,
        filter: Filter,
        apply: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.filters.push((filter, Box::new(apply)));
        self
    }
}

impl Environment for SiteEnvironment {
    fn base_host(&self) -> Option<String> {
        self.host.clone()
    }

    fn apply_filter(&self, filter: Filter, value: String) -> String {
        self.filters
            .iter()
            .filter(|(f, _)| *f == filter)
            .fold(value, |value, (_, apply)| apply(value))
    }
}

impl fmt::Debug for SiteEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteEnvironment")
            .field("host", &self.host)
            .field(
                "filters",
                &self.filters.iter().map(|(f, _)| *f).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_site_url() {
        let env = SiteEnvironment::from_site_url("https://www.example.org/blog/").unwrap();
        assert_eq!(env.base_host().as_deref(), Some("www.example.org"));
    }

    #[test]
    fn test_from_site_url_invalid() {
        assert!(SiteEnvironment::from_site_url("not a url").is_err());
    }

    #[test]
    fn test_filters_chain_in_order() {
        let env = SiteEnvironment::new()
            .with_filter(Filter::FromName, |name| format!("{name} Team"))
            .with_filter(Filter::FromName, |name| name.to_uppercase())
            .with_filter(Filter::Charset, |_| "UTF-8".into());

        assert_eq!(env.apply_filter(Filter::FromName, "Shop".into()), "SHOP TEAM");
        assert_eq!(env.apply_filter(Filter::Charset, String::new()), "UTF-8");
        assert_eq!(env.apply_filter(Filter::ContentType, "text/html".into()), "text/html");
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(Filter::FromAddress.to_string(), "from_address");
        assert_eq!(Filter::ContentType.as_str(), "content_type");
    }
}
