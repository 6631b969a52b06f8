//! Mailer settings loaded from TOML.

use mailpost_api::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::attributes::ParseOptions;
use crate::environment::SiteEnvironment;
use crate::error::{Error, Result};
use crate::mailer::FailurePolicy;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection details and sender defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Postal host, with or without `https://`.
    pub host: String,
    /// Server API key.
    pub api_key: String,
    /// Default sender address.
    pub from_address: String,
    /// Default sender name.
    pub from_name: String,
    /// Base URL of the site mail is sent for.
    pub site_url: String,
    /// What to do when one raw recipient fails.
    pub failure_policy: FailurePolicy,
    /// Pull special headers out of keyed header maps as well.
    pub header_map_extraction: bool,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: String::new(),
            from_address: String::new(),
            from_name: String::new(),
            site_url: String::new(),
            failure_policy: FailurePolicy::default(),
            header_map_extraction: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid settings TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks that the settings can reach the API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host or API key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host is not set".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api_key is not set".to_string()));
        }
        Ok(())
    }

    /// Sender defaults and parsing switches.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new(self.from_address.trim(), self.from_name.trim())
            .with_keyed_header_extraction(self.header_map_extraction)
    }

    /// Environment for the configured site.
    ///
    /// # Errors
    ///
    /// Returns an error if `site_url` is set but is not a valid URL.
    pub fn environment(&self) -> Result<SiteEnvironment> {
        let site_url = self.site_url.trim();
        if site_url.is_empty() {
            return Ok(SiteEnvironment::new());
        }
        SiteEnvironment::from_site_url(site_url)
    }

    /// Builds an API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the client cannot be
    /// built.
    pub fn client(&self) -> Result<Client> {
        self.validate()?;
        let client = Client::with_timeout(
            self.host.trim(),
            self.api_key.trim(),
            Duration::from_secs(self.timeout_secs),
        )?;
        Ok(client)
    }
}
