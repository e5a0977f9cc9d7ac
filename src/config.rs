//! TOML configuration.
//!
//! Every section has defaults, so running without a config file scrapes the
//! Math AI SL IA and EE listings and stores into `data/ib_samples.sqlite`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::ListingSource;
use crate::error::{Error, Result};
use crate::export::DEFAULT_OUTPUT;
use crate::fetch::{BROWSER_USER_AGENT, DEFAULT_TIMEOUT};
use crate::profile::SiteProfile;
use crate::url_utils::is_http_url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub site: SiteProfile,

    #[serde(default)]
    pub db: DbConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Where the JSON export is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_listings")]
    pub listings: Vec<ListingSource>,
}

impl ScrapeConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            listings: default_listings(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_listings() -> Vec<ListingSource> {
    vec![
        ListingSource::new("https://nailib.com/ia-sample/ib-math-ai-sl"),
        ListingSource::new("https://nailib.com/ee-sample/ib-math-ai-sl"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/ib_samples.sqlite")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl ServerConfig {
    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `bind` is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| Error::Config(format!("server.bind {:?}: {e}", self.bind)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl Config {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on syntax errors or inconsistent values.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or use defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        self.site.validate()?;

        if self.scrape.timeout_secs == 0 {
            return Err(Error::Config("scrape.timeout_secs must be > 0".into()));
        }
        for listing in &self.scrape.listings {
            if !is_http_url(&listing.url) {
                return Err(Error::Config(format!(
                    "scrape.listings url must be http(s): {:?}",
                    listing.url
                )));
            }
        }
        self.server.bind_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.scrape.listings.len(), 2);
        assert_eq!(config.scrape.output_path, PathBuf::from("all_math_ia_data.json"));
        assert_eq!(config.scrape.timeout(), Duration::from_secs(30));
        assert_eq!(config.site, SiteProfile::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [scrape]
            timeout_secs = 5

            [[scrape.listings]]
            url = "https://nailib.com/ia-sample/ib-physics-hl"
            subject = "Physics HL"

            [site]
            default_subject = "Physics HL"

            [server]
            bind = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.scrape.timeout_secs, 5);
        assert_eq!(
            config.scrape.listings,
            vec![ListingSource::new("https://nailib.com/ia-sample/ib-physics-hl")
                .with_subject("Physics HL")]
        );
        assert_eq!(config.site.default_subject, "Physics HL");
        assert_eq!(config.site.card_class, SiteProfile::default().card_class);
        assert_eq!(config.db.path, PathBuf::from("data/ib_samples.sqlite"));
        assert_eq!(config.server.bind_addr().unwrap().port(), 9000);
    }

    #[test]
    fn rejects_non_http_listing() {
        let err = Config::from_toml(
            r#"
            [[scrape.listings]]
            url = "ftp://example.com/listing"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let err = Config::from_toml(
            r#"
            [site]
            sample_url_template = "https://nailib.com/fixed"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_bad_bind() {
        let err = Config::from_toml("[server]\nbind = \"nowhere\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
