//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;
use crate::utils::host_matches;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Fetching behavior for the listing and maker websites
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Listing and detail page selectors
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Email sending behavior
    #[serde(default)]
    pub emailer: EmailerConfig,

    /// Rules for rejecting placeholder addresses
    #[serde(default)]
    pub email_policy: EmailPolicy,

    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.website_timeout_secs == 0 {
            return Err(AppError::validation(
                "scraper.website_timeout_secs must be > 0",
            ));
        }
        url::Url::parse(&self.scraper.listing_url)?;
        url::Url::parse(&self.emailer.api_base_url)?;
        if self.emailer.template_path.as_os_str().is_empty() {
            return Err(AppError::validation("emailer.template_path is empty"));
        }
        if self.emailer.platform_label.trim().is_empty() {
            return Err(AppError::validation("emailer.platform_label is empty"));
        }
        self.selectors.compile()?;
        Ok(())
    }
}

/// HTTP and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Listing page enumerating today's launches
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds for listing and detail pages
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Timeout for a maker's website landing page
    #[serde(default = "defaults::website_timeout")]
    pub website_timeout_secs: u64,

    /// Timeout for each contact-page fallback
    #[serde(default = "defaults::contact_page_timeout")]
    pub contact_page_timeout_secs: u64,

    /// Paths tried on the website when the landing page has no email
    #[serde(default = "defaults::contact_paths")]
    pub contact_paths: Vec<String>,

    /// Maximum number of links kept in `other_social`
    #[serde(default = "defaults::max_other_social")]
    pub max_other_social: usize,

    /// Handles that belong to the listing platform itself
    #[serde(default = "defaults::ignored_social_handles")]
    pub ignored_social_handles: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::listing_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            website_timeout_secs: defaults::website_timeout(),
            contact_page_timeout_secs: defaults::contact_page_timeout(),
            contact_paths: defaults::contact_paths(),
            max_other_social: defaults::max_other_social(),
            ignored_social_handles: defaults::ignored_social_handles(),
        }
    }
}

/// How the send limit is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LimitMode {
    /// Every transport call counts, successful or not
    #[default]
    Attempts,
    /// Only successful sends count
    Successes,
}

/// Email sending settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailerConfig {
    /// Fixed pause between two sends
    #[serde(default = "defaults::send_delay")]
    pub send_delay_secs: u64,

    /// Value substituted for `{{LaunchPlatform}}`
    #[serde(default = "defaults::platform_label")]
    pub platform_label: String,

    /// Template file: first line subject, rest body
    #[serde(default = "defaults::template_path")]
    pub template_path: PathBuf,

    #[serde(default)]
    pub limit_mode: LimitMode,

    /// Base URL of the transport API
    #[serde(default = "defaults::api_base_url")]
    pub api_base_url: String,

    /// Timeout for a single transport call
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for EmailerConfig {
    fn default() -> Self {
        Self {
            send_delay_secs: defaults::send_delay(),
            platform_label: defaults::platform_label(),
            template_path: defaults::template_path(),
            limit_mode: LimitMode::default(),
            api_base_url: defaults::api_base_url(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Deny-list for placeholder and non-actionable addresses.
///
/// An address is rejected when any rule matches:
/// - its local part contains one of `deny_local_contains`
/// - its local part equals one of `deny_local_exact`
/// - its domain equals, or is a subdomain of, one of `deny_domains`
/// - the address ends with one of `deny_suffixes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPolicy {
    #[serde(default = "defaults::deny_local_contains")]
    pub deny_local_contains: Vec<String>,

    #[serde(default = "defaults::deny_local_exact")]
    pub deny_local_exact: Vec<String>,

    #[serde(default = "defaults::deny_domains")]
    pub deny_domains: Vec<String>,

    #[serde(default = "defaults::deny_suffixes")]
    pub deny_suffixes: Vec<String>,
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self {
            deny_local_contains: defaults::deny_local_contains(),
            deny_local_exact: defaults::deny_local_exact(),
            deny_domains: defaults::deny_domains(),
            deny_suffixes: defaults::deny_suffixes(),
        }
    }
}

impl EmailPolicy {
    /// True if the address is usable for outreach.
    pub fn is_allowed(&self, email: &str) -> bool {
        self.rejection(email).is_none()
    }

    /// Why an address is rejected, or `None` if it is allowed.
    pub fn rejection(&self, email: &str) -> Option<String> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Some("empty address".to_string());
        }
        let Some((local, domain)) = email.split_once('@') else {
            return Some("missing '@'".to_string());
        };
        if local.is_empty()
            || !domain.contains('.')
            || domain.contains('@')
            || email.contains(char::is_whitespace)
        {
            return Some("malformed address".to_string());
        }

        if let Some(suffix) = self.deny_suffixes.iter().find(|s| email.ends_with(s.as_str())) {
            return Some(format!("suffix '{suffix}'"));
        }
        if let Some(word) = self
            .deny_local_contains
            .iter()
            .find(|w| local.contains(w.as_str()))
        {
            return Some(format!("local part contains '{word}'"));
        }
        if let Some(word) = self.deny_local_exact.iter().find(|w| local == w.as_str()) {
            return Some(format!("placeholder local part '{word}'"));
        }
        if let Some(denied) = self.deny_domains.iter().find(|d| host_matches(domain, d)) {
            return Some(format!("domain '{denied}'"));
        }
        None
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `launches-YYYY-MM-DD.csv` files
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Scraper defaults
    pub fn listing_url() -> String {
        "https://www.producthunt.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn website_timeout() -> u64 {
        20
    }
    pub fn contact_page_timeout() -> u64 {
        10
    }
    pub fn contact_paths() -> Vec<String> {
        strings(&["/contact", "/about", "/support"])
    }
    pub fn max_other_social() -> usize {
        3
    }
    pub fn ignored_social_handles() -> Vec<String> {
        strings(&["producthunt"])
    }

    // Emailer defaults
    pub fn send_delay() -> u64 {
        5
    }
    pub fn platform_label() -> String {
        "Product Hunt".into()
    }
    pub fn template_path() -> PathBuf {
        PathBuf::from("template.txt")
    }
    pub fn api_base_url() -> String {
        "https://api.resend.com".into()
    }

    // Email policy defaults
    pub fn deny_local_contains() -> Vec<String> {
        strings(&["noreply", "no-reply", "donotreply", "do-not-reply"])
    }
    pub fn deny_local_exact() -> Vec<String> {
        strings(&["your", "you", "test", "demo", "user", "name", "email", "someone"])
    }
    pub fn deny_domains() -> Vec<String> {
        strings(&[
            "example.com",
            "example.org",
            "example.net",
            "test.com",
            "domain.com",
            "yourdomain.com",
            "email.com",
            "footer.email",
            "sentry.io",
            "wixpress.com",
            "cloudflare.com",
            "googleapis.com",
            "schema.org",
            "w3.org",
        ])
    }
    pub fn deny_suffixes() -> Vec<String> {
        strings(&[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"])
    }

    // Path defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }
}
