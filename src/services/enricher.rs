// src/services/enricher.rs

//! Contact enrichment.
//!
//! Visits a maker's website (and profile page) to find a contact address and
//! social links. Every failure here is soft: an unreachable site yields an
//! empty enrichment, never an error.

use std::time::Duration;

use regex::Regex;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{Config, EmailPolicy, Enrichment, parse_selector};
use crate::utils::http::PageFetcher;
use crate::utils::{get_domain, host_matches, resolve_url};

/// Kind of a recognized profile link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialKind {
    Twitter,
    LinkedIn,
    GitHub,
    Other,
}

/// Hosts whose profile links go to `other_social`.
const OTHER_PROFILE_HOSTS: &[&str] = &[
    "instagram.com",
    "youtube.com",
    "facebook.com",
    "tiktok.com",
    "threads.net",
    "dev.to",
];

/// First path segments that are share/intent pages rather than profiles.
const NON_PROFILE_SEGMENTS: &[&str] = &["intent", "share", "sharer", "home", "i", "hashtag"];

/// What a single page yielded.
#[derive(Debug, Default)]
pub struct PageScan {
    /// Allowed addresses in discovery order, deduplicated
    pub emails: Vec<String>,
    pub social: Enrichment,
}

/// Finds contact emails and social links on maker pages.
pub struct Enricher {
    policy: EmailPolicy,
    email_regex: Regex,
    website_timeout: Duration,
    contact_timeout: Duration,
    contact_paths: Vec<String>,
    max_other_social: usize,
    ignored_handles: Vec<String>,
}

impl Enricher {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            policy: config.email_policy.clone(),
            email_regex: Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}")?,
            website_timeout: Duration::from_secs(config.scraper.website_timeout_secs),
            contact_timeout: Duration::from_secs(config.scraper.contact_page_timeout_secs),
            contact_paths: config.scraper.contact_paths.clone(),
            max_other_social: config.scraper.max_other_social,
            ignored_handles: config
                .scraper
                .ignored_social_handles
                .iter()
                .map(|h| h.to_lowercase())
                .collect(),
        })
    }

    /// Enrich from a product website.
    ///
    /// Falls back to the configured contact pages when the landing page has
    /// no usable address.
    pub async fn enrich(&self, fetcher: &dyn PageFetcher, website_url: &str) -> Enrichment {
        let website_url = website_url.trim();
        if website_url.is_empty() {
            return Enrichment::default();
        }

        let html = match fetcher.fetch_within(website_url, self.website_timeout).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Website unreachable {}: {}", website_url, e);
                return Enrichment::default();
            }
        };

        let scan = self.scan_page(&html, website_url);
        let mut candidates = scan.emails;
        let mut result = scan.social;

        if candidates.is_empty() {
            for url in self.contact_urls(website_url) {
                match fetcher.fetch_within(&url, self.contact_timeout).await {
                    Ok(html) => {
                        let scan = self.scan_page(&html, &url);
                        result.merge_missing(scan.social);
                        if !scan.emails.is_empty() {
                            log::debug!("Found contact address on {}", url);
                            candidates = scan.emails;
                            break;
                        }
                    }
                    Err(e) => log::debug!("Contact page {} unavailable: {}", url, e),
                }
            }
        }

        result.email = self.pick_email(&candidates, website_url).unwrap_or_default();
        result
    }

    /// Social links from a maker's profile page. Email is never set.
    pub async fn profile_links(&self, fetcher: &dyn PageFetcher, profile_url: &str) -> Enrichment {
        if profile_url.trim().is_empty() {
            return Enrichment::default();
        }
        match fetcher.fetch(profile_url).await {
            Ok(html) => self.scan_page(&html, profile_url).social,
            Err(e) => {
                log::warn!("Maker profile unreachable {}: {}", profile_url, e);
                Enrichment::default()
            }
        }
    }

    fn contact_urls(&self, website_url: &str) -> Vec<String> {
        let Ok(base) = Url::parse(website_url) else {
            return Vec::new();
        };
        self.contact_paths
            .iter()
            .map(|path| resolve_url(&base, path))
            .collect()
    }

    /// Collect allowed emails and social links from one page.
    pub fn scan_page(&self, html: &str, page_url: &str) -> PageScan {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();
        let mut scan = PageScan::default();
        let mut others: Vec<String> = Vec::new();

        let mut found: Vec<String> = Vec::new();
        let anchors = parse_selector("a[href]").ok();
        for anchor in anchors.iter().flat_map(|sel| document.select(sel)) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href = href.trim();

            if let Some(address) = href.strip_prefix("mailto:") {
                let address = address.split('?').next().unwrap_or("").trim();
                found.push(address.to_lowercase());
                continue;
            }

            let absolute = match &base {
                Some(base) => resolve_url(base, href),
                None => href.to_string(),
            };
            self.record_social(&mut scan.social, &mut others, &absolute);
        }

        for m in self.email_regex.find_iter(html) {
            found.push(m.as_str().trim_end_matches('.').to_lowercase());
        }

        for email in found {
            if scan.emails.contains(&email) {
                continue;
            }
            match self.policy.rejection(&email) {
                None => scan.emails.push(email),
                Some(reason) => log::debug!("Ignoring {}: {}", email, reason),
            }
        }

        scan.social.other_social = others.join(" | ");
        scan
    }

    fn record_social(&self, social: &mut Enrichment, others: &mut Vec<String>, href: &str) {
        let Some(kind) = self.classify_social(href) else {
            return;
        };
        let slot = match kind {
            SocialKind::Twitter => &mut social.twitter,
            SocialKind::LinkedIn => &mut social.linkedin,
            SocialKind::GitHub => &mut social.github,
            SocialKind::Other => {
                if others.len() < self.max_other_social && !others.iter().any(|o| o == href) {
                    others.push(href.to_string());
                }
                return;
            }
        };
        if slot.is_empty() {
            *slot = href.to_string();
        }
    }

    /// Classify a URL as a social profile link by host and path.
    pub fn classify_social(&self, href: &str) -> Option<SocialKind> {
        let url = Url::parse(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.to_lowercase();
        let path = url.path().to_lowercase();
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");

        if first.is_empty()
            || NON_PROFILE_SEGMENTS.contains(&first)
            || self
                .ignored_handles
                .iter()
                .any(|h| first.trim_start_matches('@') == h.as_str())
        {
            return None;
        }

        if host_matches(&host, "twitter.com") || host_matches(&host, "x.com") {
            return Some(SocialKind::Twitter);
        }
        if host_matches(&host, "linkedin.com") {
            return matches!(first, "in" | "company").then_some(SocialKind::LinkedIn);
        }
        if host_matches(&host, "github.com") {
            let is_repo_page = ["/issues", "/pull", "/blob", "/tree"]
                .iter()
                .any(|p| path.contains(p));
            return (!is_repo_page).then_some(SocialKind::GitHub);
        }
        if host_matches(&host, "medium.com") {
            return first.starts_with('@').then_some(SocialKind::Other);
        }
        if OTHER_PROFILE_HOSTS.iter().any(|d| host_matches(&host, d)) {
            return Some(SocialKind::Other);
        }
        None
    }

    /// Prefer an address on the website's own domain, else the first one.
    pub fn pick_email(&self, candidates: &[String], website_url: &str) -> Option<String> {
        let site = get_domain(website_url);
        let same_domain = site.as_ref().and_then(|site| {
            candidates.iter().find(|email| {
                email.rsplit_once('@').is_some_and(|(_, domain)| {
                    host_matches(domain, site) || host_matches(site, domain)
                })
            })
        });
        same_domain.or_else(|| candidates.first()).cloned()
    }
}
