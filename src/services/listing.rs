// src/services/listing.rs

//! Launch listing extractor.
//!
//! Reads today's launches from the listing page, then visits each launch's
//! detail page for the product website and the maker's profile.

use std::collections::HashSet;

use scraper::{ElementRef, Html};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CompiledSelectors, Config, LaunchRecord, parse_selector};
use crate::utils::http::PageFetcher;
use crate::utils::{get_domain, host_matches, resolve_url, strip_query};

/// Taglines shorter than this are usually vote counts or badges.
const MIN_TAGLINE_LEN: usize = 10;

/// One launch as it appears on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub url: String,
}

/// Data recovered from a launch's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailInfo {
    pub website: String,
    pub maker_name: String,
    pub maker_profile: String,
}

/// Extracts launch records from the listing and detail pages.
pub struct ListingExtractor {
    selectors: CompiledSelectors,
    base_url: Url,
    listing_domain: Option<String>,
    id_attr: String,
    id_prefix: String,
    website_link_text: String,
}

impl ListingExtractor {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.scraper.listing_url)?;
        Ok(Self {
            selectors: config.selectors.compile()?,
            listing_domain: get_domain(base_url.as_str()),
            base_url,
            id_attr: config.selectors.item_id_attr.clone(),
            id_prefix: config.selectors.item_id_prefix.clone(),
            website_link_text: config.selectors.website_link_text.to_lowercase(),
        })
    }

    /// Extract up to `limit` records from a listing page.
    ///
    /// `None` or `Some(0)` means no limit. Detail failures are logged and
    /// leave the record with empty website and maker fields.
    pub async fn extract(
        &self,
        fetcher: &dyn PageFetcher,
        listing_html: &str,
        limit: Option<usize>,
    ) -> Vec<LaunchRecord> {
        let items = self.parse_listing(listing_html, limit);
        let total = items.len();
        log::info!("Processing {} unique launches", total);

        let mut records = Vec::with_capacity(total);
        for (i, item) in items.into_iter().enumerate() {
            log::info!("[{}/{}] {}", i + 1, total, item.name);

            let mut record = LaunchRecord::new(item.name, item.url);
            record.tagline = item.tagline;

            match self.fetch_detail(fetcher, &record.source_url).await {
                Ok(detail) => {
                    log::debug!(
                        "  website: {}, maker: {}",
                        or_none(&detail.website),
                        or_none(&detail.maker_name)
                    );
                    record.website = detail.website;
                    record.maker_name = detail.maker_name;
                    record.maker_profile = detail.maker_profile;
                }
                Err(e) => {
                    log::warn!("Failed to read detail page for {}: {}", record.name, e);
                }
            }
            records.push(record);
        }
        records
    }

    async fn fetch_detail(&self, fetcher: &dyn PageFetcher, url: &str) -> Result<DetailInfo> {
        let html = fetcher.fetch(url).await?;
        let detail = self.parse_detail(&html);
        if detail == DetailInfo::default() {
            return Err(AppError::extract(url, "no website or maker link on page"));
        }
        Ok(detail)
    }

    /// Parse listing items, deduplicated, stopping once `limit` are found.
    pub fn parse_listing(&self, html: &str, limit: Option<usize>) -> Vec<ListingItem> {
        let cap = limit.filter(|&n| n > 0).unwrap_or(usize::MAX);
        let document = Html::parse_document(html);

        let candidates: Vec<ElementRef> = match document.select(&self.selectors.section).next() {
            Some(section) => section.select(&self.selectors.item).collect(),
            None => {
                log::debug!("Today section not found, scanning the whole page");
                document.select(&self.selectors.item).collect()
            }
        };
        log::debug!("Found {} listing elements", candidates.len());

        let mut seen_ids = HashSet::new();
        let mut seen_urls = HashSet::new();
        let mut items = Vec::new();

        for element in candidates {
            if items.len() >= cap {
                break;
            }

            let id = element
                .value()
                .attr(&self.id_attr)
                .map(|v| v.strip_prefix(&self.id_prefix).unwrap_or(v).to_string())
                .unwrap_or_default();
            if !id.is_empty() && !seen_ids.insert(id.clone()) {
                continue;
            }

            let Some(item) = self.parse_item(&document, element, id) else {
                continue;
            };
            if !seen_urls.insert(item.url.clone()) {
                continue;
            }
            items.push(item);
        }

        items
    }

    fn parse_item<'a>(
        &self,
        document: &'a Html,
        element: ElementRef<'a>,
        id: String,
    ) -> Option<ListingItem> {
        let name = element
            .select(&self.selectors.name)
            .next()
            .or_else(|| self.find_name_by_id(document, &id))
            .map(|el| clean_text(&el.text().collect::<String>()))
            .map(|name| strip_rank(&name).to_string())
            .filter(|name| !name.is_empty())?;

        let href = element
            .select(&self.selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"));
        let Some(href) = href else {
            log::debug!("Skipping '{}': no detail link", name);
            return None;
        };
        let url = strip_query(&resolve_url(&self.base_url, href));

        let tagline = element
            .select(&self.selectors.tagline)
            .map(|el| clean_text(&el.text().collect::<String>()))
            .find(|text| is_tagline(text, &name))
            .unwrap_or_default();

        Some(ListingItem {
            id,
            name,
            tagline,
            url,
        })
    }

    /// Some layouts put the name outside the item, keyed by the same id.
    fn find_name_by_id<'a>(&self, document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
        if id.is_empty() {
            return None;
        }
        let selector = parse_selector(&format!(r#"[data-test="post-name-{id}"]"#)).ok()?;
        document.select(&selector).next()
    }

    /// Parse a detail page for the product website and the maker.
    pub fn parse_detail(&self, html: &str) -> DetailInfo {
        let document = Html::parse_document(html);
        let mut detail = DetailInfo::default();

        for anchor in document.select(&self.selectors.anchor) {
            let text = clean_text(&anchor.text().collect::<String>()).to_lowercase();
            if !text.contains(&self.website_link_text) {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = resolve_url(&self.base_url, href);
            if self.is_listing_url(&url) {
                continue;
            }
            detail.website = strip_query(&url);
            break;
        }

        for link in document.select(&self.selectors.maker_link) {
            let name = clean_text(&link.text().collect::<String>());
            if name.chars().count() <= 1 || name.starts_with("Image") {
                continue;
            }
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            detail.maker_name = name;
            detail.maker_profile = strip_query(&resolve_url(&self.base_url, href));
            break;
        }

        detail
    }

    fn is_listing_url(&self, url: &str) -> bool {
        match (get_domain(url), &self.listing_domain) {
            (Some(host), Some(listing)) => host_matches(&host, listing),
            _ => false,
        }
    }
}

/// Collapse runs of whitespace and trim.
fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a leading rank such as `"12. "` from a product name.
fn strip_rank(name: &str) -> &str {
    match name.split_once(". ") {
        Some((rank, rest))
            if !rank.is_empty() && rank.len() <= 4 && rank.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.trim()
        }
        _ => name,
    }
}

fn is_tagline(text: &str, name: &str) -> bool {
    text.chars().count() > MIN_TAGLINE_LEN
        && !text.chars().all(|c| c.is_ascii_digit())
        && text != name
        && !text.starts_with(name)
}

fn or_none(s: &str) -> &str {
    if s.is_empty() { "not found" } else { s }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <section data-test="homepage-section-yesterday">
            <div data-test="post-item-999">
              <a href="/products/old"><span data-test="post-name-999">Old Thing</span></a>
            </div>
          </section>
          <section data-test="homepage-section-today">
            <div data-test="post-item-1">
              <a href="/products/widget"><span data-test="post-name-1">1. Widget</span></a>
              <span>42</span>
              <p>The friendliest widget for your team</p>
            </div>
            <div data-test="post-item-1">
              <a href="/products/widget"><span data-test="post-name-1">1. Widget</span></a>
            </div>
            <div data-test="post-item-2">
              <a href="/products/gadget"><span data-test="post-name-2">Gadget</span></a>
              <span>Gadget</span>
            </div>
            <div data-test="post-item-3">
              <span data-test="post-name-3">No Link</span>
            </div>
            <div data-test="post-item-4">
              <a href="https://www.producthunt.com/products/gizmo?ref=home">
                <span data-test="post-name-4">333. Gizmo</span>
              </a>
              <p>Gizmo is a gizmo</p>
              <p>Ship changelogs without writing them</p>
            </div>
          </section>
        </body></html>
    "#;

    const DETAIL: &str = r#"
        <html><body>
          <a href="https://www.producthunt.com/r/abc">Visit website</a>
          <a href="https://widget.io/?ref=producthunt">  Visit   Website </a>
          <a href="/@img"><img alt="x"/>Image of Jane</a>
          <a href="/@jane_doe">Jane Doe</a>
          <a href="/@someone">Someone Else</a>
        </body></html>
    "#;

    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "404"))
        }
    }

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&Config::default()).unwrap()
    }

    #[test]
    fn parses_today_section_with_dedupe() {
        let items = extractor().parse_listing(LISTING, None);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "Gadget", "Gizmo"]);

        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].url, "https://www.producthunt.com/products/widget");
        assert_eq!(items[0].tagline, "The friendliest widget for your team");
        assert_eq!(items[1].tagline, "");
        assert_eq!(items[2].tagline, "Ship changelogs without writing them");
        assert_eq!(items[2].url, "https://www.producthunt.com/products/gizmo");
    }

    #[test]
    fn limit_caps_items() {
        let ex = extractor();
        assert_eq!(ex.parse_listing(LISTING, Some(2)).len(), 2);
        assert_eq!(ex.parse_listing(LISTING, Some(1))[0].name, "Widget");
        assert_eq!(ex.parse_listing(LISTING, Some(0)).len(), 3);
        assert_eq!(ex.parse_listing(LISTING, Some(50)).len(), 3);
    }

    #[test]
    fn falls_back_to_whole_page_without_section() {
        let html = r#"<div data-test="post-item-7">
            <a href="/products/solo"><b data-test="post-name-7">Solo</b></a></div>"#;
        let items = extractor().parse_listing(html, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Solo");
    }

    #[test]
    fn parses_detail_page() {
        let detail = extractor().parse_detail(DETAIL);
        assert_eq!(detail.website, "https://widget.io/");
        assert_eq!(detail.maker_name, "Jane Doe");
        assert_eq!(detail.maker_profile, "https://www.producthunt.com/@jane_doe");
    }

    #[test]
    fn strips_rank_prefix_only_when_numeric() {
        assert_eq!(strip_rank("12. Widget"), "Widget");
        assert_eq!(strip_rank("Dr. Widget"), "Dr. Widget");
        assert_eq!(strip_rank("Widget"), "Widget");
    }

    #[tokio::test]
    async fn extract_tolerates_detail_failures() {
        let fetcher = FakeFetcher::new(&[("https://www.producthunt.com/products/widget", DETAIL)]);
        let records = extractor().extract(&fetcher, LISTING, None).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].website, "https://widget.io/");
        assert_eq!(records[0].maker_name, "Jane Doe");

        // Gadget's detail page is missing: name and tagline survive, maker fields stay empty.
        assert_eq!(records[1].name, "Gadget");
        assert!(records[1].maker_name.is_empty());
        assert!(records[1].website.is_empty());
        assert!(records.iter().all(|r| r.validate().is_ok()));
    }

    #[tokio::test]
    async fn extract_stops_fetching_at_limit() {
        let fetcher = FakeFetcher::new(&[("https://www.producthunt.com/products/widget", DETAIL)]);
        let records = extractor().extract(&fetcher, LISTING, Some(1)).await;

        assert_eq!(records.len(), 1);
        assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
    }
}
