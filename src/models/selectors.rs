// src/models/selectors.rs

//! CSS selectors for scraping the launch listing and detail pages.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for scraping the listing and product detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Section that holds today's launches (falls back to the whole page)
    #[serde(default = "default_section")]
    pub section_selector: String,

    /// Selector for each launch item in the listing
    #[serde(default = "default_item")]
    pub item_selector: String,

    /// Attribute carrying the item id, e.g. `data-test="post-item-123"`
    #[serde(default = "default_id_attr")]
    pub item_id_attr: String,

    /// Prefix stripped from the id attribute value
    #[serde(default = "default_id_prefix")]
    pub item_id_prefix: String,

    /// Selector for the product name within an item
    #[serde(default = "default_name")]
    pub name_selector: String,

    /// Selector for the detail page link within an item
    #[serde(default = "default_link")]
    pub link_selector: String,

    /// Candidate elements for the tagline within an item
    #[serde(default = "default_tagline")]
    pub tagline_selector: String,

    /// Lowercased anchor text marking the outbound website link on a detail page
    #[serde(default = "default_website_text")]
    pub website_link_text: String,

    /// Selector for maker profile links on a detail page
    #[serde(default = "default_maker_link")]
    pub maker_link_selector: String,
}

fn default_section() -> String {
    r#"[data-test="homepage-section-today"]"#.to_string()
}
fn default_item() -> String {
    r#"[data-test^="post-item-"]"#.to_string()
}
fn default_id_attr() -> String {
    "data-test".to_string()
}
fn default_id_prefix() -> String {
    "post-item-".to_string()
}
fn default_name() -> String {
    r#"[data-test^="post-name-"]"#.to_string()
}
fn default_link() -> String {
    r#"a[href*="/products/"]"#.to_string()
}
fn default_tagline() -> String {
    "p, span".to_string()
}
fn default_website_text() -> String {
    "visit website".to_string()
}
fn default_maker_link() -> String {
    r#"a[href^="/@"], a[href^="https://www.producthunt.com/@"]"#.to_string()
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            section_selector: default_section(),
            item_selector: default_item(),
            item_id_attr: default_id_attr(),
            item_id_prefix: default_id_prefix(),
            name_selector: default_name(),
            link_selector: default_link(),
            tagline_selector: default_tagline(),
            website_link_text: default_website_text(),
            maker_link_selector: default_maker_link(),
        }
    }
}

/// Selectors compiled once per scrape.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub section: Selector,
    pub item: Selector,
    pub name: Selector,
    pub link: Selector,
    pub tagline: Selector,
    pub maker_link: Selector,
    pub anchor: Selector,
}

impl ListingSelectors {
    /// Parse every selector, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            section: parse_selector(&self.section_selector)?,
            item: parse_selector(&self.item_selector)?,
            name: parse_selector(&self.name_selector)?,
            link: parse_selector(&self.link_selector)?,
            tagline: parse_selector(&self.tagline_selector)?,
            maker_link: parse_selector(&self.maker_link_selector)?,
            anchor: parse_selector("a[href]")?,
        })
    }
}

pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selectors_compile() {
        assert!(ListingSelectors::default().compile().is_ok());
    }

    #[test]
    fn invalid_selector_is_reported() {
        let selectors = ListingSelectors {
            item_selector: "[[invalid".to_string(),
            ..ListingSelectors::default()
        };
        match selectors.compile() {
            Err(AppError::Selector { selector, .. }) => assert_eq!(selector, "[[invalid"),
            other => panic!("expected selector error, got {other:?}"),
        }
    }
}
