// src/pipeline/scrape.rs

//! Scrape phase: listing → detail pages → enrichment → dataset file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{AppError, Result};
use crate::models::{Config, Dataset, DatasetStats, EmailStatus, LaunchRecord};
use crate::services::{Enricher, ListingExtractor};
use crate::storage::DatasetStorage;
use crate::utils::http::PageFetcher;
use crate::utils::log;

/// Result of a scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// The written dataset; `None` when nothing was scraped
    pub dataset: Option<Dataset>,
    pub stats: DatasetStats,
    /// Records whose email status came from an earlier file for the same day
    pub carried_over: usize,
}

impl ScrapeOutcome {
    pub fn is_empty(&self) -> bool {
        self.dataset.is_none()
    }
}

/// Scrape today's launches and write them to `path`.
///
/// A listing page that cannot be fetched is fatal; everything after that
/// degrades per record. When nothing is found no file is written.
pub async fn run_scraper(
    config: &Config,
    fetcher: &dyn PageFetcher,
    storage: &dyn DatasetStorage,
    path: &Path,
    limit: Option<usize>,
) -> Result<ScrapeOutcome> {
    log::header("Launch scraper");
    let extractor = ListingExtractor::new(config)?;
    let enricher = Enricher::new(config)?;

    let listing_url = &config.scraper.listing_url;
    log::sub_item(&format!("Listing: {listing_url}"));
    if let Some(limit) = limit.filter(|&n| n > 0) {
        log::sub_item(&format!("Limit: {limit}"));
    }

    let listing_html = fetcher.fetch(listing_url).await?;

    let mut records = extractor.extract(fetcher, &listing_html, limit).await;
    if records.is_empty() {
        log::warn("No launches found on the listing page");
        return Ok(ScrapeOutcome {
            dataset: None,
            stats: DatasetStats::default(),
            carried_over: 0,
        });
    }

    let total = records.len();
    for (i, record) in records.iter_mut().enumerate() {
        ::log::info!("[{}/{}] Enriching {}", i + 1, total, record.name);
        enrich_record(&enricher, fetcher, record).await;
    }

    let carried_over = carry_over_status(storage, path, &mut records).await?;

    let dataset = Dataset::new(path, records);
    storage.save(&dataset).await?;

    let stats = dataset.stats();
    print_stats(&stats, path);
    if carried_over > 0 {
        log::sub_item(&format!(
            "Kept email status of {carried_over} records from the existing file"
        ));
    }

    Ok(ScrapeOutcome {
        dataset: Some(dataset),
        stats,
        carried_over,
    })
}

/// Profile links first; the website fills the gaps and supplies the email.
async fn enrich_record(enricher: &Enricher, fetcher: &dyn PageFetcher, record: &mut LaunchRecord) {
    let mut found = enricher.profile_links(fetcher, &record.maker_profile).await;
    let from_site = enricher.enrich(fetcher, &record.website).await;
    found.merge_missing(from_site);

    if found.email.is_empty() {
        ::log::debug!("  no usable email for {}", record.name);
    }
    found.apply_to(record);
}

/// Fold terminal email states from an existing dataset at `path` into `records`.
///
/// Matching is by source URL. Terminal records that this scrape did not find
/// are appended in their stored order. An existing file that cannot be read
/// is an error so its statuses are never overwritten. Returns how many
/// records kept a status from the earlier file.
async fn carry_over_status(
    storage: &dyn DatasetStorage,
    path: &Path,
    records: &mut Vec<LaunchRecord>,
) -> Result<usize> {
    let previous = match storage.read(path).await {
        Ok(dataset) => dataset,
        Err(AppError::MissingDataset(_)) => return Ok(0),
        Err(e) => {
            return Err(AppError::validation(format!(
                "existing dataset {} is unreadable, fix or move it before rescraping: {}",
                path.display(),
                e
            )));
        }
    };

    let mut known: HashMap<String, (EmailStatus, Option<NaiveDateTime>)> = HashMap::new();
    let mut missing = Vec::new();
    let scraped: HashSet<&str> = records.iter().map(|r| r.source_url.as_str()).collect();
    for record in previous.records {
        if !record.email_status.is_terminal() {
            continue;
        }
        if scraped.contains(record.source_url.as_str()) {
            known.insert(record.source_url, (record.email_status, record.email_sent_at));
        } else {
            missing.push(record);
        }
    }

    let mut carried = 0;
    for record in records.iter_mut() {
        if let Some((status, sent_at)) = known.get(&record.source_url) {
            record.email_status = *status;
            record.email_sent_at = *sent_at;
            carried += 1;
        }
    }

    carried += missing.len();
    records.extend(missing);
    Ok(carried)
}

fn print_stats(stats: &DatasetStats, path: &Path) {
    let line = |count: usize| format!("{} ({}%)", count, stats.percent(count));
    log::summary(
        "Scrape complete",
        &[
            ("Total launches", stats.total.to_string()),
            ("With email", line(stats.with_email)),
            ("With maker", line(stats.with_maker)),
            ("With Twitter/X", line(stats.with_twitter)),
            ("With LinkedIn", line(stats.with_linkedin)),
            ("Saved to", path.display().to_string()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::models::now_timestamp;
    use crate::storage::LocalStorage;

    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "not found"))
        }
    }

    const LISTING: &str = r#"
        <section data-test="homepage-section-today">
          <div data-test="post-item-1">
            <a href="/products/widget"><div data-test="post-name-1">1. Widget</div></a>
            <p>Widgets for busy teams everywhere</p>
          </div>
          <div data-test="post-item-2">
            <a href="/products/gadget"><div data-test="post-name-2">2. Gadget</div></a>
            <p>The gadget you always wanted</p>
          </div>
        </section>
    "#;

    const WIDGET_DETAIL: &str = r#"
        <a href="https://widget.io/?ref=producthunt">Visit website</a>
        <a href="/@jane">Jane Doe</a>
    "#;

    fn fetcher() -> FakeFetcher {
        let pages = [
            ("https://www.producthunt.com", LISTING),
            ("https://www.producthunt.com/products/widget", WIDGET_DETAIL),
            (
                "https://www.producthunt.com/@jane",
                r#"<a href="https://x.com/janedoe">x</a>"#,
            ),
            (
                "https://widget.io/",
                r#"<a href="mailto:jane@widget.io">mail</a><a href="https://twitter.com/widgetapp">t</a>"#,
            ),
        ];
        FakeFetcher {
            pages: pages
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn scrapes_enriches_and_writes() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");

        let outcome = run_scraper(&Config::default(), &fetcher(), &storage, &path, None)
            .await
            .unwrap();

        assert_eq!(outcome.stats.total, 2);
        assert_eq!(outcome.stats.with_email, 1);

        let dataset = storage.read(&path).await.unwrap();
        let widget = &dataset.records[0];
        assert_eq!(widget.name, "Widget");
        assert_eq!(widget.website, "https://widget.io/");
        assert_eq!(widget.maker_name, "Jane Doe");
        assert_eq!(widget.email, "jane@widget.io");
        // Profile link wins over the website's own account.
        assert_eq!(widget.twitter, "https://x.com/janedoe");

        let gadget = &dataset.records[1];
        assert_eq!(gadget.name, "Gadget");
        assert!(gadget.website.is_empty());
        assert_eq!(gadget.email_status, EmailStatus::Pending);
    }

    #[tokio::test]
    async fn rescrape_keeps_terminal_status() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");

        let mut sent = LaunchRecord::new("Widget", "https://www.producthunt.com/products/widget");
        let at = now_timestamp();
        sent.mark_sent(at).unwrap();
        storage.write(&[sent], &path).await.unwrap();

        let outcome = run_scraper(&Config::default(), &fetcher(), &storage, &path, Some(1))
            .await
            .unwrap();

        assert_eq!(outcome.carried_over, 1);
        let dataset = storage.read(&path).await.unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].email_status, EmailStatus::Sent);
        assert_eq!(dataset.records[0].email_sent_at, Some(at));
    }

    #[tokio::test]
    async fn rescrape_keeps_terminal_records_it_no_longer_finds() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");

        let mut widget = LaunchRecord::new("Widget", "https://www.producthunt.com/products/widget");
        widget.mark_sent(now_timestamp()).unwrap();
        let mut gadget = LaunchRecord::new("Gadget", "https://www.producthunt.com/products/gadget");
        gadget.email = "sam@gadget.io".into();
        gadget.mark_failed().unwrap();
        let stale = LaunchRecord::new("Stale", "https://www.producthunt.com/products/stale");
        storage.write(&[widget, gadget, stale], &path).await.unwrap();

        let outcome = run_scraper(&Config::default(), &fetcher(), &storage, &path, Some(1))
            .await
            .unwrap();

        assert_eq!(outcome.carried_over, 2);
        let dataset = storage.read(&path).await.unwrap();
        let names: Vec<_> = dataset.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "Gadget"]);
        assert_eq!(dataset.records[1].email_status, EmailStatus::Failed);
        assert_eq!(dataset.records[1].email, "sam@gadget.io");
    }

    #[tokio::test]
    async fn unreadable_existing_dataset_is_left_untouched() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");
        let contents = format!(
            "{}\nWidget,,,,,,,,,,https://www.producthunt.com/products/widget,bounced,\n",
            crate::storage::codec::COLUMNS.join(",")
        );
        std::fs::write(&path, &contents).unwrap();

        let result = run_scraper(&Config::default(), &fetcher(), &storage, &path, None).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }

    #[tokio::test]
    async fn empty_listing_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");
        let fetcher = FakeFetcher {
            pages: HashMap::from([(
                "https://www.producthunt.com".to_string(),
                "<html><body>Nothing today</body></html>".to_string(),
            )]),
        };

        let outcome = run_scraper(&Config::default(), &fetcher, &storage, &path, None)
            .await
            .unwrap();

        assert!(outcome.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unreachable_listing_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = FakeFetcher {
            pages: HashMap::new(),
        };

        let result = run_scraper(
            &Config::default(),
            &fetcher,
            &storage,
            &tmp.path().join("x.csv"),
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }
}
