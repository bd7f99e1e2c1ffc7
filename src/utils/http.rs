// src/utils/http.rs

//! HTTP client utilities and the page fetching seam.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::ScraperConfig;

/// Anything that can turn a URL into page HTML.
///
/// One fetcher is created per scrape and shared by reference across the
/// extractor and enricher.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Fetch with an upper bound on the total wait.
    async fn fetch_within(&self, url: &str, limit: Duration) -> Result<String> {
        match tokio::time::timeout(limit, self.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::fetch(
                url,
                format!("timed out after {}s", limit.as_secs()),
            )),
        }
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ScraperConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Plain HTTP fetcher backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn fetches_page_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/launches"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&ScraperConfig::default()).unwrap();
        let body = fetcher
            .fetch(&format!("{}/launches", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&ScraperConfig::default()).unwrap();
        assert!(fetcher.fetch(&server.uri()).await.is_err());
    }

    #[tokio::test]
    async fn fetch_within_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&ScraperConfig::default()).unwrap();
        let err = fetcher
            .fetch_within(&server.uri(), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
