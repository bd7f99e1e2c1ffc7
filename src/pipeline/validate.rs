// src/pipeline/validate.rs

use std::path::Path;

use crate::config::Credentials;
use crate::error::Result;
use crate::models::{Config, DatasetStats};
use crate::services::EmailTemplate;
use crate::storage::DatasetStorage;
use crate::utils::log;

/// Check configuration, template and credentials before a real run.
pub fn run_validate(config: &Config, credentials: Result<Credentials>) -> Result<()> {
    log::header("Validating setup");

    config.validate()?;
    log::success("Config OK");
    log::sub_item(&format!("Listing: {}", config.scraper.listing_url));
    log::sub_item(&format!("Data dir: {}", config.paths.data_dir.display()));
    log::sub_item(&format!(
        "Send delay: {}s, limit mode: {:?}",
        config.emailer.send_delay_secs, config.emailer.limit_mode
    ));

    let template = EmailTemplate::load(&config.emailer.template_path)?;
    log::success(&format!(
        "Template OK ({})",
        config.emailer.template_path.display()
    ));
    log::sub_item(&format!("Subject: {}", template.subject));

    let credentials = credentials?;
    log::success("Credentials OK");
    log::sub_item(&format!("From: {}", credentials.from_email));
    match &credentials.test_email {
        Some(test) => log::sub_item(&format!("Test recipient: {test}")),
        None => log::sub_item("Test recipient: not set"),
    }

    Ok(())
}

/// Print status counts for the dataset at `path`.
pub async fn run_info(storage: &dyn DatasetStorage, path: &Path) -> Result<DatasetStats> {
    let dataset = storage.read(path).await?;
    let stats = dataset.stats();
    let pct = |count: usize| format!("{} ({}%)", count, stats.percent(count));

    log::summary(
        &format!("Dataset {}", path.display()),
        &[
            ("Records", stats.total.to_string()),
            ("With email", pct(stats.with_email)),
            ("Pending", stats.pending.to_string()),
            ("Sent", stats.sent.to_string()),
            ("Failed", stats.failed.to_string()),
            ("Skipped", stats.skipped.to_string()),
        ],
    );
    Ok(stats)
}
