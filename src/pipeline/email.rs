// src/pipeline/email.rs

//! Email phase: dataset file → transport, with status written back.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Config, Dataset};
use crate::services::{EmailSender, EmailTemplate, EmailTransport, SendOptions, SendSummary};
use crate::storage::DatasetStorage;
use crate::utils::log;

/// Interpret a dataset argument: a `YYYY-MM-DD` date or a file path.
pub fn resolve_dataset(arg: &str, data_dir: &Path) -> PathBuf {
    match NaiveDate::parse_from_str(arg.trim(), "%Y-%m-%d") {
        Ok(date) => Dataset::path_for(data_dir, date),
        Err(_) => PathBuf::from(arg),
    }
}

/// Send the outreach email to every pending record in the dataset at `path`.
///
/// A missing dataset is fatal. Per-record transport failures are recorded
/// and counted in the summary.
pub async fn run_emailer(
    config: &Config,
    transport: &dyn EmailTransport,
    storage: &dyn DatasetStorage,
    template: &EmailTemplate,
    path: &Path,
    options: SendOptions,
) -> Result<SendSummary> {
    log::header("Launch emailer");

    let mut dataset = storage.read(path).await?;

    log::sub_item(&format!("Dataset: {} ({} records)", path.display(), dataset.len()));
    if let Some(recipient) = &options.test_recipient {
        log::warn(&format!("TEST MODE: every email goes to {recipient}"));
    }
    if let Some(limit) = options.limit {
        log::sub_item(&format!("Limit: {limit} ({:?})", options.limit_mode));
    }

    let sender = EmailSender::new(transport, template, &config.email_policy, options);
    let summary = sender.send_all(&mut dataset, storage).await?;

    print_summary(&summary, path);
    Ok(summary)
}

pub(crate) fn print_summary(summary: &SendSummary, path: &Path) {
    log::summary(
        "Email run complete",
        &[
            ("Sent", summary.sent.to_string()),
            ("Failed", summary.failed.to_string()),
            ("Skipped", summary.skipped.to_string()),
            ("Dataset", path.display().to_string()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;
    use crate::models::{EmailStatus, LaunchRecord};
    use crate::services::OutgoingEmail;
    use crate::storage::LocalStorage;

    #[derive(Default)]
    struct RecordingTransport {
        to: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmailTransport for RecordingTransport {
        async fn send(&self, email: &OutgoingEmail) -> Result<String> {
            self.to.lock().unwrap().push(email.to.clone());
            Ok("msg".into())
        }
    }

    fn no_delay_config() -> Config {
        let mut config = Config::default();
        config.emailer.send_delay_secs = 0;
        config
    }

    fn template() -> EmailTemplate {
        EmailTemplate::parse("Congrats {{FirstName}}\nLoved {{ProductName}}").unwrap()
    }

    #[test]
    fn resolves_date_or_path() {
        let data = Path::new("data");
        assert_eq!(
            resolve_dataset("2026-01-08", data),
            PathBuf::from("data/launches-2026-01-08.csv")
        );
        assert_eq!(
            resolve_dataset("exports/custom.csv", data),
            PathBuf::from("exports/custom.csv")
        );
    }

    #[tokio::test]
    async fn sends_and_persists_statuses() {
        let tmp = TempDir::new().unwrap();
        let config = no_delay_config();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");

        let mut a = LaunchRecord::new("Widget", "https://ph.test/widget");
        a.email = "jane@widget.io".into();
        let b = LaunchRecord::new("Gadget", "https://ph.test/gadget");
        storage.write(&[a, b], &path).await.unwrap();

        let transport = RecordingTransport::default();
        let options = SendOptions::from_config(&config.emailer, "me@outreach.dev");
        let summary = run_emailer(&config, &transport, &storage, &template(), &path, options)
            .await
            .unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped, 1);
        let stored = storage.read(&path).await.unwrap();
        assert_eq!(stored.records[0].email_status, EmailStatus::Sent);
        assert_eq!(stored.records[1].email_status, EmailStatus::Skipped);
        assert_eq!(*transport.to.lock().unwrap(), vec!["jane@widget.io"]);
    }

    #[tokio::test]
    async fn missing_dataset_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = no_delay_config();
        let storage = LocalStorage::new(tmp.path());
        let transport = RecordingTransport::default();
        let options = SendOptions::from_config(&config.emailer, "me@outreach.dev");
        let missing = tmp.path().join("none.csv");

        let err = run_emailer(&config, &transport, &storage, &template(), &missing, options)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingDataset(_)));
    }
}
