// src/services/sender.rs

//! Sends the outreach email for every pending record of a dataset.
//!
//! Status changes are written back to storage after each attempt, so a
//! restarted run picks up exactly where the previous one stopped.

use std::time::Duration;

use crate::error::Result;
use crate::models::{
    Dataset, EmailPolicy, EmailStatus, EmailerConfig, LimitMode, now_timestamp,
};
use crate::services::template::EmailTemplate;
use crate::services::transport::{EmailTransport, OutgoingEmail};
use crate::storage::DatasetStorage;

/// Per-run sending options.
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Maximum sends; `None` or `Some(0)` means no limit
    pub limit: Option<usize>,
    pub limit_mode: LimitMode,
    /// When set, every message goes here instead of the record's address
    pub test_recipient: Option<String>,
    /// Pause before each attempt after the first
    pub delay: Duration,
    pub platform_label: String,
    pub from: String,
}

impl SendOptions {
    pub fn from_config(config: &EmailerConfig, from: impl Into<String>) -> Self {
        Self {
            limit: None,
            limit_mode: config.limit_mode,
            test_recipient: None,
            delay: Duration::from_secs(config.send_delay_secs),
            platform_label: config.platform_label.clone(),
            from: from.into(),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }

    pub fn with_test_recipient(mut self, recipient: Option<String>) -> Self {
        self.test_recipient = recipient;
        self
    }
}

/// Counts for one `send_all` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
    /// Records skipped in this run for an empty or deny-listed address
    pub skipped: usize,
    /// Transport calls made
    pub attempted: usize,
}

pub struct EmailSender<'a> {
    transport: &'a dyn EmailTransport,
    template: &'a EmailTemplate,
    policy: &'a EmailPolicy,
    options: SendOptions,
}

impl<'a> EmailSender<'a> {
    pub fn new(
        transport: &'a dyn EmailTransport,
        template: &'a EmailTemplate,
        policy: &'a EmailPolicy,
        options: SendOptions,
    ) -> Self {
        Self {
            transport,
            template,
            policy,
            options,
        }
    }

    /// Mark unusable pending records as skipped. Returns how many changed.
    pub fn skip_unusable(&self, dataset: &mut Dataset) -> Result<usize> {
        let mut skipped = 0;
        for record in &mut dataset.records {
            if record.email_status != EmailStatus::Pending {
                continue;
            }
            if let Some(reason) = self.policy.rejection(&record.email) {
                log::info!("Skipping {}: {}", record.name, reason);
                record.mark_skipped()?;
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    fn limit_reached(&self, summary: &SendSummary) -> bool {
        let Some(limit) = self.options.limit else {
            return false;
        };
        match self.options.limit_mode {
            LimitMode::Attempts => summary.attempted >= limit,
            LimitMode::Successes => summary.sent >= limit,
        }
    }

    /// Send to every pending record in stored order.
    ///
    /// Transport failures mark the record `failed` and the batch continues.
    /// Storage failures abort, since continuing could resend a message
    /// whose status was never recorded.
    pub async fn send_all(
        &self,
        dataset: &mut Dataset,
        storage: &dyn DatasetStorage,
    ) -> Result<SendSummary> {
        let mut summary = SendSummary {
            skipped: self.skip_unusable(dataset)?,
            ..SendSummary::default()
        };
        if summary.skipped > 0 {
            storage.save(dataset).await?;
        }

        for index in 0..dataset.records.len() {
            if dataset.records[index].email_status != EmailStatus::Pending {
                continue;
            }
            if self.limit_reached(&summary) {
                log::info!("Send limit reached after {} attempts", summary.attempted);
                break;
            }
            if summary.attempted > 0 && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }

            let record = &dataset.records[index];
            let rendered = self.template.render(record, &self.options.platform_label);
            let recipient = self
                .options
                .test_recipient
                .clone()
                .unwrap_or_else(|| record.email.clone());
            let email = OutgoingEmail {
                from: self.options.from.clone(),
                to: recipient,
                subject: rendered.subject,
                body: rendered.body,
            };

            summary.attempted += 1;
            let outcome = self.transport.send(&email).await;

            let record = &mut dataset.records[index];
            match outcome {
                Ok(id) => {
                    record.mark_sent(now_timestamp())?;
                    summary.sent += 1;
                    log::info!("Sent to {} for {} (id {})", email.to, record.name, id);
                }
                Err(e) => {
                    record.mark_failed()?;
                    summary.failed += 1;
                    log::warn!("Send failed for {}: {}", record.name, e);
                }
            }

            storage.save(dataset).await?;
        }

        Ok(summary)
    }
}
