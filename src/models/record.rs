// src/models/record.rs

//! Launch records and the per-day dataset that holds them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, Result};

/// Timestamp format used in the `email_sent_at` column.
pub const SENT_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Delivery status of a record's outreach email.
///
/// `Pending` is the only non-terminal state. Once a record reaches `Sent`,
/// `Failed` or `Skipped` it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmailStatus {
    #[default]
    Pending,
    Sent,
    Failed,
    Skipped,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Pending => "pending",
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
            EmailStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, EmailStatus::Pending)
    }

    /// Move to `next`, refusing any transition out of a terminal state.
    pub fn advance(self, next: EmailStatus) -> Result<EmailStatus> {
        match (self, next) {
            (EmailStatus::Pending, next) if next.is_terminal() => Ok(next),
            (from, to) => Err(AppError::validation(format!(
                "illegal email status transition {from} -> {to}"
            ))),
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = AppError;

    /// Blank values decode as `Pending`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "pending" => Ok(EmailStatus::Pending),
            "sent" => Ok(EmailStatus::Sent),
            "failed" => Ok(EmailStatus::Failed),
            "skipped" => Ok(EmailStatus::Skipped),
            other => Err(AppError::validation(format!(
                "unknown email_sent value '{other}'"
            ))),
        }
    }
}

impl Serialize for EmailStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmailStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One product launch and what we know about its maker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LaunchRecord {
    /// Product display name
    pub name: String,

    #[serde(default)]
    pub tagline: String,

    /// Product website (empty if not found)
    #[serde(default)]
    pub website: String,

    /// Best-guess contact email (empty if not found)
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub maker_name: String,

    #[serde(default)]
    pub maker_profile: String,

    #[serde(default)]
    pub twitter: String,

    #[serde(default)]
    pub linkedin: String,

    #[serde(default)]
    pub github: String,

    /// Other profile links joined with `" | "`
    #[serde(default)]
    pub other_social: String,

    /// Detail page on the listing site
    #[serde(rename = "ph_url")]
    pub source_url: String,

    #[serde(rename = "email_sent", default)]
    pub email_status: EmailStatus,

    #[serde(default, with = "sent_at")]
    pub email_sent_at: Option<NaiveDateTime>,
}

impl LaunchRecord {
    /// Create a record with the two mandatory fields set.
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("record has an empty name"));
        }
        if self.source_url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "record '{}' has an empty ph_url",
                self.name
            )));
        }
        Ok(())
    }

    pub fn mark_sent(&mut self, at: NaiveDateTime) -> Result<()> {
        self.email_status = self.email_status.advance(EmailStatus::Sent)?;
        self.email_sent_at = Some(at);
        Ok(())
    }

    pub fn mark_failed(&mut self) -> Result<()> {
        self.email_status = self.email_status.advance(EmailStatus::Failed)?;
        Ok(())
    }

    pub fn mark_skipped(&mut self) -> Result<()> {
        self.email_status = self.email_status.advance(EmailStatus::Skipped)?;
        Ok(())
    }
}

/// Current local time truncated to what the CSV column can hold.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod sent_at {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::SENT_AT_FORMAT;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&at.format(SENT_AT_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(raw, SENT_AT_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// All records scraped for one day, together with the file they live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub path: PathBuf,
    pub records: Vec<LaunchRecord>,
}

impl Dataset {
    pub fn new(path: impl Into<PathBuf>, records: Vec<LaunchRecord>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    /// File name for a given date: `launches-YYYY-MM-DD.csv`.
    pub fn file_name(date: NaiveDate) -> String {
        format!("launches-{}.csv", date.format("%Y-%m-%d"))
    }

    /// Full path of the dataset for `date` under `data_dir`.
    pub fn path_for(data_dir: &Path, date: NaiveDate) -> PathBuf {
        data_dir.join(Self::file_name(date))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate counts for reporting.
    pub fn stats(&self) -> DatasetStats {
        let mut stats = DatasetStats {
            total: self.records.len(),
            ..DatasetStats::default()
        };
        for record in &self.records {
            if !record.email.is_empty() {
                stats.with_email += 1;
            }
            if !record.maker_name.is_empty() {
                stats.with_maker += 1;
            }
            if !record.twitter.is_empty() {
                stats.with_twitter += 1;
            }
            if !record.linkedin.is_empty() {
                stats.with_linkedin += 1;
            }
            match record.email_status {
                EmailStatus::Pending => stats.pending += 1,
                EmailStatus::Sent => stats.sent += 1,
                EmailStatus::Failed => stats.failed += 1,
                EmailStatus::Skipped => stats.skipped += 1,
            }
        }
        stats
    }
}

/// Counts over a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStats {
    pub total: usize,
    pub with_email: usize,
    pub with_maker: usize,
    pub with_twitter: usize,
    pub with_linkedin: usize,
    pub pending: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DatasetStats {
    /// Integer percentage of `count` over the total.
    pub fn percent(&self, count: usize) -> usize {
        count * 100 / self.total.max(1)
    }
}
