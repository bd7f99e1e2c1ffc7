// src/models/mod.rs

//! Domain models for the outreach application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod selectors;

// Re-export all public types
pub use config::{
    Config, EmailPolicy, EmailerConfig, LimitMode, PathsConfig, ScraperConfig,
};
pub use record::{
    Dataset, DatasetStats, EmailStatus, LaunchRecord, SENT_AT_FORMAT, now_timestamp,
};
pub use selectors::{CompiledSelectors, ListingSelectors, parse_selector};

/// Contact data found on a maker's website and profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub email: String,
    pub twitter: String,
    pub linkedin: String,
    pub github: String,
    pub other_social: String,
}

impl Enrichment {
    /// Fill empty fields from `other`, keeping what is already set.
    pub fn merge_missing(&mut self, other: Enrichment) {
        fn fill(slot: &mut String, value: String) {
            if slot.is_empty() {
                *slot = value;
            }
        }
        fill(&mut self.email, other.email);
        fill(&mut self.twitter, other.twitter);
        fill(&mut self.linkedin, other.linkedin);
        fill(&mut self.github, other.github);
        fill(&mut self.other_social, other.other_social);
    }

    /// Copy the enrichment into a record.
    pub fn apply_to(self, record: &mut LaunchRecord) {
        record.email = self.email;
        record.twitter = self.twitter;
        record.linkedin = self.linkedin;
        record.github = self.github;
        record.other_social = self.other_social;
    }
}
