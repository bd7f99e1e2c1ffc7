//! Storage abstractions for dataset persistence.
//!
//! Each scrape day is one CSV file under the data directory:
//!
//! ```text
//! data/
//! ├── launches-2026-01-07.csv
//! └── launches-2026-01-08.csv
//! ```
//!
//! The email phase rewrites the file after every send attempt, so a crash
//! never loses more than the status of the message in flight.

pub mod codec;
pub mod local;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Dataset, LaunchRecord};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for dataset storage backends.
#[async_trait]
pub trait DatasetStorage: Send + Sync {
    /// Replace the dataset at `path` with `records`.
    async fn write(&self, records: &[LaunchRecord], path: &Path) -> Result<()>;

    /// Load the dataset at `path`.
    ///
    /// Fails with `AppError::MissingDataset` if nothing is stored there.
    async fn read(&self, path: &Path) -> Result<Dataset>;

    /// Persist a dataset at its own path.
    async fn save(&self, dataset: &Dataset) -> Result<()> {
        self.write(&dataset.records, &dataset.path).await
    }
}
