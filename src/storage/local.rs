//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Dataset, LaunchRecord};
use crate::storage::{DatasetStorage, codec};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    data_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the dataset for a calendar date.
    pub fn dataset_path(&self, date: NaiveDate) -> PathBuf {
        Dataset::path_for(&self.data_dir, date)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("csv.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl DatasetStorage for LocalStorage {
    async fn write(&self, records: &[LaunchRecord], path: &Path) -> Result<()> {
        let bytes = codec::encode(records)?;
        self.write_bytes(path, &bytes).await?;
        log::debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Dataset> {
        let bytes = self
            .read_bytes(path)
            .await?
            .ok_or_else(|| AppError::MissingDataset(path.to_path_buf()))?;
        let records = codec::decode(&bytes)?;
        Ok(Dataset::new(path, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailStatus;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("data"));
        let date = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        let path = storage.dataset_path(date);

        let mut record = LaunchRecord::new("Widget", "https://www.producthunt.com/products/widget");
        record.mark_failed().unwrap();
        storage.write(&[record.clone()], &path).await.unwrap();

        let dataset = storage.read(&path).await.unwrap();
        assert_eq!(dataset.path, path);
        assert_eq!(dataset.records, vec![record]);
        assert_eq!(dataset.records[0].email_status, EmailStatus::Failed);
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let path = tmp.path().join("launches-2026-01-08.csv");

        let a = LaunchRecord::new("A", "https://ph.test/a");
        let b = LaunchRecord::new("B", "https://ph.test/b");
        storage.write(&[a.clone(), b], &path).await.unwrap();
        storage.write(&[a.clone()], &path).await.unwrap();

        assert_eq!(storage.read(&path).await.unwrap().records, vec![a]);
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = storage.read(&tmp.path().join("nope.csv")).await.unwrap_err();
        assert!(matches!(err, AppError::MissingDataset(_)));
    }
}
