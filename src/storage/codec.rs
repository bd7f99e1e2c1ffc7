// src/storage/codec.rs

//! CSV encoding of launch records.

use crate::error::{AppError, Result};
use crate::models::LaunchRecord;

/// Column order of every dataset file.
pub const COLUMNS: [&str; 13] = [
    "name",
    "tagline",
    "website",
    "email",
    "maker_name",
    "maker_profile",
    "twitter",
    "linkedin",
    "github",
    "other_social",
    "ph_url",
    "email_sent",
    "email_sent_at",
];

/// Encode records as CSV with a header row.
///
/// The header is always written, even for an empty record list.
pub fn encode(records: &[LaunchRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))
}

/// Decode CSV bytes into records.
///
/// Columns are matched by header name; optional columns may be absent and
/// unknown columns are ignored. `name` and `ph_url` must be present and
/// non-empty on every row.
pub fn decode(bytes: &[u8]) -> Result<Vec<LaunchRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for required in ["name", "ph_url"] {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(AppError::validation(format!(
                "dataset header is missing the '{required}' column"
            )));
        }
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<LaunchRecord>().enumerate() {
        let record = row?;
        record
            .validate()
            .map_err(|e| AppError::validation(format!("row {}: {}", index + 2, e)))?;
        records.push(record);
    }
    Ok(records)
}
