//! # Bulk Registration
//!
//! Registers a CSV export of surveyed water points through the normal
//! creation pipeline, one row at a time.
//!
//! Every row ends in one of three outcomes, written to the [`ProgressLog`]:
//!
//! | status | meaning |
//! |--------|---------|
//! | `SUCCESS` | created; the log holds its `osid` and `wfId` |
//! | `DUPLICATE` | rejected because the facility is already registered |
//! | `FAILED` | the row could not be read, or creation failed for another reason |
//!
//! Rows whose geo code the log already records as `SUCCESS` are skipped, so
//! re-running an interrupted import picks up where it stopped.

pub mod progress;
pub mod row;

pub use progress::{ProgressEntry, ProgressLog, UploadStats, UploadStatus};
pub use row::FacilityRow;

use crate::lifecycle::RegistrySystem;
use crate::model::{WATER_FACILITY, WF_ID_FIELD};
use registry_framework::{GenerationError, RegistryError};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default number of rows between progress reports.
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Progress log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Totals of one import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    /// Rows in the input.
    pub total: usize,
    /// Rows skipped because an earlier run imported them.
    pub skipped: usize,
    pub stats: UploadStats,
    pub duration: Duration,
}

/// Outcome of registering one document, before it is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub status: UploadStatus,
    pub message: String,
    pub osid: Option<String>,
    pub wf_id: Option<String>,
}

impl RowOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Failed,
            message: message.into(),
            osid: None,
            wf_id: None,
        }
    }
}

/// Maps a creation failure onto a row status.
///
/// Both the generator's duplicate check and the store's uniqueness constraint
/// count as duplicates.
pub fn classify(error: &RegistryError) -> UploadStatus {
    match error {
        RegistryError::Generation(GenerationError::Duplicate { .. })
        | RegistryError::UniqueConstraint { .. } => UploadStatus::Duplicate,
        _ => UploadStatus::Failed,
    }
}

pub struct BulkImporter<'a> {
    system: &'a RegistrySystem,
    log: ProgressLog,
    batch_size: usize,
}

impl<'a> BulkImporter<'a> {
    pub fn new(system: &'a RegistrySystem, log: ProgressLog) -> Self {
        Self {
            system,
            log,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn log(&self) -> &ProgressLog {
        &self.log
    }

    pub async fn import_path(&self, path: impl AsRef<Path>) -> Result<ImportSummary, BulkError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        self.import(reader).await
    }

    pub async fn import_reader<R: Read>(&self, input: R) -> Result<ImportSummary, BulkError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input);
        self.import(reader).await
    }

    #[instrument(skip_all, fields(log = %self.log.path().display()))]
    async fn import<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<ImportSummary, BulkError> {
        let started = Instant::now();
        let uploaded = self.log.uploaded()?;
        let headers = reader.headers()?.clone();
        let geo_code_column = headers.iter().position(|h| h == "geo_code");

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        let total = records.len();
        let pending: Vec<csv::StringRecord> = records
            .into_iter()
            .filter(|record| {
                let geo_code = geo_code_column.and_then(|i| record.get(i)).unwrap_or("");
                !uploaded.contains(geo_code)
            })
            .collect();
        let skipped = total - pending.len();
        info!(total, skipped, to_upload = pending.len(), "Starting bulk registration");

        let mut stats = UploadStats::default();
        for (index, record) in pending.iter().enumerate() {
            let geo_code = geo_code_column
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string();

            let outcome = match record.deserialize::<FacilityRow>(Some(&headers)) {
                Ok(row) => self.register(row.to_document()).await,
                Err(e) => RowOutcome::failed(format!("Transform error: {e}")),
            };
            debug!(%geo_code, status = %outcome.status, "Row processed");

            let mut entry = ProgressEntry::new(geo_code, outcome.status, outcome.message);
            if let Some(osid) = outcome.osid {
                entry = entry.with_ids(osid, outcome.wf_id);
            }
            self.log.append(&entry)?;
            stats.record(outcome.status);

            let done = index + 1;
            if done % self.batch_size == 0 || done == pending.len() {
                info!(
                    done,
                    of = pending.len(),
                    ok = stats.success,
                    dup = stats.duplicate,
                    fail = stats.failed,
                    "Bulk registration progress"
                );
            }
        }

        let summary = ImportSummary {
            total,
            skipped,
            stats,
            duration: started.elapsed(),
        };
        info!(
            total,
            success = stats.success,
            duplicates = stats.duplicate,
            failed = stats.failed,
            duration_ms = summary.duration.as_millis() as u64,
            "Bulk registration complete"
        );
        Ok(summary)
    }

    /// Creates one facility and reads its generated `wfId` back.
    pub async fn register(&self, document: Value) -> RowOutcome {
        let mut root = Map::new();
        root.insert(WATER_FACILITY.to_string(), document);

        match self.system.add_entity(Value::Object(root)).await {
            Ok(osid) => {
                let wf_id = match self.system.get_entity(WATER_FACILITY, &osid).await {
                    Ok(stored) => stored
                        .get(WF_ID_FIELD)
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    Err(e) => {
                        warn!(%osid, error = %e, "Created but could not read back");
                        None
                    }
                };
                RowOutcome {
                    status: UploadStatus::Success,
                    message: "Created".to_string(),
                    osid: Some(osid),
                    wf_id,
                }
            }
            Err(e) => {
                let status = classify(&e);
                RowOutcome {
                    status,
                    message: e.to_string(),
                    osid: None,
                    wf_id: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let duplicate = RegistryError::Generation(GenerationError::Duplicate {
            id: "WF-1".into(),
            message: "Duplicate WaterFacility".into(),
        });
        assert_eq!(classify(&duplicate), UploadStatus::Duplicate);

        let constraint = RegistryError::UniqueConstraint {
            field: "wfId".into(),
            value: "WF-1".into(),
        };
        assert_eq!(classify(&constraint), UploadStatus::Duplicate);

        assert_eq!(classify(&RegistryError::StoreClosed), UploadStatus::Failed);
        assert_eq!(
            classify(&RegistryError::UnknownEntityType("WaterFacility".into())),
            UploadStatus::Failed
        );
    }
}
