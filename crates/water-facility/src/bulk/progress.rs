//! # Progress Log
//!
//! Append-only record of every row an import has attempted, one line each:
//!
//! ```text
//! <geo code>|<status>|<message>|<osid>|<wfId>|<timestamp>
//! xvksf3s|SUCCESS|Created|1-1|WF-NIM-SAN-TWB-DAA7B4|2026-10-14 09:12:03
//! ```
//!
//! A later import reads the log back and skips geo codes already recorded as
//! `SUCCESS`, so an interrupted run can simply be started again.

use super::BulkError;
use std::collections::HashSet;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FIELD_SEPARATOR: char = '|';

/// Outcome of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStatus {
    Success,
    Duplicate,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "SUCCESS",
            UploadStatus::Duplicate => "DUPLICATE",
            UploadStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(UploadStatus::Success),
            "DUPLICATE" => Ok(UploadStatus::Duplicate),
            "FAILED" => Ok(UploadStatus::Failed),
            other => Err(format!("unknown upload status '{other}'")),
        }
    }
}

/// One line of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub geo_code: String,
    pub status: UploadStatus,
    pub message: String,
    pub osid: Option<String>,
    pub wf_id: Option<String>,
    pub timestamp: String,
}

impl ProgressEntry {
    pub fn new(geo_code: impl Into<String>, status: UploadStatus, message: impl Into<String>) -> Self {
        Self {
            geo_code: geo_code.into(),
            status,
            message: message.into(),
            osid: None,
            wf_id: None,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn with_ids(mut self, osid: impl Into<String>, wf_id: Option<String>) -> Self {
        self.osid = Some(osid.into());
        self.wf_id = wf_id;
        self
    }

    fn to_line(&self) -> String {
        [
            clean(&self.geo_code),
            self.status.as_str().to_string(),
            clean(&self.message),
            self.osid.as_deref().map(clean).unwrap_or_default(),
            self.wf_id.as_deref().map(clean).unwrap_or_default(),
            self.timestamp.clone(),
        ]
        .join("|")
    }

    /// Parses a log line. Lines with fewer than three fields or an unknown
    /// status are not entries.
    fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.trim().split(FIELD_SEPARATOR).collect();
        if parts.len() < 3 {
            return None;
        }
        let non_empty = |i: usize| {
            parts
                .get(i)
                .filter(|p| !p.is_empty())
                .map(|p| p.to_string())
        };
        Some(Self {
            geo_code: parts[0].to_string(),
            status: parts[1].parse().ok()?,
            message: parts[2].to_string(),
            osid: non_empty(3),
            wf_id: non_empty(4),
            timestamp: non_empty(5).unwrap_or_default(),
        })
    }
}

/// Keeps every field on one line and free of the separator.
fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            FIELD_SEPARATOR => '/',
            '\r' | '\n' => ' ',
            c => c,
        })
        .collect()
}

/// Per-status totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub success: usize,
    pub duplicate: usize,
    pub failed: usize,
}

impl UploadStats {
    pub fn record(&mut self, status: UploadStatus) {
        match status {
            UploadStatus::Success => self.success += 1,
            UploadStatus::Duplicate => self.duplicate += 1,
            UploadStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.duplicate + self.failed
    }
}

/// The log file. A missing file is an empty log.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> Result<Vec<ProgressEntry>, BulkError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| self.io_error(e))?;
            if let Some(entry) = ProgressEntry::parse(&line) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Geo codes already imported successfully.
    pub fn uploaded(&self) -> Result<HashSet<String>, BulkError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.status == UploadStatus::Success)
            .map(|e| e.geo_code)
            .collect())
    }

    pub fn stats(&self) -> Result<UploadStats, BulkError> {
        let mut stats = UploadStats::default();
        for entry in self.entries()? {
            stats.record(entry.status);
        }
        Ok(stats)
    }

    pub fn append(&self, entry: &ProgressEntry) -> Result<(), BulkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{}", entry.to_line()).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> BulkError {
        BulkError::Log {
            path: self.path.clone(),
            source,
        }
    }
}
