//! Activity export index
//!
//! FIT files carry no activity title or hosted record id, so both are looked
//! up in the account export spreadsheet (`activities.csv`) by start time. The
//! export's `Activity Date` column is re-keyed into the canonical display
//! format so it can be joined against decoded FIT start times.

use crate::error::{Result, TrackError};
use crate::time_key::NormalizedTimeKey;
use crate::types::ActivityIndexEntry;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const DATE_COLUMN: &str = "Activity Date";
pub const NAME_COLUMN: &str = "Activity Name";
pub const ID_COLUMN: &str = "Activity ID";

/// How a lookup treats several export rows sharing one start-time key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Use the earliest row in file order
    #[default]
    FirstWins,
    /// Never match an ambiguous key
    Reject,
}

/// Start-time keyed view of the activity export
#[derive(Debug, Default)]
pub struct ActivityIndex {
    entries: HashMap<NormalizedTimeKey, Vec<ActivityIndexEntry>>,
    dropped_rows: usize,
}

impl ActivityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the export from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let index = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} activity keys from {} ({} rows dropped)",
            index.len(),
            path.display(),
            index.dropped_rows
        );
        Ok(index)
    }

    /// Build the index from CSV data with a header row
    ///
    /// Rows whose date does not parse, or that cannot be read, are dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| TrackError::DecodeFailure(format!("missing column '{}'", name)))
        };
        let date_idx = column(DATE_COLUMN)?;
        let name_idx = column(NAME_COLUMN)?;
        let id_idx = column(ID_COLUMN)?;

        let mut index = Self::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!("Dropping unreadable export row {}: {}", row + 1, e);
                    index.dropped_rows += 1;
                    continue;
                }
            };

            let key = record
                .get(date_idx)
                .and_then(NormalizedTimeKey::from_export_date);
            let Some(key) = key else {
                index.dropped_rows += 1;
                continue;
            };

            index.insert(
                key,
                ActivityIndexEntry {
                    activity_name: record.get(name_idx).unwrap_or_default().to_string(),
                    activity_id: record.get(id_idx).unwrap_or_default().trim().to_string(),
                },
            );
        }

        for key in index.ambiguous_keys() {
            warn!(
                "{} activities share start time '{}'",
                index.entries.get(key).map_or(0, Vec::len),
                key
            );
        }

        Ok(index)
    }

    /// Add a row; rows keep their insertion order per key
    pub fn insert(&mut self, key: NormalizedTimeKey, entry: ActivityIndexEntry) {
        self.entries.entry(key).or_default().push(entry);
    }

    pub fn lookup(
        &self,
        key: &NormalizedTimeKey,
        policy: DuplicatePolicy,
    ) -> Option<&ActivityIndexEntry> {
        let rows = self.entries.get(key)?;
        match policy {
            DuplicatePolicy::FirstWins => rows.first(),
            DuplicatePolicy::Reject if rows.len() == 1 => rows.first(),
            DuplicatePolicy::Reject => None,
        }
    }

    /// Keys shared by more than one row, sorted
    pub fn ambiguous_keys(&self) -> Vec<&NormalizedTimeKey> {
        let mut keys: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows skipped because their date was unparseable or the row unreadable
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}
