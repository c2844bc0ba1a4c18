//! Offline store maintenance behind the `seed` and `check` subcommands.

use pulseboard_core::storage::{load_store, replace_from_file, save_store};
use pulseboard_core::{Field, FilterSet, Record, RecordStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Failures of a maintenance command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The snapshot written by `seed` did not read back with the imported count.
    #[error("snapshot {} holds {found} records, expected {expected}", path.display())]
    CountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Outcome of a successful [`seed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub records: usize,
    pub snapshot: PathBuf,
}

/// What [`check`] found in the snapshot.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub records: usize,
    pub sample: Option<Arc<Record>>,
    pub countries: usize,
    pub sectors: usize,
    pub regions: usize,
}

impl CheckReport {
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

/// Replaces the snapshot in `data_dir` with the records in `file`, then
/// reloads it and verifies the record count.
///
/// An unreadable existing snapshot is replaced. A bad import file leaves the
/// existing snapshot untouched.
pub fn seed(data_dir: &Path, file: &Path) -> Result<SeedReport, CommandError> {
    let store = load_store(data_dir).unwrap_or_else(|e| {
        tracing::warn!("Existing snapshot unreadable ({}), starting fresh", e);
        RecordStore::new()
    });
    let inserted = replace_from_file(&store, file)?;
    let path = save_store(&store, data_dir)?;

    let total = load_store(data_dir)?.count(&FilterSet::new());
    if total != inserted {
        return Err(CommandError::CountMismatch {
            path,
            expected: inserted,
            found: total,
        });
    }
    tracing::info!(records = total, snapshot = %path.display(), "Seed complete");
    Ok(SeedReport {
        records: total,
        snapshot: path,
    })
}

/// Loads the snapshot in `data_dir` and summarizes it.
pub fn check(data_dir: &Path) -> Result<CheckReport, CommandError> {
    let store = load_store(data_dir)?;
    let report = CheckReport {
        records: store.len(),
        sample: store.first(),
        countries: store.distinct(Field::Country).len(),
        sectors: store.distinct(Field::Sector).len(),
        regions: store.distinct(Field::Region).len(),
    };

    if report.is_empty() {
        tracing::warn!("Store is empty; run `pulseboard seed --file <json>` to import data");
        return Ok(report);
    }
    if let Some(sample) = &report.sample {
        match serde_json::to_string(&**sample) {
            Ok(json) => tracing::info!(sample = %json, "Sample record"),
            Err(e) => tracing::warn!("Sample record not printable: {}", e),
        }
    }
    tracing::info!(
        records = report.records,
        countries = report.countries,
        sectors = report.sectors,
        regions = report.regions,
        "Store check complete"
    );
    Ok(report)
}
