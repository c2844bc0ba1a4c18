//! Bulk import of records from a JSON array.

use crate::error::StoreError;
use crate::record::Record;
use crate::storage::store::RecordStore;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parses a JSON array of objects into records.
///
/// Fails on the first element that cannot be cast to the record schema.
pub fn parse_records(json: &str) -> Result<Vec<Record>, StoreError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(StoreError::NotAnArray);
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| Record::from_json(index, item))
        .collect()
}

/// Reads and parses a JSON import file.
pub fn read_records(path: &Path) -> Result<Vec<Record>, StoreError> {
    let json = fs::read_to_string(path)?;
    let records = parse_records(&json)?;
    tracing::debug!(records = records.len(), "Parsed import file {:?}", path);
    Ok(records)
}

/// Replaces the contents of `store` with the records in `path`.
///
/// The file is fully parsed before the store is touched, so a bad file
/// leaves the existing records in place. Returns the number of records inserted.
pub fn replace_from_file(store: &RecordStore, path: &Path) -> Result<usize, StoreError> {
    let records = read_records(path)?;
    let removed = store.clear();
    let inserted = store.insert_many(records);
    tracing::info!(removed, inserted, "Imported records from {:?}", path);
    Ok(inserted)
}
