//! Storage layer: the in-memory record store, JSON bulk import, and disk persistence.
//!
//! Records live in memory in a [`RecordStore`]. Durability is provided by
//! bincode snapshots (CRC32 footer, atomic temp-file + rename).

/// Bulk import from JSON arrays.
pub mod import;
/// Disk persistence: snapshot save/load with atomic writes.
pub mod persistence;
/// The record store and its query operations.
pub mod store;

pub use import::{parse_records, read_records, replace_from_file};
pub use persistence::{load_store, save_store, snapshot_path};
pub use store::{QueryResult, RecordStore, StoreData};
