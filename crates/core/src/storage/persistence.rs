//! Disk persistence for the record store using bincode serialization.
//!
//! The store is serialized to a single snapshot file. Writes use atomic
//! temp-file + rename to prevent corruption on crash. A CRC32 checksum is
//! appended as a footer and verified on load.

use crate::config;
use crate::error::StoreError;
use crate::storage::store::{RecordStore, StoreData};
use std::fs;
use std::path::{Path, PathBuf};

/// Magic bytes written before the CRC32 footer.
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"PBS1";

/// Path of the snapshot file inside `dir`.
pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(config::SNAPSHOT_FILE_NAME)
}

/// Save the store to `dir` with an atomic write.
/// Layout: [bincode payload][magic "PBS1"][u32 CRC32 BE].
pub fn save_store(store: &RecordStore, dir: &Path) -> Result<PathBuf, StoreError> {
    let data = store.data.read();
    let bytes = bincode::serialize(&*data).map_err(|e| StoreError::CorruptSnapshot {
        path: dir.display().to_string(),
        reason: format!("encode failed: {e}"),
    })?;
    let crc = crc32fast::hash(&bytes);

    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
    }
    let path = snapshot_path(dir);
    let tmp_path = path.with_extension("pbs.tmp");

    let mut output = Vec::with_capacity(bytes.len() + 8);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    fs::write(&tmp_path, &output)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp_path, &path)?;

    tracing::info!(
        records = data.records.len(),
        bytes = bytes.len(),
        "Saved snapshot {:?} (CRC32={:#010x})",
        path,
        crc
    );
    Ok(path)
}

/// Load a store from the snapshot in `dir`, verifying its CRC32 footer.
///
/// A missing snapshot yields an empty store. A snapshot without a valid
/// footer or with a checksum mismatch is rejected.
pub fn load_store(dir: &Path) -> Result<RecordStore, StoreError> {
    let path = snapshot_path(dir);
    if !path.exists() {
        tracing::info!("No snapshot at {:?}, starting with an empty store", path);
        return Ok(RecordStore::new());
    }
    let raw = fs::read(&path)?;
    let corrupt = |reason: String| StoreError::CorruptSnapshot {
        path: path.display().to_string(),
        reason,
    };

    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(corrupt("missing checksum footer".to_string()));
    }
    let payload = &raw[..raw.len() - 8];
    let mut footer = [0u8; 4];
    footer.copy_from_slice(&raw[raw.len() - 4..]);
    let stored_crc = u32::from_be_bytes(footer);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(corrupt(format!(
            "CRC32 mismatch: expected {:#010x}, got {:#010x}",
            stored_crc, computed_crc
        )));
    }
    tracing::debug!("Snapshot CRC32 verified: {:#010x}", stored_crc);

    let data: StoreData = bincode::deserialize(payload).map_err(|e| corrupt(e.to_string()))?;
    tracing::info!(records = data.records.len(), "Loaded snapshot {:?}", path);
    Ok(RecordStore::from_data(data))
}
