//! JSONL snapshot persistence for the entity store
//!
//! One record per line. The whole snapshot is rewritten after every committed
//! mutation through [`atomic_write_with`], while the caller holds the store's
//! write lock.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Record;
use crate::error::ConferenceResult;
use crate::types::{Entity, EntityKey};
use crate::utils::atomic::atomic_write_with;

/// On-disk form of one stored entity
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    pub version: u64,
    pub entity: Entity,
}

/// Load a snapshot; a missing file is an empty store
pub(crate) fn load_snapshot(path: &Path) -> ConferenceResult<Vec<StoredRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<StoredRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                line = line_no + 1,
                error = %e,
                "Skipping unreadable snapshot line"
            ),
        }
    }

    Ok(records)
}

/// Rewrite the snapshot from the current records (caller holds the lock)
pub(crate) fn write_snapshot(path: &Path, records: &BTreeMap<EntityKey, Record>) -> ConferenceResult<()> {
    atomic_write_with(path, |file| {
        for record in records.values() {
            let line = serde_json::to_string(&StoredRecordRef {
                version: record.version,
                entity: &record.entity,
            })?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    })?;
    Ok(())
}

/// Borrowing twin of [`StoredRecord`] to avoid cloning every entity on write
#[derive(Serialize)]
struct StoredRecordRef<'a> {
    version: u64,
    entity: &'a Entity,
}
