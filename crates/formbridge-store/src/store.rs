// SPDX-License-Identifier: Apache-2.0

use crate::codec::{decode_records, encode_records};
use crate::error::{StoreError, StoreErrorCode};
use crate::locks::path_lock;
use formbridge_model::{Record, RecordSet};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// What a successful upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum UpsertOutcome {
    /// Single record merged over an existing key, position preserved.
    Updated,
    /// Single record with a fresh key, appended at the end.
    Inserted,
    /// Multi-record payload replaced the whole set. Carries the new count.
    Replaced(usize),
}

impl UpsertOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Inserted => "inserted",
            Self::Replaced(_) => "replaced",
        }
    }
}

/// Loads the record set under the shared half of the per-path lock, so a
/// concurrent writer's read-mutate-write cycle is observed whole or not at
/// all.
pub fn read_records(path: &Path) -> Result<RecordSet, StoreError> {
    let lock = path_lock(path);
    let guard = lock.read().map_err(|_| poisoned())?;
    let set = read_unlocked(path)?;
    drop(guard);
    Ok(set)
}

/// Serializes the full ordered set over the target file under the exclusive
/// lock. The write itself is atomic: bytes land on a sibling temp file,
/// which is then renamed over the target.
pub fn write_records(path: &Path, set: &RecordSet) -> Result<(), StoreError> {
    let lock = path_lock(path);
    let guard = lock.write().map_err(|_| poisoned())?;
    write_unlocked(path, set)?;
    drop(guard);
    Ok(())
}

/// Applies an upsert payload as one read-mutate-write cycle under the
/// exclusive lock.
///
/// A single incoming record merges by key: the matching record is replaced
/// in place (position preserved) or, absent a match, appended. A payload of
/// two or more records replaces the entire set in the given order; this
/// destructive batch policy is deliberate and deliberately different from
/// the single-record merge. An empty payload is rejected outright.
pub fn upsert(path: &Path, incoming: Vec<Record>) -> Result<UpsertOutcome, StoreError> {
    if incoming.is_empty() {
        return Err(StoreError::new(
            StoreErrorCode::EmptyPayload,
            "upsert payload contains no records",
        ));
    }

    let lock = path_lock(path);
    let guard = lock.write().map_err(|_| poisoned())?;

    let mut set = read_unlocked(path)?;
    let shape = set.shape;
    let mut incoming: Vec<Record> = incoming
        .into_iter()
        .map(|r| r.conform_to(shape))
        .collect();

    let outcome = if incoming.len() > 1 {
        let count = incoming.len();
        set.records = incoming;
        UpsertOutcome::Replaced(count)
    } else {
        let record = incoming.remove(0);
        match set.position_of(record.field()) {
            Some(pos) => {
                set.records[pos] = record;
                UpsertOutcome::Updated
            }
            None => {
                set.records.push(record);
                UpsertOutcome::Inserted
            }
        }
    };

    write_unlocked(path, &set)?;
    drop(guard);

    info!(
        path = %path.display(),
        outcome = outcome.as_str(),
        records = set.len(),
        "store upsert"
    );
    Ok(outcome)
}

/// Writes `bytes` to `path` through a sibling temp file plus rename, with a
/// sync before the rename. Shared with the fill pipeline so filled
/// artifacts get the same no-torn-file guarantee as the store.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(e.to_string()))?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let mut file = File::create(tmp).map_err(|e| StoreError::io(e.to_string()))?;
    file.write_all(bytes)
        .map_err(|e| StoreError::io(e.to_string()))?;
    file.sync_all().map_err(|e| StoreError::io(e.to_string()))?;
    drop(file);

    fs::rename(tmp, path).map_err(|e| StoreError::io(e.to_string()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "atomic write");
    Ok(())
}

fn read_unlocked(path: &Path) -> Result<RecordSet, StoreError> {
    let file = File::open(path)
        .map_err(|e| StoreError::not_found(format!("{}: {e}", path.display())))?;
    decode_records(file)
}

fn write_unlocked(path: &Path, set: &RecordSet) -> Result<(), StoreError> {
    let bytes = encode_records(set)?;
    atomic_write(path, &bytes)
}

fn poisoned() -> StoreError {
    StoreError::new(StoreErrorCode::Internal, "store lock poisoned")
}
