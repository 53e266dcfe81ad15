#![forbid(unsafe_code)]
//! CSV-backed record store.
//!
//! Every mutation runs a full read-file, mutate-in-memory, write-file cycle
//! under the exclusive half of a per-path lock; reads take the shared half,
//! so a reader never observes a cycle midway. Writes land on a temporary
//! file and are renamed into place, so a crashed writer leaves either the
//! old file or the new one, never a torn row.

mod codec;
mod error;
mod locks;
mod store;

pub use codec::{decode_records, encode_records};
pub use error::{StoreError, StoreErrorCode};
pub use locks::path_lock;
pub use store::{atomic_write, read_records, upsert, write_records, UpsertOutcome};

pub const CRATE_NAME: &str = "formbridge-store";
