//! Snapshot Persistence
//!
//! This module reads and writes the whole-store snapshot file: a flat JSON
//! object mapping each key to the two-element array `[value, expiry-or-null]`.
//!
//! The snapshot is the only durability mechanism stashkv has. There is no
//! write-ahead log and no incremental persistence: `save` overwrites the file
//! with the complete mapping, and `load` reads the complete mapping back.
//!
//! ## Failure Semantics
//!
//! - A missing file on load means "start empty" and is not an error.
//! - An unreadable or malformed file on load is an unrecovered failure; no
//!   best-effort partial restore is attempted.
//! - A write failure on save is surfaced to the caller and not retried.

use crate::storage::store::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while saving or loading the snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the snapshot file failed
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The snapshot file exists but does not parse as a valid snapshot
    #[error("snapshot is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Writes the given mapping to `path`, replacing any previous snapshot.
pub fn save(path: &Path, entries: &HashMap<String, Entry>) -> Result<(), SnapshotError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, entries)?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), keys = entries.len(), "snapshot written");
    Ok(())
}

/// Reads the snapshot at `path`.
///
/// # Returns
///
/// - `Ok(Some(mapping))` if the file exists and parses
/// - `Ok(None)` if the file does not exist
/// - `Err(e)` if the file cannot be read or does not parse
pub fn load(path: &Path) -> Result<Option<HashMap<String, Entry>>, SnapshotError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let entries: HashMap<String, Entry> = serde_json::from_reader(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), keys = entries.len(), "snapshot restored");
    Ok(Some(entries))
}
