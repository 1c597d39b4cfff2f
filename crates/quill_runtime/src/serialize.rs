//! Snapshot serialization using `MessagePack`.
//!
//! Saved sessions hold interpreter state only. They must be resumed against
//! the same script they were saved from.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use quill_engine::Snapshot;
use quill_foundation::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

/// Version written into every save.
pub const SAVE_FORMAT: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SaveFile {
    format: u32,
    snapshot: Snapshot,
}

fn serialization_error(e: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Serialization(e.to_string()))
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!(
        "failed to {action} '{}': {e}",
        path.display()
    )))
}

/// Serializes a snapshot to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let file = SaveFile {
        format: SAVE_FORMAT,
        snapshot: snapshot.clone(),
    };
    rmp_serde::to_vec_named(&file).map_err(serialization_error)
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a save or come from another format
/// version.
pub fn from_bytes(bytes: &[u8]) -> Result<Snapshot> {
    let file: SaveFile = rmp_serde::from_slice(bytes).map_err(serialization_error)?;
    if file.format != SAVE_FORMAT {
        return Err(serialization_error(format!(
            "unsupported save format {} (expected {SAVE_FORMAT})",
            file.format
        )));
    }
    Ok(file.snapshot)
}

/// Saves a snapshot to a file, replacing any existing one.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(snapshot)?;
    let file = File::create(path).map_err(|e| io_error("create file", path, &e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .map_err(|e| io_error("write to file", path, &e))?;
    writer.flush().map_err(|e| io_error("flush file", path, &e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(())
}

/// Loads a snapshot from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open file", path, &e))?;
    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read file", path, &e))?;
    from_bytes(&bytes)
}
