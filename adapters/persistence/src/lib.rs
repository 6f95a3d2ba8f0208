#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! JSON persistence for Skyweave choreography.
//!
//! Files store references between pools as identifier strings, never as
//! indices. Loading resolves those identifiers against the freshly read
//! pools, and saving regenerates them from the live indices. Sentinel
//! entries are never written.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use skyweave_core::Choreography;
use thiserror::Error;

mod document;

/// Reasons a level file could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be opened, read, or written.
    #[error("failed to access level file {}", .path.display())]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid JSON.
    #[error("level file is not valid JSON")]
    Json(#[from] serde_json::Error),
    /// The JSON root is not the expected top-level array.
    #[error("level file must contain a top-level array")]
    NotADocument,
}

/// Parses a level document held in memory.
pub fn from_json_str(text: &str) -> Result<Choreography, PersistenceError> {
    document::decode(text)
}

/// Renders the editable entries of `choreography` as a pretty-printed document.
pub fn to_json_string(choreography: &Choreography) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(&document::encode(choreography))?)
}

/// Reads and resolves the level file at `path`.
pub fn load(path: &Path) -> Result<Choreography, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let choreography = from_json_str(&text)?;
    log::info!(
        "loaded {} paths, {} formations and {} levels from {}",
        choreography.paths().len().saturating_sub(1),
        choreography.formations().len().saturating_sub(1),
        choreography.levels().len(),
        path.display()
    );
    Ok(choreography)
}

/// Loads the level file at `path`, falling back to an empty store.
///
/// The flag reports whether the file was read successfully. A missing or
/// corrupt file yields a sentinel-only store that is ready for editing.
#[must_use]
pub fn load_or_empty(path: &Path) -> (Choreography, bool) {
    match load(path) {
        Ok(choreography) => (choreography, true),
        Err(PersistenceError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            log::info!("no level file at {}, starting empty", path.display());
            (Choreography::new(), false)
        }
        Err(error) => {
            log::warn!("{error}, starting empty");
            (Choreography::new(), false)
        }
    }
}

/// Writes the editable entries of `choreography` to `path`.
pub fn save(choreography: &Choreography, path: &Path) -> Result<(), PersistenceError> {
    let text = to_json_string(choreography)?;
    fs::write(path, text).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved level file {}", path.display());
    Ok(())
}

/// Writes `choreography` to `path`, logging failures instead of returning them.
///
/// Returns whether the file was written.
pub fn save_or_log(choreography: &Choreography, path: &Path) -> bool {
    match save(choreography, path) {
        Ok(()) => true,
        Err(error) => {
            log::error!("{error}");
            false
        }
    }
}
