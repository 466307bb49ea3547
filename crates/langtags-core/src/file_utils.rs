//! Bounded reads of registry and config files.

use std::fs;
use std::path::Path;

use crate::diagnostics::FileError;

/// Upper bound for registry files. The full IANA registry is under 1 MiB.
pub const DEFAULT_MAX_REGISTRY_SIZE: u64 = 4 * 1024 * 1024;

/// Upper bound for configuration files.
pub const DEFAULT_MAX_CONFIG_SIZE: u64 = 64 * 1024;

/// Read a regular file as UTF-8, refusing anything larger than `limit` bytes.
pub fn read_bounded(path: &Path, limit: u64) -> Result<String, FileError> {
    let metadata = fs::metadata(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_file() {
        return Err(FileError::NotRegular {
            path: path.to_path_buf(),
        });
    }

    if metadata.len() > limit {
        return Err(FileError::TooBig {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit,
        });
    }

    fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}
