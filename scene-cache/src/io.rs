use std::path::Path;

use crate::error::CacheError;

/// Reads a whole file into an owned buffer. This is the sole I/O entry
/// point permitted for downstream decoders (spec §4.A) — binary, image and
/// glTF loaders all go through this rather than opening files themselves.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, CacheError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}
