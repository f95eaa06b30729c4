use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the whitelist and generic cache layer (spec §7:
/// `path_not_in_whitelist`, `io_failure`).
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("path not in whitelist: {}", path.display())]
    NotWhitelisted { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stat {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
