use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CacheError;

/// The set of absolute, canonicalized paths a cache is permitted to open
/// (spec §4.A). A single mutex serializes `add` and `contains` so that
/// `contains` can tolerate concurrent extension of the set from another
/// thread.
#[derive(Default)]
pub struct Whitelist {
    paths: Mutex<HashSet<PathBuf>>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self {
            paths: Mutex::new(HashSet::new()),
        }
    }

    /// Recursively enumerates regular files and symlinks under `root`,
    /// canonicalizing each before inserting it into the set. `root` itself
    /// need not exist as a single file; directories are walked.
    pub fn add(&self, root: impl AsRef<Path>) -> Result<(), CacheError> {
        let root = root.as_ref();
        let canonical_root = std::fs::canonicalize(root).map_err(|source| CacheError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut guard = self.paths.lock().expect("whitelist mutex poisoned");

        if canonical_root.is_dir() {
            for entry in walkdir::WalkDir::new(&canonical_root)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
            {
                let file_type = entry.file_type();
                if file_type.is_file() || file_type.is_symlink() {
                    if let Ok(canonical) = std::fs::canonicalize(entry.path()) {
                        tracing::debug!(path = %canonical.display(), "whitelist: added");
                        guard.insert(canonical);
                    }
                }
            }
        } else {
            tracing::debug!(path = %canonical_root.display(), "whitelist: added");
            guard.insert(canonical_root);
        }

        Ok(())
    }

    /// Canonicalizes `path` and checks membership. A path outside any added
    /// root returns `false` even if it physically exists on disk.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let canonical = match std::fs::canonicalize(path.as_ref()) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let guard = self.paths.lock().expect("whitelist mutex poisoned");
        let hit = guard.contains(&canonical);
        tracing::debug!(path = %canonical.display(), hit, "whitelist: checked");
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_outside_any_root() {
        let dir = tempfile::tempdir().unwrap();
        let whitelist = Whitelist::new();
        whitelist.add(dir.path()).unwrap();

        let outside = std::env::temp_dir();
        // `outside` itself was never added as a root, only `dir`.
        assert!(!whitelist.contains(outside.join("definitely-not-added.bin")));
    }

    #[test]
    fn accepts_file_under_added_root() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("asset.bin");
        std::fs::write(&file_path, b"hello").unwrap();

        let whitelist = Whitelist::new();
        whitelist.add(dir.path()).unwrap();

        assert!(whitelist.contains(&file_path));
    }

    #[test]
    fn single_file_root_is_whitelisted_directly() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("single.bin");
        std::fs::write(&file_path, b"hello").unwrap();

        let whitelist = Whitelist::new();
        whitelist.add(&file_path).unwrap();

        assert!(whitelist.contains(&file_path));
    }
}
