use std::path::Path;

use scene_cache::{CacheError, Loader};

/// Loads a whitelisted path's raw bytes (spec §4.A). The bottom layer of the
/// `binary_cache -> image_cache -> gltf_cache` dependency order fixed by
/// spec §5: every other loader in this crate goes through a [`BinaryCache`]
/// rather than reading the filesystem directly.
pub struct BinaryLoader;

impl Loader for BinaryLoader {
    type Value = Vec<u8>;
    type Error = CacheError;

    fn load(&self, path: &Path) -> Result<Vec<u8>, CacheError> {
        scene_cache::read_file(path)
    }
}

/// A cache of whole-file byte buffers, revalidated by mtime (spec §4.G).
pub type BinaryCache = scene_cache::Cache<BinaryLoader>;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use scene_cache::Whitelist;

    use super::*;

    #[test]
    fn loads_whitelisted_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asset.bin");
        std::fs::write(&path, b"hello world").unwrap();

        let whitelist = Arc::new(Whitelist::new());
        whitelist.add(dir.path()).unwrap();
        let cache = BinaryCache::new(whitelist, BinaryLoader);

        let entry = cache.get(&path).unwrap();
        assert_eq!(entry.value, b"hello world");
    }

    #[test]
    fn rejects_non_whitelisted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asset.bin");
        std::fs::write(&path, b"hello").unwrap();

        let whitelist = Arc::new(Whitelist::new());
        let cache = BinaryCache::new(whitelist, BinaryLoader);

        assert!(matches!(cache.get(&path), Err(CacheError::NotWhitelisted { .. })));
    }
}
