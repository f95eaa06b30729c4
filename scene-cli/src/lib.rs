//! Shared plumbing for the `scene-cli` binaries: the "Whitelist CLI surface
//! (tests)" of spec §6 — small clap front-ends that load an asset through
//! the whitelist + cache layer and either exit 0 or print a diagnostic and
//! exit nonzero, the way the teacher's `gltf-rose`/`rose-gltf`/`make-lit`
//! binaries front `rose-file-lib`.

use std::path::Path;
use std::sync::Arc;

use scene_assets::{BinaryCache, BinaryLoader, GltfCache, GltfLoader};
use scene_cache::Whitelist;
use scene_gltf::Document;

/// Builds a whitelist rooted at `glb_path`'s parent directory and loads the
/// document through a fresh `BinaryCache -> GltfCache` pipeline (spec §5's
/// fixed dependency order). Each invocation gets its own whitelist/caches:
/// these binaries are one-shot, not long-running servers.
pub fn load_document(glb_path: &Path) -> anyhow::Result<Arc<Document>> {
    let root = glb_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let whitelist = Arc::new(Whitelist::new());
    whitelist.add(root)?;

    let binary = Arc::new(BinaryCache::new(Arc::clone(&whitelist), BinaryLoader));
    let gltf = GltfCache::new(whitelist, GltfLoader::new(binary));

    let entry = gltf.get(glb_path)?;
    Ok(entry.value.clone())
}

/// Installs a `tracing-subscriber` formatter honoring `RUST_LOG`, defaulting
/// to `info`, the way the retrieval pack's asset-pipeline binaries set up
/// observability ahead of any real work.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();
}
