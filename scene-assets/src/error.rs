use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an asset through the `BinaryCache -> ImageCache
/// -> GltfCache` pipeline (spec §4.G/§5, SPEC_FULL.md §5).
#[derive(Error, Debug)]
pub enum AssetsError {
    #[error(transparent)]
    Cache(#[from] scene_cache::CacheError),

    #[error(transparent)]
    Gltf(#[from] scene_gltf::GltfError),

    #[error("image {} has neither an embedded bufferView nor a resolvable uri", path.display())]
    UnresolvableImage { path: PathBuf },
}
