//! The whitelist and generic revalidating cache layer (spec §4.A, §4.G)
//! shared by the binary, image, glTF and GPU-asset layers. Every mutating
//! whitelist operation and every cache load is serialized by its own
//! mutex; loads across distinct caches never share a lock, so the
//! `binary_cache -> image_cache -> gltf_cache -> gpu_asset_cache`
//! dependency order in spec §5 can never deadlock on a cycle.

mod cache;
mod error;
mod io;
mod whitelist;

pub use cache::{Cache, FileEntry, Loader};
pub use error::CacheError;
pub use io::read_file;
pub use whitelist::Whitelist;
