//! Wires the cache layer (`scene-cache`) to the glTF/image loaders
//! (`scene-gltf`) in the fixed dependency order spec §5 requires:
//! `BinaryCache -> ImageCache -> GltfCache`. Each cache is its own mutex;
//! loading a glTF document pulls binary bytes through `BinaryCache`, and
//! decoding an image with an external `uri` pulls through `ImageCache`,
//! which itself reads through `BinaryCache` — never the other way around,
//! so no lock-order cycle can form.

mod binary;
mod error;
mod gltf;
mod image;

pub use binary::{BinaryCache, BinaryLoader};
pub use error::AssetsError;
pub use gltf::{decode_image, resolve_external_image_path, GltfCache, GltfLoader};
pub use image::{ImageCache, ImageLoader};
