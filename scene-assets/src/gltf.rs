use std::path::{Path, PathBuf};
use std::sync::Arc;

use scene_gltf::{DecodedImage, Document, Image};

use crate::binary::BinaryCache;
use crate::error::AssetsError;
use crate::image::ImageCache;

/// Loads a GLB file into a parsed [`Document`] through a [`BinaryCache`]
/// (spec §5's `binary_cache -> gltf_cache` order). The `Document` is
/// immutable once built (spec §5 "Resource lifetimes"), so it is cheap to
/// share by `Arc` across every holder of a cache entry.
pub struct GltfLoader {
    binary: Arc<BinaryCache>,
}

impl GltfLoader {
    pub fn new(binary: Arc<BinaryCache>) -> Self {
        Self { binary }
    }
}

impl scene_cache::Loader for GltfLoader {
    type Value = Arc<Document>;
    type Error = AssetsError;

    fn load(&self, path: &Path) -> Result<Arc<Document>, AssetsError> {
        tracing::debug!(path = %path.display(), "assets: loading gltf document");
        let bytes = self.binary.get(path)?;
        let file_label = path.to_string_lossy().into_owned();
        let document = Document::from_glb(&bytes.value, file_label)?;
        Ok(Arc::new(document))
    }
}

/// A cache of parsed glTF documents, revalidated by mtime (spec §4.G).
pub type GltfCache = scene_cache::Cache<GltfLoader>;

/// Resolves an `image`'s external `uri`, relative to the glb file that
/// references it, for images that have no embedded `bufferView` (spec §6
/// `images[]`: "uri handling optional"). Returns
/// [`AssetsError::UnresolvableImage`] for an image descriptor with neither a
/// `bufferView` nor a `uri` to fall back on.
pub fn resolve_external_image_path(glb_path: &Path, image: &Image) -> Result<PathBuf, AssetsError> {
    match &image.uri {
        Some(uri) => {
            let base = glb_path.parent().unwrap_or_else(|| Path::new("."));
            Ok(base.join(uri))
        }
        None => Err(AssetsError::UnresolvableImage {
            path: glb_path.to_path_buf(),
        }),
    }
}

/// Decodes `image`, preferring its embedded `bufferView` (decoded inline
/// through `document`) and falling back to `image_cache` for a `uri`-
/// addressed external file resolved relative to `glb_path`.
pub fn decode_image(
    document: &Document,
    image: &Image,
    glb_path: &Path,
    image_cache: &ImageCache,
) -> Result<DecodedImage, AssetsError> {
    if image.buffer_view.is_some() {
        Ok(image.decode(document)?)
    } else {
        let path = resolve_external_image_path(glb_path, image)?;
        Ok(image_cache.get(path)?.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scene_cache::Whitelist;

    use super::*;

    fn write_cube_glb(path: &Path) {
        let json = r#"{
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 0}],
            "nodes": [{"name": "root"}],
            "scenes": [{"nodes": [0]}]
        }"#;
        let json_bytes = json.as_bytes();
        let mut padded = json_bytes.to_vec();
        while padded.len() % 4 != 0 {
            padded.push(b' ');
        }
        let total_len = 12 + 8 + padded.len();
        let mut out = Vec::new();
        out.extend_from_slice(&0x4654_6C67u32.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total_len as u32).to_le_bytes());
        out.extend_from_slice(&(padded.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
        out.extend_from_slice(&padded);
        std::fs::write(path, out).unwrap();
    }

    #[test]
    fn loads_document_through_binary_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.glb");
        write_cube_glb(&path);

        let whitelist = Arc::new(Whitelist::new());
        whitelist.add(dir.path()).unwrap();
        let binary = Arc::new(BinaryCache::new(Arc::clone(&whitelist), crate::binary::BinaryLoader));
        let gltf = GltfCache::new(whitelist, GltfLoader::new(binary));

        let entry = gltf.get(&path).unwrap();
        assert_eq!(entry.value.nodes().len(), 1);
    }

    #[test]
    fn image_with_neither_buffer_view_nor_uri_is_unresolvable() {
        let image = Image {
            name: None,
            uri: None,
            mime_type: None,
            buffer_view: None,
        };
        let err = resolve_external_image_path(Path::new("/assets/scene.glb"), &image).unwrap_err();
        assert!(matches!(err, AssetsError::UnresolvableImage { .. }));
    }

    #[test]
    fn image_uri_resolves_relative_to_glb_directory() {
        let image = Image {
            name: None,
            uri: Some("textures/diffuse.png".to_string()),
            mime_type: None,
            buffer_view: None,
        };
        let resolved = resolve_external_image_path(Path::new("/assets/scene.glb"), &image).unwrap();
        assert_eq!(resolved, Path::new("/assets/textures/diffuse.png"));
    }
}
