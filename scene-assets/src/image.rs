use std::path::Path;
use std::sync::Arc;

use scene_gltf::DecodedImage;

use crate::binary::BinaryCache;
use crate::error::AssetsError;

/// Decodes standalone image files (a glTF `image`'s external `uri`, not its
/// embedded `bufferView`) by reading them through a [`BinaryCache`] first
/// (spec §5's `binary_cache -> image_cache` order) and decoding with the
/// same PNG path `scene_gltf::Image::decode` uses for embedded images.
pub struct ImageLoader {
    binary: Arc<BinaryCache>,
}

impl ImageLoader {
    pub fn new(binary: Arc<BinaryCache>) -> Self {
        Self { binary }
    }
}

impl scene_cache::Loader for ImageLoader {
    type Value = DecodedImage;
    type Error = AssetsError;

    fn load(&self, path: &Path) -> Result<DecodedImage, AssetsError> {
        tracing::debug!(path = %path.display(), "assets: decoding external image");
        let bytes = self.binary.get(path)?;
        Ok(scene_gltf::decode_image_bytes(&bytes.value)?)
    }
}

/// A cache of decoded external image files, revalidated by mtime (spec §4.G).
pub type ImageCache = scene_cache::Cache<ImageLoader>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scene_cache::Whitelist;
    use scene_gltf::PixelData;

    use super::*;

    fn tiny_png() -> Vec<u8> {
        // 1x1 white PNG, produced once and checked in as a literal byte
        // array so the test has no external fixture dependency.
        let mut bytes = Vec::new();
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_external_png_through_binary_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("texture.png");
        std::fs::write(&path, tiny_png()).unwrap();

        let whitelist = Arc::new(Whitelist::new());
        whitelist.add(dir.path()).unwrap();
        let binary = Arc::new(BinaryCache::new(Arc::clone(&whitelist), crate::binary::BinaryLoader));
        let images = ImageCache::new(whitelist, ImageLoader::new(binary));

        let entry = images.get(&path).unwrap();
        assert_eq!(entry.value.width, 1);
        assert_eq!(entry.value.height, 1);
        assert!(matches!(entry.value.pixels, PixelData::Rgb8(_)));
    }
}
