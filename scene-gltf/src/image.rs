use image::DynamicImage;

use crate::document::Document;
use crate::error::GltfError;
use crate::ids::BufferViewId;

/// A glTF image descriptor (spec §6 `images[]`). Construction only records
/// where the encoded bytes live; decoding (spec §4.F) happens on demand via
/// [`Image::decode`], the same "store the reference, convert on demand"
/// shape `Accessor`'s typed-extraction methods use.
#[derive(Debug, Clone)]
pub struct Image {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<BufferViewId>,
}

/// Decoded pixel storage (spec §4.F: "RGBA8 or RGB8"). No color-space
/// conversion is performed; bytes are presented as the decoder produced them.
#[derive(Debug, Clone)]
pub enum PixelData {
    Rgba8(Vec<u8>),
    Rgb8(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelData,
}

impl Image {
    pub fn decode(&self, doc: &Document) -> Result<DecodedImage, GltfError> {
        let bv = self
            .buffer_view
            .ok_or_else(|| GltfError::ImageDecode("image has no embedded bufferView to decode".into()))?;
        let buffer_view = doc.buffer_view(bv);
        let buffer = doc.buffer(buffer_view.buffer);
        let start = buffer_view.byte_offset;
        let end = start + buffer_view.byte_length;
        let bytes = buffer
            .bytes
            .get(start..end)
            .ok_or_else(|| GltfError::ImageDecode("image bufferView is out of bounds".into()))?;
        decode_image_bytes(bytes)
    }
}

/// Decodes an encoded image from an arbitrary byte slice (spec §4.F). Used
/// both for bufferView-embedded images ([`Image::decode`]) and for
/// externally-loaded image files (`scene_assets::ImageCache`).
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DecodedImage, GltfError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| GltfError::ImageDecode(e.to_string()))?;
    match decoded {
        DynamicImage::ImageRgba8(buf) => {
            let (width, height) = (buf.width(), buf.height());
            Ok(DecodedImage {
                width,
                height,
                pixels: PixelData::Rgba8(buf.into_raw()),
            })
        }
        other => {
            let buf = other.to_rgb8();
            let (width, height) = (buf.width(), buf.height());
            Ok(DecodedImage {
                width,
                height,
                pixels: PixelData::Rgb8(buf.into_raw()),
            })
        }
    }
}
