use crate::ids::BufferId;

/// A raw byte blob (spec §4.D). Only GLB-embedded and `data:` URI buffers
/// are supported; external file URIs are rejected per spec's Non-goals.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

/// The GL buffer-binding target a `bufferView` declares itself for, if any
/// (spec §3; `gltf.hpp`'s `buffer_view_target` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferViewTarget {
    Unset,
    ArrayBuffer,
    ElementArrayBuffer,
}

impl BufferViewTarget {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(34962) => BufferViewTarget::ArrayBuffer,
            Some(34963) => BufferViewTarget::ElementArrayBuffer,
            _ => BufferViewTarget::Unset,
        }
    }
}

/// A byte-range window into a [`Buffer`], optionally interleaved with a
/// declared stride (spec §3, §4.D).
#[derive(Debug, Clone)]
pub struct BufferView {
    pub name: Option<String>,
    pub buffer: BufferId,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: usize,
    pub target: BufferViewTarget,
}
