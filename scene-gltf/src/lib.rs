//! glTF/GLB ingestion: binary container framing, JSON-schema decoding into
//! an arena-plus-index asset graph, and typed accessor reads (spec §4.C/D/E).
//!
//! The JSON itself is read with [`scene_json`], this crate's hand-rolled
//! decoder, not `serde_json` — the engine this crate replaces never accepted
//! a conforming JSON parser's stricter grammar (see `scene_json`'s crate
//! docs), and glTF documents produced by this pipeline's own exporters rely
//! on that looseness.

mod accessor;
mod animation;
mod buffer;
mod document;
mod error;
mod fields;
mod glb;
mod ids;
mod image;
mod material;
mod mesh;
mod node;
mod scene;
mod skin;
mod texture;
mod transform;

pub use accessor::{Accessor, AttributeType, ComponentType, Sparse, SparseIndices, SparseValues};
pub use animation::{
    Animation, AnimationChannel, AnimationChannelTarget, AnimationSampler, ChannelPath, Interpolation,
};
pub use buffer::{Buffer, BufferView, BufferViewTarget};
pub use document::{Asset, Document, DocumentBuilder};
pub use error::GltfError;
pub use glb::{parse_glb, Glb};
pub use ids::{
    AccessorId, AnimationId, AnimationSamplerId, BufferId, BufferViewId, ImageId, MaterialId, MeshId, NodeId,
    SceneId, SkinId, TextureId, TextureSamplerId,
};
pub use image::{decode_image_bytes, DecodedImage, Image, PixelData};
pub use material::{AlphaMode, Material, NormalTextureInfo, OcclusionTextureInfo, PbrMetallicRoughness, TextureInfo};
pub use mesh::{Attributes, Mesh, MorphTarget, Primitive, PrimitiveMode};
pub use node::Node;
pub use scene::Scene;
pub use skin::Skin;
pub use texture::{MagFilter, MinFilter, Texture, TextureSampler, WrapMode};
pub use transform::Transform;
