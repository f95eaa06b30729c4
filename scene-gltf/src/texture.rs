use crate::ids::{ImageId, TextureSamplerId};

/// glTF GL texture-filter enums (`samplers[].magFilter/minFilter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

impl MagFilter {
    pub fn from_code(code: i64) -> Self {
        match code {
            9728 => MagFilter::Nearest,
            _ => MagFilter::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    pub fn from_code(code: i64) -> Self {
        match code {
            9728 => MinFilter::Nearest,
            9729 => MinFilter::Linear,
            9984 => MinFilter::NearestMipmapNearest,
            9985 => MinFilter::LinearMipmapNearest,
            9986 => MinFilter::NearestMipmapLinear,
            _ => MinFilter::LinearMipmapLinear,
        }
    }
}

/// glTF GL texture-wrap enum (`samplers[].wrapS/wrapT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    Repeat,
}

impl WrapMode {
    pub fn from_code(code: i64) -> Self {
        match code {
            33071 => WrapMode::ClampToEdge,
            33648 => WrapMode::MirroredRepeat,
            _ => WrapMode::Repeat,
        }
    }
}

/// A GL sampler state (spec §6 `samplers[]`, default `magFilter=9729,
/// minFilter=9987, wrapS=wrapT=10497`).
#[derive(Debug, Clone)]
pub struct TextureSampler {
    pub name: Option<String>,
    pub mag_filter: MagFilter,
    pub min_filter: MinFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            name: None,
            mag_filter: MagFilter::Linear,
            min_filter: MinFilter::LinearMipmapLinear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub name: Option<String>,
    pub source: ImageId,
    pub sampler: TextureSamplerId,
}
