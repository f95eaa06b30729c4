use crate::ids::TextureId;

/// A texture reference with its UV set selector (spec §6
/// `baseColorTexture`/`metallicRoughnessTexture`/`emissiveTexture`).
#[derive(Debug, Clone, Copy)]
pub struct TextureInfo {
    pub index: TextureId,
    pub tex_coord: usize,
}

/// `normalTexture`'s extra `scale` factor (spec §6).
#[derive(Debug, Clone, Copy)]
pub struct NormalTextureInfo {
    pub index: TextureId,
    pub tex_coord: usize,
    pub scale: f32,
}

/// `occlusionTexture`'s extra `strength` factor (spec §6).
#[derive(Debug, Clone, Copy)]
pub struct OcclusionTextureInfo {
    pub index: TextureId,
    pub tex_coord: usize,
    pub strength: f32,
}

#[derive(Debug, Clone)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_roughness_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_roughness_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPAQUE" => Some(AlphaMode::Opaque),
            "MASK" => Some(AlphaMode::Mask),
            "BLEND" => Some(AlphaMode::Blend),
            _ => None,
        }
    }
}

impl Default for AlphaMode {
    fn default() -> Self {
        AlphaMode::Opaque
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,
    pub pbr_metallic_roughness: PbrMetallicRoughness,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr_metallic_roughness: PbrMetallicRoughness::default(),
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}
