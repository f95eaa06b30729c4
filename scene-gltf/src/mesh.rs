use crate::ids::{AccessorId, MaterialId};

/// Named vertex-attribute accessors of one primitive (spec §6
/// `meshes[].primitives[].attributes`). Every field is optional; a renderer
/// is expected to tolerate absence of any but `POSITION`.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub position: Option<AccessorId>,
    pub normal: Option<AccessorId>,
    pub tangent: Option<AccessorId>,
    pub texcoord_0: Option<AccessorId>,
    pub texcoord_1: Option<AccessorId>,
    pub color_0: Option<AccessorId>,
    pub joints_0: Option<AccessorId>,
    pub weights_0: Option<AccessorId>,
}

/// A morph target's displacement attributes (spec §6 `primitives[].targets`),
/// a subset of [`Attributes`] with no index/skinning/texcoord/color fields.
#[derive(Debug, Clone, Default)]
pub struct MorphTarget {
    pub position: Option<AccessorId>,
    pub normal: Option<AccessorId>,
    pub tangent: Option<AccessorId>,
}

/// glTF's GL primitive topology enum (`primitive.mode`, default `TRIANGLES`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PrimitiveMode::Points),
            1 => Some(PrimitiveMode::Lines),
            2 => Some(PrimitiveMode::LineLoop),
            3 => Some(PrimitiveMode::LineStrip),
            4 => Some(PrimitiveMode::Triangles),
            5 => Some(PrimitiveMode::TriangleStrip),
            6 => Some(PrimitiveMode::TriangleFan),
            _ => None,
        }
    }
}

impl Default for PrimitiveMode {
    fn default() -> Self {
        PrimitiveMode::Triangles
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub attributes: Attributes,
    pub indices: Option<AccessorId>,
    pub mode: PrimitiveMode,
    pub targets: Vec<MorphTarget>,
    pub material: Option<MaterialId>,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}
