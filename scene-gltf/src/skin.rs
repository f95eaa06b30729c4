use glam::Mat4;

use crate::ids::NodeId;

/// A glTF skin (spec §3/§6). `inverse_bind_matrices` is always fully
/// populated to `joints.len()` entries — identity-filled when the document
/// omits `inverseBindMatrices` (spec invariant 3) — so downstream consumers
/// never special-case the absent form.
#[derive(Debug, Clone)]
pub struct Skin {
    pub name: Option<String>,
    pub inverse_bind_matrices: Vec<Mat4>,
    pub skeleton: Option<NodeId>,
    pub joints: Vec<NodeId>,
}
