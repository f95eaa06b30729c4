use glam::{Mat4, Quat, Vec3};

/// A node's local TRS transform (spec §3 "defaultTransforms", §6
/// `nodes[].translation/rotation/scale`). glTF never expresses a node as a
/// raw 4x4 `matrix` in the subset this crate consumes (see §6); only the
/// decomposed form is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn to_mat4(self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
