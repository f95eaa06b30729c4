use glam::Mat4;
use scene_gltf::{Document, Node, NodeId, Skin};

use crate::error::SkelError;

/// The sentinel "no bone" value, matching the original engine's
/// `uint8_t bone_index` with `max_bones = 255` doubling as both the bone
/// count ceiling and the unset-parent/child/peer marker (spec §4.H).
pub const MAX_BONES: usize = 255;

/// A bone index into an [`Armature`]'s `bones` arena. `NONE` is the default
/// value for an as-yet-unwired `parent`/`child`/`peer` link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneIndex(u8);

impl BoneIndex {
    pub const NONE: BoneIndex = BoneIndex(MAX_BONES as u8);

    pub fn new(index: usize) -> Self {
        debug_assert!(index < MAX_BONES);
        BoneIndex(index as u8)
    }

    pub fn get(self) -> Option<usize> {
        if self.0 as usize == MAX_BONES {
            None
        } else {
            Some(self.0 as usize)
        }
    }

    pub fn is_none(self) -> bool {
        self.0 as usize == MAX_BONES
    }
}

impl Default for BoneIndex {
    fn default() -> Self {
        BoneIndex::NONE
    }
}

/// One joint of an [`Armature`], linked into its siblings via first-child /
/// next-sibling pointers (spec §4.H), mirroring the original `armature_bone`.
#[derive(Debug, Clone)]
pub struct ArmatureBone {
    pub name: Option<String>,
    pub node: NodeId,
    pub child: BoneIndex,
    pub peer: BoneIndex,
    pub parent: BoneIndex,
}

/// A skeleton built from a glTF skin: the bind-pose transforms, the
/// inverse-bind matrices, and the first-child/next-sibling bone tree (spec
/// §4.H). Bone order matches `skin.joints` order; a bone's index in `bones`
/// is the same index used to index `default_transforms`/`inverse_bind_matrices`.
#[derive(Debug, Clone)]
pub struct Armature {
    pub root_name: Option<String>,
    pub default_transforms: Vec<Mat4>,
    pub inverse_bind_matrices: Vec<Mat4>,
    pub bones: Vec<ArmatureBone>,
}

impl Armature {
    /// Builds an armature from `skin`'s joint list (spec §4.H steps 1-4).
    ///
    /// Step 1/2 copy each joint's bind transform and inverse-bind matrix
    /// (the latter is always fully populated by [`scene_gltf::Document`],
    /// identity-filled when the source glTF omits `inverseBindMatrices`).
    /// Step 3 wires parent/child/peer links for every joint whose glTF
    /// parent is *also* a joint of this skin — a joint whose glTF parent is
    /// outside the joint list becomes a root of its own subtree, it is not
    /// an error. Step 4 determines `root_name` by walking glTF `parent`
    /// links from joint 0 up to the node with no parent.
    pub fn from_skin(doc: &Document, skin: &Skin) -> Result<Armature, SkelError> {
        let joint_count = skin.joints.len();
        tracing::trace!(joints = joint_count, "skel: building armature from skin");
        if joint_count > MAX_BONES {
            return Err(SkelError::TooManyBones { found: joint_count });
        }
        if skin.inverse_bind_matrices.len() != joint_count {
            return Err(SkelError::InverseBindMatrixCountMismatch {
                expected: joint_count,
                found: skin.inverse_bind_matrices.len(),
            });
        }

        let joint_index_of = |node: NodeId| -> Option<usize> { skin.joints.iter().position(|&j| j == node) };

        let mut bones: Vec<ArmatureBone> = skin
            .joints
            .iter()
            .map(|&node_id| {
                let node = doc.node(node_id);
                ArmatureBone {
                    name: node.name.clone(),
                    node: node_id,
                    child: BoneIndex::NONE,
                    peer: BoneIndex::NONE,
                    parent: BoneIndex::NONE,
                }
            })
            .collect();

        let default_transforms: Vec<Mat4> = skin
            .joints
            .iter()
            .map(|&node_id| doc.node(node_id).transform.to_mat4())
            .collect();

        for (parent_index, &node_id) in skin.joints.iter().enumerate() {
            let node: &Node = doc.node(node_id);
            for &child_node in &node.children {
                let Some(child_index) = joint_index_of(child_node) else {
                    continue;
                };
                if !bones[child_index].parent.is_none() {
                    return Err(SkelError::JointAlreadyHasParent(child_index));
                }
                bones[child_index].peer = bones[parent_index].child;
                bones[child_index].parent = BoneIndex::new(parent_index);
                bones[parent_index].child = BoneIndex::new(child_index);
            }
        }

        let root_name = if joint_count == 0 {
            None
        } else {
            let mut current = skin.joints[0];
            loop {
                match doc.node(current).parent {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            doc.node(current).name.clone()
        };

        tracing::debug!(root = ?root_name, bones = joint_count, "skel: armature built");
        Ok(Armature {
            root_name,
            default_transforms,
            inverse_bind_matrices: skin.inverse_bind_matrices.clone(),
            bones,
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bone_named(&self, name: &str) -> Option<BoneIndex> {
        self.bones
            .iter()
            .position(|bone| bone.name.as_deref() == Some(name))
            .map(BoneIndex::new)
    }

    /// Roots of the forest: bones with no in-armature parent. Usually one
    /// (`root_name`'s bone, if it is itself a joint) but a skin's joint list
    /// need not be a single tree, so more than one may occur.
    pub fn roots(&self) -> impl Iterator<Item = BoneIndex> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.parent.is_none())
            .map(|(i, _)| BoneIndex::new(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pretty_assertions::assert_eq;
    use scene_gltf::{DocumentBuilder, Node as GltfNode, Transform};

    fn node(name: &str, children: Vec<NodeId>) -> GltfNode {
        GltfNode {
            name: Some(name.to_string()),
            transform: Transform::default(),
            mesh: None,
            skin: None,
            children,
            parent: None,
        }
    }

    fn build_doc_with_chain() -> (Document, Skin) {
        let mut builder = DocumentBuilder::new();
        let leaf = builder.push_node(node("leaf", vec![]));
        let mid = builder.push_node(node("mid", vec![leaf]));
        let root = builder.push_node(node("root", vec![mid]));
        let doc = builder.finish();
        let skin = Skin {
            name: None,
            inverse_bind_matrices: vec![Mat4::IDENTITY; 3],
            skeleton: Some(root),
            joints: vec![root, mid, leaf],
        };
        (doc, skin)
    }

    #[test]
    fn builds_linear_chain_with_first_child_next_sibling_links() {
        let (doc, skin) = build_doc_with_chain();
        let armature = Armature::from_skin(&doc, &skin).unwrap();

        assert_eq!(armature.root_name.as_deref(), Some("root"));
        assert_eq!(armature.bones[0].child, BoneIndex::new(1));
        assert_eq!(armature.bones[1].parent, BoneIndex::new(0));
        assert_eq!(armature.bones[1].child, BoneIndex::new(2));
        assert_eq!(armature.bones[2].parent, BoneIndex::new(1));
        assert!(armature.bones[2].child.is_none());
        assert_eq!(armature.roots().collect::<Vec<_>>(), vec![BoneIndex::new(0)]);
    }

    #[test]
    fn child_outside_joint_list_is_silently_skipped() {
        let mut builder = DocumentBuilder::new();
        let outsider = builder.push_node(node("outsider", vec![]));
        let root = builder.push_node(node("root", vec![outsider]));
        let doc = builder.finish();
        let skin = Skin {
            name: None,
            inverse_bind_matrices: vec![Mat4::IDENTITY],
            skeleton: Some(root),
            joints: vec![root],
        };

        let armature = Armature::from_skin(&doc, &skin).unwrap();
        assert!(armature.bones[0].child.is_none());
    }

    #[test]
    fn mismatched_inverse_bind_matrix_count_is_rejected() {
        let (doc, mut skin) = build_doc_with_chain();
        skin.inverse_bind_matrices.pop();
        assert!(Armature::from_skin(&doc, &skin).is_err());
    }

    #[test]
    fn default_transforms_come_from_joint_node_trs() {
        let mut builder = DocumentBuilder::new();
        let mut moved = node("moved", vec![]);
        moved.transform.translation = Vec3::new(1.0, 2.0, 3.0);
        let root = builder.push_node(moved);
        let doc = builder.finish();
        let skin = Skin {
            name: None,
            inverse_bind_matrices: vec![Mat4::IDENTITY],
            skeleton: Some(root),
            joints: vec![root],
        };

        let armature = Armature::from_skin(&doc, &skin).unwrap();
        let (_, _, translation) = armature.default_transforms[0].to_scale_rotation_translation();
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
    }
}
