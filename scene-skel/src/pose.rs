//! The pose accumulator (spec §4.J): per-bone weighted blending of zero or
//! more animations into a flat world-space matrix palette.
//!
//! Mirrors the original engine's `pose` class — one `(value, weight)`
//! accumulator per bone per channel path, folded by incremental weighted
//! average rather than a two-pass weighted sum, so `accumulate` can be
//! called any number of times in any order without remembering prior calls.

use glam::{Mat4, Quat, Vec3};

use crate::armature::{Armature, BoneIndex};
use crate::error::SkelError;
use crate::sampler::InterpolationParams;
use crate::SkelAnimation;

/// Folding epsilon below which an accumulator is treated as unset and
/// initialized directly from the first contribution, rather than blended
/// against a zero-weight garbage value (spec §4.J "if `w < ε`").
const WEIGHT_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct WeightedVec3 {
    value: Vec3,
    weight: f32,
}

impl WeightedVec3 {
    fn reset(value: Vec3) -> Self {
        Self { value, weight: 0.0 }
    }

    /// Incremental lerp fold (spec §4.J "Vec3 fold"): equivalent to a single
    /// weighted average over every contribution seen so far, without
    /// needing to remember them individually.
    fn fold(&mut self, x: Vec3, new_weight: f32) {
        if self.weight < WEIGHT_EPSILON {
            self.value = x;
        } else {
            let total = self.weight + new_weight;
            self.value = self.value.lerp(x, new_weight / total);
        }
        self.weight += new_weight;
    }
}

#[derive(Debug, Clone, Copy)]
struct WeightedQuat {
    value: Quat,
    weight: f32,
}

impl WeightedQuat {
    fn reset(value: Quat) -> Self {
        Self { value, weight: 0.0 }
    }

    /// Incremental slerp fold (spec §4.J "Vec4 fold"), using the same
    /// no-shortest-arc-flip [`crate::sampler::slerp_no_flip`] as the
    /// sampler evaluation itself, so a single full-weight `accumulate` call
    /// reproduces exactly what the sampler alone would have produced.
    fn fold(&mut self, x: Quat, new_weight: f32) {
        if self.weight < WEIGHT_EPSILON {
            self.value = x;
        } else {
            let total = self.weight + new_weight;
            self.value = crate::sampler::slerp_no_flip(self.value, x, new_weight / total);
        }
        self.weight += new_weight;
    }
}

#[derive(Debug, Clone, Copy)]
struct BoneAccumulator {
    translation: WeightedVec3,
    rotation: WeightedQuat,
    scale: WeightedVec3,
}

impl BoneAccumulator {
    fn from_default(transform: Mat4) -> Self {
        let (scale, rotation, translation) = transform.to_scale_rotation_translation();
        Self {
            translation: WeightedVec3::reset(translation),
            rotation: WeightedQuat::reset(rotation),
            scale: WeightedVec3::reset(scale),
        }
    }

    fn to_local_matrix(self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale.value, self.rotation.value, self.translation.value)
    }
}

/// A set of per-bone accumulators for one [`Armature`], producing a flat
/// world-space matrix palette once finalized (spec §3 "Pose state", §4.J).
///
/// `start` resets every accumulator to the armature's rest pose;
/// `accumulate` folds a weighted animation sample into the subtree rooted
/// at a named bone (or the whole armature by default); `finalize` composes
/// local matrices up the `child`/`peer` tree into world space and bakes in
/// each bone's inverse-bind matrix, memoizing the result until the next
/// `start`.
pub struct Pose {
    bones: Vec<BoneAccumulator>,
    default_transforms: Vec<Mat4>,
    inverse_bind_matrices: Vec<Mat4>,
    child: Vec<BoneIndex>,
    peer: Vec<BoneIndex>,
    roots: Vec<BoneIndex>,
    matrices: Option<Vec<Mat4>>,
}

impl Pose {
    /// Builds a pose over `armature`'s bones, already reset to its rest
    /// pose (equivalent to a fresh `start`).
    pub fn new(armature: &Armature) -> Pose {
        let mut pose = Pose {
            bones: Vec::new(),
            default_transforms: armature.default_transforms.clone(),
            inverse_bind_matrices: armature.inverse_bind_matrices.clone(),
            child: armature.bones.iter().map(|b| b.child).collect(),
            peer: armature.bones.iter().map(|b| b.peer).collect(),
            roots: armature.roots().collect(),
            matrices: None,
        };
        pose.start();
        pose
    }

    /// Resets every accumulator's weight to zero and its value to the
    /// armature's rest pose. Idempotent; `O(bones)` (spec §4.J).
    pub fn start(&mut self) {
        self.bones = self
            .default_transforms
            .iter()
            .map(|&m| BoneAccumulator::from_default(m))
            .collect();
        self.matrices = None;
    }

    /// Folds `animation` sampled at `time`, weighted by `weight`, into the
    /// subtree rooted at `root` (or the whole armature when `root` is
    /// `None`). Unsupported sampler/path combinations were already rejected
    /// at [`SkelAnimation::from_gltf`] construction time; a channel
    /// targeting a node absent from this armature is silently skipped, per
    /// spec §4.J.
    pub fn accumulate(
        &mut self,
        armature: &Armature,
        animation: &SkelAnimation,
        time: f32,
        weight: f32,
        root: Option<BoneIndex>,
    ) -> Result<(), SkelError> {
        tracing::trace!(
            animation = ?animation.name,
            time,
            weight,
            root = ?root.and_then(BoneIndex::get),
            "skel: accumulating pose"
        );
        let params: Vec<Option<InterpolationParams>> = (0..animation.axis_count())
            .map(|axis| {
                let axis_times = animation.axis(axis);
                if axis_times.is_empty() {
                    None
                } else {
                    Some(InterpolationParams::new(axis_times, time))
                }
            })
            .collect();

        match root {
            Some(subtree_root) => self.accumulate_subtree(armature, animation, &params, weight, subtree_root),
            // No explicit root: the whole armature, which may be more than
            // one tree if the skin's joint list is itself a forest.
            None => {
                for bone_root in self.roots.clone() {
                    self.accumulate_subtree(armature, animation, &params, weight, bone_root);
                }
            }
        }
        self.matrices = None;
        Ok(())
    }

    fn accumulate_subtree(
        &mut self,
        armature: &Armature,
        animation: &SkelAnimation,
        params: &[Option<InterpolationParams>],
        weight: f32,
        bone: BoneIndex,
    ) {
        let Some(index) = bone.get() else { return };
        let node = armature.bones[index].node;

        for &channel_index in animation.channels_for_node(node) {
            let channel = &animation.channels()[channel_index];
            let Some(p) = &params[channel.axis] else { continue };
            match channel.path {
                scene_gltf::ChannelPath::Translation => {
                    if let Some(v) = channel.sampler.eval_vec3(p) {
                        self.bones[index].translation.fold(v, weight);
                    }
                }
                scene_gltf::ChannelPath::Scale => {
                    if let Some(v) = channel.sampler.eval_vec3(p) {
                        self.bones[index].scale.fold(v, weight);
                    }
                }
                scene_gltf::ChannelPath::Rotation => {
                    if let Some(v) = channel.sampler.eval_rotation(p) {
                        self.bones[index].rotation.fold(v, weight);
                    }
                }
            }
        }

        let mut child = armature.bones[index].child;
        while let Some(child_index) = child.get() {
            self.accumulate_subtree(armature, animation, params, weight, child);
            child = armature.bones[child_index].peer;
        }
    }

    /// Converts each bone's accumulator to a local matrix, composes world
    /// matrices in DFS pre-order, and bakes in each bone's inverse-bind
    /// matrix (spec §4.J `finalize`). Memoized until the next `start`;
    /// returns exactly `armature.bones.len()` matrices.
    pub fn finalize(&mut self) -> &[Mat4] {
        if self.matrices.is_none() {
            let mut world = vec![Mat4::IDENTITY; self.bones.len()];
            for &root in &self.roots {
                self.finalize_subtree(&mut world, root, Mat4::IDENTITY);
            }
            let out = world
                .iter()
                .zip(&self.inverse_bind_matrices)
                .map(|(&w, &inv_bind)| w * inv_bind)
                .collect();
            self.matrices = Some(out);
        }
        self.matrices.as_deref().expect("just computed")
    }

    /// DFS pre-order: a parent's world matrix is always finalized before
    /// any descendant reads it, by construction of the recursion.
    fn finalize_subtree(&self, world: &mut [Mat4], bone: BoneIndex, parent_world: Mat4) {
        let Some(index) = bone.get() else { return };
        let local = self.bones[index].to_local_matrix();
        let this_world = parent_world * local;
        world[index] = this_world;

        let mut child = self.child[index];
        while let Some(child_index) = child.get() {
            self.finalize_subtree(world, child, this_world);
            child = self.peer[child_index];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pretty_assertions::assert_eq;
    use scene_gltf::{Document, NodeId, Skin};

    fn glb_with_linear_translation_chain() -> Vec<u8> {
        let times: [f32; 2] = [0.0, 1.0];
        let translations: [f32; 6] = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0];

        let mut bin = Vec::new();
        let times_offset = bin.len();
        for v in times {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        let translations_offset = bin.len();
        for v in translations {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        let byte_length = bin.len();

        let json = format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "buffers": [{{"byteLength": {byte_length}}}],
                "bufferViews": [
                    {{"buffer": 0, "byteOffset": {times_offset}, "byteLength": 8}},
                    {{"buffer": 0, "byteOffset": {translations_offset}, "byteLength": 24}}
                ],
                "accessors": [
                    {{"bufferView": 0, "componentType": 5126, "type": "SCALAR", "count": 2}},
                    {{"bufferView": 1, "componentType": 5126, "type": "VEC3", "count": 2}}
                ],
                "nodes": [
                    {{"name": "A", "children": [1]}},
                    {{"name": "B", "children": [2]}},
                    {{"name": "C"}}
                ],
                "skins": [{{"joints": [0, 1, 2]}}],
                "animations": [{{
                    "samplers": [{{"input": 0, "output": 1, "interpolation": "LINEAR"}}],
                    "channels": [{{"sampler": 0, "target": {{"node": 1, "path": "translation"}}}}]
                }}]
            }}"#
        );

        let mut out = Vec::new();
        let json_bytes = json.as_bytes();
        let total_len = 12 + 8 + json_bytes.len() + 8 + bin.len();
        out.extend_from_slice(&0x4654_6C67u32.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total_len as u32).to_le_bytes());
        out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
        out.extend_from_slice(json_bytes);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
        out.extend_from_slice(&bin);
        out
    }

    fn build() -> (Armature, SkelAnimation) {
        let glb = glb_with_linear_translation_chain();
        let doc = Document::from_glb(&glb, "pose.glb").unwrap();
        let skin: &Skin = &doc.skins()[0];
        let armature = Armature::from_skin(&doc, skin).unwrap();
        let animation = SkelAnimation::from_gltf(&doc, &doc.animations()[0]).unwrap();
        (armature, animation)
    }

    #[test]
    fn rest_pose_matches_identity_default_transforms() {
        let (armature, _animation) = build();
        let mut pose = Pose::new(&armature);
        let matrices = pose.finalize();
        assert_eq!(matrices.len(), 3);
        for m in matrices {
            assert_eq!(*m, Mat4::IDENTITY);
        }
    }

    #[test]
    fn single_animation_blends_translation_and_propagates_to_children() {
        let (armature, animation) = build();
        let mut pose = Pose::new(&armature);
        pose.accumulate(&armature, &animation, 0.25, 1.0, None).unwrap();
        let matrices = pose.finalize();

        let (_, _, b_translation) = matrices[1].to_scale_rotation_translation();
        assert!((b_translation - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);

        let (_, _, c_translation) = matrices[2].to_scale_rotation_translation();
        assert!((c_translation - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn full_weight_accumulate_matches_partial_weight_on_fully_driven_subtree() {
        let (armature, animation) = build();

        let mut full = Pose::new(&armature);
        full.accumulate(&armature, &animation, 0.6, 1.0, None).unwrap();

        let mut partial = Pose::new(&armature);
        partial.accumulate(&armature, &animation, 0.6, 0.3, None).unwrap();

        let full_matrices = full.finalize().to_vec();
        let partial_matrices = partial.finalize().to_vec();
        for (a, b) in full_matrices.iter().zip(partial_matrices.iter()) {
            assert!((*a - *b).to_cols_array().iter().zip(b.to_cols_array()).all(|(x, y)| (x - y).abs() < 1e-5));
        }
    }
}
