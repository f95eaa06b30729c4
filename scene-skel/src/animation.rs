use std::collections::HashMap;

use glam::{Quat, Vec3, Vec4};
use scene_gltf::{
    Accessor, AccessorId, Animation, AttributeType, ChannelPath, Document, Interpolation, NodeId,
};

use crate::error::SkelError;
use crate::sampler::{CubicKey, Sampler};

/// One channel of a [`SkelAnimation`], resolved to the node it targets and
/// the time axis it shares with other channels (spec §4.I "coalesced").
#[derive(Debug, Clone)]
pub struct BoneChannel {
    pub node: NodeId,
    pub path: ChannelPath,
    pub axis: usize,
    pub sampler: Sampler,
}

/// An [`Animation`](scene_gltf::Animation), decoded into typed samplers and
/// grouped by the node each channel drives (spec §4.H/§4.I). Distinct
/// channels that share an `input` accessor share one entry in `axes`, so a
/// pose evaluation computes `InterpolationParams` once per axis rather than
/// once per channel.
#[derive(Debug, Clone)]
pub struct SkelAnimation {
    pub name: Option<String>,
    axes: Vec<Vec<f32>>,
    channels: Vec<BoneChannel>,
    by_node: HashMap<NodeId, Vec<usize>>,
}

impl SkelAnimation {
    pub fn from_gltf(doc: &Document, animation: &Animation) -> Result<SkelAnimation, SkelError> {
        let mut axes: Vec<Vec<f32>> = Vec::new();
        let mut axis_of_input: HashMap<AccessorId, usize> = HashMap::new();
        let mut channels = Vec::with_capacity(animation.channels.len());
        let mut by_node: HashMap<NodeId, Vec<usize>> = HashMap::new();

        for channel in &animation.channels {
            let Some(node) = channel.target.node else {
                continue;
            };
            let gltf_sampler = &animation.samplers[channel.sampler.index()];

            let axis = *axis_of_input.entry(gltf_sampler.input).or_insert_with(|| {
                let index = axes.len();
                axes.push(Vec::new());
                index
            });
            if axes[axis].is_empty() {
                axes[axis] = doc.accessor(gltf_sampler.input).read_scalars(doc)?;
            }

            let sampler = build_sampler(doc, channel.target.path, gltf_sampler)?;

            let channel_index = channels.len();
            channels.push(BoneChannel {
                node,
                path: channel.target.path,
                axis,
                sampler,
            });
            by_node.entry(node).or_default().push(channel_index);
        }

        Ok(SkelAnimation {
            name: animation.name.clone(),
            axes,
            channels,
            by_node,
        })
    }

    pub fn axis(&self, index: usize) -> &[f32] {
        &self.axes[index]
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn channels(&self) -> &[BoneChannel] {
        &self.channels
    }

    /// Channels targeting `node`, if any (spec §4.J: "referencing an
    /// animation whose targets are not in the armature is silently ignored
    /// per channel" — callers simply find nothing here for such nodes).
    pub fn channels_for_node(&self, node: NodeId) -> &[usize] {
        self.by_node.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn check_shape(accessor: &Accessor, expected: AttributeType) -> Result<(), SkelError> {
    if accessor.type_ != expected {
        return Err(SkelError::SamplerTypeMismatch(format!(
            "expected a {expected:?} sampler output, found {:?}",
            accessor.type_
        )));
    }
    Ok(())
}

fn as_quat(v: Vec4) -> Quat {
    Quat::from_xyzw(v.x, v.y, v.z, v.w)
}

fn chunk3<T, U>(values: Vec<T>, make: impl Fn(T, T, T) -> U) -> Result<Vec<U>, SkelError>
where
    T: Copy,
{
    if values.len() % 3 != 0 {
        return Err(SkelError::SamplerTypeMismatch(
            "CUBICSPLINE output length is not a multiple of 3".to_string(),
        ));
    }
    Ok(values
        .chunks_exact(3)
        .map(|chunk| make(chunk[0], chunk[1], chunk[2]))
        .collect())
}

fn build_sampler(
    doc: &Document,
    path: ChannelPath,
    sampler: &scene_gltf::AnimationSampler,
) -> Result<Sampler, SkelError> {
    let output = doc.accessor(sampler.output);

    match (sampler.interpolation, path) {
        (Interpolation::Step, ChannelPath::Translation | ChannelPath::Scale) => {
            check_shape(output, AttributeType::Vec3)?;
            Ok(Sampler::Step3(output.read_vec3(doc)?))
        }
        (Interpolation::Step, ChannelPath::Rotation) => {
            check_shape(output, AttributeType::Vec4)?;
            Ok(Sampler::Step4(output.read_vec4(doc)?))
        }
        (Interpolation::Linear, ChannelPath::Translation | ChannelPath::Scale) => {
            check_shape(output, AttributeType::Vec3)?;
            Ok(Sampler::Linear3(output.read_vec3(doc)?))
        }
        (Interpolation::Linear, ChannelPath::Rotation) => {
            check_shape(output, AttributeType::Vec4)?;
            let raw = output.read_vec4(doc)?;
            Ok(Sampler::LinearRotation(raw.into_iter().map(as_quat).collect()))
        }
        (Interpolation::CubicSpline, ChannelPath::Translation | ChannelPath::Scale) => {
            check_shape(output, AttributeType::Vec3)?;
            let raw: Vec<Vec3> = output.read_vec3(doc)?;
            let keys = chunk3(raw, |a, b, c| CubicKey {
                in_tangent: a,
                value: b,
                out_tangent: c,
            })?;
            Ok(Sampler::Cubic3(keys))
        }
        (Interpolation::CubicSpline, ChannelPath::Rotation) => {
            check_shape(output, AttributeType::Vec4)?;
            let raw: Vec<Vec4> = output.read_vec4(doc)?;
            let keys = chunk3(raw, |a, b, c| CubicKey {
                in_tangent: as_quat(a),
                value: as_quat(b),
                out_tangent: as_quat(c),
            })?;
            Ok(Sampler::CubicRotation(keys))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    /// Builds a tiny GLB with two joints ("root", "child") and one
    /// animation whose translation and rotation channels on "root" both
    /// quote input accessor 0, so the two channels should coalesce onto a
    /// single time axis.
    fn glb_with_shared_time_axis() -> Vec<u8> {
        let times: [f32; 2] = [0.0, 1.0];
        let translations: [f32; 6] = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let rotations: [f32; 8] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let mut bin = Vec::new();
        let times_offset = bin.len();
        for v in times {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        let translations_offset = bin.len();
        for v in translations {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        let rotations_offset = bin.len();
        for v in rotations {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        let byte_length = bin.len();

        let json = format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "buffers": [{{"byteLength": {byte_length}}}],
                "bufferViews": [
                    {{"buffer": 0, "byteOffset": {times_offset}, "byteLength": 8}},
                    {{"buffer": 0, "byteOffset": {translations_offset}, "byteLength": 24}},
                    {{"buffer": 0, "byteOffset": {rotations_offset}, "byteLength": 32}}
                ],
                "accessors": [
                    {{"bufferView": 0, "componentType": 5126, "type": "SCALAR", "count": 2}},
                    {{"bufferView": 1, "componentType": 5126, "type": "VEC3", "count": 2}},
                    {{"bufferView": 2, "componentType": 5126, "type": "VEC4", "count": 2}}
                ],
                "nodes": [{{"name": "root"}}],
                "animations": [{{
                    "samplers": [
                        {{"input": 0, "output": 1, "interpolation": "LINEAR"}},
                        {{"input": 0, "output": 2, "interpolation": "LINEAR"}}
                    ],
                    "channels": [
                        {{"sampler": 0, "target": {{"node": 0, "path": "translation"}}}},
                        {{"sampler": 1, "target": {{"node": 0, "path": "rotation"}}}}
                    ]
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

    #[test]
    fn coalesces_channels_sharing_the_same_input_accessor() {
        let glb = glb_with_shared_time_axis();
        let doc = Document::from_glb(&glb, "anim.glb").unwrap();
        let animation = SkelAnimation::from_gltf(&doc, &doc.animations()[0]).unwrap();

        assert_eq!(animation.axis_count(), 1);
        assert_eq!(animation.channels().len(), 2);
        assert_eq!(animation.axis(0), &[0.0, 1.0]);
    }

    #[test]
    fn step_vec3_sampler_reads_output_directly() {
        let glb = glb_with_shared_time_axis();
        let doc = Document::from_glb(&glb, "anim.glb").unwrap();
        let animation = SkelAnimation::from_gltf(&doc, &doc.animations()[0]).unwrap();

        let params = crate::sampler::InterpolationParams::new(animation.axis(0), 0.0);
        let translation_channel = &animation.channels()[0];
        assert_eq!(translation_channel.sampler.eval_vec3(&params), Some(Vec3::ZERO));
    }
}
