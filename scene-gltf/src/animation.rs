use crate::ids::{AccessorId, AnimationSamplerId, NodeId};

/// The three interpolation kinds a sampler declares (spec §3/§4.I).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LINEAR" => Some(Interpolation::Linear),
            "STEP" => Some(Interpolation::Step),
            "CUBICSPLINE" => Some(Interpolation::CubicSpline),
            _ => None,
        }
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Linear
    }
}

/// The pairing of an input time axis and an output value stream (spec §3).
/// Distinct samplers that share `input` are coalesced by `scene-skel`'s
/// pose accumulator, not here — the document keeps every sampler as
/// declared.
#[derive(Debug, Clone, Copy)]
pub struct AnimationSampler {
    pub input: AccessorId,
    pub output: AccessorId,
    pub interpolation: Interpolation,
}

/// The animated property a channel drives (spec §6 `channel.target.path`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPath {
    Translation,
    Rotation,
    Scale,
}

impl ChannelPath {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "translation" => Some(ChannelPath::Translation),
            "rotation" => Some(ChannelPath::Rotation),
            "scale" => Some(ChannelPath::Scale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationChannelTarget {
    pub node: Option<NodeId>,
    pub path: ChannelPath,
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationChannel {
    pub sampler: AnimationSamplerId,
    pub target: AnimationChannelTarget,
}

#[derive(Debug, Clone)]
pub struct Animation {
    pub name: Option<String>,
    pub samplers: Vec<AnimationSampler>,
    pub channels: Vec<AnimationChannel>,
}
