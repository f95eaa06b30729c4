//! Skeletal animation evaluation (spec §4.H/§4.I/§4.J): an armature derived
//! from a glTF skin, STEP/LINEAR/CUBICSPLINE samplers coalesced onto shared
//! time axes, and a pose accumulator that blends weighted animation samples
//! into a flat world-space bone-matrix palette.

mod animation;
mod armature;
mod error;
mod pose;
mod sampler;

pub use animation::{BoneChannel, SkelAnimation};
pub use armature::{Armature, ArmatureBone, BoneIndex, MAX_BONES};
pub use error::SkelError;
pub use pose::Pose;
pub use sampler::{slerp_no_flip, CubicKey, InterpolationParams, Sampler};
