use thiserror::Error;

/// Errors raised while building an [`crate::Armature`] or [`crate::SkelAnimation`],
/// or while evaluating a [`crate::Pose`] (spec §4.H/§4.I "skel_error").
#[derive(Error, Debug)]
pub enum SkelError {
    #[error("inverse bind matrix count ({found}) does not match joint count ({expected})")]
    InverseBindMatrixCountMismatch { expected: usize, found: usize },

    #[error("joint {0} has more than one parent in the joint hierarchy")]
    JointAlreadyHasParent(usize),

    #[error("armature has more than {max} bones ({found} joints)", max = crate::armature::MAX_BONES)]
    TooManyBones { found: usize },

    #[error("sampler output accessor type does not match its declared vector width: {0}")]
    SamplerTypeMismatch(String),

    #[error(transparent)]
    Gltf(#[from] scene_gltf::GltfError),
}
