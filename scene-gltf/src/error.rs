use scene_json::{JsonError, SourceLocation};
use thiserror::Error;

/// Errors raised while framing a GLB container or constructing the asset
/// graph from its JSON chunk (spec §7: `glb_malformed`, `gltf_parse_error`,
/// `accessor_type_mismatch`, `image_decode_error`).
#[derive(Error, Debug)]
pub enum GltfError {
    #[error("malformed GLB container: {0}")]
    GlbMalformed(String),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error("{message}")]
    Parse { message: String },

    #[error("accessor type mismatch: {0}")]
    AccessorTypeMismatch(String),

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("external buffer URIs are not supported: {0}")]
    UnsupportedExternalBuffer(String),
}

impl GltfError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        GltfError::Parse {
            message: message.into(),
        }
    }

    /// Same as [`GltfError::parse`] but prefixes the JSON source location,
    /// when known, per spec §7's "carries the json location when available".
    pub(crate) fn parse_at(location: Option<&SourceLocation>, message: impl Into<String>) -> Self {
        let message = message.into();
        GltfError::Parse {
            message: match location {
                Some(loc) => format!("{loc}: {message}"),
                None => message,
            },
        }
    }
}
