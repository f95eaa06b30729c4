//! Small accessors over [`scene_json::Value`] used by every entity
//! constructor in [`crate::document`] to pull a typed, possibly-defaulted
//! field out of a JSON object, raising [`GltfError::Parse`] with a message
//! naming the offending field when the document doesn't match spec §6's
//! schema.
//!
//! glTF's boolean-valued keys (`accessor.normalized`, `material
//! .doubleSided`, ...) are read as a JSON number here, treating any nonzero
//! value as `true`. `scene_json`'s decoder — a faithful port of the
//! engine's own single-pass reader — never recognizes bare `true`/`false`
//! tokens (see that crate's docs), so a document that spells a boolean
//! field as a literal JSON boolean fails during JSON parsing itself, before
//! reaching these helpers; this mirrors a limitation of the engine being
//! ported rather than introducing a new one. See DESIGN.md.

use scene_json::{JsonObject, Value};

use crate::error::GltfError;

pub fn required_object<'a>(obj: &'a JsonObject, key: &str, owner: &str) -> Result<&'a JsonObject, GltfError> {
    obj.get(key)
        .ok_or_else(|| GltfError::parse(format!("{owner}: missing required field `{key}`")))?
        .as_object()
        .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected an object")))
}

pub fn opt_object<'a>(obj: &'a JsonObject, key: &str, owner: &str) -> Result<Option<&'a JsonObject>, GltfError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Object(o)) => Ok(Some(o)),
        Some(_) => Err(GltfError::parse(format!("{owner}.{key}: expected an object"))),
    }
}

pub fn required_array<'a>(obj: &'a JsonObject, key: &str, owner: &str) -> Result<&'a [Value], GltfError> {
    obj.get(key)
        .ok_or_else(|| GltfError::parse(format!("{owner}: missing required field `{key}`")))?
        .as_array()
        .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected an array")))
}

pub fn opt_array<'a>(obj: &'a JsonObject, key: &str, owner: &str) -> Result<&'a [Value], GltfError> {
    match obj.get(key) {
        None => Ok(&[]),
        Some(Value::Array(a)) => Ok(a),
        Some(_) => Err(GltfError::parse(format!("{owner}.{key}: expected an array"))),
    }
}

pub fn required_str(obj: &JsonObject, key: &str, owner: &str) -> Result<String, GltfError> {
    obj.get(key)
        .ok_or_else(|| GltfError::parse(format!("{owner}: missing required field `{key}`")))?
        .as_str()
        .map(|s| s.as_str_lossy().into_owned())
        .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected a string")))
}

pub fn opt_str(obj: &JsonObject, key: &str, owner: &str) -> Result<Option<String>, GltfError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str_lossy().into_owned())),
        Some(_) => Err(GltfError::parse(format!("{owner}.{key}: expected a string"))),
    }
}

pub fn required_usize(obj: &JsonObject, key: &str, owner: &str) -> Result<usize, GltfError> {
    let n = obj
        .get(key)
        .ok_or_else(|| GltfError::parse(format!("{owner}: missing required field `{key}`")))?
        .as_number()
        .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected a number")))?;
    Ok(n.as_int().max(0) as usize)
}

pub fn opt_usize(obj: &JsonObject, key: &str, owner: &str, default: usize) -> Result<usize, GltfError> {
    match obj.get(key) {
        None => Ok(default),
        Some(v) => {
            let n = v
                .as_number()
                .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected a number")))?;
            Ok(n.as_int().max(0) as usize)
        }
    }
}

pub fn opt_f32(obj: &JsonObject, key: &str, owner: &str, default: f32) -> Result<f32, GltfError> {
    match obj.get(key) {
        None => Ok(default),
        Some(v) => {
            let n = v
                .as_number()
                .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected a number")))?;
            Ok(n.as_float() as f32)
        }
    }
}

pub fn opt_bool(obj: &JsonObject, key: &str, _owner: &str, default: bool) -> Result<bool, GltfError> {
    match obj.get(key) {
        None => Ok(default),
        Some(v) => Ok(v.as_number().map(|n| n.as_int() != 0).unwrap_or(default)),
    }
}

/// Reads a fixed-size `f32` array field (e.g. `translation`, `rotation`,
/// `baseColorFactor`), falling back to `default` when the key is absent.
pub fn opt_f32_array<const N: usize>(
    obj: &JsonObject,
    key: &str,
    owner: &str,
    default: [f32; N],
) -> Result<[f32; N], GltfError> {
    let Some(value) = obj.get(key) else {
        return Ok(default);
    };
    let array = value
        .as_array()
        .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected an array")))?;
    if array.len() != N {
        return Err(GltfError::parse(format!(
            "{owner}.{key}: expected {N} elements, found {}",
            array.len()
        )));
    }
    let mut result = default;
    for (i, slot) in result.iter_mut().enumerate() {
        *slot = array[i]
            .as_number()
            .ok_or_else(|| GltfError::parse(format!("{owner}.{key}[{i}]: expected a number")))?
            .as_float() as f32;
    }
    Ok(result)
}

/// Reads a required array-of-indices field (`node.children`, `skin.joints`,
/// `scene.nodes`) as plain `usize`es; bounds-checking against the arena
/// they index into is the caller's job (the owning array isn't known here).
pub fn index_array(obj: &JsonObject, key: &str, owner: &str) -> Result<Vec<usize>, GltfError> {
    opt_array(obj, key, owner)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_number()
                .map(|n| n.as_int().max(0) as usize)
                .ok_or_else(|| GltfError::parse(format!("{owner}.{key}[{i}]: expected a number")))
        })
        .collect()
}

/// Checks a JSON index against the length of the arena it must resolve
/// into, returning the bounds-checked `usize` on success.
pub fn check_index(i: usize, len: usize, owner: &str, field: &str) -> Result<usize, GltfError> {
    if i >= len {
        return Err(GltfError::parse(format!(
            "{owner}.{field}: index {i} out of range (len {len})"
        )));
    }
    Ok(i)
}
