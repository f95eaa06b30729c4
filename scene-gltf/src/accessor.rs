use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::document::Document;
use crate::error::GltfError;
use crate::ids::{AccessorId, BufferViewId};

/// glTF's six accessor component encodings (spec §3), carrying their
/// numeric codes from the glTF GL-enum namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Byte,
    UByte,
    Short,
    UShort,
    UInt,
    Float,
}

impl ComponentType {
    pub fn from_code(code: i64) -> Result<Self, GltfError> {
        match code {
            5120 => Ok(ComponentType::Byte),
            5121 => Ok(ComponentType::UByte),
            5122 => Ok(ComponentType::Short),
            5123 => Ok(ComponentType::UShort),
            5125 => Ok(ComponentType::UInt),
            5126 => Ok(ComponentType::Float),
            other => Err(GltfError::parse(format!(
                "unknown accessor componentType {other}"
            ))),
        }
    }

    pub fn size(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UByte => 1,
            ComponentType::Short | ComponentType::UShort => 2,
            ComponentType::UInt | ComponentType::Float => 4,
        }
    }
}

/// glTF's seven accessor shapes (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AttributeType {
    pub fn from_str(s: &str) -> Result<Self, GltfError> {
        match s {
            "SCALAR" => Ok(AttributeType::Scalar),
            "VEC2" => Ok(AttributeType::Vec2),
            "VEC3" => Ok(AttributeType::Vec3),
            "VEC4" => Ok(AttributeType::Vec4),
            "MAT2" => Ok(AttributeType::Mat2),
            "MAT3" => Ok(AttributeType::Mat3),
            "MAT4" => Ok(AttributeType::Mat4),
            other => Err(GltfError::parse(format!("unknown accessor type {other:?}"))),
        }
    }

    pub fn components(self) -> usize {
        match self {
            AttributeType::Scalar => 1,
            AttributeType::Vec2 => 2,
            AttributeType::Vec3 => 3,
            AttributeType::Vec4 | AttributeType::Mat2 => 4,
            AttributeType::Mat3 => 9,
            AttributeType::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SparseIndices {
    pub buffer_view: BufferViewId,
    pub byte_offset: usize,
    pub component_type: ComponentType,
}

#[derive(Debug, Clone, Copy)]
pub struct SparseValues {
    pub buffer_view: BufferViewId,
    pub byte_offset: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
}

/// A typed, strided view into a [`crate::BufferView`] (spec §3, §4.E).
#[derive(Debug, Clone)]
pub struct Accessor {
    pub name: Option<String>,
    pub buffer_view: BufferViewId,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub type_: AttributeType,
    pub count: usize,
    pub normalized: bool,
    pub sparse: Option<Sparse>,
}

impl Accessor {
    pub fn component_size(&self) -> usize {
        self.component_type.size()
    }

    pub fn components_per_attribute(&self) -> usize {
        self.type_.components()
    }

    pub fn attribute_size(&self) -> usize {
        self.component_size() * self.components_per_attribute()
    }

    /// The byte distance between consecutive elements: the owning
    /// `bufferView`'s stride if it declares a nonzero one, else a tightly
    /// packed `attribute_size`.
    pub fn stride(&self, buffer_view: &crate::BufferView) -> usize {
        if buffer_view.byte_stride != 0 {
            buffer_view.byte_stride
        } else {
            self.attribute_size()
        }
    }

    fn check_shape(&self, expected: AttributeType) -> Result<(), GltfError> {
        if self.type_ != expected {
            return Err(GltfError::AccessorTypeMismatch(format!(
                "expected a {expected:?} accessor, found {:?}",
                self.type_
            )));
        }
        Ok(())
    }

    /// Maps each sparsely-overridden element index to its row in
    /// `sparse.values`, per spec §4.E ("the substitution is applied after
    /// the strided read and before numeric conversion").
    fn sparse_overrides(&self, doc: &Document) -> Result<HashMap<usize, usize>, GltfError> {
        let Some(sparse) = &self.sparse else {
            return Ok(HashMap::new());
        };
        let indices_bv = doc.buffer_view(sparse.indices.buffer_view);
        let indices_buf = doc.buffer(indices_bv.buffer);
        let index_size = sparse.indices.component_type.size();
        let index_stride = if indices_bv.byte_stride != 0 {
            indices_bv.byte_stride
        } else {
            index_size
        };

        let mut overrides = HashMap::with_capacity(sparse.count);
        for row in 0..sparse.count {
            let start = indices_bv.byte_offset + sparse.indices.byte_offset + row * index_stride;
            let bytes = indices_buf
                .bytes
                .get(start..start + index_size)
                .ok_or_else(|| GltfError::parse("sparse accessor indices are out of bounds"))?;
            let element_index = zero_extend_u32(read_raw(bytes, sparse.indices.component_type))? as usize;
            overrides.insert(element_index, row);
        }
        Ok(overrides)
    }

    fn element_bytes<'d>(
        &self,
        doc: &'d Document,
        i: usize,
        overrides: &HashMap<usize, usize>,
    ) -> Result<&'d [u8], GltfError> {
        let size = self.attribute_size();

        if let Some(&row) = overrides.get(&i) {
            let sparse = self.sparse.as_ref().expect("override implies sparse");
            let values_bv = doc.buffer_view(sparse.values.buffer_view);
            let buf = doc.buffer(values_bv.buffer);
            let start = values_bv.byte_offset + sparse.values.byte_offset + row * size;
            return buf
                .bytes
                .get(start..start + size)
                .ok_or_else(|| GltfError::parse("sparse accessor values are out of bounds"));
        }

        let bv = doc.buffer_view(self.buffer_view);
        let buf = doc.buffer(bv.buffer);
        let stride = self.stride(bv);
        let start = bv.byte_offset + self.byte_offset + i * stride;
        buf.bytes
            .get(start..start + size)
            .ok_or_else(|| GltfError::parse("accessor element is out of bounds"))
    }

    /// Extracts the accessor as `count` scalar floats (SCALAR, e.g. an
    /// animation sampler's input time axis).
    pub fn read_scalars(&self, doc: &Document) -> Result<Vec<f32>, GltfError> {
        self.check_shape(AttributeType::Scalar)?;
        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let mut out = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            out.push(logical_float(
                read_raw(&bytes[0..cs], self.component_type),
                self.component_type,
                self.normalized,
            )?);
        }
        Ok(out)
    }

    /// Extracts the accessor as `count` `Vec2`s (VEC2, e.g. TEXCOORD_n).
    pub fn read_vec2(&self, doc: &Document) -> Result<Vec<Vec2>, GltfError> {
        self.check_shape(AttributeType::Vec2)?;
        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let mut out = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            let mut v = [0f32; 2];
            for (j, slot) in v.iter_mut().enumerate() {
                *slot = logical_float(
                    read_raw(&bytes[j * cs..(j + 1) * cs], self.component_type),
                    self.component_type,
                    self.normalized,
                )?;
            }
            out.push(Vec2::new(v[0], v[1]));
        }
        Ok(out)
    }

    /// Extracts the accessor as `count` `Vec3`s (VEC3, e.g. POSITION,
    /// NORMAL, or a translation/scale animation channel's output).
    pub fn read_vec3(&self, doc: &Document) -> Result<Vec<Vec3>, GltfError> {
        self.check_shape(AttributeType::Vec3)?;
        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let mut out = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            let mut v = [0f32; 3];
            for (j, slot) in v.iter_mut().enumerate() {
                *slot = logical_float(
                    read_raw(&bytes[j * cs..(j + 1) * cs], self.component_type),
                    self.component_type,
                    self.normalized,
                )?;
            }
            out.push(Vec3::new(v[0], v[1], v[2]));
        }
        Ok(out)
    }

    /// Extracts the accessor as `count` `Vec4`s (VEC4, e.g. TANGENT,
    /// WEIGHTS_0, or a rotation animation channel's output, treated as a
    /// quaternion by callers in `scene-skel`).
    pub fn read_vec4(&self, doc: &Document) -> Result<Vec<Vec4>, GltfError> {
        self.check_shape(AttributeType::Vec4)?;
        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let mut out = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            let mut v = [0f32; 4];
            for (j, slot) in v.iter_mut().enumerate() {
                *slot = logical_float(
                    read_raw(&bytes[j * cs..(j + 1) * cs], self.component_type),
                    self.component_type,
                    self.normalized,
                )?;
            }
            out.push(Vec4::new(v[0], v[1], v[2], v[3]));
        }
        Ok(out)
    }

    /// Extracts the accessor as `count` row-major... actually column-major
    /// glTF matrices (MAT4, e.g. a skin's `inverseBindMatrices`).
    pub fn read_mat4(&self, doc: &Document) -> Result<Vec<Mat4>, GltfError> {
        self.check_shape(AttributeType::Mat4)?;
        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let mut out = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            let mut v = [0f32; 16];
            for (j, slot) in v.iter_mut().enumerate() {
                *slot = logical_float(
                    read_raw(&bytes[j * cs..(j + 1) * cs], self.component_type),
                    self.component_type,
                    self.normalized,
                )?;
            }
            out.push(Mat4::from_cols_array(&v));
        }
        Ok(out)
    }

    /// Extracts the accessor as `count` zero-extended `u32` indices
    /// (SCALAR, non-normalized integer source only — the mesh index
    /// buffer and `JOINTS_0`, per spec §4.E's "target is an integer type
    /// and normalized=false" rule).
    pub fn read_indices(&self, doc: &Document) -> Result<Vec<u32>, GltfError> {
        self.check_shape(AttributeType::Scalar)?;
        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let mut out = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            out.push(zero_extend_u32(read_raw(&bytes[0..cs], self.component_type))?);
        }
        Ok(out)
    }

    /// Appends `count` tightly-packed attributes to `out`, converting each
    /// component from this accessor's source encoding to
    /// `target_component_type`/`target_attribute_type` (spec §4.E "Raw
    /// dump for GPU upload"). The resulting slice is exactly
    /// `count * components(target_attribute_type) * size(target_component_type)`
    /// bytes long.
    pub fn dump(
        &self,
        doc: &Document,
        out: &mut Vec<u8>,
        target_component_type: ComponentType,
        target_attribute_type: AttributeType,
    ) -> Result<(), GltfError> {
        if target_attribute_type.components() != self.components_per_attribute() {
            return Err(GltfError::AccessorTypeMismatch(format!(
                "dump target has {} components, accessor has {}",
                target_attribute_type.components(),
                self.components_per_attribute()
            )));
        }

        let overrides = self.sparse_overrides(doc)?;
        let cs = self.component_size();
        let cpa = self.components_per_attribute();
        out.reserve(self.count * cpa * target_component_type.size());

        for i in 0..self.count {
            let bytes = self.element_bytes(doc, i, &overrides)?;
            for j in 0..cpa {
                let raw = read_raw(&bytes[j * cs..(j + 1) * cs], self.component_type);
                out.extend_from_slice(&self.dump_component(raw, target_component_type)?);
            }
        }
        Ok(())
    }

    fn dump_component(&self, raw: RawComponent, target: ComponentType) -> Result<Vec<u8>, GltfError> {
        if target == ComponentType::Float {
            let value = logical_float(raw, self.component_type, self.normalized)?;
            return Ok(value.to_le_bytes().to_vec());
        }
        if !self.normalized {
            let value = zero_extend_u32(raw)?;
            return encode_uint(value, target);
        }
        let value = logical_float(raw, self.component_type, true)?;
        quantize_component(value, target)
    }
}

#[derive(Debug, Clone, Copy)]
enum RawComponent {
    Int(i64),
    UInt(u64),
    Float(f64),
}

fn read_raw(bytes: &[u8], component_type: ComponentType) -> RawComponent {
    match component_type {
        ComponentType::Byte => RawComponent::Int(bytes[0] as i8 as i64),
        ComponentType::UByte => RawComponent::UInt(bytes[0] as u64),
        ComponentType::Short => RawComponent::Int(i16::from_le_bytes([bytes[0], bytes[1]]) as i64),
        ComponentType::UShort => RawComponent::UInt(u16::from_le_bytes([bytes[0], bytes[1]]) as u64),
        ComponentType::UInt => {
            RawComponent::UInt(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64)
        }
        ComponentType::Float => {
            RawComponent::Float(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64)
        }
    }
}

/// Implements spec §4.E's float-target conversion rules: a float source
/// passes through bitwise; a normalized integer source is divided by its
/// type's max (clamped at -1 for the signed forms); a non-normalized
/// integer source has no defined float conversion.
fn logical_float(raw: RawComponent, component_type: ComponentType, normalized: bool) -> Result<f32, GltfError> {
    match raw {
        RawComponent::Float(f) => Ok(f as f32),
        RawComponent::Int(i) => {
            if !normalized {
                return Err(GltfError::AccessorTypeMismatch(
                    "a non-normalized signed-integer accessor has no defined float conversion".into(),
                ));
            }
            match component_type {
                ComponentType::Byte => Ok((i as f32 / 127.0).max(-1.0)),
                ComponentType::Short => Ok((i as f32 / 32767.0).max(-1.0)),
                _ => unreachable!("signed raw component implies BYTE or SHORT"),
            }
        }
        RawComponent::UInt(u) => {
            if !normalized {
                return Err(GltfError::AccessorTypeMismatch(
                    "a non-normalized unsigned-integer accessor has no defined float conversion".into(),
                ));
            }
            match component_type {
                ComponentType::UByte => Ok(u as f32 / 255.0),
                ComponentType::UShort => Ok(u as f32 / 65535.0),
                ComponentType::UInt => Err(GltfError::AccessorTypeMismatch(
                    "UINT components are unsupported for normalized-float conversion".into(),
                )),
                _ => unreachable!("unsigned raw component implies UBYTE, USHORT or UINT"),
            }
        }
    }
}

/// Implements spec §4.E's "target is an integer type and normalized=false"
/// rule: zero-extend an unsigned source; fail on a signed or float source.
fn zero_extend_u32(raw: RawComponent) -> Result<u32, GltfError> {
    match raw {
        RawComponent::UInt(u) => Ok(u as u32),
        _ => Err(GltfError::AccessorTypeMismatch(
            "zero-extension requires an unsigned-integer source".into(),
        )),
    }
}

fn encode_uint(value: u32, target: ComponentType) -> Result<Vec<u8>, GltfError> {
    match target {
        ComponentType::UByte => Ok(vec![value as u8]),
        ComponentType::UShort => Ok((value as u16).to_le_bytes().to_vec()),
        ComponentType::UInt => Ok(value.to_le_bytes().to_vec()),
        _ => Err(GltfError::AccessorTypeMismatch(
            "a zero-extension target must be an unsigned-integer type".into(),
        )),
    }
}

/// Implements spec §4.E's "target is an integer type and normalized=true"
/// rule: round-half-away-from-zero quantization to the target type's max.
fn quantize_component(value: f32, target: ComponentType) -> Result<Vec<u8>, GltfError> {
    match target {
        ComponentType::Byte => Ok(((value * 127.0).round().clamp(-127.0, 127.0) as i8)
            .to_le_bytes()
            .to_vec()),
        ComponentType::UByte => Ok(((value * 255.0).round().clamp(0.0, 255.0) as u8)
            .to_le_bytes()
            .to_vec()),
        ComponentType::Short => Ok(((value * 32767.0).round().clamp(-32767.0, 32767.0) as i16)
            .to_le_bytes()
            .to_vec()),
        ComponentType::UShort => Ok(((value * 65535.0).round().clamp(0.0, 65535.0) as u16)
            .to_le_bytes()
            .to_vec()),
        ComponentType::UInt | ComponentType::Float => Err(GltfError::AccessorTypeMismatch(
            "quantization is only defined for BYTE/UBYTE/SHORT/USHORT targets".into(),
        )),
    }
}

/// Checks spec §3/§8 invariant 1:
/// `byteOffset + stride*(count-1) + attributeSize <= bufferView.byteLength`.
pub(crate) fn validate_accessor_bounds(
    accessor: &Accessor,
    buffer_view: &crate::BufferView,
) -> Result<(), GltfError> {
    if accessor.count == 0 {
        return Ok(());
    }
    let stride = accessor.stride(buffer_view);
    let overflow = || GltfError::parse("accessor bounds overflow");
    let needed = accessor
        .byte_offset
        .checked_add(stride.checked_mul(accessor.count - 1).ok_or_else(overflow)?)
        .and_then(|v| v.checked_add(accessor.attribute_size()))
        .ok_or_else(overflow)?;
    if needed > buffer_view.byte_length {
        return Err(GltfError::parse(format!(
            "accessor byteOffset + stride*(count-1) + attributeSize ({needed}) exceeds \
             bufferView.byteLength ({})",
            buffer_view.byte_length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, BufferView, BufferViewTarget};
    use crate::document::DocumentBuilder;

    fn doc_with_floats(values: &[f32]) -> (Document, AccessorId) {
        let mut bytes = Vec::new();
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut builder = DocumentBuilder::new();
        let buffer_id = builder.push_buffer(Buffer {
            name: None,
            bytes,
        });
        let bv_id = builder.push_buffer_view(BufferView {
            name: None,
            buffer: buffer_id,
            byte_offset: 0,
            byte_length: values.len() * 4,
            byte_stride: 0,
            target: BufferViewTarget::Unset,
        });
        let accessor_id = builder.push_accessor(Accessor {
            name: None,
            buffer_view: bv_id,
            byte_offset: 0,
            component_type: ComponentType::Float,
            type_: AttributeType::Vec3,
            count: values.len() / 3,
            normalized: false,
            sparse: None,
        });
        (builder.finish(), accessor_id)
    }

    #[test]
    fn float_accessor_round_trips_bitwise() {
        let (doc, id) = doc_with_floats(&[1.0, 2.0, 3.0, -4.5, 0.0, 100.25]);
        let values = doc.accessor(id).read_vec3(&doc).unwrap();
        assert_eq!(values, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.5, 0.0, 100.25)]);
    }

    #[test]
    fn empty_accessor_yields_empty_sequence() {
        let (doc, id) = doc_with_floats(&[]);
        let values = doc.accessor(id).read_vec3(&doc).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn normalized_ubyte_quantization_round_trips_extremes() {
        for original in [0u8, 127u8, 255u8] {
            let expected = original as f32 / 255.0;
            let requantized = (expected * 255.0).round() as u8;
            assert_eq!(requantized, original);
        }
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let (doc, id) = doc_with_floats(&[1.0, 2.0, 3.0]);
        let err = doc.accessor(id).read_vec4(&doc).unwrap_err();
        assert!(matches!(err, GltfError::AccessorTypeMismatch(_)));
    }
}
