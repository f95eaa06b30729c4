//! The glTF asset graph (spec §3/§4.D): a two-pass builder that turns a
//! decoded JSON tree plus a GLB BIN chunk into a typed, arena-backed
//! [`Document`].
//!
//! `DocumentBuilder`'s `push_*`/`finish` methods are deliberately infallible
//! — they only ever append to an arena and hand back its index. Every
//! fallible invariant (`spec §3`'s out-of-range indices, missing required
//! fields, unknown enum codes, the node forest's acyclicity) is checked by
//! the free functions in this module that drive `Document::from_glb`, never
//! by the builder itself. This keeps the arena usable directly by tests that
//! hand-assemble a tiny document (see `accessor.rs`) without threading a
//! `Result` through every push.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use scene_json::{JsonObject, Value};

use crate::accessor::{
    validate_accessor_bounds, Accessor, AttributeType, ComponentType, Sparse, SparseIndices, SparseValues,
};
use crate::animation::{
    Animation, AnimationChannel, AnimationChannelTarget, AnimationSampler, ChannelPath, Interpolation,
};
use crate::buffer::{Buffer, BufferView, BufferViewTarget};
use crate::error::GltfError;
use crate::fields::{
    check_index, index_array, opt_array, opt_bool, opt_f32, opt_f32_array, opt_object, opt_str, opt_usize,
    required_array, required_object, required_str, required_usize,
};
use crate::glb::parse_glb;
use crate::ids::{
    AccessorId, AnimationId, AnimationSamplerId, BufferId, BufferViewId, ImageId, MaterialId, MeshId, NodeId,
    SceneId, SkinId, TextureId, TextureSamplerId,
};
use crate::image::Image;
use crate::material::{
    AlphaMode, Material, NormalTextureInfo, OcclusionTextureInfo, PbrMetallicRoughness, TextureInfo,
};
use crate::mesh::{Attributes, Mesh, MorphTarget, Primitive, PrimitiveMode};
use crate::node::Node;
use crate::scene::Scene;
use crate::skin::Skin;
use crate::texture::{MagFilter, MinFilter, Texture, TextureSampler, WrapMode};
use crate::transform::Transform;

/// `asset` (spec §6: `{version: string, generator?: string}`).
#[derive(Debug, Clone)]
pub struct Asset {
    pub version: String,
    pub generator: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            generator: None,
        }
    }
}

/// The fully constructed asset graph (spec §3 "Asset graph"). Every
/// cross-reference between entities is a `Copy` id resolved through the
/// accessor methods below, never a borrow into the arena itself.
#[derive(Debug, Default)]
pub struct Document {
    asset: Asset,
    buffers: Vec<Buffer>,
    buffer_views: Vec<BufferView>,
    accessors: Vec<Accessor>,
    images: Vec<Image>,
    texture_samplers: Vec<TextureSampler>,
    textures: Vec<Texture>,
    materials: Vec<Material>,
    meshes: Vec<Mesh>,
    nodes: Vec<Node>,
    skins: Vec<Skin>,
    scenes: Vec<Scene>,
    animations: Vec<Animation>,
}

impl Document {
    fn partial(buffers: Vec<Buffer>, buffer_views: Vec<BufferView>, accessors: Vec<Accessor>) -> Document {
        Document {
            asset: Asset::default(),
            buffers,
            buffer_views,
            accessors,
            ..Document::default()
        }
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }
    pub fn buffer(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.index()]
    }
    pub fn buffer_view(&self, id: BufferViewId) -> &BufferView {
        &self.buffer_views[id.index()]
    }
    pub fn accessor(&self, id: AccessorId) -> &Accessor {
        &self.accessors[id.index()]
    }
    pub fn image(&self, id: ImageId) -> &Image {
        &self.images[id.index()]
    }
    pub fn texture_sampler(&self, id: TextureSamplerId) -> &TextureSampler {
        &self.texture_samplers[id.index()]
    }
    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }
    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.index()]
    }
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
    pub fn skin(&self, id: SkinId) -> &Skin {
        &self.skins[id.index()]
    }
    pub fn scene(&self, id: SceneId) -> &Scene {
        &self.scenes[id.index()]
    }
    pub fn animation(&self, id: AnimationId) -> &Animation {
        &self.animations[id.index()]
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }
    pub fn buffer_views(&self) -> &[BufferView] {
        &self.buffer_views
    }
    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }
    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Parses a GLB container end to end: frames it (spec §4.C), decodes its
    /// JSON chunk (spec §4.B), and builds the typed asset graph against its
    /// BIN chunk (spec §4.D). `file` names the JSON source for error
    /// locations.
    pub fn from_glb(bytes: &[u8], file: impl Into<Arc<str>>) -> Result<Document, GltfError> {
        let file: Arc<str> = file.into();
        tracing::trace!(file = %file, bytes = bytes.len(), "gltf: parsing GLB");
        let glb = parse_glb(bytes)?;
        let root_value = scene_json::parse(file.as_ref(), glb.json)?;
        let root = root_value
            .as_object()
            .ok_or_else(|| GltfError::parse("the glTF document's root value must be an object"))?;

        let asset_obj = required_object(root, "asset", "root")?;
        let asset = Asset {
            version: required_str(asset_obj, "version", "asset")?,
            generator: opt_str(asset_obj, "generator", "asset")?,
        };

        let buffers_json = opt_array(root, "buffers", "root")?;
        let buffer_views_json = opt_array(root, "bufferViews", "root")?;
        let accessors_json = opt_array(root, "accessors", "root")?;
        let images_json = opt_array(root, "images", "root")?;
        let samplers_json = opt_array(root, "samplers", "root")?;
        let textures_json = opt_array(root, "textures", "root")?;
        let materials_json = opt_array(root, "materials", "root")?;
        let meshes_json = opt_array(root, "meshes", "root")?;
        let nodes_json = opt_array(root, "nodes", "root")?;
        let skins_json = opt_array(root, "skins", "root")?;
        let scenes_json = opt_array(root, "scenes", "root")?;
        let animations_json = opt_array(root, "animations", "root")?;

        let buffers = buffers_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "buffers", i)?;
                buffer_from_json(obj, i, glb.bin)
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let buffer_views = buffer_views_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "bufferViews", i)?;
                buffer_view_from_json(obj, i, &buffers)
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let accessors = accessors_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "accessors", i)?;
                accessor_from_json(obj, i, &buffer_views)
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let images = images_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "images", i)?;
                image_from_json(obj, i, buffer_views.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let texture_samplers = samplers_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "samplers", i)?;
                texture_sampler_from_json(obj, i)
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let textures = textures_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "textures", i)?;
                texture_from_json(obj, i, images.len(), texture_samplers.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let materials = materials_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "materials", i)?;
                material_from_json(obj, i, textures.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let meshes = meshes_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "meshes", i)?;
                mesh_from_json(obj, i, accessors.len(), materials.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let nodes = nodes_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "nodes", i)?;
                node_from_json(obj, i, meshes.len(), skins_json.len(), nodes_json.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let skins = skins_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "skins", i)?;
                skin_from_json(obj, i, nodes.len(), &accessors, &buffer_views, &buffers)
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let scenes = scenes_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "scenes", i)?;
                scene_from_json(obj, i, nodes.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let animations = animations_json
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let obj = object_at(v, "animations", i)?;
                animation_from_json(obj, i, accessors.len(), nodes.len())
            })
            .collect::<Result<Vec<_>, GltfError>>()?;

        let mut builder = DocumentBuilder::new();
        builder.set_asset(asset);
        for item in buffers {
            builder.push_buffer(item);
        }
        for item in buffer_views {
            builder.push_buffer_view(item);
        }
        for item in accessors {
            builder.push_accessor(item);
        }
        for item in images {
            builder.push_image(item);
        }
        for item in texture_samplers {
            builder.push_texture_sampler(item);
        }
        for item in textures {
            builder.push_texture(item);
        }
        for item in materials {
            builder.push_material(item);
        }
        for item in meshes {
            builder.push_mesh(item);
        }
        for item in nodes {
            builder.push_node(item);
        }
        for item in skins {
            builder.push_skin(item);
        }
        for item in scenes {
            builder.push_scene(item);
        }
        for item in animations {
            builder.push_animation(item);
        }

        let document = builder.finish();
        validate_forest(&document)?;
        tracing::debug!(
            file = %file,
            nodes = document.nodes.len(),
            meshes = document.meshes.len(),
            animations = document.animations.len(),
            "gltf: document parsed"
        );
        Ok(document)
    }
}

fn object_at<'a>(value: &'a Value, array_name: &str, index: usize) -> Result<&'a JsonObject, GltfError> {
    value
        .as_object()
        .ok_or_else(|| GltfError::parse(format!("{array_name}[{index}]: expected an object")))
}

/// An append-only arena builder for [`Document`] (spec §9 "Cyclic-owner
/// graph -> arena-plus-index"). Every `push_*` method is infallible; callers
/// driving a real glTF load validate before calling it, not after.
#[derive(Default)]
pub struct DocumentBuilder {
    asset: Asset,
    buffers: Vec<Buffer>,
    buffer_views: Vec<BufferView>,
    accessors: Vec<Accessor>,
    images: Vec<Image>,
    texture_samplers: Vec<TextureSampler>,
    textures: Vec<Texture>,
    materials: Vec<Material>,
    meshes: Vec<Mesh>,
    nodes: Vec<Node>,
    skins: Vec<Skin>,
    scenes: Vec<Scene>,
    animations: Vec<Animation>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_asset(&mut self, asset: Asset) {
        self.asset = asset;
    }

    pub fn push_buffer(&mut self, buffer: Buffer) -> BufferId {
        self.buffers.push(buffer);
        BufferId((self.buffers.len() - 1) as u32)
    }

    pub fn push_buffer_view(&mut self, buffer_view: BufferView) -> BufferViewId {
        self.buffer_views.push(buffer_view);
        BufferViewId((self.buffer_views.len() - 1) as u32)
    }

    pub fn push_accessor(&mut self, accessor: Accessor) -> AccessorId {
        self.accessors.push(accessor);
        AccessorId((self.accessors.len() - 1) as u32)
    }

    pub fn push_image(&mut self, image: Image) -> ImageId {
        self.images.push(image);
        ImageId((self.images.len() - 1) as u32)
    }

    pub fn push_texture_sampler(&mut self, sampler: TextureSampler) -> TextureSamplerId {
        self.texture_samplers.push(sampler);
        TextureSamplerId((self.texture_samplers.len() - 1) as u32)
    }

    pub fn push_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId((self.textures.len() - 1) as u32)
    }

    pub fn push_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    pub fn push_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId((self.meshes.len() - 1) as u32)
    }

    pub fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u32)
    }

    pub fn push_skin(&mut self, skin: Skin) -> SkinId {
        self.skins.push(skin);
        SkinId((self.skins.len() - 1) as u32)
    }

    pub fn push_scene(&mut self, scene: Scene) -> SceneId {
        self.scenes.push(scene);
        SceneId((self.scenes.len() - 1) as u32)
    }

    pub fn push_animation(&mut self, animation: Animation) -> AnimationId {
        self.animations.push(animation);
        AnimationId((self.animations.len() - 1) as u32)
    }

    /// Consumes the builder, backpatching each node's `parent` from every
    /// `children` listing (spec §4.D step 2) and returning the finished
    /// arena. A node claimed by more than one parent has the last claimant
    /// win here; `Document::from_glb` rejects that case afterwards via
    /// [`validate_forest`] rather than deciding it silently.
    pub fn finish(mut self) -> Document {
        let claims: Vec<(usize, NodeId)> = self
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| node.children.iter().map(move |&child| (child.index(), NodeId(i as u32))))
            .collect();
        for (child_index, parent_id) in claims {
            if let Some(node) = self.nodes.get_mut(child_index) {
                node.parent = Some(parent_id);
            }
        }
        Document {
            asset: self.asset,
            buffers: self.buffers,
            buffer_views: self.buffer_views,
            accessors: self.accessors,
            images: self.images,
            texture_samplers: self.texture_samplers,
            textures: self.textures,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            skins: self.skins,
            scenes: self.scenes,
            animations: self.animations,
        }
    }
}

/// Spec invariant 2: "no cycle under `children`; exactly one root per
/// connected component" — i.e. the node graph is a forest. Checked in two
/// passes: a node claimed by more than one parent fails immediately; a DFS
/// with a three-color mark catches any remaining cycle (self-loops, or
/// cycles among nodes with exactly one parent each).
fn validate_forest(doc: &Document) -> Result<(), GltfError> {
    let n = doc.nodes.len();
    let mut parent_count = vec![0u32; n];
    for node in &doc.nodes {
        for &child in &node.children {
            parent_count[child.index()] += 1;
        }
    }
    if let Some(i) = parent_count.iter().position(|&count| count > 1) {
        return Err(GltfError::parse(format!(
            "nodes[{i}] is listed as a child of more than one node; the node graph must be a forest"
        )));
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InStack,
        Done,
    }

    fn visit(doc: &Document, i: usize, marks: &mut [Mark]) -> Result<(), GltfError> {
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::InStack => {
                return Err(GltfError::parse(format!(
                    "nodes[{i}] participates in a cycle under `children`"
                )))
            }
            Mark::Unvisited => {}
        }
        marks[i] = Mark::InStack;
        for &child in &doc.nodes[i].children {
            visit(doc, child.index(), marks)?;
        }
        marks[i] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; n];
    for i in 0..n {
        visit(doc, i, &mut marks)?;
    }
    Ok(())
}

fn buffer_from_json(obj: &JsonObject, index: usize, bin: &[u8]) -> Result<Buffer, GltfError> {
    let owner = format!("buffers[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    if let Some(uri) = opt_str(obj, "uri", &owner)? {
        return Err(GltfError::UnsupportedExternalBuffer(format!("{owner}: uri {uri:?}")));
    }
    if index != 0 {
        return Err(GltfError::parse(format!(
            "{owner}: only buffer 0 may omit `uri` (its bytes come from the GLB BIN chunk)"
        )));
    }
    let byte_length = opt_usize(obj, "byteLength", &owner, bin.len())?;
    if byte_length > bin.len() {
        return Err(GltfError::parse(format!(
            "{owner}: byteLength {byte_length} exceeds the GLB BIN chunk size {}",
            bin.len()
        )));
    }
    Ok(Buffer {
        name,
        bytes: bin[..byte_length].to_vec(),
    })
}

fn buffer_view_from_json(obj: &JsonObject, index: usize, buffers: &[Buffer]) -> Result<BufferView, GltfError> {
    let owner = format!("bufferViews[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    let buffer_index = required_usize(obj, "buffer", &owner)?;
    check_index(buffer_index, buffers.len(), &owner, "buffer")?;
    let byte_offset = opt_usize(obj, "byteOffset", &owner, 0)?;
    let byte_length = required_usize(obj, "byteLength", &owner)?;
    let byte_stride = opt_usize(obj, "byteStride", &owner, 0)?;
    let target_code = obj.get("target").and_then(|v| v.as_number()).map(|n| n.as_int());
    let target = BufferViewTarget::from_code(target_code);

    let buffer_len = buffers[buffer_index].bytes.len();
    if byte_offset + byte_length > buffer_len {
        return Err(GltfError::parse(format!(
            "{owner}: byteOffset+byteLength ({}) exceeds buffer[{buffer_index}].byteLength ({buffer_len})",
            byte_offset + byte_length
        )));
    }

    Ok(BufferView {
        name,
        buffer: BufferId(buffer_index as u32),
        byte_offset,
        byte_length,
        byte_stride,
        target,
    })
}

fn accessor_from_json(obj: &JsonObject, index: usize, buffer_views: &[BufferView]) -> Result<Accessor, GltfError> {
    let owner = format!("accessors[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    let buffer_view_index = required_usize(obj, "bufferView", &owner)?;
    check_index(buffer_view_index, buffer_views.len(), &owner, "bufferView")?;
    let byte_offset = opt_usize(obj, "byteOffset", &owner, 0)?;
    let component_type = ComponentType::from_code(required_usize(obj, "componentType", &owner)? as i64)?;
    let type_ = AttributeType::from_str(&required_str(obj, "type", &owner)?)?;
    let count = required_usize(obj, "count", &owner)?;
    let normalized = opt_bool(obj, "normalized", &owner, false)?;
    let sparse = match opt_object(obj, "sparse", &owner)? {
        None => None,
        Some(sparse_obj) => Some(sparse_from_json(sparse_obj, &owner, buffer_views)?),
    };

    let accessor = Accessor {
        name,
        buffer_view: BufferViewId(buffer_view_index as u32),
        byte_offset,
        component_type,
        type_,
        count,
        normalized,
        sparse,
    };
    validate_accessor_bounds(&accessor, &buffer_views[buffer_view_index])?;
    Ok(accessor)
}

fn sparse_from_json(obj: &JsonObject, owner: &str, buffer_views: &[BufferView]) -> Result<Sparse, GltfError> {
    let count = required_usize(obj, "count", owner)?;

    let indices_obj = required_object(obj, "indices", owner)?;
    let indices_owner = format!("{owner}.indices");
    let indices_buffer_view = required_usize(indices_obj, "bufferView", &indices_owner)?;
    check_index(indices_buffer_view, buffer_views.len(), &indices_owner, "bufferView")?;
    let indices_byte_offset = opt_usize(indices_obj, "byteOffset", &indices_owner, 0)?;
    let indices_component_type =
        ComponentType::from_code(required_usize(indices_obj, "componentType", &indices_owner)? as i64)?;

    let values_obj = required_object(obj, "values", owner)?;
    let values_owner = format!("{owner}.values");
    let values_buffer_view = required_usize(values_obj, "bufferView", &values_owner)?;
    check_index(values_buffer_view, buffer_views.len(), &values_owner, "bufferView")?;
    let values_byte_offset = opt_usize(values_obj, "byteOffset", &values_owner, 0)?;

    Ok(Sparse {
        count,
        indices: SparseIndices {
            buffer_view: BufferViewId(indices_buffer_view as u32),
            byte_offset: indices_byte_offset,
            component_type: indices_component_type,
        },
        values: SparseValues {
            buffer_view: BufferViewId(values_buffer_view as u32),
            byte_offset: values_byte_offset,
        },
    })
}

fn image_from_json(obj: &JsonObject, index: usize, buffer_views_len: usize) -> Result<Image, GltfError> {
    let owner = format!("images[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    let uri = opt_str(obj, "uri", &owner)?;
    let mime_type = opt_str(obj, "mimeType", &owner)?;
    let buffer_view = match obj.get("bufferView") {
        None => None,
        Some(_) => {
            let idx = required_usize(obj, "bufferView", &owner)?;
            check_index(idx, buffer_views_len, &owner, "bufferView")?;
            Some(BufferViewId(idx as u32))
        }
    };
    Ok(Image {
        name,
        uri,
        mime_type,
        buffer_view,
    })
}

fn texture_sampler_from_json(obj: &JsonObject, index: usize) -> Result<TextureSampler, GltfError> {
    let owner = format!("samplers[{index}]");
    Ok(TextureSampler {
        name: opt_str(obj, "name", &owner)?,
        mag_filter: MagFilter::from_code(opt_usize(obj, "magFilter", &owner, 9729)? as i64),
        min_filter: MinFilter::from_code(opt_usize(obj, "minFilter", &owner, 9987)? as i64),
        wrap_s: WrapMode::from_code(opt_usize(obj, "wrapS", &owner, 10497)? as i64),
        wrap_t: WrapMode::from_code(opt_usize(obj, "wrapT", &owner, 10497)? as i64),
    })
}

fn texture_from_json(
    obj: &JsonObject,
    index: usize,
    images_len: usize,
    samplers_len: usize,
) -> Result<Texture, GltfError> {
    let owner = format!("textures[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    let source = required_usize(obj, "source", &owner)?;
    check_index(source, images_len, &owner, "source")?;
    let sampler = required_usize(obj, "sampler", &owner)?;
    check_index(sampler, samplers_len, &owner, "sampler")?;
    Ok(Texture {
        name,
        source: ImageId(source as u32),
        sampler: TextureSamplerId(sampler as u32),
    })
}

fn texture_info_from_json(
    obj: &JsonObject,
    key: &str,
    owner: &str,
    textures_len: usize,
) -> Result<Option<TextureInfo>, GltfError> {
    match opt_object(obj, key, owner)? {
        None => Ok(None),
        Some(info_obj) => {
            let info_owner = format!("{owner}.{key}");
            let index = required_usize(info_obj, "index", &info_owner)?;
            check_index(index, textures_len, &info_owner, "index")?;
            let tex_coord = opt_usize(info_obj, "texCoord", &info_owner, 0)?;
            Ok(Some(TextureInfo {
                index: TextureId(index as u32),
                tex_coord,
            }))
        }
    }
}

fn material_from_json(obj: &JsonObject, index: usize, textures_len: usize) -> Result<Material, GltfError> {
    let owner = format!("materials[{index}]");
    let name = opt_str(obj, "name", &owner)?;

    let pbr_metallic_roughness = match opt_object(obj, "pbrMetallicRoughness", &owner)? {
        None => PbrMetallicRoughness::default(),
        Some(pbr_obj) => {
            let pbr_owner = format!("{owner}.pbrMetallicRoughness");
            PbrMetallicRoughness {
                base_color_factor: opt_f32_array(pbr_obj, "baseColorFactor", &pbr_owner, [1.0, 1.0, 1.0, 1.0])?,
                base_color_texture: texture_info_from_json(pbr_obj, "baseColorTexture", &pbr_owner, textures_len)?,
                metallic_roughness_texture: texture_info_from_json(
                    pbr_obj,
                    "metallicRoughnessTexture",
                    &pbr_owner,
                    textures_len,
                )?,
                metallic_factor: opt_f32(pbr_obj, "metallicFactor", &pbr_owner, 1.0)?,
                roughness_factor: opt_f32(pbr_obj, "roughnessFactor", &pbr_owner, 1.0)?,
            }
        }
    };

    let normal_texture = match opt_object(obj, "normalTexture", &owner)? {
        None => None,
        Some(normal_obj) => {
            let normal_owner = format!("{owner}.normalTexture");
            let index = required_usize(normal_obj, "index", &normal_owner)?;
            check_index(index, textures_len, &normal_owner, "index")?;
            Some(NormalTextureInfo {
                index: TextureId(index as u32),
                tex_coord: opt_usize(normal_obj, "texCoord", &normal_owner, 0)?,
                scale: opt_f32(normal_obj, "scale", &normal_owner, 1.0)?,
            })
        }
    };

    let occlusion_texture = match opt_object(obj, "occlusionTexture", &owner)? {
        None => None,
        Some(occlusion_obj) => {
            let occlusion_owner = format!("{owner}.occlusionTexture");
            let index = required_usize(occlusion_obj, "index", &occlusion_owner)?;
            check_index(index, textures_len, &occlusion_owner, "index")?;
            Some(OcclusionTextureInfo {
                index: TextureId(index as u32),
                tex_coord: opt_usize(occlusion_obj, "texCoord", &occlusion_owner, 0)?,
                strength: opt_f32(occlusion_obj, "strength", &occlusion_owner, 1.0)?,
            })
        }
    };

    let emissive_texture = texture_info_from_json(obj, "emissiveTexture", &owner, textures_len)?;
    let emissive_factor = opt_f32_array(obj, "emissiveFactor", &owner, [0.0, 0.0, 0.0])?;
    let alpha_mode = match opt_str(obj, "alphaMode", &owner)? {
        None => AlphaMode::Opaque,
        Some(s) => {
            AlphaMode::from_str(&s).ok_or_else(|| GltfError::parse(format!("{owner}.alphaMode: unknown value {s:?}")))?
        }
    };
    let alpha_cutoff = opt_f32(obj, "alphaCutoff", &owner, 0.5)?;
    let double_sided = opt_bool(obj, "doubleSided", &owner, false)?;

    Ok(Material {
        name,
        pbr_metallic_roughness,
        normal_texture,
        occlusion_texture,
        emissive_texture,
        emissive_factor,
        alpha_mode,
        alpha_cutoff,
        double_sided,
    })
}

fn attributes_from_json(obj: &JsonObject, owner: &str, accessors_len: usize) -> Result<Attributes, GltfError> {
    let mut attributes = Attributes::default();
    for (key, slot) in [
        ("POSITION", &mut attributes.position),
        ("NORMAL", &mut attributes.normal),
        ("TANGENT", &mut attributes.tangent),
        ("TEXCOORD_0", &mut attributes.texcoord_0),
        ("TEXCOORD_1", &mut attributes.texcoord_1),
        ("COLOR_0", &mut attributes.color_0),
        ("JOINTS_0", &mut attributes.joints_0),
        ("WEIGHTS_0", &mut attributes.weights_0),
    ] {
        if let Some(value) = obj.get(key) {
            let idx = value
                .as_number()
                .map(|n| n.as_int().max(0) as usize)
                .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected a number")))?;
            check_index(idx, accessors_len, owner, key)?;
            *slot = Some(AccessorId(idx as u32));
        }
    }
    Ok(attributes)
}

fn morph_target_from_json(obj: &JsonObject, owner: &str, accessors_len: usize) -> Result<MorphTarget, GltfError> {
    let mut target = MorphTarget::default();
    for (key, slot) in [
        ("POSITION", &mut target.position),
        ("NORMAL", &mut target.normal),
        ("TANGENT", &mut target.tangent),
    ] {
        if let Some(value) = obj.get(key) {
            let idx = value
                .as_number()
                .map(|n| n.as_int().max(0) as usize)
                .ok_or_else(|| GltfError::parse(format!("{owner}.{key}: expected a number")))?;
            check_index(idx, accessors_len, owner, key)?;
            *slot = Some(AccessorId(idx as u32));
        }
    }
    Ok(target)
}

fn primitive_from_json(
    value: &Value,
    owner: &str,
    accessors_len: usize,
    materials_len: usize,
) -> Result<Primitive, GltfError> {
    let obj = value
        .as_object()
        .ok_or_else(|| GltfError::parse(format!("{owner}: expected an object")))?;

    let attributes_obj = required_object(obj, "attributes", owner)?;
    let attributes = attributes_from_json(attributes_obj, &format!("{owner}.attributes"), accessors_len)?;

    let indices = match obj.get("indices") {
        None => None,
        Some(_) => {
            let idx = required_usize(obj, "indices", owner)?;
            check_index(idx, accessors_len, owner, "indices")?;
            Some(AccessorId(idx as u32))
        }
    };

    let mode_code = opt_usize(obj, "mode", owner, 4)?;
    let mode = PrimitiveMode::from_code(mode_code as i64)
        .ok_or_else(|| GltfError::parse(format!("{owner}.mode: unknown primitive mode {mode_code}")))?;

    let targets_owner = format!("{owner}.targets");
    let targets = opt_array(obj, "targets", owner)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let target_obj = v
                .as_object()
                .ok_or_else(|| GltfError::parse(format!("{targets_owner}[{i}]: expected an object")))?;
            morph_target_from_json(target_obj, &format!("{targets_owner}[{i}]"), accessors_len)
        })
        .collect::<Result<Vec<_>, GltfError>>()?;

    let material = match obj.get("material") {
        None => None,
        Some(_) => {
            let idx = required_usize(obj, "material", owner)?;
            check_index(idx, materials_len, owner, "material")?;
            Some(MaterialId(idx as u32))
        }
    };

    Ok(Primitive {
        attributes,
        indices,
        mode,
        targets,
        material,
    })
}

fn mesh_from_json(obj: &JsonObject, index: usize, accessors_len: usize, materials_len: usize) -> Result<Mesh, GltfError> {
    let owner = format!("meshes[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    let primitives_owner = format!("{owner}.primitives");
    let primitives = required_array(obj, "primitives", &owner)?
        .iter()
        .enumerate()
        .map(|(i, v)| primitive_from_json(v, &format!("{primitives_owner}[{i}]"), accessors_len, materials_len))
        .collect::<Result<Vec<_>, GltfError>>()?;
    Ok(Mesh { name, primitives })
}

fn node_from_json(
    obj: &JsonObject,
    index: usize,
    meshes_len: usize,
    skins_count: usize,
    nodes_count: usize,
) -> Result<Node, GltfError> {
    let owner = format!("nodes[{index}]");
    let name = opt_str(obj, "name", &owner)?;

    let translation = opt_f32_array(obj, "translation", &owner, [0.0, 0.0, 0.0])?;
    let rotation = opt_f32_array(obj, "rotation", &owner, [0.0, 0.0, 0.0, 1.0])?;
    let scale = opt_f32_array(obj, "scale", &owner, [1.0, 1.0, 1.0])?;
    let transform = Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_xyzw(rotation[0], rotation[1], rotation[2], rotation[3]),
        scale: Vec3::from_array(scale),
    };

    let mesh = match obj.get("mesh") {
        None => None,
        Some(_) => {
            let idx = required_usize(obj, "mesh", &owner)?;
            check_index(idx, meshes_len, &owner, "mesh")?;
            Some(MeshId(idx as u32))
        }
    };
    let skin = match obj.get("skin") {
        None => None,
        Some(_) => {
            let idx = required_usize(obj, "skin", &owner)?;
            check_index(idx, skins_count, &owner, "skin")?;
            Some(SkinId(idx as u32))
        }
    };

    let children = index_array(obj, "children", &owner)?
        .into_iter()
        .map(|idx| {
            check_index(idx, nodes_count, &owner, "children")?;
            Ok(NodeId(idx as u32))
        })
        .collect::<Result<Vec<_>, GltfError>>()?;

    Ok(Node {
        name,
        transform,
        mesh,
        skin,
        children,
        parent: None,
    })
}

fn skin_from_json(
    obj: &JsonObject,
    index: usize,
    nodes_len: usize,
    accessors: &[Accessor],
    buffer_views: &[BufferView],
    buffers: &[Buffer],
) -> Result<Skin, GltfError> {
    let owner = format!("skins[{index}]");
    let name = opt_str(obj, "name", &owner)?;

    let skeleton = match obj.get("skeleton") {
        None => None,
        Some(_) => {
            let idx = required_usize(obj, "skeleton", &owner)?;
            check_index(idx, nodes_len, &owner, "skeleton")?;
            Some(NodeId(idx as u32))
        }
    };

    let joints = index_array(obj, "joints", &owner)?
        .into_iter()
        .map(|idx| {
            check_index(idx, nodes_len, &owner, "joints")?;
            Ok(NodeId(idx as u32))
        })
        .collect::<Result<Vec<_>, GltfError>>()?;

    let inverse_bind_matrices = match obj.get("inverseBindMatrices") {
        None => vec![Mat4::IDENTITY; joints.len()],
        Some(_) => {
            let idx = required_usize(obj, "inverseBindMatrices", &owner)?;
            check_index(idx, accessors.len(), &owner, "inverseBindMatrices")?;
            let partial = Document::partial(buffers.to_vec(), buffer_views.to_vec(), accessors.to_vec());
            let matrices = accessors[idx].read_mat4(&partial)?;
            if matrices.len() != joints.len() {
                return Err(GltfError::parse(format!(
                    "{owner}: inverseBindMatrices count {} does not match joint count {}",
                    matrices.len(),
                    joints.len()
                )));
            }
            matrices
        }
    };

    Ok(Skin {
        name,
        inverse_bind_matrices,
        skeleton,
        joints,
    })
}

fn scene_from_json(obj: &JsonObject, index: usize, nodes_len: usize) -> Result<Scene, GltfError> {
    let owner = format!("scenes[{index}]");
    let name = opt_str(obj, "name", &owner)?;
    let nodes = index_array(obj, "nodes", &owner)?
        .into_iter()
        .map(|idx| {
            check_index(idx, nodes_len, &owner, "nodes")?;
            Ok(NodeId(idx as u32))
        })
        .collect::<Result<Vec<_>, GltfError>>()?;
    Ok(Scene { name, nodes })
}

fn animation_from_json(
    obj: &JsonObject,
    index: usize,
    accessors_len: usize,
    nodes_len: usize,
) -> Result<Animation, GltfError> {
    let owner = format!("animations[{index}]");
    let name = opt_str(obj, "name", &owner)?;

    let samplers_owner = format!("{owner}.samplers");
    let samplers = required_array(obj, "samplers", &owner)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let sampler_obj = v
                .as_object()
                .ok_or_else(|| GltfError::parse(format!("{samplers_owner}[{i}]: expected an object")))?;
            let sampler_owner = format!("{samplers_owner}[{i}]");
            let input = required_usize(sampler_obj, "input", &sampler_owner)?;
            check_index(input, accessors_len, &sampler_owner, "input")?;
            let output = required_usize(sampler_obj, "output", &sampler_owner)?;
            check_index(output, accessors_len, &sampler_owner, "output")?;
            let interpolation = match opt_str(sampler_obj, "interpolation", &sampler_owner)? {
                None => Interpolation::Linear,
                Some(s) => Interpolation::from_str(&s).ok_or_else(|| {
                    GltfError::parse(format!("{sampler_owner}.interpolation: unknown value {s:?}"))
                })?,
            };
            Ok(AnimationSampler {
                input: AccessorId(input as u32),
                output: AccessorId(output as u32),
                interpolation,
            })
        })
        .collect::<Result<Vec<_>, GltfError>>()?;

    let channels_owner = format!("{owner}.channels");
    let channels = required_array(obj, "channels", &owner)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let channel_obj = v
                .as_object()
                .ok_or_else(|| GltfError::parse(format!("{channels_owner}[{i}]: expected an object")))?;
            let channel_owner = format!("{channels_owner}[{i}]");
            let sampler_index = required_usize(channel_obj, "sampler", &channel_owner)?;
            check_index(sampler_index, samplers.len(), &channel_owner, "sampler")?;

            let target_obj = required_object(channel_obj, "target", &channel_owner)?;
            let target_owner = format!("{channel_owner}.target");
            let node = match target_obj.get("node") {
                None => None,
                Some(_) => {
                    let idx = required_usize(target_obj, "node", &target_owner)?;
                    check_index(idx, nodes_len, &target_owner, "node")?;
                    Some(NodeId(idx as u32))
                }
            };
            let path_str = required_str(target_obj, "path", &target_owner)?;
            let path = ChannelPath::from_str(&path_str)
                .ok_or_else(|| GltfError::parse(format!("{target_owner}.path: unknown value {path_str:?}")))?;

            Ok(AnimationChannel {
                sampler: AnimationSamplerId(sampler_index as u32),
                target: AnimationChannelTarget { node, path },
            })
        })
        .collect::<Result<Vec<_>, GltfError>>()?;

    Ok(Animation {
        name,
        samplers,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};
    use pretty_assertions::assert_eq;

    const GLB_MAGIC: u32 = 0x4654_6C67;
    const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;
    const CHUNK_TYPE_BIN: u32 = 0x004E_4942;

    fn build_glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let total_len = 12 + 8 + json.len() + 8 + bin.len();
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total_len as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
        out.extend_from_slice(json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
        out.extend_from_slice(bin);
        out
    }

    /// Builds a minimal single-accessor GLB: one buffer, one bufferView, one
    /// FLOAT VEC3 accessor of `count` elements, one mesh/node/scene wired
    /// together, mirroring the "cube primitive" end-to-end scenario's shape
    /// without needing the full 840-byte cube payload.
    fn single_accessor_glb(count: usize) -> Vec<u8> {
        let floats_per_vertex = 3;
        let mut bin = Vec::new();
        for i in 0..count * floats_per_vertex {
            bin.extend_from_slice(&(i as f32).to_le_bytes());
        }
        let byte_length = bin.len();
        let json = format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "buffers": [{{"byteLength": {byte_length}}}],
                "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {byte_length}}}],
                "accessors": [{{"bufferView": 0, "componentType": 5126, "type": "VEC3", "count": {count}}}],
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
                "nodes": [{{"name": "Cube", "mesh": 0}}],
                "scenes": [{{"name": "Scene", "nodes": [0]}}]
            }}"#
        );
        build_glb(json.as_bytes(), &bin)
    }

    #[test]
    fn builds_document_from_glb_end_to_end() {
        let glb = single_accessor_glb(24);
        let doc = Document::from_glb(&glb, "cube.glb").unwrap();

        assert_eq!(doc.asset().version, "2.0");
        assert_eq!(doc.buffer_views()[0].byte_length, 288);
        let mesh_id = doc.node(NodeId(0)).mesh.unwrap();
        assert_eq!(mesh_id, MeshId(0));
        assert_eq!(doc.node(NodeId(0)).name.as_deref(), Some("Cube"));
        assert_eq!(doc.scene(SceneId(0)).nodes[0], NodeId(0));

        let positions = doc.accessor(AccessorId(0)).read_vec3(&doc).unwrap();
        assert_eq!(positions.len(), 24);
        assert_eq!(positions[0], Vec3::new(0.0, 1.0, 2.0));
    }

    #[test]
    fn rejects_node_with_two_parents() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "nodes": [
                {"children": [2]},
                {"children": [2]},
                {}
            ]
        }"#;
        let glb = build_glb(json, b"");
        let err = Document::from_glb(&glb, "bad.glb").unwrap_err();
        assert!(matches!(err, GltfError::Parse { .. }));
    }

    #[test]
    fn rejects_cyclic_node_children() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "nodes": [
                {"children": [1]},
                {"children": [0]}
            ]
        }"#;
        let glb = build_glb(json, b"");
        let err = Document::from_glb(&glb, "cyclic.glb").unwrap_err();
        assert!(matches!(err, GltfError::Parse { .. }));
    }

    #[test]
    fn rejects_out_of_range_mesh_index() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "nodes": [{"mesh": 0}]
        }"#;
        let glb = build_glb(json, b"");
        assert!(Document::from_glb(&glb, "bad.glb").is_err());
    }

    #[test]
    fn skin_without_inverse_bind_matrices_defaults_to_identity() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "nodes": [{}],
            "skins": [{"joints": [0]}]
        }"#;
        let glb = build_glb(json, b"");
        let doc = Document::from_glb(&glb, "skin.glb").unwrap();
        assert_eq!(doc.skins()[0].inverse_bind_matrices, vec![Mat4::IDENTITY]);
    }

    #[test]
    fn hierarchical_scene_wires_children_and_parent() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "nodes": [
                {"name": "Cube.004"},
                {"name": "Cube.002"},
                {"name": "Cube.003"},
                {"name": "Cube", "children": [1, 2]}
            ],
            "scenes": [{"name": "Scene", "nodes": [3]}]
        }"#;
        let glb = build_glb(json, b"");
        let doc = Document::from_glb(&glb, "scene.glb").unwrap();

        assert_eq!(doc.node(NodeId(1)).parent, Some(NodeId(3)));
        assert_eq!(doc.node(NodeId(2)).parent, Some(NodeId(3)));
        assert_eq!(doc.node(NodeId(0)).parent, None);
        assert_eq!(doc.scene(SceneId(0)).nodes[0], NodeId(3));
    }
}
