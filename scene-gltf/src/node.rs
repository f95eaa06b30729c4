use crate::ids::{MeshId, NodeId, SkinId};
use crate::transform::Transform;

/// A node in the scene graph (spec §3/§6). `parent` is computed once after
/// every node is constructed, in a single pass over each node's `children`
/// list (spec §9 "Cyclic-owner graph -> arena-plus-index"), rather than
/// carried on the wire.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<MeshId>,
    pub skin: Option<SkinId>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}
