use crate::ids::NodeId;

#[derive(Debug, Clone)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<NodeId>,
}
