use crate::{LinkId, NodeId};
use smallvec::SmallVec;

/// A node where links start, end, merge or diverge.
#[derive(Clone, Debug)]
pub struct Node {
    /// The node ID.
    id: NodeId,
    /// The links that end at this node.
    links_in: SmallVec<[LinkId; 4]>,
    /// The links that start at this node.
    links_out: SmallVec<[LinkId; 4]>,
}

impl Node {
    /// Creates a new node.
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            links_in: SmallVec::new(),
            links_out: SmallVec::new(),
        }
    }

    /// Gets the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The links that end at this node.
    pub fn links_in(&self) -> &[LinkId] {
        &self.links_in
    }

    /// The links that start at this node.
    pub fn links_out(&self) -> &[LinkId] {
        &self.links_out
    }

    /// Adds a link ending at this node.
    pub(crate) fn add_link_in(&mut self, link_id: LinkId) {
        self.links_in.push(link_id);
    }

    /// Adds a link starting at this node.
    pub(crate) fn add_link_out(&mut self, link_id: LinkId) {
        self.links_out.push(link_id);
    }
}
