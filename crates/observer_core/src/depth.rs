use dom_host::{HostDocument, NodeKey};

use crate::element_state::is_hidden;

/// Ancestor depth of a node. Hidden nodes are infinitely deep so that any
/// depth-ordered delivery sorts them last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeDepth {
    Finite(u32),
    Infinite,
}

impl NodeDepth {
    #[must_use]
    pub const fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

/// Count ancestor steps from the node up to the tree root.
///
/// A node with no parent has depth zero; each step up adds one. Pure and
/// uncached: depth is not stable across tree mutations, so callers recompute
/// it per processing pass.
pub fn calculate_depth_for_node<D: HostDocument + ?Sized>(doc: &D, node: NodeKey) -> NodeDepth {
    if is_hidden(doc, node) {
        return NodeDepth::Infinite;
    }
    let mut depth = 0u32;
    let mut current = node;
    while let Some(parent) = doc.parent(current) {
        depth += 1;
        current = parent;
    }
    NodeDepth::Finite(depth)
}
