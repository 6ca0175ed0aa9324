//! # Node Registry
//!
//! Insert-only store of every node in the world, keyed by id.
//!
//! - Lookup by id is O(1)
//! - Lookup by address is O(1) and best-effort: an address claimed by more
//!   than one node stops resolving
//! - Iteration follows insertion order, which is also the dense index used
//!   by [`crate::NodeStorage`]
//!
//! `parent_id` is a non-owning lookup key. It is not validated on insert,
//! so parents may be registered after their children.

use std::collections::{HashMap, HashSet};

use crate::error::{StrataError, StrataResult};

use super::id::{Node, NodeAddress, NodeId, NodeLevel, NodeRef};

/// Occupancy of one address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AddressSlot {
    /// Exactly one node sits here.
    Unique(NodeId),
    /// Several nodes share it; the address does not resolve.
    Ambiguous,
}

/// The Node Registry - stable identity for every node.
///
/// Nodes are never removed or relocated during a generation run.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = NodeRegistry::new();
/// let district = registry.spawn(NodeLevel::District, (0, 0), NodeId::NONE)?;
/// let sector = registry.spawn(NodeLevel::Sector, (0, 0), district)?;
/// assert_eq!(registry.children(district), &[sector]);
/// ```
#[derive(Debug, Default)]
pub struct NodeRegistry {
    /// Nodes in insertion order.
    nodes: Vec<Node>,
    /// Id to dense index.
    index: HashMap<NodeId, usize>,
    /// Address to occupant.
    addresses: HashMap<NodeAddress, AddressSlot>,
    /// Parent to children, in insertion order.
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Next id handed out by `spawn`.
    next_id: u32,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Creates an empty registry with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            addresses: HashMap::with_capacity(capacity),
            children: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocates a new node with the next monotonic id.
    ///
    /// # Errors
    ///
    /// Returns error if the id space is exhausted and the last id is taken.
    pub fn spawn(
        &mut self,
        level: NodeLevel,
        coordinates: (i32, i32),
        parent_id: NodeId,
    ) -> StrataResult<NodeId> {
        let id = NodeId::new(self.next_id.max(1));
        self.insert(Node::new(id, level, coordinates, parent_id))?;
        Ok(id)
    }

    /// Inserts an authored node with an explicit id.
    ///
    /// Later calls to [`spawn`](Self::spawn) continue after the highest id
    /// seen so far. A second node at an already claimed address is accepted,
    /// but the address stops resolving through [`NodeRef::Address`].
    ///
    /// # Errors
    ///
    /// Returns error if the id is zero or already used.
    pub fn insert(&mut self, node: Node) -> StrataResult<()> {
        if node.id.is_none() {
            return Err(StrataError::InvalidNodeId(node.id));
        }
        if self.index.contains_key(&node.id) {
            return Err(StrataError::DuplicateNode(node.id));
        }
        self.check_hierarchy(&node);

        let slot = self.nodes.len();
        self.nodes.push(node);
        self.index.insert(node.id, slot);
        self.claim_address(node);
        if !node.parent_id.is_none() {
            self.children.entry(node.parent_id).or_default().push(node.id);
        }
        self.next_id = self.next_id.max(node.id.raw().saturating_add(1));

        Ok(())
    }

    fn claim_address(&mut self, node: Node) {
        let address = node.address();
        match self.addresses.get(&address).copied() {
            None => {
                self.addresses.insert(address, AddressSlot::Unique(node.id));
            }
            Some(AddressSlot::Unique(first)) => {
                tracing::warn!(
                    "Nodes {} and {} share address {} ({}, {}); the address no longer resolves",
                    first,
                    node.id,
                    address.level,
                    address.x,
                    address.y
                );
                self.addresses.insert(address, AddressSlot::Ambiguous);
            }
            Some(AddressSlot::Ambiguous) => {
                tracing::debug!(
                    "Node {} joins ambiguous address {} ({}, {})",
                    node.id,
                    address.level,
                    address.x,
                    address.y
                );
            }
        }
    }

    /// Logs hierarchy mismatches against already registered parents.
    fn check_hierarchy(&self, node: &Node) {
        let Some(parent) = self.get(node.parent_id) else {
            return;
        };
        if node.level.parent_level() != Some(parent.level) {
            tracing::warn!(
                "Node {} ({}) has parent {} at level {}",
                node.id,
                node.level,
                parent.id,
                parent.level
            );
        }
    }

    /// Gets a node by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Checks if a node is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns the dense (insertion order) index of a node.
    #[inline]
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Finds the node occupying an address. `None` if no node or several
    /// nodes sit there.
    #[inline]
    #[must_use]
    pub fn find_by_address(&self, level: NodeLevel, coordinates: (i32, i32)) -> Option<NodeId> {
        self.lookup_address(&NodeAddress::new(level, coordinates.0, coordinates.1))
    }

    fn lookup_address(&self, address: &NodeAddress) -> Option<NodeId> {
        match self.addresses.get(address)? {
            AddressSlot::Unique(id) => Some(*id),
            AddressSlot::Ambiguous => None,
        }
    }

    /// Checks if more than one node claims an address.
    #[must_use]
    pub fn is_ambiguous(&self, address: &NodeAddress) -> bool {
        matches!(self.addresses.get(address), Some(AddressSlot::Ambiguous))
    }

    /// Resolves an authored reference to a live node id.
    #[must_use]
    pub fn resolve(&self, node_ref: &NodeRef) -> Option<NodeId> {
        match node_ref {
            NodeRef::Id(id) => self.contains(*id).then_some(*id),
            NodeRef::Address(address) => self.lookup_address(address),
        }
    }

    /// Direct children of a node, in insertion order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Parent chain of a node, nearest first.
    ///
    /// Ends at `NONE`, after the first unregistered parent, or where the
    /// chain loops back on itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.get(id).map(|n| n.parent_id);
        while let Some(parent) = current {
            if parent.is_none() || !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.get(parent).map(|n| n.parent_id);
        }
        chain
    }

    /// All nodes in insertion order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterates over all nodes in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of registered nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
