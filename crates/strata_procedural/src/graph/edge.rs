//! # Edges and Connections
//!
//! Authored [`EdgeDeclaration`]s reference nodes loosely (by id or address)
//! and are consumed once. Materialized [`Connection`]s reference resolved
//! node ids and live in per-node adjacency buffers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strata_core::{NodeId, NodeRef};

bitflags! {
    /// Traversal abilities an edge requires.
    ///
    /// Consumed by the external gating system. An empty mask means the edge
    /// has no requirement. Unnamed bits from authored data are preserved.
    ///
    /// In TOML: `required_polarity = "POSITIVE | NEGATIVE"`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PolarityMask: u8 {
        /// Positive polarity.
        const POSITIVE = 0b0000_0001;
        /// Negative polarity.
        const NEGATIVE = 0b0000_0010;

        const _ = !0;
    }
}

impl Default for PolarityMask {
    fn default() -> Self {
        Self::empty()
    }
}

/// Directionality of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EdgeKind {
    /// Traversable from `from` to `to` only.
    Unidirectional = 0,
    /// Traversable both ways; mirrored into the `to` node's buffer.
    #[default]
    Bidirectional = 1,
}

/// Authored, immutable edge input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDeclaration {
    /// Source node.
    pub from: NodeRef,
    /// Target node.
    pub to: NodeRef,
    /// Directionality.
    #[serde(default)]
    pub kind: EdgeKind,
    /// Abilities required to traverse.
    #[serde(default)]
    pub required_polarity: PolarityMask,
    /// Cost for downstream reachability computation.
    #[serde(default = "default_traversal_cost")]
    pub traversal_cost: f32,
}

const fn default_traversal_cost() -> f32 {
    1.0
}

impl EdgeDeclaration {
    /// Creates an edge with no polarity requirement and unit cost.
    #[must_use]
    pub fn new(from: impl Into<NodeRef>, to: impl Into<NodeRef>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            required_polarity: PolarityMask::empty(),
            traversal_cost: default_traversal_cost(),
        }
    }

    /// Shorthand for a bidirectional edge.
    #[must_use]
    pub fn bidirectional(from: impl Into<NodeRef>, to: impl Into<NodeRef>) -> Self {
        Self::new(from, to, EdgeKind::Bidirectional)
    }

    /// Shorthand for a unidirectional edge.
    #[must_use]
    pub fn unidirectional(from: impl Into<NodeRef>, to: impl Into<NodeRef>) -> Self {
        Self::new(from, to, EdgeKind::Unidirectional)
    }

    /// Sets the polarity requirement.
    #[must_use]
    pub const fn with_polarity(mut self, polarity: PolarityMask) -> Self {
        self.required_polarity = polarity;
        self
    }

    /// Sets the traversal cost.
    #[must_use]
    pub const fn with_cost(mut self, cost: f32) -> Self {
        self.traversal_cost = cost;
        self
    }
}

/// Adjacency buffer entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    /// Node whose buffer holds the entry.
    pub from_id: NodeId,
    /// Node reached by traversing the entry.
    pub to_id: NodeId,
    /// Directionality of the declaration it came from.
    pub kind: EdgeKind,
    /// Abilities required to traverse.
    pub required_polarity: PolarityMask,
    /// Cost for downstream reachability computation.
    pub traversal_cost: f32,
}

/// Identity of a connection within a buffer. Cost is not part of it.
pub type ConnectionKey = (NodeId, NodeId, EdgeKind, PolarityMask);

impl Connection {
    /// Builds the forward connection for a resolved declaration.
    #[inline]
    #[must_use]
    pub const fn forward(from_id: NodeId, to_id: NodeId, decl: &EdgeDeclaration) -> Self {
        Self {
            from_id,
            to_id,
            kind: decl.kind,
            required_polarity: decl.required_polarity,
            traversal_cost: decl.traversal_cost,
        }
    }

    /// The same connection traversed the other way.
    #[inline]
    #[must_use]
    pub const fn mirrored(self) -> Self {
        Self {
            from_id: self.to_id,
            to_id: self.from_id,
            ..self
        }
    }

    /// Dedup key.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> ConnectionKey {
        (self.from_id, self.to_id, self.kind, self.required_polarity)
    }

    /// Checks if a traveller with `abilities` may use this connection.
    #[inline]
    #[must_use]
    pub fn allows(&self, abilities: PolarityMask) -> bool {
        abilities.contains(self.required_polarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrored_swaps_endpoints_only() {
        let decl = EdgeDeclaration::bidirectional(NodeId::new(1), NodeId::new(2))
            .with_polarity(PolarityMask::POSITIVE)
            .with_cost(2.5);
        let forward = Connection::forward(NodeId::new(1), NodeId::new(2), &decl);
        let back = forward.mirrored();
        assert_eq!(back.from_id, NodeId::new(2));
        assert_eq!(back.to_id, NodeId::new(1));
        assert_eq!(back.kind, EdgeKind::Bidirectional);
        assert_eq!(back.required_polarity, PolarityMask::POSITIVE);
        assert_eq!(back.traversal_cost, 2.5);
    }

    #[test]
    fn test_allows_requires_superset() {
        let decl = EdgeDeclaration::unidirectional(NodeId::new(1), NodeId::new(2))
            .with_polarity(PolarityMask::POSITIVE | PolarityMask::NEGATIVE);
        let conn = Connection::forward(NodeId::new(1), NodeId::new(2), &decl);
        assert!(!conn.allows(PolarityMask::POSITIVE));
        assert!(conn.allows(PolarityMask::all()));

        let open = Connection::forward(
            NodeId::new(1),
            NodeId::new(2),
            &EdgeDeclaration::unidirectional(NodeId::new(1), NodeId::new(2)),
        );
        assert!(open.allows(PolarityMask::empty()));
    }

    #[test]
    fn test_declaration_toml_defaults() {
        let decl: EdgeDeclaration = toml::from_str(
            r#"
            from = 3
            to = { level = "room", x = 1, y = 2 }
            "#,
        )
        .unwrap();
        assert_eq!(decl.from, NodeRef::Id(NodeId::new(3)));
        assert!(matches!(decl.to, NodeRef::Address(_)));
        assert_eq!(decl.kind, EdgeKind::Bidirectional);
        assert!(decl.required_polarity.is_empty());
        assert_eq!(decl.traversal_cost, 1.0);
    }

    #[test]
    fn test_declaration_toml_polarity() {
        let decl: EdgeDeclaration = toml::from_str(
            r#"
            from = 1
            to = 2
            kind = "unidirectional"
            required_polarity = "POSITIVE | NEGATIVE"
            traversal_cost = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(decl.kind, EdgeKind::Unidirectional);
        assert_eq!(
            decl.required_polarity,
            PolarityMask::POSITIVE | PolarityMask::NEGATIVE
        );
    }
}
