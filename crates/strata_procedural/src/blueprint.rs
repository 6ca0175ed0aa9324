//! # World Blueprints
//!
//! TOML description of the authored inputs to a run: nodes, edges and
//! externally seeded candidate domains.
//!
//! ```toml
//! [[nodes]]
//! level = "district"
//! x = 0
//! y = 0
//!
//! [[nodes]]
//! id = 10
//! level = "sector"
//! x = 0
//! y = 0
//! parent = 1
//!
//! [[edges]]
//! from = 1
//! to = { level = "sector", x = 0, y = 0 }
//! kind = "unidirectional"
//!
//! [[domains]]
//! node = 10
//! candidates = [{ tile_id = 3, weight = 1.0 }]
//! ```
//!
//! Nodes are inserted in file order. Parents referenced by address must
//! come first; parents referenced by id may appear anywhere.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{Node, NodeId, NodeLevel, NodeRef, StrataError, StrataResult, WorldSeed};

use crate::candidate::CandidateSet;
use crate::graph::EdgeDeclaration;
use crate::world::GenerationWorld;

/// One authored node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// Explicit id. Assigned monotonically when omitted.
    #[serde(default)]
    pub id: Option<NodeId>,
    /// Hierarchy tier.
    pub level: NodeLevel,
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Parent reference. Omitted for districts.
    #[serde(default)]
    pub parent: Option<NodeRef>,
}

/// Externally seeded domain for one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainSpec {
    /// Target node.
    pub node: NodeRef,
    /// Initial candidates.
    pub candidates: CandidateSet,
}

/// Authored inputs for a generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldBlueprint {
    /// Nodes in insertion order.
    pub nodes: Vec<NodeSpec>,
    /// Edge declarations.
    pub edges: Vec<EdgeDeclaration>,
    /// Initial candidate domains.
    pub domains: Vec<DomainSpec>,
}

impl WorldBlueprint {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse.
    pub fn from_toml_str(source: &str) -> StrataResult<Self> {
        toml::from_str(source).map_err(|e| StrataError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or does not parse.
    pub fn from_toml_file(path: impl AsRef<Path>) -> StrataResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Builds a world from this blueprint.
    ///
    /// Edges are declared as-is; unresolvable endpoints are reported by the
    /// materializer rather than rejected here. Parent ids are taken as
    /// written, so a parent may appear after its children.
    ///
    /// # Errors
    ///
    /// Returns error if a node id is rejected by the registry, a parent
    /// address or domain target does not resolve, or a domain contains the
    /// reserved tile id 0.
    pub fn build(&self, seed: WorldSeed) -> StrataResult<GenerationWorld> {
        let mut world = GenerationWorld::with_capacity(seed, self.nodes.len());

        for entry in &self.nodes {
            let parent_id = match entry.parent {
                None => NodeId::NONE,
                // Ids are kept as written; the parent may come later.
                Some(NodeRef::Id(id)) => id,
                Some(parent @ NodeRef::Address(_)) => world.registry().resolve(&parent).ok_or_else(|| {
                    StrataError::InvalidConfig(format!(
                        "node at {} ({}, {}): parent {} does not resolve to a single node",
                        entry.level, entry.x, entry.y, parent
                    ))
                })?,
            };
            match entry.id {
                Some(id) => world.insert_node(Node::new(id, entry.level, (entry.x, entry.y), parent_id))?,
                None => {
                    world.spawn_node(entry.level, (entry.x, entry.y), parent_id)?;
                }
            }
        }

        world.declare_edges(self.edges.iter().copied());

        for domain in &self.domains {
            let id = world.registry().resolve(&domain.node).ok_or_else(|| {
                StrataError::InvalidConfig(format!("domain target {} does not resolve", domain.node))
            })?;
            if domain.candidates.contains(0) {
                return Err(StrataError::InvalidConfig(format!(
                    "domain for {}: tile id 0 is reserved for unassigned",
                    domain.node
                )));
            }
            world.set_candidates(id, Some(domain.candidates.clone()))?;
        }

        tracing::debug!(
            "Built world from blueprint: {} nodes, {} edges, {} seeded domains",
            world.registry().len(),
            world.edges().len(),
            self.domains.len()
        );

        Ok(world)
    }
}
