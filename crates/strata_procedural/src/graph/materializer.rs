//! # Connection Graph Materializer
//!
//! Turns the authored edge list into per-node adjacency buffers, once.
//!
//! ## Algorithm
//!
//! 1. No edges, or marker already present: do nothing
//! 2. Resolve both endpoints; skip the declaration if either is missing
//! 3. Append the forward connection to `from` unless already present
//! 4. Bidirectional: append the mirrored connection to `to` under the same rule
//! 5. Create the [`GraphBuiltMarker`]
//!
//! Connections are never removed. Writes are serialized: the pass is
//! single-threaded and edge counts are small relative to node counts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use strata_core::{NodeId, NodeRegistry};

use super::edge::{Connection, EdgeDeclaration, EdgeKind, PolarityMask};

/// Proof that materialization ran. Its presence blocks any re-run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphBuiltMarker {
    /// Tick on which the graph was built.
    pub built_at_tick: u64,
    /// Total adjacency entries at completion.
    pub connection_count: usize,
}

/// Cloneable readiness signal for consumers on other threads.
///
/// Consumers poll this before trusting adjacency buffers.
#[derive(Clone, Debug, Default)]
pub struct GraphReadiness {
    /// Published marker.
    marker: Arc<RwLock<Option<GraphBuiltMarker>>>,
}

impl GraphReadiness {
    /// Checks if the graph has been built.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.marker.read().is_some()
    }

    /// Returns the published marker, if any.
    #[must_use]
    pub fn marker(&self) -> Option<GraphBuiltMarker> {
        *self.marker.read()
    }

    /// Publishes the marker.
    fn publish(&self, marker: GraphBuiltMarker) {
        *self.marker.write() = Some(marker);
    }
}

/// Outcome of one materialization call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Declarations examined.
    pub declarations: usize,
    /// Forward entries appended.
    pub forward_added: usize,
    /// Mirrored entries appended.
    pub mirrored_added: usize,
    /// Entries skipped because an equivalent one existed.
    pub duplicates_skipped: usize,
    /// Declarations skipped because an endpoint did not resolve.
    pub unresolved_skipped: usize,
    /// True if nothing was done (no edges, or already built).
    pub no_op: bool,
}

impl MaterializeReport {
    /// Entries appended in this call.
    #[inline]
    #[must_use]
    pub const fn added(&self) -> usize {
        self.forward_added + self.mirrored_added
    }

    const fn skipped() -> Self {
        Self {
            declarations: 0,
            forward_added: 0,
            mirrored_added: 0,
            duplicates_skipped: 0,
            unresolved_skipped: 0,
            no_op: true,
        }
    }
}

/// Per-node adjacency buffers plus the built marker.
///
/// # Example
///
/// ```rust,ignore
/// let mut graph = ConnectionGraph::new();
/// let report = graph.materialize(&registry, &edges, tick);
/// assert!(graph.is_built());
/// for conn in graph.traversable_from(room, PolarityMask::POSITIVE) {
///     // ...
/// }
/// ```
#[derive(Debug, Default)]
pub struct ConnectionGraph {
    /// Adjacency buffers keyed by owning node.
    adjacency: HashMap<NodeId, Vec<Connection>>,
    /// Present once materialization completed.
    marker: Option<GraphBuiltMarker>,
    /// Shared readiness signal.
    readiness: GraphReadiness,
}

impl ConnectionGraph {
    /// Creates an empty, unbuilt graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes `edges` against `registry`.
    ///
    /// Idempotent: after the first successful call the marker exists and
    /// every later call is a no-op. An empty edge list is a no-op and does
    /// not create the marker.
    pub fn materialize(
        &mut self,
        registry: &NodeRegistry,
        edges: &[EdgeDeclaration],
        tick: u64,
    ) -> MaterializeReport {
        if edges.is_empty() || self.marker.is_some() {
            return MaterializeReport::skipped();
        }

        let mut report = MaterializeReport {
            declarations: edges.len(),
            ..MaterializeReport::default()
        };

        for decl in edges {
            let (Some(from_id), Some(to_id)) = (registry.resolve(&decl.from), registry.resolve(&decl.to))
            else {
                tracing::warn!(
                    "Skipping edge {} -> {}: endpoint does not resolve to a registered node",
                    decl.from,
                    decl.to
                );
                report.unresolved_skipped += 1;
                continue;
            };

            let forward = Connection::forward(from_id, to_id, decl);
            if self.append(forward) {
                report.forward_added += 1;
            } else {
                report.duplicates_skipped += 1;
            }

            if decl.kind == EdgeKind::Bidirectional {
                if self.append(forward.mirrored()) {
                    report.mirrored_added += 1;
                } else {
                    report.duplicates_skipped += 1;
                }
            }
        }

        let marker = GraphBuiltMarker {
            built_at_tick: tick,
            connection_count: self.total_connections(),
        };
        self.marker = Some(marker);
        self.readiness.publish(marker);

        tracing::info!(
            "Connection graph built at tick {}: {} entries across {} nodes ({} unresolved, {} duplicates)",
            tick,
            marker.connection_count,
            self.adjacency.len(),
            report.unresolved_skipped,
            report.duplicates_skipped
        );

        report
    }

    /// Appends to the owner's buffer unless an equivalent entry exists.
    fn append(&mut self, connection: Connection) -> bool {
        let buffer = self.adjacency.entry(connection.from_id).or_default();
        let key = connection.key();
        if buffer.iter().any(|existing| existing.key() == key) {
            return false;
        }
        buffer.push(connection);
        true
    }

    /// Adjacency buffer of a node. Empty if the node has none.
    #[must_use]
    pub fn connections(&self, id: NodeId) -> &[Connection] {
        self.adjacency.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Checks if a node has received a buffer.
    #[must_use]
    pub fn has_buffer(&self, id: NodeId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Nodes reachable in one step from `id`, in buffer order.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.connections(id).iter().map(|c| c.to_id)
    }

    /// Connections out of `id` usable with `abilities`.
    pub fn traversable_from(
        &self,
        id: NodeId,
        abilities: PolarityMask,
    ) -> impl Iterator<Item = &Connection> + '_ {
        self.connections(id).iter().filter(move |c| c.allows(abilities))
    }

    /// Total entries across all buffers.
    #[must_use]
    pub fn total_connections(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Number of nodes holding a buffer.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The built marker, if materialization completed.
    #[inline]
    #[must_use]
    pub const fn marker(&self) -> Option<GraphBuiltMarker> {
        self.marker
    }

    /// Checks if materialization completed.
    #[inline]
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.marker.is_some()
    }

    /// Readiness handle for consumers.
    #[must_use]
    pub fn readiness(&self) -> GraphReadiness {
        self.readiness.clone()
    }
}
