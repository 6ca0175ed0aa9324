//! # Generation World
//!
//! Everything a generation run reads and writes:
//! - The node registry
//! - One [`GenerationState`] and one optional [`CandidateSet`] per node,
//!   stored densely in registry order
//! - The authored edge list and the materialized connection graph
//!
//! Abandoning a run means dropping the world. Every intermediate state is
//! self-consistent, so no rollback exists.

use strata_core::{Node, NodeId, NodeLevel, NodeRegistry, NodeStorage, StrataError, StrataResult, WorldSeed};

use crate::candidate::CandidateSet;
use crate::graph::{ConnectionGraph, EdgeDeclaration, MaterializeReport};
use crate::state::{GenerationPhase, GenerationState};

/// Number of nodes in each phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    /// Nodes at `Initialized`.
    pub initialized: usize,
    /// Nodes at `InProgress`.
    pub in_progress: usize,
    /// Nodes at `Completed`.
    pub completed: usize,
    /// Nodes at `Contradiction`.
    pub contradiction: usize,
    /// Nodes at `Failed`.
    pub failed: usize,
}

impl PhaseCounts {
    /// Nodes not yet in a terminal phase.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.initialized + self.in_progress
    }

    fn record(&mut self, phase: GenerationPhase) {
        match phase {
            GenerationPhase::Initialized => self.initialized += 1,
            GenerationPhase::InProgress => self.in_progress += 1,
            GenerationPhase::Completed => self.completed += 1,
            GenerationPhase::Contradiction => self.contradiction += 1,
            GenerationPhase::Failed => self.failed += 1,
        }
    }
}

/// Borrowed per-node slots handed to the collapse pass.
pub(crate) struct CollapseSlots<'a> {
    pub nodes: &'a [Node],
    pub states: &'a mut [GenerationState],
    pub candidates: &'a mut [Option<CandidateSet>],
}

/// State of one world generation run.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = GenerationWorld::new(WorldSeed::new(42));
/// let district = world.spawn_node(NodeLevel::District, (0, 0), NodeId::NONE)?;
/// world.declare_edge(EdgeDeclaration::bidirectional(a, b));
/// ```
#[derive(Debug)]
pub struct GenerationWorld {
    /// Seed for forced-collapse draws.
    seed: WorldSeed,
    /// Node identities.
    registry: NodeRegistry,
    /// Per-node collapse state.
    states: NodeStorage<GenerationState>,
    /// Per-node candidate buffers. `None` means absent.
    candidates: NodeStorage<Option<CandidateSet>>,
    /// Authored edges, consumed by materialization.
    edges: Vec<EdgeDeclaration>,
    /// Materialized adjacency.
    graph: ConnectionGraph,
    /// Ticks completed so far.
    tick: u64,
}

impl GenerationWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self::with_capacity(seed, 0)
    }

    /// Creates an empty world with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(seed: WorldSeed, capacity: usize) -> Self {
        Self {
            seed,
            registry: NodeRegistry::with_capacity(capacity),
            states: NodeStorage::with_capacity(capacity),
            candidates: NodeStorage::with_capacity(capacity),
            edges: Vec::new(),
            graph: ConnectionGraph::new(),
            tick: 0,
        }
    }

    /// Allocates a node with the next id. Its state starts at
    /// `Initialized` with no candidate buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the address is taken or the parent is invalid.
    pub fn spawn_node(
        &mut self,
        level: NodeLevel,
        coordinates: (i32, i32),
        parent_id: NodeId,
    ) -> StrataResult<NodeId> {
        let id = self.registry.spawn(level, coordinates, parent_id)?;
        self.attach_slots();
        Ok(id)
    }

    /// Inserts an authored node with an explicit id.
    ///
    /// # Errors
    ///
    /// Returns error if the registry rejects the node.
    pub fn insert_node(&mut self, node: Node) -> StrataResult<()> {
        self.registry.insert(node)?;
        self.attach_slots();
        Ok(())
    }

    fn attach_slots(&mut self) {
        self.states.push(GenerationState::new());
        self.candidates.push(None);
        debug_assert_eq!(self.states.len(), self.registry.len());
    }

    /// Adds an authored edge.
    pub fn declare_edge(&mut self, edge: EdgeDeclaration) {
        self.edges.push(edge);
    }

    /// Adds several authored edges.
    pub fn declare_edges(&mut self, edges: impl IntoIterator<Item = EdgeDeclaration>) {
        self.edges.extend(edges);
    }

    /// Runs the graph materializer over the declared edges.
    pub fn materialize_graph(&mut self) -> MaterializeReport {
        self.graph.materialize(&self.registry, &self.edges, self.tick)
    }

    /// Installs or removes a node's candidate buffer.
    ///
    /// This is the seam for external domain seeding. A non-empty buffer
    /// installed before the node's first tick replaces the default domain.
    /// Entropy follows the new buffer unless the node already completed.
    ///
    /// # Errors
    ///
    /// Returns error if the node is not registered or the buffer contains
    /// tile id 0, which is reserved for "unassigned".
    pub fn set_candidates(&mut self, id: NodeId, candidates: Option<CandidateSet>) -> StrataResult<()> {
        let index = self.registry.index_of(id).ok_or(StrataError::UnknownNode(id))?;
        if candidates.as_ref().is_some_and(|set| set.contains(0)) {
            return Err(StrataError::InvalidConfig(format!(
                "node {id}: tile id 0 is reserved for unassigned"
            )));
        }
        let entropy = candidates.as_ref().map_or(0, CandidateSet::entropy);
        if let Some(slot) = self.candidates.get_mut(index) {
            *slot = candidates;
        }
        self.refresh_entropy(index, entropy);
        Ok(())
    }

    /// Removes and returns a node's candidate buffer.
    pub fn take_candidates(&mut self, id: NodeId) -> Option<CandidateSet> {
        let index = self.registry.index_of(id)?;
        let taken = self.candidates.get_mut(index)?.take();
        self.refresh_entropy(index, 0);
        taken
    }

    fn refresh_entropy(&mut self, index: usize, entropy: u32) {
        if let Some(state) = self.states.get_mut(index) {
            if state.phase != GenerationPhase::Completed {
                state.entropy = entropy;
            }
        }
    }

    /// A node's candidate buffer, if present.
    #[must_use]
    pub fn candidates(&self, id: NodeId) -> Option<&CandidateSet> {
        let index = self.registry.index_of(id)?;
        self.candidates.get(index)?.as_ref()
    }

    /// A node's candidate buffer for external narrowing, if present.
    pub fn candidates_mut(&mut self, id: NodeId) -> Option<&mut CandidateSet> {
        let index = self.registry.index_of(id)?;
        self.candidates.get_mut(index)?.as_mut()
    }

    /// A node's generation state.
    #[must_use]
    pub fn state(&self, id: NodeId) -> Option<&GenerationState> {
        let index = self.registry.index_of(id)?;
        self.states.get(index)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self, id: NodeId) -> Option<&mut GenerationState> {
        let index = self.registry.index_of(id)?;
        self.states.get_mut(index)
    }

    /// All generation states in registry order.
    #[must_use]
    pub fn states(&self) -> &[GenerationState] {
        self.states.as_slice()
    }

    pub(crate) fn collapse_slots(&mut self) -> CollapseSlots<'_> {
        CollapseSlots {
            nodes: self.registry.as_slice(),
            states: self.states.as_mut_slice(),
            candidates: self.candidates.as_mut_slice(),
        }
    }

    /// Counts nodes per phase.
    #[must_use]
    pub fn phase_counts(&self) -> PhaseCounts {
        let mut counts = PhaseCounts::default();
        for state in self.states.as_slice() {
            counts.record(state.phase);
        }
        counts
    }

    /// Ids of nodes currently in `phase`, in registry order.
    #[must_use]
    pub fn nodes_in_phase(&self, phase: GenerationPhase) -> Vec<NodeId> {
        self.registry
            .iter()
            .zip(self.states.as_slice())
            .filter(|(_, state)| state.phase == phase)
            .map(|(node, _)| node.id)
            .collect()
    }

    /// Checks if every node reached a terminal phase.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.states.as_slice().iter().all(GenerationState::is_terminal)
    }

    /// Checks if every node reached `Completed`.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.states
            .as_slice()
            .iter()
            .all(|s| s.phase == GenerationPhase::Completed)
    }

    /// The world seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The node registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// The declared edges.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[EdgeDeclaration] {
        &self.edges
    }

    /// The connection graph.
    #[inline]
    #[must_use]
    pub const fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    /// Ticks completed so far.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn finish_tick(&mut self) {
        self.tick += 1;
    }
}
