//! # Generation Driver
//!
//! Host-loop helper. One tick is, in order:
//!
//! 1. Materialize the connection graph (no-op after the first time)
//! 2. Narrow the domains of `InProgress` nodes
//! 3. Run the collapse pass
//!
//! Unhealthy outcomes are logged, never returned as errors.

use rayon::prelude::*;
use strata_core::{Node, NodeId, StrataResult};

use crate::blueprint::WorldBlueprint;
use crate::candidate::CandidateSet;
use crate::collapse::{CollapseEngine, TickReport};
use crate::config::GenerationConfig;
use crate::graph::GraphBuiltMarker;
use crate::narrowing::{DomainNarrower, NoNarrowing};
use crate::state::{GenerationPhase, GenerationState};
use crate::world::GenerationWorld;

/// Outcome of [`GenerationDriver::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Ticks executed by this run.
    pub ticks: u64,
    /// Every node reached a terminal phase.
    pub converged: bool,
    /// Nodes at `Completed`.
    pub completed: usize,
    /// Nodes at `Contradiction`, in registry order.
    pub contradictions: Vec<NodeId>,
    /// Nodes at `Failed`, in registry order.
    pub failures: Vec<NodeId>,
    /// Graph marker, if the graph was built.
    pub graph: Option<GraphBuiltMarker>,
}

impl GenerationReport {
    /// Checks if every node converged to `Completed`.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.converged && self.contradictions.is_empty() && self.failures.is_empty()
    }
}

/// Drives a [`GenerationWorld`] tick by tick.
///
/// # Example
///
/// ```rust,ignore
/// let driver = GenerationDriver::with_narrower(config, DropLightest);
/// let mut world = driver.build(&blueprint)?;
/// let report = driver.run(&mut world);
/// ```
#[derive(Debug)]
pub struct GenerationDriver<N = NoNarrowing> {
    /// Run configuration.
    config: GenerationConfig,
    /// Collapse engine built from `config.collapse`.
    engine: CollapseEngine,
    /// Upstream constraint producer.
    narrower: N,
}

impl GenerationDriver<NoNarrowing> {
    /// Creates a driver that never narrows domains.
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_narrower(config, NoNarrowing)
    }
}

impl<N: DomainNarrower> GenerationDriver<N> {
    /// Creates a driver with a narrowing step.
    #[must_use]
    pub fn with_narrower(config: GenerationConfig, narrower: N) -> Self {
        let engine = CollapseEngine::new(config.collapse.clone());
        Self {
            config,
            engine,
            narrower,
        }
    }

    /// The run configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// The collapse engine.
    #[inline]
    #[must_use]
    pub const fn engine(&self) -> &CollapseEngine {
        &self.engine
    }

    /// Builds a world from a blueprint using the configured seed.
    ///
    /// # Errors
    ///
    /// Returns error if the blueprint is rejected.
    pub fn build(&self, blueprint: &WorldBlueprint) -> StrataResult<GenerationWorld> {
        blueprint.build(self.config.world_seed)
    }

    /// Runs one ordered tick.
    pub fn tick(&self, world: &mut GenerationWorld) -> TickReport {
        world.materialize_graph();
        self.narrow(world);
        let report = self.engine.advance(world);
        world.finish_tick();
        report
    }

    fn narrow(&self, world: &mut GenerationWorld) {
        let slots = world.collapse_slots();
        let narrower = &self.narrower;

        if self.config.collapse.parallel {
            slots
                .nodes
                .par_iter()
                .zip(slots.states.par_iter())
                .zip(slots.candidates.par_iter_mut())
                .for_each(|((node, state), candidates)| narrow_slot(narrower, node, state, candidates));
        } else {
            slots
                .nodes
                .iter()
                .zip(slots.states.iter())
                .zip(slots.candidates.iter_mut())
                .for_each(|((node, state), candidates)| narrow_slot(narrower, node, state, candidates));
        }
    }

    /// Ticks until every node is terminal or the tick cap is reached.
    pub fn run(&self, world: &mut GenerationWorld) -> GenerationReport {
        let cap = self.config.tick_cap();
        let mut ticks = 0;

        while ticks < cap && !world.is_converged() {
            self.tick(world);
            ticks += 1;
        }
        // A world with no nodes still gets its graph built.
        world.materialize_graph();

        let report = GenerationReport {
            ticks,
            converged: world.is_converged(),
            completed: world.phase_counts().completed,
            contradictions: world.nodes_in_phase(GenerationPhase::Contradiction),
            failures: world.nodes_in_phase(GenerationPhase::Failed),
            graph: world.graph().marker(),
        };

        if !report.converged {
            tracing::warn!(
                "Generation stopped at tick cap {} with {} nodes still pending",
                cap,
                world.phase_counts().pending()
            );
        }
        if !report.contradictions.is_empty() {
            tracing::warn!(
                "Generation quality: {} nodes ended in contradiction: {:?}",
                report.contradictions.len(),
                report.contradictions
            );
        }
        if !report.failures.is_empty() {
            tracing::warn!(
                "Generation quality: {} nodes failed: {:?}",
                report.failures.len(),
                report.failures
            );
        }

        tracing::info!(
            "Generation finished after {} ticks: {}/{} nodes completed, graph {}",
            report.ticks,
            report.completed,
            world.registry().len(),
            report
                .graph
                .map_or_else(|| "not built".to_string(), |m| format!("{} entries", m.connection_count))
        );

        report
    }
}

fn narrow_slot<N: DomainNarrower>(
    narrower: &N,
    node: &Node,
    state: &GenerationState,
    candidates: &mut Option<CandidateSet>,
) {
    if state.phase != GenerationPhase::InProgress {
        return;
    }
    if let Some(set) = candidates.as_mut() {
        narrower.narrow(node, state, set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeDeclaration;
    use crate::narrowing::{DropLightest, TileBans};
    use strata_core::{NodeLevel, WorldSeed};

    fn two_districts() -> (GenerationWorld, NodeId, NodeId) {
        let mut world = GenerationWorld::new(WorldSeed::new(42));
        let a = world.spawn_node(NodeLevel::District, (0, 0), NodeId::NONE).unwrap();
        let b = world.spawn_node(NodeLevel::District, (1, 0), NodeId::NONE).unwrap();
        world.declare_edge(EdgeDeclaration::bidirectional(a, b));
        (world, a, b)
    }

    #[test]
    fn test_first_tick_builds_graph_before_collapse() {
        let (mut world, a, _) = two_districts();
        let driver = GenerationDriver::new(GenerationConfig::default());

        let report = driver.tick(&mut world);
        assert_eq!(report.seeded, 2);
        assert_eq!(world.graph().marker().map(|m| m.built_at_tick), Some(0));
        assert_eq!(world.graph().connections(a).len(), 1);
        assert_eq!(world.tick(), 1);
    }

    #[test]
    fn test_drop_lightest_converges_quickly() {
        let (mut world, a, b) = two_districts();
        let driver = GenerationDriver::with_narrower(GenerationConfig::default(), DropLightest);

        let report = driver.run(&mut world);
        assert!(report.is_healthy());
        assert_eq!(report.completed, 2);
        // Seed, then three narrowing ticks from four candidates to one.
        assert_eq!(report.ticks, 4);
        for id in [a, b] {
            let state = world.state(id).unwrap();
            assert!(state.collapsed);
            assert_ne!(state.assigned_id, 0);
        }
    }

    #[test]
    fn test_unnarrowed_run_hits_worst_case_bound() {
        let (mut world, _, _) = two_districts();
        let config = GenerationConfig::default();
        let bound = config.collapse.worst_case_ticks();
        let report = GenerationDriver::new(config).run(&mut world);

        assert!(report.converged);
        assert_eq!(report.ticks, bound);
    }

    #[test]
    fn test_bans_produce_reported_contradiction() {
        let (mut world, a, b) = two_districts();
        world.set_candidates(a, Some(CandidateSet::uniform([1, 2]))).unwrap();
        let bans = TileBans::new().ban(a, 1).ban(a, 2);
        let driver = GenerationDriver::with_narrower(GenerationConfig::default(), bans);

        let report = driver.run(&mut world);
        assert!(report.converged);
        assert!(!report.is_healthy());
        assert_eq!(report.contradictions, vec![a]);
        assert_eq!(world.state(b).unwrap().phase, GenerationPhase::Completed);
    }

    #[test]
    fn test_tick_cap_stops_run() {
        let (mut world, _, _) = two_districts();
        let config = GenerationConfig {
            max_ticks: Some(5),
            ..GenerationConfig::default()
        };
        let report = GenerationDriver::new(config).run(&mut world);

        assert_eq!(report.ticks, 5);
        assert!(!report.converged);
        assert_eq!(report.completed, 0);
    }

    #[test]
    fn test_empty_world_run() {
        let mut world = GenerationWorld::new(WorldSeed::new(1));
        let report = GenerationDriver::new(GenerationConfig::default()).run(&mut world);
        assert_eq!(report.ticks, 0);
        assert!(report.converged);
        assert!(report.graph.is_none());
    }
}
