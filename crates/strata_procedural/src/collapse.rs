//! # Collapse Engine
//!
//! Drives every node from `Initialized` to a terminal phase, one tick at a
//! time.
//!
//! ## State Machine (per node, once per tick)
//!
//! ```text
//! Initialized ──seed domain──▶ InProgress
//! InProgress, buffer absent ─────────────▶ Failed
//! InProgress, buffer empty ──────────────▶ Contradiction
//! InProgress, one candidate ─────────────▶ Completed
//! InProgress, many, iteration <= limit ──▶ InProgress (iteration + 1)
//! InProgress, many, iteration >  limit ──▶ Completed (weighted draw)
//! ```
//!
//! ## Determinism
//!
//! Forced draws use a ChaCha stream keyed by `(world_seed, node_id)`. Nodes
//! never read each other's state, so the pass runs data-parallel and still
//! reproduces the same world for the same seed.

use rand::Rng;
use rayon::prelude::*;
use strata_core::{Node, WorldSeed};

use crate::candidate::CandidateSet;
use crate::config::CollapseConfig;
use crate::state::{GenerationPhase, GenerationState};
use crate::world::GenerationWorld;

/// Seed purpose for forced-resolution draws.
pub const FORCED_COLLAPSE_STREAM: u64 = 0xC0_11A9_5E;

/// What happened to one node during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Domain seeded, now `InProgress`.
    Seeded,
    /// Still narrowing; iteration advanced.
    Advanced,
    /// Exactly one candidate remained.
    Collapsed,
    /// Iteration budget exhausted; weighted draw.
    Forced,
    /// No candidate remained.
    Contradiction,
    /// Candidate buffer missing.
    Failed,
    /// Already terminal; untouched.
    Idle,
}

/// Counts of transitions during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Nodes seeded.
    pub seeded: usize,
    /// Nodes advanced.
    pub advanced: usize,
    /// Nodes collapsed naturally.
    pub collapsed: usize,
    /// Nodes collapsed by forced resolution.
    pub forced: usize,
    /// Nodes that hit a contradiction.
    pub contradictions: usize,
    /// Nodes that failed.
    pub failures: usize,
    /// Nodes still non-terminal after the tick.
    pub pending: usize,
}

impl TickReport {
    fn record(&mut self, transition: Transition) {
        match transition {
            Transition::Seeded => {
                self.seeded += 1;
                self.pending += 1;
            }
            Transition::Advanced => {
                self.advanced += 1;
                self.pending += 1;
            }
            Transition::Collapsed => self.collapsed += 1,
            Transition::Forced => self.forced += 1,
            Transition::Contradiction => self.contradictions += 1,
            Transition::Failed => self.failures += 1,
            Transition::Idle => {}
        }
    }

    /// Nodes that reached a terminal phase this tick.
    #[inline]
    #[must_use]
    pub const fn terminated(&self) -> usize {
        self.collapsed + self.forced + self.contradictions + self.failures
    }
}

/// The Collapse Engine.
///
/// Stateless apart from its configuration; all per-node state lives in the
/// [`GenerationWorld`].
///
/// # Example
///
/// ```rust,ignore
/// let engine = CollapseEngine::new(CollapseConfig::default());
/// while !world.is_converged() {
///     engine.advance(&mut world);
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CollapseEngine {
    /// Tunables.
    config: CollapseConfig,
}

impl CollapseEngine {
    /// Creates an engine.
    #[must_use]
    pub const fn new(config: CollapseConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CollapseConfig {
        &self.config
    }

    /// Runs one tick over every node.
    ///
    /// One node's contradiction or failure never stops the others.
    pub fn advance(&self, world: &mut GenerationWorld) -> TickReport {
        let seed = world.seed();
        let tick = world.tick();
        let slots = world.collapse_slots();

        let transitions: Vec<Transition> = if self.config.parallel {
            slots
                .nodes
                .par_iter()
                .zip(slots.states.par_iter_mut())
                .zip(slots.candidates.par_iter_mut())
                .map(|((node, state), candidates)| self.step(seed, node, state, candidates))
                .collect()
        } else {
            slots
                .nodes
                .iter()
                .zip(slots.states.iter_mut())
                .zip(slots.candidates.iter_mut())
                .map(|((node, state), candidates)| self.step(seed, node, state, candidates))
                .collect()
        };

        // Logged afterwards, in registry order, so output is stable.
        let mut report = TickReport::default();
        for ((node, state), &transition) in slots.nodes.iter().zip(slots.states.iter()).zip(&transitions) {
            report.record(transition);
            match transition {
                Transition::Forced => tracing::debug!(
                    "Node {} force-collapsed to tile {} after {} iterations",
                    node.id,
                    state.assigned_id,
                    state.iteration
                ),
                Transition::Collapsed => tracing::debug!(
                    "Node {} collapsed to tile {} at iteration {}",
                    node.id,
                    state.assigned_id,
                    state.iteration
                ),
                Transition::Contradiction => tracing::warn!(
                    "Node {} ({} at {:?}) hit a contradiction at iteration {}",
                    node.id,
                    node.level,
                    node.coordinates,
                    state.iteration
                ),
                Transition::Failed => tracing::warn!(
                    "Node {} ({} at {:?}) failed: candidate buffer missing",
                    node.id,
                    node.level,
                    node.coordinates
                ),
                Transition::Seeded | Transition::Advanced | Transition::Idle => {}
            }
        }

        tracing::debug!(
            "Collapse tick {}: {} seeded, {} advanced, {} collapsed, {} forced, {} contradictions, {} failures, {} pending",
            tick,
            report.seeded,
            report.advanced,
            report.collapsed,
            report.forced,
            report.contradictions,
            report.failures,
            report.pending
        );

        report
    }

    /// Applies one transition to one node.
    pub fn step(
        &self,
        seed: WorldSeed,
        node: &Node,
        state: &mut GenerationState,
        candidates: &mut Option<CandidateSet>,
    ) -> Transition {
        match state.phase {
            GenerationPhase::Initialized => {
                if candidates.as_ref().map_or(true, CandidateSet::is_empty) {
                    *candidates = Some(self.config.default_domain.clone());
                }
                state.entropy = candidates.as_ref().map_or(0, CandidateSet::entropy);
                state.phase = GenerationPhase::InProgress;
                Transition::Seeded
            }
            GenerationPhase::InProgress => self.step_in_progress(seed, node, state, candidates),
            GenerationPhase::Completed | GenerationPhase::Contradiction | GenerationPhase::Failed => {
                Transition::Idle
            }
        }
    }

    fn step_in_progress(
        &self,
        seed: WorldSeed,
        node: &Node,
        state: &mut GenerationState,
        candidates: &mut Option<CandidateSet>,
    ) -> Transition {
        let Some(set) = candidates.as_mut() else {
            state.terminate(GenerationPhase::Failed);
            return Transition::Failed;
        };

        if set.is_empty() {
            state.terminate(GenerationPhase::Contradiction);
            return Transition::Contradiction;
        }

        if let Some(only) = set.single() {
            state.complete(only.tile_id);
            return Transition::Collapsed;
        }

        if state.iteration <= self.config.iteration_threshold {
            state.iteration = state.iteration.saturating_add(1);
            state.entropy = set.entropy();
            return Transition::Advanced;
        }

        let roll: f64 = seed.node_rng(FORCED_COLLAPSE_STREAM, node.id).gen();
        match set.pick_weighted(roll) {
            Some(chosen) => {
                set.collapse_to(chosen.tile_id);
                state.complete(chosen.tile_id);
                Transition::Forced
            }
            // Unreachable for a non-empty set; kept total.
            None => {
                state.terminate(GenerationPhase::Contradiction);
                Transition::Contradiction
            }
        }
    }
}
