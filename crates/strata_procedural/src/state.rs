//! # Generation State
//!
//! Per-node progress record driven by the collapse engine.
//!
//! ## Invariants
//!
//! - `collapsed == true` iff `phase == Completed`
//! - `entropy` equals the live candidate count while `phase != Completed`
//! - Terminal phases (`Completed`, `Contradiction`, `Failed`) persist for
//!   inspection and are never left by the engine

use std::fmt;

use crate::candidate::TileId;

/// Phase of a node's collapse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GenerationPhase {
    /// Created, domain not yet seeded.
    #[default]
    Initialized = 0,
    /// Domain seeded, narrowing towards a single candidate.
    InProgress = 1,
    /// Collapsed to a single tile id.
    Completed = 2,
    /// No candidate survived narrowing. A legitimate solver outcome.
    Contradiction = 3,
    /// Candidate storage missing. A setup defect.
    Failed = 4,
}

impl GenerationPhase {
    /// Checks if the engine will never change this phase again.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Contradiction | Self::Failed)
    }
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialized => "INITIALIZED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Contradiction => "CONTRADICTION",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Per-node collapse progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationState {
    /// Current phase.
    pub phase: GenerationPhase,
    /// Ticks spent advancing without collapsing.
    pub iteration: u32,
    /// Live candidate count.
    pub entropy: u32,
    /// Assigned tile id, zero until collapsed.
    pub assigned_id: TileId,
    /// Mirror of `phase == Completed`.
    pub collapsed: bool,
}

impl GenerationState {
    /// Creates a fresh state at `Initialized`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: GenerationPhase::Initialized,
            iteration: 0,
            entropy: 0,
            assigned_id: 0,
            collapsed: false,
        }
    }

    /// Checks if the phase is terminal.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Records a collapse to `tile_id`.
    #[inline]
    pub(crate) fn complete(&mut self, tile_id: TileId) {
        self.phase = GenerationPhase::Completed;
        self.assigned_id = tile_id;
        self.collapsed = true;
        self.entropy = 1;
    }

    /// Records a terminal failure phase with no live candidates.
    #[inline]
    pub(crate) fn terminate(&mut self, phase: GenerationPhase) {
        debug_assert!(matches!(
            phase,
            GenerationPhase::Contradiction | GenerationPhase::Failed
        ));
        self.phase = phase;
        self.entropy = 0;
        self.collapsed = false;
    }
}
