//! # Domain Narrowing
//!
//! The collapse engine only drives candidate sets to termination. Removing
//! candidates is the job of upstream constraint producers, plugged in here.
//!
//! Narrowers run once per tick on every `InProgress` node, before the
//! collapse pass. They see one node at a time and must not depend on other
//! nodes, which keeps the pass data-parallel.

use std::collections::{HashMap, HashSet};

use strata_core::{Node, NodeId};

use crate::candidate::{CandidateSet, TileId};
use crate::state::GenerationState;

/// An upstream constraint producer.
pub trait DomainNarrower: Sync {
    /// Removes candidates that are no longer valid for `node`.
    ///
    /// Emptying the set is allowed; the engine reports it as a
    /// contradiction.
    fn narrow(&self, node: &Node, state: &GenerationState, candidates: &mut CandidateSet);
}

/// Leaves every domain untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNarrowing;

impl DomainNarrower for NoNarrowing {
    fn narrow(&self, _node: &Node, _state: &GenerationState, _candidates: &mut CandidateSet) {}
}

/// Bans tile ids globally or per node.
#[derive(Clone, Debug, Default)]
pub struct TileBans {
    /// Banned for every node.
    global: HashSet<TileId>,
    /// Banned for specific nodes.
    per_node: HashMap<NodeId, HashSet<TileId>>,
}

impl TileBans {
    /// Creates an empty ban list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bans a tile id everywhere.
    #[must_use]
    pub fn ban_everywhere(mut self, tile_id: TileId) -> Self {
        self.global.insert(tile_id);
        self
    }

    /// Bans a tile id for one node.
    #[must_use]
    pub fn ban(mut self, node: NodeId, tile_id: TileId) -> Self {
        self.per_node.entry(node).or_default().insert(tile_id);
        self
    }

    fn is_banned(&self, node: NodeId, tile_id: TileId) -> bool {
        self.global.contains(&tile_id)
            || self
                .per_node
                .get(&node)
                .is_some_and(|bans| bans.contains(&tile_id))
    }
}

impl DomainNarrower for TileBans {
    fn narrow(&self, node: &Node, _state: &GenerationState, candidates: &mut CandidateSet) {
        candidates.retain(|c| !self.is_banned(node.id, c.tile_id));
    }
}

/// Removes the lowest-weight candidate each tick until one remains.
///
/// Ties go to the highest tile id, so runs are reproducible.
#[derive(Clone, Copy, Debug, Default)]
pub struct DropLightest;

impl DomainNarrower for DropLightest {
    fn narrow(&self, _node: &Node, _state: &GenerationState, candidates: &mut CandidateSet) {
        if candidates.len() <= 1 {
            return;
        }
        if let Some(lightest) = candidates.lightest() {
            candidates.remove(lightest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use strata_core::NodeLevel;

    fn node(id: u32) -> Node {
        Node::new(NodeId::new(id), NodeLevel::Room, (0, 0), NodeId::new(1))
    }

    #[test]
    fn test_tile_bans() {
        let bans = TileBans::new().ban_everywhere(1).ban(NodeId::new(5), 2);
        let state = GenerationState::new();

        let mut five = CandidateSet::uniform([1, 2, 3]);
        bans.narrow(&node(5), &state, &mut five);
        assert_eq!(five.tile_ids().collect::<Vec<_>>(), vec![3]);

        let mut six = CandidateSet::uniform([1, 2, 3]);
        bans.narrow(&node(6), &state, &mut six);
        assert_eq!(six.tile_ids().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_drop_lightest_stops_at_one() {
        let state = GenerationState::new();
        let mut set = CandidateSet::from_candidates([
            Candidate::new(1, 3.0),
            Candidate::new(2, 1.0),
            Candidate::new(3, 2.0),
        ]);
        DropLightest.narrow(&node(2), &state, &mut set);
        assert_eq!(set.tile_ids().collect::<Vec<_>>(), vec![1, 3]);
        DropLightest.narrow(&node(2), &state, &mut set);
        assert_eq!(set.tile_ids().collect::<Vec<_>>(), vec![1]);
        DropLightest.narrow(&node(2), &state, &mut set);
        assert_eq!(set.len(), 1);
    }
}
