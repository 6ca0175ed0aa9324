//! # Candidate Sets
//!
//! The remaining domain of possible tile/archetype assignments for a node.
//!
//! Tile ids are unique within a set. Insertion order is kept so weighted
//! draws are reproducible, but carries no meaning otherwise.

use serde::{Deserialize, Serialize};

/// Tile/archetype identifier. Zero means "unassigned".
pub type TileId = u32;

/// A live possibility for a node's final assignment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Tile/archetype id.
    pub tile_id: TileId,
    /// Selection weight for forced resolution.
    pub weight: f32,
}

impl Candidate {
    /// Creates a new candidate.
    #[inline]
    #[must_use]
    pub const fn new(tile_id: TileId, weight: f32) -> Self {
        Self { tile_id, weight }
    }

    /// Weight as used by weighted draws: non-finite and negative weights
    /// count as zero.
    #[inline]
    #[must_use]
    pub fn effective_weight(self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            f64::from(self.weight)
        } else {
            0.0
        }
    }
}

/// Ordered list of candidates with unique tile ids.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Candidate>", into = "Vec<Candidate>")]
pub struct CandidateSet {
    /// Entries in insertion order.
    entries: Vec<Candidate>,
}

impl CandidateSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a set from candidates. Later duplicates of a tile id are
    /// dropped.
    #[must_use]
    pub fn from_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut set = Self::new();
        for candidate in candidates {
            set.insert(candidate);
        }
        set
    }

    /// Builds a set of tile ids sharing weight `1.0`.
    #[must_use]
    pub fn uniform(tile_ids: impl IntoIterator<Item = TileId>) -> Self {
        Self::from_candidates(tile_ids.into_iter().map(|id| Candidate::new(id, 1.0)))
    }

    /// Adds a candidate.
    ///
    /// Returns `false` (and leaves the set unchanged) if the tile id is
    /// already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.contains(candidate.tile_id) {
            return false;
        }
        self.entries.push(candidate);
        true
    }

    /// Removes a tile id, returning its entry if it was present.
    pub fn remove(&mut self, tile_id: TileId) -> Option<Candidate> {
        let position = self.entries.iter().position(|c| c.tile_id == tile_id)?;
        Some(self.entries.remove(position))
    }

    /// Keeps only the candidates matching the predicate.
    pub fn retain(&mut self, keep: impl FnMut(&Candidate) -> bool) {
        self.entries.retain(keep);
    }

    /// Removes every candidate.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Truncates the set to the single entry for `tile_id`.
    ///
    /// Returns `false` (and leaves the set unchanged) if the tile id is not
    /// present.
    pub fn collapse_to(&mut self, tile_id: TileId) -> bool {
        let Some(chosen) = self.get(tile_id) else {
            return false;
        };
        self.entries.clear();
        self.entries.push(chosen);
        true
    }

    /// Gets the entry for a tile id.
    #[must_use]
    pub fn get(&self, tile_id: TileId) -> Option<Candidate> {
        self.entries.iter().copied().find(|c| c.tile_id == tile_id)
    }

    /// Checks if a tile id is present.
    #[inline]
    #[must_use]
    pub fn contains(&self, tile_id: TileId) -> bool {
        self.entries.iter().any(|c| c.tile_id == tile_id)
    }

    /// Number of candidates.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of candidates as an entropy value.
    #[inline]
    #[must_use]
    pub fn entropy(&self) -> u32 {
        u32::try_from(self.entries.len()).unwrap_or(u32::MAX)
    }

    /// Checks if no candidates remain.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The only remaining candidate, if exactly one remains.
    #[inline]
    #[must_use]
    pub fn single(&self) -> Option<Candidate> {
        match self.entries.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// All candidates in insertion order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Candidate] {
        &self.entries
    }

    /// Iterates over candidates in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    /// Iterates over tile ids in insertion order.
    #[inline]
    pub fn tile_ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.entries.iter().map(|c| c.tile_id)
    }

    /// Sum of effective weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|c| c.effective_weight()).sum()
    }

    /// Selects a candidate from a roll in `[0, 1)`.
    ///
    /// Candidates are chosen proportionally to their effective weight. If no
    /// candidate has positive weight, the roll selects uniformly. Returns
    /// `None` only for an empty set.
    #[must_use]
    pub fn pick_weighted(&self, roll: f64) -> Option<Candidate> {
        if self.entries.is_empty() {
            return None;
        }
        let roll = roll.clamp(0.0, 1.0);

        let total = self.total_weight();
        if total <= 0.0 {
            let len = self.entries.len();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let index = ((roll * len as f64) as usize).min(len - 1);
            return Some(self.entries[index]);
        }

        let target = roll * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for candidate in &self.entries {
            let weight = candidate.effective_weight();
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_positive = Some(*candidate);
            if target < cumulative {
                return Some(*candidate);
            }
        }

        // Rounding can leave target == total.
        last_positive
    }

    /// Tile id of the lowest-weight candidate. Ties go to the highest tile
    /// id.
    #[must_use]
    pub fn lightest(&self) -> Option<TileId> {
        self.entries
            .iter()
            .min_by(|a, b| {
                a.effective_weight()
                    .total_cmp(&b.effective_weight())
                    .then_with(|| b.tile_id.cmp(&a.tile_id))
            })
            .map(|c| c.tile_id)
    }
}

impl From<Vec<Candidate>> for CandidateSet {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self::from_candidates(candidates)
    }
}

impl From<CandidateSet> for Vec<Candidate> {
    fn from(set: CandidateSet) -> Self {
        set.entries
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self::from_candidates(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_ids_stay_unique() {
        let mut set = CandidateSet::uniform([1, 2, 3]);
        assert!(!set.insert(Candidate::new(2, 9.0)));
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(2), Some(Candidate::new(2, 1.0)));

        let built = CandidateSet::from_candidates([
            Candidate::new(5, 1.0),
            Candidate::new(5, 3.0),
            Candidate::new(6, 1.0),
        ]);
        assert_eq!(built.tile_ids().collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_collapse_to_truncates() {
        let mut set = CandidateSet::uniform([1, 2, 3, 4]);
        assert!(set.collapse_to(3));
        assert_eq!(set.single(), Some(Candidate::new(3, 1.0)));

        assert!(!set.collapse_to(9));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_pick_weighted_respects_weights() {
        let set = CandidateSet::from_candidates([
            Candidate::new(1, 1.0),
            Candidate::new(2, 0.0),
            Candidate::new(3, 3.0),
        ]);
        // Cumulative: tile 1 covers [0, 0.25), tile 3 covers [0.25, 1).
        assert_eq!(set.pick_weighted(0.0).map(|c| c.tile_id), Some(1));
        assert_eq!(set.pick_weighted(0.24).map(|c| c.tile_id), Some(1));
        assert_eq!(set.pick_weighted(0.25).map(|c| c.tile_id), Some(3));
        assert_eq!(set.pick_weighted(0.999).map(|c| c.tile_id), Some(3));
        assert_eq!(set.pick_weighted(1.0).map(|c| c.tile_id), Some(3));
    }

    #[test]
    fn test_pick_weighted_uniform_fallback() {
        let set = CandidateSet::from_candidates([
            Candidate::new(7, 0.0),
            Candidate::new(8, f32::NAN),
            Candidate::new(9, -2.0),
        ]);
        assert_eq!(set.total_weight(), 0.0);
        assert_eq!(set.pick_weighted(0.0).map(|c| c.tile_id), Some(7));
        assert_eq!(set.pick_weighted(0.5).map(|c| c.tile_id), Some(8));
        assert_eq!(set.pick_weighted(0.99).map(|c| c.tile_id), Some(9));
        assert!(CandidateSet::new().pick_weighted(0.5).is_none());
    }

    #[test]
    fn test_lightest_tie_breaks_on_highest_id() {
        let set = CandidateSet::from_candidates([
            Candidate::new(1, 2.0),
            Candidate::new(2, 0.5),
            Candidate::new(3, 0.5),
        ]);
        assert_eq!(set.lightest(), Some(3));
        assert_eq!(CandidateSet::new().lightest(), None);
    }

    #[test]
    fn test_toml_deserialize_dedups() {
        #[derive(Deserialize)]
        struct Wrapper {
            candidates: CandidateSet,
        }
        let parsed: Wrapper = toml::from_str(
            r#"
            candidates = [
                { tile_id = 4, weight = 1.0 },
                { tile_id = 4, weight = 2.0 },
                { tile_id = 5, weight = 0.5 },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.candidates.len(), 2);
        assert_eq!(parsed.candidates.entropy(), 2);
    }
}
