//! # Node Storage
//!
//! Dense per-node slots aligned with [`NodeRegistry`](crate::NodeRegistry)
//! insertion order.
//!
//! - Access is O(1) via the node's dense index
//! - Iteration is cache-friendly (contiguous memory)
//! - Slices can be handed to data-parallel passes

/// Dense storage holding one `T` per registered node.
///
/// Slot `i` belongs to the node at dense index `i` in the registry.
/// Slots are only ever appended, mirroring the insert-only registry.
///
/// # Example
///
/// ```rust,ignore
/// let mut states: NodeStorage<GenerationState> = NodeStorage::with_capacity(1024);
/// let slot = states.push(GenerationState::new());
/// assert_eq!(registry.index_of(id), Some(slot));
/// ```
#[derive(Clone, Debug)]
pub struct NodeStorage<T> {
    /// The dense slot array.
    data: Vec<T>,
}

impl<T> NodeStorage<T> {
    /// Creates empty storage.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates empty storage with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Appends the slot for the next node, returning its index.
    pub fn push(&mut self, value: T) -> usize {
        self.data.push(value);
        self.data.len() - 1
    }

    /// Gets a slot by dense index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Gets a mutable slot by dense index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// Returns all slots.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns all slots mutably.
    ///
    /// Useful for batch processing.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterates over all slots with their indices.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.data.iter().enumerate()
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if there are no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for NodeStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_dense_index() {
        let mut storage = NodeStorage::new();
        assert_eq!(storage.push(10u32), 0);
        assert_eq!(storage.push(20u32), 1);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get(1), Some(&20));
        assert!(storage.get(2).is_none());
    }

    #[test]
    fn test_mutation_through_slice() {
        let mut storage = NodeStorage::with_capacity(4);
        for i in 0..4u32 {
            storage.push(i);
        }
        for slot in storage.as_mut_slice() {
            *slot *= 2;
        }
        assert_eq!(storage.as_slice(), &[0, 2, 4, 6]);
    }
}
