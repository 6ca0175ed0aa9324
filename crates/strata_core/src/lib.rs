//! # STRATA Core
//!
//! Identity and addressing for tiered world generation.
//!
//! ## Architecture Rules
//!
//! 1. **Ids, not pointers** - parents and edge endpoints are plain ids
//!    resolved through the registry
//! 2. **Insert-only** - nodes are never removed or relocated mid-run
//! 3. **Dense storage** - per-node data lives in slots aligned with
//!    registry insertion order
//! 4. **Keyed randomness** - every random draw comes from a stream keyed by
//!    `(world_seed, purpose, node_id)`
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{NodeId, NodeLevel, NodeRegistry};
//!
//! let mut registry = NodeRegistry::new();
//! let district = registry.spawn(NodeLevel::District, (0, 0), NodeId::NONE)?;
//! let sector = registry.spawn(NodeLevel::Sector, (1, 0), district)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod node;
pub mod seed;
pub mod storage;

pub use error::{StrataError, StrataResult};
pub use node::{Node, NodeAddress, NodeId, NodeLevel, NodeRef, NodeRegistry};
pub use seed::WorldSeed;
pub use storage::NodeStorage;
