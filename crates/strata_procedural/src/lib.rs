//! # STRATA Procedural Topology
//!
//! Deterministic tile assignment and connectivity for tiered worlds
//! (districts, sectors, rooms).
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and inputs always produce the same world
//! 2. **Bounded**: Every node terminates; stalled nodes are force-resolved
//! 3. **Isolated**: One node's contradiction or failure never blocks another
//! 4. **Once-only graph**: Adjacency is materialized a single time per run
//!
//! ## Core Components
//!
//! - `CollapseEngine`: Per-node state machine assigning tile ids
//! - `DomainNarrower`: Pluggable upstream constraint producers
//! - `ConnectionGraph`: Authored edges to deduplicated adjacency buffers
//! - `GenerationWorld`: Registry plus per-node state, candidates and graph
//! - `GenerationDriver`: Ordered ticks until convergence
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::{DropLightest, GenerationConfig, GenerationDriver, WorldBlueprint};
//!
//! let blueprint = WorldBlueprint::from_toml_file("data/sample_world.toml")?;
//! let driver = GenerationDriver::with_narrower(GenerationConfig::default(), DropLightest);
//! let mut world = driver.build(&blueprint)?;
//!
//! let report = driver.run(&mut world);
//! assert!(report.is_healthy());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod blueprint;
pub mod candidate;
pub mod collapse;
pub mod config;
pub mod driver;
pub mod graph;
pub mod narrowing;
pub mod state;
pub mod world;

pub use blueprint::{DomainSpec, NodeSpec, WorldBlueprint};
pub use candidate::{Candidate, CandidateSet, TileId};
pub use collapse::{CollapseEngine, TickReport, Transition, FORCED_COLLAPSE_STREAM};
pub use config::{CollapseConfig, GenerationConfig};
pub use driver::{GenerationDriver, GenerationReport};
pub use graph::{
    Connection, ConnectionGraph, ConnectionKey, EdgeDeclaration, EdgeKind, GraphBuiltMarker,
    GraphReadiness, MaterializeReport, PolarityMask,
};
pub use narrowing::{DomainNarrower, DropLightest, NoNarrowing, TileBans};
pub use state::{GenerationPhase, GenerationState};
pub use world::{GenerationWorld, PhaseCounts};
