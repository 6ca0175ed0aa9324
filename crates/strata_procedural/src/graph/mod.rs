//! # Connection Graph
//!
//! Authored edge declarations in, per-node adjacency buffers out.
//!
//! Downstream systems (navigation, gating) read the buffers after the
//! [`GraphBuiltMarker`] exists.

mod edge;
mod materializer;

pub use edge::{Connection, ConnectionKey, EdgeDeclaration, EdgeKind, PolarityMask};
pub use materializer::{ConnectionGraph, GraphBuiltMarker, GraphReadiness, MaterializeReport};
