//! # Nodes
//!
//! Addressable records forming the district/sector/room hierarchy.
//!
//! Nodes own no behavior. They supply stable identity and coordinates to
//! the collapse engine and the graph materializer.

mod id;
mod registry;

pub use id::{Node, NodeAddress, NodeId, NodeLevel, NodeRef};
pub use registry::NodeRegistry;
