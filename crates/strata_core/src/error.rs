//! # Error Types
//!
//! Setup-time errors for registry construction and configuration loading.
//!
//! Per-node generation outcomes (contradictions, failures) are NOT errors;
//! they are recorded as state on the node and inspected after the run.

use thiserror::Error;

use crate::node::NodeId;

/// Errors that can occur while building or configuring a world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrataError {
    /// A node with this id is already registered.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Node id zero is reserved for "no parent".
    #[error("invalid node id: {0}")]
    InvalidNodeId(NodeId),

    /// An operation referenced a node that is not registered.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Invalid configuration or blueprint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for STRATA setup operations.
pub type StrataResult<T> = Result<T, StrataError>;
