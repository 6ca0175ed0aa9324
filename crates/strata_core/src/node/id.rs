//! # Node Identity
//!
//! Nodes are addressed two ways:
//! - By id: a monotonically assigned `u32`, stable for the whole run
//! - By address: the `(level, coordinates)` pair authoring tools use

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node.
///
/// Ids start at 1. Id 0 is [`NodeId::NONE`], used as the parent of
/// districts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// "No node" sentinel.
    pub const NONE: Self = Self(0);

    /// Creates a node id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Checks if this is the "no node" sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tier of a node in the world hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum NodeLevel {
    /// Top tier. Districts have no parent.
    District = 0,
    /// Middle tier. Parent is a district.
    Sector = 1,
    /// Leaf tier. Parent is a sector.
    Room = 2,
}

impl NodeLevel {
    /// Converts from u8, returning `None` for out-of-range values.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::District),
            1 => Some(Self::Sector),
            2 => Some(Self::Room),
            _ => None,
        }
    }

    /// Level a parent of this level must have, if any.
    #[inline]
    #[must_use]
    pub const fn parent_level(self) -> Option<Self> {
        match self {
            Self::District => None,
            Self::Sector => Some(Self::District),
            Self::Room => Some(Self::Sector),
        }
    }
}

impl fmt::Display for NodeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::District => "district",
            Self::Sector => "sector",
            Self::Room => "room",
        };
        f.write_str(name)
    }
}

/// A node in the district/sector/room hierarchy.
///
/// Nodes are created once during bootstrap and never relocated.
/// `parent_id` is a lookup key, not an ownership link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    /// Unique id.
    pub id: NodeId,
    /// Grid coordinates within the level.
    pub coordinates: (i32, i32),
    /// Hierarchy tier.
    pub level: NodeLevel,
    /// Parent node, or [`NodeId::NONE`] for districts.
    pub parent_id: NodeId,
}

impl Node {
    /// Creates a new node record.
    #[inline]
    #[must_use]
    pub const fn new(id: NodeId, level: NodeLevel, coordinates: (i32, i32), parent_id: NodeId) -> Self {
        Self {
            id,
            coordinates,
            level,
            parent_id,
        }
    }

    /// Returns this node's address.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> NodeAddress {
        NodeAddress {
            level: self.level,
            x: self.coordinates.0,
            y: self.coordinates.1,
        }
    }
}

/// `(level, coordinates)` pair identifying a node for authoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeAddress {
    /// Hierarchy tier.
    pub level: NodeLevel,
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl NodeAddress {
    /// Creates a new address.
    #[inline]
    #[must_use]
    pub const fn new(level: NodeLevel, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }
}

/// Authored reference to a node, resolved through the registry.
///
/// In TOML either a bare integer id (`from = 3`) or an inline address
/// (`from = { level = "room", x = 1, y = 2 }`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    /// Reference by id.
    Id(NodeId),
    /// Reference by address.
    Address(NodeAddress),
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        Self::Id(id)
    }
}

impl From<NodeAddress> for NodeRef {
    fn from(address: NodeAddress) -> Self {
        Self::Address(address)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Address(a) => write!(f, "{} ({}, {})", a.level, a.x, a.y),
        }
    }
}
