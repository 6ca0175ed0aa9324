//! # Generation Configuration
//!
//! Tunables for a generation run, loaded once at startup from TOML.
//!
//! ```toml
//! world_seed = 42
//! max_ticks = 200
//!
//! [collapse]
//! iteration_threshold = 100
//! parallel = true
//! default_domain = [
//!     { tile_id = 1, weight = 1.0 },
//!     { tile_id = 2, weight = 1.0 },
//! ]
//! ```
//!
//! Every field has a default; an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{StrataError, StrataResult, WorldSeed};

use crate::candidate::CandidateSet;

/// Collapse engine tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollapseConfig {
    /// Iterations a node may advance before forced resolution.
    pub iteration_threshold: u32,
    /// Run the per-node pass on the rayon pool.
    pub parallel: bool,
    /// Domain seeded into nodes without an externally supplied one.
    pub default_domain: CandidateSet,
}

impl CollapseConfig {
    /// Default iteration budget.
    pub const DEFAULT_ITERATION_THRESHOLD: u32 = 100;

    /// Default domain size.
    pub const DEFAULT_DOMAIN_SIZE: u32 = 4;

    /// Largest accepted budget. Leaves room for `iteration` to pass it.
    pub const MAX_ITERATION_THRESHOLD: u32 = u32::MAX - 1;

    /// Upper bound on ticks for a node to reach a terminal phase without
    /// any upstream narrowing: one seeding tick, `threshold + 1` advancing
    /// ticks, one forced-resolution tick.
    #[inline]
    #[must_use]
    pub fn worst_case_ticks(&self) -> u64 {
        u64::from(self.iteration_threshold) + 3
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the threshold is zero or above
    /// [`MAX_ITERATION_THRESHOLD`](Self::MAX_ITERATION_THRESHOLD), or the
    /// default domain is empty or contains the reserved tile id 0.
    pub fn validate(&self) -> StrataResult<()> {
        if self.iteration_threshold == 0 {
            return Err(StrataError::InvalidConfig(
                "collapse.iteration_threshold must be at least 1".to_string(),
            ));
        }
        if self.iteration_threshold > Self::MAX_ITERATION_THRESHOLD {
            return Err(StrataError::InvalidConfig(format!(
                "collapse.iteration_threshold must be at most {}",
                Self::MAX_ITERATION_THRESHOLD
            )));
        }
        if self.default_domain.is_empty() {
            return Err(StrataError::InvalidConfig(
                "collapse.default_domain must not be empty".to_string(),
            ));
        }
        if self.default_domain.contains(0) {
            return Err(StrataError::InvalidConfig(
                "collapse.default_domain: tile id 0 is reserved for unassigned".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            iteration_threshold: Self::DEFAULT_ITERATION_THRESHOLD,
            parallel: true,
            default_domain: CandidateSet::uniform(1..=Self::DEFAULT_DOMAIN_SIZE),
        }
    }
}

/// Configuration for a whole generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Seed for every random draw.
    pub world_seed: WorldSeed,
    /// Tick cap for [`GenerationDriver::run`](crate::GenerationDriver::run).
    /// Defaults to the collapse engine's worst-case bound.
    pub max_ticks: Option<u64>,
    /// Collapse engine tunables.
    pub collapse: CollapseConfig,
}

impl GenerationConfig {
    /// Creates the default configuration with a specific seed.
    #[must_use]
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self {
            world_seed: seed,
            ..Self::default()
        }
    }

    /// Tick cap actually applied by the driver.
    #[must_use]
    pub fn tick_cap(&self) -> u64 {
        self.max_ticks
            .unwrap_or_else(|| self.collapse.worst_case_ticks())
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse or fails validation.
    pub fn from_toml_str(source: &str) -> StrataResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StrataError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> StrataResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if any section is invalid.
    pub fn validate(&self) -> StrataResult<()> {
        if self.max_ticks == Some(0) {
            return Err(StrataError::InvalidConfig(
                "max_ticks must be at least 1".to_string(),
            ));
        }
        self.collapse.validate()
    }
}
