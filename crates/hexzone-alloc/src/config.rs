//! Allocator configuration.

use std::str::FromStr;

use hexzone_topology::HexLayout;
use serde::{Deserialize, Serialize};

use crate::{AllocError, Result};

/// Default number of rings scanned by nearest-free search.
pub const DEFAULT_RING_SEARCH_LIMIT: u64 = 50;

/// Default number of spiral indices scanned per allocation.
pub const DEFAULT_SPIRAL_SEARCH_LIMIT: u64 = 1000;

/// Configuration for a [`HexAllocator`](crate::HexAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// World layout used for hit testing.
    pub layout: HexLayout,

    /// Rings scanned around a target before giving up.
    pub ring_search_limit: u64,

    /// Spiral indices scanned from the cursor before giving up.
    pub spiral_search_limit: u64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            layout: HexLayout::default(),
            ring_search_limit: DEFAULT_RING_SEARCH_LIMIT,
            spiral_search_limit: DEFAULT_SPIRAL_SEARCH_LIMIT,
        }
    }
}

impl AllocatorConfig {
    /// Default limits with the given layout.
    pub fn with_layout(layout: HexLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Create config from environment variables with sensible defaults.
    ///
    /// Reads `HEXZONE_HEX_RADIUS`, `HEXZONE_HEX_SPACING`,
    /// `HEXZONE_RING_LIMIT` and `HEXZONE_SPIRAL_LIMIT`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let radius = env_or("HEXZONE_HEX_RADIUS", defaults.layout.radius())?;
        let spacing = env_or("HEXZONE_HEX_SPACING", defaults.layout.spacing())?;
        let layout = HexLayout::new(radius, spacing)?;

        let config = Self {
            layout,
            ring_search_limit: env_or("HEXZONE_RING_LIMIT", defaults.ring_search_limit)?,
            spiral_search_limit: env_or("HEXZONE_SPIRAL_LIMIT", defaults.spiral_search_limit)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every search fail immediately.
    pub fn validate(&self) -> Result<()> {
        if self.ring_search_limit == 0 {
            return Err(AllocError::InvalidConfig(
                "ring_search_limit must be at least 1".into(),
            ));
        }
        if self.spiral_search_limit == 0 {
            return Err(AllocError::InvalidConfig(
                "spiral_search_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// A value that is set but does not parse is an
/// [`InvalidConfig`](AllocError::InvalidConfig) error carrying the parse
/// error text.
pub fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AllocError::InvalidConfig(format!("{}={:?}: {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
