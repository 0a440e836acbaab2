//! Error types for hexzone-alloc.

use hexzone_topology::{HexCoord, LayoutError};
use thiserror::Error;

use crate::OwnerId;

/// Result type for allocator operations.
pub type Result<T> = std::result::Result<T, AllocError>;

/// Errors that can occur in allocator operations.
#[derive(Debug, Error)]
pub enum AllocError {
    /// The cell is already held by another owner.
    #[error("hex {hex} is already occupied by {occupant}")]
    HexOccupied { hex: HexCoord, occupant: OwnerId },

    /// The owner already holds a different cell.
    #[error("owner {owner} already occupies {hex}")]
    OwnerAlreadyPlaced { owner: OwnerId, hex: HexCoord },

    /// A bounded search found no free cell.
    #[error("no free hex found within {limit} {unit}")]
    SearchExhausted { limit: u64, unit: &'static str },

    /// Configuration value could not be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Layout parameters were rejected.
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    /// Snapshot (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
