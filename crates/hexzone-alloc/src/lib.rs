//! Hexzone Allocator
//!
//! Places one zone per work session on an unbounded hex lattice, never
//! letting two sessions share a cell, and tracks decorative height on the
//! cells in between.
//!
//! # Components
//!
//! - **OccupancyTable**: cell ↔ owner, always mutual inverses
//! - **HexAllocator**: spiral fill with a persistent cursor, peek/consume,
//!   nearest-free search around a target
//! - **ElevationModel**: painted height on free cells, elevation on occupied
//!   ones, both in 0.5 steps capped at 100
//! - **GridSnapshot**: JSON persistence replayed in step units
//!
//! # Usage
//!
//! ```
//! use hexzone_alloc::{HexAllocator, Placement};
//! use hexzone_topology::HexCoord;
//!
//! let mut alloc = HexAllocator::default();
//! alloc.occupy(HexCoord::ORIGIN, "S1").unwrap();
//!
//! // Preview, then commit.
//! assert_eq!(alloc.peek_next_in_spiral(), Placement::Free(HexCoord::new(1, 0)));
//! let hex = alloc.next_in_spiral().hex();
//! alloc.occupy(hex, "S2").unwrap();
//! assert_eq!(alloc.owner_hex("S2"), Some(HexCoord::new(1, 0)));
//! ```

mod allocator;
mod config;
mod elevation;
mod error;
mod occupancy;
mod snapshot;

pub use allocator::{HexAllocator, Placement};
pub use config::{env_or, AllocatorConfig, DEFAULT_RING_SEARCH_LIMIT, DEFAULT_SPIRAL_SEARCH_LIMIT};
pub use elevation::{
    BrushAction, BrushOutcome, Color, ElevationModel, Height, PaintedCell, ParseColorError,
    HEIGHT_STEP, MAX_HEIGHT, MAX_STEPS,
};
pub use error::{AllocError, Result};
pub use occupancy::{OccupancyTable, OwnerId};
pub use snapshot::{GridSnapshot, PaintedCellRecord, RestoreReport, ZoneRecord};
