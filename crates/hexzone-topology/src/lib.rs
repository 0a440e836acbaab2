//! Hexzone Topology
//!
//! Coordinate math for an unbounded hexagonal lattice.
//!
//! # Coordinate Systems
//!
//! Cells are addressed with axial coordinates `(q, r)`. The implicit third
//! cube axis is `y = -q - r`, which keeps every cube coordinate on the
//! `x + y + z = 0` plane. Cube form is only used for rounding and distance.
//!
//! World space is a pointy-top layout on the `x/z` ground plane, scaled by a
//! circumradius and a spacing factor (see [`HexLayout`]).
//!
//! # Fill Order
//!
//! Cells are enumerated outward in rings around the origin. Ring `n` holds
//! `6n` cells walked in a fixed order starting from `(n, 0)`, so every
//! natural number maps to exactly one cell:
//!
//! ```text
//! index:  0      1       2        3        4       5       6      7 ...
//! cell: (0,0) (1,0) (1,-1) (0,-1) (-1,0) (-1,1) (0,1) (2,0) ...
//! ```

mod hex;
mod layout;
mod ring;
mod spiral;

pub use hex::{CubeCoord, FractionalHex, HexCoord};
pub use layout::{HexLayout, LayoutError, WorldPos};
pub use ring::{are_neighbors, filled_disk, neighbors, ring, Ring};
pub use spiral::{
    hex_to_index, index_to_hex, ring_start, slots_in_ring, total_slots_through, Spiral,
    SpiralIndex,
};

/// Number of neighbors of every cell.
pub const DIRECTION_COUNT: usize = 6;

// Each ring walks six sides, one per direction.
const _: () = assert!(HexCoord::DIRECTIONS.len() == DIRECTION_COUNT);
