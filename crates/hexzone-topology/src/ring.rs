//! Ring walks and neighborhood queries.
//!
//! A ring of radius `n > 0` starts at `center + n·E` and walks six sides of
//! `n` steps each. Side `k` moves along `DIRECTIONS[(k + 2) % 6]`, so ring 1
//! around the origin is visited as:
//!
//! ```text
//! (1,0) → (1,-1) → (0,-1) → (-1,0) → (-1,1) → (0,1)
//! ```
//!
//! The spiral fill order concatenates these walks, so this order must stay
//! stable.

use crate::{HexCoord, DIRECTION_COUNT};

/// Direction walked along side `side` of a ring.
#[inline]
pub(crate) const fn side_direction(side: usize) -> HexCoord {
    HexCoord::DIRECTIONS[(side + 2) % DIRECTION_COUNT]
}

/// The six neighbors of `hex`, in [`HexCoord::DIRECTIONS`] order.
pub fn neighbors(hex: HexCoord) -> [HexCoord; DIRECTION_COUNT] {
    hex.neighbors()
}

/// Check if two cells share an edge.
pub fn are_neighbors(a: HexCoord, b: HexCoord) -> bool {
    HexCoord::DIRECTIONS.contains(&(b - a))
}

/// Lazy walk over the cells at exact distance `radius` from `center`.
#[derive(Debug, Clone)]
pub struct Ring {
    current: HexCoord,
    radius: u64,
    side: usize,
    step: u64,
    done: bool,
}

impl Ring {
    /// Start a walk around `center` at distance `radius`.
    pub fn new(center: HexCoord, radius: u64) -> Self {
        Self {
            current: center + HexCoord::DIRECTIONS[0] * radius as i64,
            radius,
            side: 0,
            step: 0,
            done: false,
        }
    }

    fn remaining(&self) -> u64 {
        if self.done {
            0
        } else if self.radius == 0 {
            1
        } else {
            (DIRECTION_COUNT - self.side) as u64 * self.radius - self.step
        }
    }
}

impl Iterator for Ring {
    type Item = HexCoord;

    fn next(&mut self) -> Option<HexCoord> {
        if self.done {
            return None;
        }
        let hex = self.current;

        if self.radius == 0 {
            self.done = true;
            return Some(hex);
        }

        self.current = self.current + side_direction(self.side);
        self.step += 1;
        if self.step == self.radius {
            self.step = 0;
            self.side += 1;
            if self.side == DIRECTION_COUNT {
                self.done = true;
            }
        }
        Some(hex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ring {}

impl std::iter::FusedIterator for Ring {}

/// All cells at exact distance `radius` from `center`, in walk order.
///
/// Returns `[center]` for radius 0 and `6·radius` distinct cells otherwise.
pub fn ring(center: HexCoord, radius: u64) -> Vec<HexCoord> {
    Ring::new(center, radius).collect()
}

/// All cells within distance `radius - 1` of `center`.
///
/// `radius` counts rings including the center, so `filled_disk(c, 1)` is
/// just `c` and `filled_disk(c, 0)` is empty. Order is unspecified; use
/// [`ring`] when the order matters.
pub fn filled_disk(center: HexCoord, radius: u64) -> Vec<HexCoord> {
    if radius == 0 {
        return Vec::new();
    }
    let reach = (radius - 1) as i64;
    let mut cells = Vec::with_capacity((1 + 3 * reach * (reach + 1)) as usize);

    for dq in -reach..=reach {
        for dr in -reach..=reach {
            if dq.abs() + dr.abs() + (dq + dr).abs() <= 2 * reach {
                cells.push(center + HexCoord::new(dq, dr));
            }
        }
    }
    cells
}
