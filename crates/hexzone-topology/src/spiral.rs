//! Spiral fill order.
//!
//! Deterministic bijection between natural numbers and cells: index 0 is the
//! origin, then ring 1, ring 2, ... each in ring walk order. Ring `n` holds
//! indices `ring_start(n) .. ring_start(n + 1)` where
//! `ring_start(n) = 1 + 3n(n-1)`.
//!
//! Within ring `n`, index `i` sits on side `⌊k / n⌋` at offset `k mod n`
//! (`k = i - ring_start(n)`). Side `s` starts at the corner
//! `DIRECTIONS[s] · n`, so no walk is needed to locate a cell.

use crate::ring::side_direction;
use crate::{HexCoord, DIRECTION_COUNT};

/// A position in the spiral fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiralIndex(pub u64);

impl SpiralIndex {
    /// Origin slot.
    pub const ORIGIN: Self = Self(0);

    /// Create from raw index.
    #[inline]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The following index.
    #[inline]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Determine which ring this index falls in.
    ///
    /// Ring 0: index 0
    /// Ring 1: indices 1-6
    /// Ring 2: indices 7-18
    /// Ring n: indices from ring_start(n) to ring_start(n+1)-1
    pub fn ring(&self) -> u64 {
        if self.0 == 0 {
            return 0;
        }

        // Smallest n with total_slots_through(n) > index.
        let index = self.0 as u128;
        let mut low = 1u64;
        let mut high = ((self.0 as f64).sqrt() as u64) + 2;

        while low < high {
            let mid = low + (high - low) / 2;
            if slots_through_wide(mid) <= index {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }

    /// Offset within the ring (0 to 6n-1 for ring n > 0).
    pub fn offset_in_ring(&self) -> u64 {
        self.0 - ring_start(self.ring())
    }
}

impl From<u64> for SpiralIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SpiralIndex> for u64 {
    fn from(value: SpiralIndex) -> Self {
        value.0
    }
}

impl std::fmt::Display for SpiralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number of cells in ring n: 1 for the origin, 6n otherwise.
#[inline]
pub const fn slots_in_ring(ring: u64) -> u64 {
    if ring == 0 {
        1
    } else {
        6 * ring
    }
}

/// First spiral index of ring n: `1 + 3n(n-1)` for n > 0, 0 for the origin.
#[inline]
pub const fn ring_start(ring: u64) -> u64 {
    if ring == 0 {
        0
    } else {
        1 + 3 * ring * (ring - 1)
    }
}

/// Total cells through ring n (inclusive): `1 + 3n(n+1)`.
#[inline]
pub const fn total_slots_through(ring: u64) -> u64 {
    1 + 3 * ring * (ring + 1)
}

/// `total_slots_through` without overflow near the top of the u64 range.
#[inline]
fn slots_through_wide(ring: u64) -> u128 {
    let n = ring as u128;
    1 + 3 * n * (n + 1)
}

/// Iterator over cells in spiral order.
#[derive(Debug, Clone)]
pub struct Spiral {
    current: u64,
    limit: Option<u64>,
}

impl Spiral {
    /// An endless spiral starting from the origin.
    pub fn new() -> Self {
        Self::from_index(SpiralIndex::ORIGIN)
    }

    /// An endless spiral starting at `start`.
    pub fn from_index(start: SpiralIndex) -> Self {
        Self {
            current: start.0,
            limit: None,
        }
    }

    /// The first `count` cells of the spiral.
    pub fn take_slots(count: u64) -> Self {
        Self {
            current: 0,
            limit: Some(count),
        }
    }

    /// Every cell of rings `start_ring..=end_ring`.
    pub fn rings(start_ring: u64, end_ring: u64) -> Self {
        Self {
            current: ring_start(start_ring),
            limit: Some(total_slots_through(end_ring)),
        }
    }
}

impl Default for Spiral {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Spiral {
    type Item = HexCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(limit) = self.limit {
            if self.current >= limit {
                return None;
            }
        }

        let coord = index_to_hex(SpiralIndex(self.current));
        self.current += 1;
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.limit {
            Some(limit) => {
                let remaining = limit.saturating_sub(self.current) as usize;
                (remaining, Some(remaining))
            }
            None => (usize::MAX, None),
        }
    }
}

/// Convert a spiral index to its cell.
pub fn index_to_hex(index: SpiralIndex) -> HexCoord {
    if index.0 == 0 {
        return HexCoord::ORIGIN;
    }

    let ring = index.ring();
    let offset = index.0 - ring_start(ring);
    let side = (offset / ring) as usize;
    let along = (offset % ring) as i64;

    let corner = HexCoord::DIRECTIONS[side] * ring as i64;
    corner + side_direction(side) * along
}

/// Convert a cell to its spiral index. Inverse of [`index_to_hex`].
pub fn hex_to_index(hex: HexCoord) -> SpiralIndex {
    let ring = hex.ring();
    if ring == 0 {
        return SpiralIndex::ORIGIN;
    }

    for side in 0..DIRECTION_COUNT {
        let delta = hex - HexCoord::DIRECTIONS[side] * ring as i64;
        let dir = side_direction(side);
        // Direction components are 0 or ±1, so one nonzero axis gives the step count.
        let along = if dir.q != 0 {
            delta.q * dir.q
        } else {
            delta.r * dir.r
        };
        if along >= 0 && (along as u64) < ring && dir * along == delta {
            return SpiralIndex(ring_start(ring) + side as u64 * ring + along as u64);
        }
    }

    unreachable!("{} at distance {} lies on no side of its ring", hex, ring)
}
