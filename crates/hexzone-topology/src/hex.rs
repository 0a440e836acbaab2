//! Hexagonal coordinate system using axial coordinates.
//!
//! Axial coordinates use two axes (q, r) at 60 degrees. Cube coordinates
//! add the implicit third axis `y = -q - r`; they exist for rounding and
//! distance and are never stored.

use std::ops::{Add, Mul, Neg, Sub};

/// A cell on the hexagonal lattice, in axial coordinates.
///
/// The struct itself is the occupancy key: two cells are equal exactly when
/// both components are equal, so no string formatting is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexCoord {
    /// First axial coordinate (cube x)
    pub q: i64,
    /// Second axial coordinate (cube z)
    pub r: i64,
}

impl HexCoord {
    /// Origin of the lattice.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// The six unit directions.
    ///
    /// Ring walks and the spiral fill order are defined in terms of these
    /// indices; reordering them changes every placement.
    pub const DIRECTIONS: [Self; 6] = [
        Self { q: 1, r: 0 },  // E
        Self { q: 1, r: -1 }, // NE
        Self { q: 0, r: -1 }, // NW
        Self { q: -1, r: 0 }, // W
        Self { q: -1, r: 1 }, // SW
        Self { q: 0, r: 1 },  // SE
    ];

    /// Create a new coordinate.
    pub const fn new(q: i64, r: i64) -> Self {
        Self { q, r }
    }

    /// Compute the implicit cube y axis: `-q - r`.
    pub const fn s(&self) -> i64 {
        -self.q - self.r
    }

    /// Convert to cube coordinates (`x = q`, `z = r`, `y = -x - z`).
    pub const fn to_cube(self) -> CubeCoord {
        CubeCoord {
            x: self.q,
            y: self.s(),
            z: self.r,
        }
    }

    /// Hex distance: the Chebyshev distance in cube space.
    ///
    /// Equivalent to `(|dq| + |dr| + |dq + dr|) / 2`.
    pub fn distance(&self, other: &Self) -> u64 {
        self.to_cube().distance(&other.to_cube())
    }

    /// Ring number around the origin (0 = origin, 1 = first ring, ...).
    pub fn ring(&self) -> u64 {
        self.distance(&Self::ORIGIN)
    }

    /// The neighbor in direction `dir` (taken modulo 6).
    pub fn neighbor(&self, dir: usize) -> Self {
        *self + Self::DIRECTIONS[dir % 6]
    }

    /// All six neighbors, in [`HexCoord::DIRECTIONS`] order.
    pub fn neighbors(&self) -> [Self; 6] {
        Self::DIRECTIONS.map(|d| *self + d)
    }
}

impl Add for HexCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }
}

impl Sub for HexCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
        }
    }
}

impl Neg for HexCoord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            q: -self.q,
            r: -self.r,
        }
    }
}

impl Mul<i64> for HexCoord {
    type Output = Self;

    #[inline]
    fn mul(self, k: i64) -> Self {
        Self {
            q: self.q * k,
            r: self.r * k,
        }
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Cube form of a hex cell. Invariant: `x + y + z == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubeCoord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl CubeCoord {
    /// Build a cube coordinate from its two independent components.
    pub const fn from_xz(x: i64, z: i64) -> Self {
        Self { x, y: -x - z, z }
    }

    /// Convert back to axial (`q = x`, `r = z`).
    pub const fn to_axial(self) -> HexCoord {
        HexCoord {
            q: self.x,
            r: self.z,
        }
    }

    /// Chebyshev distance: `max(|dx|, |dy|, |dz|)`.
    pub fn distance(&self, other: &Self) -> u64 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        dx.max(dy).max(dz)
    }

    /// Check the zero-sum invariant.
    pub const fn is_valid(&self) -> bool {
        self.x + self.y + self.z == 0
    }
}

impl From<HexCoord> for CubeCoord {
    fn from(hex: HexCoord) -> Self {
        hex.to_cube()
    }
}

impl From<CubeCoord> for HexCoord {
    fn from(cube: CubeCoord) -> Self {
        cube.to_axial()
    }
}

/// A continuous axial position, as produced by inverting the world layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FractionalHex {
    pub q: f64,
    pub r: f64,
}

impl FractionalHex {
    pub const fn new(q: f64, r: f64) -> Self {
        Self { q, r }
    }

    /// Round to the cell whose region contains this point.
    ///
    /// Each cube component is rounded on its own, then the component with
    /// the largest rounding error is recomputed from the other two so the
    /// result stays on the `x + y + z = 0` plane. Points exactly on an edge
    /// may land in either adjacent cell.
    pub fn round(self) -> HexCoord {
        let x = self.q;
        let z = self.r;
        let y = -x - z;

        let mut rx = x.round();
        let mut ry = y.round();
        let mut rz = z.round();

        let dx = (rx - x).abs();
        let dy = (ry - y).abs();
        let dz = (rz - z).abs();

        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy > dz {
            ry = -rx - rz;
        } else {
            rz = -rx - ry;
        }

        let cube = CubeCoord {
            x: rx as i64,
            y: ry as i64,
            z: rz as i64,
        };
        debug_assert!(cube.is_valid());
        cube.to_axial()
    }
}

impl From<HexCoord> for FractionalHex {
    fn from(hex: HexCoord) -> Self {
        Self {
            q: hex.q as f64,
            r: hex.r as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn origin_is_zero() {
        let origin = HexCoord::ORIGIN;
        assert_eq!(origin.q, 0);
        assert_eq!(origin.r, 0);
        assert_eq!(origin, HexCoord::default());
    }

    #[test]
    fn cube_axis_constraint() {
        let coords = [
            HexCoord::new(0, 0),
            HexCoord::new(1, 0),
            HexCoord::new(1, -1),
            HexCoord::new(-3, 5),
        ];
        for c in coords {
            let cube = c.to_cube();
            assert!(cube.is_valid());
            assert_eq!(cube.x, c.q);
            assert_eq!(cube.z, c.r);
            assert_eq!(HexCoord::from(cube), c);
        }
    }

    #[test]
    fn distance_from_origin() {
        assert_eq!(HexCoord::ORIGIN.ring(), 0);

        for dir in HexCoord::DIRECTIONS {
            assert_eq!(dir.ring(), 1);
        }

        assert_eq!(HexCoord::new(2, 0).ring(), 2);
        assert_eq!(HexCoord::new(1, 1).ring(), 2);
        assert_eq!(HexCoord::new(3, -1).ring(), 3);
    }

    #[test]
    fn distance_matches_axial_manhattan_half() {
        let a = HexCoord::new(-4, 7);
        let b = HexCoord::new(3, -2);
        let dq = (a.q - b.q).abs();
        let dr = (a.r - b.r).abs();
        let ds = (a.q + a.r - b.q - b.r).abs();
        assert_eq!(a.distance(&b), ((dq + dr + ds) / 2) as u64);
    }

    #[test]
    fn six_unique_neighbors() {
        let neighbors = HexCoord::ORIGIN.neighbors();

        for n in neighbors {
            assert_eq!(n.distance(&HexCoord::ORIGIN), 1);
        }

        let mut sorted = neighbors.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }

    #[test]
    fn neighbor_wraps_direction() {
        let c = HexCoord::new(2, -1);
        assert_eq!(c.neighbor(0), c.neighbor(6));
        assert_eq!(c.neighbor(2), HexCoord::new(2, -2));
    }

    #[test]
    fn arithmetic() {
        let a = HexCoord::new(1, 2);
        let b = HexCoord::new(4, -1);

        assert_eq!(a + b, HexCoord::new(5, 1));
        assert_eq!(a - b, HexCoord::new(-3, 3));
        assert_eq!(a + (-b), a - b);
        assert_eq!(b * 3, HexCoord::new(12, -3));
    }

    #[test]
    fn round_exact_centers() {
        for c in [HexCoord::new(0, 0), HexCoord::new(5, -2), HexCoord::new(-7, 9)] {
            assert_eq!(FractionalHex::from(c).round(), c);
        }
    }

    #[test]
    fn round_near_center() {
        assert_eq!(FractionalHex::new(0.9, 0.05).round(), HexCoord::new(1, 0));
        assert_eq!(FractionalHex::new(-0.2, 0.3).round(), HexCoord::ORIGIN);
        assert_eq!(FractionalHex::new(1.1, -1.05).round(), HexCoord::new(1, -1));
    }

    #[test]
    fn round_fixes_largest_error_component() {
        // Independent rounding gives x=0, y=-1, z=0, which is off the plane.
        let hex = FractionalHex::new(0.4, 0.45).round();
        assert!(hex.to_cube().is_valid());
        assert!(hex == HexCoord::ORIGIN || hex == HexCoord::new(0, 1));
    }

    proptest! {
        #[test]
        fn round_always_on_plane(q in -1.0e6f64..1.0e6, r in -1.0e6f64..1.0e6) {
            let hex = FractionalHex::new(q, r).round();
            prop_assert!(hex.to_cube().is_valid());
            // The chosen cell is never further than one step from the point.
            let fq = q - hex.q as f64;
            let fr = r - hex.r as f64;
            let d = (fq.abs() + fr.abs() + (fq + fr).abs()) / 2.0;
            prop_assert!(d <= 1.0 + 1e-9);
        }

        #[test]
        fn distance_is_metric(
            aq in -50i64..50, ar in -50i64..50,
            bq in -50i64..50, br in -50i64..50,
            cq in -50i64..50, cr in -50i64..50,
        ) {
            let a = HexCoord::new(aq, ar);
            let b = HexCoord::new(bq, br);
            let c = HexCoord::new(cq, cr);
            prop_assert_eq!(a.distance(&a), 0);
            prop_assert_eq!(a.distance(&b), b.distance(&a));
            prop_assert!(a.distance(&c) <= a.distance(&b) + b.distance(&c));
        }
    }
}
