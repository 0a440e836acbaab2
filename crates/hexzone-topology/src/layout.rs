//! Pointy-top world layout.
//!
//! Maps cells onto the `x/z` ground plane. With circumradius `R` and spacing
//! factor `s`, a cell is `W = √3·R·s` wide and `H = 2·R·s` tall, and rows are
//! `0.75·H` apart with every row shifted by half a cell width:
//!
//! ```text
//! x = W · (q + r/2)
//! z = H · 0.75 · r
//! ```

use thiserror::Error;

use crate::{FractionalHex, HexCoord};

/// Errors constructing a [`HexLayout`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Radius was zero, negative, or not finite.
    #[error("invalid hex radius: {0}")]
    InvalidRadius(f64),

    /// Spacing was zero, negative, or not finite.
    #[error("invalid hex spacing: {0}")]
    InvalidSpacing(f64),
}

/// A point on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: f64,
    pub z: f64,
}

impl WorldPos {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Layout parameters for converting between cells and world positions.
///
/// Deserialization goes through [`HexLayout::new`], so a stored layout with
/// a bad radius or spacing is rejected on load.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawLayout")
)]
pub struct HexLayout {
    radius: f64,
    spacing: f64,
}

/// Unvalidated wire form of a [`HexLayout`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLayout {
    radius: f64,
    spacing: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLayout> for HexLayout {
    type Error = LayoutError;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        HexLayout::new(raw.radius, raw.spacing)
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            radius: 1.0,
            spacing: 1.0,
        }
    }
}

impl HexLayout {
    /// Create a layout with circumradius `radius` and spacing factor `spacing`.
    pub fn new(radius: f64, spacing: f64) -> Result<Self, LayoutError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(LayoutError::InvalidRadius(radius));
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(LayoutError::InvalidSpacing(spacing));
        }
        Ok(Self { radius, spacing })
    }

    /// Circumradius of one cell.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Spacing factor (1.0 = cells touch).
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Cell width `W = √3·R·s`.
    pub fn width(&self) -> f64 {
        3f64.sqrt() * self.radius * self.spacing
    }

    /// Cell height `H = 2·R·s`.
    pub fn height(&self) -> f64 {
        2.0 * self.radius * self.spacing
    }

    /// Center of a cell in world space.
    pub fn hex_to_world(&self, hex: HexCoord) -> WorldPos {
        let q = hex.q as f64;
        let r = hex.r as f64;
        WorldPos {
            x: self.width() * (q + r / 2.0),
            z: self.height() * 0.75 * r,
        }
    }

    /// Exact inverse of [`hex_to_world`](Self::hex_to_world), unrounded.
    pub fn world_to_fractional(&self, x: f64, z: f64) -> FractionalHex {
        let r = z / (self.height() * 0.75);
        let q = x / self.width() - r / 2.0;
        FractionalHex { q, r }
    }

    /// The cell containing a world position.
    pub fn world_to_hex(&self, x: f64, z: f64) -> HexCoord {
        self.world_to_fractional(x, z).round()
    }

    /// The six corners of a cell, starting at the top vertex (+z) and
    /// turning clockwise when viewed with +x to the right and +z up.
    pub fn hex_corners(&self, hex: HexCoord) -> [WorldPos; 6] {
        let center = self.hex_to_world(hex);
        let size = self.radius * self.spacing;
        std::array::from_fn(|i| {
            let angle = std::f64::consts::FRAC_PI_2 - std::f64::consts::FRAC_PI_3 * i as f64;
            WorldPos {
                x: center.x + size * angle.cos(),
                z: center.z + size * angle.sin(),
            }
        })
    }
}
