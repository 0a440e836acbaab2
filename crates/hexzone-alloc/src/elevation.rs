//! Decorative cell height and per-zone elevation.
//!
//! Free cells carry an optional [`PaintedCell`]; occupied cells carry their
//! owner's elevation instead. Both are counted in whole steps of
//! [`HEIGHT_STEP`] and saturate at [`MAX_HEIGHT`].
//!
//! ```text
//! Free ──paint(c)──▶ Painted(1 step, c) ──paint(c)──▶ Painted(+1 step, c)
//!  ▲                   │  │
//!  └──────erase────────┘  └──paint(c')──▶ Painted(1 step, c')
//!
//! Occupied(e) ──paint──▶ Occupied(e + step)
//! Occupied(e) ──erase──▶ Occupied(e - step)
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use hexzone_topology::HexCoord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{OccupancyTable, OwnerId};

/// Size of one height step.
pub const HEIGHT_STEP: f64 = 0.5;

/// Height cap for both painted cells and zone elevation.
pub const MAX_HEIGHT: f64 = 100.0;

/// [`MAX_HEIGHT`] expressed in steps.
pub const MAX_STEPS: u16 = 200;

/// A height counted in whole steps, so it is always an exact multiple of
/// [`HEIGHT_STEP`] within `[0, MAX_HEIGHT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Height(u16);

impl Height {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(MAX_STEPS);

    /// Build from a step count, saturating at the cap.
    pub const fn from_steps(steps: u16) -> Self {
        if steps > MAX_STEPS {
            Self(MAX_STEPS)
        } else {
            Self(steps)
        }
    }

    /// Number of whole steps needed to reproduce `value`: `round(value / step)`,
    /// clamped to the valid range.
    pub fn steps_for(value: f64) -> u16 {
        if !value.is_finite() || value <= 0.0 {
            return 0;
        }
        (value / HEIGHT_STEP).round().min(MAX_STEPS as f64) as u16
    }

    pub const fn steps(&self) -> u16 {
        self.0
    }

    /// Height in world units.
    pub fn value(&self) -> f64 {
        self.0 as f64 * HEIGHT_STEP
    }

    pub fn raised(self, steps: u16) -> Self {
        Self::from_steps(self.0.saturating_add(steps))
    }

    pub fn lowered(self, steps: u16) -> Self {
        Self(self.0.saturating_sub(steps))
    }
}

impl std::fmt::Display for Height {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(&self) -> u8 {
        self.0 as u8
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xff_ffff)
    }
}

/// Error parsing a `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

/// Decoration on a free cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintedCell {
    pub height: Height,
    pub color: Color,
}

impl PaintedCell {
    /// Height in world units.
    pub fn height(&self) -> f64 {
        self.height.value()
    }
}

/// What a brush stroke does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushAction {
    /// Paint a free cell, or raise the zone on an occupied one.
    Paint,
    /// Clear a free cell, or lower the zone on an occupied one.
    Erase,
}

/// Result of [`ElevationModel::apply_brush`].
#[derive(Debug, Clone, PartialEq)]
pub enum BrushOutcome {
    /// A free cell was painted; carries the new state.
    Painted(PaintedCell),
    /// A free cell's decoration was removed.
    Cleared(PaintedCell),
    /// An occupied cell's owner changed elevation.
    Elevated { owner: OwnerId, elevation: f64 },
    /// Nothing to do: already at the cap or floor, or erasing a bare cell.
    Unchanged,
}

/// Painted cells and zone elevations.
#[derive(Debug, Default, Clone)]
pub struct ElevationModel {
    painted: HashMap<HexCoord, PaintedCell>,
    zones: HashMap<OwnerId, Height>,
}

impl ElevationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one brush stroke, branching on occupancy.
    ///
    /// An occupied cell always redirects to its owner's elevation; painted
    /// decoration is only ever touched on free cells.
    pub fn apply_brush(
        &mut self,
        occupancy: &OccupancyTable,
        hex: HexCoord,
        color: Color,
        action: BrushAction,
    ) -> BrushOutcome {
        if let Some(owner) = occupancy.occupant(hex) {
            let changed = match action {
                BrushAction::Paint => self.raise(owner.as_str(), 1),
                BrushAction::Erase => self.lower(owner.as_str(), 1),
            };
            return match (changed, self.elevation(owner.as_str())) {
                (true, Some(elevation)) => BrushOutcome::Elevated {
                    owner: owner.clone(),
                    elevation,
                },
                _ => BrushOutcome::Unchanged,
            };
        }

        match action {
            BrushAction::Paint => {
                let before = self.painted.get(&hex).copied();
                let after = self.paint(hex, color);
                if before == Some(after) {
                    BrushOutcome::Unchanged
                } else {
                    BrushOutcome::Painted(after)
                }
            }
            BrushAction::Erase => match self.clear(hex) {
                Some(cell) => BrushOutcome::Cleared(cell),
                None => BrushOutcome::Unchanged,
            },
        }
    }

    /// Paint a free cell. Same color stacks one step; a new color restarts
    /// at one step.
    pub(crate) fn paint(&mut self, hex: HexCoord, color: Color) -> PaintedCell {
        let cell = self
            .painted
            .entry(hex)
            .and_modify(|cell| {
                if cell.color == color {
                    cell.height = cell.height.raised(1);
                } else {
                    *cell = PaintedCell {
                        height: Height::from_steps(1),
                        color,
                    };
                }
            })
            .or_insert(PaintedCell {
                height: Height::from_steps(1),
                color,
            });
        *cell
    }

    /// Remove a cell's decoration.
    pub(crate) fn clear(&mut self, hex: HexCoord) -> Option<PaintedCell> {
        self.painted.remove(&hex)
    }

    /// Decoration on a cell.
    pub fn painted(&self, hex: HexCoord) -> Option<&PaintedCell> {
        self.painted.get(&hex)
    }

    /// All painted cells, in no particular order.
    pub fn painted_cells(&self) -> impl Iterator<Item = (HexCoord, &PaintedCell)> {
        self.painted.iter().map(|(hex, cell)| (*hex, cell))
    }

    pub fn painted_count(&self) -> usize {
        self.painted.len()
    }

    /// Start tracking an owner at elevation 0. Keeps an existing elevation.
    pub(crate) fn track_owner(&mut self, owner: &OwnerId) {
        self.zones.entry(owner.clone()).or_default();
    }

    pub(crate) fn forget_owner(&mut self, owner: &str) -> Option<Height> {
        self.zones.remove(owner)
    }

    /// Raise an owner's elevation by `steps`. Returns false if nothing
    /// changed (unknown owner, or already at the cap).
    pub fn raise(&mut self, owner: &str, steps: u16) -> bool {
        self.adjust(owner, |h| h.raised(steps))
    }

    /// Lower an owner's elevation by `steps`. Returns false if nothing
    /// changed (unknown owner, or already at zero).
    pub fn lower(&mut self, owner: &str, steps: u16) -> bool {
        self.adjust(owner, |h| h.lowered(steps))
    }

    fn adjust(&mut self, owner: &str, f: impl FnOnce(Height) -> Height) -> bool {
        let Some(height) = self.zones.get_mut(owner) else {
            return false;
        };
        let next = f(*height);
        if next == *height {
            return false;
        }
        *height = next;
        true
    }

    /// Elevation of an owner's zone in world units.
    pub fn elevation(&self, owner: &str) -> Option<f64> {
        self.zones.get(owner).map(Height::value)
    }

    /// All tracked owners with their elevation.
    pub fn elevations(&self) -> impl Iterator<Item = (&OwnerId, Height)> {
        self.zones.iter().map(|(owner, h)| (owner, *h))
    }
}
