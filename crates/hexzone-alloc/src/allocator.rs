//! Zone placement.
//!
//! [`HexAllocator`] owns all mutable placement state: the occupancy table,
//! the spiral cursor, painted cells and zone elevations. Sessions are placed
//! outward from the origin in spiral order, or as close as possible to a
//! requested cell.
//!
//! # Peek vs. Consume
//!
//! `peek_next_in_spiral` previews where the next session will land without
//! touching the cursor, so a placeholder can be drawn before the session
//! exists. `next_in_spiral` runs the same search and moves the cursor past
//! the chosen index. Neither occupies the cell; the caller does that with
//! [`HexAllocator::occupy`], or uses [`HexAllocator::place`] to do both.
//!
//! # Exhaustion
//!
//! Searches are bounded by [`AllocatorConfig`]. When a bound runs out the
//! result is [`Placement::Exhausted`] carrying a fallback cell that may be
//! occupied, so best-effort callers can keep going while strict callers
//! can tell the difference.

use hexzone_topology::{index_to_hex, HexCoord, Ring, SpiralIndex};
use tracing::{debug, warn};

use crate::{
    AllocError, AllocatorConfig, BrushAction, BrushOutcome, Color, ElevationModel, Height,
    OccupancyTable, OwnerId, PaintedCell, Result,
};

/// Outcome of a bounded free-cell search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A free cell was found.
    Free(HexCoord),
    /// The bound ran out; carries the fallback cell, which may be occupied.
    Exhausted(HexCoord),
}

impl Placement {
    /// The chosen cell, free or not.
    pub fn hex(&self) -> HexCoord {
        match *self {
            Placement::Free(hex) | Placement::Exhausted(hex) => hex,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Placement::Free(_))
    }

    /// The cell only if the search succeeded.
    pub fn free(&self) -> Option<HexCoord> {
        match *self {
            Placement::Free(hex) => Some(hex),
            Placement::Exhausted(_) => None,
        }
    }
}

/// Hex-grid zone allocator.
#[derive(Debug, Clone)]
pub struct HexAllocator {
    config: AllocatorConfig,
    occupancy: OccupancyTable,
    elevation: ElevationModel,
    cursor: SpiralIndex,
}

impl Default for HexAllocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}

impl HexAllocator {
    /// Create an empty allocator.
    pub fn new(config: AllocatorConfig) -> Self {
        Self {
            config,
            occupancy: OccupancyTable::new(),
            elevation: ElevationModel::new(),
            cursor: SpiralIndex::ORIGIN,
        }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn occupancy(&self) -> &OccupancyTable {
        &self.occupancy
    }

    pub fn elevation_model(&self) -> &ElevationModel {
        &self.elevation
    }

    // ------------------------------------------------------------------
    // Occupancy
    // ------------------------------------------------------------------

    /// Assign `hex` to `owner`.
    ///
    /// Fails if the cell belongs to someone else or the owner already holds
    /// another cell. Any decoration on the cell is removed; the owner starts
    /// at elevation 0.
    pub fn occupy(&mut self, hex: HexCoord, owner: impl Into<OwnerId>) -> Result<()> {
        let owner = owner.into();
        if let Err(e) = self.occupancy.occupy(hex, owner.clone()) {
            warn!("Rejected occupy of {} by {}: {}", hex, owner, e);
            return Err(e);
        }

        if let Some(cell) = self.elevation.clear(hex) {
            debug!(
                "Painted cell {} ({} {}) superseded by {}",
                hex, cell.color, cell.height, owner
            );
        }
        self.elevation.track_owner(&owner);
        debug!("{} occupies {}", owner, hex);
        Ok(())
    }

    /// Free an owner's cell. Unknown owners are ignored.
    pub fn release(&mut self, owner: &str) -> Option<HexCoord> {
        let hex = self.occupancy.release(owner)?;
        self.elevation.forget_owner(owner);
        debug!("{} released {}", owner, hex);
        Some(hex)
    }

    pub fn is_occupied(&self, hex: HexCoord) -> bool {
        self.occupancy.is_occupied(hex)
    }

    pub fn occupant(&self, hex: HexCoord) -> Option<&OwnerId> {
        self.occupancy.occupant(hex)
    }

    pub fn owner_hex(&self, owner: &str) -> Option<HexCoord> {
        self.occupancy.owner_hex(owner)
    }

    // ------------------------------------------------------------------
    // Spiral fill
    // ------------------------------------------------------------------

    /// Current cursor: the first spiral index the next search looks at.
    pub fn cursor(&self) -> SpiralIndex {
        self.cursor
    }

    /// Restart the spiral from the origin.
    pub fn reset_cursor(&mut self) {
        self.cursor = SpiralIndex::ORIGIN;
    }

    pub(crate) fn set_cursor(&mut self, cursor: SpiralIndex) {
        self.cursor = cursor;
    }

    /// First unoccupied index at or after the cursor, within the bound.
    fn scan_spiral(&self) -> Option<SpiralIndex> {
        let start = self.cursor.value();
        let end = start.saturating_add(self.config.spiral_search_limit);
        (start..end)
            .map(SpiralIndex)
            .find(|&index| !self.occupancy.is_occupied(index_to_hex(index)))
    }

    /// Find the next free cell in spiral order and consume its index.
    ///
    /// Does not occupy the cell. Falls back to the origin when the bound is
    /// exhausted, leaving the cursor where it was.
    pub fn next_in_spiral(&mut self) -> Placement {
        match self.scan_spiral() {
            Some(index) => {
                self.cursor = index.next();
                let hex = index_to_hex(index);
                debug!("Spiral slot {} -> {}, cursor now {}", index, hex, self.cursor);
                Placement::Free(hex)
            }
            None => {
                warn!(
                    "No free hex within {} spiral slots from {}, falling back to origin",
                    self.config.spiral_search_limit, self.cursor
                );
                Placement::Exhausted(HexCoord::ORIGIN)
            }
        }
    }

    /// Same search as [`next_in_spiral`](Self::next_in_spiral), without
    /// moving the cursor.
    pub fn peek_next_in_spiral(&self) -> Placement {
        match self.scan_spiral() {
            Some(index) => Placement::Free(index_to_hex(index)),
            None => Placement::Exhausted(HexCoord::ORIGIN),
        }
    }

    // ------------------------------------------------------------------
    // Nearest free
    // ------------------------------------------------------------------

    /// The free cell closest to `target`.
    ///
    /// Rings around the target are scanned outward, each in walk order, so
    /// ties within a ring go to the earliest cell in the walk. Falls back to
    /// `target` itself when every ring within the bound is full.
    pub fn find_nearest_free(&self, target: HexCoord) -> Placement {
        if !self.occupancy.is_occupied(target) {
            return Placement::Free(target);
        }

        let found = (1..=self.config.ring_search_limit)
            .find_map(|k| Ring::new(target, k).find(|&hex| !self.occupancy.is_occupied(hex)));

        match found {
            Some(hex) => Placement::Free(hex),
            None => {
                warn!(
                    "No free hex within {} rings of {}, returning occupied target",
                    self.config.ring_search_limit, target
                );
                Placement::Exhausted(target)
            }
        }
    }

    /// [`find_nearest_free`](Self::find_nearest_free) from a world position.
    pub fn find_nearest_free_from_world(&self, x: f64, z: f64) -> Placement {
        let target = self.config.layout.world_to_hex(x, z);
        self.find_nearest_free(target)
    }

    // ------------------------------------------------------------------
    // Committing placement
    // ------------------------------------------------------------------

    /// Take the next spiral cell and occupy it for `owner`.
    pub fn place(&mut self, owner: impl Into<OwnerId>) -> Result<HexCoord> {
        let owner = owner.into();
        self.ensure_unplaced(&owner)?;

        match self.next_in_spiral() {
            Placement::Free(hex) => {
                self.occupy(hex, owner)?;
                Ok(hex)
            }
            Placement::Exhausted(_) => Err(AllocError::SearchExhausted {
                limit: self.config.spiral_search_limit,
                unit: "spiral slots",
            }),
        }
    }

    /// Occupy the free cell nearest to `target` for `owner`.
    ///
    /// Does not move the spiral cursor.
    pub fn place_near(&mut self, owner: impl Into<OwnerId>, target: HexCoord) -> Result<HexCoord> {
        let owner = owner.into();
        self.ensure_unplaced(&owner)?;

        match self.find_nearest_free(target) {
            Placement::Free(hex) => {
                self.occupy(hex, owner)?;
                Ok(hex)
            }
            Placement::Exhausted(_) => Err(AllocError::SearchExhausted {
                limit: self.config.ring_search_limit,
                unit: "rings",
            }),
        }
    }

    fn ensure_unplaced(&self, owner: &OwnerId) -> Result<()> {
        match self.occupancy.owner_hex(owner.as_str()) {
            Some(hex) => Err(AllocError::OwnerAlreadyPlaced {
                owner: owner.clone(),
                hex,
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Elevation and decoration
    // ------------------------------------------------------------------

    /// Apply a brush stroke. Occupied cells change their owner's
    /// elevation; free cells are painted or cleared.
    pub fn apply_brush(&mut self, hex: HexCoord, color: Color, action: BrushAction) -> BrushOutcome {
        self.elevation
            .apply_brush(&self.occupancy, hex, color, action)
    }

    /// Raise an owner's zone one step. False when at the cap or unplaced.
    pub fn raise(&mut self, owner: &str) -> bool {
        self.raise_by(owner, 1)
    }

    /// Lower an owner's zone one step. False when at zero or unplaced.
    pub fn lower(&mut self, owner: &str) -> bool {
        self.lower_by(owner, 1)
    }

    pub fn raise_by(&mut self, owner: &str, steps: u16) -> bool {
        self.elevation.raise(owner, steps)
    }

    pub fn lower_by(&mut self, owner: &str, steps: u16) -> bool {
        self.elevation.lower(owner, steps)
    }

    /// Elevation of an owner's zone, `None` if the owner holds no cell.
    pub fn elevation(&self, owner: &str) -> Option<f64> {
        self.elevation.elevation(owner)
    }

    pub fn painted(&self, hex: HexCoord) -> Option<&PaintedCell> {
        self.elevation.painted(hex)
    }

    /// Painted cells within `radius` rings of `center` (see
    /// [`filled_disk`](hexzone_topology::filled_disk)).
    pub fn painted_in_disk(&self, center: HexCoord, radius: u64) -> Vec<(HexCoord, PaintedCell)> {
        hexzone_topology::filled_disk(center, radius)
            .into_iter()
            .filter_map(|hex| self.elevation.painted(hex).map(|cell| (hex, *cell)))
            .collect()
    }

    /// Repaint a free cell from bare ground with `steps` same-color strokes.
    ///
    /// Any existing decoration is dropped first. Returns the resulting
    /// height, or `None` if the cell is occupied.
    pub(crate) fn replay_paint(&mut self, hex: HexCoord, color: Color, steps: u16) -> Option<Height> {
        if self.occupancy.is_occupied(hex) {
            return None;
        }
        self.elevation.clear(hex);
        let mut height = None;
        for _ in 0..steps {
            height = Some(self.elevation.paint(hex, color).height);
        }
        height
    }

    /// Reset an owner's elevation to 0 and replay `steps` raises.
    ///
    /// Returns false if the owner has no zone.
    pub(crate) fn replay_elevation(&mut self, owner: &OwnerId, steps: u16) -> bool {
        if self.occupancy.owner_hex(owner.as_str()).is_none() {
            return false;
        }
        self.elevation.forget_owner(owner.as_str());
        self.elevation.track_owner(owner);
        for _ in 0..steps {
            self.elevation.raise(owner.as_str(), 1);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexzone_topology::{ring, HexLayout};
    use std::collections::HashSet;

    fn allocator() -> HexAllocator {
        HexAllocator::new(AllocatorConfig::with_layout(HexLayout::new(10.0, 1.0).unwrap()))
    }

    #[test]
    fn first_placement_is_origin() {
        let mut alloc = allocator();
        assert_eq!(alloc.peek_next_in_spiral(), Placement::Free(HexCoord::ORIGIN));
        assert_eq!(alloc.place("S1").unwrap(), HexCoord::ORIGIN);
        assert_eq!(alloc.cursor(), SpiralIndex(1));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut alloc = allocator();
        alloc.occupy(HexCoord::ORIGIN, "S1").unwrap();

        let preview = alloc.peek_next_in_spiral();
        assert_eq!(preview, alloc.peek_next_in_spiral());
        assert_eq!(alloc.cursor(), SpiralIndex::ORIGIN);

        assert_eq!(alloc.next_in_spiral(), preview);
        assert_eq!(alloc.cursor(), SpiralIndex(2));
    }

    #[test]
    fn next_consumes_without_occupying() {
        let mut alloc = allocator();
        let a = alloc.next_in_spiral().hex();
        let b = alloc.next_in_spiral().hex();
        assert_ne!(a, b);
        assert!(!alloc.is_occupied(a));
        assert!(!alloc.is_occupied(b));
    }

    #[test]
    fn released_cells_behind_cursor_are_not_revisited() {
        let mut alloc = allocator();
        alloc.place("S1").unwrap();
        alloc.place("S2").unwrap();
        alloc.release("S1");

        // The spiral resumes where it left off.
        assert_eq!(alloc.place("S3").unwrap(), HexCoord::new(1, -1));

        alloc.reset_cursor();
        assert_eq!(alloc.place("S4").unwrap(), HexCoord::ORIGIN);
    }

    #[test]
    fn spiral_exhaustion_falls_back_to_origin() {
        let mut alloc = HexAllocator::new(AllocatorConfig {
            spiral_search_limit: 7,
            ..AllocatorConfig::default()
        });
        for hex in ring(HexCoord::ORIGIN, 0).into_iter().chain(ring(HexCoord::ORIGIN, 1)) {
            alloc.occupy(hex, format!("{}", hex)).unwrap();
        }

        assert_eq!(alloc.peek_next_in_spiral(), Placement::Exhausted(HexCoord::ORIGIN));
        assert_eq!(alloc.next_in_spiral(), Placement::Exhausted(HexCoord::ORIGIN));
        assert_eq!(alloc.cursor(), SpiralIndex::ORIGIN);
        assert!(matches!(
            alloc.place("late"),
            Err(AllocError::SearchExhausted { limit: 7, .. })
        ));
        assert_eq!(alloc.owner_hex("late"), None);
    }

    #[test]
    fn nearest_free_returns_free_target() {
        let alloc = allocator();
        let target = HexCoord::new(4, -2);
        assert_eq!(alloc.find_nearest_free(target), Placement::Free(target));
    }

    #[test]
    fn nearest_free_prefers_walk_order_within_ring() {
        let mut alloc = allocator();
        let target = HexCoord::new(5, 5);
        alloc.occupy(target, "T").unwrap();

        // First cell of ring 1 in walk order is target + E.
        assert_eq!(
            alloc.find_nearest_free(target),
            Placement::Free(target + HexCoord::new(1, 0))
        );

        alloc.occupy(target + HexCoord::new(1, 0), "E").unwrap();
        assert_eq!(
            alloc.find_nearest_free(target),
            Placement::Free(target + HexCoord::new(1, -1))
        );
    }

    #[test]
    fn nearest_free_skips_full_ring() {
        let mut alloc = allocator();
        let target = HexCoord::new(-3, 2);
        alloc.occupy(target, "T").unwrap();
        for (i, hex) in ring(target, 1).into_iter().enumerate() {
            alloc.occupy(hex, format!("r1-{}", i)).unwrap();
        }
        // Fill ring 2 except its last cell.
        let ring2 = ring(target, 2);
        let last = *ring2.last().unwrap();
        for (i, hex) in ring2.iter().take(11).enumerate() {
            alloc.occupy(*hex, format!("r2-{}", i)).unwrap();
        }

        let found = alloc.find_nearest_free(target);
        assert_eq!(found, Placement::Free(last));
        assert_eq!(target.distance(&found.hex()), 2);
    }

    #[test]
    fn nearest_free_exhaustion_returns_target() {
        let mut alloc = HexAllocator::new(AllocatorConfig {
            ring_search_limit: 1,
            ..AllocatorConfig::default()
        });
        let target = HexCoord::ORIGIN;
        alloc.occupy(target, "T").unwrap();
        for (i, hex) in ring(target, 1).into_iter().enumerate() {
            alloc.occupy(hex, format!("n{}", i)).unwrap();
        }

        let result = alloc.find_nearest_free(target);
        assert_eq!(result, Placement::Exhausted(target));
        assert!(!result.is_free());
        assert_eq!(result.free(), None);
        assert!(matches!(
            alloc.place_near("late", target),
            Err(AllocError::SearchExhausted { limit: 1, .. })
        ));
    }

    #[test]
    fn nearest_free_from_world_rounds_click() {
        let mut alloc = allocator();
        let layout = alloc.config().layout;
        let target = HexCoord::new(2, -1);
        let center = layout.hex_to_world(target);

        assert_eq!(
            alloc.find_nearest_free_from_world(center.x + 3.0, center.z - 2.0),
            Placement::Free(target)
        );

        alloc.occupy(target, "S1").unwrap();
        let moved = alloc.find_nearest_free_from_world(center.x, center.z).hex();
        assert_eq!(target.distance(&moved), 1);
    }

    #[test]
    fn place_near_occupies_and_keeps_cursor() {
        let mut alloc = allocator();
        let hex = alloc.place_near("S1", HexCoord::new(7, 7)).unwrap();
        assert_eq!(hex, HexCoord::new(7, 7));
        assert_eq!(alloc.owner_hex("S1"), Some(hex));
        assert_eq!(alloc.cursor(), SpiralIndex::ORIGIN);

        assert!(matches!(
            alloc.place_near("S1", HexCoord::ORIGIN),
            Err(AllocError::OwnerAlreadyPlaced { .. })
        ));
        assert!(matches!(alloc.place("S1"), Err(AllocError::OwnerAlreadyPlaced { .. })));
        // The rejected place did not burn a spiral slot.
        assert_eq!(alloc.cursor(), SpiralIndex::ORIGIN);
    }

    #[test]
    fn occupy_supersedes_paint() {
        let mut alloc = allocator();
        let hex = HexCoord::new(1, 0);
        let red = Color::rgb(255, 0, 0);
        alloc.apply_brush(hex, red, BrushAction::Paint);
        assert!(alloc.painted(hex).is_some());

        alloc.occupy(hex, "S1").unwrap();
        assert_eq!(alloc.painted(hex), None);
        assert_eq!(alloc.elevation("S1"), Some(0.0));

        // Painting now raises the zone instead.
        alloc.apply_brush(hex, red, BrushAction::Paint);
        assert_eq!(alloc.painted(hex), None);
        assert_eq!(alloc.elevation("S1"), Some(0.5));
    }

    #[test]
    fn release_drops_elevation() {
        let mut alloc = allocator();
        alloc.place("S1").unwrap();
        assert!(alloc.raise("S1"));
        assert!(alloc.raise_by("S1", 3));
        assert_eq!(alloc.elevation("S1"), Some(2.0));
        assert!(alloc.lower("S1"));
        assert!(alloc.lower_by("S1", 10));
        assert_eq!(alloc.elevation("S1"), Some(0.0));

        alloc.release("S1");
        assert_eq!(alloc.elevation("S1"), None);
        assert!(!alloc.raise("S1"));
    }

    #[test]
    fn painted_in_disk_filters_area() {
        let mut alloc = allocator();
        let blue = Color::rgb(0, 0, 255);
        alloc.apply_brush(HexCoord::new(1, 0), blue, BrushAction::Paint);
        alloc.apply_brush(HexCoord::new(0, 2), blue, BrushAction::Paint);
        alloc.apply_brush(HexCoord::new(5, 0), blue, BrushAction::Paint);

        let near: HashSet<_> = alloc
            .painted_in_disk(HexCoord::ORIGIN, 3)
            .into_iter()
            .map(|(hex, _)| hex)
            .collect();
        assert_eq!(near, HashSet::from([HexCoord::new(1, 0), HexCoord::new(0, 2)]));
    }

    #[test]
    fn replay_paint_refuses_occupied() {
        let mut alloc = allocator();
        let red = Color::rgb(255, 0, 0);
        assert_eq!(
            alloc.replay_paint(HexCoord::new(3, 3), red, 4),
            Some(Height::from_steps(4))
        );
        alloc.occupy(HexCoord::ORIGIN, "S1").unwrap();
        assert_eq!(alloc.replay_paint(HexCoord::ORIGIN, red, 4), None);
    }

    #[test]
    fn replay_paint_starts_from_bare_ground() {
        let mut alloc = allocator();
        let red = Color::rgb(255, 0, 0);
        let hex = HexCoord::new(3, 3);
        alloc.replay_paint(hex, red, 2);
        assert_eq!(alloc.replay_paint(hex, red, 2), Some(Height::from_steps(2)));
        assert_eq!(alloc.painted(hex).map(|c| c.height()), Some(1.0));
    }

    #[test]
    fn replay_elevation_overwrites() {
        let mut alloc = allocator();
        alloc.place("S1").unwrap();
        alloc.raise_by("S1", 6);

        assert!(alloc.replay_elevation(&OwnerId::from("S1"), 2));
        assert_eq!(alloc.elevation("S1"), Some(1.0));
        assert!(!alloc.replay_elevation(&OwnerId::from("nobody"), 2));
        assert_eq!(alloc.elevation("nobody"), None);
    }
}
