//! Persisted allocator state.
//!
//! Painted cells are stored as `{q, r, color, height}` and zone elevations
//! as `{owner: elevation}`. Zones and the spiral cursor are stored as well
//! so a reload puts sessions back where they were.
//!
//! Restoring never assigns heights directly: each value is converted to
//! `round(value / HEIGHT_STEP)` and replayed as that many paint or raise
//! operations, so a stored height that is not a multiple of the step comes
//! back snapped to the nearest step.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use hexzone_topology::{HexCoord, SpiralIndex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AllocError, Color, HexAllocator, Height, OwnerId, Result, HEIGHT_STEP};

/// One painted cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintedCellRecord {
    pub q: i64,
    pub r: i64,
    pub color: Color,
    pub height: f64,
}

/// One occupied zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub owner: OwnerId,
    pub q: i64,
    pub r: i64,
}

/// Serializable allocator state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSnapshot {
    #[serde(default)]
    pub zones: Vec<ZoneRecord>,
    #[serde(default)]
    pub painted: Vec<PaintedCellRecord>,
    #[serde(default)]
    pub elevations: BTreeMap<OwnerId, f64>,
    #[serde(default)]
    pub cursor: u64,
}

/// Counts from a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    pub zones: usize,
    pub painted: usize,
    pub elevations: usize,
    /// Entries dropped because they conflicted with occupancy.
    pub skipped: usize,
}

impl GridSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a snapshot written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn steps_logged(what: &str, value: f64) -> u16 {
    let steps = Height::steps_for(value);
    let snapped = Height::from_steps(steps).value();
    if snapped != value {
        warn!("{} height {} is not a multiple of {}, restored as {}", what, value, HEIGHT_STEP, snapped);
    }
    steps
}

impl HexAllocator {
    /// Capture zones, decoration, elevations and the cursor.
    ///
    /// Entries are sorted so equal states produce identical snapshots.
    pub fn snapshot(&self) -> GridSnapshot {
        let mut zones: Vec<_> = self
            .occupancy()
            .iter()
            .map(|(hex, owner)| ZoneRecord {
                owner: owner.clone(),
                q: hex.q,
                r: hex.r,
            })
            .collect();
        zones.sort_by(|a, b| a.owner.cmp(&b.owner));

        let mut painted: Vec<_> = self
            .elevation_model()
            .painted_cells()
            .map(|(hex, cell)| PaintedCellRecord {
                q: hex.q,
                r: hex.r,
                color: cell.color,
                height: cell.height(),
            })
            .collect();
        painted.sort_by_key(|p| (p.q, p.r));

        let elevations = self
            .elevation_model()
            .elevations()
            .map(|(owner, h)| (owner.clone(), h.value()))
            .collect();

        GridSnapshot {
            zones,
            painted,
            elevations,
            cursor: self.cursor().value(),
        }
    }

    /// Replay a snapshot onto this allocator.
    ///
    /// Zones are checked against each other and against current occupancy
    /// before anything changes, so a conflicting zone is an error that
    /// leaves the allocator untouched. Stored heights replace whatever the
    /// restored zones and cells held, which makes restoring the same
    /// snapshot twice a no-op. Decoration under a zone and elevation for an
    /// owner without a zone are skipped.
    pub fn restore(&mut self, snapshot: &GridSnapshot) -> Result<RestoreReport> {
        self.check_zones(&snapshot.zones)?;

        let mut report = RestoreReport::default();
        for zone in &snapshot.zones {
            self.occupy(HexCoord::new(zone.q, zone.r), zone.owner.clone())?;
            report.zones += 1;
        }

        for (owner, &elevation) in &snapshot.elevations {
            let steps = steps_logged("Zone", elevation);
            if !self.replay_elevation(owner, steps) {
                warn!("Skipping elevation for {}: no zone", owner);
                report.skipped += 1;
                continue;
            }
            report.elevations += 1;
        }

        for cell in &snapshot.painted {
            let hex = HexCoord::new(cell.q, cell.r);
            let steps = steps_logged("Painted", cell.height);
            if steps == 0 {
                continue;
            }
            match self.replay_paint(hex, cell.color, steps) {
                Some(_) => report.painted += 1,
                None => {
                    warn!("Skipping painted cell {}: occupied", hex);
                    report.skipped += 1;
                }
            }
        }

        if snapshot.cursor > self.cursor().value() {
            self.set_cursor(SpiralIndex(snapshot.cursor));
        }

        info!(
            "Restored {} zones, {} painted cells, {} elevations ({} skipped)",
            report.zones, report.painted, report.elevations, report.skipped
        );
        Ok(report)
    }

    /// Reject zone sets that repeat a cell or owner, or that collide with
    /// a different assignment already held here.
    fn check_zones(&self, zones: &[ZoneRecord]) -> Result<()> {
        let mut by_hex: HashMap<HexCoord, &OwnerId> = HashMap::with_capacity(zones.len());
        let mut by_owner: HashMap<&OwnerId, HexCoord> = HashMap::with_capacity(zones.len());

        for zone in zones {
            let hex = HexCoord::new(zone.q, zone.r);

            if let Some(&other) = by_hex.get(&hex) {
                if *other != zone.owner {
                    return Err(AllocError::HexOccupied {
                        hex,
                        occupant: (*other).clone(),
                    });
                }
            }
            if let Some(&placed) = by_owner.get(&zone.owner) {
                if placed != hex {
                    return Err(AllocError::OwnerAlreadyPlaced {
                        owner: zone.owner.clone(),
                        hex: placed,
                    });
                }
            }
            if let Some(current) = self.occupant(hex) {
                if *current != zone.owner {
                    return Err(AllocError::HexOccupied {
                        hex,
                        occupant: current.clone(),
                    });
                }
            }
            if let Some(placed) = self.owner_hex(zone.owner.as_str()) {
                if placed != hex {
                    return Err(AllocError::OwnerAlreadyPlaced {
                        owner: zone.owner.clone(),
                        hex: placed,
                    });
                }
            }

            by_hex.insert(hex, &zone.owner);
            by_owner.insert(&zone.owner, hex);
        }
        Ok(())
    }
}
