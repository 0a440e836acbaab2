//! Session churn simulation with event recording.

use hexzone_alloc::{
    env_or, AllocError, AllocatorConfig, BrushAction, BrushOutcome, Color, GridSnapshot, HexAllocator,
    OwnerId, Placement, Result,
};
use hexzone_topology::{filled_disk, HexCoord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::events::{PlacementKind, ZoneEvent};

/// Palette used for random brush strokes.
const PALETTE: [Color; 4] = [
    Color::rgb(0xe0, 0x6c, 0x75),
    Color::rgb(0x98, 0xc3, 0x79),
    Color::rgb(0x61, 0xaf, 0xef),
    Color::rgb(0xe5, 0xc0, 0x7b),
];

/// Configuration for the simulation.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Seed for deterministic simulation
    pub seed: u64,
    /// Probability a frame closes a session instead of opening one (0.0 - 1.0)
    pub departure_rate: f64,
    /// Probability a frame also applies a brush stroke (0.0 - 1.0)
    pub brush_rate: f64,
    /// Allocator settings
    pub allocator: AllocatorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            departure_rate: 0.3,
            brush_rate: 0.5,
            allocator: AllocatorConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Create config from environment variables with sensible defaults.
    ///
    /// Reads `HEXZONE_SIM_SEED`, `HEXZONE_SIM_DEPARTURE_RATE` and
    /// `HEXZONE_SIM_BRUSH_RATE`, plus the allocator variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            seed: env_or("HEXZONE_SIM_SEED", defaults.seed)?,
            departure_rate: rate(env_or("HEXZONE_SIM_DEPARTURE_RATE", defaults.departure_rate)?)?,
            brush_rate: rate(env_or("HEXZONE_SIM_BRUSH_RATE", defaults.brush_rate)?)?,
            allocator: AllocatorConfig::from_env()?,
        })
    }
}

fn rate(value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AllocError::InvalidConfig(format!("rate {} outside 0.0..=1.0", value)))
    }
}

/// Pull a rate into `0.0..=1.0`. NaN becomes 0.
fn clamp_rate(name: &str, value: f64) -> f64 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if clamped != value {
        warn!("{} {} outside 0.0..=1.0, using {}", name, value, clamped);
    }
    clamped
}

/// Simulates sessions opening and closing and records events.
pub struct Simulation {
    config: SimulationConfig,
    allocator: HexAllocator,
    events: Vec<ZoneEvent>,
    active: Vec<OwnerId>,
    next_session: u64,
    current_frame: u64,
    rng: StdRng,
}

impl Simulation {
    /// Create a new simulation with the given configuration.
    ///
    /// Rates outside `0.0..=1.0` are clamped.
    pub fn new(mut config: SimulationConfig) -> Self {
        config.departure_rate = clamp_rate("departure_rate", config.departure_rate);
        config.brush_rate = clamp_rate("brush_rate", config.brush_rate);
        Self {
            allocator: HexAllocator::new(config.allocator),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            events: Vec::new(),
            active: Vec::new(),
            next_session: 0,
            current_frame: 0,
        }
    }

    /// Resume from a saved grid.
    ///
    /// Restored zones count as active sessions and are recorded as
    /// `ZoneCreated` (plus `ZoneElevated` when raised) at frame 0, so the
    /// timeline agrees with the allocator.
    pub fn from_snapshot(config: SimulationConfig, snapshot: &GridSnapshot) -> Result<Self> {
        let mut sim = Self::new(config);
        sim.allocator.restore(snapshot)?;
        sim.next_session = snapshot.zones.len() as u64;

        for zone in &snapshot.zones {
            let hex = HexCoord::new(zone.q, zone.r);
            sim.record_created(&zone.owner, hex, PlacementKind::Restored);
            if let Some(elevation) = sim.allocator.elevation(zone.owner.as_str()) {
                if elevation > 0.0 {
                    sim.events.push(ZoneEvent::ZoneElevated {
                        session: zone.owner.clone(),
                        elevation,
                        frame: sim.current_frame,
                    });
                }
            }
        }
        Ok(sim)
    }

    fn new_session_id(&mut self) -> OwnerId {
        loop {
            let id = OwnerId::new(format!("session-{}", self.next_session));
            self.next_session += 1;
            if self.allocator.owner_hex(id.as_str()).is_none() {
                return id;
            }
        }
    }

    /// Open a session in the next spiral cell.
    ///
    /// Shows the placeholder first, then commits to the same cell.
    pub fn open_session(&mut self) -> Result<OwnerId> {
        let session = self.new_session_id();

        if let Placement::Free(hex) = self.allocator.peek_next_in_spiral() {
            self.events.push(ZoneEvent::PlaceholderShown {
                session: session.clone(),
                hex,
                frame: self.current_frame,
            });
        }

        match self.allocator.next_in_spiral() {
            Placement::Free(hex) => {
                self.allocator.occupy(hex, session.clone())?;
                self.record_created(&session, hex, PlacementKind::Spiral);
                Ok(session)
            }
            Placement::Exhausted(_) => {
                self.events.push(ZoneEvent::SearchExhausted {
                    session,
                    frame: self.current_frame,
                });
                Err(AllocError::SearchExhausted {
                    limit: self.allocator.config().spiral_search_limit,
                    unit: "spiral slots",
                })
            }
        }
    }

    /// Open a session as close as possible to a world position.
    pub fn open_session_near(&mut self, x: f64, z: f64) -> Result<OwnerId> {
        let session = self.new_session_id();
        let target = self.allocator.config().layout.world_to_hex(x, z);

        match self.allocator.place_near(session.clone(), target) {
            Ok(hex) => {
                self.record_created(&session, hex, PlacementKind::Near);
                Ok(session)
            }
            Err(e @ AllocError::SearchExhausted { .. }) => {
                self.events.push(ZoneEvent::SearchExhausted {
                    session,
                    frame: self.current_frame,
                });
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn record_created(&mut self, session: &OwnerId, hex: HexCoord, kind: PlacementKind) {
        debug!("{} opened at {} ({:?})", session, hex, kind);
        self.active.push(session.clone());
        self.events.push(ZoneEvent::ZoneCreated {
            session: session.clone(),
            hex,
            kind,
            frame: self.current_frame,
        });
    }

    /// Close a session and free its cell.
    pub fn close_session(&mut self, session: &str) -> Option<HexCoord> {
        let hex = self.allocator.release(session)?;
        self.active.retain(|s| s.as_str() != session);
        self.events.push(ZoneEvent::ZoneRemoved {
            session: OwnerId::from(session),
            hex,
            frame: self.current_frame,
        });
        Some(hex)
    }

    /// Apply a brush stroke and record what it did.
    pub fn brush(&mut self, hex: HexCoord, color: Color, action: BrushAction) -> BrushOutcome {
        let outcome = self.allocator.apply_brush(hex, color, action);
        let frame = self.current_frame;
        match &outcome {
            BrushOutcome::Elevated { owner, elevation } => {
                self.events.push(ZoneEvent::ZoneElevated {
                    session: owner.clone(),
                    elevation: *elevation,
                    frame,
                });
            }
            BrushOutcome::Painted(cell) => {
                self.events.push(ZoneEvent::CellBrushed {
                    hex,
                    action,
                    height: cell.height(),
                    frame,
                });
            }
            BrushOutcome::Cleared(_) => {
                self.events.push(ZoneEvent::CellBrushed {
                    hex,
                    action,
                    height: 0.0,
                    frame,
                });
            }
            BrushOutcome::Unchanged => {}
        }
        outcome
    }

    /// Advance one frame: open or close a session, maybe brush a cell.
    pub fn step(&mut self) {
        let closing = !self.active.is_empty() && self.rng.gen_bool(self.config.departure_rate);

        if closing {
            let pick = self.rng.gen_range(0..self.active.len());
            let session = self.active[pick].clone();
            self.close_session(session.as_str());
        } else if let Err(e) = self.open_session() {
            warn!("Frame {}: could not open session: {}", self.current_frame, e);
        }

        if self.rng.gen_bool(self.config.brush_rate) {
            let reach = self.active.len() as u64 / 3 + 2;
            let area = filled_disk(HexCoord::ORIGIN, reach);
            let hex = area[self.rng.gen_range(0..area.len())];
            let color = PALETTE[self.rng.gen_range(0..PALETTE.len())];
            let action = if self.rng.gen_bool(0.8) {
                BrushAction::Paint
            } else {
                BrushAction::Erase
            };
            self.brush(hex, color, action);
        }

        self.current_frame += 1;
    }

    /// Run the simulation for `frames` frames.
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.step();
        }
        info!(
            "Ran {} frames: {} active sessions, {} events",
            frames,
            self.session_count(),
            self.event_count()
        );
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn allocator(&self) -> &HexAllocator {
        &self.allocator
    }

    /// Active sessions, oldest first.
    pub fn sessions(&self) -> &[OwnerId] {
        &self.active
    }

    pub fn session_count(&self) -> usize {
        self.active.len()
    }

    /// Get all recorded events.
    pub fn events(&self) -> &[ZoneEvent] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Persistable grid state.
    pub fn snapshot(&self) -> GridSnapshot {
        self.allocator.snapshot()
    }
}
