//! Hexzone Session Simulation
//!
//! Drives the allocator the way a zone-lifecycle host would: sessions open
//! (placeholder preview, then commit), close, get placed near clicks, and
//! get brushed. Every change is recorded as a [`ZoneEvent`] so the layout at
//! any point can be rebuilt with [`TimelineState::from_events`].
//!
//! # Usage
//!
//! ```
//! use hexzone_sim::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default());
//! sim.run(50);
//! let json = sim.snapshot().to_json().unwrap();
//! assert!(json.contains("zones"));
//! ```

mod events;
mod simulation;

pub use events::{PlacementKind, TimelineState, ZoneEvent};
pub use simulation::{Simulation, SimulationConfig};
