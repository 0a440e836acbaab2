//! Hexzone session simulator
//!
//! Runs session churn against the allocator and optionally writes the final
//! grid as a JSON snapshot.
//!
//! Usage: `hexzone-sim [frames] [snapshot.json] [timeline.json]`
//!
//! If the snapshot file already exists it is loaded first, so repeated runs
//! continue the same grid.

use std::env;
use std::path::PathBuf;

use hexzone_alloc::GridSnapshot;
use hexzone_sim::{Simulation, SimulationConfig, TimelineState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexzone_sim=info,hexzone_alloc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();

    let frames: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(200);
    let snapshot_path = args.get(2).map(PathBuf::from);
    let timeline_path = args.get(3).map(PathBuf::from);

    let config = SimulationConfig::from_env()?;
    tracing::info!(
        "Starting simulation: seed {}, {} frames, radius {}",
        config.seed,
        frames,
        config.allocator.layout.radius()
    );

    let mut sim = match &snapshot_path {
        Some(path) if path.exists() => {
            let snapshot = GridSnapshot::load(path)?;
            tracing::info!("Loaded {} zones from {}", snapshot.zones.len(), path.display());
            Simulation::from_snapshot(config, &snapshot)?
        }
        _ => Simulation::new(config),
    };

    sim.run(frames);

    let state = TimelineState::from_events(sim.events(), sim.event_count());
    let allocator = sim.allocator();

    println!("Hexzone Simulation");
    println!("==================");
    println!("  Frames:          {}", sim.current_frame());
    println!("  Active sessions: {}", sim.session_count());
    println!("  Events:          {}", sim.event_count());
    println!("  Painted cells:   {}", allocator.elevation_model().painted_count());
    println!("  Spiral cursor:   {}", allocator.cursor());
    println!("  Next placement:  {:?}", allocator.peek_next_in_spiral());
    println!("  Timeline zones:  {}", state.zones.len());

    if let Some(path) = snapshot_path {
        sim.snapshot().save(&path)?;
        println!("Snapshot written to {}", path.display());
    }

    if let Some(path) = timeline_path {
        std::fs::write(&path, serde_json::to_string_pretty(sim.events())?)?;
        println!("Timeline written to {}", path.display());
    }

    Ok(())
}
