//! Engine binary for the Geopolitics 2025 simulation.
//!
//! This is the main entry point that wires together the catalog, the world
//! state, the Observer API, and the tick scheduler. It runs until the
//! process is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `geopolitics-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the catalog (`PostgreSQL` or built-in roster)
//! 4. Load relations (`Dragonfly` or built-in defaults)
//! 5. Build the initial world and the simulation handle
//! 6. Bind and spawn the Observer API server
//! 7. Run the scheduler until `Ctrl-C`

mod bootstrap;
mod error;

use std::path::Path;
use std::sync::Arc;

use geopolitics_core::config::{LoggingConfig, SimulationConfig};
use geopolitics_core::economy::EconomyModel;
use geopolitics_core::runner::Scheduler;
use geopolitics_core::simulation::Simulation;
use geopolitics_core::world::WorldState;
use geopolitics_observer::{AppState, BroadcastHub};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "geopolitics-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, bootstrap data, or the Observer
/// listener cannot be set up. Once the scheduler runs, nothing ends the
/// process except an interrupt.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        world_name = config.world.name,
        start_date = config.world.start_date,
        seed = ?config.world.seed,
        tick_interval_ms = config.timing.tick_interval_ms,
        "geopolitics-engine starting"
    );

    // 3-4. Bootstrap data.
    let catalog = bootstrap::load_catalog(&config.infrastructure).await?;
    let relations = bootstrap::load_relations(&config.infrastructure, &catalog).await;

    // 5. World and simulation handle. The hub is the snapshot publisher.
    let world = WorldState::bootstrap(&catalog, &relations, &config)?;
    info!(
        nations = world.nations().len(),
        alliances = world.alliances().len(),
        sanctions = world.sanctions().len(),
        date = %world.clock().display(),
        paused = world.is_paused(),
        "World initialized"
    );

    let hub = Arc::new(BroadcastHub::new(
        config.observer.connection_queue_capacity,
    ));
    let sim = Arc::new(Simulation::new(world, hub.clone()));

    // 6. Observer API.
    let app_state = Arc::new(AppState::new(
        Arc::clone(&sim),
        hub,
        Arc::new(catalog),
        EconomyModel::new(config.economy.clone()),
        config.observer.admin_api_enabled,
    ));
    let observer_handle = geopolitics_observer::spawn_observer(&config.observer, app_state).await?;
    if config.observer.admin_api_enabled {
        warn!("Admin state merge is enabled; expose this server to trusted clients only");
    }

    // 7. Run the scheduler.
    let scheduler = Scheduler::from_config(sim, &config);
    tokio::select! {
        () = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Interrupt received");
        }
    }

    observer_handle.abort();
    info!("geopolitics-engine shutdown complete");
    Ok(())
}

/// Load configuration from `geopolitics-config.yaml`, or defaults.
///
/// Looks for the config file relative to the current working directory.
/// Environment overrides apply either way.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        return Ok(SimulationConfig::from_file(config_path)?);
    }

    let mut config = SimulationConfig::default();
    config.infrastructure.apply_env_overrides();
    config.observer.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
