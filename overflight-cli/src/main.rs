//! Overflight CLI - headless simulation runner
//!
//! Runs the simulation core without a renderer: a scripted flight at a fixed
//! 60 Hz step, logging telemetry and streaming statistics. Useful for
//! soak-testing the streaming pipeline and for profiling.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use overflight::config::{self, SimConfig};
use overflight::flight::ControlInputs;
use overflight::logging::{default_log_dir, default_log_file, init_logging};
use overflight::sim::{FrameInputs, Simulation};
use overflight::terrain::{
    ArcGisProvider, FlatTerrain, HeightProvider, ImageryProvider, OfflineProvider, StreamedTerrain,
};

const STEP_SECONDS: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TerrainMode {
    /// Flat ground at sea level
    Flat,
    /// Streamed per-tile elevation grids
    Streamed,
}

#[derive(Parser)]
#[command(name = "overflight")]
#[command(version = overflight::VERSION)]
#[command(about = "Headless drone flight simulation", long_about = None)]
struct Args {
    /// Spawn latitude in decimal degrees
    #[arg(long)]
    lat: Option<f64>,

    /// Spawn longitude in decimal degrees
    #[arg(long)]
    lng: Option<f64>,

    /// Number of simulation steps to run (0 = run until Ctrl-C)
    #[arg(long, default_value = "0")]
    steps: u64,

    /// Run without network access; every tile uses the fallback color
    #[arg(long)]
    offline: bool,

    /// Restrict tile streaming to a forward-facing wedge
    #[arg(long)]
    directional: bool,

    /// Terrain height source
    #[arg(long, value_enum, default_value = "flat")]
    terrain: TerrainMode,

    /// Configuration file (defaults to ~/.config/overflight/overflight.ini)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, default_value_t = default_log_dir().to_string())]
    log_dir: String,
}

fn load_config(args: &Args) -> Result<SimConfig, config::ConfigError> {
    let mut sim_config = match &args.config {
        Some(path) => config::load_from_file(path)?,
        None => match config::default_config_path() {
            Some(path) if path.exists() => config::load_from_file(&path)?,
            _ => SimConfig::default(),
        },
    };

    if let Some(lat) = args.lat {
        sim_config.map.spawn_lat = lat;
    }
    if let Some(lng) = args.lng {
        sim_config.map.spawn_lng = lng;
    }
    if args.directional {
        sim_config.terrain.directional = true;
    }
    Ok(sim_config)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _logging_guard = match init_logging(&args.log_dir, default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            process::exit(1);
        }
    };

    let sim_config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let provider: Arc<dyn ImageryProvider> = if args.offline {
        Arc::new(OfflineProvider)
    } else {
        match ArcGisProvider::new() {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                error!("Failed to create imagery provider: {}", e);
                process::exit(1);
            }
        }
    };
    info!(provider = provider.name(), "Imagery provider ready");

    let height: Arc<dyn HeightProvider> = match args.terrain {
        TerrainMode::Flat => Arc::new(FlatTerrain::sea_level()),
        TerrainMode::Streamed => Arc::new(StreamedTerrain::new(sim_config.terrain.tile_zoom)),
    };

    let cancel = CancellationToken::new();
    let mut sim = Simulation::new(sim_config, provider, height, cancel.clone());

    let preloaded = sim.preload_terrain();
    info!(preloaded, "Spawn terrain preload issued");

    run_loop(&mut sim, args.steps, &cancel).await;

    cancel.cancel();
    let state = sim.vehicle();
    info!(
        x = state.position.x,
        z = state.position.z,
        altitude = state.altitude,
        battery = state.battery,
        resident_tiles = sim.terrain().resident_count(),
        "Simulation finished"
    );
}

/// Fixed-rate loop flying a gentle scripted circuit: forward with a slow
/// left turn, so the streaming cache sees continuous tile crossings.
async fn run_loop(sim: &mut Simulation, steps: u64, cancel: &CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(STEP_SECONDS));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let inputs = FrameInputs {
        controls: ControlInputs {
            forward: true,
            yaw_left: true,
            ..Default::default()
        },
        ..FrameInputs::default()
    };

    let mut step = 0u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
                return;
            }
        }

        let output = sim.step(&inputs, STEP_SECONDS);
        step += 1;

        // Once per simulated second
        if step % 60 == 0 {
            let state = sim.vehicle();
            info!(
                step,
                speed = state.speed,
                altitude = state.altitude,
                heading = state.heading,
                battery = state.battery,
                resident = sim.terrain().resident_count(),
                pending = sim.terrain().pending_count(),
                loaded = output.terrain.loaded,
                evicted = output.terrain.evicted,
                "Telemetry"
            );
        }

        if steps > 0 && step >= steps {
            return;
        }
    }
}
