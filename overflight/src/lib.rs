//! Overflight - arcade drone flight simulation core
//!
//! This library provides the simulation core of a satellite-imagery drone
//! flight simulator: a geodetic/world coordinate system anchored at a spawn
//! origin, a streaming terrain tile cache, an arcade flight model, camera
//! rigs, landmark streaming, and a minimap bridge. Rendering and input are
//! left to frontends.
//!
//! # High-Level API
//!
//! [`sim::Simulation`] wires every subsystem together and advances them one
//! frame at a time:
//!
//! ```ignore
//! use std::sync::Arc;
//! use overflight::config::SimConfig;
//! use overflight::sim::{FrameInputs, Simulation};
//! use overflight::terrain::{ArcGisProvider, FlatTerrain};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut sim = Simulation::new(
//!     SimConfig::default(),
//!     Arc::new(ArcGisProvider::new()?),
//!     Arc::new(FlatTerrain::sea_level()),
//!     CancellationToken::new(),
//! );
//! sim.preload_terrain();
//!
//! let output = sim.step(&FrameInputs::default(), 1.0 / 60.0);
//! ```

pub mod camera;
pub mod config;
pub mod coord;
pub mod flight;
pub mod landmark;
pub mod logging;
pub mod map;
pub mod proximity;
pub mod sim;
pub mod terrain;

/// Version of the Overflight library and CLI.
///
/// Synchronized across all components in the workspace; defined in
/// `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
