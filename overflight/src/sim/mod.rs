//! Frame orchestration.
//!
//! [`Simulation`] owns every subsystem and advances them in a fixed order
//! each frame: flight dynamics, terrain streaming, landmark streaming,
//! cameras, minimap. The order matters - everything downstream of the
//! integrator observes the state it just produced, never last frame's.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::camera::{CameraInputs, CameraPose, CameraRig, GroundCamera, GroundView};
use crate::config::SimConfig;
use crate::coord::LocalProjection;
use crate::flight::{ControlInputs, FlightDynamics, VehicleState};
use crate::landmark::{default_catalog, Landmark, LandmarkLoader};
use crate::map::{MapBridge, MapView};
use crate::proximity::ProximityEvent;
use crate::terrain::{
    AsyncRequester, FetchResult, HeightProvider, ImageryProvider, TileCache, TileRequester,
    UpdateOutcome,
};

/// Everything the operator did this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInputs {
    pub controls: ControlInputs,
    pub camera: CameraInputs,
    /// Return the vehicle to spawn.
    pub reset: bool,
    /// Toggle the downward ground camera.
    pub toggle_ground_camera: bool,
    /// Toggle minimap auto-centering.
    pub toggle_map_centering: bool,
    /// Cycle the minimap widget size.
    pub cycle_map_size: bool,
}

/// Everything a frontend needs to render one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Vehicle state snapshot after this frame's integration.
    pub vehicle: VehicleState,
    pub terrain: UpdateOutcome,
    pub camera: CameraPose,
    pub ground: Option<GroundView>,
    pub map: MapView,
    pub landmark_events: Vec<ProximityEvent>,
}

/// The complete simulation.
pub struct Simulation {
    projection: LocalProjection,
    dynamics: FlightDynamics,
    terrain: TileCache,
    landmarks: LandmarkLoader,
    rig: CameraRig,
    ground: GroundCamera,
    map: MapBridge,
}

impl Simulation {
    /// Build a simulation with async tile fetching.
    ///
    /// Must run inside a tokio runtime; fetch tasks are spawned on it and
    /// abandoned when `cancel` fires.
    pub fn new(
        config: SimConfig,
        provider: Arc<dyn ImageryProvider>,
        height: Arc<dyn HeightProvider>,
        cancel: CancellationToken,
    ) -> Self {
        let (requester, results) = AsyncRequester::new(provider, cancel);
        Self::from_parts(config, Box::new(requester), results, height)
    }

    /// Build from explicit streaming parts; the deterministic path tests
    /// drive directly.
    pub fn from_parts(
        config: SimConfig,
        requester: Box<dyn TileRequester>,
        results: tokio::sync::mpsc::UnboundedReceiver<FetchResult>,
        height: Arc<dyn HeightProvider>,
    ) -> Self {
        let projection = LocalProjection::new(config.map.spawn_lat, config.map.spawn_lng);
        let dynamics = FlightDynamics::new(config.flight.clone(), projection, height);
        let terrain = TileCache::new(config.terrain.clone(), projection, requester, results);
        let landmarks = LandmarkLoader::new(default_catalog(), &config.landmarks, &projection);
        let rig = CameraRig::new(config.camera.clone());
        let ground = GroundCamera::new(&config.camera);
        let map = MapBridge::new(config.map.clone(), config.camera.fov_degrees);

        info!(
            spawn_lat = config.map.spawn_lat,
            spawn_lng = config.map.spawn_lng,
            "Simulation created"
        );

        Self {
            projection,
            dynamics,
            terrain,
            landmarks,
            rig,
            ground,
            map,
        }
    }

    /// Replace the default catalog with a custom one.
    pub fn set_catalog(&mut self, catalog: Vec<Landmark>, config: &crate::config::LandmarkConfig) {
        self.landmarks = LandmarkLoader::new(catalog, config, &self.projection);
    }

    /// One-time spawn-area tile preload; call before the first frame.
    pub fn preload_terrain(&mut self) -> usize {
        self.terrain.preload()
    }

    /// Advance the whole simulation by one frame.
    pub fn step(&mut self, inputs: &FrameInputs, delta_time: f64) -> FrameOutput {
        if inputs.reset {
            self.dynamics.reset();
            info!("Vehicle reset to spawn");
        }
        if inputs.toggle_ground_camera {
            self.ground.toggle();
        }
        if inputs.toggle_map_centering {
            self.map.toggle_centering();
        }
        if inputs.cycle_map_size {
            self.map.cycle_size();
        }

        self.dynamics.step(&inputs.controls, delta_time);
        let state = self.dynamics.state();

        let terrain = self.terrain.update(&state.position, state.attitude.yaw);
        let landmark_events = self.landmarks.update(&state.position);
        self.rig.update(&inputs.camera, state);
        let ground = self.ground.view(state);
        let map = self.map.view(state, &self.projection);

        FrameOutput {
            vehicle: state.clone(),
            terrain,
            camera: self.rig.pose(),
            ground,
            map,
            landmark_events,
        }
    }

    /// Teleport the vehicle to a clicked map coordinate.
    ///
    /// The vehicle keeps its altitude and attitude; velocity is zeroed so
    /// it arrives hovering.
    pub fn click_map(&mut self, lat: f64, lng: f64) {
        let (x, z) = self.projection.geodetic_to_world(lat, lng);
        self.dynamics.teleport(x, z);
        info!(lat, lng, "Teleported via map click");
    }

    /// Read-only vehicle state.
    pub fn vehicle(&self) -> &VehicleState {
        self.dynamics.state()
    }

    /// The terrain cache, for rendering and inspection.
    pub fn terrain(&self) -> &TileCache {
        &self.terrain
    }

    /// Currently instantiated landmarks.
    pub fn landmarks(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.loaded()
    }

    /// The world projection in use.
    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }
}
