//! Simulation configuration.
//!
//! All tunable constants live here, grouped per subsystem. Defaults reproduce
//! the reference constants the flight model was calibrated with; an INI file
//! can override any subset of keys (see [`load_from_file`]).

mod file;

pub use file::{default_config_path, load_from_file, ConfigError};

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Default spawn latitude (Norway, Oslofjord).
pub const DEFAULT_SPAWN_LAT: f64 = 59.113277;
/// Default spawn longitude.
pub const DEFAULT_SPAWN_LNG: f64 = 10.110296;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub map: MapConfig,
    pub terrain: TerrainConfig,
    pub flight: FlightConfig,
    pub camera: CameraConfig,
    pub landmarks: LandmarkConfig,
}

/// Map widget and spawn settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Spawn latitude; origin of the world projection.
    pub spawn_lat: f64,
    /// Spawn longitude; origin of the world projection.
    pub spawn_lng: f64,
    /// Initial map widget zoom level.
    pub default_zoom: u8,
    /// Available widget sizes in pixels, cycled by the size command.
    pub sizes: Vec<u32>,
    /// Index into `sizes` at startup.
    pub default_size_index: usize,
    /// Whether the map follows the vehicle at startup.
    pub centered: bool,
    /// View cone length ahead of the vehicle, meters.
    pub cone_length: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            spawn_lat: DEFAULT_SPAWN_LAT,
            spawn_lng: DEFAULT_SPAWN_LNG,
            default_zoom: 13,
            sizes: vec![200, 300, 400, 500, 600],
            default_size_index: 1,
            centered: true,
            cone_length: 1000.0,
        }
    }
}

/// Terrain streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Zoom level of streamed terrain tiles.
    pub tile_zoom: u8,
    /// Tiles loaded in each direction around the reference tile.
    pub load_radius: u32,
    /// Extra Chebyshev distance beyond `load_radius` before eviction.
    pub eviction_buffer: u32,
    /// Maximum tile loads issued per update.
    pub max_loads_per_frame: usize,
    /// Maximum evictions per update; prevents eviction storms after teleports.
    pub max_evicts_per_frame: usize,
    /// Circular radius of the one-time spawn preload.
    pub preload_radius: u32,
    /// Restrict streaming to a forward-facing wedge derived from heading.
    pub directional: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_zoom: 16,
            load_radius: 6,
            eviction_buffer: 3,
            max_loads_per_frame: 10,
            max_evicts_per_frame: 5,
            preload_radius: 15,
            directional: false,
        }
    }
}

/// Flight model constants.
///
/// Velocity is integrated in meters per frame (`position += velocity` once
/// per step) and yaw advances a fixed angle per step; only lift is scaled by
/// the frame delta. These framerate couplings are part of the calibrated feel
/// and are preserved as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Spawn altitude, meters.
    pub start_altitude: f64,
    /// Horizontal speed cap, m/s.
    pub max_speed: f64,
    /// Thrust added per step along body axes.
    pub acceleration: f64,
    /// Yaw rate, radians per step.
    pub rotation_speed: f64,
    /// Vertical thrust, m/s² (deltaTime-scaled).
    pub lift_speed: f64,
    /// Per-step velocity decay factor in (0, 1).
    pub drag: f64,
    /// Hard pitch/roll bound, radians.
    pub max_tilt: f64,
    /// Exponential smoothing factor for attitude, in (0, 1].
    pub tilt_responsiveness: f64,
    /// Minimum clearance above terrain, meters.
    pub min_clearance: f64,
    /// Battery drained per step regardless of motion, percent.
    pub battery_drain_base: f64,
    /// Battery drained per unit of velocity activity, percent.
    pub battery_drain_activity: f64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            start_altitude: 50.0,
            max_speed: 20.0,
            acceleration: 0.5,
            rotation_speed: 0.03,
            lift_speed: 2.0,
            drag: 0.95,
            max_tilt: PI / 6.0,
            tilt_responsiveness: 0.15,
            min_clearance: 2.0,
            battery_drain_base: 0.001,
            battery_drain_activity: 0.0001,
        }
    }
}

/// Camera rig settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Follow distance behind the vehicle, meters.
    pub follow_distance: f64,
    /// Height offset above the vehicle in follow mode, meters.
    pub follow_height: f64,
    /// Exponential interpolation factor for pose smoothing, in (0, 1].
    pub lerp_factor: f64,
    /// Distance ahead of the vehicle the FPV camera looks at, meters.
    pub fpv_look_distance: f64,
    /// Downward offset of the FPV look-at point, meters.
    pub fpv_look_down: f64,
    /// Minimum zoomable follow distance, meters.
    pub min_distance: f64,
    /// Maximum zoomable follow distance, meters.
    pub max_distance: f64,
    /// Follow-distance change per unit of zoom input.
    pub zoom_speed: f64,
    /// Horizontal field of view, degrees; also drives the map view cone.
    pub fov_degrees: f64,
    /// Velocity-component threshold above which a parked orbit releases.
    pub motion_threshold: f64,
    /// Orbit angle change per pixel of pointer movement, radians.
    pub orbit_sensitivity: f64,
    /// How far below itself the ground camera looks, meters.
    pub ground_look_depth: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_distance: 150.0,
            follow_height: 80.0,
            lerp_factor: 0.1,
            fpv_look_distance: 100.0,
            fpv_look_down: 10.0,
            min_distance: 30.0,
            max_distance: 500.0,
            zoom_speed: 0.1,
            fov_degrees: 75.0,
            motion_threshold: 0.1,
            orbit_sensitivity: 0.005,
            ground_look_depth: 100.0,
        }
    }
}

/// Landmark streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkConfig {
    /// Distance at which a landmark is instantiated, meters.
    pub load_distance: f64,
    /// Distance beyond which a loaded landmark is released, meters.
    ///
    /// Must exceed `load_distance`; the gap is the hysteresis band that
    /// prevents flicker at the boundary.
    pub unload_distance: f64,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            load_distance: 500.0,
            unload_distance: 1000.0,
        }
    }
}
