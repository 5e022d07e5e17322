//! Minimap bridge.
//!
//! The minimap is a 2D geodetic view of the simulation: a vehicle marker, a
//! view cone showing what the camera sees, optional auto-centering, and a
//! cycling widget size. This module computes the geodetic state; the actual
//! widget is the frontend's concern.

use std::f64::consts::PI;

use serde::Serialize;

use crate::config::MapConfig;
use crate::coord::{GeodeticPoint, LocalProjection, METERS_PER_DEGREE};
use crate::flight::VehicleState;

/// Vehicle marker on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerState {
    pub lat: f64,
    pub lng: f64,
    /// Compass heading in degrees, for the marker's arrow.
    pub heading_degrees: f64,
}

/// Camera view cone drawn as a triangle on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewCone {
    /// Vehicle position; the cone's tip.
    pub apex: GeodeticPoint,
    pub left: GeodeticPoint,
    pub right: GeodeticPoint,
}

/// One frame of minimap state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub marker: MarkerState,
    pub cone: ViewCone,
    /// Map center when auto-centering is on, `None` to leave the map where
    /// the user panned it.
    pub center: Option<GeodeticPoint>,
    /// Current widget size in pixels.
    pub size: u32,
}

/// Computes minimap state from the vehicle each frame.
pub struct MapBridge {
    config: MapConfig,
    /// View cone half-angle, radians.
    half_fov: f64,
    centered: bool,
    size_index: usize,
}

impl MapBridge {
    /// Create a bridge; `fov_degrees` matches the main camera so the cone
    /// shows what the camera sees.
    pub fn new(config: MapConfig, fov_degrees: f64) -> Self {
        let centered = config.centered;
        let size_index = config.default_size_index.min(config.sizes.len() - 1);
        Self {
            config,
            half_fov: fov_degrees * PI / 180.0 / 2.0,
            centered,
            size_index,
        }
    }

    /// Whether the map follows the vehicle.
    pub fn is_centered(&self) -> bool {
        self.centered
    }

    /// Flip auto-centering; returns the new state.
    pub fn toggle_centering(&mut self) -> bool {
        self.centered = !self.centered;
        self.centered
    }

    /// Advance to the next widget size, wrapping around.
    pub fn cycle_size(&mut self) -> u32 {
        self.size_index = (self.size_index + 1) % self.config.sizes.len();
        self.config.sizes[self.size_index]
    }

    /// Current widget size in pixels.
    pub fn size(&self) -> u32 {
        self.config.sizes[self.size_index]
    }

    /// Compute this frame's map state.
    pub fn view(&self, vehicle: &VehicleState, projection: &LocalProjection) -> MapView {
        let point = projection.world_to_geodetic(vehicle.position.x, vehicle.position.z);

        MapView {
            marker: MarkerState {
                lat: point.lat,
                lng: point.lng,
                heading_degrees: vehicle.heading,
            },
            cone: self.view_cone(&point, vehicle.attitude.yaw),
            center: self.centered.then_some(point),
            size: self.size(),
        }
    }

    /// Triangle from the vehicle out along the camera's field of view.
    ///
    /// Longitude offsets scale by the cosine of the vehicle's *current*
    /// latitude (unlike the world projection, which is pinned to the spawn
    /// latitude), keeping the cone visually symmetric anywhere on the map.
    fn view_cone(&self, apex: &GeodeticPoint, heading: f64) -> ViewCone {
        let meters_per_degree_lng = METERS_PER_DEGREE * (apex.lat * PI / 180.0).cos();
        let length = self.config.cone_length;

        let edge = |angle: f64| {
            let x = angle.sin() * length;
            let z = angle.cos() * length;
            GeodeticPoint::new(
                apex.lat - z / METERS_PER_DEGREE,
                apex.lng + x / meters_per_degree_lng,
            )
        };

        ViewCone {
            apex: *apex,
            left: edge(heading - self.half_fov),
            right: edge(heading + self.half_fov),
        }
    }
}
