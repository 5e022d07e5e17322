//! Downward-facing ground camera.

use std::f64::consts::PI;

use crate::config::CameraConfig;
use crate::coord::WorldPosition;
use crate::flight::VehicleState;

/// A ground-camera view: straight down from the vehicle, rolled so that the
/// image "up" tracks the vehicle heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundView {
    pub position: WorldPosition,
    pub target: WorldPosition,
    /// Roll applied to the downward view, radians.
    pub roll: f64,
}

/// Auxiliary nadir camera, togglable at runtime.
#[derive(Debug)]
pub struct GroundCamera {
    look_depth: f64,
    enabled: bool,
}

impl GroundCamera {
    /// Create a disabled ground camera.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            look_depth: config.ground_look_depth,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the enabled state; returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// The current view, or `None` while disabled.
    ///
    /// Rides exactly on the vehicle with no smoothing; the quarter-turn
    /// offset aligns the image frame with the compass.
    pub fn view(&self, vehicle: &VehicleState) -> Option<GroundView> {
        if !self.enabled {
            return None;
        }
        let pos = vehicle.position;
        Some(GroundView {
            position: pos,
            target: WorldPosition::new(pos.x, pos.y - self.look_depth, pos.z),
            roll: -vehicle.attitude.yaw - PI / 2.0,
        })
    }
}
