//! Vehicle state.
//!
//! Exactly one `VehicleState` exists per simulation; it is owned and mutated
//! exclusively by [`FlightDynamics`](crate::flight::FlightDynamics). Every
//! other component reads a shared reference or a snapshot.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::coord::WorldPosition;

/// Vehicle attitude in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    /// Rotation about the body X axis (nose up/down).
    pub pitch: f64,
    /// Rotation about the body Z axis (bank left/right).
    pub roll: f64,
    /// Rotation about the world Y axis; 0 = north, increases turning left.
    pub yaw: f64,
}

/// The complete state of the simulated vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position in world meters.
    pub position: WorldPosition,
    /// Velocity; horizontal components are meters per frame.
    pub velocity: WorldPosition,
    /// Pitch/roll/yaw in radians.
    pub attitude: Attitude,
    /// Total velocity magnitude (derived).
    pub speed: f64,
    /// Altitude, equal to `position.y` (derived).
    pub altitude: f64,
    /// Compass heading in degrees [0, 360) (derived from yaw).
    pub heading: f64,
    /// Battery charge percentage in [0, 100].
    pub battery: f64,
}

impl VehicleState {
    /// Create a vehicle at the spawn point with full battery.
    pub fn new(start_altitude: f64) -> Self {
        Self {
            position: WorldPosition::new(0.0, start_altitude, 0.0),
            velocity: WorldPosition::default(),
            attitude: Attitude::default(),
            speed: 0.0,
            altitude: start_altitude,
            heading: 0.0,
            battery: 100.0,
        }
    }

    /// Restore position, velocity and attitude to spawn defaults.
    ///
    /// Battery is intentionally NOT restored; a reset is a repositioning
    /// command, not a recharge.
    pub fn reset(&mut self, start_altitude: f64) {
        self.position = WorldPosition::new(0.0, start_altitude, 0.0);
        self.velocity = WorldPosition::default();
        self.attitude = Attitude::default();
        self.speed = 0.0;
        self.altitude = start_altitude;
        self.heading = 0.0;
    }

    /// Overwrite the horizontal position and kill all velocity.
    ///
    /// Altitude and attitude are left untouched; used by map-click teleports.
    pub fn teleport(&mut self, x: f64, z: f64) {
        self.position.x = x;
        self.position.z = z;
        self.velocity = WorldPosition::default();
    }

    /// Recompute the derived metrics from position/velocity/attitude.
    pub fn update_metrics(&mut self) {
        self.speed = self.velocity.length();
        self.altitude = self.position.y;
        self.heading = ((self.attitude.yaw * 180.0 / PI) + 360.0) % 360.0;
    }

    /// Drain battery by a base amount plus a velocity-activity term.
    ///
    /// Clamped at zero; depletion is informational and has no shutdown
    /// effect.
    pub fn drain_battery(&mut self, base: f64, activity_factor: f64) {
        let activity =
            self.velocity.x.abs() + self.velocity.y.abs() + self.velocity.z.abs();
        self.battery -= base + activity * activity_factor;
        self.battery = self.battery.max(0.0);
    }

    /// Horizontal speed (XZ plane only).
    pub fn horizontal_speed(&self) -> f64 {
        self.velocity.horizontal_length()
    }

    /// True when any velocity component exceeds the given threshold.
    pub fn is_moving(&self, threshold: f64) -> bool {
        self.velocity.x.abs() > threshold
            || self.velocity.y.abs() > threshold
            || self.velocity.z.abs() > threshold
    }
}
