//! Main camera rig.
//!
//! One rig serves two modes. FOLLOW trails the vehicle from behind with
//! exponential pose smoothing and a zoomable distance; FPV sits exactly on
//! the vehicle and looks ahead. An orbit overlay on FOLLOW lets the operator
//! drag the camera around the vehicle; released, the orbit parks in place
//! and snaps back to trailing only once the vehicle moves again.

use std::f64::consts::PI;

use tracing::debug;

use crate::config::CameraConfig;
use crate::coord::WorldPosition;
use crate::flight::VehicleState;

/// Which camera is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Third-person trailing camera.
    Follow,
    /// First-person view from the vehicle.
    Fpv,
}

/// Orbit overlay state within FOLLOW mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitState {
    /// Normal trailing behavior.
    Inactive,
    /// Operator is dragging; angles track the pointer.
    Dragging,
    /// Drag released; the camera holds its orbit position until the
    /// vehicle moves.
    Parked,
}

/// A camera position and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: WorldPosition,
    pub target: WorldPosition,
}

/// Camera-related inputs sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInputs {
    /// Rising-edge event: switch between FOLLOW and FPV.
    pub toggle_mode: bool,
    /// Orbit button held this frame.
    pub grab: bool,
    /// Pointer movement in pixels since last frame (only read while
    /// grabbing).
    pub pointer_delta: (f64, f64),
    /// Scroll wheel movement; positive zooms out.
    pub zoom_delta: f64,
}

/// The main view camera.
pub struct CameraRig {
    config: CameraConfig,
    mode: CameraMode,
    orbit: OrbitState,
    /// Current follow/orbit distance, zoom-adjustable.
    distance: f64,
    /// Orbit azimuth, radians.
    angle_h: f64,
    /// Orbit elevation, radians; clamped short of the poles.
    angle_v: f64,
    pose: CameraPose,
}

impl CameraRig {
    /// Create a rig in FOLLOW mode with the fixed startup pose.
    pub fn new(config: CameraConfig) -> Self {
        let distance = config.follow_distance;
        Self {
            config,
            mode: CameraMode::Follow,
            orbit: OrbitState::Inactive,
            distance,
            angle_h: 0.0,
            angle_v: 0.0,
            pose: CameraPose {
                position: WorldPosition::new(0.0, 100.0, 150.0),
                target: WorldPosition::new(0.0, 50.0, 0.0),
            },
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn orbit_state(&self) -> OrbitState {
        self.orbit
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Current follow distance in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Advance the camera for one frame.
    pub fn update(&mut self, inputs: &CameraInputs, vehicle: &VehicleState) {
        if inputs.toggle_mode {
            self.mode = match self.mode {
                CameraMode::Follow => CameraMode::Fpv,
                CameraMode::Fpv => CameraMode::Follow,
            };
            debug!(mode = ?self.mode, "Camera mode switched");
        }

        // A parked orbit releases as soon as the vehicle moves; an active
        // drag always keeps control.
        if self.orbit == OrbitState::Parked && vehicle.is_moving(self.config.motion_threshold) {
            self.orbit = OrbitState::Inactive;
        }

        self.handle_orbit(inputs, vehicle);

        if self.mode == CameraMode::Follow && inputs.zoom_delta != 0.0 {
            self.distance = (self.distance + inputs.zoom_delta * self.config.zoom_speed)
                .clamp(self.config.min_distance, self.config.max_distance);
        }

        self.compute_pose(vehicle);
    }

    fn handle_orbit(&mut self, inputs: &CameraInputs, vehicle: &VehicleState) {
        if inputs.grab {
            if self.orbit != OrbitState::Dragging {
                // Capture angles from wherever the camera currently is, so
                // the drag starts without a jump
                let dx = self.pose.position.x - vehicle.position.x;
                let dy = self.pose.position.y - vehicle.position.y;
                let dz = self.pose.position.z - vehicle.position.z;
                let horizontal = (dx * dx + dz * dz).sqrt();
                self.angle_h = dx.atan2(dz);
                self.angle_v = dy.atan2(horizontal);
                self.orbit = OrbitState::Dragging;
            }

            let sensitivity = self.config.orbit_sensitivity;
            let (delta_x, delta_y) = inputs.pointer_delta;
            self.angle_h -= delta_x * sensitivity;
            self.angle_v = (self.angle_v - delta_y * sensitivity)
                .clamp(-PI / 2.0 + 0.1, PI / 2.0 - 0.1);
        } else if self.orbit == OrbitState::Dragging {
            self.orbit = OrbitState::Parked;
        }
    }

    fn compute_pose(&mut self, vehicle: &VehicleState) {
        let pos = vehicle.position;

        match self.mode {
            CameraMode::Fpv => {
                // Exact, unsmoothed: the operator's eye is on the airframe
                let yaw = vehicle.attitude.yaw;
                self.pose = CameraPose {
                    position: pos,
                    target: WorldPosition::new(
                        pos.x + yaw.sin() * self.config.fpv_look_distance,
                        pos.y - self.config.fpv_look_down,
                        pos.z + yaw.cos() * self.config.fpv_look_distance,
                    ),
                };
            }
            CameraMode::Follow => {
                let target_position = if self.orbit != OrbitState::Inactive {
                    WorldPosition::new(
                        pos.x + self.angle_h.sin() * self.angle_v.cos() * self.distance,
                        pos.y + self.angle_v.sin() * self.distance,
                        pos.z + self.angle_h.cos() * self.angle_v.cos() * self.distance,
                    )
                } else {
                    let yaw = vehicle.attitude.yaw;
                    WorldPosition::new(
                        pos.x - yaw.sin() * self.distance,
                        pos.y + self.config.follow_height,
                        pos.z - yaw.cos() * self.distance,
                    )
                };

                // A corrupted vehicle state must not poison the smoothed
                // pose; hold the last good one
                if !target_position.is_finite() || !pos.is_finite() {
                    return;
                }

                self.pose = CameraPose {
                    position: self
                        .pose
                        .position
                        .lerp(&target_position, self.config.lerp_factor),
                    target: pos,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(CameraConfig::default())
    }

    fn vehicle() -> VehicleState {
        VehicleState::new(50.0)
    }

    #[test]
    fn test_initial_pose() {
        let rig = rig();
        assert_eq!(rig.pose().position, WorldPosition::new(0.0, 100.0, 150.0));
        assert_eq!(rig.pose().target, WorldPosition::new(0.0, 50.0, 0.0));
        assert_eq!(rig.mode(), CameraMode::Follow);
        assert_eq!(rig.orbit_state(), OrbitState::Inactive);
    }

    #[test]
    fn test_follow_converges_behind_vehicle() {
        let mut rig = rig();
        let state = vehicle(); // yaw 0, at origin, altitude 50

        for _ in 0..300 {
            rig.update(&CameraInputs::default(), &state);
        }

        // Behind a north-facing vehicle: -forward * 150 + height 80
        let pose = rig.pose();
        assert!((pose.position.x - 0.0).abs() < 0.5);
        assert!((pose.position.y - 130.0).abs() < 0.5);
        assert!((pose.position.z - (-150.0)).abs() < 0.5);
        assert_eq!(pose.target, state.position);
    }

    #[test]
    fn test_follow_position_is_smoothed_not_snapped() {
        let mut rig = rig();
        let mut state = vehicle();
        rig.update(&CameraInputs::default(), &state);
        let before = rig.pose().position;

        state.position.x = 10_000.0;
        rig.update(&CameraInputs::default(), &state);
        let after = rig.pose().position;

        // One lerp step covers 10% of the gap, nowhere near the new target
        assert!(after.x > before.x);
        assert!(after.x < 2_000.0);
        // The look-at target snaps immediately
        assert_eq!(rig.pose().target, state.position);
    }

    #[test]
    fn test_fpv_is_exact_and_looks_ahead() {
        let mut rig = rig();
        let mut state = vehicle();
        state.position = WorldPosition::new(100.0, 70.0, -40.0);
        state.attitude.yaw = PI / 2.0; // facing +x

        rig.update(
            &CameraInputs {
                toggle_mode: true,
                ..CameraInputs::default()
            },
            &state,
        );

        assert_eq!(rig.mode(), CameraMode::Fpv);
        let pose = rig.pose();
        assert_eq!(pose.position, state.position);
        assert!((pose.target.x - 200.0).abs() < 1e-9);
        assert!((pose.target.y - 60.0).abs() < 1e-9);
        assert!((pose.target.z - (-40.0)).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_returns_to_follow() {
        let mut rig = rig();
        let state = vehicle();
        let toggle = CameraInputs {
            toggle_mode: true,
            ..CameraInputs::default()
        };
        rig.update(&toggle, &state);
        assert_eq!(rig.mode(), CameraMode::Fpv);
        rig.update(&toggle, &state);
        assert_eq!(rig.mode(), CameraMode::Follow);
    }

    #[test]
    fn test_zoom_clamps_to_bounds() {
        let mut rig = rig();
        let state = vehicle();

        rig.update(
            &CameraInputs {
                zoom_delta: 100_000.0,
                ..CameraInputs::default()
            },
            &state,
        );
        assert_eq!(rig.distance(), 500.0);

        rig.update(
            &CameraInputs {
                zoom_delta: -100_000.0,
                ..CameraInputs::default()
            },
            &state,
        );
        assert_eq!(rig.distance(), 30.0);
    }

    #[test]
    fn test_orbit_drag_moves_camera_and_parks_on_release() {
        let mut rig = rig();
        let state = vehicle();
        for _ in 0..300 {
            rig.update(&CameraInputs::default(), &state);
        }
        let trailing = rig.pose().position;

        // Swing the azimuth a quarter turn in one drag, then hold
        let quarter_turn = CameraInputs {
            grab: true,
            pointer_delta: (PI / 2.0 / 0.005, 0.0),
            ..CameraInputs::default()
        };
        rig.update(&quarter_turn, &state);
        let hold = CameraInputs {
            grab: true,
            ..CameraInputs::default()
        };
        for _ in 0..100 {
            rig.update(&hold, &state);
        }
        assert_eq!(rig.orbit_state(), OrbitState::Dragging);
        let orbited = rig.pose().position;
        assert!((orbited.x - trailing.x).abs() > 50.0);

        // Release: parked, pose keeps converging to the orbit anchor
        rig.update(&CameraInputs::default(), &state);
        assert_eq!(rig.orbit_state(), OrbitState::Parked);
        let parked = rig.pose().position;
        for _ in 0..50 {
            rig.update(&CameraInputs::default(), &state);
        }
        assert!((rig.pose().position.x - parked.x).abs() < 5.0);
    }

    #[test]
    fn test_parked_orbit_releases_when_vehicle_moves() {
        let mut rig = rig();
        let mut state = vehicle();

        let drag = CameraInputs {
            grab: true,
            pointer_delta: (40.0, 0.0),
            ..CameraInputs::default()
        };
        for _ in 0..50 {
            rig.update(&drag, &state);
        }
        rig.update(&CameraInputs::default(), &state);
        assert_eq!(rig.orbit_state(), OrbitState::Parked);

        // Below the threshold: stays parked
        state.velocity.z = 0.05;
        rig.update(&CameraInputs::default(), &state);
        assert_eq!(rig.orbit_state(), OrbitState::Parked);

        // Above: releases back to trailing
        state.velocity.z = 0.2;
        rig.update(&CameraInputs::default(), &state);
        assert_eq!(rig.orbit_state(), OrbitState::Inactive);
    }

    #[test]
    fn test_orbit_elevation_clamped_short_of_poles() {
        let mut rig = rig();
        let state = vehicle();

        let drag_up = CameraInputs {
            grab: true,
            pointer_delta: (0.0, -10_000.0),
            ..CameraInputs::default()
        };
        rig.update(&drag_up, &state);
        assert!((rig.angle_v - (PI / 2.0 - 0.1)).abs() < 1e-9);

        let drag_down = CameraInputs {
            grab: true,
            pointer_delta: (0.0, 10_000.0),
            ..CameraInputs::default()
        };
        rig.update(&drag_down, &state);
        assert!((rig.angle_v - (-PI / 2.0 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_vehicle_keeps_previous_pose() {
        let mut rig = rig();
        let mut state = vehicle();
        rig.update(&CameraInputs::default(), &state);
        let pose = rig.pose();

        state.position.x = f64::NAN;
        rig.update(&CameraInputs::default(), &state);
        assert_eq!(rig.pose(), pose);
    }
}
