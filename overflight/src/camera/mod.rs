//! Camera rigs: the main follow/FPV camera and the auxiliary ground camera.

mod ground;
mod rig;

pub use ground::{GroundCamera, GroundView};
pub use rig::{CameraInputs, CameraMode, CameraPose, CameraRig, OrbitState};
