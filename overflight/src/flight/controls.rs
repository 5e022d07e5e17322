//! Control input surface.
//!
//! Inputs are sampled once per frame into a plain value object; the
//! integrator never talks to an input device directly. Opposite inputs held
//! together are simply additive (they cancel) - there is deliberately no
//! validation layer.

/// Discrete flight control flags for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInputs {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub ascend: bool,
    pub descend: bool,
}

impl ControlInputs {
    /// No inputs held.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Forward thrust only; the most common scripted input.
    pub fn forward_only() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }

    /// True when any flag is held.
    pub fn any(&self) -> bool {
        self.forward
            || self.back
            || self.strafe_left
            || self.strafe_right
            || self.yaw_left
            || self.yaw_right
            || self.ascend
            || self.descend
    }
}
