use catalog::CameraPose;

use crate::spring::SpringVec3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraMotion {
    /// Snap to the pose this frame.
    Jump,
    /// Spring towards the pose over the next frames.
    Smooth,
}

/// Interactive camera transitions.
///
/// Eye and look-at point each follow their own spring. A new target replaces
/// the old one without resetting velocity, so interrupting a flight never
/// makes the camera teleport.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraChoreographer {
    position: SpringVec3,
    target: SpringVec3,
    /// Snap requested camera heights to the look-at height.
    level: bool,
}

impl CameraChoreographer {
    pub fn new(pose: CameraPose, smooth_time_s: f64, level: bool) -> Self {
        Self {
            position: SpringVec3::new(pose.position, smooth_time_s),
            target: SpringVec3::new(pose.target, smooth_time_s),
            level,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position.get(), self.target.get())
    }

    /// Where the camera is heading.
    pub fn destination(&self) -> CameraPose {
        CameraPose::new(self.position.target(), self.target.target())
    }

    pub fn is_settled(&self) -> bool {
        self.position.is_settled() && self.target.is_settled()
    }

    fn shape(&self, pose: CameraPose) -> CameraPose {
        if self.level { pose.leveled() } else { pose }
    }

    pub fn request(&mut self, pose: CameraPose, motion: CameraMotion) {
        match motion {
            CameraMotion::Jump => self.jump_to(pose),
            CameraMotion::Smooth => self.transition_to(pose),
        }
    }

    pub fn jump_to(&mut self, pose: CameraPose) {
        let pose = self.shape(pose);
        self.position.set_immediate(pose.position);
        self.target.set_immediate(pose.target);
    }

    /// Place the camera exactly at `pose`, skipping leveling. Used by
    /// scripted playback, whose keyframes are already shaped.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.position.set_immediate(pose.position);
        self.target.set_immediate(pose.target);
    }

    pub fn transition_to(&mut self, pose: CameraPose) {
        let pose = self.shape(pose);
        tracing::debug!(
            "camera transition to {:?} looking at {:?}",
            pose.position.to_array(),
            pose.target.to_array()
        );
        self.position.set_target(pose.position);
        self.target.set_target(pose.target);
    }

    /// Stop wherever the camera currently is.
    pub fn cancel(&mut self) {
        self.position.stop();
        self.target.stop();
    }

    pub fn update(&mut self, dt_s: f64) -> CameraPose {
        self.position.tick(dt_s);
        self.target.tick(dt_s);
        self.pose()
    }
}
