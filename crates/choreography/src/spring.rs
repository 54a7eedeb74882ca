use foundation::math::Vec3;

/// Critically damped spring on a `Vec3`.
///
/// Driven by elapsed seconds, so the motion takes the same wall time at any
/// frame rate. Moving the target keeps the current velocity, so retargeting
/// mid-flight bends the path instead of restarting it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpringVec3 {
    value: Vec3,
    velocity: Vec3,
    target: Vec3,
    /// Approximate time to reach the target (seconds).
    smooth_time_s: f64,
}

/// Below this distance and speed the spring snaps to its target.
const SETTLE_EPS: f64 = 1e-4;

impl SpringVec3 {
    pub fn new(value: Vec3, smooth_time_s: f64) -> Self {
        Self {
            value,
            velocity: Vec3::ZERO,
            target: value,
            smooth_time_s: smooth_time_s.max(1e-4),
        }
    }

    pub fn get(&self) -> Vec3 {
        self.value
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Jump to `value` and stop.
    pub fn set_immediate(&mut self, value: Vec3) {
        self.value = value;
        self.target = value;
        self.velocity = Vec3::ZERO;
    }

    /// Freeze at the current value.
    pub fn stop(&mut self) {
        self.set_immediate(self.value);
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == Vec3::ZERO
    }

    pub fn tick(&mut self, dt_s: f64) {
        if !(dt_s > 0.0) || !dt_s.is_finite() || self.is_settled() {
            return;
        }

        // Closed-form critically damped step with a rational approximation of
        // exp(-omega * dt); stable for arbitrarily large dt.
        let omega = 2.0 / self.smooth_time_s;
        let x = omega * dt_s;
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let change = self.value - self.target;
        let temp = (self.velocity + change * omega) * dt_s;
        self.velocity = (self.velocity - temp * omega) * decay;
        self.value = self.target + (change + temp) * decay;

        // Never pass the target.
        if change.dot(self.value - self.target) < 0.0 {
            self.set_immediate(self.target);
            return;
        }

        if (self.value - self.target).length() < SETTLE_EPS && self.velocity.length() < SETTLE_EPS {
            self.set_immediate(self.target);
        }
    }
}
