//! Inactivity timeout.

/// Counts seconds since the last user input and fires once when the timeout
/// elapses. Firing re-arms the timer, so a kiosk left alone resets every
/// `timeout_s` rather than every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleTimer {
    timeout_s: f64,
    idle_s: f64,
}

impl IdleTimer {
    pub fn new(timeout_s: f64) -> Self {
        Self {
            timeout_s,
            idle_s: 0.0,
        }
    }

    pub fn timeout_s(&self) -> f64 {
        self.timeout_s
    }

    pub fn idle_s(&self) -> f64 {
        self.idle_s
    }

    /// Register user activity.
    pub fn touch(&mut self) {
        self.idle_s = 0.0;
    }

    /// Advance by `dt_s`; returns `true` exactly when the timeout elapses.
    ///
    /// A non-positive timeout disables the timer.
    pub fn advance(&mut self, dt_s: f64) -> bool {
        if !(self.timeout_s > 0.0) || !(dt_s > 0.0) || !dt_s.is_finite() {
            return false;
        }
        self.idle_s += dt_s;
        if self.idle_s >= self.timeout_s {
            tracing::info!("idle for {:.0}s, resetting", self.idle_s);
            self.idle_s = 0.0;
            return true;
        }
        false
    }
}
