/// Seconds on the session clock.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn advanced(self, dt_s: f64) -> Self {
        Time(self.0 + dt_s)
    }
}
