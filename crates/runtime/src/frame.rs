use foundation::time::Time;

/// Frame metadata for the per-frame update tick.
///
/// The browser animation loop hands us a variable delta; everything that
/// animates is driven by `dt_s`, never by the frame count.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time of this frame (seconds).
    pub dt_s: f64,
    /// Session time at the end of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// A frame in a fixed-step sequence (tests and offline export).
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// The frame following this one, `dt_s` seconds later.
    ///
    /// Negative or non-finite deltas (clock hiccups, tab restore) are treated
    /// as zero so time never runs backwards.
    pub fn advanced(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() && dt_s > 0.0 { dt_s } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.advanced(dt_s),
        }
    }

    pub fn next(self) -> Self {
        self.advanced(self.dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn advanced_accumulates_variable_deltas() {
        let f = Frame::new(0, 0.0).advanced(0.25).advanced(0.5);
        assert_eq!(f.index, 2);
        assert_eq!(f.time, Time(0.75));
        assert_eq!(f.dt_s, 0.5);
    }

    #[test]
    fn bad_deltas_do_not_rewind_time() {
        let f = Frame::new(0, 0.0).advanced(1.0);
        let g = f.advanced(-3.0).advanced(f64::NAN);
        assert_eq!(g.time, f.time);
        assert_eq!(g.index, 3);
    }
}
