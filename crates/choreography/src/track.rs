use catalog::CameraPose;
use foundation::math::Quat;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraKeyframe {
    pub time_s: f64,
    pub pose: CameraPose,
    pub orientation: Quat,
}

impl CameraKeyframe {
    pub fn new(time_s: f64, pose: CameraPose) -> Self {
        Self {
            time_s,
            pose,
            orientation: pose.orientation(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackSample {
    pub pose: CameraPose,
    pub orientation: Quat,
}

/// Flat arrays in the layout keyframe animation backends consume:
/// `positions` are xyz triplets, `orientations` xyzw quads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatTrack {
    pub times: Vec<f64>,
    pub positions: Vec<f64>,
    pub orientations: Vec<f64>,
    pub duration_s: f64,
}

/// From `start_s` on, the track films `ship`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipCue {
    pub start_s: f64,
    pub ship: String,
}

/// Camera keyframes with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack {
    keyframes: Vec<CameraKeyframe>,
    ship_cues: Vec<ShipCue>,
}

impl KeyframeTrack {
    /// Returns `None` unless timestamps are finite and strictly increasing.
    pub fn new(keyframes: Vec<CameraKeyframe>) -> Option<Self> {
        let finite = keyframes.iter().all(|k| k.time_s.is_finite());
        let increasing = keyframes.windows(2).all(|w| w[0].time_s < w[1].time_s);
        (finite && increasing).then_some(Self {
            keyframes,
            ship_cues: Vec::new(),
        })
    }

    /// Attach ship cues, ordered by start time.
    pub fn with_ship_cues(mut self, mut cues: Vec<ShipCue>) -> Self {
        cues.sort_by(|a, b| a.start_s.total_cmp(&b.start_s));
        self.ship_cues = cues;
        self
    }

    pub fn ship_cues(&self) -> &[ShipCue] {
        &self.ship_cues
    }

    /// Ship on screen at `time_s`: the latest cue that has started.
    pub fn ship_at(&self, time_s: f64) -> Option<&str> {
        let i = self.ship_cues.partition_point(|c| c.start_s <= time_s);
        let cue = self.ship_cues.get(i.checked_sub(1)?)?;
        Some(cue.ship.as_str())
    }

    pub fn keyframes(&self) -> &[CameraKeyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.keyframes.iter().map(|k| k.time_s).collect()
    }

    pub fn duration_s(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time_s)
    }

    pub fn flatten(&self) -> FlatTrack {
        let mut flat = FlatTrack {
            times: Vec::with_capacity(self.keyframes.len()),
            positions: Vec::with_capacity(self.keyframes.len() * 3),
            orientations: Vec::with_capacity(self.keyframes.len() * 4),
            duration_s: self.duration_s(),
        };
        for k in &self.keyframes {
            flat.times.push(k.time_s);
            flat.positions.extend(k.pose.position.to_array());
            flat.orientations.extend(k.orientation.to_array());
        }
        flat
    }

    /// Interpolated camera at `time_s`, clamped to the first and last key.
    pub fn sample(&self, time_s: f64) -> Option<TrackSample> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if !(time_s > first.time_s) {
            return Some(TrackSample {
                pose: first.pose,
                orientation: first.orientation,
            });
        }
        if time_s >= last.time_s {
            return Some(TrackSample {
                pose: last.pose,
                orientation: last.orientation,
            });
        }

        let i = self.keyframes.partition_point(|k| k.time_s <= time_s);
        let (a, b) = (&self.keyframes[i - 1], &self.keyframes[i]);
        let t = (time_s - a.time_s) / (b.time_s - a.time_s);
        Some(TrackSample {
            pose: a.pose.lerp(b.pose, t),
            orientation: a.orientation.slerp(b.orientation, t).normalize(),
        })
    }
}

/// Plays a track against an external clock.
///
/// Before the first keyframe the camera flies from `start` (the pose it had
/// when playback began) to the first arrival pose.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPlayer {
    track: KeyframeTrack,
    start: Option<TrackSample>,
    time_s: f64,
}

impl TrackPlayer {
    pub fn new(track: KeyframeTrack, start: Option<CameraPose>) -> Self {
        Self {
            track,
            start: start.map(|pose| TrackSample {
                pose,
                orientation: pose.orientation(),
            }),
            time_s: 0.0,
        }
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    pub fn is_finished(&self) -> bool {
        self.time_s >= self.track.duration_s()
    }

    pub fn current(&self) -> Option<TrackSample> {
        let first = self.track.keyframes().first()?;
        match self.start {
            Some(start) if self.time_s < first.time_s && first.time_s > 0.0 => {
                let t = (self.time_s / first.time_s).clamp(0.0, 1.0);
                Some(TrackSample {
                    pose: start.pose.lerp(first.pose, t),
                    orientation: start.orientation.slerp(first.orientation, t).normalize(),
                })
            }
            _ => self.track.sample(self.time_s),
        }
    }

    pub fn advance(&mut self, dt_s: f64) -> Option<TrackSample> {
        if dt_s.is_finite() && dt_s > 0.0 {
            self.time_s = (self.time_s + dt_s).min(self.track.duration_s());
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::Vec3;

    fn key(t: f64, x: f64) -> CameraKeyframe {
        CameraKeyframe::new(t, CameraPose::new(Vec3::new(x, 0.0, 10.0), Vec3::new(x, 0.0, 0.0)))
    }

    fn track() -> KeyframeTrack {
        KeyframeTrack::new(vec![key(2.0, 0.0), key(4.0, 10.0), key(9.0, 20.0)]).unwrap()
    }

    #[test]
    fn rejects_non_increasing_times() {
        assert!(KeyframeTrack::new(vec![key(1.0, 0.0), key(1.0, 1.0)]).is_none());
        assert!(KeyframeTrack::new(vec![key(f64::NAN, 0.0)]).is_none());
    }

    #[test]
    fn ship_at_follows_the_latest_started_cue() {
        let cue = |start_s: f64, ship: &str| ShipCue {
            start_s,
            ship: ship.to_string(),
        };
        let t = track().with_ship_cues(vec![cue(3.0, "container"), cue(0.0, "tanker")]);
        assert_eq!(t.ship_at(-1.0), None);
        assert_eq!(t.ship_at(0.0), Some("tanker"));
        assert_eq!(t.ship_at(2.9), Some("tanker"));
        assert_eq!(t.ship_at(3.0), Some("container"));
        assert_eq!(t.ship_at(100.0), Some("container"));
        assert_eq!(track().ship_at(1.0), None);
    }

    #[test]
    fn sample_interpolates_and_clamps() {
        let t = track();
        assert_eq!(t.sample(0.0).unwrap().pose.position.x, 0.0);
        assert_eq!(t.sample(3.0).unwrap().pose.position.x, 5.0);
        assert_eq!(t.sample(6.5).unwrap().pose.position.x, 15.0);
        assert_eq!(t.sample(100.0).unwrap().pose.position.x, 20.0);
        assert!(KeyframeTrack::default().sample(1.0).is_none());
    }

    #[test]
    fn flatten_layout() {
        let flat = track().flatten();
        assert_eq!(flat.times, vec![2.0, 4.0, 9.0]);
        assert_eq!(flat.positions.len(), 9);
        assert_eq!(flat.orientations.len(), 12);
        assert_eq!(&flat.positions[3..6], &[10.0, 0.0, 10.0]);
        assert_eq!(flat.duration_s, 9.0);
    }

    #[test]
    fn player_flies_in_from_start_pose_then_finishes() {
        let start = CameraPose::new(Vec3::new(-10.0, 0.0, 10.0), Vec3::new(-10.0, 0.0, 0.0));
        let mut p = TrackPlayer::new(track(), Some(start));
        assert_eq!(p.current().unwrap().pose.position.x, -10.0);
        assert_eq!(p.advance(1.0).unwrap().pose.position.x, -5.0);
        assert!(!p.is_finished());
        let end = p.advance(50.0).unwrap();
        assert_eq!(end.pose.position.x, 20.0);
        assert!(p.is_finished());
        assert_eq!(p.time_s(), 9.0);
    }
}
