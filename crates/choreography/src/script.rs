//! Scripted fly-through sequences.

use catalog::{CameraPose, StoryCatalog};
use foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::track::{CameraKeyframe, KeyframeTrack, ShipCue};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error("script has no steps")]
    Empty,
    #[error("step {step}: unknown ship {ship:?}")]
    UnknownShip { step: usize, ship: String },
    #[error("step {step}: unknown annotation {annotation:?}")]
    UnknownAnnotation { step: usize, annotation: String },
    #[error("step {step}: annotation {annotation:?} has no camera placement on {ship:?}")]
    NoPlacement {
        step: usize,
        annotation: String,
        ship: String,
    },
    #[error("step {step}: {what} duration must be positive and finite, got {value}")]
    InvalidDuration {
        step: usize,
        what: &'static str,
        value: f64,
    },
    #[error("step {step}: timestamp {time_s} does not advance past the previous keyframe")]
    NonIncreasingTime { step: usize, time_s: f64 },
    #[error("drift distance and lift are both zero; hold keyframes would repeat the arrival pose")]
    NoDrift,
    #[error("script parse error: {0}")]
    Parse(String),
}

/// One stop of a fly-through: a ship's default view, or an annotation on a
/// ship, held for `hold_s` after a `transition_s` flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub ship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(rename = "hold")]
    pub hold_s: f64,
    /// Falls back to [`ScriptConfig::default_transition_s`].
    #[serde(rename = "transition", default, skip_serializing_if = "Option::is_none")]
    pub transition_s: Option<f64>,
}

impl ScriptStep {
    pub fn ship_default(ship: impl Into<String>, hold_s: f64) -> Self {
        Self {
            ship: ship.into(),
            annotation: None,
            hold_s,
            transition_s: None,
        }
    }

    pub fn annotation(annotation: impl Into<String>, ship: impl Into<String>, hold_s: f64) -> Self {
        Self {
            ship: ship.into(),
            annotation: Some(annotation.into()),
            hold_s,
            transition_s: None,
        }
    }

    pub fn with_transition(mut self, transition_s: f64) -> Self {
        self.transition_s = Some(transition_s);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(json).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    /// The dome export tour around the container ship.
    pub fn default_tour() -> Self {
        Self::new(vec![
            ScriptStep::ship_default("container", 2.0),
            ScriptStep::annotation("Propulsion momentum", "container", 10.0),
            ScriptStep::annotation("Anchorage", "container", 10.0),
            ScriptStep::annotation("Ballast water", "container", 10.0),
            ScriptStep::ship_default("container", 0.1).with_transition(5.0),
            ScriptStep::annotation("Propeller shaft lubricants", "container", 10.0).with_transition(10.0),
            ScriptStep::annotation("Underwater radiated noise", "container", 5.0).with_transition(2.0),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub default_transition_s: f64,
    /// How far the hold keyframe backs away from the target.
    pub drift_distance: f64,
    /// How far the hold keyframe rises.
    pub drift_lift: f64,
    /// Snap camera height to the look-at height.
    pub level: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            default_transition_s: 2.0,
            drift_distance: 2.0,
            drift_lift: 0.1,
            level: true,
        }
    }
}

fn check_duration(step: usize, what: &'static str, value: f64) -> Result<f64, ScriptError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ScriptError::InvalidDuration { step, what, value })
    }
}

/// `from + by`, which must stay finite and land strictly after `from`.
/// Huge running totals can swallow a small duration or overflow.
fn advance_time(step: usize, from: f64, by: f64) -> Result<f64, ScriptError> {
    let time_s = from + by;
    if time_s.is_finite() && time_s > from {
        Ok(time_s)
    } else {
        Err(ScriptError::NonIncreasingTime { step, time_s })
    }
}

fn resolve_pose(catalog: &StoryCatalog, step_index: usize, step: &ScriptStep) -> Result<CameraPose, ScriptError> {
    let ship = catalog
        .ships
        .by_name(&step.ship)
        .map_err(|_| ScriptError::UnknownShip {
            step: step_index,
            ship: step.ship.clone(),
        })?;

    let Some(name) = &step.annotation else {
        return Ok(ship.default_view);
    };

    let annotation = catalog
        .annotations
        .by_name(name)
        .map_err(|_| ScriptError::UnknownAnnotation {
            step: step_index,
            annotation: name.clone(),
        })?;

    annotation.pose_for(&ship.name).ok_or_else(|| ScriptError::NoPlacement {
        step: step_index,
        annotation: name.clone(),
        ship: ship.name.clone(),
    })
}

/// Build the keyframe track for `script`.
///
/// Every step yields two keyframes: the arrival pose once the transition
/// window has elapsed, and a slightly drifted pose at the end of the hold.
/// The drift exists because keyframe interpolators reject two identical
/// consecutive values. Every step is resolved up front, so a bad reference
/// fails here and never during playback.
pub fn build_track(catalog: &StoryCatalog, script: &Script, config: &ScriptConfig) -> Result<KeyframeTrack, ScriptError> {
    if script.steps.is_empty() {
        return Err(ScriptError::Empty);
    }
    if config.drift_distance == 0.0 && config.drift_lift == 0.0 {
        return Err(ScriptError::NoDrift);
    }

    let lift = Vec3::new(0.0, config.drift_lift, 0.0);
    let mut keyframes = Vec::with_capacity(script.steps.len() * 2);
    let mut cues: Vec<ShipCue> = Vec::new();
    let mut time_s = 0.0;

    for (i, step) in script.steps.iter().enumerate() {
        let transition = check_duration(i, "transition", step.transition_s.unwrap_or(config.default_transition_s))?;
        let hold = check_duration(i, "hold", step.hold_s)?;

        let mut pose = resolve_pose(catalog, i, step)?;
        if config.level {
            pose = pose.leveled();
        }

        let away = (pose.position - pose.target).normalize_or_zero();
        let drifted = CameraPose::new(pose.position + away * config.drift_distance + lift, pose.target);

        if cues.last().is_none_or(|c| c.ship != step.ship) {
            cues.push(ShipCue {
                start_s: time_s,
                ship: step.ship.clone(),
            });
        }

        let arrive_s = advance_time(i, time_s, transition)?;
        keyframes.push(CameraKeyframe::new(arrive_s, pose));
        time_s = advance_time(i, arrive_s, hold)?;
        keyframes.push(CameraKeyframe::new(time_s, drifted));
    }

    tracing::info!("camera track: {} keyframes, {:.1}s total", keyframes.len(), time_s);

    let track = KeyframeTrack::new(keyframes).ok_or(ScriptError::NonIncreasingTime {
        step: script.steps.len() - 1,
        time_s,
    })?;
    Ok(track.with_ship_cues(cues))
}
