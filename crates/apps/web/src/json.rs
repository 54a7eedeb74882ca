//! JSON shapes handed to the page.

use scene::{Emphasis, HotspotScreen};
use serde_json::{Value, json};
use story::{FrameView, IgnoreReason, StoryEvent, Transition};

fn emphasis_name(emphasis: Emphasis) -> &'static str {
    match emphasis {
        Emphasis::Default => "default",
        Emphasis::Highlighted => "highlighted",
        Emphasis::Selected => "selected",
        Emphasis::Occluded => "occluded",
    }
}

fn hotspot_json(h: &HotspotScreen) -> Value {
    json!({
        "annotation": h.annotation.0,
        "screen_px": h.screen_px.map(|p| [p.x, p.y]),
        "emphasis": emphasis_name(h.emphasis),
    })
}

pub fn frame_json(frame: &FrameView<'_>) -> Value {
    json!({
        "position": frame.pose.position.to_array(),
        "target": frame.pose.target.to_array(),
        "orientation": frame.orientation.to_array(),
        "hotspots": frame.hotspots.iter().map(hotspot_json).collect::<Vec<_>>(),
        "label": frame.label.map(|l| json!({
            "text": l.text,
            "left_px": l.top_left_px.x,
            "top_px": l.top_left_px.y,
            "flipped_x": l.flipped_x,
            "flipped_y": l.flipped_y,
        })),
    })
}

fn ignore_reason_name(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::OverlayNotLoaded => "overlay_not_loaded",
        IgnoreReason::NothingPicked => "nothing_picked",
        IgnoreReason::UnknownAnnotation => "unknown_annotation",
        IgnoreReason::NotOnShip => "not_on_ship",
        IgnoreReason::NoAnnotations => "no_annotations",
        IgnoreReason::UnknownShip => "unknown_ship",
        IgnoreReason::ScriptPlaying => "script_playing",
        IgnoreReason::Blocked => "blocked",
    }
}

/// `"changed"`, `"unchanged"` or `"ignored:<reason>"`.
pub fn transition_name(transition: Transition) -> String {
    match transition {
        Transition::Changed => "changed".to_string(),
        Transition::Unchanged => "unchanged".to_string(),
        Transition::Ignored(reason) => format!("ignored:{}", ignore_reason_name(reason)),
    }
}

pub fn event_json(event: &StoryEvent) -> Value {
    match event {
        StoryEvent::HighlightChanged { previous, current } => json!({
            "type": "highlight_changed",
            "previous": previous.map(|id| id.0),
            "current": current.map(|id| id.0),
        }),
        // The info panel renders straight from the annotation.
        StoryEvent::SelectionChanged(change) => json!({
            "type": "selection_changed",
            "ship": change.ship,
            "annotation": change.annotation(),
        }),
        StoryEvent::ShipChanged { ship, .. } => json!({
            "type": "ship_changed",
            "ship": ship.name,
        }),
        StoryEvent::CameraRequested { pose, motion } => json!({
            "type": "camera_requested",
            "pose": pose,
            "motion": format!("{motion:?}").to_lowercase(),
        }),
        StoryEvent::PlaybackStarted { duration_s } => json!({
            "type": "playback_started",
            "duration_s": duration_s,
        }),
        StoryEvent::PlaybackFinished => json!({ "type": "playback_finished" }),
        StoryEvent::IdleReset => json!({ "type": "idle_reset" }),
        StoryEvent::DebugStatsToggled(on) => json!({ "type": "debug_stats", "visible": on }),
        StoryEvent::Blocked { message } => json!({ "type": "blocked", "message": message }),
    }
}
