use foundation::math::{Vec2, Vec3};
use scene::{Camera, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size_px: f64,
    pub padding_px: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 14.0,
            padding_px: 6.0,
        }
    }
}

pub trait LabelProjector {
    fn project(&self, world: Vec3) -> Option<Vec2>;
    fn viewport(&self) -> Viewport;
}

impl LabelProjector for Camera {
    fn project(&self, world: Vec3) -> Option<Vec2> {
        Camera::project(self, world)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Tooltip placement relative to the anchor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPlacementConfig {
    /// Offset from the anchor to the label's nearest corner. Positive x is
    /// right, negative y is up.
    pub offset_px: [f64; 2],
    /// Minimum distance kept from the canvas edges.
    pub margin_px: f64,
}

impl Default for LabelPlacementConfig {
    fn default() -> Self {
        Self {
            offset_px: [12.0, -12.0],
            margin_px: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    /// Projected hotspot position.
    pub anchor_px: Vec2,
    pub top_left_px: Vec2,
    pub size_px: Vec2,
    /// Label was moved to the left of the anchor.
    pub flipped_x: bool,
    /// Label was moved below the anchor.
    pub flipped_y: bool,
}

/// Place a label of `size_px` next to `anchor_px`.
///
/// The preferred side is given by the offset signs (right and above by
/// default). An axis flips to the other side of the anchor when the label
/// would overflow the canvas there, and the result is finally clamped into
/// the canvas so oversized labels stay at least partially visible.
pub fn place_label(
    text: &str,
    anchor_px: Vec2,
    size_px: Vec2,
    viewport: Viewport,
    config: LabelPlacementConfig,
) -> PlacedLabel {
    let m = config.margin_px;
    let [dx, dy] = config.offset_px;

    let (x, flipped_x) = place_axis(anchor_px.x, dx, size_px.x, viewport.width_px, m);
    let (y, flipped_y) = place_axis(anchor_px.y, dy, size_px.y, viewport.height_px, m);

    PlacedLabel {
        text: text.to_string(),
        anchor_px,
        top_left_px: Vec2::new(x, y),
        size_px,
        flipped_x,
        flipped_y,
    }
}

/// Returns the label's start coordinate on one axis and whether it flipped.
fn place_axis(anchor: f64, offset: f64, size: f64, extent: f64, margin: f64) -> (f64, bool) {
    let after = anchor + offset.abs();
    let before = anchor - offset.abs() - size;
    let fits_after = after + size <= extent - margin;
    let fits_before = before >= margin;

    let (start, flipped) = if offset >= 0.0 {
        if fits_after || !fits_before { (after, false) } else { (before, true) }
    } else if fits_before || !fits_after {
        (before, false)
    } else {
        (after, true)
    };

    let max = (extent - margin - size).max(margin);
    (start.clamp(margin, max), flipped)
}

pub fn estimate_text_size(text: &str, style: &LabelStyle) -> Vec2 {
    let count = text.chars().count().max(1) as f64;
    Vec2::new(
        style.font_size_px * 0.6 * count + 2.0 * style.padding_px,
        style.font_size_px + 2.0 * style.padding_px,
    )
}

/// Pointer-following label for the highlighted hotspot, or `None` when the
/// hotspot does not project (behind the camera).
pub fn place_hotspot_label<P: LabelProjector>(
    projector: &P,
    world: Vec3,
    text: &str,
    style: &LabelStyle,
    config: LabelPlacementConfig,
) -> Option<PlacedLabel> {
    let anchor = projector.project(world)?;
    if !anchor.is_finite() {
        return None;
    }
    let size = estimate_text_size(text, style);
    Some(place_label(text, anchor, size, projector.viewport(), config))
}
