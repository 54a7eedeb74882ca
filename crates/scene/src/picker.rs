use catalog::{AnnotationId, StoryCatalog};
use foundation::math::Vec2;

use crate::camera::Camera;
use crate::picking::{Hotspot, Occluder, PickHit, is_occluded, pick_nearest};

/// Visual state of a hotspot marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Emphasis {
    Default,
    Highlighted,
    Selected,
    /// Behind the hull: dimmed and not pickable.
    Occluded,
}

/// Where a hotspot marker ends up on screen this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HotspotScreen {
    pub annotation: AnnotationId,
    /// `None` when the hotspot is behind the camera.
    pub screen_px: Option<Vec2>,
    pub emphasis: Emphasis,
}

/// Maps pointer positions to hotspots of the currently loaded ship.
///
/// The pick set is rebuilt whenever the ship changes, and holds only
/// annotations with a complete placement for that ship. The picker itself
/// keeps no highlight state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportPicker {
    ship: String,
    hotspots: Vec<Hotspot>,
    radius: f64,
}

impl ViewportPicker {
    pub fn new(catalog: &StoryCatalog, ship: &str, radius: f64) -> Self {
        let hotspots = catalog
            .annotations
            .valid_for(ship)
            .into_iter()
            .filter_map(|id| {
                let placement = catalog.annotations.get(id)?.valid_placement(ship)?;
                Some(Hotspot {
                    annotation: id,
                    position: placement.label_position?,
                })
            })
            .collect::<Vec<_>>();
        tracing::debug!("pick set for {ship}: {} hotspots", hotspots.len());
        Self {
            ship: ship.to_string(),
            hotspots,
            radius,
        }
    }

    pub fn ship(&self) -> &str {
        &self.ship
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn hotspot(&self, id: AnnotationId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.annotation == id)
    }

    /// Nearest visible hotspot under the pointer.
    pub fn pick(&self, camera: &Camera, pointer_px: Vec2, occluder: &dyn Occluder) -> Option<PickHit> {
        let ray = camera.ray_through(pointer_px)?;
        let eye = camera.pose.position;
        let visible = self
            .hotspots
            .iter()
            .filter(|h| !is_occluded(occluder, eye, h.position));
        pick_nearest(visible, &ray, self.radius)
    }

    /// Screen placement and emphasis of every hotspot, in catalog order.
    pub fn project_hotspots(
        &self,
        camera: &Camera,
        highlighted: Option<AnnotationId>,
        selected: Option<AnnotationId>,
        occluder: &dyn Occluder,
    ) -> Vec<HotspotScreen> {
        let eye = camera.pose.position;
        self.hotspots
            .iter()
            .map(|h| {
                let emphasis = if is_occluded(occluder, eye, h.position) {
                    Emphasis::Occluded
                } else if selected == Some(h.annotation) {
                    Emphasis::Selected
                } else if highlighted == Some(h.annotation) {
                    Emphasis::Highlighted
                } else {
                    Emphasis::Default
                };
                HotspotScreen {
                    annotation: h.annotation,
                    screen_px: camera.project(h.position),
                    emphasis,
                }
            })
            .collect()
    }
}
