use std::sync::Arc;

use catalog::{AnnotationId, CameraPose, ShipId, ShipVariant, StoryCatalog};
use choreography::CameraMotion;
use streaming::Epoch;

use crate::events::{IgnoreReason, SelectionChange, StoryEvent, Transition};

/// Which part of the story is on screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// No annotation selected, camera at the ship's default view.
    Overview,
    Focused(AnnotationId),
}

/// The single session-wide selection.
///
/// `highlighted` is hover feedback only. Both it and `annotation` always
/// refer to annotations placed on `ship`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub ship: ShipId,
    pub annotation: Option<AnnotationId>,
    pub highlighted: Option<AnnotationId>,
}

impl SelectionState {
    pub fn mode(&self) -> SelectionMode {
        match self.annotation {
            Some(id) => SelectionMode::Focused(id),
            None => SelectionMode::Overview,
        }
    }
}

/// The selection state machine.
///
/// Nothing else mutates [`SelectionState`]. Every change is reported as
/// [`StoryEvent`]s, collected until [`SelectionController::drain_events`].
#[derive(Debug, Clone)]
pub struct SelectionController {
    catalog: Arc<StoryCatalog>,
    state: SelectionState,
    /// Annotations placed on the current ship, catalog order.
    steppable: Vec<AnnotationId>,
    overlay_ready: bool,
    epoch: Epoch,
    outbox: Vec<StoryEvent>,
}

impl SelectionController {
    /// Starts in the overview of the first ship.
    pub fn new(catalog: Arc<StoryCatalog>) -> Self {
        let ship = catalog.ships.first();
        let steppable = Self::steppable_for(&catalog, ship);
        Self {
            catalog,
            state: SelectionState {
                ship,
                annotation: None,
                highlighted: None,
            },
            steppable,
            overlay_ready: false,
            epoch: Epoch::default(),
            outbox: Vec::new(),
        }
    }

    fn steppable_for(catalog: &StoryCatalog, ship: ShipId) -> Vec<AnnotationId> {
        catalog
            .ships
            .get(ship)
            .map(|s| catalog.annotations.valid_for(&s.name))
            .unwrap_or_default()
    }

    pub fn catalog(&self) -> &Arc<StoryCatalog> {
        &self.catalog
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn mode(&self) -> SelectionMode {
        self.state.mode()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn steppable(&self) -> &[AnnotationId] {
        &self.steppable
    }

    pub fn current_ship(&self) -> Option<&ShipVariant> {
        self.catalog.ships.get(self.state.ship)
    }

    fn ship_name(&self) -> String {
        self.current_ship().map(|s| s.name.clone()).unwrap_or_default()
    }

    pub fn is_overlay_ready(&self) -> bool {
        self.overlay_ready
    }

    /// Readiness reported by the map collaborator.
    pub fn set_overlay_ready(&mut self, ready: bool) {
        if ready != self.overlay_ready {
            tracing::debug!("map overlays ready: {ready}");
        }
        self.overlay_ready = ready;
    }

    pub fn drain_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn is_steppable(&self, id: AnnotationId) -> bool {
        self.steppable.contains(&id)
    }

    fn ignored(&self, action: &str, reason: IgnoreReason) -> Transition {
        tracing::debug!("{action} ignored: {reason:?}");
        Transition::Ignored(reason)
    }

    /// Camera pose for the current state.
    pub fn target_pose(&self) -> Option<CameraPose> {
        let ship = self.current_ship()?;
        match self.state.annotation {
            Some(id) => self.catalog.annotations.get(id)?.pose_for(&ship.name),
            None => Some(ship.default_view),
        }
    }

    fn request_camera(&mut self, motion: CameraMotion) {
        if let Some(pose) = self.target_pose() {
            self.outbox.push(StoryEvent::CameraRequested { pose, motion });
        }
    }

    fn announce_selection(&mut self) {
        self.epoch = self.epoch.next();
        let focus = self
            .state
            .annotation
            .and_then(|id| Some((id, self.catalog.annotations.get(id)?.clone())));
        let ship = self.ship_name();
        self.outbox.push(StoryEvent::SelectionChanged(SelectionChange {
            ship,
            focus,
            epoch: self.epoch,
        }));
    }

    fn set_highlight(&mut self, next: Option<AnnotationId>) -> Transition {
        let previous = self.state.highlighted;
        if previous == next {
            return Transition::Unchanged;
        }
        self.state.highlighted = next;
        self.outbox.push(StoryEvent::HighlightChanged { previous, current: next });
        Transition::Changed
    }

    /// Pointer hover result. Re-hovering the same hotspot is a no-op.
    pub fn hover(&mut self, picked: Option<AnnotationId>) -> Transition {
        let next = picked.filter(|id| self.is_steppable(*id));
        self.set_highlight(next)
    }

    fn focus(&mut self, id: AnnotationId) -> Transition {
        if self.state.annotation == Some(id) {
            return Transition::Unchanged;
        }
        self.state.annotation = Some(id);
        if let Some(a) = self.catalog.annotations.get(id) {
            tracing::debug!("focus {} on {}", a.name, self.ship_name());
        }
        self.announce_selection();
        self.request_camera(CameraMotion::Smooth);
        Transition::Changed
    }

    /// Click on `picked`. Dropped, not queued, while overlays load.
    pub fn confirm(&mut self, picked: Option<AnnotationId>) -> Transition {
        if !self.overlay_ready {
            return self.ignored("confirm", IgnoreReason::OverlayNotLoaded);
        }
        let Some(id) = picked else {
            return self.ignored("confirm", IgnoreReason::NothingPicked);
        };
        if !self.is_steppable(id) {
            return self.ignored("confirm", IgnoreReason::NotOnShip);
        }
        self.focus(id)
    }

    /// Step through the placed annotations, wrapping at both ends. From the
    /// overview `+1` lands on the first and `-1` on the last.
    pub fn advance(&mut self, delta: i64) -> Transition {
        if !self.overlay_ready {
            return self.ignored("advance", IgnoreReason::OverlayNotLoaded);
        }
        if self.steppable.is_empty() {
            return self.ignored("advance", IgnoreReason::NoAnnotations);
        }
        if delta == 0 {
            return Transition::Unchanged;
        }

        let len = self.steppable.len() as i64;
        let position = self
            .state
            .annotation
            .and_then(|id| self.steppable.iter().position(|s| *s == id));
        let index = match position {
            Some(i) => (i as i64 + delta).rem_euclid(len),
            None if delta > 0 => (delta - 1).rem_euclid(len),
            None => delta.rem_euclid(len),
        };
        self.focus(self.steppable[index as usize])
    }

    /// Follow a cross reference.
    pub fn select_by_name(&mut self, name: &str) -> Transition {
        if !self.overlay_ready {
            return self.ignored("select", IgnoreReason::OverlayNotLoaded);
        }
        let Some(id) = self.catalog.annotations.find(name) else {
            tracing::warn!("no annotation named {name:?}");
            return Transition::Ignored(IgnoreReason::UnknownAnnotation);
        };
        if !self.is_steppable(id) {
            return self.ignored("select", IgnoreReason::NotOnShip);
        }
        self.focus(id)
    }

    /// Back to the overview of the current ship.
    pub fn clear(&mut self) -> Transition {
        if self.state.annotation.is_none() {
            return Transition::Unchanged;
        }
        self.state.annotation = None;
        tracing::debug!("overview of {}", self.ship_name());
        self.announce_selection();
        self.request_camera(CameraMotion::Smooth);
        Transition::Changed
    }

    /// Switch ships, keeping the focused annotation when the new ship has a
    /// placement for it.
    pub fn set_ship(&mut self, ship: ShipId) -> Transition {
        let Some(variant) = self.catalog.ships.get(ship).cloned() else {
            return self.ignored("set ship", IgnoreReason::UnknownShip);
        };
        if ship == self.state.ship {
            return Transition::Unchanged;
        }

        self.set_highlight(None);
        self.state.ship = ship;
        self.steppable = Self::steppable_for(&self.catalog, ship);
        tracing::debug!("ship {} ({} annotations)", variant.name, self.steppable.len());
        self.outbox.push(StoryEvent::ShipChanged { id: ship, ship: variant });

        // A kept annotation flies to its placement on the new hull; anything
        // else cuts to the ship's default view.
        let mut motion = CameraMotion::Jump;
        if let Some(id) = self.state.annotation {
            if self.is_steppable(id) {
                motion = CameraMotion::Smooth;
            } else {
                self.state.annotation = None;
            }
            self.announce_selection();
        } else {
            self.epoch = self.epoch.next();
        }
        self.request_camera(motion);
        Transition::Changed
    }

    pub fn set_ship_by_name(&mut self, name: &str) -> Transition {
        match self.catalog.ships.find(name) {
            Some(id) => self.set_ship(id),
            None => self.ignored("set ship", IgnoreReason::UnknownShip),
        }
    }

    pub fn step_ship(&mut self, delta: i64) -> Transition {
        let next = self.catalog.ships.step(self.state.ship, delta);
        self.set_ship(next)
    }

    /// Back to the start: overview of the first ship.
    pub fn reset(&mut self) -> Transition {
        let first = self.catalog.ships.first();
        let cleared = self.clear();
        let switched = self.set_ship(first);
        self.set_highlight(None);
        if cleared.is_changed() || switched.is_changed() {
            Transition::Changed
        } else {
            self.request_camera(CameraMotion::Jump);
            Transition::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Annotation, Placement};
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn at(x: f64) -> Placement {
        Placement::new(Vec3::new(x, 10.0, 40.0), Vec3::new(x, 5.0, 0.0))
    }

    fn controller() -> SelectionController {
        let ship = |name: &str, z: f64| {
            ShipVariant::new(
                name,
                format!("{name}.glb"),
                CameraPose::new(Vec3::new(0.0, 40.0, z), Vec3::ZERO),
            )
        };
        let catalog = StoryCatalog::new(
            vec![ship("tanker", -150.0), ship("container", -130.0)],
            vec![
                Annotation::new("A").with_placement("container", at(0.0)).with_placement("tanker", at(1.0)),
                Annotation::new("B").with_placement("container", at(10.0)),
                Annotation::new("C").with_placement("container", at(20.0)),
            ],
        )
        .unwrap();
        let mut c = SelectionController::new(Arc::new(catalog));
        c.set_overlay_ready(true);
        c.set_ship_by_name("container");
        c.drain_events();
        c
    }

    fn names(c: &SelectionController) -> Option<String> {
        let id = c.state().annotation?;
        Some(c.catalog().annotations.get(id)?.name.clone())
    }

    #[test]
    fn starts_in_overview_of_first_ship() {
        let catalog = StoryCatalog::builtin().unwrap();
        let c = SelectionController::new(Arc::new(catalog));
        assert_eq!(c.mode(), SelectionMode::Overview);
        assert_eq!(c.current_ship().unwrap().name, "tanker");
        assert!(!c.is_overlay_ready());
    }

    #[test]
    fn advance_from_overview_reaches_both_ends() {
        let mut c = controller();
        c.advance(-1);
        assert_eq!(names(&c).as_deref(), Some("C"));
        c.clear();
        c.advance(1);
        assert_eq!(names(&c).as_deref(), Some("A"));
        c.advance(5);
        assert_eq!(names(&c).as_deref(), Some("C"));
    }

    #[test]
    fn focus_emits_selection_then_camera() {
        let mut c = controller();
        let b = c.catalog().annotations.find("B").unwrap();
        assert_eq!(c.confirm(Some(b)), Transition::Changed);
        let events = c.drain_events();
        assert_eq!(events.len(), 2);
        let StoryEvent::SelectionChanged(change) = &events[0] else {
            panic!("expected a selection change, got {:?}", events[0]);
        };
        assert_eq!(change.ship, "container");
        assert_eq!(change.annotation().unwrap().name, "B");
        assert_eq!(change.epoch, c.epoch());
        assert_eq!(
            events[1],
            StoryEvent::CameraRequested {
                pose: at(10.0).pose().unwrap(),
                motion: CameraMotion::Smooth
            }
        );

        assert_eq!(c.confirm(Some(b)), Transition::Unchanged);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn confirm_needs_a_pick_and_loaded_overlays() {
        let mut c = controller();
        assert_eq!(c.confirm(None), Transition::Ignored(IgnoreReason::NothingPicked));
        c.set_overlay_ready(false);
        assert_eq!(c.advance(1), Transition::Ignored(IgnoreReason::OverlayNotLoaded));
        assert_eq!(c.select_by_name("A"), Transition::Ignored(IgnoreReason::OverlayNotLoaded));
        assert_eq!(c.mode(), SelectionMode::Overview);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn select_by_name_rejects_unknown_and_unplaced() {
        let mut c = controller();
        assert_eq!(c.select_by_name("Echo"), Transition::Ignored(IgnoreReason::UnknownAnnotation));
        c.set_ship_by_name("tanker");
        assert_eq!(c.select_by_name("B"), Transition::Ignored(IgnoreReason::NotOnShip));
        assert_eq!(c.select_by_name("A"), Transition::Changed);
    }

    #[test]
    fn ship_change_keeps_annotation_placed_on_both() {
        let mut c = controller();
        c.select_by_name("A");
        c.drain_events();
        c.set_ship_by_name("tanker");
        assert_eq!(names(&c).as_deref(), Some("A"));
        let events = c.drain_events();
        assert!(matches!(events[0], StoryEvent::ShipChanged { .. }));
        assert_eq!(
            events.last(),
            Some(&StoryEvent::CameraRequested {
                pose: at(1.0).pose().unwrap(),
                motion: CameraMotion::Smooth
            })
        );
    }

    #[test]
    fn ship_change_dropping_the_annotation_cuts_to_default_view() {
        let mut c = controller();
        c.select_by_name("B");
        c.drain_events();
        c.set_ship_by_name("tanker");
        assert_eq!(c.mode(), SelectionMode::Overview);
        let tanker = c.current_ship().unwrap().default_view;
        assert_eq!(
            c.drain_events().last(),
            Some(&StoryEvent::CameraRequested {
                pose: tanker,
                motion: CameraMotion::Jump
            })
        );
    }

    #[test]
    fn hover_only_accepts_placed_annotations_and_is_idempotent() {
        let mut c = controller();
        let b = c.catalog().annotations.find("B").unwrap();
        assert_eq!(c.hover(Some(b)), Transition::Changed);
        assert_eq!(c.hover(Some(b)), Transition::Unchanged);
        assert_eq!(c.drain_events().len(), 1);

        c.set_ship_by_name("tanker");
        assert_eq!(c.state().highlighted, None);
        assert_eq!(c.hover(Some(b)), Transition::Unchanged);
    }

    #[test]
    fn reset_returns_to_first_ship_overview() {
        let mut c = controller();
        c.advance(2);
        assert_eq!(c.reset(), Transition::Changed);
        assert_eq!(c.mode(), SelectionMode::Overview);
        assert_eq!(c.current_ship().unwrap().name, "tanker");
        assert_eq!(c.target_pose(), Some(c.current_ship().unwrap().default_view));
    }
}
