use catalog::{Annotation, AnnotationId, CameraPose, ShipId, ShipVariant};
use choreography::CameraMotion;
use streaming::Epoch;

/// Payload of [`StoryEvent::SelectionChanged`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChange {
    pub ship: String,
    /// The focused annotation, `None` in the overview.
    pub focus: Option<(AnnotationId, Annotation)>,
    /// Selection generation this change starts.
    pub epoch: Epoch,
}

impl SelectionChange {
    pub fn annotation(&self) -> Option<&Annotation> {
        self.focus.as_ref().map(|(_, a)| a)
    }

    pub fn annotation_id(&self) -> Option<AnnotationId> {
        self.focus.as_ref().map(|(id, _)| *id)
    }
}

/// Structured notifications for the presentation layer, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoryEvent {
    HighlightChanged {
        previous: Option<AnnotationId>,
        current: Option<AnnotationId>,
    },
    SelectionChanged(SelectionChange),
    ShipChanged {
        id: ShipId,
        ship: ShipVariant,
    },
    CameraRequested {
        pose: CameraPose,
        motion: CameraMotion,
    },
    PlaybackStarted {
        duration_s: f64,
    },
    PlaybackFinished,
    IdleReset,
    DebugStatsToggled(bool),
    /// Blocking modal; the session accepts no further input.
    Blocked {
        message: String,
    },
}

/// Why an action did nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Map overlays are still loading; the user has to try again.
    OverlayNotLoaded,
    NothingPicked,
    UnknownAnnotation,
    /// The annotation has no placement on the current ship.
    NotOnShip,
    /// The current ship has no placed annotations to step through.
    NoAnnotations,
    UnknownShip,
    ScriptPlaying,
    Blocked,
}

/// Outcome of one controller action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_changed(self) -> bool {
        self == Transition::Changed
    }
}
