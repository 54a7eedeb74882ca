#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use catalog::{Annotation, CameraPose, Placement, ShipVariant, StoryCatalog};
use foundation::math::{Vec2, Vec3};
use layers::PlacedLabel;
use scene::{Camera, HotspotScreen, Ray, Viewport};
use serde_json::Value;
use story::{
    AssetHandle, AssetLoader, Capabilities, ChartView, FrameView, InputEvent, MapView, Renderer, SceneHost,
    StoryConfig, StoryEvent, StorySession,
};
use streaming::LoadRequest;

pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub pose: CameraPose,
    pub hotspots: Vec<HotspotScreen>,
    pub label: Option<PlacedLabel>,
}

/// Host that records every call and keeps just enough state to check
/// invariants after the fact.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub fully_loaded: bool,
    pub visible_overlays: BTreeSet<String>,
    pub max_visible_overlays: usize,
    pub panel_visible: bool,
    pub chart: Option<Value>,
    pub shown_ships: Vec<String>,
    pub attached: Vec<String>,
    pub model: Option<String>,
    pub outlet: Option<Vec3>,
    pub water_hidden: bool,
    pub loads: Vec<LoadRequest>,
    pub frames: Vec<RenderedFrame>,
    /// Distance at which every hull ray test hits, `None` for no hull.
    pub hull_distance: Option<f64>,
}

impl MapView for RecordingHost {
    fn is_fully_loaded(&self) -> bool {
        self.fully_loaded
    }

    fn show_overlay(&mut self, key: &str) {
        self.visible_overlays.insert(key.to_string());
        self.max_visible_overlays = self.max_visible_overlays.max(self.visible_overlays.len());
    }

    fn hide_overlay(&mut self, key: &str) {
        self.visible_overlays.remove(key);
    }

    fn set_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }
}

impl ChartView for RecordingHost {
    fn render(&mut self, spec: &Value) {
        self.chart = Some(spec.clone());
    }

    fn hide(&mut self) {
        self.chart = None;
    }
}

impl SceneHost for RecordingHost {
    fn show_ship(&mut self, ship: &ShipVariant, _asset: AssetHandle) {
        self.shown_ships.push(ship.name.clone());
    }

    fn attach_model(&mut self, path: &str, _asset: AssetHandle, _anchor: Vec3) {
        self.attached.push(path.to_string());
        self.model = Some(path.to_string());
    }

    fn detach_model(&mut self) {
        self.model = None;
    }

    fn set_outlet_marker(&mut self, position: Option<Vec3>) {
        self.outlet = position;
    }

    fn set_water_visible(&mut self, visible: bool) {
        self.water_hidden = !visible;
    }

    fn occlusion_distance(&self, _ray: &Ray) -> Option<f64> {
        self.hull_distance
    }
}

impl AssetLoader for RecordingHost {
    fn load(&mut self, request: &LoadRequest) {
        self.loads.push(request.clone());
    }
}

impl Renderer for RecordingHost {
    fn render_frame(&mut self, frame: &FrameView<'_>) {
        self.frames.push(RenderedFrame {
            pose: frame.pose,
            hotspots: frame.hotspots.to_vec(),
            label: frame.label.cloned(),
        });
    }

    fn resize(&mut self, _width_px: f64, _height_px: f64) {}
}

fn placed(x: f64) -> Placement {
    Placement::new(Vec3::new(x, 0.0, 20.0), Vec3::new(x, 0.0, 0.0))
}

/// Two ships. On the container, `Anchorage`, `Propulsion momentum` and
/// `Antifouling` are placed (in that order); `Echo` exists without a camera
/// framing. Hotspots sit on the x axis, the default views look down -z.
pub fn fixture() -> StoryCatalog {
    let view = |z: f64| CameraPose::new(Vec3::new(0.0, 0.0, z), Vec3::ZERO);
    StoryCatalog::new(
        vec![
            ShipVariant::new("tanker", "resources/tanker.glb", view(120.0)),
            ShipVariant::new("container", "resources/cargoship.glb", view(100.0)),
        ],
        vec![
            Annotation::new("Anchorage")
                .with_placement("container", placed(0.0))
                .with_placement("tanker", placed(5.0)),
            Annotation::new("Propulsion momentum").with_placement("container", placed(30.0)),
            Annotation::new("Echo").with_placement("container", Placement::default()),
            Annotation::new("Antifouling")
                .with_placement("container", placed(-30.0).with_outlet(Vec3::new(-30.0, -5.0, 0.0)))
                .with_data_layer("AFP_CuO"),
            Annotation::new("Scrubber water")
                .with_placement("tanker", placed(-10.0))
                .with_data_layer("SCRUB_W_CLOSED"),
        ],
    )
    .unwrap()
}

pub fn session_with(catalog: StoryCatalog, config: StoryConfig) -> StorySession<RecordingHost> {
    let host = RecordingHost {
        fully_loaded: true,
        ..RecordingHost::default()
    };
    let mut session = StorySession::new(Arc::new(catalog), config, host);
    session.start(Capabilities::all()).unwrap();
    session.handle_input(InputEvent::Resize {
        width_px: WIDTH,
        height_px: HEIGHT,
    });
    session.on_overlays_loaded(["AFP_CuO", "SCRUB_W_CLOSED", "STERN_TUBE"]);
    session
}

/// Fixture session on the container ship, overview, events drained.
pub fn container_session() -> StorySession<RecordingHost> {
    let mut session = session_with(fixture(), StoryConfig::default());
    session.handle_input(InputEvent::SelectShip("container".into()));
    session.drain_events();
    session
}

pub fn focused_name(session: &StorySession<RecordingHost>) -> Option<String> {
    let id = session.controller().state().annotation?;
    Some(session.catalog().annotations.get(id)?.name.clone())
}

/// Where `annotation`'s hotspot appears with the session's current camera.
pub fn hotspot_px(session: &StorySession<RecordingHost>, annotation: &str) -> Vec2 {
    let config = StoryConfig::default().camera;
    let camera = Camera::new(
        session.camera_pose(),
        config.fov_y_deg,
        config.near,
        config.far,
        Viewport::new(WIDTH, HEIGHT),
    );
    let ship = &session.controller().current_ship().unwrap().name;
    let label = session
        .catalog()
        .annotations
        .by_name(annotation)
        .unwrap()
        .valid_placement(ship)
        .unwrap()
        .label_position
        .unwrap();
    camera.project(label).unwrap()
}

pub fn selection_changes(events: &[StoryEvent]) -> Vec<Option<String>> {
    events
        .iter()
        .filter_map(|e| match e {
            StoryEvent::SelectionChanged(change) => Some(change.annotation().map(|a| a.name.clone())),
            _ => None,
        })
        .collect()
}

pub fn drain(session: &mut StorySession<RecordingHost>) -> Vec<StoryEvent> {
    session.drain_events().into_iter().map(|s| s.event).collect()
}
