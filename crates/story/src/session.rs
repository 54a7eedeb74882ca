use std::sync::Arc;

use catalog::{AnnotationId, CameraPose, ShipId, StoryCatalog};
use choreography::{CameraChoreographer, Script, ScriptError, TrackPlayer, build_track};
use foundation::math::Vec2;
use layers::{LabelStyle, PlacedLabel, place_hotspot_label};
use runtime::{EventBus, Frame, IdleTimer, Metrics, MetricsSnapshot, Stamped};
use scene::{Camera, Ray, Viewport, ViewportPicker};
use serde_json::Value;
use streaming::{AssetCache, CacheError, LoadTicket, Lookup};
use thiserror::Error;

use crate::collaborators::{AssetHandle, FrameView, Host};
use crate::config::StoryConfig;
use crate::controller::SelectionController;
use crate::events::{IgnoreReason, StoryEvent, Transition};
use crate::input::{InputEvent, KeyCommand, link_target};
use crate::overlay_sync::SyncedOverlayAdapter;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("this browser is missing {}", .missing.join(", "))]
    UnsupportedEnvironment { missing: Vec<&'static str> },
    #[error("session is not running")]
    NotRunning,
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Browser features the experience cannot run without.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub webgpu: bool,
    pub workers: bool,
    pub offscreen_canvas: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            webgpu: true,
            workers: true,
            offscreen_canvas: true,
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.webgpu, "WebGPU"),
            (self.workers, "Web Workers"),
            (self.offscreen_canvas, "OffscreenCanvas"),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }

    pub fn check(&self) -> Result<(), SessionError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SessionError::UnsupportedEnvironment { missing })
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Blocked,
}

/// Hull ray tests forwarded to the host scene.
struct HullOccluder<'a, H>(&'a H);

impl<H: Host> scene::Occluder for HullOccluder<'_, H> {
    fn occlusion_distance(&self, ray: &Ray) -> Option<f64> {
        self.0.occlusion_distance(ray)
    }
}

/// One running story: selection, camera, overlays and asset loads, driven by
/// [`StorySession::handle_input`] and a per-frame [`StorySession::tick`].
///
/// Everything happens on the caller's thread. Async work (asset loads, map
/// decoding, chart rows) is started through the host and reported back via
/// the `on_*` methods whenever it finishes.
pub struct StorySession<H> {
    catalog: Arc<StoryCatalog>,
    config: StoryConfig,
    host: H,
    phase: Phase,
    controller: SelectionController,
    adapter: SyncedOverlayAdapter,
    choreographer: CameraChoreographer,
    picker: ViewportPicker,
    player: Option<TrackPlayer>,
    assets: AssetCache<AssetHandle>,
    /// Ship whose model is loading, with its ticket.
    ship_load: Option<(ShipId, LoadTicket)>,
    viewport: Viewport,
    label_style: LabelStyle,
    frame: Frame,
    idle: IdleTimer,
    metrics: Metrics,
    debug_stats: bool,
    events: EventBus<StoryEvent>,
}

impl<H: Host> StorySession<H> {
    pub fn new(catalog: Arc<StoryCatalog>, config: StoryConfig, host: H) -> Self {
        let controller = SelectionController::new(catalog.clone());
        let start = controller.target_pose().unwrap_or_default();
        let ship = controller.current_ship().map(|s| s.name.clone()).unwrap_or_default();
        Self {
            picker: ViewportPicker::new(&catalog, &ship, config.hotspot_radius),
            choreographer: CameraChoreographer::new(
                start,
                config.transition_smooth_time_s,
                config.level_flythrough,
            ),
            idle: IdleTimer::new(config.idle_timeout_s),
            catalog,
            config,
            host,
            phase: Phase::Created,
            controller,
            adapter: SyncedOverlayAdapter::new(),
            player: None,
            assets: AssetCache::new(),
            ship_load: None,
            viewport: Viewport::new(1.0, 1.0),
            label_style: LabelStyle::default(),
            frame: Frame::new(0, 0.0),
            metrics: Metrics::new(),
            debug_stats: false,
            events: EventBus::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn catalog(&self) -> &Arc<StoryCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn adapter(&self) -> &SyncedOverlayAdapter {
        &self.adapter
    }

    pub fn assets(&self) -> &AssetCache<AssetHandle> {
        &self.assets
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.choreographer.pose()
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_some()
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Everything emitted since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<Stamped<StoryEvent>> {
        self.events.drain()
    }

    /// Metrics snapshot while the debug overlay is on.
    pub fn debug_stats(&self) -> Option<MetricsSnapshot> {
        if !self.debug_stats {
            return None;
        }
        let cache = self.assets.stats();
        let mut metrics = self.metrics.clone();
        metrics.set_gauge("cache_hits", cache.hits as i64);
        metrics.set_gauge("cache_misses", cache.misses as i64);
        metrics.set_gauge("assets_loaded", cache.completed as i64);
        metrics.set_gauge("assets_failed", cache.failed as i64);
        Some(metrics.snapshot())
    }

    /// Check the environment and show the first ship. A missing capability
    /// blocks the session for good.
    pub fn start(&mut self, capabilities: Capabilities) -> Result<(), SessionError> {
        if let Err(err) = capabilities.check() {
            tracing::warn!("{err}");
            self.phase = Phase::Blocked;
            self.events.emit(
                self.frame,
                StoryEvent::Blocked {
                    message: err.to_string(),
                },
            );
            return Err(err);
        }
        self.phase = Phase::Running;
        self.controller.set_overlay_ready(self.host.is_fully_loaded());
        if let Some(pose) = self.controller.target_pose() {
            self.choreographer.jump_to(pose);
        }
        self.request_ship_asset();
        Ok(())
    }

    fn camera(&self) -> Camera {
        let c = self.config.camera;
        Camera::new(self.choreographer.pose(), c.fov_y_deg, c.near, c.far, self.viewport)
    }

    fn pick(&mut self, pointer_px: Vec2) -> Option<AnnotationId> {
        self.metrics.inc("picks");
        let camera = self.camera();
        self.picker
            .pick(&camera, pointer_px, &HullOccluder(&self.host))
            .map(|hit| hit.annotation)
    }

    fn request_ship_asset(&mut self) {
        let id = self.controller.state().ship;
        let Some(ship) = self.controller.current_ship() else {
            return;
        };
        match self.assets.request(&ship.asset_path, self.controller.epoch()) {
            Lookup::Ready => {
                self.ship_load = None;
                if let Some(asset) = self.assets.get(&ship.asset_path) {
                    self.host.show_ship(ship, *asset);
                }
            }
            Lookup::Pending(ticket) => {
                self.ship_load = Some((id, ticket));
            }
        }
    }

    /// Route controller events to the camera, picker and overlays, then
    /// publish them.
    fn flush_controller(&mut self) {
        for event in self.controller.drain_events() {
            match &event {
                StoryEvent::HighlightChanged { .. } => self.metrics.inc("highlight_transitions"),
                StoryEvent::SelectionChanged(change) => {
                    self.metrics.inc("selection_transitions");
                    self.adapter
                        .on_selection_changed(change, &mut self.host, &mut self.assets);
                }
                StoryEvent::ShipChanged { ship, .. } => {
                    self.picker = ViewportPicker::new(&self.catalog, &ship.name, self.config.hotspot_radius);
                    self.request_ship_asset();
                }
                StoryEvent::CameraRequested { pose, motion } => self.choreographer.request(*pose, *motion),
                _ => {}
            }
            self.events.emit(self.frame, event);
        }
    }

    fn command(&mut self, command: KeyCommand) -> Transition {
        match command {
            KeyCommand::NextAnnotation => self.controller.advance(1),
            KeyCommand::PreviousAnnotation => self.controller.advance(-1),
            KeyCommand::NextShip => self.controller.step_ship(1),
            KeyCommand::PreviousShip => self.controller.step_ship(-1),
            KeyCommand::ClearSelection => self.controller.clear(),
            KeyCommand::ToggleDebugStats => {
                self.debug_stats = !self.debug_stats;
                self.events
                    .emit(self.frame, StoryEvent::DebugStatsToggled(self.debug_stats));
                Transition::Changed
            }
        }
    }

    pub fn handle_input(&mut self, input: InputEvent) -> Transition {
        if self.phase != Phase::Running {
            return Transition::Ignored(IgnoreReason::Blocked);
        }
        if let InputEvent::Resize { width_px, height_px } = input {
            self.viewport = Viewport::new(width_px, height_px);
            self.host.resize(width_px, height_px);
            return Transition::Unchanged;
        }

        self.idle.touch();
        self.controller.set_overlay_ready(self.host.is_fully_loaded());
        let key_command = match &input {
            InputEvent::Key(key) => self.config.keymap.command(key),
            _ => None,
        };

        let transition = if self.player.is_some() {
            if key_command == Some(KeyCommand::ClearSelection) {
                self.stop_playback();
                Transition::Changed
            } else {
                Transition::Ignored(IgnoreReason::ScriptPlaying)
            }
        } else {
            match input {
                InputEvent::PointerMove(px) => {
                    let hit = self.pick(px);
                    self.controller.hover(hit)
                }
                InputEvent::PointerLeave => self.controller.hover(None),
                InputEvent::Click(px) => {
                    let hit = self.pick(px);
                    self.controller.hover(hit);
                    self.controller.confirm(hit)
                }
                InputEvent::Key(_) => match key_command {
                    Some(command) => self.command(command),
                    None => Transition::Unchanged,
                },
                InputEvent::FollowLink(href) => self.controller.select_by_name(link_target(&href)),
                InputEvent::SelectShip(name) => self.controller.set_ship_by_name(&name),
                InputEvent::Resize { .. } => Transition::Unchanged,
            }
        };

        if let Transition::Ignored(reason) = transition {
            tracing::debug!("input ignored: {reason:?}");
            self.metrics.inc("ignored_actions");
        }
        self.flush_controller();
        transition
    }

    /// Data layers the map has added; readiness itself comes from
    /// [`crate::MapView::is_fully_loaded`].
    pub fn on_overlays_loaded<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adapter.register_overlays(keys, &mut self.host);
        self.controller.set_overlay_ready(self.host.is_fully_loaded());
    }

    pub fn on_chart_rows(&mut self, rows: Vec<Value>) {
        tracing::debug!("chart rows loaded: {}", rows.len());
        self.adapter.on_chart_rows(rows, &mut self.host);
    }

    /// Result of a load started through [`crate::AssetLoader::load`].
    ///
    /// Always fills the cache. The scene only changes if the asset still
    /// belongs to what is on screen.
    pub fn on_asset_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<AssetHandle, String>,
    ) -> Result<(), SessionError> {
        let ship_load = self.ship_load.filter(|(_, t)| *t == ticket);
        if ship_load.is_some() {
            self.ship_load = None;
        }

        let asset = match result {
            Ok(asset) => asset,
            Err(reason) => {
                self.assets.fail(ticket, &reason)?;
                return Ok(());
            }
        };
        let completion = self.assets.complete(ticket, asset)?;

        let shown = match ship_load {
            Some((ship_id, _)) if ship_id == self.controller.state().ship => {
                match self.controller.current_ship() {
                    Some(ship) => {
                        self.host.show_ship(ship, asset);
                        true
                    }
                    None => false,
                }
            }
            Some(_) => false,
            None => self.adapter.on_model_loaded(&completion, asset, &mut self.host),
        };
        if !shown {
            tracing::debug!("{} cached, no longer on screen", completion.path);
            self.metrics.inc("stale_completions");
        }
        Ok(())
    }

    /// Build `script` into a keyframe track and play it from the current
    /// camera pose. Bad references fail here, before anything moves.
    pub fn play_script(&mut self, script: &Script) -> Result<(), SessionError> {
        if self.phase != Phase::Running {
            return Err(SessionError::NotRunning);
        }
        let track = build_track(&self.catalog, script, &self.config.script)?;

        if let Some(first) = script.steps.first() {
            self.controller.set_ship_by_name(&first.ship);
        }
        self.controller.hover(None);
        self.controller.clear();
        self.flush_controller();

        let start = self.choreographer.pose();
        self.choreographer.cancel();
        tracing::info!("playing {} keyframes over {:.1}s", track.len(), track.duration_s());
        self.events.emit(
            self.frame,
            StoryEvent::PlaybackStarted {
                duration_s: track.duration_s(),
            },
        );
        self.player = Some(TrackPlayer::new(track, Some(start)));
        self.idle.touch();
        Ok(())
    }

    pub fn stop_playback(&mut self) {
        if self.player.take().is_some() {
            self.choreographer.cancel();
            self.events.emit(self.frame, StoryEvent::PlaybackFinished);
        }
    }

    fn reset(&mut self) {
        self.player = None;
        self.choreographer.cancel();
        self.controller.reset();
        self.flush_controller();
        self.events.emit(self.frame, StoryEvent::IdleReset);
    }

    /// Scripts may span ships; swap the model and pick set when playback
    /// reaches a step filmed on another one.
    fn follow_script_ship(&mut self, ship: &str) {
        if self.controller.current_ship().is_some_and(|s| s.name == ship) {
            return;
        }
        tracing::debug!("playback moves to {ship}");
        self.controller.set_ship_by_name(ship);
        self.flush_controller();
    }

    fn hover_label(&self, camera: &Camera, highlighted: Option<AnnotationId>) -> Option<PlacedLabel> {
        let id = highlighted?;
        let hotspot = self.picker.hotspot(id)?;
        let name = &self.catalog.annotations.get(id)?.name;
        place_hotspot_label(camera, hotspot.position, name, &self.label_style, self.config.label)
    }

    /// Advance one frame: idle reset, pending loads, camera motion, render.
    pub fn tick(&mut self, dt_s: f64) -> Frame {
        self.frame = self.frame.advanced(dt_s);
        self.metrics.inc("frames");
        if self.phase != Phase::Running {
            return self.frame;
        }
        let dt = self.frame.dt_s;
        self.metrics.record_histogram("frame_ms", (dt * 1000.0).round() as i64);

        if self.idle.advance(dt) {
            self.reset();
        }

        for request in self.assets.drain_requests() {
            self.host.load(&request);
        }

        let mut orientation = None;
        let playback = self.player.as_mut().map(|player| {
            let sample = player.advance(dt);
            let ship = player.track().ship_at(player.time_s()).map(str::to_string);
            (sample, ship, player.is_finished())
        });
        if let Some((sample, ship, finished)) = playback {
            if let Some(ship) = ship {
                self.follow_script_ship(&ship);
            }
            if let Some(sample) = sample {
                self.choreographer.set_pose(sample.pose);
                orientation = Some(sample.orientation);
            }
            if finished {
                self.player = None;
                tracing::info!("playback finished");
                self.events.emit(self.frame, StoryEvent::PlaybackFinished);
            }
        } else {
            self.choreographer.update(dt);
        }

        let pose = self.choreographer.pose();
        let camera = self.camera();
        if !camera.has_valid_projection() {
            return self.frame;
        }
        let state = self.controller.state();
        let hotspots = self.picker.project_hotspots(
            &camera,
            state.highlighted,
            state.annotation,
            &HullOccluder(&self.host),
        );
        self.metrics.set_gauge("hotspots", hotspots.len() as i64);
        let label = self.hover_label(&camera, state.highlighted);
        self.host.render_frame(&FrameView {
            pose,
            orientation: orientation.unwrap_or_else(|| pose.orientation()),
            hotspots: &hotspots,
            label: label.as_ref(),
        });
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_report_names_missing_features() {
        assert!(Capabilities::all().check().is_ok());
        let caps = Capabilities {
            webgpu: false,
            workers: true,
            offscreen_canvas: false,
        };
        assert_eq!(caps.missing(), vec!["WebGPU", "OffscreenCanvas"]);
        assert_eq!(
            caps.check().unwrap_err().to_string(),
            "this browser is missing WebGPU, OffscreenCanvas"
        );
    }
}
