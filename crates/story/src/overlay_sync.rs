use foundation::math::Vec3;
use layers::{ChartBinding, ChartCommand, OverlayChange, OverlaySet};
use serde_json::Value;
use streaming::{AssetCache, Completion, Epoch, Lookup, LoadTicket};

use crate::collaborators::{AssetHandle, ChartView, MapView, SceneHost};
use crate::events::SelectionChange;

#[derive(Debug, Clone, PartialEq)]
struct PendingModel {
    path: String,
    ticket: LoadTicket,
    anchor: Vec3,
}

/// Mirrors the selection onto the map, the chart and the scene.
///
/// Each selection change is applied in full before the call returns and
/// supersedes whatever the previous one left pending, so updates for two
/// selections never interleave. Late model loads are attached only if they
/// still belong to the current selection epoch.
#[derive(Debug, Clone, Default)]
pub struct SyncedOverlayAdapter {
    overlays: OverlaySet,
    /// Layer of the current selection, even if the map has not added it yet.
    wanted_layer: Option<String>,
    chart: ChartBinding,
    attached_model: Option<String>,
    pending_model: Option<PendingModel>,
    outlet: Option<Vec3>,
    water_hidden: bool,
    epoch: Epoch,
}

fn apply_overlay_change<M: MapView + ?Sized>(map: &mut M, change: OverlayChange) {
    for key in &change.hide {
        map.hide_overlay(key);
    }
    if let Some(key) = &change.show {
        map.show_overlay(key);
    }
    if let Some(visible) = change.panel_visible {
        map.set_panel_visible(visible);
    }
}

fn apply_chart_command<C: ChartView + ?Sized>(chart: &mut C, cmd: ChartCommand) {
    match cmd {
        ChartCommand::Render(spec) => chart.render(&spec),
        ChartCommand::Hide => chart.hide(),
    }
}

impl SyncedOverlayAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn attached_model(&self) -> Option<&str> {
        self.attached_model.as_deref()
    }

    pub fn has_pending_model(&self) -> bool {
        self.pending_model.is_some()
    }

    pub fn is_water_hidden(&self) -> bool {
        self.water_hidden
    }

    /// Data layers the map has finished adding. A selection made before its
    /// layer arrived gets the layer now.
    pub fn register_overlays<M, I, S>(&mut self, keys: I, map: &mut M)
    where
        M: MapView + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.overlays.register(key);
        }
        if let Some(key) = self.wanted_layer.as_deref() {
            if self.overlays.is_registered(key) && self.overlays.visible() != Some(key) {
                tracing::debug!("data layer {key} arrived after its selection");
                let change = self.overlays.show_exclusive(key);
                apply_overlay_change(map, change);
            }
        }
    }

    pub fn on_selection_changed<H>(
        &mut self,
        change: &SelectionChange,
        host: &mut H,
        cache: &mut AssetCache<AssetHandle>,
    ) where
        H: MapView + ChartView + SceneHost + ?Sized,
    {
        self.epoch = change.epoch;
        let annotation = change.annotation();
        let placement = annotation.and_then(|a| a.valid_placement(&change.ship));

        self.wanted_layer = annotation.and_then(|a| a.data_layer_key.clone());
        let overlay_change = match self.wanted_layer.as_deref() {
            Some(key) => self.overlays.show_exclusive(key),
            None => self.overlays.hide_all(),
        };
        apply_overlay_change(host, overlay_change);

        let cmd = self.chart.bind(annotation.and_then(|a| a.plot_spec.as_ref()));
        apply_chart_command(host, cmd);

        if self.attached_model.take().is_some() {
            host.detach_model();
        }
        self.pending_model = None;
        if let (Some(path), Some(anchor)) = (
            annotation.and_then(|a| a.model_ref.as_deref()),
            placement.and_then(|p| p.label_position),
        ) {
            match cache.request(path, self.epoch) {
                Lookup::Ready => {
                    if let Some(asset) = cache.get(path) {
                        host.attach_model(path, *asset, anchor);
                        self.attached_model = Some(path.to_string());
                    }
                }
                Lookup::Pending(ticket) => {
                    tracing::debug!("model {path} not loaded yet");
                    self.pending_model = Some(PendingModel {
                        path: path.to_string(),
                        ticket,
                        anchor,
                    });
                }
            }
        }

        let outlet = placement.and_then(|p| p.outlet_position);
        if outlet != self.outlet {
            host.set_outlet_marker(outlet);
            self.outlet = outlet;
        }

        let hide_water = annotation.is_some_and(|a| a.hide_water);
        if hide_water != self.water_hidden {
            host.set_water_visible(!hide_water);
            self.water_hidden = hide_water;
        }
    }

    /// A model load finished. Returns `true` if it was attached.
    pub fn on_model_loaded<S>(&mut self, completion: &Completion, asset: AssetHandle, scene: &mut S) -> bool
    where
        S: SceneHost + ?Sized,
    {
        let Some(pending) = &self.pending_model else {
            return false;
        };
        if pending.ticket != completion.ticket || !completion.is_current(self.epoch) {
            tracing::debug!("dropping stale model {}", completion.path);
            return false;
        }
        scene.attach_model(&pending.path, asset, pending.anchor);
        self.attached_model = Some(pending.path.clone());
        self.pending_model = None;
        true
    }

    /// The shared time-series rows arrived.
    pub fn on_chart_rows<C>(&mut self, rows: Vec<Value>, chart: &mut C)
    where
        C: ChartView + ?Sized,
    {
        if let Some(cmd) = self.chart.set_rows(rows) {
            apply_chart_command(chart, cmd);
        }
    }
}
