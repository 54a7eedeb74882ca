//! Narrow interfaces to the systems the story drives but does not own.

use catalog::{CameraPose, ShipVariant};
use foundation::math::{Quat, Vec3};
use layers::PlacedLabel;
use scene::{HotspotScreen, Ray};
use serde_json::Value;
use streaming::LoadRequest;

/// Opaque handle the host hands back for a loaded model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub u64);

/// The 2D map with its heatmap data layers.
pub trait MapView {
    /// True once every data layer has been decoded and added.
    fn is_fully_loaded(&self) -> bool;
    fn show_overlay(&mut self, key: &str);
    fn hide_overlay(&mut self, key: &str);
    fn set_panel_visible(&mut self, visible: bool);
}

/// The chart panel.
pub trait ChartView {
    /// `spec` already carries its data rows.
    fn render(&mut self, spec: &Value);
    fn hide(&mut self);
}

/// The 3D scene graph.
pub trait SceneHost {
    fn show_ship(&mut self, ship: &ShipVariant, asset: AssetHandle);
    fn attach_model(&mut self, path: &str, asset: AssetHandle, anchor: Vec3);
    fn detach_model(&mut self);
    fn set_outlet_marker(&mut self, position: Option<Vec3>);
    fn set_water_visible(&mut self, visible: bool);
    /// Distance to the first hull intersection along `ray`.
    fn occlusion_distance(&self, ray: &Ray) -> Option<f64>;
}

/// Starts asset loads; results come back through
/// [`crate::StorySession::on_asset_loaded`].
pub trait AssetLoader {
    fn load(&mut self, request: &LoadRequest);
}

/// One frame's worth of drawing state.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView<'a> {
    pub pose: CameraPose,
    pub orientation: Quat,
    pub hotspots: &'a [HotspotScreen],
    pub label: Option<&'a PlacedLabel>,
}

pub trait Renderer {
    fn render_frame(&mut self, frame: &FrameView<'_>);
    fn resize(&mut self, width_px: f64, height_px: f64);
}

/// Everything a session needs from its host.
pub trait Host: MapView + ChartView + SceneHost + AssetLoader + Renderer {}

impl<T: MapView + ChartView + SceneHost + AssetLoader + Renderer> Host for T {}
