//! `story::Host` backed by a JavaScript object.
//!
//! The page passes one object implementing the methods below; the map,
//! chart panel, three.js scene and glTF loader all live behind it. None of
//! these methods may call back into this module synchronously; results such
//! as finished loads are reported from a later task.

use catalog::ShipVariant;
use foundation::math::Vec3;
use scene::Ray;
use serde_json::Value;
use story::{AssetHandle, AssetLoader, ChartView, FrameView, MapView, Renderer, SceneHost};
use streaming::LoadRequest;
use wasm_bindgen::prelude::*;

use crate::json::frame_json;

#[wasm_bindgen]
extern "C" {
    /// Collaborator object supplied by the page.
    pub type StoryHost;

    #[wasm_bindgen(method, js_name = isFullyLoaded)]
    fn is_fully_loaded(this: &StoryHost) -> bool;

    #[wasm_bindgen(method, js_name = showOverlay)]
    fn show_overlay(this: &StoryHost, key: &str);

    #[wasm_bindgen(method, js_name = hideOverlay)]
    fn hide_overlay(this: &StoryHost, key: &str);

    #[wasm_bindgen(method, js_name = setPanelVisible)]
    fn set_panel_visible(this: &StoryHost, visible: bool);

    #[wasm_bindgen(method, js_name = renderChart)]
    fn render_chart(this: &StoryHost, spec_json: &str);

    #[wasm_bindgen(method, js_name = hideChart)]
    fn hide_chart(this: &StoryHost);

    #[wasm_bindgen(method, js_name = showShip)]
    fn show_ship(this: &StoryHost, name: &str, asset: f64);

    #[wasm_bindgen(method, js_name = attachModel)]
    fn attach_model(this: &StoryHost, path: &str, asset: f64, x: f64, y: f64, z: f64);

    #[wasm_bindgen(method, js_name = detachModel)]
    fn detach_model(this: &StoryHost);

    #[wasm_bindgen(method, js_name = showOutletMarker)]
    fn show_outlet_marker(this: &StoryHost, x: f64, y: f64, z: f64);

    #[wasm_bindgen(method, js_name = hideOutletMarker)]
    fn hide_outlet_marker(this: &StoryHost);

    #[wasm_bindgen(method, js_name = setWaterVisible)]
    fn set_water_visible(this: &StoryHost, visible: bool);

    /// Hull raycast; `undefined` when the ray misses.
    #[wasm_bindgen(method, js_name = occlusionDistance)]
    fn occlusion_distance(this: &StoryHost, ox: f64, oy: f64, oz: f64, dx: f64, dy: f64, dz: f64) -> Option<f64>;

    /// Start loading `path`; the page answers with `asset_loaded(ticket, ..)`.
    #[wasm_bindgen(method)]
    fn load(this: &StoryHost, ticket: f64, path: &str);

    #[wasm_bindgen(method, js_name = renderFrame)]
    fn render_frame(this: &StoryHost, frame_json: &str);

    #[wasm_bindgen(method)]
    fn resize(this: &StoryHost, width_px: f64, height_px: f64);
}

pub struct JsHost {
    inner: StoryHost,
}

impl JsHost {
    pub fn new(inner: StoryHost) -> Self {
        Self { inner }
    }
}

impl MapView for JsHost {
    fn is_fully_loaded(&self) -> bool {
        self.inner.is_fully_loaded()
    }

    fn show_overlay(&mut self, key: &str) {
        self.inner.show_overlay(key);
    }

    fn hide_overlay(&mut self, key: &str) {
        self.inner.hide_overlay(key);
    }

    fn set_panel_visible(&mut self, visible: bool) {
        self.inner.set_panel_visible(visible);
    }
}

impl ChartView for JsHost {
    fn render(&mut self, spec: &Value) {
        self.inner.render_chart(&spec.to_string());
    }

    fn hide(&mut self) {
        self.inner.hide_chart();
    }
}

impl SceneHost for JsHost {
    fn show_ship(&mut self, ship: &ShipVariant, asset: AssetHandle) {
        self.inner.show_ship(&ship.name, asset.0 as f64);
    }

    fn attach_model(&mut self, path: &str, asset: AssetHandle, anchor: Vec3) {
        self.inner.attach_model(path, asset.0 as f64, anchor.x, anchor.y, anchor.z);
    }

    fn detach_model(&mut self) {
        self.inner.detach_model();
    }

    fn set_outlet_marker(&mut self, position: Option<Vec3>) {
        match position {
            Some(p) => self.inner.show_outlet_marker(p.x, p.y, p.z),
            None => self.inner.hide_outlet_marker(),
        }
    }

    fn set_water_visible(&mut self, visible: bool) {
        self.inner.set_water_visible(visible);
    }

    fn occlusion_distance(&self, ray: &Ray) -> Option<f64> {
        let (o, d) = (ray.origin, ray.dir);
        self.inner
            .occlusion_distance(o.x, o.y, o.z, d.x, d.y, d.z)
            .filter(|t| t.is_finite())
    }
}

impl AssetLoader for JsHost {
    fn load(&mut self, request: &LoadRequest) {
        self.inner.load(request.ticket.0 as f64, &request.path);
    }
}

impl Renderer for JsHost {
    fn render_frame(&mut self, frame: &FrameView<'_>) {
        self.inner.render_frame(&frame_json(frame).to_string());
    }

    fn resize(&mut self, width_px: f64, height_px: f64) {
        self.inner.resize(width_px, height_px);
    }
}
