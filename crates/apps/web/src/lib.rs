use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

use catalog::StoryCatalog;
use choreography::{Script, build_track};
use foundation::math::Vec2;
use serde_json::Value;
use story::{AssetHandle, Capabilities, InputEvent, StoryConfig, StorySession};
use streaming::LoadTicket;
use wasm_bindgen::prelude::*;

mod host;
mod json;

pub use host::StoryHost;
use host::JsHost;
use json::{event_json, transition_name};

static LOGGING: OnceLock<()> = OnceLock::new();

thread_local! {
    static SESSION: RefCell<Option<StorySession<JsHost>>> = const { RefCell::new(None) };
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn with_session<R>(f: impl FnOnce(&mut StorySession<JsHost>) -> R) -> Result<R, JsValue> {
    SESSION.with(|cell| match cell.borrow_mut().as_mut() {
        Some(session) => Ok(f(session)),
        None => Err(JsValue::from_str("story session not started")),
    })
}

fn input(event: InputEvent) -> Result<String, JsValue> {
    with_session(|s| transition_name(s.handle_input(event)))
}

fn has_property(target: &JsValue, key: &str) -> bool {
    js_sys::Reflect::has(target, &JsValue::from_str(key)).unwrap_or(false)
}

fn detect_capabilities() -> Capabilities {
    let global = js_sys::global();
    let webgpu = web_sys::window().is_some_and(|w| has_property(&w.navigator(), "gpu"));
    Capabilities {
        webgpu,
        workers: has_property(&global, "Worker"),
        offscreen_canvas: has_property(&global, "OffscreenCanvas"),
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    LOGGING.get_or_init(|| {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    });
}

/// Create the session. Without `catalog_json` the built-in story is used.
///
/// A browser lacking a required feature still gets a session (so the
/// blocking event can be drained) but the call fails with the reason.
#[wasm_bindgen]
pub fn start(host: StoryHost, catalog_json: Option<String>, config_json: Option<String>) -> Result<(), JsValue> {
    let catalog = match catalog_json {
        Some(json) => StoryCatalog::from_json(&json),
        None => StoryCatalog::builtin(),
    }
    .map_err(js_err)?;
    let config = match config_json {
        Some(json) => StoryConfig::from_json(&json).map_err(js_err)?,
        None => StoryConfig::default(),
    };

    let mut session = StorySession::new(Arc::new(catalog), config, JsHost::new(host));
    let started = session.start(detect_capabilities());
    SESSION.with(|cell| *cell.borrow_mut() = Some(session));
    started.map_err(js_err)
}

#[wasm_bindgen]
pub fn pointer_move(x_px: f64, y_px: f64) -> Result<String, JsValue> {
    input(InputEvent::PointerMove(Vec2::new(x_px, y_px)))
}

#[wasm_bindgen]
pub fn pointer_leave() -> Result<String, JsValue> {
    input(InputEvent::PointerLeave)
}

#[wasm_bindgen]
pub fn click(x_px: f64, y_px: f64) -> Result<String, JsValue> {
    input(InputEvent::Click(Vec2::new(x_px, y_px)))
}

#[wasm_bindgen]
pub fn key(key: &str) -> Result<String, JsValue> {
    input(InputEvent::Key(key.to_string()))
}

/// An `annotation:<Name>` link inside panel content was clicked.
#[wasm_bindgen]
pub fn follow_link(href: &str) -> Result<String, JsValue> {
    input(InputEvent::FollowLink(href.to_string()))
}

#[wasm_bindgen]
pub fn select_ship(name: &str) -> Result<String, JsValue> {
    input(InputEvent::SelectShip(name.to_string()))
}

#[wasm_bindgen]
pub fn resize(width_px: f64, height_px: f64) -> Result<(), JsValue> {
    input(InputEvent::Resize { width_px, height_px }).map(|_| ())
}

/// Advance one animation frame; returns session time in seconds.
#[wasm_bindgen]
pub fn tick(dt_s: f64) -> Result<f64, JsValue> {
    with_session(|s| s.tick(dt_s).time.0)
}

#[wasm_bindgen]
pub fn asset_loaded(ticket: f64, asset: f64) -> Result<(), JsValue> {
    with_session(|s| s.on_asset_loaded(LoadTicket(ticket as u64), Ok(AssetHandle(asset as u64))))?.map_err(js_err)
}

#[wasm_bindgen]
pub fn asset_failed(ticket: f64, reason: &str) -> Result<(), JsValue> {
    with_session(|s| s.on_asset_loaded(LoadTicket(ticket as u64), Err(reason.to_string())))?.map_err(js_err)
}

/// Data layer keys the map has finished adding.
#[wasm_bindgen]
pub fn overlays_loaded(keys: js_sys::Array) -> Result<(), JsValue> {
    let keys: Vec<String> = keys.iter().filter_map(|k| k.as_string()).collect();
    with_session(|s| s.on_overlays_loaded(keys))
}

/// The shared time-series rows, as a JSON array.
#[wasm_bindgen]
pub fn chart_rows(rows_json: &str) -> Result<(), JsValue> {
    let rows: Vec<Value> = serde_json::from_str(rows_json).map_err(js_err)?;
    with_session(|s| s.on_chart_rows(rows))
}

#[wasm_bindgen]
pub fn play_script(script_json: Option<String>) -> Result<(), JsValue> {
    let script = match script_json {
        Some(json) => Script::from_json(&json).map_err(js_err)?,
        None => Script::default_tour(),
    };
    with_session(|s| s.play_script(&script))?.map_err(js_err)
}

#[wasm_bindgen]
pub fn stop_playback() -> Result<(), JsValue> {
    with_session(|s| s.stop_playback())
}

/// Flattened keyframe track for an offline (dome) export.
#[wasm_bindgen]
pub fn export_track(script_json: Option<String>) -> Result<String, JsValue> {
    let script = match script_json {
        Some(json) => Script::from_json(&json).map_err(js_err)?,
        None => Script::default_tour(),
    };
    let track = with_session(|s| build_track(s.catalog(), &script, &s.config().script))?.map_err(js_err)?;
    serde_json::to_string(&track.flatten()).map_err(js_err)
}

/// Events since the last call, as a JSON array.
#[wasm_bindgen]
pub fn drain_events() -> Result<String, JsValue> {
    with_session(|s| {
        let events: Vec<Value> = s.drain_events().iter().map(|e| event_json(&e.event)).collect();
        Value::Array(events).to_string()
    })
}

/// Debug overlay lines, `undefined` while the overlay is off.
#[wasm_bindgen]
pub fn debug_stats() -> Result<Option<Vec<String>>, JsValue> {
    with_session(|s| s.debug_stats().map(|snapshot| snapshot.lines()))
}

#[wasm_bindgen]
pub fn is_playing() -> bool {
    with_session(|s| s.is_playing()).unwrap_or(false)
}

