mod common;

use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use story::{AssetHandle, Capabilities, InputEvent, StoryConfig, StorySession};

fn visible(session: &story::StorySession<RecordingHost>) -> Vec<String> {
    session.host().visible_overlays.iter().cloned().collect()
}

#[test]
fn antifouling_shows_its_layer_and_clearing_hides_it() {
    let mut session = container_session();
    session.handle_input(InputEvent::FollowLink("annotation:Antifouling".into()));
    assert_eq!(visible(&session), vec!["AFP_CuO"]);
    assert!(session.host().panel_visible);
    assert!(session.host().outlet.is_some());

    session.handle_input(InputEvent::Key("Escape".into()));
    assert!(visible(&session).is_empty());
    assert!(!session.host().panel_visible);
    assert_eq!(session.host().outlet, None);
}

#[test]
fn selection_made_before_its_layer_arrives_shows_it_on_arrival() {
    let host = RecordingHost {
        fully_loaded: true,
        ..RecordingHost::default()
    };
    let mut session = StorySession::new(Arc::new(fixture()), StoryConfig::default(), host);
    session.start(Capabilities::all()).unwrap();
    session.handle_input(InputEvent::SelectShip("container".into()));
    session.handle_input(InputEvent::FollowLink("Antifouling".into()));
    assert!(visible(&session).is_empty());
    assert!(!session.host().panel_visible);

    session.on_overlays_loaded(["AFP_CuO", "SCRUB_W_CLOSED"]);
    assert_eq!(visible(&session), vec!["AFP_CuO"]);
    assert!(session.host().panel_visible);

    session.handle_input(InputEvent::Key("Escape".into()));
    session.on_overlays_loaded(["STERN_TUBE"]);
    assert!(visible(&session).is_empty());
}

#[test]
fn at_most_one_data_layer_is_ever_visible() {
    let catalog = catalog::StoryCatalog::builtin().unwrap();
    let mut session = session_with(catalog, StoryConfig::default());
    let inputs = [
        "ArrowRight",
        "ArrowRight",
        "PageDown",
        "ArrowLeft",
        "ArrowLeft",
        "Escape",
        "PageDown",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "ArrowRight",
        "PageUp",
        "ArrowLeft",
    ];
    for key in inputs {
        session.handle_input(InputEvent::Key(key.into()));
        assert!(session.host().visible_overlays.len() <= 1, "after {key}");
        assert_eq!(
            session.adapter().overlays().visible(),
            session.host().visible_overlays.iter().next().map(String::as_str)
        );
    }
    for name in ["Antifouling", "Scrubber water", "Propeller shaft lubricants", "Exhaust gas"] {
        session.handle_input(InputEvent::FollowLink(name.into()));
        assert!(session.host().visible_overlays.len() <= 1);
    }
    assert_eq!(session.host().max_visible_overlays, 1);
}

#[test]
fn selection_without_layer_hides_the_previous_one() {
    let mut session = container_session();
    session.handle_input(InputEvent::FollowLink("Antifouling".into()));
    session.handle_input(InputEvent::FollowLink("Anchorage".into()));
    assert!(visible(&session).is_empty());
    assert!(!session.host().panel_visible);
}

#[test]
fn ship_model_loads_once_and_late_loads_do_not_switch_ships() {
    let mut session = session_with(fixture(), StoryConfig::default());
    session.tick(1.0 / 60.0);
    assert_eq!(session.host().loads.len(), 1);
    let tanker = session.host().loads[0].clone();
    assert_eq!(tanker.path, "resources/tanker.glb");

    session.handle_input(InputEvent::SelectShip("container".into()));
    session.tick(1.0 / 60.0);
    let container = session.host().loads[1].clone();
    let home = session.camera_pose();

    session.on_asset_loaded(tanker.ticket, Ok(AssetHandle(1))).unwrap();
    assert!(session.host().shown_ships.is_empty());
    assert_eq!(session.camera_pose(), home);
    assert_eq!(session.metrics().counter("stale_completions"), 1);

    session.on_asset_loaded(container.ticket, Ok(AssetHandle(2))).unwrap();
    assert_eq!(session.host().shown_ships, vec!["container"]);

    // Cached now: switching back shows it right away without a new load.
    session.handle_input(InputEvent::SelectShip("tanker".into()));
    session.tick(1.0 / 60.0);
    assert_eq!(session.host().shown_ships, vec!["container", "tanker"]);
    assert_eq!(session.host().loads.len(), 2);
}

#[test]
fn duplicate_asset_completion_is_an_error() {
    let mut session = session_with(fixture(), StoryConfig::default());
    session.tick(1.0 / 60.0);
    let ticket = session.host().loads[0].ticket;
    session.on_asset_loaded(ticket, Ok(AssetHandle(1))).unwrap();
    let err = session.on_asset_loaded(ticket, Ok(AssetHandle(1))).unwrap_err();
    assert!(err.to_string().contains("already completed"), "{err}");
}

#[test]
fn auxiliary_model_follows_selection() {
    let catalog = catalog::StoryCatalog::builtin().unwrap();
    let mut session = session_with(catalog, StoryConfig::default());
    session.handle_input(InputEvent::SelectShip("container".into()));
    session.handle_input(InputEvent::FollowLink("Container loss".into()));
    session.tick(1.0 / 60.0);
    let model = session
        .host()
        .loads
        .iter()
        .find(|l| l.path == "resources/lost_container.glb")
        .cloned()
        .unwrap();

    session.on_asset_loaded(model.ticket, Ok(AssetHandle(9))).unwrap();
    assert_eq!(session.host().model.as_deref(), Some("resources/lost_container.glb"));

    session.handle_input(InputEvent::FollowLink("Anchorage".into()));
    assert_eq!(session.host().model, None);
    session.handle_input(InputEvent::FollowLink("Container loss".into()));
    assert_eq!(session.host().attached.len(), 2);
}

#[test]
fn powertrain_hides_water_until_deselected() {
    let catalog = catalog::StoryCatalog::builtin().unwrap();
    let mut session = session_with(catalog, StoryConfig::default());
    session.handle_input(InputEvent::SelectShip("container".into()));
    session.handle_input(InputEvent::FollowLink("Powertrain".into()));
    assert!(session.host().water_hidden);
    session.handle_input(InputEvent::Key("Escape".into()));
    assert!(!session.host().water_hidden);
}

#[test]
fn inline_chart_renders_and_late_rows_do_not_revive_it() {
    let catalog = catalog::StoryCatalog::builtin().unwrap();
    let with_inline_data = catalog
        .annotations
        .iter()
        .find(|(_, a)| a.plot_spec.as_ref().is_some_and(|s| s.get("data").is_some()))
        .map(|(_, a)| a.name.clone())
        .unwrap();
    let mut session = session_with(catalog, StoryConfig::default());
    session.handle_input(InputEvent::SelectShip("container".into()));
    session.handle_input(InputEvent::FollowLink(with_inline_data));
    assert!(session.host().chart.is_some());

    session.handle_input(InputEvent::Key("Escape".into()));
    assert_eq!(session.host().chart, None);
    session.on_chart_rows(vec![json!({"year": "2021", "nShips": 4564})]);
    assert_eq!(session.host().chart, None);
}
