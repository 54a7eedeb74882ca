//! Offline helpers behind the `shipstory` binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use catalog::StoryCatalog;
use choreography::{FlatTrack, Script, ScriptConfig, build_track};
use serde::Serialize;
use story::StoryConfig;

pub fn load_catalog(path: Option<&Path>) -> Result<StoryCatalog> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            StoryCatalog::from_json(&json).with_context(|| format!("load catalog {}", path.display()))
        }
        None => StoryCatalog::builtin().context("load built-in catalog"),
    }
}

pub fn load_script(path: Option<&Path>) -> Result<Script> {
    let Some(path) = path else {
        return Ok(Script::default_tour());
    };
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Script::from_json(&json).with_context(|| format!("load script {}", path.display()))
}

/// Keyframe settings from a story config file.
pub fn load_script_config(path: Option<&Path>) -> Result<ScriptConfig> {
    let Some(path) = path else {
        return Ok(ScriptConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config = StoryConfig::from_json(&json).with_context(|| format!("load config {}", path.display()))?;
    Ok(config.script)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipSummary {
    pub name: String,
    pub asset_path: String,
    pub annotations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub ships: Vec<ShipSummary>,
    pub annotations: usize,
    /// Annotations without a complete placement on any ship.
    pub unplaced: Vec<String>,
    pub dangling_links: Vec<(String, String)>,
}

pub fn summarize(catalog: &StoryCatalog) -> CatalogSummary {
    let ships = catalog
        .ships
        .iter()
        .map(|(_, ship)| ShipSummary {
            name: ship.name.clone(),
            asset_path: ship.asset_path.clone(),
            annotations: catalog.annotations.valid_for(&ship.name).len(),
        })
        .collect();
    let unplaced = catalog
        .annotations
        .iter()
        .filter(|(_, a)| catalog.ships.names().all(|ship| !a.is_valid_for(ship)))
        .map(|(_, a)| a.name.clone())
        .collect();
    let dangling_links = catalog
        .dangling_references()
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    CatalogSummary {
        ships,
        annotations: catalog.annotations.len(),
        unplaced,
        dangling_links,
    }
}

/// Annotation names reachable on `ship`, in stepping order.
pub fn list_annotations(catalog: &StoryCatalog, ship: &str) -> Result<Vec<String>> {
    catalog.ships.by_name(ship)?;
    Ok(catalog
        .valid_annotation_names(ship)
        .into_iter()
        .map(str::to_string)
        .collect())
}

pub fn flat_track(catalog: &StoryCatalog, script: &Script, config: &ScriptConfig) -> Result<FlatTrack> {
    let track = build_track(catalog, script, config).context("build camera track")?;
    Ok(track.flatten())
}
