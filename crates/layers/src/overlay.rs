//! Mutually exclusive data layers on the map panel.

use std::collections::BTreeMap;

/// What the map collaborator has to do to reach the requested state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayChange {
    pub hide: Vec<String>,
    pub show: Option<String>,
    /// New panel visibility, `None` when unchanged.
    pub panel_visible: Option<bool>,
}

impl OverlayChange {
    pub fn is_empty(&self) -> bool {
        self.hide.is_empty() && self.show.is_none() && self.panel_visible.is_none()
    }
}

/// Local mirror of the map's managed data layers.
///
/// At most one layer is visible through this set at any time; showing a
/// layer hides every other one first. The panel is shown only while a layer
/// is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySet {
    layers: BTreeMap<String, bool>,
    panel_visible: bool,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer (hidden). Re-registering keeps its visibility.
    pub fn register(&mut self, key: impl Into<String>) {
        self.layers.entry(key.into()).or_insert(false);
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn visible(&self) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, visible)| **visible)
            .map(|(k, _)| k.as_str())
    }

    pub fn visible_count(&self) -> usize {
        self.layers.values().filter(|v| **v).count()
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Show exactly `key`. Unknown keys hide everything instead.
    pub fn show_exclusive(&mut self, key: &str) -> OverlayChange {
        if !self.is_registered(key) {
            tracing::debug!("data layer {key} is not registered, hiding panel");
            return self.hide_all();
        }

        let mut change = OverlayChange::default();
        for (k, visible) in self.layers.iter_mut() {
            let want = k == key;
            if *visible && !want {
                change.hide.push(k.clone());
            }
            if !*visible && want {
                change.show = Some(k.clone());
            }
            *visible = want;
        }
        if !self.panel_visible {
            self.panel_visible = true;
            change.panel_visible = Some(true);
        }
        change
    }

    pub fn hide_all(&mut self) -> OverlayChange {
        let mut change = OverlayChange::default();
        for (k, visible) in self.layers.iter_mut() {
            if *visible {
                change.hide.push(k.clone());
                *visible = false;
            }
        }
        if self.panel_visible {
            self.panel_visible = false;
            change.panel_visible = Some(false);
        }
        change
    }
}
