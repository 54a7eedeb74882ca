use std::collections::BTreeMap;

use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommand {
    NextAnnotation,
    PreviousAnnotation,
    NextShip,
    PreviousShip,
    ClearSelection,
    ToggleDebugStats,
}

/// Raw input from the page.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove(Vec2),
    PointerLeave,
    Click(Vec2),
    /// `KeyboardEvent.key`
    Key(String),
    /// Cross-reference link inside annotation content.
    FollowLink(String),
    SelectShip(String),
    Resize { width_px: f64, height_px: f64 },
}

/// Key name to command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap(pub BTreeMap<String, KeyCommand>);

impl Default for Keymap {
    fn default() -> Self {
        Self(
            [
                ("ArrowRight", KeyCommand::NextAnnotation),
                ("ArrowLeft", KeyCommand::PreviousAnnotation),
                ("PageDown", KeyCommand::NextShip),
                ("PageUp", KeyCommand::PreviousShip),
                ("Escape", KeyCommand::ClearSelection),
                ("d", KeyCommand::ToggleDebugStats),
            ]
            .into_iter()
            .map(|(k, c)| (k.to_string(), c))
            .collect(),
        )
    }
}

impl Keymap {
    pub fn command(&self, key: &str) -> Option<KeyCommand> {
        self.0.get(key).copied()
    }
}

/// Strips a `annotation:` link target down to the annotation name.
pub fn link_target(href: &str) -> &str {
    href.strip_prefix(catalog::ANNOTATION_LINK_SCHEME).unwrap_or(href)
}
