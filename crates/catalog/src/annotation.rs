use std::collections::BTreeMap;

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::ship::CameraPose;

/// Index of an annotation in catalog order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationId(pub usize);

/// Link scheme used inside annotation content to point at another annotation.
pub const ANNOTATION_LINK_SCHEME: &str = "annotation:";

/// Where an annotation sits on one ship variant.
///
/// Either position may be missing: the annotation exists for that ship but
/// has no camera framing yet. Such placements are kept (so the data round
/// trips) but never reach picking or stepping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Vec3>,
    /// Discharge outlet; gets an effect marker while selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_position: Option<Vec3>,
}

impl Placement {
    pub fn new(camera_position: Vec3, label_position: Vec3) -> Self {
        Self {
            camera_position: Some(camera_position),
            label_position: Some(label_position),
            outlet_position: None,
        }
    }

    pub fn with_outlet(mut self, outlet: Vec3) -> Self {
        self.outlet_position = Some(outlet);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.pose().is_some()
    }

    /// Camera at `camera_position` looking at the label.
    pub fn pose(&self) -> Option<CameraPose> {
        Some(CameraPose::new(self.camera_position?, self.label_position?))
    }

    pub(crate) fn is_finite(&self) -> bool {
        [self.camera_position, self.label_position, self.outlet_position]
            .into_iter()
            .flatten()
            .all(Vec3::is_finite)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub header: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribution: String,
}

/// A named point of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    /// Display markup, opaque to the core apart from cross references.
    #[serde(default)]
    pub content: String,
    /// Ship name -> placement. A missing ship means "not applicable".
    #[serde(default)]
    pub placements: BTreeMap<String, Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_layer_key: Option<String>,
    /// Chart specification forwarded verbatim to the chart collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_spec: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_caption: Option<String>,
    /// Auxiliary model shown while selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_ref: Option<String>,
    #[serde(default)]
    pub hide_water: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sdg_goals: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hazards: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_impact: Option<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_placement(mut self, ship: impl Into<String>, placement: Placement) -> Self {
        self.placements.insert(ship.into(), placement);
        self
    }

    pub fn with_data_layer(mut self, key: impl Into<String>) -> Self {
        self.data_layer_key = Some(key.into());
        self
    }

    pub fn placement(&self, ship: &str) -> Option<&Placement> {
        self.placements.get(ship)
    }

    /// Placement for `ship` only if it carries both camera and label positions.
    pub fn valid_placement(&self, ship: &str) -> Option<&Placement> {
        self.placement(ship).filter(|p| p.is_valid())
    }

    pub fn is_valid_for(&self, ship: &str) -> bool {
        self.valid_placement(ship).is_some()
    }

    pub fn pose_for(&self, ship: &str) -> Option<CameraPose> {
        self.placement(ship)?.pose()
    }

    /// Targets of `annotation:<Name>` links in `content`, in order of
    /// appearance, without duplicates.
    ///
    /// A link target runs until the closing quote, so names may contain
    /// spaces and parentheses.
    pub fn cross_references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let mut rest = self.content.as_str();
        while let Some(at) = rest.find(ANNOTATION_LINK_SCHEME) {
            let tail = &rest[at + ANNOTATION_LINK_SCHEME.len()..];
            let end = tail
                .find(|c: char| matches!(c, '"' | '\'' | '<' | '>' | '\n'))
                .unwrap_or(tail.len());
            let target = tail[..end].trim();
            if !target.is_empty() && !out.contains(&target) {
                out.push(target);
            }
            rest = &tail[end..];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn placement_needs_camera_and_label() {
        let full = Placement::new(Vec3::new(20.0, 20.0, 110.0), Vec3::new(12.0, 19.0, 110.0));
        assert!(full.is_valid());

        let label_only = Placement {
            label_position: Some(Vec3::ZERO),
            ..Placement::default()
        };
        assert!(!label_only.is_valid());
        assert!(!Placement::default().is_valid());
    }

    #[test]
    fn absent_and_undefined_placements_are_not_valid() {
        let a = Annotation::new("Fueltank")
            .with_placement("tanker", Placement::default())
            .with_placement("container", Placement::new(Vec3::UP, Vec3::ZERO));
        assert!(!a.is_valid_for("tanker"));
        assert!(!a.is_valid_for("cruise"));
        assert!(a.is_valid_for("container"));
        assert_eq!(
            a.pose_for("container"),
            Some(CameraPose::new(Vec3::UP, Vec3::ZERO))
        );
    }

    #[test]
    fn parses_placements_with_undefined_fields() {
        let a: Annotation = serde_json::from_str(
            r#"{
                "name": "Anchorage",
                "placements": {
                    "tanker": {},
                    "container": {
                        "camera_position": [20, 20, 110],
                        "label_position": [12, 19, 110]
                    }
                },
                "sdg_goals": [12]
            }"#,
        )
        .unwrap();
        assert_eq!(a.placements.len(), 2);
        assert!(!a.is_valid_for("tanker"));
        assert!(a.is_valid_for("container"));
        assert_eq!(a.sdg_goals, vec![12]);
        assert!(!a.hide_water);
    }

    #[test]
    fn extracts_cross_references() {
        let mut a = Annotation::new("Biofouling");
        a.content = concat!(
            r#"<p>see <a href="annotation:Antifouling">Antifouling</a>, "#,
            r#"<a href='annotation:Solid waste (food waste)'>waste</a> and "#,
            r#"<a href="annotation:Antifouling">again</a></p>"#
        )
        .to_string();
        assert_eq!(
            a.cross_references(),
            vec!["Antifouling", "Solid waste (food waste)"]
        );
        assert!(Annotation::new("Echo").cross_references().is_empty());
    }
}
