use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationId};
use crate::error::CatalogError;
use crate::ship::{ShipRegistry, ShipVariant};

const BUILTIN_STORY: &str = include_str!("../data/story.json");

/// Annotations in catalog order with a name index.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationCatalog {
    annotations: Vec<Annotation>,
    by_name: BTreeMap<String, AnnotationId>,
}

impl AnnotationCatalog {
    pub fn new(annotations: Vec<Annotation>) -> Result<Self, CatalogError> {
        let mut by_name = BTreeMap::new();
        for (i, a) in annotations.iter().enumerate() {
            if by_name.insert(a.name.clone(), AnnotationId(i)).is_some() {
                return Err(CatalogError::DuplicateAnnotation(a.name.clone()));
            }
        }
        Ok(Self {
            annotations,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<AnnotationId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Result<&Annotation, CatalogError> {
        self.find(name)
            .and_then(|id| self.get(id))
            .ok_or_else(|| CatalogError::UnknownAnnotation(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnnotationId, &Annotation)> {
        self.annotations
            .iter()
            .enumerate()
            .map(|(i, a)| (AnnotationId(i), a))
    }

    /// Annotations with a complete placement on `ship`, in catalog order.
    ///
    /// This is the only set picking and stepping ever draw from.
    pub fn valid_for(&self, ship: &str) -> Vec<AnnotationId> {
        self.iter()
            .filter(|(_, a)| a.is_valid_for(ship))
            .map(|(id, _)| id)
            .collect()
    }
}

/// On-disk shape of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryFile {
    pub ships: Vec<ShipVariant>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Ships plus annotations, validated against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryCatalog {
    pub ships: ShipRegistry,
    pub annotations: AnnotationCatalog,
}

impl StoryCatalog {
    pub fn new(ships: Vec<ShipVariant>, annotations: Vec<Annotation>) -> Result<Self, CatalogError> {
        let ships = ShipRegistry::new(ships)?;
        let annotations = AnnotationCatalog::new(annotations)?;

        for (_, a) in annotations.iter() {
            for (ship, placement) in &a.placements {
                if ships.find(ship).is_none() {
                    return Err(CatalogError::UnknownShipReference {
                        annotation: a.name.clone(),
                        ship: ship.clone(),
                    });
                }
                if !placement.is_finite() {
                    return Err(CatalogError::NonFinite(format!(
                        "annotation {:?} on {ship:?}",
                        a.name
                    )));
                }
            }
            if let Some(&goal) = a.sdg_goals.iter().find(|g| !(1..=17).contains(*g)) {
                return Err(CatalogError::InvalidSdgGoal {
                    annotation: a.name.clone(),
                    goal,
                });
            }
        }

        let catalog = Self { ships, annotations };
        for (from, to) in catalog.dangling_references() {
            tracing::warn!("annotation {from:?} links to unknown annotation {to:?}");
        }
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: StoryFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_file(file: StoryFile) -> Result<Self, CatalogError> {
        let catalog = Self::new(file.ships, file.annotations)?;
        tracing::debug!(
            "loaded story with {} ships and {} annotations",
            catalog.ships.len(),
            catalog.annotations.len()
        );
        Ok(catalog)
    }

    /// The story shipped with the application.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_STORY)
    }

    pub fn to_file(&self) -> StoryFile {
        StoryFile {
            ships: self.ships.iter().map(|(_, s)| s.clone()).collect(),
            annotations: self.annotations.iter().map(|(_, a)| a.clone()).collect(),
        }
    }

    /// `(from, to)` pairs for cross references that name no annotation.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        self.annotations
            .iter()
            .flat_map(|(_, a)| {
                a.cross_references()
                    .into_iter()
                    .filter(|to| self.annotations.find(to).is_none())
                    .map(move |to| (a.name.as_str(), to))
            })
            .collect()
    }

    pub fn valid_annotation_names(&self, ship: &str) -> Vec<&str> {
        self.annotations
            .valid_for(ship)
            .into_iter()
            .filter_map(|id| self.annotations.get(id))
            .map(|a| a.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Placement;
    use crate::ship::CameraPose;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn ship(name: &str) -> ShipVariant {
        ShipVariant::new(name, "resources/ship.glb", CameraPose::new(Vec3::new(0.0, 10.0, 50.0), Vec3::ZERO))
    }

    fn placed() -> Placement {
        Placement::new(Vec3::new(10.0, 5.0, 0.0), Vec3::ZERO)
    }

    #[test]
    fn builtin_story_loads() {
        let story = StoryCatalog::builtin().unwrap();
        assert_eq!(story.ships.names().collect::<Vec<_>>(), vec!["tanker", "cruise", "container"]);
        assert!(story.dangling_references().is_empty());

        let antifouling = story.annotations.by_name("Antifouling").unwrap();
        assert_eq!(antifouling.data_layer_key.as_deref(), Some("AFP_CuO"));
        assert_eq!(antifouling.cross_references(), vec!["Biofouling"]);

        let powertrain = story.annotations.by_name("Powertrain").unwrap();
        assert!(powertrain.hide_water);
        assert!(powertrain.is_valid_for("container"));
        assert!(!powertrain.is_valid_for("tanker"));
    }

    #[test]
    fn builtin_unplaced_annotations_are_never_valid() {
        let story = StoryCatalog::builtin().unwrap();
        for name in ["Echo", "Fueltank", "Bilge water", "Tank cleaning"] {
            for ship in story.ships.names() {
                assert!(
                    !story.annotations.by_name(name).unwrap().is_valid_for(ship),
                    "{name} should not be valid on {ship}"
                );
            }
        }
        let container = story.valid_annotation_names("container");
        assert_eq!(container.first(), Some(&"Anchorage"));
        assert_eq!(container.last(), Some(&"Container loss"));
        assert!(!story.valid_annotation_names("tanker").contains(&"Anchorage"));
        assert!(story.valid_annotation_names("cruise").contains(&"Solid waste (food waste)"));
    }

    #[test]
    fn valid_for_keeps_catalog_order() {
        let story = StoryCatalog::new(
            vec![ship("container")],
            vec![
                Annotation::new("Anchorage").with_placement("container", placed()),
                Annotation::new("Echo"),
                Annotation::new("Propulsion momentum").with_placement("container", placed()),
                Annotation::new("Bilge water").with_placement("container", Placement::default()),
                Annotation::new("Antifouling").with_placement("container", placed()),
            ],
        )
        .unwrap();
        assert_eq!(
            story.valid_annotation_names("container"),
            vec!["Anchorage", "Propulsion momentum", "Antifouling"]
        );
    }

    #[test]
    fn rejects_duplicate_annotation() {
        let err = StoryCatalog::new(
            vec![ship("tanker")],
            vec![Annotation::new("Echo"), Annotation::new("Echo")],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateAnnotation(n) if n == "Echo"));
    }

    #[test]
    fn rejects_unknown_ship_reference() {
        let err = StoryCatalog::new(
            vec![ship("tanker")],
            vec![Annotation::new("Anchorage").with_placement("ferry", placed())],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownShipReference { ref ship, .. } if ship == "ferry"
        ));
    }

    #[test]
    fn rejects_non_finite_placement_and_bad_sdg() {
        let bad = Placement::new(Vec3::new(f64::INFINITY, 0.0, 0.0), Vec3::ZERO);
        let err = StoryCatalog::new(
            vec![ship("tanker")],
            vec![Annotation::new("Anchorage").with_placement("tanker", bad)],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::NonFinite(_)));

        let mut a = Annotation::new("Anchorage");
        a.sdg_goals = vec![12, 18];
        let err = StoryCatalog::new(vec![ship("tanker")], vec![a]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSdgGoal { goal: 18, .. }));
    }

    #[test]
    fn dangling_references_are_reported_not_rejected() {
        let mut a = Annotation::new("Biofouling");
        a.content = r#"<a href="annotation:Hull cleaning">x</a>"#.to_string();
        let story = StoryCatalog::new(vec![ship("tanker")], vec![a]).unwrap();
        assert_eq!(story.dangling_references(), vec![("Biofouling", "Hull cleaning")]);
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            StoryCatalog::from_json("{\"ships\": 3}"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn file_round_trip_preserves_story() {
        let story = StoryCatalog::builtin().unwrap();
        let json = serde_json::to_string(&story.to_file()).unwrap();
        assert_eq!(StoryCatalog::from_json(&json).unwrap(), story);
    }
}
