use std::collections::BTreeMap;

use foundation::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Camera position plus the point it looks at.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Same pose with the camera height snapped to the look-at height, which
    /// keeps the horizon level while flying between poses.
    pub fn leveled(self) -> Self {
        Self {
            position: self.position.with_y(self.target.y),
            target: self.target,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::look_at(self.position, self.target, Vec3::UP)
    }

    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.target.is_finite()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShipId(pub usize);

/// One selectable ship model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipVariant {
    pub name: String,
    pub asset_path: String,
    pub default_view: CameraPose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoke_stack_position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, String>,
}

impl ShipVariant {
    pub fn new(name: impl Into<String>, asset_path: impl Into<String>, default_view: CameraPose) -> Self {
        Self {
            name: name.into(),
            asset_path: asset_path.into(),
            default_view,
            smoke_stack_position: None,
            description: None,
            stats: BTreeMap::new(),
        }
    }
}

/// Ship variants in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipRegistry {
    ships: Vec<ShipVariant>,
}

impl ShipRegistry {
    pub fn new(ships: Vec<ShipVariant>) -> Result<Self, CatalogError> {
        if ships.is_empty() {
            return Err(CatalogError::NoShips);
        }
        for (i, ship) in ships.iter().enumerate() {
            if ships[..i].iter().any(|s| s.name == ship.name) {
                return Err(CatalogError::DuplicateShip(ship.name.clone()));
            }
            let finite = ship.default_view.is_finite()
                && ship.smoke_stack_position.is_none_or(|p| p.is_finite());
            if !finite {
                return Err(CatalogError::NonFinite(format!("ship {:?}", ship.name)));
            }
        }
        Ok(Self { ships })
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn get(&self, id: ShipId) -> Option<&ShipVariant> {
        self.ships.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<ShipId> {
        self.ships.iter().position(|s| s.name == name).map(ShipId)
    }

    pub fn by_name(&self, name: &str) -> Result<&ShipVariant, CatalogError> {
        self.find(name)
            .and_then(|id| self.get(id))
            .ok_or_else(|| CatalogError::UnknownShip(name.to_string()))
    }

    pub fn first(&self) -> ShipId {
        ShipId(0)
    }

    /// Step through ships in catalog order, wrapping at both ends.
    pub fn step(&self, from: ShipId, delta: i64) -> ShipId {
        let n = self.ships.len() as i64;
        ShipId((from.0 as i64 + delta).rem_euclid(n) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShipId, &ShipVariant)> {
        self.ships.iter().enumerate().map(|(i, s)| (ShipId(i), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ships.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(name: &str) -> ShipVariant {
        ShipVariant::new(
            name,
            format!("resources/{name}.glb"),
            CameraPose::new(Vec3::new(-90.0, 40.0, -130.0), Vec3::new(10.0, 5.0, 10.0)),
        )
    }

    #[test]
    fn leveled_snaps_camera_height_to_target() {
        let p = CameraPose::new(Vec3::new(20.0, 20.0, 110.0), Vec3::new(12.0, 19.0, 110.0));
        let l = p.leveled();
        assert_eq!(l.position, Vec3::new(20.0, 19.0, 110.0));
        assert_eq!(l.target, p.target);
    }

    #[test]
    fn step_wraps_both_ways() {
        let reg = ShipRegistry::new(vec![ship("tanker"), ship("cruise"), ship("container")]).unwrap();
        assert_eq!(reg.step(ShipId(2), 1), ShipId(0));
        assert_eq!(reg.step(ShipId(0), -1), ShipId(2));
        assert_eq!(reg.step(ShipId(1), 4), ShipId(2));
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        assert!(matches!(ShipRegistry::new(vec![]), Err(CatalogError::NoShips)));
        let err = ShipRegistry::new(vec![ship("tanker"), ship("tanker")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateShip(name) if name == "tanker"));
    }

    #[test]
    fn rejects_non_finite_default_view() {
        let mut s = ship("cruise");
        s.default_view.target.x = f64::NAN;
        assert!(matches!(ShipRegistry::new(vec![s]), Err(CatalogError::NonFinite(_))));
    }

    #[test]
    fn lookup_by_name() {
        let reg = ShipRegistry::new(vec![ship("tanker"), ship("container")]).unwrap();
        assert_eq!(reg.find("container"), Some(ShipId(1)));
        assert!(reg.by_name("ferry").is_err());
    }
}
