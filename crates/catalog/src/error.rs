use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no ships")]
    NoShips,
    #[error("duplicate ship {0:?}")]
    DuplicateShip(String),
    #[error("duplicate annotation {0:?}")]
    DuplicateAnnotation(String),
    #[error("annotation {annotation:?} has a placement for unknown ship {ship:?}")]
    UnknownShipReference { annotation: String, ship: String },
    #[error("non-finite coordinate in {0}")]
    NonFinite(String),
    #[error("annotation {annotation:?}: SDG goal {goal} is outside 1..=17")]
    InvalidSdgGoal { annotation: String, goal: u8 },
    #[error("unknown annotation {0:?}")]
    UnknownAnnotation(String),
    #[error("unknown ship {0:?}")]
    UnknownShip(String),
}
