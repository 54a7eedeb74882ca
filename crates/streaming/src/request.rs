use serde::{Deserialize, Serialize};

/// Handle for one in-flight load, handed to the loader and back on completion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

/// Generation counter of whatever state a load was requested for.
///
/// Owners bump it whenever their state changes; a completion carrying an older
/// epoch still fills the cache but must not touch what is on screen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A load the cache wants the loader to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub path: String,
}
