/// Lifecycle of one cached asset.
///
/// Requested → Loading → Resident, or Failed. Resident is terminal for the
/// session; Failed entries are retried only when requested again.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResidencyState {
    /// Waiting to be handed to the loader.
    Requested,
    Loading,
    Resident,
    Failed,
}

impl ResidencyState {
    pub fn is_pending(self) -> bool {
        matches!(self, ResidencyState::Requested | ResidencyState::Loading)
    }
}
