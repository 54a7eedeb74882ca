use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use thiserror::Error;

use crate::request::{Epoch, LoadRequest, LoadTicket};
use crate::residency::ResidencyState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("unknown load ticket {0:?}")]
    UnknownTicket(LoadTicket),
    #[error("load for {path:?} already completed")]
    DuplicateCompletion { path: String },
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    state: ResidencyState,
    ticket: LoadTicket,
    /// Epoch of the most recent request for this path.
    epoch: Epoch,
    asset: Option<T>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Result of asking the cache for an asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lookup {
    Ready,
    /// A load is queued or in flight; wait for its completion.
    Pending(LoadTicket),
}

/// A finished load, returned so the caller can decide whether it still matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: LoadTicket,
    pub path: String,
    /// Epoch of the latest request, not the first one.
    pub epoch: Epoch,
}

impl Completion {
    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.epoch == epoch
    }
}

/// Memoized asset cache keyed by path.
///
/// Every path is loaded at most once per session: repeated requests either hit
/// the resident asset or join the load already in flight. There is no
/// cancellation; a completion nobody waits for any more still fills the cache.
/// Entries live in a `BTreeMap` so iteration is stable.
#[derive(Debug)]
pub struct AssetCache<T> {
    entries: BTreeMap<String, CacheEntry<T>>,
    tickets: BTreeMap<LoadTicket, String>,
    dispatch: VecDeque<LoadTicket>,
    next_ticket: u64,
    stats: CacheStats,
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            tickets: BTreeMap::new(),
            dispatch: VecDeque::new(),
            next_ticket: 1,
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn state(&self, path: &str) -> Option<ResidencyState> {
        self.entries.get(path).map(|e| e.state)
    }

    pub fn get(&self, path: &str) -> Option<&T> {
        self.entries.get(path).and_then(|e| e.asset.as_ref())
    }

    pub fn path_for(&self, ticket: LoadTicket) -> Option<&str> {
        self.tickets.get(&ticket).map(String::as_str)
    }

    fn issue(&mut self, path: &str, epoch: Epoch) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.tickets.insert(ticket, path.to_string());
        self.dispatch.push_back(ticket);
        self.entries.insert(
            path.to_string(),
            CacheEntry {
                state: ResidencyState::Requested,
                ticket,
                epoch,
                asset: None,
            },
        );
        ticket
    }

    /// Ask for `path`. Only the first request (or one after a failure) queues
    /// a load; `Ready` means [`AssetCache::get`] has the asset.
    pub fn request(&mut self, path: &str, epoch: Epoch) -> Lookup {
        let Some(entry) = self.entries.get_mut(path) else {
            self.stats.misses += 1;
            return Lookup::Pending(self.issue(path, epoch));
        };
        match entry.state {
            ResidencyState::Resident => {
                self.stats.hits += 1;
                Lookup::Ready
            }
            ResidencyState::Requested | ResidencyState::Loading => {
                entry.epoch = entry.epoch.max(epoch);
                self.stats.hits += 1;
                Lookup::Pending(entry.ticket)
            }
            ResidencyState::Failed => {
                tracing::debug!("retrying failed asset {path}");
                self.stats.misses += 1;
                Lookup::Pending(self.issue(path, epoch))
            }
        }
    }

    /// Hand queued loads to the loader, oldest first.
    pub fn drain_requests(&mut self) -> Vec<LoadRequest> {
        let mut out = Vec::with_capacity(self.dispatch.len());
        while let Some(ticket) = self.dispatch.pop_front() {
            let Some(path) = self.tickets.get(&ticket) else {
                continue;
            };
            if let Some(entry) = self.entries.get_mut(path) {
                if entry.ticket == ticket && entry.state == ResidencyState::Requested {
                    entry.state = ResidencyState::Loading;
                    out.push(LoadRequest {
                        ticket,
                        path: path.clone(),
                    });
                }
            }
        }
        out
    }

    fn entry_for(&mut self, ticket: LoadTicket) -> Result<(&String, &mut CacheEntry<T>), CacheError> {
        let path = self.tickets.get(&ticket).ok_or(CacheError::UnknownTicket(ticket))?;
        let entry = self.entries.get_mut(path).ok_or(CacheError::UnknownTicket(ticket))?;
        if entry.ticket != ticket || !entry.state.is_pending() {
            return Err(CacheError::DuplicateCompletion { path: path.clone() });
        }
        Ok((path, entry))
    }

    pub fn complete(&mut self, ticket: LoadTicket, asset: T) -> Result<Completion, CacheError> {
        let (path, entry) = self.entry_for(ticket)?;
        entry.state = ResidencyState::Resident;
        entry.asset = Some(asset);
        let completion = Completion {
            ticket,
            path: path.clone(),
            epoch: entry.epoch,
        };
        self.stats.completed += 1;
        tracing::debug!("asset {} resident", completion.path);
        Ok(completion)
    }

    pub fn fail(&mut self, ticket: LoadTicket, reason: &str) -> Result<Completion, CacheError> {
        let (path, entry) = self.entry_for(ticket)?;
        entry.state = ResidencyState::Failed;
        let completion = Completion {
            ticket,
            path: path.clone(),
            epoch: entry.epoch,
        };
        self.stats.failed += 1;
        tracing::warn!("asset {} failed to load: {reason}", completion.path);
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_path_once() {
        let mut cache: AssetCache<&str> = AssetCache::new();
        let Lookup::Pending(t1) = cache.request("resources/cargoship.glb", Epoch(1)) else {
            panic!("expected a load");
        };
        assert_eq!(cache.request("resources/cargoship.glb", Epoch(1)), Lookup::Pending(t1));

        let issued = cache.drain_requests();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].path, "resources/cargoship.glb");
        assert_eq!(cache.state("resources/cargoship.glb"), Some(ResidencyState::Loading));
        assert!(cache.drain_requests().is_empty());

        cache.complete(t1, "ship").unwrap();
        assert_eq!(cache.request("resources/cargoship.glb", Epoch(2)), Lookup::Ready);
        assert_eq!(cache.get("resources/cargoship.glb"), Some(&"ship"));
        assert!(cache.drain_requests().is_empty());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                completed: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn completion_reports_latest_request_epoch() {
        let mut cache: AssetCache<u32> = AssetCache::new();
        let Lookup::Pending(t) = cache.request("burger.glb", Epoch(3)) else {
            panic!("expected a load");
        };
        cache.request("burger.glb", Epoch(5));
        let done = cache.complete(t, 7).unwrap();
        assert_eq!(done.epoch, Epoch(5));
        assert!(done.is_current(Epoch(5)));
        assert!(!done.is_current(Epoch(6)));
    }

    #[test]
    fn rejects_unknown_and_repeated_completions() {
        let mut cache: AssetCache<u32> = AssetCache::new();
        assert_eq!(cache.complete(LoadTicket(9), 1), Err(CacheError::UnknownTicket(LoadTicket(9))));

        let Lookup::Pending(t) = cache.request("a.glb", Epoch::default()) else {
            panic!("expected a load");
        };
        cache.complete(t, 1).unwrap();
        assert_eq!(
            cache.complete(t, 2),
            Err(CacheError::DuplicateCompletion { path: "a.glb".into() })
        );
        assert_eq!(cache.get("a.glb"), Some(&1));
    }

    #[test]
    fn failed_load_is_retried_on_next_request() {
        let mut cache: AssetCache<u32> = AssetCache::new();
        let Lookup::Pending(first) = cache.request("a.glb", Epoch::default()) else {
            panic!("expected a load");
        };
        cache.drain_requests();
        cache.fail(first, "404").unwrap();
        assert_eq!(cache.state("a.glb"), Some(ResidencyState::Failed));

        let Lookup::Pending(second) = cache.request("a.glb", Epoch::default()) else {
            panic!("expected a retry");
        };
        assert_ne!(first, second);
        assert_eq!(cache.drain_requests().len(), 1);
        assert!(matches!(cache.complete(first, 1), Err(CacheError::DuplicateCompletion { .. })));
        cache.complete(second, 1).unwrap();
    }
}
