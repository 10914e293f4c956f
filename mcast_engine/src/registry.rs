//! Per-group registry of active multicast sources.
//!
//! The registry maps every observed group address to the set of sources currently
//! considered active for it, together with the last time each source was seen. It
//! exposes four core operations:
//!
//! - `SourceRegistry::record_activity(group, source, at)` — insert or refresh a source,
//!   creating the group lazily.
//! - `SourceRegistry::evict_stale(group, now, timeout)` — drop the sources of one group
//!   that have been silent for strictly longer than `timeout`.
//! - `SourceRegistry::sweep_all(now, timeout)` — the same, across every group.
//! - `SourceRegistry::active_count(group)` — number of sources currently held for a group.
//!
//! Design notes:
//! - Time is measured with `std::time::Instant`, which is monotonic and immune to system
//!   clock changes.
//! - Groups are never removed, only the sources within them. An empty group behaves
//!   exactly like a group that was never seen.
//! - The registry is not synchronized; it is owned by a single engine thread.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use log::debug;

/// Sources observed for one multicast group.
#[derive(Debug, Default)]
struct GroupState {
    sources: HashMap<IpAddr, Instant>,
}

impl GroupState {
    fn evict_stale(&mut self, now: Instant, timeout: Duration) -> Vec<IpAddr> {
        let mut evicted = Vec::new();
        self.sources.retain(|source, last_seen| {
            debug_assert!(
                *last_seen <= now,
                "eviction clock {:?} is earlier than last activity {:?} of {}",
                now,
                last_seen,
                source
            );
            if now.saturating_duration_since(*last_seen) > timeout {
                evicted.push(*source);
                false
            } else {
                true
            }
        });
        evicted.sort();
        evicted
    }
}

/// Outcome of [`SourceRegistry::record_activity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityResult {
    /// The source was not held for this group before the update.
    pub is_new_source: bool,
    /// Number of sources held for the group after the update.
    pub active_count: usize,
}

/// Mapping from group address to its currently active sources.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    groups: HashMap<IpAddr, GroupState>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` sent to `group` at `at`.
    ///
    /// A refresh never moves a source's last-seen time backwards, so events delivered
    /// slightly out of order by concurrent producers keep the latest observation.
    pub fn record_activity(&mut self, group: IpAddr, source: IpAddr, at: Instant) -> ActivityResult {
        let state = self.groups.entry(group).or_default();
        let mut is_new_source = false;
        state
            .sources
            .entry(source)
            .and_modify(|last_seen| *last_seen = (*last_seen).max(at))
            .or_insert_with(|| {
                is_new_source = true;
                at
            });
        if is_new_source {
            debug!("Source {} joined group {}", source, group);
        }
        ActivityResult {
            is_new_source,
            active_count: state.sources.len(),
        }
    }

    /// Remove every source of `group` whose last activity is more than `timeout` before `now`.
    ///
    /// Returns the removed addresses in ascending order. Unknown groups yield nothing.
    pub fn evict_stale(&mut self, group: IpAddr, now: Instant, timeout: Duration) -> Vec<IpAddr> {
        match self.groups.get_mut(&group) {
            Some(state) => state.evict_stale(now, timeout),
            None => Vec::new(),
        }
    }

    /// Apply [`Self::evict_stale`] to every known group.
    ///
    /// Only groups that actually lost a source appear in the result.
    pub fn sweep_all(&mut self, now: Instant, timeout: Duration) -> BTreeMap<IpAddr, Vec<IpAddr>> {
        self.groups
            .iter_mut()
            .filter_map(|(group, state)| {
                let evicted = state.evict_stale(now, timeout);
                (!evicted.is_empty()).then_some((*group, evicted))
            })
            .collect()
    }

    /// Number of sources currently held for `group`.
    pub fn active_count(&self, group: IpAddr) -> usize {
        self.groups
            .get(&group)
            .map(|state| state.sources.len())
            .unwrap_or(0)
    }

    /// Number of groups ever observed, including empty ones.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Last activity of `source` in `group`, if it is currently held.
    pub fn last_seen(&self, group: IpAddr, source: IpAddr) -> Option<Instant> {
        self.groups.get(&group)?.sources.get(&source).copied()
    }

    /// Sorted copy of the non-empty groups and their sources.
    pub fn snapshot(&self) -> BTreeMap<IpAddr, BTreeMap<IpAddr, Instant>> {
        self.groups
            .iter()
            .filter(|(_, state)| !state.sources.is_empty())
            .map(|(group, state)| {
                let sources = state.sources.iter().map(|(s, t)| (*s, *t)).collect();
                (*group, sources)
            })
            .collect()
    }
}
