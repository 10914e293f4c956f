//! Activity tracking and eviction sweeps over a [`SourceRegistry`].
//!
//! `Monitor` turns each observed packet into registry mutations and notices
//! ([`Monitor::observe`]) and runs the periodic global-silence check ([`Monitor::sweep`]).
//! It is a plain single-threaded state machine: every input carries its own timestamp,
//! which makes both paths deterministic and easy to drive from tests.
//!
//! Per-event notice order:
//! 1. the source is recorded (or refreshed) under its group,
//! 2. `NewSource` is emitted for every packet, repeats included,
//! 3. if the group now holds more than one source, `MultiSourceWarning` is emitted and the
//!    group's stale sources are evicted on the spot, each with a `SourceEvicted` stamped
//!    with the clock the eviction was decided against,
//! 4. the global activity timestamp moves to the event time.
//!
//! A sweep only prunes when the whole session has been silent for longer than the
//! timeout. A single stale source in a group with no competitor therefore lingers until
//! a second source shows up or all traffic stops.
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use log::{debug, info};
use mcast_common::{MonitorConfig, Notice};

use crate::registry::SourceRegistry;
use crate::sink::AlertSink;

/// One packet of interest, already decoded by the capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketEvent {
    /// When the packet was observed.
    pub at: Instant,
    /// Sender address.
    pub source: IpAddr,
    /// Destination (multicast group) address.
    pub group: IpAddr,
}

impl PacketEvent {
    /// Event observed at `at`.
    pub fn new(at: Instant, source: IpAddr, group: IpAddr) -> Self {
        Self { at, source, group }
    }
}

/// Source tracker and eviction sweeper sharing one registry.
#[derive(Debug)]
pub struct Monitor {
    registry: SourceRegistry,
    timeout: Duration,
    /// Time of the last accepted event, or of the last global-timeout reset.
    last_global_activity: Instant,
    /// Latest time seen from any input; eviction never compares against an earlier one.
    clock: Instant,
}

impl Monitor {
    /// Create a monitor whose session is considered active as of `started_at`.
    pub fn new(timeout: Duration, started_at: Instant) -> Self {
        Self {
            registry: SourceRegistry::new(),
            timeout,
            last_global_activity: started_at,
            clock: started_at,
        }
    }

    /// Create a monitor from validated settings.
    pub fn from_config(config: &MonitorConfig, started_at: Instant) -> Self {
        Self::new(config.timeout, started_at)
    }

    /// Track one packet and emit its notices into `sink`.
    pub fn observe<S: AlertSink + ?Sized>(&mut self, event: PacketEvent, sink: &mut S) {
        let now = self.advance(event.at);
        let PacketEvent { at, source, group } = event;

        let activity = self.registry.record_activity(group, source, at);
        sink.notify(Notice::NewSource { source, group, at });

        if activity.active_count > 1 {
            debug!(
                "Group {} has {} sources after packet from {}",
                group, activity.active_count, source
            );
            sink.notify(Notice::MultiSourceWarning { group, at });
            for evicted in self.registry.evict_stale(group, now, self.timeout) {
                sink.notify(Notice::SourceEvicted {
                    source: evicted,
                    group,
                    at: now,
                });
            }
        }

        self.last_global_activity = now;
    }

    /// Periodic check: if no packet arrived for longer than the timeout, report it once,
    /// evict every stale source and restart the silence window.
    ///
    /// A tick that finds the session active leaves the monitor untouched, so its state
    /// depends only on the events and on the ticks that produced a `GlobalTimeout`.
    pub fn sweep<S: AlertSink + ?Sized>(&mut self, now: Instant, sink: &mut S) {
        let now = self.clock.max(now);
        if now.saturating_duration_since(self.last_global_activity) <= self.timeout {
            return;
        }
        self.clock = now;

        info!(
            "No packets received within the last {} seconds",
            self.timeout.as_secs()
        );
        sink.notify(Notice::GlobalTimeout { at: now });
        for (group, evicted) in self.registry.sweep_all(now, self.timeout) {
            for source in evicted {
                sink.notify(Notice::SourceEvicted {
                    source,
                    group,
                    at: now,
                });
            }
        }
        self.last_global_activity = now;
    }

    /// Inactivity timeout in effect.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time of the last accepted event or global-timeout reset.
    pub fn last_global_activity(&self) -> Instant {
        self.last_global_activity
    }

    /// Read-only access to the registry.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Number of sources currently held for `group`.
    pub fn active_count(&self, group: IpAddr) -> usize {
        self.registry.active_count(group)
    }

    /// Sorted copy of the registry contents.
    pub fn snapshot(&self) -> BTreeMap<IpAddr, BTreeMap<IpAddr, Instant>> {
        self.registry.snapshot()
    }

    fn advance(&mut self, at: Instant) -> Instant {
        self.clock = self.clock.max(at);
        self.clock
    }
}
