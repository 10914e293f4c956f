//! Single-consumer engine loop.
//!
//! The engine thread owns the [`Monitor`] exclusively. Packet events from any number of
//! producers and the sweeper's timer ticks are funnelled through crossbeam channels into
//! one `select!` loop, so registry updates and notice emission are serialized without
//! locks.
//!
//! The loop stops when:
//! - a unit is received on the shutdown channel, or every shutdown sender is dropped,
//! - every event producer has hung up.
//!
//! A pending shutdown is checked before each message, so at most one more event or
//! tick is handled after it is requested.
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError, select, tick};
use log::{debug, info};
use mcast_common::net::SWEEP_INTERVAL;

use crate::monitor::{Monitor, PacketEvent};
use crate::sink::AlertSink;

/// Why the engine loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Shutdown was requested (or its sender dropped).
    Shutdown,
    /// Every packet producer disconnected.
    SourcesClosed,
}

/// Final state handed back when the engine stops.
#[derive(Debug)]
pub struct EngineOutcome<S> {
    /// Monitor state at shutdown.
    pub monitor: Monitor,
    /// The sink, returned so buffered notices can be inspected or flushed.
    pub sink: S,
    /// Why the loop stopped.
    pub reason: StopReason,
    /// Number of packet events processed.
    pub events: u64,
}

/// Runs a [`Monitor`] against a packet stream and a periodic sweep.
pub struct Engine<S> {
    monitor: Monitor,
    sink: S,
    sweep_interval: Duration,
}

impl<S: AlertSink> Engine<S> {
    /// Engine with the default sweep period.
    pub fn new(monitor: Monitor, sink: S) -> Self {
        Self {
            monitor,
            sink,
            sweep_interval: SWEEP_INTERVAL,
        }
    }

    /// Override the sweep period.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Blocking loop; returns when shutdown is requested or all producers hang up.
    pub fn run(mut self, events: Receiver<PacketEvent>, shutdown: Receiver<()>) -> EngineOutcome<S> {
        info!(
            "Engine started: timeout {}s, sweep every {:?}",
            self.monitor.timeout().as_secs(),
            self.sweep_interval
        );
        let ticker = tick(self.sweep_interval);
        let mut processed: u64 = 0;

        let reason = loop {
            match shutdown.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break StopReason::Shutdown,
                Err(TryRecvError::Empty) => {}
            }

            select! {
                recv(shutdown) -> _ => break StopReason::Shutdown,
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        self.monitor.observe(event, &mut self.sink);
                        processed += 1;
                    }
                    Err(_) => break StopReason::SourcesClosed,
                },
                recv(ticker) -> _ => {
                    self.monitor.sweep(Instant::now(), &mut self.sink);
                }
            }
        };

        debug!("Engine loop exited after {} events: {:?}", processed, reason);
        info!(
            "Engine stopped ({:?}); {} groups tracked",
            reason,
            self.monitor.registry().group_count()
        );
        EngineOutcome {
            monitor: self.monitor,
            sink: self.sink,
            reason,
            events: processed,
        }
    }
}

impl<S: AlertSink + Send + 'static> Engine<S> {
    /// Run the loop on a dedicated thread.
    pub fn spawn(
        self,
        events: Receiver<PacketEvent>,
        shutdown: Receiver<()>,
    ) -> std::io::Result<JoinHandle<EngineOutcome<S>>> {
        thread::Builder::new()
            .name("mcast-engine".to_string())
            .spawn(move || self.run(events, shutdown))
    }
}
