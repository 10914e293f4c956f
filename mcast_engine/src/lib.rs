//! Multicast source-tracking and staleness-eviction engine.
//!
//! For every multicast group seen on the wire, the engine remembers which sources are
//! currently transmitting, warns when more than one of them is active at once, and ages
//! out sources that fall silent. Its building blocks:
//!
//! - `registry` — `SourceRegistry`, the per-group map of active sources and their last
//!   activity.
//! - `monitor` — `Monitor`, which applies packet events to the registry (activity
//!   tracking) and runs the global-silence sweep.
//! - `sink` — the `AlertSink` trait notices are delivered through.
//! - `engine` — `Engine`, the single-consumer loop that owns a `Monitor` and multiplexes
//!   packet events, sweep ticks and shutdown with crossbeam `select!`.
#![warn(missing_docs)]
pub mod engine;
pub mod monitor;
pub mod registry;
pub mod sink;

pub use engine::{Engine, EngineOutcome, StopReason};
pub use monitor::{Monitor, PacketEvent};
pub use registry::{ActivityResult, SourceRegistry};
pub use sink::AlertSink;
