//!
//! Common types and utilities shared by the multicast engine and the detector binary.
//!
//! This crate aggregates:
//! - `error` — unified error type `MonitorError` used across the workspace.
//! - `result` — handy `Result<T, MonitorError>` alias.
//! - `config` — validated monitoring parameters (group, port, inactivity timeout).
//! - `notice` — the notices raised by the engine and the output formats for them.
//! - `net` — timing constants and the capture filter helper.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod net;
pub mod notice;
pub mod result;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use notice::Notice;
pub use result::Result;
