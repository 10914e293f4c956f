//! Error types shared between the engine and the detector binary.
//!
//! The `MonitorError` enum unifies the failure cases of start-up (configuration,
//! interface selection, opening the capture) and of the plumbing around the engine
//! (channels, worker threads). The engine itself never fails once it is running.
use std::io;

use thiserror::Error;

/// Unified error type shared by every crate of the workspace.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// I/O error originating from the standard library (stdin/stdout, files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Monitoring parameters were rejected before the engine started.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The capture device could not be listed, opened or filtered.
    #[error("Capture error: {0}")]
    Capture(String),

    /// No capture device is available on this host.
    #[error("No capture devices were found. Make sure libpcap is installed and you have capture permissions.")]
    NoDevices,

    /// The requested interface does not match any capture device.
    #[error("Invalid interface selection: {0}")]
    InvalidSelection(String),

    /// Failure while encoding a notice as JSON.
    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// A worker thread panicked before it could be joined.
    #[error("Worker thread panicked: {0}")]
    ThreadPanicked(String),
}
