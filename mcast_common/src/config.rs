//! Validated monitoring parameters.
//!
//! `MonitorConfig` is the only way the engine receives its settings. Every value is
//! checked here, before anything starts, so an invalid group, port or timeout never
//! surfaces while packets are being processed.
use std::net::IpAddr;
use std::time::Duration;

use log::warn;

use crate::error::MonitorError;
use crate::net::capture_filter;

/// Group address, UDP port and inactivity timeout of one monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Multicast destination address to watch.
    pub group: IpAddr,
    /// UDP port the group traffic is sent to.
    pub port: u16,
    /// How long a source (or the whole session) may stay silent before it is considered gone.
    pub timeout: Duration,
}

impl MonitorConfig {
    /// Validate textual inputs, as typed on the command line or at a prompt.
    pub fn new(group: &str, port: &str, timeout_secs: &str) -> Result<Self, MonitorError> {
        Self::from_parts(
            parse_group(group)?,
            parse_port(port)?,
            parse_timeout(timeout_secs)?,
        )
    }

    /// Validate already-typed values.
    pub fn from_parts(group: IpAddr, port: u16, timeout_secs: u64) -> Result<Self, MonitorError> {
        if port == 0 {
            return Err(MonitorError::InvalidConfiguration(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if timeout_secs == 0 {
            return Err(MonitorError::InvalidConfiguration(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }
        if !group.is_multicast() {
            warn!("{} is not a multicast address; monitoring it anyway", group);
        }
        Ok(Self {
            group,
            port,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// BPF expression selecting exactly this group and port.
    pub fn capture_filter(&self) -> String {
        capture_filter(self.group, self.port)
    }
}

/// Parse a group address (IPv4 or IPv6).
pub fn parse_group(raw: &str) -> Result<IpAddr, MonitorError> {
    raw.trim().parse().map_err(|e| {
        MonitorError::InvalidConfiguration(format!("invalid multicast address '{}': {}", raw.trim(), e))
    })
}

/// Parse a UDP port, rejecting zero.
pub fn parse_port(raw: &str) -> Result<u16, MonitorError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(MonitorError::InvalidConfiguration(format!(
            "invalid port '{}': expected a number between 1 and 65535",
            raw.trim()
        ))),
        Ok(port) => Ok(port),
    }
}

/// Parse an inactivity timeout in whole seconds, rejecting zero and negatives.
pub fn parse_timeout(raw: &str) -> Result<u64, MonitorError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(MonitorError::InvalidConfiguration(format!(
            "invalid timeout '{}': expected a positive integer",
            raw.trim()
        ))),
        Ok(secs) => Ok(secs),
    }
}
