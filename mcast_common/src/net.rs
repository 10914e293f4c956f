//! Timing constants and capture helpers shared by the engine and the detector.
use std::net::IpAddr;
use std::time::Duration;

/// Period of the eviction sweeper.
pub const SWEEP_INTERVAL: Duration = Duration::from_millis(100);
/// Read timeout of the live capture, so the capture loop can observe shutdown.
pub const CAPTURE_READ_TIMEOUT_MS: i32 = 100;
/// Maximum number of bytes captured per frame.
pub const SNAPLEN: i32 = 65535;

/// Build the BPF expression that restricts the capture to one group and UDP port.
///
/// IPv6 groups use `ip6` as the network-layer primitive instead of `ip`.
pub fn capture_filter(group: IpAddr, port: u16) -> String {
    let proto = match group {
        IpAddr::V4(_) => "ip",
        IpAddr::V6(_) => "ip6",
    };
    format!("{} and udp and host {} and port {}", proto, group, port)
}
