//! Live packet capture feeding the engine.
//!
//! `PacketCapture` opens a libpcap handle in promiscuous, immediate mode, installs the
//! group/port filter and turns every captured frame into a `PacketEvent` stamped on
//! arrival. Frames that are not IP packets are counted and dropped here and never
//! reach the engine.
//!
//! The read timeout keeps `next_packet` from blocking forever, so the loop observes
//! the shared shutdown flag at least every `CAPTURE_READ_TIMEOUT_MS`.
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, error, info, trace};
use mcast_common::net::{CAPTURE_READ_TIMEOUT_MS, SNAPLEN};
use mcast_common::{MonitorConfig, MonitorError, Result};
use mcast_engine::PacketEvent;
use pcap::{Active, Capture, Device, Linktype};

use crate::decode::{LinkLayer, decode_frame};

/// Counters reported when the capture loop stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frames decoded and forwarded to the engine.
    pub forwarded: u64,
    /// Frames dropped because they were not IP packets.
    pub undecodable: u64,
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} forwarded, {} undecodable", self.forwarded, self.undecodable)
    }
}

/// Hand one event to the engine.
///
/// `Ok(false)` means the engine already stopped for a requested shutdown. An engine
/// that disappears while no shutdown was requested is an error.
fn forward(tx: &Sender<PacketEvent>, event: PacketEvent, shutdown: &AtomicBool) -> Result<bool> {
    match tx.send(event) {
        Ok(()) => Ok(true),
        Err(_) if shutdown.load(Ordering::SeqCst) => Ok(false),
        Err(e) => Err(MonitorError::ChannelSend(format!(
            "engine stopped without a shutdown request: {}",
            e
        ))),
    }
}

/// An open, filtered capture handle.
pub struct PacketCapture {
    cap: Capture<Active>,
    link: LinkLayer,
    device: String,
}

fn capture_error(context: &str, e: pcap::Error) -> MonitorError {
    MonitorError::Capture(format!("{}: {}", context, e))
}

/// Framing used by a libpcap link type, if it is one we can decode.
pub fn link_layer(linktype: Linktype) -> Option<LinkLayer> {
    match linktype {
        Linktype::ETHERNET => Some(LinkLayer::Ethernet),
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => Some(LinkLayer::RawIp),
        Linktype::LINUX_SLL => Some(LinkLayer::LinuxSll),
        Linktype::NULL | Linktype::LOOP => Some(LinkLayer::Loopback),
        _ => None,
    }
}

impl PacketCapture {
    /// Open `device` and restrict it to the configured group and port.
    pub fn open(device: Device, config: &MonitorConfig) -> Result<Self> {
        let name = device.name.clone();
        let mut cap = Capture::from_device(device)
            .map_err(|e| capture_error("Error opening device", e))?
            .promisc(true)
            .immediate_mode(true)
            .snaplen(SNAPLEN)
            .timeout(CAPTURE_READ_TIMEOUT_MS)
            .open()
            .map_err(|e| capture_error("Error opening device", e))?;

        let filter = config.capture_filter();
        cap.filter(&filter, true)
            .map_err(|e| capture_error("Error setting packet filter", e))?;

        let linktype = cap.get_datalink();
        let link = link_layer(linktype).ok_or_else(|| {
            MonitorError::Capture(format!(
                "Unsupported link type {:?} on {}",
                linktype.get_name().unwrap_or_else(|_| linktype.0.to_string()),
                name
            ))
        })?;

        info!("Capturing on {} ({:?}) with filter '{}'", name, link, filter);
        Ok(Self {
            cap,
            link,
            device: name,
        })
    }

    /// Blocking capture loop.
    ///
    /// Returns when `shutdown` is set, when the engine hangs up, or with an error when
    /// the capture handle fails.
    pub fn run(mut self, tx: Sender<PacketEvent>, shutdown: Arc<AtomicBool>) -> Result<CaptureStats> {
        let mut stats = CaptureStats::default();

        while !shutdown.load(Ordering::Relaxed) {
            match self.cap.next_packet() {
                Ok(packet) => {
                    let at = Instant::now();
                    match decode_frame(self.link, packet.data) {
                        Some((source, group)) => {
                            if !forward(&tx, PacketEvent::new(at, source, group), &shutdown)? {
                                debug!("Engine stopped, ending capture on {}", self.device);
                                break;
                            }
                            stats.forwarded += 1;
                        }
                        None => {
                            trace!("Dropped {} byte non-IP frame", packet.data.len());
                            stats.undecodable += 1;
                        }
                    }
                }
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => {
                    error!("Capture on {} failed: {}", self.device, e);
                    return Err(capture_error("Capture failed", e));
                }
            }
        }

        match self.cap.stats() {
            Ok(s) => info!(
                "Capture on {} stopped: {}, {} received by filter, {} dropped by kernel",
                self.device, stats, s.received, s.dropped
            ),
            Err(e) => debug!("Capture statistics unavailable: {}", e),
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_link_types() {
        assert_eq!(link_layer(Linktype::ETHERNET), Some(LinkLayer::Ethernet));
        assert_eq!(link_layer(Linktype::RAW), Some(LinkLayer::RawIp));
        assert_eq!(link_layer(Linktype::LINUX_SLL), Some(LinkLayer::LinuxSll));
        assert_eq!(link_layer(Linktype::NULL), Some(LinkLayer::Loopback));
        assert_eq!(link_layer(Linktype::IEEE802_11), None);
    }

    fn event() -> PacketEvent {
        PacketEvent::new(
            Instant::now(),
            "10.0.0.1".parse().unwrap(),
            "239.0.0.1".parse().unwrap(),
        )
    }

    #[test]
    fn forward_delivers_to_a_live_engine() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = AtomicBool::new(false);
        let sent = event();
        assert!(forward(&tx, sent, &shutdown).unwrap());
        assert_eq!(rx.try_recv().unwrap(), sent);
    }

    #[test]
    fn forward_stops_quietly_after_requested_shutdown() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let shutdown = AtomicBool::new(true);
        assert!(!forward(&tx, event(), &shutdown).unwrap());
    }

    #[test]
    fn forward_reports_an_engine_that_vanished() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let shutdown = AtomicBool::new(false);
        assert!(matches!(
            forward(&tx, event(), &shutdown),
            Err(MonitorError::ChannelSend(_))
        ));
    }

    #[test]
    fn stats_summarise_counts() {
        let stats = CaptureStats {
            forwarded: 12,
            undecodable: 3,
        };
        assert_eq!(stats.to_string(), "12 forwarded, 3 undecodable");
    }
}
