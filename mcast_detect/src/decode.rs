//! Frame decoding for the live capture.
//!
//! Frames are sliced with `etherparse` according to the link type reported by the
//! capture handle. Only the network-layer addresses are extracted; anything that is not
//! an IPv4 or IPv6 packet yields `None` and is dropped by the caller.
use std::net::IpAddr;

use etherparse::{NetSlice, SlicedPacket};

/// Link-layer framing of captured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    /// Ethernet II.
    Ethernet,
    /// Bare IPv4 or IPv6 packets.
    RawIp,
    /// Linux "cooked" capture (SLL), 16-byte pseudo header.
    LinuxSll,
    /// BSD loopback, 4-byte address family header.
    Loopback,
}

impl LinkLayer {
    fn header_len(self) -> usize {
        match self {
            LinkLayer::Ethernet | LinkLayer::RawIp => 0,
            LinkLayer::LinuxSll => 16,
            LinkLayer::Loopback => 4,
        }
    }
}

/// Extract `(source, destination)` from a captured frame.
pub fn decode_frame(link: LinkLayer, data: &[u8]) -> Option<(IpAddr, IpAddr)> {
    let sliced = match link {
        LinkLayer::Ethernet => SlicedPacket::from_ethernet(data).ok()?,
        _ => SlicedPacket::from_ip(data.get(link.header_len()..)?).ok()?,
    };
    match sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => {
            let header = ipv4.header();
            Some((
                IpAddr::V4(header.source_addr()),
                IpAddr::V4(header.destination_addr()),
            ))
        }
        Some(NetSlice::Ipv6(ipv6)) => {
            let header = ipv6.header();
            Some((
                IpAddr::V6(header.source_addr()),
                IpAddr::V6(header.destination_addr()),
            ))
        }
        _ => None,
    }
}
