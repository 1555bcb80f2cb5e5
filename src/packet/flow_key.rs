//! Flow identification
//!
//! This module provides the `FlowKey` struct which identifies a TCP flow by its
//! 4-tuple: source IP, destination IP, source port and destination port.
//!
//! Keys are directional. A request and its response carry mirrored keys; see
//! [`FlowKey::reversed`].

use core::fmt;
use core::net::Ipv4Addr;

/// A TCP flow identified by the IPv4 4-tuple, all fields in host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub src_ip: u32,
    pub dst_ip: u32,
    pub src_port: u16,
    pub dst_port: u16,
}

impl FlowKey {
    pub fn new(src: Ipv4Addr, dst: Ipv4Addr, src_port: u16, dst_port: u16) -> Self {
        Self {
            src_ip: src.to_bits(),
            dst_ip: dst.to_bits(),
            src_port,
            dst_port,
        }
    }

    /// Build a key from the fixed part of an IPv4 header and the first bytes of a TCP header.
    pub(crate) fn from_headers(ip: &[u8; 20], tcp: &[u8; 20]) -> Self {
        Self {
            // Source and destination addresses live at bytes 12-15 and 16-19
            src_ip: u32::from_be_bytes([ip[12], ip[13], ip[14], ip[15]]),
            dst_ip: u32::from_be_bytes([ip[16], ip[17], ip[18], ip[19]]),
            // Ports are the first 4 bytes of the TCP header
            src_port: u16::from_be_bytes([tcp[0], tcp[1]]),
            dst_port: u16::from_be_bytes([tcp[2], tcp[3]]),
        }
    }

    pub const fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.src_ip)
    }

    pub const fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.dst_ip)
    }

    /// The key of the opposite direction of the same connection.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            src_ip: self.dst_ip,
            dst_ip: self.src_ip,
            src_port: self.dst_port,
            dst_port: self.src_port,
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src_addr(),
            self.src_port,
            self.dst_addr(),
            self.dst_port
        )
    }
}
