//! Frame construction helpers for unit and integration tests.
//!
//! Integration tests include this file through `tests/common`, so it only reaches the
//! rest of the crate through `super`.

use super::FlowKey;
use core::net::Ipv4Addr;

/// Builds Ethernet + IPv4 + TCP frames with a configurable payload.
#[derive(Debug, Clone)]
pub(crate) struct FrameBuilder {
    ethertype: u16,
    version: u8,
    protocol: u8,
    ip_header_words: u8,
    tcp_header_words: u8,
    total_length: Option<u16>,
    key: FlowKey,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub(crate) fn new() -> Self {
        Self {
            ethertype: 0x0800,
            version: 4,
            protocol: 6,
            ip_header_words: 5,
            tcp_header_words: 5,
            total_length: None,
            key: FlowKey::new(
                Ipv4Addr::new(192, 168, 1, 100),
                Ipv4Addr::new(10, 0, 0, 1),
                40000,
                80,
            ),
            payload: Vec::new(),
        }
    }

    pub(crate) fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub(crate) fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub(crate) fn ip_header_words(mut self, words: u8) -> Self {
        self.ip_header_words = words;
        self
    }

    pub(crate) fn tcp_header_words(mut self, words: u8) -> Self {
        self.tcp_header_words = words;
        self
    }

    pub(crate) fn total_length(mut self, total_length: u16) -> Self {
        self.total_length = Some(total_length);
        self
    }

    pub(crate) fn key(mut self, key: FlowKey) -> Self {
        self.key = key;
        self
    }

    pub(crate) fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let ip_len = usize::from(self.ip_header_words) * 4;
        let tcp_len = usize::from(self.tcp_header_words) * 4;
        let total_length = self.total_length.unwrap_or_else(|| {
            u16::try_from(ip_len.max(20) + tcp_len.max(20) + self.payload.len()).unwrap()
        });

        let mut frame = vec![0u8; 14];
        // Destination MAC: 00:11:22:33:44:55, source MAC: AA:BB:CC:DD:EE:FF
        frame[0..6].copy_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        frame[6..12].copy_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        frame[12..14].copy_from_slice(&self.ethertype.to_be_bytes());

        let mut ip = vec![0u8; ip_len.max(20)];
        ip[0] = (self.version << 4) | (self.ip_header_words & 0x0F);
        ip[2..4].copy_from_slice(&total_length.to_be_bytes());
        ip[8] = 64;
        ip[9] = self.protocol;
        ip[12..16].copy_from_slice(&self.key.src_ip.to_be_bytes());
        ip[16..20].copy_from_slice(&self.key.dst_ip.to_be_bytes());
        frame.extend_from_slice(&ip);

        let mut tcp = vec![0u8; tcp_len.max(20)];
        tcp[0..2].copy_from_slice(&self.key.src_port.to_be_bytes());
        tcp[2..4].copy_from_slice(&self.key.dst_port.to_be_bytes());
        tcp[12] = self.tcp_header_words << 4;
        // PSH | ACK
        tcp[13] = 0x18;
        frame.extend_from_slice(&tcp);

        frame.extend_from_slice(&self.payload);
        frame
    }
}
