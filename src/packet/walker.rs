//! Ethernet / IPv4 / TCP header walking.
//!
//! The walker consumes a frame strictly front to back, one header at a time, and stops at
//! the end of the TCP header. Every field it needs is bounds-checked before it is read, so
//! a truncated or lying frame ends in a [`DropReason`] rather than an out-of-bounds access.

use super::cursor::Cursor;
use super::flow_key::FlowKey;
use core::fmt;

pub const ETH_HLEN: usize = 14;
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const IPPROTO_TCP: u8 = 6;

const IPV4_MIN_HEADER_LEN: usize = 20;
const TCP_MIN_HEADER_LEN: usize = 20;
/// IHL and TCP data offset both count 32-bit words.
const HEADER_WORD_LEN: usize = 4;

/// No HTTP request line or status line fits in fewer bytes.
pub const MIN_PAYLOAD_LEN: usize = 7;

/// Why a frame was not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// EtherType is not IPv4.
    NotIpv4,
    /// IPv4 payload is not TCP.
    NotTcp,
    /// The frame ends before a header or the signature window it must contain.
    Truncated,
    /// A header field is inconsistent (IP version, IHL, data offset or total length).
    Malformed,
    /// Fewer than [`MIN_PAYLOAD_LEN`] bytes of TCP payload.
    ShortPayload,
    /// No signature in the payload and no tracked session for the flow.
    NoSession,
}

impl DropReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotIpv4 => "not-ipv4",
            Self::NotTcp => "not-tcp",
            Self::Truncated => "truncated",
            Self::Malformed => "malformed",
            Self::ShortPayload => "short-payload",
            Self::NoSession => "no-session",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful header walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedHeaders {
    pub flow_key: FlowKey,
    /// Absolute offset of the first TCP payload byte within the frame.
    pub payload_offset: usize,
    /// Payload length as implied by the IPv4 total length field.
    pub payload_length: usize,
}

/// Walk the headers of `frame` and locate its TCP payload.
pub fn walk(frame: &[u8]) -> Result<ParsedHeaders, DropReason> {
    walk_headers(frame).map(|(headers, _)| headers)
}

/// Same as [`walk`], also handing back the cursor parked at the first payload byte.
pub(crate) fn walk_headers(frame: &[u8]) -> Result<(ParsedHeaders, Cursor<'_>), DropReason> {
    let mut cursor = Cursor::new(frame);

    // Ethernet header: [6 bytes dst MAC][6 bytes src MAC][2 bytes EtherType]
    let ethernet = cursor.advance::<ETH_HLEN>().ok_or(DropReason::Truncated)?;
    let ethertype = u16::from_be_bytes([ethernet[12], ethernet[13]]);
    if ethertype != ETHERTYPE_IPV4 {
        return Err(DropReason::NotIpv4);
    }

    let ip = cursor
        .advance::<IPV4_MIN_HEADER_LEN>()
        .ok_or(DropReason::Truncated)?;
    if ip[0] >> 4 != 4 {
        return Err(DropReason::Malformed);
    }
    if ip[9] != IPPROTO_TCP {
        return Err(DropReason::NotTcp);
    }
    let ip_header_length = usize::from(ip[0] & 0x0F) * HEADER_WORD_LEN;
    if ip_header_length < IPV4_MIN_HEADER_LEN {
        return Err(DropReason::Malformed);
    }
    let total_length = usize::from(u16::from_be_bytes([ip[2], ip[3]]));

    // IP options sit between the fixed header and the TCP header
    cursor
        .skip(ip_header_length - IPV4_MIN_HEADER_LEN)
        .ok_or(DropReason::Truncated)?;

    let tcp = cursor
        .advance::<TCP_MIN_HEADER_LEN>()
        .ok_or(DropReason::Truncated)?;
    let tcp_header_length = usize::from(tcp[12] >> 4) * HEADER_WORD_LEN;
    if tcp_header_length < TCP_MIN_HEADER_LEN {
        return Err(DropReason::Malformed);
    }

    let flow_key = FlowKey::from_headers(ip, tcp);
    let payload_offset = ETH_HLEN + ip_header_length + tcp_header_length;
    let payload_length = total_length
        .checked_sub(ip_header_length + tcp_header_length)
        .ok_or(DropReason::Malformed)?;
    if payload_length < MIN_PAYLOAD_LEN {
        return Err(DropReason::ShortPayload);
    }

    cursor
        .skip(tcp_header_length - TCP_MIN_HEADER_LEN)
        .ok_or(DropReason::Truncated)?;
    debug_assert_eq!(cursor.position(), payload_offset);

    Ok((
        ParsedHeaders {
            flow_key,
            payload_offset,
            payload_length,
        },
        cursor,
    ))
}
