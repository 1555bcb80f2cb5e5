//! HTTP message signatures.
//!
//! A signature is a fixed ASCII prefix anchored at the first payload byte. The set is
//! closed: four request methods, `DELETE`, and the `HTTP` prefix of a status line.

use core::fmt;

/// Number of payload bytes inspected per frame. The longest signature must fit.
pub const SIGNATURE_WINDOW: usize = 7;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Name reported in logs and classifications.
    pub name: &'static str,
    pub prefix: &'static [u8],
}

impl Signature {
    /// Whether the payload starts with this signature.
    pub fn matches(&self, window: &[u8; SIGNATURE_WINDOW]) -> bool {
        window.starts_with(self.prefix)
    }

    /// `HTTP/x.y` status lines open responses; everything else opens a request.
    pub fn is_response(&self) -> bool {
        self.prefix == b"HTTP"
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Matched in order, first hit wins. No two prefixes overlap, so order does not change
/// which signature is reported.
pub static SIGNATURES: [Signature; 6] = [
    Signature {
        name: "HTTP",
        prefix: b"HTTP",
    },
    Signature {
        name: "GET",
        prefix: b"GET",
    },
    Signature {
        name: "POST",
        prefix: b"POST",
    },
    Signature {
        name: "PUT",
        prefix: b"PUT",
    },
    Signature {
        name: "DELETE",
        prefix: b"DELETE",
    },
    Signature {
        name: "HEAD",
        prefix: b"HEAD",
    },
];

/// Find the signature the payload window starts with, if any.
pub fn match_signature(window: &[u8; SIGNATURE_WINDOW]) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|signature| signature.matches(window))
}
