//! HTTP message recognition.
//!
//! This module holds the declarative table of HTTP signatures and matches payload
//! windows against it.

mod signature;

pub use signature::{SIGNATURE_WINDOW, SIGNATURES, Signature, match_signature};
