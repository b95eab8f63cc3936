//! Signature detection
//!
//! Only the leading bytes are compared, so sniffing costs the same for any
//! buffer length.

use jxlcoder_core::{CODESTREAM_SIGNATURE, CONTAINER_SIGNATURE};

/// Which JPEG XL form a buffer starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Naked codestream (`FF 0A`)
    Codestream,
    /// Box container (`JXL ` signature box)
    Container,
}

/// Detect the signature at the start of `data`
pub fn detect_signature(data: &[u8]) -> Option<Signature> {
    if data.starts_with(&CODESTREAM_SIGNATURE) {
        Some(Signature::Codestream)
    } else if data.starts_with(&CONTAINER_SIGNATURE) {
        Some(Signature::Container)
    } else {
        None
    }
}

/// Whether `data` starts with a JPEG XL signature
pub fn is_supported(data: &[u8]) -> bool {
    detect_signature(data).is_some()
}
