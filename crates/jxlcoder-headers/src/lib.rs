//! JPEG XL header parsing and generation
//!
//! Besides the header types this crate holds the signature sniffer and the
//! metadata reader. The reader inspects at most
//! [`MAX_HEADER_BYTES`](jxlcoder_core::consts::MAX_HEADER_BYTES) of
//! codestream, whatever the size of the image.

pub mod animation;
pub mod container;
pub mod frame;
pub mod header;
pub mod sniff;

use jxlcoder_bitstream::BitReader;
use jxlcoder_core::consts::MAX_HEADER_BYTES;
use jxlcoder_core::{ImageSize, JxlError, JxlResult};

pub use animation::AnimationHeader;
pub use container::{codestream_prefix, locate_codestream, BoxType, Container, JxlBox};
pub use frame::{FrameHeader, SectionTable};
pub use header::ImageHeader;
pub use sniff::{detect_signature, is_supported, Signature};

/// Parse the image header with a bounded read
///
/// Fails with `NotFound` when `data` is not JPEG XL or the header is
/// truncated or invalid.
pub fn read_header(data: &[u8]) -> JxlResult<ImageHeader> {
    if !is_supported(data) {
        return Err(JxlError::NotFound);
    }
    let prefix = codestream_prefix(data, MAX_HEADER_BYTES).map_err(|_| JxlError::NotFound)?;
    let mut reader = BitReader::new(&prefix[..]);
    ImageHeader::read(&mut reader).map_err(|_| JxlError::NotFound)
}

/// Intrinsic dimensions of an image
pub fn read_size(data: &[u8]) -> JxlResult<ImageSize> {
    read_header(data).map(|header| header.size)
}

/// Whether the image is animated; `false` when the header is unreadable
pub fn is_animated(data: &[u8]) -> bool {
    read_header(data)
        .map(|header| header.is_animated())
        .unwrap_or(false)
}
