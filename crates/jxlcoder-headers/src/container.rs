//! JPEG XL container format
//!
//! The container wraps the codestream in ISOBMFF-style boxes after the
//! 12-byte signature box. Reading walks box headers in place and never
//! copies payloads it does not need.

use crate::sniff::{detect_signature, Signature};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use jxlcoder_core::{JxlError, JxlResult, CONTAINER_SIGNATURE};
use std::borrow::Cow;
use std::io::Write;

/// File type box (ftyp) brand
pub const BRAND_JXL: [u8; 4] = *b"jxl ";

/// Box types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxType {
    /// File type box
    FileType,
    /// JXL codestream box
    JxlCodestream,
    /// Partial JXL codestream box
    JxlPartial,
    /// Exif metadata
    Exif,
    /// XML metadata
    Xml,
    /// Unknown/custom box
    Unknown([u8; 4]),
}

impl BoxType {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"ftyp" => BoxType::FileType,
            b"jxlc" => BoxType::JxlCodestream,
            b"jxlp" => BoxType::JxlPartial,
            b"Exif" => BoxType::Exif,
            b"xml " => BoxType::Xml,
            _ => BoxType::Unknown(*fourcc),
        }
    }

    pub fn to_fourcc(&self) -> [u8; 4] {
        match self {
            BoxType::FileType => *b"ftyp",
            BoxType::JxlCodestream => *b"jxlc",
            BoxType::JxlPartial => *b"jxlp",
            BoxType::Exif => *b"Exif",
            BoxType::Xml => *b"xml ",
            BoxType::Unknown(fourcc) => *fourcc,
        }
    }
}

/// A box to be written into a container
#[derive(Debug, Clone)]
pub struct JxlBox {
    pub box_type: BoxType,
    pub data: Vec<u8>,
}

impl JxlBox {
    pub fn new(box_type: BoxType, data: Vec<u8>) -> Self {
        Self { box_type, data }
    }

    /// Create a file type box
    pub fn file_type(brand: [u8; 4], minor_version: u32, compatible_brands: &[[u8; 4]]) -> Self {
        let mut data = Vec::with_capacity(8 + 4 * compatible_brands.len());
        data.extend_from_slice(&brand);
        data.extend_from_slice(&minor_version.to_be_bytes());
        for compat_brand in compatible_brands {
            data.extend_from_slice(compat_brand);
        }
        Self::new(BoxType::FileType, data)
    }

    /// Write box to output
    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        let box_size = 8 + self.data.len() as u64;

        if box_size <= u32::MAX as u64 {
            writer.write_u32::<BigEndian>(box_size as u32)?;
            writer.write_all(&self.box_type.to_fourcc())?;
        } else {
            // Extended size
            writer.write_u32::<BigEndian>(1)?;
            writer.write_all(&self.box_type.to_fourcc())?;
            writer.write_u64::<BigEndian>(box_size + 8)?;
        }

        writer.write_all(&self.data)?;
        Ok(())
    }
}

/// JPEG XL container
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub boxes: Vec<JxlBox>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container with default boxes for a single codestream
    pub fn with_codestream(codestream: Vec<u8>) -> Self {
        Self {
            boxes: vec![
                JxlBox::file_type(BRAND_JXL, 0, &[BRAND_JXL]),
                JxlBox::new(BoxType::JxlCodestream, codestream),
            ],
        }
    }

    /// Write container to output
    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        writer.write_all(&CONTAINER_SIGNATURE)?;
        for box_item in &self.boxes {
            box_item.write(writer)?;
        }
        Ok(())
    }
}

/// Iterator over the boxes following the signature box
///
/// Yields each box type with its payload borrowed from the input. A payload
/// that runs past the end of the input is cut at the end.
pub struct BoxIter<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> BoxIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: CONTAINER_SIGNATURE.len().min(data.len()),
            failed: false,
        }
    }

    fn next_box(&mut self) -> JxlResult<(BoxType, &'a [u8])> {
        let rest = &self.data[self.offset..];
        if rest.len() < 8 {
            return Err(JxlError::DecodeError("Truncated box header".to_string()));
        }

        let size = BigEndian::read_u32(&rest[0..4]) as u64;
        let mut fourcc = [0u8; 4];
        fourcc.copy_from_slice(&rest[4..8]);

        let (header_len, box_len) = match size {
            0 => (8u64, rest.len() as u64),
            1 => {
                if rest.len() < 16 {
                    return Err(JxlError::DecodeError("Truncated box header".to_string()));
                }
                (16, BigEndian::read_u64(&rest[8..16]))
            }
            n => (8, n),
        };

        if box_len < header_len {
            return Err(JxlError::DecodeError(format!(
                "Box size {} smaller than its header",
                box_len
            )));
        }

        let end = box_len.min(rest.len() as u64) as usize;
        let payload = &rest[header_len as usize..end];
        self.offset += end;
        Ok((BoxType::from_fourcc(&fourcc), payload))
    }
}

impl<'a> Iterator for BoxIter<'a> {
    type Item = JxlResult<(BoxType, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        let item = self.next_box();
        self.failed = item.is_err();
        Some(item)
    }
}

/// Codestream bytes of a naked codestream or container
///
/// A single `jxlc` box is borrowed; `jxlp` parts are concatenated in order.
pub fn locate_codestream(data: &[u8]) -> JxlResult<Cow<'_, [u8]>> {
    match detect_signature(data) {
        Some(Signature::Codestream) => Ok(Cow::Borrowed(data)),
        Some(Signature::Container) => {
            let mut parts: Option<Vec<u8>> = None;
            for item in BoxIter::new(data) {
                let (box_type, payload) = item?;
                match box_type {
                    BoxType::JxlCodestream => return Ok(Cow::Borrowed(payload)),
                    BoxType::JxlPartial => {
                        let part = payload.get(4..).ok_or_else(|| {
                            JxlError::DecodeError("Truncated partial codestream box".to_string())
                        })?;
                        parts.get_or_insert_with(Vec::new).extend_from_slice(part);
                    }
                    _ => {}
                }
            }
            parts
                .map(Cow::Owned)
                .ok_or_else(|| JxlError::DecodeError("No codestream found in container".to_string()))
        }
        None => Err(JxlError::UnsupportedFormat),
    }
}

/// At most `limit` leading codestream bytes, without copying the rest
pub fn codestream_prefix(data: &[u8], limit: usize) -> JxlResult<Vec<u8>> {
    match detect_signature(data) {
        Some(Signature::Codestream) => Ok(data[..data.len().min(limit)].to_vec()),
        Some(Signature::Container) => {
            let mut prefix = Vec::with_capacity(limit);
            for item in BoxIter::new(data) {
                let (box_type, payload) = item?;
                let part = match box_type {
                    BoxType::JxlCodestream => payload,
                    BoxType::JxlPartial => payload.get(4..).unwrap_or(&[]),
                    _ => continue,
                };
                let take = part.len().min(limit - prefix.len());
                prefix.extend_from_slice(&part[..take]);
                if prefix.len() == limit || box_type == BoxType::JxlCodestream {
                    break;
                }
            }
            Ok(prefix)
        }
        None => Err(JxlError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_bytes(container: &Container) -> Vec<u8> {
        let mut buffer = Vec::new();
        container.write(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_box_type_conversion() {
        assert_eq!(BoxType::from_fourcc(b"ftyp"), BoxType::FileType);
        assert_eq!(BoxType::from_fourcc(b"jxlc"), BoxType::JxlCodestream);
        assert_eq!(BoxType::FileType.to_fourcc(), *b"ftyp");
        assert_eq!(BoxType::from_fourcc(b"abcd"), BoxType::Unknown(*b"abcd"));
    }

    #[test]
    fn test_file_type_box() {
        let ftyp = JxlBox::file_type(BRAND_JXL, 0, &[BRAND_JXL]);
        assert_eq!(ftyp.box_type, BoxType::FileType);
        assert_eq!(&ftyp.data[0..4], b"jxl ");
        assert_eq!(ftyp.data.len(), 12);
    }

    #[test]
    fn test_container_roundtrip() {
        let codestream = vec![0xFF, 0x0A, 0x00, 0x01, 0x02, 0x03];
        let bytes = container_bytes(&Container::with_codestream(codestream.clone()));

        assert!(bytes.starts_with(&CONTAINER_SIGNATURE));
        let located = locate_codestream(&bytes).unwrap();
        assert!(matches!(located, Cow::Borrowed(_)));
        assert_eq!(&located[..], &codestream[..]);
    }

    #[test]
    fn test_partial_boxes_concatenate() {
        let mut first = 0u32.to_be_bytes().to_vec();
        first.extend_from_slice(&[0xFF, 0x0A, 0x01]);
        let mut second = 0x8000_0001u32.to_be_bytes().to_vec();
        second.extend_from_slice(&[0x02, 0x03]);

        let container = Container {
            boxes: vec![
                JxlBox::file_type(BRAND_JXL, 0, &[BRAND_JXL]),
                JxlBox::new(BoxType::JxlPartial, first),
                JxlBox::new(BoxType::Exif, vec![0; 10]),
                JxlBox::new(BoxType::JxlPartial, second),
            ],
        };
        let bytes = container_bytes(&container);

        assert_eq!(
            &locate_codestream(&bytes).unwrap()[..],
            &[0xFF, 0x0A, 0x01, 0x02, 0x03]
        );
        assert_eq!(codestream_prefix(&bytes, 4).unwrap(), vec![0xFF, 0x0A, 0x01, 0x02]);
    }

    #[test]
    fn test_prefix_is_bounded() {
        let bytes = container_bytes(&Container::with_codestream(vec![7u8; 1000]));
        assert_eq!(codestream_prefix(&bytes, 64).unwrap().len(), 64);

        let naked = vec![0xFF, 0x0A, 1, 2];
        assert_eq!(codestream_prefix(&naked, 64).unwrap(), naked);
    }

    #[test]
    fn test_missing_codestream() {
        let bytes = container_bytes(&Container {
            boxes: vec![JxlBox::file_type(BRAND_JXL, 0, &[BRAND_JXL])],
        });
        assert!(matches!(
            locate_codestream(&bytes),
            Err(JxlError::DecodeError(_))
        ));
    }

    #[test]
    fn test_malformed_box_size() {
        let mut bytes = CONTAINER_SIGNATURE.to_vec();
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(b"jxlc");
        assert!(locate_codestream(&bytes).is_err());
    }

    #[test]
    fn test_not_jxl() {
        assert!(matches!(
            locate_codestream(b"GIF89a"),
            Err(JxlError::UnsupportedFormat)
        ));
    }
}
