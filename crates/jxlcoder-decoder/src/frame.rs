//! Frame layout within a codestream

use jxlcoder_bitstream::BitReader;
use jxlcoder_core::{JxlError, JxlResult};
use jxlcoder_headers::{FrameHeader, ImageHeader, SectionTable};

/// Location of one frame's header, section table and chunks
#[derive(Debug, Clone)]
pub struct FrameLayout {
    pub header: FrameHeader,
    pub table: SectionTable,
    /// Offset of the first chunk in the codestream
    pub payload_start: usize,
    /// Offset just past the frame
    pub end: usize,
}

impl FrameLayout {
    /// Parse the frame starting at `offset`
    pub fn parse(codestream: &[u8], offset: usize, image: &ImageHeader) -> JxlResult<Self> {
        let rest = codestream
            .get(offset..)
            .ok_or_else(|| JxlError::DecodeError("Frame offset past end".to_string()))?;
        let channels = image.channel_count();

        let mut reader = BitReader::new(rest);
        let header = FrameHeader::read(&mut reader, image.is_animated(), channels)?;
        let table_start = offset + reader.bytes_consumed();

        let table = SectionTable::parse(&codestream[table_start..], header.num_sections(), channels)?;
        let payload_start = table_start + table.byte_len();
        let end = payload_start as u64 + table.payload_len();
        if end > codestream.len() as u64 {
            return Err(JxlError::DecodeError(format!(
                "Truncated frame: needs {} bytes, have {}",
                end,
                codestream.len()
            )));
        }

        Ok(Self {
            header,
            table,
            payload_start,
            end: end as usize,
        })
    }

    /// Bytes of chunk `(section, channel)`
    pub fn chunk<'a>(&self, codestream: &'a [u8], section: usize, channel: usize) -> &'a [u8] {
        let (start, end) = self.table.chunk_range(section, channel);
        &codestream[self.payload_start + start as usize..self.payload_start + end as usize]
    }
}

/// Walks the frames of a codestream without decoding pixels
pub struct FrameIter<'a> {
    codestream: &'a [u8],
    image: &'a ImageHeader,
    offset: usize,
    done: bool,
}

impl<'a> FrameIter<'a> {
    /// `offset` is the first byte after the image header
    pub fn new(codestream: &'a [u8], image: &'a ImageHeader, offset: usize) -> Self {
        Self {
            codestream,
            image,
            offset,
            done: false,
        }
    }
}

impl Iterator for FrameIter<'_> {
    type Item = JxlResult<FrameLayout>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.offset >= self.codestream.len() {
            self.done = true;
            return Some(Err(JxlError::DecodeError(
                "Codestream ends before the last frame".to_string(),
            )));
        }

        let layout = FrameLayout::parse(self.codestream, self.offset, self.image);
        match &layout {
            Ok(frame) => {
                self.offset = frame.end;
                self.done = frame.header.is_last;
            }
            Err(_) => self.done = true,
        }
        Some(layout)
    }
}
