//! Bitstream reader implementation

use jxlcoder_core::{JxlError, JxlResult};
use std::io::Read;

/// A bitstream reader for reading individual bits from a byte stream
pub struct BitReader<R: Read> {
    reader: R,
    buffer: u64,
    bits_in_buffer: usize,
    bytes_consumed: usize,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            bytes_consumed: 0,
        }
    }

    /// Read up to 56 bits from the stream
    pub fn read_bits(&mut self, num_bits: usize) -> JxlResult<u64> {
        if num_bits > 56 {
            return Err(JxlError::DecodeError(
                "Cannot read more than 56 bits at once".to_string(),
            ));
        }

        // Ensure we have enough bits in the buffer
        while self.bits_in_buffer < num_bits {
            let mut byte = [0u8; 1];
            if self.reader.read(&mut byte)? == 0 {
                return Err(JxlError::DecodeError(
                    "Unexpected end of stream".to_string(),
                ));
            }
            self.buffer |= (byte[0] as u64) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
            self.bytes_consumed += 1;
        }

        let mask = (1u64 << num_bits) - 1;
        let result = self.buffer & mask;
        self.buffer >>= num_bits;
        self.bits_in_buffer -= num_bits;

        Ok(result)
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> JxlResult<bool> {
        self.read_bits(1).map(|b| b != 0)
    }

    /// Skip to byte boundary
    pub fn align_to_byte(&mut self) -> JxlResult<()> {
        let bits_to_skip = self.bits_in_buffer % 8;
        if bits_to_skip > 0 {
            self.read_bits(bits_to_skip)?;
        }
        Ok(())
    }

    /// Number of whole bytes pulled from the underlying reader
    ///
    /// After [`align_to_byte`](Self::align_to_byte) this is the byte offset
    /// of the next unread bit.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }
}
