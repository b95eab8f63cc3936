//! Adaptive Golomb-Rice coding of prediction residuals
//!
//! Each context keeps a running magnitude estimate. The Rice parameter `k`
//! is the smallest shift with `count << k >= sum`, so encoder and decoder
//! derive identical parameters from the values already coded.
//!
//! A value `u` is written as `u >> k` in unary (ones terminated by a zero)
//! followed by the low `k` bits. Quotients of [`UNARY_LIMIT`] or more are
//! escaped: `UNARY_LIMIT` ones followed by the raw 32-bit value.

use crate::{BitReader, BitWriter};
use jxlcoder_core::{JxlError, JxlResult};
use std::io::{Read, Write};

/// Longest unary prefix before the escape code
pub const UNARY_LIMIT: u32 = 24;

const MAX_K: u32 = 30;
const INITIAL_SUM: u64 = 4;
const RESET_COUNT: u64 = 64;

/// Map a signed residual onto the unsigned integers (0, -1, 1, -2, ...)
pub fn pack_signed(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`pack_signed`]
pub fn unpack_signed(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Adaptation state of a single context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiceState {
    sum: u64,
    count: u64,
}

impl Default for RiceState {
    fn default() -> Self {
        Self {
            sum: INITIAL_SUM,
            count: 1,
        }
    }
}

impl RiceState {
    /// Current Rice parameter
    pub fn k(&self) -> u32 {
        let mut k = 0;
        while k < MAX_K && (self.count << k) < self.sum {
            k += 1;
        }
        k
    }

    pub fn update(&mut self, value: u32) {
        self.sum += value as u64;
        self.count += 1;
        if self.count >= RESET_COUNT {
            self.sum >>= 1;
            self.count >>= 1;
        }
    }
}

/// Context-adaptive residual encoder
#[derive(Debug, Clone)]
pub struct RiceEncoder {
    states: Vec<RiceState>,
}

impl RiceEncoder {
    pub fn new(num_contexts: usize) -> Self {
        Self {
            states: vec![RiceState::default(); num_contexts.max(1)],
        }
    }

    /// Encode a signed residual in `context`
    pub fn encode<W: Write>(
        &mut self,
        writer: &mut BitWriter<W>,
        context: usize,
        value: i32,
    ) -> JxlResult<()> {
        let state = state_mut(&mut self.states, context)?;
        let u = pack_signed(value);
        let k = state.k();
        let q = u >> k;

        if q < UNARY_LIMIT {
            writer.write_bits((1u64 << q) - 1, q as usize)?;
            writer.write_bit(false)?;
            writer.write_bits(u as u64, k as usize)?;
        } else {
            writer.write_bits((1u64 << UNARY_LIMIT) - 1, UNARY_LIMIT as usize)?;
            writer.write_bits(u as u64, 32)?;
        }

        state.update(u);
        Ok(())
    }
}

/// Context-adaptive residual decoder
#[derive(Debug, Clone)]
pub struct RiceDecoder {
    states: Vec<RiceState>,
}

impl RiceDecoder {
    pub fn new(num_contexts: usize) -> Self {
        Self {
            states: vec![RiceState::default(); num_contexts.max(1)],
        }
    }

    /// Decode a signed residual in `context`
    pub fn decode<R: Read>(&mut self, reader: &mut BitReader<R>, context: usize) -> JxlResult<i32> {
        let state = state_mut(&mut self.states, context)?;
        let k = state.k();

        let mut q = 0u32;
        let u = loop {
            if q == UNARY_LIMIT {
                break reader.read_bits(32)?;
            }
            if !reader.read_bit()? {
                let low = reader.read_bits(k as usize)?;
                break ((q as u64) << k) | low;
            }
            q += 1;
        };

        let u = u32::try_from(u)
            .map_err(|_| JxlError::DecodeError("Residual out of range".to_string()))?;
        state.update(u);
        Ok(unpack_signed(u))
    }
}

fn state_mut(states: &mut [RiceState], context: usize) -> JxlResult<&mut RiceState> {
    let len = states.len();
    states.get_mut(context).ok_or_else(|| {
        JxlError::DecodeError(format!("Context {} out of range ({} contexts)", context, len))
    })
}
