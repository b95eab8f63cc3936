//! Sample predictors shared by the plane coder and the frame header

use crate::{JxlError, JxlResult};

/// Predictor modes for modular encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predictor {
    /// No prediction (use actual value)
    Zero,
    /// Left pixel prediction
    Left,
    /// Top pixel prediction
    Top,
    /// Average of left and top
    Average,
    /// Paeth predictor (from PNG)
    Paeth,
    /// Select between left, top, and average
    Select,
    /// Gradient predictor
    Gradient,
    /// Weighted predictor
    Weighted,
}

impl Predictor {
    pub const ALL: [Predictor; 8] = [
        Predictor::Zero,
        Predictor::Left,
        Predictor::Top,
        Predictor::Average,
        Predictor::Paeth,
        Predictor::Select,
        Predictor::Gradient,
        Predictor::Weighted,
    ];

    /// Cheap subset searched at medium effort
    pub const COMMON: [Predictor; 4] = [
        Predictor::Left,
        Predictor::Top,
        Predictor::Gradient,
        Predictor::Paeth,
    ];

    pub fn to_bits(self) -> u8 {
        self as u8
    }

    pub fn from_bits(bits: u8) -> JxlResult<Self> {
        Self::ALL
            .get(bits as usize)
            .copied()
            .ok_or_else(|| JxlError::DecodeError(format!("Invalid predictor: {}", bits)))
    }

    /// Predict pixel value based on context
    pub fn predict(&self, left: i32, top: i32, top_left: i32) -> i32 {
        match self {
            Predictor::Zero => 0,
            Predictor::Left => left,
            Predictor::Top => top,
            Predictor::Average => (left + top) / 2,
            Predictor::Paeth => paeth_predictor(left, top, top_left),
            Predictor::Select => {
                let avg = (left + top) / 2;
                let grad_left = (left - top_left).abs();
                let grad_top = (top - top_left).abs();

                if grad_left < grad_top {
                    left
                } else if grad_top < grad_left {
                    top
                } else {
                    avg
                }
            }
            Predictor::Gradient => left + top - top_left,
            Predictor::Weighted => {
                let w_left = if (top - top_left).abs() < (left - top_left).abs() {
                    3
                } else {
                    1
                };
                let w_top = 4 - w_left;
                (left * w_left + top * w_top) / 4
            }
        }
    }
}

/// Paeth predictor from PNG specification
fn paeth_predictor(a: i32, b: i32, c: i32) -> i32 {
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
