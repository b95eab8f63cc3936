//! Reversible squeeze pyramid
//!
//! Each level halves a plane horizontally then vertically with the lifting
//! S-transform: a pair `(a, b)` becomes the average `s = b + ((a - b) >> 1)`
//! and the detail `d = a - b`. The averages form the next coarser level, so
//! the coarse planes are usable images on their own and a decoder can stop
//! after any level.

use jxlcoder_core::consts::MAX_SQUEEZE_LEVELS;
use jxlcoder_core::{try_alloc, JxlError, JxlResult};

/// Planes are squeezed while their larger side exceeds this
pub const MIN_LEVEL_SIDE: usize = 16;

/// A rectangular plane of integer samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<i32>,
}

impl Plane {
    pub fn new(width: usize, height: usize) -> JxlResult<Self> {
        Ok(Self {
            width,
            height,
            data: try_alloc(width * height, 0)?,
        })
    }

    pub fn from_data(width: usize, height: usize, data: Vec<i32>) -> JxlResult<Self> {
        if data.len() != width * height {
            return Err(JxlError::InvalidBuffer(format!(
                "Plane data holds {} samples, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.width + x]
    }
}

/// Detail bands produced by one squeeze level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqueezeLevel {
    /// Horizontal details, `floor(w/2) x h`
    pub horizontal: Plane,
    /// Vertical details, `ceil(w/2) x floor(h/2)`
    pub vertical: Plane,
}

/// A fully squeezed plane
///
/// `levels[k]` lifts level `k + 1` to level `k`; level 0 is full resolution
/// and `base` is level `levels.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pyramid {
    pub base: Plane,
    pub levels: Vec<SqueezeLevel>,
}

/// Number of levels used for a plane of the given size
pub fn level_count(width: usize, height: usize) -> usize {
    let (mut w, mut h) = (width, height);
    let mut count = 0;
    while w.max(h) > MIN_LEVEL_SIDE && count < MAX_SQUEEZE_LEVELS {
        w = w.div_ceil(2);
        h = h.div_ceil(2);
        count += 1;
    }
    count
}

/// Size of level `k` of a `width x height` plane
pub fn level_size(width: usize, height: usize, k: usize) -> (usize, usize) {
    let d = 1usize << k;
    (width.div_ceil(d), height.div_ceil(d))
}

/// Detail band sizes for the level that halves a `width x height` plane
pub fn detail_sizes(width: usize, height: usize) -> ((usize, usize), (usize, usize)) {
    let half_w = width.div_ceil(2);
    ((width / 2, height), (half_w, height / 2))
}

#[inline]
fn squeeze_pair(a: i32, b: i32) -> (i32, i32) {
    let d = a.wrapping_sub(b);
    (b.wrapping_add(d >> 1), d)
}

#[inline]
fn unsqueeze_pair(s: i32, d: i32) -> (i32, i32) {
    let b = s.wrapping_sub(d >> 1);
    (d.wrapping_add(b), b)
}

fn squeeze_horizontal(plane: &Plane) -> JxlResult<(Plane, Plane)> {
    let (w, h) = (plane.width, plane.height);
    let sw = w.div_ceil(2);
    let dw = w / 2;
    let mut avg = Plane::new(sw, h)?;
    let mut detail = Plane::new(dw, h)?;

    for y in 0..h {
        let row = &plane.data[y * w..(y + 1) * w];
        for i in 0..dw {
            let (s, d) = squeeze_pair(row[2 * i], row[2 * i + 1]);
            avg.data[y * sw + i] = s;
            detail.data[y * dw + i] = d;
        }
        if w % 2 == 1 {
            avg.data[y * sw + sw - 1] = row[w - 1];
        }
    }

    Ok((avg, detail))
}

fn squeeze_vertical(plane: &Plane) -> JxlResult<(Plane, Plane)> {
    let (w, h) = (plane.width, plane.height);
    let sh = h.div_ceil(2);
    let dh = h / 2;
    let mut avg = Plane::new(w, sh)?;
    let mut detail = Plane::new(w, dh)?;

    for j in 0..dh {
        for x in 0..w {
            let (s, d) = squeeze_pair(plane.get(x, 2 * j), plane.get(x, 2 * j + 1));
            avg.data[j * w + x] = s;
            detail.data[j * w + x] = d;
        }
    }
    if h % 2 == 1 {
        let last = (h - 1) * w;
        avg.data[(sh - 1) * w..].copy_from_slice(&plane.data[last..last + w]);
    }

    Ok((avg, detail))
}

/// Squeeze `plane` into a pyramid of `levels` levels
pub fn forward_squeeze(plane: Plane, levels: usize) -> JxlResult<Pyramid> {
    let mut current = plane;
    let mut out = Vec::with_capacity(levels);

    for _ in 0..levels {
        let (half, horizontal) = squeeze_horizontal(&current)?;
        let (coarse, vertical) = squeeze_vertical(&half)?;
        out.push(SqueezeLevel {
            horizontal,
            vertical,
        });
        current = coarse;
    }

    Ok(Pyramid {
        base: current,
        levels: out,
    })
}

/// Lift `coarse` one level using `level`'s detail bands
pub fn unsqueeze_level(coarse: &Plane, level: &SqueezeLevel) -> JxlResult<Plane> {
    let cw = coarse.width;
    let ch = coarse.height;
    let width = cw + level.horizontal.width;
    let height = ch + level.vertical.height;
    let ((hw, hh), (vw, vh)) = detail_sizes(width, height);

    if level.horizontal.width != hw
        || level.horizontal.height != hh
        || level.vertical.width != vw
        || level.vertical.height != vh
        || cw != vw
    {
        return Err(JxlError::DecodeError(format!(
            "Detail bands {}x{} and {}x{} do not match level {}x{}",
            level.horizontal.width,
            level.horizontal.height,
            level.vertical.width,
            level.vertical.height,
            cw,
            ch
        )));
    }

    // Undo the vertical step: averages + vertical details -> cw x height
    let mut half = Plane::new(cw, height)?;
    for j in 0..vh {
        for x in 0..cw {
            let (a, b) = unsqueeze_pair(coarse.get(x, j), level.vertical.get(x, j));
            half.data[2 * j * cw + x] = a;
            half.data[(2 * j + 1) * cw + x] = b;
        }
    }
    if height % 2 == 1 {
        let src = (ch - 1) * cw;
        half.data[(height - 1) * cw..].copy_from_slice(&coarse.data[src..src + cw]);
    }

    // Undo the horizontal step
    let mut full = Plane::new(width, height)?;
    for y in 0..height {
        for i in 0..hw {
            let (a, b) = unsqueeze_pair(half.get(i, y), level.horizontal.get(i, y));
            full.data[y * width + 2 * i] = a;
            full.data[y * width + 2 * i + 1] = b;
        }
        if width % 2 == 1 {
            full.data[y * width + width - 1] = half.get(cw - 1, y);
        }
    }

    Ok(full)
}

impl Pyramid {
    /// Reconstruct level `target` (0 is full resolution)
    pub fn reconstruct(&self, target: usize) -> JxlResult<Plane> {
        let mut current = self.base.clone();
        for level in self.levels.iter().skip(target).rev() {
            current = unsqueeze_level(&current, level)?;
        }
        Ok(current)
    }
}
