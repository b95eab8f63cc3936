//! Target size planning for bounded decodes
//!
//! A [`ScalePlan`] states which window of the intrinsic image is shown and
//! at what size. The decoder maps the window onto a pyramid level with
//! [`crop_at_level`] and only resamples what the level does not cover.

use crate::squeeze::level_size;
use jxlcoder_core::{ImageSize, JxlError, JxlResult, ScaleMode};

/// A window of an image, in that image's pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn full(size: ImageSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn is_full(&self, size: ImageSize) -> bool {
        *self == Self::full(size)
    }
}

/// Output size and source window of a bounded decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePlan {
    pub target: ImageSize,
    pub crop: CropRect,
}

/// Reconcile the intrinsic size with a bounding box under `mode`
pub fn plan_scale(intrinsic: ImageSize, bounds: ImageSize, mode: ScaleMode) -> JxlResult<ScalePlan> {
    if intrinsic.is_empty() {
        return Err(JxlError::InvalidDimensions {
            width: intrinsic.width,
            height: intrinsic.height,
        });
    }
    if bounds.is_empty() {
        return Err(JxlError::InvalidDimensions {
            width: bounds.width,
            height: bounds.height,
        });
    }

    let (w, h) = (intrinsic.width as f64, intrinsic.height as f64);
    let (bw, bh) = (bounds.width as f64, bounds.height as f64);

    let plan = match mode {
        ScaleMode::Fit => {
            let scale = (bw / w).min(bh / h);
            let tw = ((w * scale).round() as u32).clamp(1, bounds.width);
            let th = ((h * scale).round() as u32).clamp(1, bounds.height);
            ScalePlan {
                target: ImageSize::new(tw, th),
                crop: CropRect::full(intrinsic),
            }
        }
        ScaleMode::Fill => {
            let scale = (bw / w).max(bh / h);
            let cw = ((bw / scale).round() as u32).clamp(1, intrinsic.width);
            let ch = ((bh / scale).round() as u32).clamp(1, intrinsic.height);
            ScalePlan {
                target: bounds,
                crop: CropRect {
                    x: (intrinsic.width - cw) / 2,
                    y: (intrinsic.height - ch) / 2,
                    width: cw,
                    height: ch,
                },
            }
        }
        ScaleMode::Resize => ScalePlan {
            target: bounds,
            crop: CropRect::full(intrinsic),
        },
    };

    Ok(plan)
}

/// Map a full-resolution window onto pyramid level `k`
///
/// The result covers at least the source window and stays inside the level.
pub fn crop_at_level(crop: CropRect, intrinsic: ImageSize, k: usize) -> CropRect {
    let (lw, lh) = level_size(intrinsic.width as usize, intrinsic.height as usize, k);
    let x0 = crop.x >> k;
    let y0 = crop.y >> k;
    let d = 1u64 << k;
    let x1 = ((crop.x as u64 + crop.width as u64).div_ceil(d) as u32).min(lw as u32);
    let y1 = ((crop.y as u64 + crop.height as u64).div_ceil(d) as u32).min(lh as u32);

    CropRect {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0).max(1),
        height: y1.saturating_sub(y0).max(1),
    }
}

/// Coarsest pyramid level (up to `levels`) whose window still covers the target
pub fn choose_level(plan: &ScalePlan, intrinsic: ImageSize, levels: usize) -> usize {
    (0..=levels)
        .rev()
        .find(|&k| {
            let window = crop_at_level(plan.crop, intrinsic, k);
            window.width >= plan.target.width && window.height >= plan.target.height
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_exact_aspect() {
        let plan = plan_scale(
            ImageSize::new(4000, 3000),
            ImageSize::new(800, 600),
            ScaleMode::Fit,
        )
        .unwrap();
        assert_eq!(plan.target, ImageSize::new(800, 600));
        assert!(plan.crop.is_full(ImageSize::new(4000, 3000)));
        assert_eq!(choose_level(&plan, ImageSize::new(4000, 3000), 8), 2);
    }

    #[test]
    fn test_fit_preserves_aspect() {
        let plan = plan_scale(
            ImageSize::new(1920, 1080),
            ImageSize::new(500, 500),
            ScaleMode::Fit,
        )
        .unwrap();
        assert_eq!(plan.target, ImageSize::new(500, 281));
    }

    #[test]
    fn test_fit_upscales() {
        let plan =
            plan_scale(ImageSize::new(10, 5), ImageSize::new(100, 100), ScaleMode::Fit).unwrap();
        assert_eq!(plan.target, ImageSize::new(100, 50));
        assert_eq!(choose_level(&plan, ImageSize::new(10, 5), 0), 0);
    }

    #[test]
    fn test_fill_crops_center() {
        let plan = plan_scale(
            ImageSize::new(400, 200),
            ImageSize::new(100, 100),
            ScaleMode::Fill,
        )
        .unwrap();
        assert_eq!(plan.target, ImageSize::new(100, 100));
        assert_eq!(
            plan.crop,
            CropRect {
                x: 100,
                y: 0,
                width: 200,
                height: 200
            }
        );
    }

    #[test]
    fn test_resize_is_exact() {
        let plan = plan_scale(
            ImageSize::new(300, 100),
            ImageSize::new(50, 70),
            ScaleMode::Resize,
        )
        .unwrap();
        assert_eq!(plan.target, ImageSize::new(50, 70));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let result = plan_scale(ImageSize::new(10, 10), ImageSize::new(0, 10), ScaleMode::Fit);
        assert!(matches!(result, Err(JxlError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_crop_at_level_covers_window() {
        let crop = CropRect {
            x: 101,
            y: 3,
            width: 50,
            height: 7,
        };
        let level = crop_at_level(crop, ImageSize::new(400, 200), 2);
        assert_eq!(level.x, 25);
        assert_eq!(level.y, 0);
        // ceil(151/4) = 38, ceil(10/4) = 3
        assert_eq!(level.width, 13);
        assert_eq!(level.height, 3);
    }
}
