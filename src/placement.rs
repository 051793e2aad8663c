//! Placement of the subject cut-out on the background canvas.
//!
//! The subject RGBA and its mask are (optionally) downscaled to fit, then
//! pasted at the chosen anchor into background-sized buffers. Everything
//! after this stage works in background coordinates.

use crate::error::ShadowError;
use crate::image::{ImageF32, Mask};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the subject stands on the background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Horizontally centred, resting on the bottom margin.
    #[default]
    BottomCenter,
    BottomLeft,
    BottomRight,
    /// Explicit top-left corner of the subject, in background pixels.
    Custom { x: i64, y: i64 },
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::BottomCenter => f.write_str("bottom-center"),
            Anchor::BottomLeft => f.write_str("bottom-left"),
            Anchor::BottomRight => f.write_str("bottom-right"),
            Anchor::Custom { x, y } => write!(f, "custom({x},{y})"),
        }
    }
}

impl FromStr for Anchor {
    type Err = ShadowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "bottom-center" | "bottom-centre" => return Ok(Anchor::BottomCenter),
            "bottom-left" => return Ok(Anchor::BottomLeft),
            "bottom-right" => return Ok(Anchor::BottomRight),
            _ => {}
        }
        let inner = s
            .strip_prefix("custom(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ShadowError::Config(format!("unknown anchor '{s}'")))?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<i64>());
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y)), None) => Ok(Anchor::Custom { x, y }),
            _ => Err(ShadowError::Config(format!(
                "custom anchor expects two integers, got '{s}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PlacementOptions {
    pub anchor: Anchor,
    /// Gap (px) kept to the background borders by the bottom anchors.
    pub margin_px: u32,
    /// Downscale subjects that do not fit inside the margins.
    pub fit: bool,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            anchor: Anchor::BottomCenter,
            margin_px: 0,
            fit: true,
        }
    }
}

/// Subject and mask on the background canvas.
#[derive(Clone, Debug)]
pub struct PlacedSubject {
    /// Background-sized RGBA, transparent outside the subject.
    pub rgba: RgbaImage,
    /// Background-sized coverage mask.
    pub mask: Mask,
    /// Top-left corner of the (scaled) subject; may be negative.
    pub offset: (i64, i64),
    /// Size of the subject after scaling.
    pub size: (u32, u32),
    /// Uniform scale applied by `fit` (1 when untouched).
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Placement {
    options: PlacementOptions,
}

impl Placement {
    pub fn new(options: PlacementOptions) -> Self {
        Self { options }
    }

    /// Paste `subject` and `mask` (same size) onto a `bg_w × bg_h` canvas.
    pub fn place(&self, bg_w: u32, bg_h: u32, subject: &RgbaImage, mask: &Mask) -> PlacedSubject {
        debug_assert_eq!(
            (subject.width() as usize, subject.height() as usize),
            mask.dims()
        );
        let (sw, sh) = subject.dimensions();
        let margin = self.options.margin_px;
        let avail_w = bg_w.saturating_sub(margin.saturating_mul(2)).max(1);
        let avail_h = bg_h.saturating_sub(margin.saturating_mul(2)).max(1);

        let scale = if self.options.fit && (sw > avail_w || sh > avail_h) {
            (avail_w as f32 / sw as f32).min(avail_h as f32 / sh as f32)
        } else {
            1.0
        };
        let (rgba, small_mask) = if scale < 1.0 {
            let nw = ((sw as f32 * scale).round() as u32).clamp(1, avail_w);
            let nh = ((sh as f32 * scale).round() as u32).clamp(1, avail_h);
            (
                imageops::resize(subject, nw, nh, FilterType::Triangle),
                resize_mask(mask, nw, nh),
            )
        } else {
            (subject.clone(), mask.clone())
        };
        let (w, h) = rgba.dimensions();

        let (bw, bh, m) = (bg_w as i64, bg_h as i64, margin as i64);
        let (w_i, h_i) = (w as i64, h as i64);
        let offset = match self.options.anchor {
            Anchor::BottomCenter => ((bw - w_i) / 2, bh - m - h_i),
            Anchor::BottomLeft => (m, bh - m - h_i),
            Anchor::BottomRight => (bw - m - w_i, bh - m - h_i),
            Anchor::Custom { x, y } => (x, y),
        };

        let mut canvas = RgbaImage::new(bg_w, bg_h);
        let mut canvas_mask = ImageF32::new(bg_w as usize, bg_h as usize);
        for sy in 0..h {
            let ty = offset.1 + sy as i64;
            if ty < 0 || ty >= bh {
                continue;
            }
            for sx in 0..w {
                let tx = offset.0 + sx as i64;
                if tx < 0 || tx >= bw {
                    continue;
                }
                canvas.put_pixel(tx as u32, ty as u32, *rgba.get_pixel(sx, sy));
                let cov = small_mask.get(sx as usize, sy as usize);
                let cov = if cov.is_finite() { cov.clamp(0.0, 1.0) } else { 0.0 };
                canvas_mask.set(tx as usize, ty as usize, cov);
            }
        }

        PlacedSubject {
            rgba: canvas,
            mask: canvas_mask,
            offset,
            size: (w, h),
            scale,
        }
    }
}

fn resize_mask(mask: &Mask, w: u32, h: u32) -> Mask {
    let src: Option<ImageBuffer<Luma<f32>, Vec<f32>>> =
        ImageBuffer::from_raw(mask.w as u32, mask.h as u32, mask.data.clone());
    let Some(src) = src else {
        return ImageF32::new(w as usize, h as usize);
    };
    let resized = imageops::resize(&src, w, h, FilterType::Triangle);
    ImageF32::from_vec(w as usize, h as usize, resized.into_raw())
        .unwrap_or_else(|| ImageF32::new(w as usize, h as usize))
}
