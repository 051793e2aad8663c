//! Final image assembly: composite, shadow-only layer and mask debug view.
//!
//! Blending is straight-alpha "over". A source pixel with zero alpha leaves
//! the destination bytes untouched, so an all-zero shadow layer plus an
//! invisible subject reproduces the background exactly.

use crate::image::io::unit_to_u8;
use crate::image::{Mask, ShadowLayer};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Fill of the "no subject found" debug image.
const NO_SUBJECT_FILL: [u8; 4] = [40, 40, 40, 255];
const DEBUG_RED: [u8; 4] = [255, 0, 0, 255];

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositorOptions {
    /// Tint of the shadow in the composite (near-black).
    pub shadow_color: [u8; 3],
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            shadow_color: [12, 12, 16],
        }
    }
}

/// The three rendered images, all background-sized.
#[derive(Clone, Debug)]
pub struct CompositeOutputs {
    pub composite: RgbaImage,
    pub shadow_only: RgbaImage,
    pub mask_debug: RgbaImage,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor {
    options: CompositorOptions,
}

impl Compositor {
    pub fn new(options: CompositorOptions) -> Self {
        Self { options }
    }

    /// Compose the outputs. `subject` and `mask` must already be placed on
    /// the background canvas; the subject is drawn with
    /// `min(alpha, mask)` so opaque RGB cut-outs still follow the mask.
    pub fn compose(
        &self,
        background: &RgbaImage,
        subject: &RgbaImage,
        layer: &ShadowLayer,
        mask: &Mask,
    ) -> CompositeOutputs {
        let (w, h) = background.dimensions();
        debug_assert_eq!(subject.dimensions(), (w, h));
        debug_assert_eq!(layer.dims(), (w as usize, h as usize));
        debug_assert_eq!(mask.dims(), (w as usize, h as usize));

        let [sr, sg, sb] = self.options.shadow_color;
        let mut composite = background.clone();
        for (x, y, px) in composite.enumerate_pixels_mut() {
            let (xi, yi) = (x as usize, y as usize);
            let shadow_alpha = layer.get(xi, yi).clamp(0.0, 1.0);
            *px = over(*px, Rgba([sr, sg, sb, 255]), shadow_alpha);

            let src = subject.get_pixel(x, y);
            let coverage = mask.get(xi, yi).clamp(0.0, 1.0);
            let subject_alpha = (src.0[3] as f32 / 255.0).min(coverage);
            *px = over(*px, *src, subject_alpha);
        }

        CompositeOutputs {
            composite,
            shadow_only: render_shadow_only(layer),
            mask_debug: render_mask_debug(mask),
        }
    }

    /// Outputs for a request without a usable subject.
    pub fn compose_empty(&self, background: &RgbaImage) -> CompositeOutputs {
        let (w, h) = background.dimensions();
        CompositeOutputs {
            composite: background.clone(),
            shadow_only: RgbaImage::new(w, h),
            mask_debug: render_no_subject(w, h),
        }
    }
}

/// Straight-alpha "over" of `src` (with effective opacity `alpha`) onto `dst`.
fn over(dst: Rgba<u8>, src: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    if !(alpha > 0.0) {
        return dst;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = src.0[c] as f32;
        let d = dst.0[c] as f32;
        let v = (s * alpha + d * da * (1.0 - alpha)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = unit_to_u8(out_a);
    Rgba(out)
}

/// Black RGBA layer whose alpha is the shadow opacity.
pub fn render_shadow_only(layer: &ShadowLayer) -> RgbaImage {
    RgbaImage::from_fn(layer.w as u32, layer.h as u32, |x, y| {
        Rgba([0, 0, 0, unit_to_u8(layer.get(x as usize, y as usize))])
    })
}

/// Mask in the red channel over an opaque black canvas; a mask without any
/// coverage renders the "no subject" marker instead.
pub fn render_mask_debug(mask: &Mask) -> RgbaImage {
    if mask.max_value() <= 0.0 {
        return render_no_subject(mask.w as u32, mask.h as u32);
    }
    RgbaImage::from_fn(mask.w as u32, mask.h as u32, |x, y| {
        let v = mask.get(x as usize, y as usize);
        Rgba([unit_to_u8(v), 0, 0, 255])
    })
}

/// Dark grey canvas crossed by a red "X".
pub fn render_no_subject(w: u32, h: u32) -> RgbaImage {
    let (wf, hf) = (w as f32, h as f32);
    let diag = (wf * wf + hf * hf).sqrt().max(1.0);
    let half_thickness = (wf.min(hf) / 100.0).max(1.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        // distance to the two diagonals of the canvas
        let d1 = (px * hf - py * wf).abs() / diag;
        let d2 = ((wf - px) * hf - py * wf).abs() / diag;
        if d1.min(d2) <= half_thickness {
            Rgba(DEBUG_RED)
        } else {
            Rgba(NO_SUBJECT_FILL)
        }
    })
}
