//! Shadow synthesis pipeline.
//!
//! The [`ShadowSynthesizer`] exposes a simple API: hand it a background, a
//! subject cut-out with its mask, an optional depth map and the light
//! parameters, and get back the composite, the shadow-only layer and the mask
//! debug view.
//!
//! Typical usage:
//! ```no_run
//! use shadow_synth::{LightSettings, ShadowParams, ShadowRequest, ShadowSynthesizer};
//! use shadow_synth::image::io::{load_rgba, mask_from_alpha};
//! use std::path::Path;
//!
//! # fn main() -> shadow_synth::error::Result<()> {
//! let background = load_rgba(Path::new("background.jpg"))?;
//! let subject = load_rgba(Path::new("subject.png"))?;
//! let mask = mask_from_alpha(&subject);
//! let synthesizer = ShadowSynthesizer::new(ShadowParams::default());
//! let outputs = synthesizer.process(&ShadowRequest {
//!     background: &background,
//!     subject: &subject,
//!     mask: &mask,
//!     depth: None,
//!     light: LightSettings { angle_deg: 45.0, elevation_deg: 30.0 },
//! })?;
//! outputs.save(Path::new("out"))?;
//! # Ok(())
//! # }
//! ```

// Stages
// - Validate: reject empty images and misaligned mask / depth buffers.
// - Light: resolve (angle, elevation) into direction + length factor.
// - Placement: fit and anchor the subject on the background canvas.
// - Contact: per-column feet line, then its Euclidean distance field.
// - Projection: footprints along the light, optional depth warp, raster.
// - Contact shadow: exponential band around the feet line.
// - Falloff: max-combine, distance attenuation and banded blur.
// - Compose: composite, shadow-only and mask debug images.

pub mod params;
mod validate;

pub use params::ShadowParams;

use crate::compositor::{CompositeOutputs, Compositor};
use crate::contact::ContactLineEstimator;
use crate::contact_shadow::ContactShadowRenderer;
use crate::depth_warp::DepthWarp;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{
    ContactStage, FalloffStage, InputDescriptor, LightStage, Notice, PipelineTrace,
    PlacementStage, ProjectionStage, SynthesisReport,
};
use crate::distance::DistanceField;
use crate::error::Result;
use crate::falloff::FalloffFilter;
use crate::image::io::save_rgba_png;
use crate::image::{parallel, DepthMap, ImageF32, ImageView, Mask, ShadowLayer};
use crate::light::{LightModel, LightSettings};
use crate::placement::Placement;
use crate::projector::ShadowProjector;
use image::RgbaImage;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File names written by [`ShadowOutputs::save`].
pub const COMPOSITE_FILE: &str = "composite.png";
pub const SHADOW_ONLY_FILE: &str = "shadow_only.png";
pub const MASK_DEBUG_FILE: &str = "mask_debug.png";

/// One synthesis request. Buffers are borrowed; nothing is retained.
#[derive(Clone, Copy, Debug)]
pub struct ShadowRequest<'a> {
    pub background: &'a RgbaImage,
    /// Subject cut-out; `mask` must have the same size.
    pub subject: &'a RgbaImage,
    pub mask: &'a Mask,
    /// Optional depth map covering the background 1:1.
    pub depth: Option<&'a DepthMap>,
    pub light: LightSettings,
}

/// Images produced for one request, all background-sized.
#[derive(Clone, Debug)]
pub struct ShadowOutputs {
    pub composite: RgbaImage,
    /// Black RGBA whose alpha is the shadow opacity.
    pub shadow_only: RgbaImage,
    pub mask_debug: RgbaImage,
    /// Final shadow opacity per pixel.
    pub shadow_layer: ShadowLayer,
}

/// Paths written by [`ShadowOutputs::save`].
#[derive(Clone, Debug)]
pub struct SavedOutputs {
    pub composite: PathBuf,
    pub shadow_only: PathBuf,
    pub mask_debug: PathBuf,
}

impl ShadowOutputs {
    fn from_composite(images: CompositeOutputs, shadow_layer: ShadowLayer) -> Self {
        Self {
            composite: images.composite,
            shadow_only: images.shadow_only,
            mask_debug: images.mask_debug,
            shadow_layer,
        }
    }

    /// Write `composite.png`, `shadow_only.png` and `mask_debug.png` to `dir`.
    pub fn save(&self, dir: &Path) -> Result<SavedOutputs> {
        let saved = SavedOutputs {
            composite: dir.join(COMPOSITE_FILE),
            shadow_only: dir.join(SHADOW_ONLY_FILE),
            mask_debug: dir.join(MASK_DEBUG_FILE),
        };
        save_rgba_png(&self.composite, &saved.composite)?;
        save_rgba_png(&self.shadow_only, &saved.shadow_only)?;
        save_rgba_png(&self.mask_debug, &saved.mask_debug)?;
        Ok(saved)
    }
}

/// Shadow synthesizer orchestrating every stage of a request.
///
/// Processing takes `&self`; requests are independent and may run
/// concurrently on a shared synthesizer.
#[derive(Clone, Debug, Default)]
pub struct ShadowSynthesizer {
    params: ShadowParams,
}

impl ShadowSynthesizer {
    /// Create a synthesizer with the supplied parameters.
    pub fn new(params: ShadowParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ShadowParams {
        &self.params
    }

    /// Update the parameters used by subsequent requests.
    pub fn set_params(&mut self, params: ShadowParams) {
        self.params = params;
    }

    /// Run the pipeline, returning only the rendered outputs.
    pub fn process(&self, request: &ShadowRequest<'_>) -> Result<ShadowOutputs> {
        Ok(self.process_with_diagnostics(request)?.outputs)
    }

    /// Run the pipeline and return the outputs with a detailed trace.
    pub fn process_with_diagnostics(&self, request: &ShadowRequest<'_>) -> Result<SynthesisReport> {
        validate::validate(request)?;
        let params = &self.params;
        let (bg_w, bg_h) = request.background.dimensions();
        let (w, h) = (bg_w as usize, bg_h as usize);
        debug!(
            "ShadowSynthesizer::process start w={} h={} subject={}x{} depth={}",
            w,
            h,
            request.subject.width(),
            request.subject.height(),
            request.depth.is_some()
        );
        let total_start = Instant::now();

        let stage_start = Instant::now();
        let light = LightModel::new(params.light).resolve_settings(&request.light);
        let input = InputDescriptor {
            width: w,
            height: h,
            subject_width: request.subject.width() as usize,
            subject_height: request.subject.height() as usize,
            has_depth: request.depth.is_some(),
        };
        let mut trace = PipelineTrace::new(input, LightStage::from_direction(&light));
        trace.notices.extend(
            light
                .adjustments
                .iter()
                .map(|&adjustment| Notice::DegenerateParameter { adjustment }),
        );
        trace.timings.lap("light", stage_start);

        let stage_start = Instant::now();
        let placed = Placement::new(params.placement).place(bg_w, bg_h, request.subject, request.mask);
        trace.placement = Some(PlacementStage::new(params.placement.anchor.to_string(), &placed));
        trace.timings.lap("placement", stage_start);

        let compositor = Compositor::new(params.compositor);
        if placed.mask.max_value() <= 0.0 {
            debug!("ShadowSynthesizer::process empty mask -> background passthrough");
            trace.notices.push(Notice::EmptyMask);
            let outputs = ShadowOutputs::from_composite(
                compositor.compose_empty(request.background),
                ImageF32::new(w, h),
            );
            trace.timings.total_ms = elapsed_ms(total_start);
            return Ok(SynthesisReport { outputs, trace });
        }

        let stage_start = Instant::now();
        let estimator = ContactLineEstimator::new(params.contact);
        let contact = estimator.estimate(&placed.mask);
        let field = DistanceField::from_contact_line(&contact);
        trace.contact = Some(ContactStage::new(estimator.options(), &contact));
        let contact_ms = trace.timings.lap("contact", stage_start);
        debug!(
            "ShadowSynthesizer::process contact columns={} lowest={:?} ms={:.3}",
            contact.contact_columns(),
            contact.lowest_row(),
            contact_ms
        );

        let stage_start = Instant::now();
        let projection = ShadowProjector::new(params.projector).project(&placed.mask, &contact, &light);
        let (projection, warp_stats) =
            DepthWarp::new(params.depth_warp).warp_with_stats(&projection, request.depth, &light);
        let raster = projection.rasterize();
        if raster.clipped_footprints > 0 {
            trace.notices.push(Notice::OutOfBoundsProjection {
                clipped_footprints: raster.clipped_footprints,
            });
        }
        trace.projection = Some(ProjectionStage::new(&projection, &raster));
        trace.depth_warp = Some(warp_stats);
        let projection_ms = trace.timings.lap("projection", stage_start);
        debug!(
            "ShadowSynthesizer::process projection footprints={} reach={:.1} clipped={} warp_max={:.2} ms={:.3}",
            projection.footprints.len(),
            projection.reach_px,
            raster.clipped_footprints,
            warp_stats.max_offset_px,
            projection_ms
        );

        let stage_start = Instant::now();
        let contact_layer = ContactShadowRenderer::new(params.contact_shadow).render_field(&field);
        trace.timings.lap("contact_shadow", stage_start);

        let stage_start = Instant::now();
        let opacity = params.projection_opacity.clamp(0.0, 1.0);
        let mut raw = ImageF32::new(w, h);
        parallel::for_each_row_mut(&mut raw, |y, row| {
            let cast = raster.coverage.row(y);
            let near = contact_layer.row(y);
            for ((dst, &c), &n) in row.iter_mut().zip(cast).zip(near) {
                *dst = (c * opacity).max(n);
            }
        });
        let falloff = FalloffFilter::new(params.falloff);
        let mut layer = falloff.apply(&raw, &field);
        if params.clear_under_subject {
            clear_under_subject(&mut layer, &placed.mask);
        }
        trace.falloff = Some(FalloffStage::new(&falloff, &layer));
        let falloff_ms = trace.timings.lap("falloff", stage_start);
        debug!(
            "ShadowSynthesizer::process falloff max_opacity={:.3} ms={:.3}",
            layer.max_value(),
            falloff_ms
        );

        let stage_start = Instant::now();
        let images = compositor.compose(request.background, &placed.rgba, &layer, &placed.mask);
        trace.timings.lap("compose", stage_start);

        trace.timings.total_ms = elapsed_ms(total_start);
        debug!("ShadowSynthesizer::process done {}", trace.summary());
        Ok(SynthesisReport {
            outputs: ShadowOutputs::from_composite(images, layer),
            trace,
        })
    }
}

/// Scale the layer by `1 - coverage` so no shadow sits under the subject.
fn clear_under_subject(layer: &mut ShadowLayer, mask: &Mask) {
    parallel::for_each_row_mut(layer, |y, row| {
        for (v, &m) in row.iter_mut().zip(mask.row(y)) {
            *v *= 1.0 - m.clamp(0.0, 1.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShadowError;
    use image::Rgba;

    fn inputs() -> (RgbaImage, RgbaImage, Mask) {
        let background = RgbaImage::from_pixel(120, 90, Rgba([220, 220, 210, 255]));
        let subject = RgbaImage::from_pixel(20, 40, Rgba([30, 60, 200, 255]));
        let mask = ImageF32::filled(20, 40, 1.0);
        (background, subject, mask)
    }

    #[test]
    fn synthesizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShadowSynthesizer>();
    }

    #[test]
    fn mask_must_match_subject() {
        let (background, subject, _) = inputs();
        let mask = ImageF32::new(19, 40);
        let err = ShadowSynthesizer::default()
            .process(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &mask,
                depth: None,
                light: LightSettings::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ShadowError::MaskDimensionMismatch { mask_w: 19, .. }));
    }

    #[test]
    fn depth_must_cover_background() {
        let (background, subject, mask) = inputs();
        let depth = ImageF32::new(60, 45);
        let err = ShadowSynthesizer::default()
            .process(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &mask,
                depth: Some(&depth),
                light: LightSettings::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ShadowError::DepthDimensionMismatch { .. }));
    }

    #[test]
    fn padded_planes_are_rejected() {
        let (background, subject, mask) = inputs();
        let padded = |w: usize, h: usize| ImageF32 {
            w,
            h,
            stride: w + 1,
            data: vec![1.0; w * h],
        };
        let synthesizer = ShadowSynthesizer::default();
        let padded_mask = padded(20, 40);
        let err = synthesizer
            .process(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &padded_mask,
                depth: None,
                light: LightSettings::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ShadowError::InvalidInput(msg) if msg.contains("mask stride")));

        let padded_depth = padded(120, 90);
        let err = synthesizer
            .process(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &mask,
                depth: Some(&padded_depth),
                light: LightSettings::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ShadowError::InvalidInput(msg) if msg.contains("depth stride")));

        let short = ImageF32 {
            data: vec![1.0; 20 * 40 - 1],
            ..mask.clone()
        };
        let err = synthesizer
            .process(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &short,
                depth: None,
                light: LightSettings::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ShadowError::InvalidInput(msg) if msg.contains("buffer length")));
    }

    #[test]
    fn empty_background_is_invalid() {
        let (_, subject, mask) = inputs();
        let background = RgbaImage::new(0, 10);
        let err = ShadowSynthesizer::default()
            .process(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &mask,
                depth: None,
                light: LightSettings::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ShadowError::InvalidInput(_)));
    }

    #[test]
    fn trace_records_every_stage() {
        let (background, subject, mask) = inputs();
        // up and to the right, short enough to stay on the canvas
        let light = LightSettings {
            angle_deg: 315.0,
            elevation_deg: 45.0,
        };
        let report = ShadowSynthesizer::default()
            .process_with_diagnostics(&ShadowRequest {
                background: &background,
                subject: &subject,
                mask: &mask,
                depth: None,
                light,
            })
            .expect("process");
        let labels: Vec<&str> = report
            .trace
            .timings
            .stages
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(
            labels,
            ["light", "placement", "contact", "projection", "contact_shadow", "falloff", "compose"]
        );
        assert!(report.trace.notices.is_empty());
        assert_eq!(report.trace.contact.as_ref().map(|c| c.contact_columns), Some(20));
        assert_eq!(report.trace.depth_warp.map(|d| d.applied), Some(false));
        assert_eq!(report.outputs.composite.dimensions(), (120, 90));
        // no shadow under the subject itself
        assert_eq!(report.outputs.shadow_layer.get(60, 70), 0.0);
    }
}
