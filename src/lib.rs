#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod compositor;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod light;
pub mod pipeline;
pub mod placement;

// Stage internals: public for tools and tests, but considered unstable.
pub mod angle;
pub mod contact;
pub mod contact_shadow;
pub mod depth_warp;
pub mod distance;
pub mod falloff;
pub mod projector;

// --- High-level re-exports -------------------------------------------------

// Main entry points: synthesizer + request/response types.
pub use crate::error::ShadowError;
pub use crate::light::LightSettings;
pub use crate::pipeline::{ShadowOutputs, ShadowParams, ShadowRequest, ShadowSynthesizer};
pub use crate::placement::Anchor;

// Diagnostics returned by the synthesizer.
pub use crate::diagnostics::{Notice, PipelineTrace, SynthesisReport};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use shadow_synth::prelude::*;
///
/// # fn main() -> Result<(), ShadowError> {
/// let background = RgbaImage::from_pixel(400, 300, Rgba([230, 230, 225, 255]));
/// let subject = RgbaImage::from_pixel(100, 200, Rgba([40, 90, 160, 255]));
/// let mask = ImageF32::filled(100, 200, 1.0);
///
/// let synthesizer = ShadowSynthesizer::new(ShadowParams::default());
/// let report = synthesizer.process_with_diagnostics(&ShadowRequest {
///     background: &background,
///     subject: &subject,
///     mask: &mask,
///     depth: None,
///     light: LightSettings { angle_deg: 315.0, elevation_deg: 45.0 },
/// })?;
/// println!("{}", report.trace.summary());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{DepthMap, ImageF32, Mask, ShadowLayer};
    pub use crate::{
        Anchor, LightSettings, ShadowError, ShadowOutputs, ShadowParams, ShadowRequest,
        ShadowSynthesizer,
    };
    pub use ::image::{Rgba, RgbaImage};
}

// --- Stage-level API (for tools & advanced users) ---------------------------

pub mod stages {
    // Stage runners.
    pub use crate::compositor::{CompositeOutputs, Compositor, CompositorOptions};
    pub use crate::contact::{ContactLine, ContactLineEstimator, ContactOptions};
    pub use crate::contact_shadow::{ContactShadowOptions, ContactShadowRenderer};
    pub use crate::depth_warp::{DepthWarp, DepthWarpOptions, DepthWarpStats};
    pub use crate::distance::DistanceField;
    pub use crate::falloff::{FalloffFilter, FalloffOptions};
    pub use crate::light::{LightDirection, LightModel, LightOptions, ParameterAdjustment};
    pub use crate::placement::{PlacedSubject, Placement, PlacementOptions};
    pub use crate::projector::{
        Footprint, Projection, ProjectorOptions, RasterizedShadow, ShadowProjector,
    };

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        ContactStage, FalloffStage, InputDescriptor, LightStage, PlacementStage,
        ProjectionStage, StageTiming, TimingBreakdown,
    };
}
