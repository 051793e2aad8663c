//! Parameter types configuring the synthesis stages.
//!
//! Every stage owns its option struct; `ShadowParams` groups them together
//! with the two pipeline-level knobs that do not belong to a single stage.
//! All fields default, so a JSON config only needs the values it changes.

use crate::compositor::CompositorOptions;
use crate::contact::ContactOptions;
use crate::contact_shadow::ContactShadowOptions;
use crate::depth_warp::DepthWarpOptions;
use crate::falloff::FalloffOptions;
use crate::light::LightOptions;
use crate::placement::PlacementOptions;
use crate::projector::ProjectorOptions;
use serde::{Deserialize, Serialize};

/// Synthesizer-wide parameters.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ShadowParams {
    pub light: LightOptions,
    pub placement: PlacementOptions,
    pub contact: ContactOptions,
    pub projector: ProjectorOptions,
    pub contact_shadow: ContactShadowOptions,
    /// Opacity of the projected (cast) part before falloff.
    pub projection_opacity: f32,
    pub depth_warp: DepthWarpOptions,
    pub falloff: FalloffOptions,
    /// Remove the shadow where the subject itself stands.
    pub clear_under_subject: bool,
    pub compositor: CompositorOptions,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            light: LightOptions::default(),
            placement: PlacementOptions::default(),
            contact: ContactOptions::default(),
            projector: ProjectorOptions::default(),
            contact_shadow: ContactShadowOptions::default(),
            projection_opacity: 0.75,
            depth_warp: DepthWarpOptions::default(),
            falloff: FalloffOptions::default(),
            clear_under_subject: true,
            compositor: CompositorOptions::default(),
        }
    }
}
