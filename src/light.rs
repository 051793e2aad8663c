//! Light model: turns the user's (angle, elevation) pair into projection
//! parameters.
//!
//! - `dir` is the unit shadow direction in the image plane (x right, y down;
//!   0° points right, angles grow clockwise on screen).
//! - `length_factor = cot(elevation)` scales a point's height above the
//!   contact line into its displacement along `dir`: 1 at 45°, 0 at 90°,
//!   and large but finite near the horizon thanks to the elevation clamp.
//!
//! Out-of-range inputs never fail; every adjustment is recorded on the
//! returned [`LightDirection`] so callers can observe the recovery.

use crate::angle::{image_direction, normalize_degrees};
use log::{debug, warn};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Raw light parameters as supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    /// Compass direction in degrees; any real value is accepted.
    pub angle_deg: f32,
    /// Elevation above the horizon in degrees, valid range (0, 90].
    pub elevation_deg: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            angle_deg: 45.0,
            elevation_deg: 30.0,
        }
    }
}

/// Options of the light model.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LightOptions {
    /// Elevations at or below zero clamp to this value (degrees).
    pub min_elevation_deg: f32,
}

impl Default for LightOptions {
    fn default() -> Self {
        Self {
            min_elevation_deg: 1.0,
        }
    }
}

/// A recovered degenerate light parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ParameterAdjustment {
    /// The angle was NaN or infinite and was replaced by 0°.
    AngleNonFinite,
    /// The elevation was clamped into `[min_elevation, 90]`.
    ElevationClamped { from: f32, to: f32 },
}

/// Resolved light direction consumed by the projector and the depth warp.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightDirection {
    /// Normalized angle in [0, 360).
    pub angle_deg: f32,
    /// Clamped elevation in [min_elevation, 90].
    pub elevation_deg: f32,
    /// Unit shadow direction in image coordinates.
    pub dir: Vector2<f32>,
    /// Displacement per pixel of height (cotangent of the elevation).
    pub length_factor: f32,
    pub adjustments: Vec<ParameterAdjustment>,
}

impl LightDirection {
    /// Displacement vector of a point `height` pixels above the contact line.
    #[inline]
    pub fn displacement(&self, height: f32) -> Vector2<f32> {
        self.dir * (height * self.length_factor)
    }

    pub fn was_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

/// Stateless resolver from user parameters to [`LightDirection`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LightModel {
    options: LightOptions,
}

impl LightModel {
    pub fn new(options: LightOptions) -> Self {
        Self { options }
    }

    /// Resolve `(angle, elevation)` into a direction and a length factor.
    pub fn resolve(&self, angle_deg: f32, elevation_deg: f32) -> LightDirection {
        let mut adjustments = Vec::new();

        let angle = if angle_deg.is_finite() {
            let norm = normalize_degrees(angle_deg);
            if norm != angle_deg {
                debug!("LightModel::resolve angle {angle_deg} normalized to {norm}");
            }
            norm
        } else {
            adjustments.push(ParameterAdjustment::AngleNonFinite);
            0.0
        };

        let min_elevation = self.options.min_elevation_deg.clamp(f32::EPSILON, 90.0);
        let elevation = if elevation_deg.is_nan() {
            90.0
        } else {
            elevation_deg.clamp(min_elevation, 90.0)
        };
        // NaN != NaN, so a NaN input is always recorded
        if elevation != elevation_deg {
            adjustments.push(ParameterAdjustment::ElevationClamped {
                from: elevation_deg,
                to: elevation,
            });
        }

        for adj in &adjustments {
            warn!("LightModel::resolve adjusted degenerate parameter: {adj:?}");
        }

        let rad = elevation.to_radians();
        let length_factor = (rad.cos() / rad.sin()).max(0.0);

        LightDirection {
            angle_deg: angle,
            elevation_deg: elevation,
            dir: image_direction(angle),
            length_factor,
            adjustments,
        }
    }

    pub fn resolve_settings(&self, settings: &LightSettings) -> LightDirection {
        self.resolve(settings.angle_deg, settings.elevation_deg)
    }
}
