//! Contact shadow: a tight, dark occlusion band hugging the feet line.
//!
//! Intensity decays exponentially with the Euclidean distance to the nearest
//! contact point, `I0 · exp(-d / tau)`. Because the distance is taken to the
//! actual per-column contact points, the band follows the silhouette's
//! footprint rather than a single anchor.

use crate::contact::ContactLine;
use crate::distance::DistanceField;
use crate::image::{parallel, ImageF32, ImageView};
use serde::{Deserialize, Serialize};

/// Options of the contact shadow.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactShadowOptions {
    /// Peak darkness `I0` at the contact line, in `[0, 1]`.
    pub intensity: f32,
    /// Decay length `tau` in pixels; small values give a tight shadow.
    pub tau_px: f32,
}

impl Default for ContactShadowOptions {
    fn default() -> Self {
        Self {
            intensity: 0.95,
            tau_px: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ContactShadowRenderer {
    options: ContactShadowOptions,
}

impl ContactShadowRenderer {
    pub fn new(options: ContactShadowOptions) -> Self {
        Self { options }
    }

    /// Intensity at distance `d` from the contact line.
    #[inline]
    pub fn intensity_at(&self, d: f32) -> f32 {
        let i0 = self.options.intensity.clamp(0.0, 1.0);
        let tau = self.options.tau_px.max(1e-3);
        i0 * (-d.max(0.0) / tau).exp()
    }

    /// Render the contact shadow of `contact` on the canvas it was estimated on.
    pub fn render(&self, contact: &ContactLine) -> ImageF32 {
        self.render_field(&DistanceField::from_contact_line(contact))
    }

    /// Render from a precomputed distance field.
    pub fn render_field(&self, field: &DistanceField) -> ImageF32 {
        let (w, h) = field.dims();
        let mut out = ImageF32::new(w, h);
        parallel::for_each_row_mut(&mut out, |y, row| {
            for (px, &d) in row.iter_mut().zip(field.distances.row(y)) {
                *px = self.intensity_at(d);
            }
        });
        out
    }
}
