//! Distance-graded falloff: turns the raw shadow into the final layer.
//!
//! Two effects grow with the distance `d` from the contact line:
//! - opacity attenuation `exp(-3 d / D)` (about 5 % left at `D`);
//! - penumbra blur whose sigma ramps linearly from 0 at the contact line to
//!   `max_blur_sigma_px` at `D` and stays there beyond.
//!
//! Spatially varying blur is realized with a small bank of uniformly blurred
//! copies ("bands") at evenly spaced sigmas, blended per pixel by distance.

pub mod filters;

pub use filters::{GaussianFilter, SeparableFilter};

use crate::distance::DistanceField;
use crate::image::{parallel, ImageF32, ImageView, ShadowLayer};
use serde::{Deserialize, Serialize};

/// Options of the falloff filter.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FalloffOptions {
    /// Distance `D` (px) over which the shadow fades and softens.
    pub falloff_distance_px: f32,
    /// Blur sigma reached at `D`.
    pub max_blur_sigma_px: f32,
    /// Number of blur bands (>= 2 for a soft ramp).
    pub blur_bands: usize,
}

impl Default for FalloffOptions {
    fn default() -> Self {
        Self {
            falloff_distance_px: 200.0,
            max_blur_sigma_px: 15.0,
            blur_bands: 6,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FalloffFilter {
    options: FalloffOptions,
}

impl FalloffFilter {
    pub fn new(options: FalloffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FalloffOptions {
        &self.options
    }

    fn distance_scale(&self) -> f32 {
        self.options.falloff_distance_px.max(1.0)
    }

    /// Opacity multiplier at distance `d`, in `[0, 1]`.
    #[inline]
    pub fn attenuation(&self, d: f32) -> f32 {
        (-3.0 * d.max(0.0) / self.distance_scale()).exp()
    }

    /// Blur sigma (px) at distance `d`.
    #[inline]
    pub fn blur_sigma_at(&self, d: f32) -> f32 {
        self.normalized_distance(d) * self.options.max_blur_sigma_px.max(0.0)
    }

    /// `clamp(d / D, 0, 1)`; infinite distances saturate at 1.
    #[inline]
    fn normalized_distance(&self, d: f32) -> f32 {
        if d.is_nan() {
            return 1.0;
        }
        (d / self.distance_scale()).clamp(0.0, 1.0)
    }

    /// Sigmas of the blur bands, evenly spaced over `0..=max_blur_sigma_px`.
    pub fn band_sigmas(&self) -> Vec<f32> {
        let n = self.options.blur_bands.max(1);
        if n == 1 {
            return vec![0.0];
        }
        let max_sigma = self.options.max_blur_sigma_px.max(0.0);
        (0..n)
            .map(|i| max_sigma * i as f32 / (n - 1) as f32)
            .collect()
    }

    /// Apply attenuation then the banded blur to `raw`.
    pub fn apply(&self, raw: &ImageF32, field: &DistanceField) -> ShadowLayer {
        debug_assert_eq!(raw.dims(), field.dims());
        let (w, h) = raw.dims();

        let mut attenuated = ImageF32::new(w, h);
        parallel::for_each_row_mut(&mut attenuated, |y, row| {
            let dist = field.distances.row(y);
            for ((dst, &v), &d) in row.iter_mut().zip(raw.row(y)).zip(dist) {
                *dst = v.clamp(0.0, 1.0) * self.attenuation(d);
            }
        });

        let sigmas = self.band_sigmas();
        if sigmas.len() == 1 {
            return attenuated;
        }
        let bands: Vec<ImageF32> = parallel::map_indices(sigmas.len(), |i| {
            filters::apply(&GaussianFilter::new(sigmas[i]), &attenuated)
        });

        let top = (bands.len() - 1) as f32;
        let mut out = ImageF32::new(w, h);
        parallel::for_each_row_mut(&mut out, |y, row| {
            let dist = field.distances.row(y);
            for (x, (dst, &d)) in row.iter_mut().zip(dist).enumerate() {
                let t = self.normalized_distance(d) * top;
                let lo = (t.floor() as usize).min(bands.len() - 1);
                let hi = (lo + 1).min(bands.len() - 1);
                let frac = t - lo as f32;
                let a = bands[lo].get(x, y);
                let b = bands[hi].get(x, y);
                *dst = (a + (b - a) * frac).clamp(0.0, 1.0);
            }
        });
        out
    }
}
