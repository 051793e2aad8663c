//! Separable 1D filters used for the penumbra blur bands.
use crate::image::{parallel, ImageF32, ImageView};

/// Trait implemented by separable 1D filters. The taps are applied
/// horizontally then vertically with replicated borders.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to be
    /// symmetric around its centre, but the implementation does not rely on it.
    fn taps(&self) -> &[f32];
}

/// Normalised sampled Gaussian with radius `ceil(3σ)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianFilter {
    sigma: f32,
    taps: Vec<f32>,
}

impl GaussianFilter {
    /// Build the kernel for `sigma` (pixels). `sigma <= 0` yields the
    /// identity kernel `[1]`.
    pub fn new(sigma: f32) -> Self {
        if !(sigma > 0.0) {
            return Self {
                sigma: 0.0,
                taps: vec![1.0],
            };
        }
        let radius = (3.0 * sigma).ceil() as i32;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (-radius..=radius)
            .map(|k| (-((k * k) as f32) / denom).exp())
            .collect();
        let total: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= total;
        }
        Self { sigma, taps }
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn is_identity(&self) -> bool {
        self.taps.len() == 1
    }
}

impl SeparableFilter for GaussianFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Apply `filter` separably to `src`, returning a new image.
pub fn apply(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    if src.is_empty() || taps.len() <= 1 {
        let mut out = src.clone();
        if let Some(&gain) = taps.first() {
            out.data.iter_mut().for_each(|v| *v *= gain);
        }
        return out;
    }
    let radius = taps.len() / 2;
    let (w, h) = (src.w, src.h);

    let mut horiz = ImageF32::new(w, h);
    parallel::for_each_row_mut(&mut horiz, |y, dst| {
        filter_row(src.row(y), dst, taps, radius);
    });

    let mut out = ImageF32::new(w, h);
    parallel::for_each_row_mut(&mut out, |y, dst| {
        dst.iter_mut().for_each(|v| *v = 0.0);
        for (k, &tap) in taps.iter().enumerate() {
            let sy = clamp_index(y as isize + k as isize - radius as isize, h);
            for (d, &s) in dst.iter_mut().zip(horiz.row(sy)) {
                *d += tap * s;
            }
        }
    });
    out
}

fn filter_row(row: &[f32], out: &mut [f32], taps: &[f32], radius: usize) {
    let n = row.len();
    for (x, dst_px) in out.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (k, &tap) in taps.iter().enumerate() {
            let idx = clamp_index(x as isize + k as isize - radius as isize, n);
            acc += tap * row[idx];
        }
        *dst_px = acc;
    }
}

fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 {
        return 0;
    }
    if idx < 0 {
        0
    } else if (idx as usize) >= upper {
        upper - 1
    } else {
        idx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_taps_are_normalized_and_symmetric() {
        let g = GaussianFilter::new(2.0);
        let taps = g.taps();
        assert_eq!(taps.len(), 13);
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..taps.len() / 2 {
            assert!((taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-7);
        }
        assert!(GaussianFilter::new(0.0).is_identity());
    }

    #[test]
    fn blur_preserves_constant_and_bounds() {
        let flat = ImageF32::filled(9, 7, 0.4);
        let out = apply(&GaussianFilter::new(1.5), &flat);
        assert!(out.data.iter().all(|&v| (v - 0.4).abs() < 1e-5));

        let mut spike = ImageF32::new(15, 15);
        spike.set(7, 7, 1.0);
        let blurred = apply(&GaussianFilter::new(1.0), &spike);
        assert!(blurred.max_value() < 1.0);
        assert!(blurred.get(7, 7) > blurred.get(8, 7));
        assert!((blurred.sum() - 1.0).abs() < 1e-4);
    }
}
