//! Euclidean distance field to the contact line.
//!
//! Every canvas pixel stores the distance (pixels, centre to centre) to the
//! nearest contact point. The field is exact: it uses the separable
//! lower-envelope-of-parabolas transform (Felzenszwalb & Huttenlocher), one
//! pass over rows followed by one pass over columns, O(W·H) overall.
//! With an empty contact line every sample is `+∞`.

use crate::contact::ContactLine;
use crate::image::{parallel, ImageF32, ImageView};

/// Squared distance assigned to pixels that are not seeds.
const FAR: f64 = 1e20;
/// Squared distances at or above this are reported as infinite.
const FAR_CUTOFF: f64 = 1e19;

/// Per-pixel distance to the nearest contact point.
#[derive(Clone, Debug)]
pub struct DistanceField {
    pub distances: ImageF32,
}

impl DistanceField {
    /// Build the field for `contact` on its own canvas size.
    pub fn from_contact_line(contact: &ContactLine) -> Self {
        let (w, h) = (contact.width, contact.height);
        let seeds: Vec<(usize, usize)> = contact
            .points()
            .filter(|&(x, y)| x < w && y < h)
            .collect();
        if seeds.is_empty() {
            return Self {
                distances: ImageF32::filled(w, h, f32::INFINITY),
            };
        }

        let mut grid = vec![FAR; w * h];
        for &(x, y) in &seeds {
            grid[y * w + x] = 0.0;
        }

        // rows: seeds are sparse, but rows without any seed stay FAR exactly
        let row_pass: Vec<Vec<f64>> = parallel::map_indices(h, |y| {
            let src = &grid[y * w..(y + 1) * w];
            if src.iter().all(|&v| v >= FAR) {
                return src.to_vec();
            }
            let mut out = vec![0.0; w];
            squared_edt_1d(src, &mut out);
            out
        });
        for (y, row) in row_pass.into_iter().enumerate() {
            grid[y * w..(y + 1) * w].copy_from_slice(&row);
        }

        let col_pass: Vec<Vec<f64>> = parallel::map_indices(w, |x| {
            let src: Vec<f64> = (0..h).map(|y| grid[y * w + x]).collect();
            let mut out = vec![0.0; h];
            squared_edt_1d(&src, &mut out);
            out
        });

        let mut distances = ImageF32::new(w, h);
        for (x, col) in col_pass.iter().enumerate() {
            for (y, &d2) in col.iter().enumerate() {
                let d = if d2 >= FAR_CUTOFF {
                    f32::INFINITY
                } else {
                    d2.sqrt() as f32
                };
                distances.set(x, y, d);
            }
        }
        Self { distances }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.distances.get(x, y)
    }

    pub fn dims(&self) -> (usize, usize) {
        self.distances.dims()
    }

    /// Largest finite distance in the field (0 when none is finite).
    pub fn max_finite(&self) -> f32 {
        self.distances
            .rows()
            .flat_map(|r| r.iter().copied())
            .filter(|d| d.is_finite())
            .fold(0.0, f32::max)
    }
}

/// 1D squared distance transform of the sampled function `f`.
///
/// `out[q] = min_p (q - p)^2 + f[p]`, computed from the lower envelope of the
/// parabolas rooted at each sample.
fn squared_edt_1d(f: &[f64], out: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf))
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            // z[0] is -inf, so k never underflows
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - v[k] as f64;
        *slot = d * d + f[v[k]];
    }
}
