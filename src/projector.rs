//! Shadow projection: maps subject pixels onto the shadow plane.
//!
//! Geometry
//! - Each column `x` with contact row `y_c` has its ground line at
//!   `G = y_c + 0.5` (the contact pixel centre). A point `(X, Y)` of that
//!   column stands `G - Y` pixels above the ground and projects to
//!   `(X, Y) + (G - Y) · length_factor · dir`. For pixel centres this is the
//!   usual `height = y_c - y`.
//! - Vertical runs of equal coverage are projected as a whole: the run's
//!   rectangle `[x, x+1] × [y_top, min(y_bottom + 1, G)]` maps to a
//!   parallelogram ("footprint"). Neighbouring pixels share footprint edges,
//!   so the shadow has no holes even when `length_factor` is large. Anything
//!   below the ground line has no height and casts nothing.
//!
//! Rasterization
//! - Footprints are rasterized conservatively row by row: a pixel is covered
//!   when its square overlaps the footprint. Degenerate (zero-area)
//!   footprints still cover the pixels they pass through.
//! - Overlapping footprints combine with `max`, so values never exceed the
//!   largest source coverage (≤ 1).
//! - Parts outside the canvas are dropped; the number of footprints that
//!   reached past the border is reported, never treated as an error.

use crate::contact::ContactLine;
use crate::image::{parallel, ImageF32, Mask};
use crate::light::LightDirection;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Options of the projector.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectorOptions {
    /// Mask coverage below this value casts no shadow.
    pub min_coverage: f32,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        Self { min_coverage: 1e-3 }
    }
}

/// Projected quadrilateral of one run of subject pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    /// Corners in convex order: top-left, top-right, bottom-right, bottom-left
    /// of the source run, after projection.
    pub corners: [Point2<f32>; 4],
    /// Source mask coverage of the run, in `[0, 1]`.
    pub coverage: f32,
    /// Contact point `(x, y_c)` of the source column.
    pub anchor: (usize, usize),
}

impl Footprint {
    /// Vertical extent `(min_y, max_y)` of the corners.
    fn y_range(&self) -> (f32, f32) {
        self.corners
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            })
    }

    fn within(&self, width: usize, height: usize) -> bool {
        let (w, h) = (width as f32, height as f32);
        self.corners
            .iter()
            .all(|p| p.x >= 0.0 && p.x <= w && p.y >= 0.0 && p.y <= h)
    }

    /// Horizontal extent of the footprint inside the strip `y0 ≤ Y ≤ y1`.
    ///
    /// The intersection of a convex polygon with a strip is spanned by the
    /// corners inside the strip plus the edge crossings of its two borders.
    fn strip_span(&self, y0: f32, y1: f32) -> Option<(f32, f32)> {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            if a.y >= y0 && a.y <= y1 {
                lo = lo.min(a.x);
                hi = hi.max(a.x);
            }
            for border in [y0, y1] {
                if (a.y - border) * (b.y - border) < 0.0 {
                    let t = (border - a.y) / (b.y - a.y);
                    let x = a.x + t * (b.x - a.x);
                    lo = lo.min(x);
                    hi = hi.max(x);
                }
            }
        }
        (lo <= hi).then_some((lo, hi))
    }
}

/// Output of [`ShadowProjector::project`]: footprints on a canvas.
#[derive(Clone, Debug)]
pub struct Projection {
    pub footprints: Vec<Footprint>,
    /// Largest displacement along the light direction (pixels).
    pub reach_px: f32,
    pub width: usize,
    pub height: usize,
}

/// Raw (pre-falloff) shadow coverage from the projection alone.
#[derive(Clone, Debug)]
pub struct RasterizedShadow {
    pub coverage: ImageF32,
    /// Footprints that extended past the canvas and were clipped.
    pub clipped_footprints: usize,
}

impl Projection {
    /// Rasterize all footprints with `max` accumulation.
    pub fn rasterize(&self) -> RasterizedShadow {
        let (w, h) = (self.width, self.height);
        let mut coverage = ImageF32::new(w, h);
        let clipped_footprints = self
            .footprints
            .iter()
            .filter(|f| !f.within(w, h))
            .count();

        // Row bands touched by each footprint: rows floor(min_y)..ceil(max_y),
        // at least one row for horizontal degenerate footprints.
        let bands: Vec<(i64, i64)> = self
            .footprints
            .iter()
            .map(|f| {
                let (lo, hi) = f.y_range();
                let start = lo.floor() as i64;
                let end = (hi.ceil() as i64).max(start + 1);
                (start, end)
            })
            .collect();

        let footprints = &self.footprints;
        parallel::for_each_row_mut(&mut coverage, |y, row| {
            let yi = y as i64;
            let (y0, y1) = (y as f32, y as f32 + 1.0);
            for (fp, &(start, end)) in footprints.iter().zip(&bands) {
                if yi < start || yi >= end {
                    continue;
                }
                let Some((lo, hi)) = fp.strip_span(y0, y1) else {
                    continue;
                };
                if hi < 0.0 || lo >= w as f32 {
                    continue;
                }
                let c0 = lo.floor().max(0.0);
                let c1 = hi.ceil().max(lo.floor() + 1.0).min(w as f32);
                if c1 <= c0 {
                    continue;
                }
                for px in &mut row[c0 as usize..c1 as usize] {
                    *px = px.max(fp.coverage);
                }
            }
        });

        RasterizedShadow {
            coverage,
            clipped_footprints,
        }
    }
}

/// Stateless projector from mask + contact line + light to footprints.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShadowProjector {
    options: ProjectorOptions,
}

impl ShadowProjector {
    pub fn new(options: ProjectorOptions) -> Self {
        Self { options }
    }

    /// Project every subject pixel above its column's contact row.
    pub fn project(&self, mask: &Mask, contact: &ContactLine, light: &LightDirection) -> Projection {
        let min_cov = self.options.min_coverage.max(f32::MIN_POSITIVE);
        let columns: Vec<(usize, usize)> = contact.points().filter(|&(x, _)| x < mask.w).collect();

        let per_column = parallel::map_indices(columns.len(), |i| {
            let (x, yc) = columns[i];
            project_column(mask, x, yc, min_cov, light)
        });

        let mut footprints = Vec::new();
        let mut reach_px = 0.0f32;
        for (column_footprints, column_reach) in per_column {
            footprints.extend(column_footprints);
            reach_px = reach_px.max(column_reach);
        }

        Projection {
            footprints,
            reach_px,
            width: mask.w,
            height: mask.h,
        }
    }
}

fn project_column(
    mask: &Mask,
    x: usize,
    yc: usize,
    min_cov: f32,
    light: &LightDirection,
) -> (Vec<Footprint>, f32) {
    let ground = yc as f32 + 0.5;
    let last = yc.min(mask.h.saturating_sub(1));
    let mut out = Vec::new();
    let mut reach = 0.0f32;

    let mut y = 0usize;
    while y <= last {
        let cov = mask.get(x, y).clamp(0.0, 1.0);
        if cov < min_cov {
            y += 1;
            continue;
        }
        let start = y;
        while y < last && mask.get(x, y + 1).clamp(0.0, 1.0) == cov {
            y += 1;
        }
        let top = start as f32;
        let bottom = (y as f32 + 1.0).min(ground);
        let top_shift = light.displacement(ground - top);
        let bottom_shift = light.displacement(ground - bottom);
        let (x0, x1) = (x as f32, x as f32 + 1.0);
        out.push(Footprint {
            corners: [
                Point2::new(x0, top) + top_shift,
                Point2::new(x1, top) + top_shift,
                Point2::new(x1, bottom) + bottom_shift,
                Point2::new(x0, bottom) + bottom_shift,
            ],
            coverage: cov,
            anchor: (x, yc),
        });
        reach = reach.max((ground - top) * light.length_factor);
        y += 1;
    }
    (out, reach)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactLineEstimator;
    use crate::light::LightModel;

    fn column_mask(w: usize, h: usize, x: usize, top: usize, bottom: usize) -> Mask {
        let mut m = ImageF32::new(w, h);
        for y in top..=bottom {
            m.set(x, y, 1.0);
        }
        m
    }

    fn project(mask: &Mask, angle: f32, elevation: f32) -> Projection {
        let contact = ContactLineEstimator::default().estimate(mask);
        let light = LightModel::default().resolve(angle, elevation);
        ShadowProjector::default().project(mask, &contact, &light)
    }

    #[test]
    fn single_column_reach_follows_cotangent() {
        // 200 px column standing on row 299
        let mask = column_mask(600, 300, 50, 100, 299);
        let at45 = project(&mask, 0.0, 45.0);
        assert_eq!(at45.footprints.len(), 1);
        assert!((at45.reach_px - 200.0).abs() <= 2.0, "reach {}", at45.reach_px);

        let raster = at45.rasterize();
        let rightmost = (0..600)
            .rev()
            .find(|&x| (0..300).any(|y| raster.coverage.get(x, y) > 0.0))
            .expect("shadow present");
        let extent = (rightmost - 50) as f32;
        assert!((extent - 200.0).abs() <= 2.0, "raster extent {extent}");
    }

    #[test]
    fn zenith_light_casts_onto_the_subject_itself() {
        let mask = column_mask(20, 20, 5, 4, 15);
        let proj = project(&mask, 30.0, 90.0);
        assert_eq!(proj.reach_px, 0.0);
        let raster = proj.rasterize();
        for y in 0..20 {
            for x in 0..20 {
                let expected = if x == 5 && (4..=15).contains(&y) { 1.0 } else { 0.0 };
                assert_eq!(raster.coverage.get(x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn long_shadows_have_no_holes() {
        let mut mask = ImageF32::new(300, 120);
        for y in 60..120 {
            for x in 20..24 {
                mask.set(x, y, 1.0);
            }
        }
        // low sun towards the lower right
        let raster = project(&mask, 20.0, 10.0).rasterize();
        // every covered row must be one contiguous span
        for y in 0..120 {
            let covered: Vec<usize> = (0..300).filter(|&x| raster.coverage.get(x, y) > 0.0).collect();
            if let (Some(first), Some(last)) = (covered.first(), covered.last()) {
                assert_eq!(covered.len(), last - first + 1, "hole in row {y}");
            }
        }
    }

    #[test]
    fn pixels_below_contact_do_not_cast() {
        let mut mask = column_mask(40, 40, 10, 10, 20);
        // noise under the feet: not a run, so contact stays at row 20
        mask.set(10, 30, 1.0);
        let proj = project(&mask, 0.0, 45.0);
        assert!(proj.footprints.iter().all(|f| f.anchor == (10, 20)));
        assert!(proj
            .footprints
            .iter()
            .all(|f| f.corners.iter().all(|c| c.y <= 20.5 + 1e-4)));
    }

    #[test]
    fn off_canvas_footprints_are_clipped_and_counted() {
        let mask = column_mask(60, 60, 55, 10, 59);
        let raster = project(&mask, 0.0, 20.0).rasterize();
        assert!(raster.clipped_footprints > 0);
        assert!(raster.coverage.max_value() <= 1.0);
    }

    #[test]
    fn overlapping_projection_saturates() {
        // "C" shape: top and bottom arms project onto the same region
        let mut mask = ImageF32::new(80, 80);
        for y in 20..70 {
            for x in 30..34 {
                mask.set(x, y, 1.0);
            }
        }
        for x in 30..50 {
            for y in 20..24 {
                mask.set(x, y, 1.0);
            }
            for y in 66..70 {
                mask.set(x, y, 1.0);
            }
        }
        let raster = project(&mask, 200.0, 35.0).rasterize();
        assert!(raster.coverage.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(raster.coverage.max_value(), 1.0);
    }

    #[test]
    fn strip_span_of_parallelogram() {
        let fp = Footprint {
            corners: [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(5.0, 4.0),
                Point2::new(4.0, 4.0),
            ],
            coverage: 1.0,
            anchor: (0, 0),
        };
        let (lo, hi) = fp.strip_span(1.0, 2.0).expect("span");
        assert!((lo - 1.0).abs() < 1e-6 && (hi - 3.0).abs() < 1e-6);
        assert!(fp.strip_span(5.0, 6.0).is_none());
    }
}
