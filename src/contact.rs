//! Ground-contact estimation ("feet line") from a subject mask.
//!
//! For every column the estimator scans bottom-up and accepts the lowest row
//! that starts a vertical run of at least `min_run` pixels with coverage at or
//! above `threshold`. Isolated blips shorter than the run are skipped, so mask
//! noise below the subject does not become ground contact. Columns with no
//! accepted run report `None` and cast no shadow.

use crate::image::{parallel, ImageView, Mask};
use serde::{Deserialize, Serialize};

/// Options controlling contact-line estimation.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactOptions {
    /// Coverage at or above which a mask pixel counts as subject.
    pub threshold: f32,
    /// Minimum contiguous vertical run (px) accepted as ground contact.
    pub min_run: usize,
}

impl Default for ContactOptions {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_run: 2,
        }
    }
}

/// Per-column contact rows over the mask's bounding box, in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactLine {
    /// First column of the subject bounding box.
    pub x0: usize,
    /// Contact row per column `x0 + i`, `None` where no contact was found.
    pub rows: Vec<Option<usize>>,
    /// Canvas width the line was estimated on.
    pub width: usize,
    /// Canvas height the line was estimated on.
    pub height: usize,
}

impl ContactLine {
    /// An empty line on a `width × height` canvas.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            rows: Vec::new(),
            width,
            height,
        }
    }

    /// Contact row of canvas column `x`.
    #[inline]
    pub fn row_at(&self, x: usize) -> Option<usize> {
        x.checked_sub(self.x0)
            .and_then(|i| self.rows.get(i))
            .copied()
            .flatten()
    }

    /// Iterate `(x, y_contact)` over columns that have contact.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(i, row)| row.map(|y| (self.x0 + i, y)))
    }

    /// Number of columns with accepted contact.
    pub fn contact_columns(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.contact_columns() == 0
    }

    /// Lowest (largest) contact row, i.e. the overall ground level.
    pub fn lowest_row(&self) -> Option<usize> {
        self.rows.iter().flatten().copied().max()
    }
}

/// Stateless contact-line estimator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactLineEstimator {
    options: ContactOptions,
}

impl ContactLineEstimator {
    pub fn new(options: ContactOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ContactOptions {
        &self.options
    }

    /// Estimate the contact line of `mask`.
    pub fn estimate(&self, mask: &Mask) -> ContactLine {
        let (w, h) = (mask.w, mask.h);
        let threshold = self.options.threshold;
        let Some((x_min, x_max)) = column_span(mask, threshold) else {
            return ContactLine::empty(w, h);
        };
        let min_run = self.options.min_run.max(1);

        let rows = parallel::map_indices(x_max - x_min + 1, |i| {
            scan_column(mask, x_min + i, threshold, min_run)
        });

        ContactLine {
            x0: x_min,
            rows,
            width: w,
            height: h,
        }
    }
}

/// Horizontal extent of pixels reaching `threshold`.
fn column_span(mask: &Mask, threshold: f32) -> Option<(usize, usize)> {
    let mut span: Option<(usize, usize)> = None;
    for row in mask.rows() {
        let first = row.iter().position(|&v| v >= threshold);
        let last = row.iter().rposition(|&v| v >= threshold);
        if let (Some(a), Some(b)) = (first, last) {
            span = Some(match span {
                Some((lo, hi)) => (lo.min(a), hi.max(b)),
                None => (a, b),
            });
        }
    }
    span
}

fn scan_column(mask: &Mask, x: usize, threshold: f32, min_run: usize) -> Option<usize> {
    let mut run = 0usize;
    let mut run_bottom = 0usize;
    for y in (0..mask.h).rev() {
        if mask.get(x, y) >= threshold {
            if run == 0 {
                run_bottom = y;
            }
            run += 1;
            if run >= min_run {
                return Some(run_bottom);
            }
        } else {
            run = 0;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;

    fn rect_mask(w: usize, h: usize, x0: usize, x1: usize, y0: usize, y1: usize) -> Mask {
        let mut m = ImageF32::new(w, h);
        for y in y0..y1 {
            for x in x0..x1 {
                m.set(x, y, 1.0);
            }
        }
        m
    }

    #[test]
    fn rectangle_contact_is_bottom_row() {
        let mask = rect_mask(20, 30, 5, 10, 4, 25);
        let line = ContactLineEstimator::default().estimate(&mask);
        assert_eq!(line.x0, 5);
        assert_eq!(line.rows.len(), 5);
        assert!(line.rows.iter().all(|r| *r == Some(24)));
        assert_eq!(line.row_at(4), None);
        assert_eq!(line.row_at(7), Some(24));
        assert_eq!(line.lowest_row(), Some(24));
    }

    #[test]
    fn isolated_blip_is_not_ground() {
        let mut mask = rect_mask(10, 20, 2, 6, 2, 10);
        // single-pixel noise well below the subject
        mask.set(3, 17, 1.0);
        let line = ContactLineEstimator::default().estimate(&mask);
        assert_eq!(line.row_at(3), Some(9));

        let permissive = ContactLineEstimator::new(ContactOptions {
            min_run: 1,
            ..Default::default()
        });
        assert_eq!(permissive.estimate(&mask).row_at(3), Some(17));
    }

    #[test]
    fn columns_without_runs_report_none() {
        let mut mask = rect_mask(10, 10, 1, 3, 2, 8);
        // isolated pixel extends the bbox but never forms a run
        mask.set(6, 5, 1.0);
        let line = ContactLineEstimator::default().estimate(&mask);
        assert_eq!(line.x0, 1);
        assert_eq!(line.rows.len(), 6);
        assert_eq!(line.row_at(6), None);
        assert_eq!(line.row_at(4), None);
        assert_eq!(line.contact_columns(), 2);
    }

    #[test]
    fn empty_and_faint_masks_have_no_contact() {
        let empty = ImageF32::new(8, 8);
        assert!(ContactLineEstimator::default().estimate(&empty).is_empty());
        let faint = ImageF32::filled(8, 8, 0.2);
        assert!(ContactLineEstimator::default().estimate(&faint).is_empty());
    }
}
