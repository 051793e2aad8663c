//! Depth-aware warp of the projected shadow.
//!
//! On an uneven surface a shadow lands nearer or farther than on a flat
//! ground plane. Every footprint corner is moved along the shadow direction
//! by `scale_px · (depth(corner) − depth(anchor))`, where `anchor` is the
//! contact point the footprint was cast from. A flat depth map therefore
//! produces zero offsets, and no depth map at all leaves the projection
//! untouched.

use crate::image::DepthMap;
use crate::light::LightDirection;
use crate::projector::{Footprint, Projection};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DepthWarpOptions {
    /// Pixels of displacement per unit of normalized depth difference.
    pub scale_px: f32,
}

impl Default for DepthWarpOptions {
    fn default() -> Self {
        Self { scale_px: 10.0 }
    }
}

/// Summary of one warp, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthWarpStats {
    /// Whether a depth map was supplied.
    pub applied: bool,
    /// Largest corner displacement (px).
    pub max_offset_px: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DepthWarp {
    options: DepthWarpOptions,
}

impl DepthWarp {
    pub fn new(options: DepthWarpOptions) -> Self {
        Self { options }
    }

    /// Warp `projection` by `depth`; `None` is the identity.
    pub fn warp(
        &self,
        projection: &Projection,
        depth: Option<&DepthMap>,
        light: &LightDirection,
    ) -> Projection {
        self.warp_with_stats(projection, depth, light).0
    }

    pub fn warp_with_stats(
        &self,
        projection: &Projection,
        depth: Option<&DepthMap>,
        light: &LightDirection,
    ) -> (Projection, DepthWarpStats) {
        let Some(depth) = depth else {
            return (projection.clone(), DepthWarpStats::default());
        };
        let (w, h) = (projection.width as f32, projection.height as f32);
        let scale = self.options.scale_px;
        let mut max_offset = 0.0f32;

        let footprints = projection
            .footprints
            .iter()
            .map(|fp| {
                let (ax, ay) = fp.anchor;
                let anchor_depth = depth.sample_bilinear(ax as f32 + 0.5, ay as f32 + 0.5);
                let mut corners = fp.corners;
                for c in &mut corners {
                    let delta = depth.sample_bilinear(c.x, c.y) - anchor_depth;
                    if !delta.is_finite() {
                        continue;
                    }
                    let offset = light.dir * (scale * delta);
                    max_offset = max_offset.max(offset.norm());
                    let inside = c.x >= 0.0 && c.x <= w && c.y >= 0.0 && c.y <= h;
                    let moved = *c + offset;
                    *c = if inside {
                        Point2::new(moved.x.clamp(0.0, w), moved.y.clamp(0.0, h))
                    } else {
                        moved
                    };
                }
                Footprint {
                    corners,
                    coverage: fp.coverage,
                    anchor: fp.anchor,
                }
            })
            .collect();

        let warped = Projection {
            footprints,
            reach_px: projection.reach_px,
            width: projection.width,
            height: projection.height,
        };
        let stats = DepthWarpStats {
            applied: true,
            max_offset_px: max_offset,
        };
        (warped, stats)
    }
}
