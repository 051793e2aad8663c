//! Per-stage summaries recorded in the pipeline trace.
use crate::contact::{ContactLine, ContactOptions};
use crate::falloff::FalloffFilter;
use crate::image::ShadowLayer;
use crate::light::LightDirection;
use crate::placement::PlacedSubject;
use crate::projector::{Projection, RasterizedShadow};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightStage {
    pub angle_deg: f32,
    pub elevation_deg: f32,
    pub dir: [f32; 2],
    pub length_factor: f32,
}

impl LightStage {
    pub fn from_direction(light: &LightDirection) -> Self {
        Self {
            angle_deg: light.angle_deg,
            elevation_deg: light.elevation_deg,
            dir: [light.dir.x, light.dir.y],
            length_factor: light.length_factor,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStage {
    pub anchor: String,
    pub offset: [i64; 2],
    pub size: [u32; 2],
    pub scale: f32,
    /// Total mask coverage after placement (pixels).
    pub coverage: f64,
}

impl PlacementStage {
    pub fn new(anchor: String, placed: &PlacedSubject) -> Self {
        Self {
            anchor,
            offset: [placed.offset.0, placed.offset.1],
            size: [placed.size.0, placed.size.1],
            scale: placed.scale,
            coverage: placed.mask.sum(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStage {
    pub threshold: f32,
    pub min_run: usize,
    /// Columns of the subject bounding box.
    pub columns: usize,
    pub contact_columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_row: Option<usize>,
}

impl ContactStage {
    pub fn new(options: &ContactOptions, line: &ContactLine) -> Self {
        Self {
            threshold: options.threshold,
            min_run: options.min_run,
            columns: line.rows.len(),
            contact_columns: line.contact_columns(),
            lowest_row: line.lowest_row(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionStage {
    pub footprints: usize,
    pub reach_px: f32,
    pub clipped_footprints: usize,
    /// Sum of the rasterized projected coverage.
    pub projected_area: f64,
}

impl ProjectionStage {
    pub fn new(projection: &Projection, raster: &RasterizedShadow) -> Self {
        Self {
            footprints: projection.footprints.len(),
            reach_px: projection.reach_px,
            clipped_footprints: raster.clipped_footprints,
            projected_area: raster.coverage.sum(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FalloffStage {
    pub falloff_distance_px: f32,
    pub band_sigmas: Vec<f32>,
    pub max_opacity: f32,
    pub mean_opacity: f32,
}

impl FalloffStage {
    pub fn new(filter: &FalloffFilter, layer: &ShadowLayer) -> Self {
        let n = layer.data.len().max(1) as f64;
        Self {
            falloff_distance_px: filter.options().falloff_distance_px,
            band_sigmas: filter.band_sigmas(),
            max_opacity: layer.max_value(),
            mean_opacity: (layer.sum() / n) as f32,
        }
    }
}
