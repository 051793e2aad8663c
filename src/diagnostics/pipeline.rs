use crate::depth_warp::DepthWarpStats;
use crate::diagnostics::{
    ContactStage, FalloffStage, LightStage, Notice, PlacementStage, ProjectionStage,
    TimingBreakdown,
};
use crate::pipeline::ShadowOutputs;
use serde::Serialize;

/// Result produced by
/// [`ShadowSynthesizer::process_with_diagnostics`](crate::ShadowSynthesizer).
#[derive(Clone, Debug)]
pub struct SynthesisReport {
    pub outputs: ShadowOutputs,
    pub trace: PipelineTrace,
}

fn format_optional(val: Option<f64>) -> String {
    val.map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// End-to-end trace describing the internal execution of one request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub light: LightStage,
    pub notices: Vec<Notice>,
    pub timings: TimingBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<PlacementStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_warp: Option<DepthWarpStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub falloff: Option<FalloffStage>,
}

impl PipelineTrace {
    pub fn new(input: InputDescriptor, light: LightStage) -> Self {
        Self {
            input,
            light,
            notices: Vec::new(),
            timings: TimingBreakdown::default(),
            placement: None,
            contact: None,
            projection: None,
            depth_warp: None,
            falloff: None,
        }
    }

    pub fn has_notice(&self, pred: impl Fn(&Notice) -> bool) -> bool {
        self.notices.iter().any(pred)
    }

    pub fn is_empty_mask(&self) -> bool {
        self.has_notice(|n| matches!(n, Notice::EmptyMask))
    }

    /// One-line human readable summary for logs and the demo binary.
    pub fn summary(&self) -> String {
        let reach = self.projection.as_ref().map(|p| p.reach_px as f64);
        let max_opacity = self.falloff.as_ref().map(|f| f.max_opacity as f64);
        format!(
            "{}x{} angle={:.1} elevation={:.1} reach_px={} max_opacity={} notices={} total_ms={:.3}",
            self.input.width,
            self.input.height,
            self.light.angle_deg,
            self.light.elevation_deg,
            format_optional(reach),
            format_optional(max_opacity),
            self.notices.len(),
            self.timings.total_ms
        )
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub subject_width: usize,
    pub subject_height: usize,
    pub has_depth: bool,
}
