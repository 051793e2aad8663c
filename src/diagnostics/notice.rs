use crate::light::ParameterAdjustment;
use serde::Serialize;

/// A condition the pipeline recovered from instead of failing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Notice {
    /// A light parameter was non-finite or out of range and was replaced or clamped.
    DegenerateParameter { adjustment: ParameterAdjustment },
    /// The placed mask has no coverage; the background was returned as is.
    EmptyMask,
    /// Some footprints reached past the canvas and were clipped.
    #[serde(rename_all = "camelCase")]
    OutOfBoundsProjection { clipped_footprints: usize },
}

impl Notice {
    pub fn is_degenerate_parameter(&self) -> bool {
        matches!(self, Notice::DegenerateParameter { .. })
    }
}
