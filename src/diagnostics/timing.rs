use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Timing entry describing a single stage of the synthesis pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Record the time elapsed since `start` under `label` and return it (ms).
    pub fn lap(&mut self, label: impl Into<String>, start: Instant) -> f64 {
        let ms = elapsed_ms(start);
        self.push(label, ms);
        ms
    }

    /// Elapsed time of the stage called `label`, if recorded.
    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

#[inline]
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stages_in_order() {
        let mut timings = TimingBreakdown::with_total(0.0);
        timings.push("light", 0.25);
        let ms = timings.lap("projection", Instant::now());
        assert!(ms >= 0.0);
        assert_eq!(timings.stages.len(), 2);
        assert_eq!(timings.stage_ms("light"), Some(0.25));
        assert_eq!(timings.stage_ms("falloff"), None);
        let json = serde_json::to_value(&timings).unwrap();
        assert_eq!(json["stages"][0]["elapsedMs"], 0.25);
        assert!(json.get("totalMs").is_some());
    }
}
