//! Diagnostics data model exposed by the shadow synthesizer and the demo.
//!
//! `SynthesisReport` is the entry point returned by
//! [`ShadowSynthesizer::process_with_diagnostics`](crate::ShadowSynthesizer),
//! bundling the rendered outputs with a serializable `PipelineTrace` that
//! describes every stage the request went through, the recovered conditions
//! (`Notice`) and per-stage timings.

pub mod notice;
pub mod pipeline;
pub mod stages;
pub mod timing;

pub use notice::Notice;
pub use pipeline::{InputDescriptor, PipelineTrace, SynthesisReport};
pub use stages::{ContactStage, FalloffStage, LightStage, PlacementStage, ProjectionStage};
pub use timing::{StageTiming, TimingBreakdown};
