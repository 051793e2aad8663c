//! Error type shared by the pipeline and its I/O helpers.
//!
//! Only conditions that abort a request live here. Recoverable situations
//! (clamped light parameters, an empty mask, footprints clipped at the canvas
//! border) are reported as [`Notice`](crate::diagnostics::Notice) values in
//! the pipeline trace instead.

use std::path::PathBuf;

/// Fatal failure of a synthesis request or of a file helper.
#[derive(Debug, thiserror::Error)]
pub enum ShadowError {
    /// An input image is empty or otherwise unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The subject mask is not aligned 1:1 with the subject image.
    #[error("mask is {mask_w}x{mask_h} but the subject image is {subject_w}x{subject_h}")]
    MaskDimensionMismatch {
        mask_w: usize,
        mask_h: usize,
        subject_w: usize,
        subject_h: usize,
    },

    /// The depth map does not cover the background 1:1.
    #[error("depth map is {depth_w}x{depth_h} but the background is {background_w}x{background_h}")]
    DepthDimensionMismatch {
        depth_w: usize,
        depth_h: usize,
        background_w: usize,
        background_h: usize,
    },

    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = ShadowError> = std::result::Result<T, E>;
