//! Request validation. Failures here abort the request before any work.
use super::ShadowRequest;
use crate::error::{Result, ShadowError};
use crate::image::ImageF32;

pub(super) fn validate(request: &ShadowRequest<'_>) -> Result<()> {
    let (bw, bh) = request.background.dimensions();
    if bw == 0 || bh == 0 {
        return Err(ShadowError::InvalidInput("background image is empty".into()));
    }
    let (sw, sh) = request.subject.dimensions();
    if sw == 0 || sh == 0 {
        return Err(ShadowError::InvalidInput("subject image is empty".into()));
    }
    let (sw, sh) = (sw as usize, sh as usize);
    if request.mask.dims() != (sw, sh) {
        return Err(ShadowError::MaskDimensionMismatch {
            mask_w: request.mask.w,
            mask_h: request.mask.h,
            subject_w: sw,
            subject_h: sh,
        });
    }
    check_layout("mask", request.mask)?;
    if let Some(depth) = request.depth {
        let (bw, bh) = (bw as usize, bh as usize);
        if depth.dims() != (bw, bh) {
            return Err(ShadowError::DepthDimensionMismatch {
                depth_w: depth.w,
                depth_h: depth.h,
                background_w: bw,
                background_h: bh,
            });
        }
        check_layout("depth", depth)?;
    }
    Ok(())
}

/// Planes are read as dense row-major buffers; any other layout is rejected.
fn check_layout(name: &str, plane: &ImageF32) -> Result<()> {
    if plane.stride != plane.w {
        return Err(ShadowError::InvalidInput(format!(
            "{name} stride {} does not match its width {}",
            plane.stride, plane.w
        )));
    }
    if plane.data.len() != plane.w * plane.h {
        return Err(ShadowError::InvalidInput(format!(
            "{name} buffer length {} does not match {}x{}",
            plane.data.len(),
            plane.w,
            plane.h
        )));
    }
    Ok(())
}
