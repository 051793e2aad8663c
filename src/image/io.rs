//! I/O helpers for the pipeline's raster inputs and outputs.
//!
//! - `load_rgba`: read a PNG/JPEG into 8-bit RGBA (RGB gains opaque alpha).
//! - `load_mask` / `load_depth_map`: read an 8-bit gray file as a `[0,1]` plane.
//! - `mask_from_alpha`: derive a coverage mask from an RGBA cut-out.
//! - `save_rgba_png` / `save_gray_f32`: write lossless PNGs.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{DepthMap, ImageF32, ImageU8, ImageView, Mask};
use crate::error::{Result, ShadowError};
use image::{GrayImage, Luma, RgbaImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with stride and borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer given raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        let stride = width;
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }
}

/// Load an image from disk and convert to 8-bit RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|source| ShadowError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.into_rgba8())
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8> {
    let img = image::open(path)
        .map_err(|source| ShadowError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw();
    Ok(GrayImageU8::new(width, height, data))
}

/// Load a subject mask stored as 8-bit grayscale (255 = fully covered).
pub fn load_mask(path: &Path) -> Result<Mask> {
    Ok(load_grayscale_image(path)?.as_view().to_unit_f32())
}

/// Load a depth map stored as 8-bit grayscale (255 = tallest surface).
pub fn load_depth_map(path: &Path) -> Result<DepthMap> {
    Ok(load_grayscale_image(path)?.as_view().to_unit_f32())
}

/// Coverage mask taken from the alpha channel of an RGBA cut-out.
pub fn mask_from_alpha(rgba: &RgbaImage) -> Mask {
    let (w, h) = (rgba.width() as usize, rgba.height() as usize);
    let data = rgba.pixels().map(|p| p.0[3] as f32 / 255.0).collect();
    ImageF32 {
        w,
        h,
        stride: w,
        data,
    }
}

/// Save an RGBA image as PNG, creating parent directories.
pub fn save_rgba_png(image: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| ShadowError::ImageWrite {
            path: path.to_path_buf(),
            source,
        })
}

/// Save a float image to a grayscale PNG, mapping `[0, 1]` to `[0, 255]`.
pub fn save_gray_f32(image: &ImageF32, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            out.put_pixel(x as u32, y as u32, Luma([unit_to_u8(px)]));
        }
    }
    out.save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| ShadowError::ImageWrite {
            path: path.to_path_buf(),
            source,
        })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Quantize a `[0, 1]` sample to a byte (round to nearest, clamped).
#[inline]
pub fn unit_to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
