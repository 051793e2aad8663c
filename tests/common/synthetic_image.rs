use image::{Rgba, RgbaImage};
use shadow_synth::image::{DepthMap, ImageF32, Mask};

/// Opaque background with a faint vertical gradient so byte comparisons are
/// not trivially satisfied by a constant image.
pub fn gradient_background(width: u32, height: u32) -> RgbaImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    RgbaImage::from_fn(width, height, |x, y| {
        let g = 180 + (y * 60 / height) as u8;
        Rgba([g, g.saturating_sub((x % 7) as u8), 170, 255])
    })
}

/// Fully opaque rectangular subject with a matching all-ones mask.
pub fn rect_subject(width: u32, height: u32) -> (RgbaImage, Mask) {
    let rgba = RgbaImage::from_pixel(width, height, Rgba([40, 90, 160, 255]));
    let mask = ImageF32::filled(width as usize, height as usize, 1.0);
    (rgba, mask)
}

/// "C"-shaped subject: a vertical bar with arms at the top and the bottom.
/// Both arms project onto overlapping regions for most light directions.
pub fn c_shape_subject(width: u32, height: u32, thickness: u32) -> (RgbaImage, Mask) {
    assert!(thickness * 2 < height && thickness < width, "C shape does not fit");
    let mut rgba = RgbaImage::new(width, height);
    let mut mask = ImageF32::new(width as usize, height as usize);
    for y in 0..height {
        for x in 0..width {
            let bar = x < thickness;
            let arm = y < thickness || y >= height - thickness;
            if bar || arm {
                rgba.put_pixel(x, y, Rgba([200, 40, 40, 255]));
                mask.set(x as usize, y as usize, 1.0);
            }
        }
    }
    (rgba, mask)
}

/// Depth map growing linearly from the left edge (0) to the right edge (1).
pub fn horizontal_ramp_depth(width: usize, height: usize) -> DepthMap {
    let mut depth = ImageF32::new(width, height);
    let denom = width.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        for x in 0..width {
            depth.set(x, y, x as f32 / denom);
        }
    }
    depth
}
