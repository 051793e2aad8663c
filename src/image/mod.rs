pub mod f32;
pub mod io;
pub mod parallel;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;

/// Single-channel coverage plane aligned with the image it annotates.
pub type Mask = ImageF32;
/// Background-sized shadow opacity plane in `[0, 1]`.
pub type ShadowLayer = ImageF32;
/// Background-sized relative surface height in `[0, 1]` (higher = taller).
pub type DepthMap = ImageF32;
