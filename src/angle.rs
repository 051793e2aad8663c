//! Angle utilities used by the light model and the projector.

use nalgebra::Vector2;

/// Normalizes an angle in degrees into the range [0, 360).
#[inline]
pub fn normalize_degrees(angle_deg: f32) -> f32 {
    let norm = angle_deg.rem_euclid(360.0);
    // rem_euclid of tiny negatives rounds up to exactly 360 in f32
    if norm >= 360.0 {
        0.0
    } else {
        norm
    }
}

/// Unit vector for a compass angle in image coordinates (x right, y down):
/// 0° points right and the angle increases clockwise on screen.
#[inline]
pub fn image_direction(angle_deg: f32) -> Vector2<f32> {
    let rad = angle_deg.to_radians();
    Vector2::new(rad.cos(), rad.sin())
}

/// Computes the unsigned angle between two 2D vectors in radians.
/// Returns a value in [0, π]. Zero if the vectors are parallel
/// and pointing in the same direction; π if they are opposite.
#[inline]
pub fn angle_between(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    let na = a.norm().max(1e-6);
    let nb = b.norm().max(1e-6);
    (a.dot(b) / (na * nb)).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn normalize_degrees_basic() {
        assert!(approx_eq(normalize_degrees(45.0), 45.0));
        assert!(approx_eq(normalize_degrees(370.0), 10.0));
        assert!(approx_eq(normalize_degrees(-90.0), 270.0));
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-7), 0.0);
    }

    #[test]
    fn image_direction_turns_clockwise() {
        let right = image_direction(0.0);
        let down = image_direction(90.0);
        assert!(approx_eq(right.x, 1.0) && approx_eq(right.y, 0.0));
        // y grows downward, so 90° points down the image
        assert!(approx_eq(down.x, 0.0) && approx_eq(down.y, 1.0));
        assert!(approx_eq(image_direction(180.0).x, -1.0));
    }

    #[test]
    fn angle_between_basic() {
        let a = Vector2::new(1.0f32, 0.0);
        assert!(approx_eq(angle_between(&a, &a), 0.0));
        assert!(approx_eq(
            angle_between(&a, &Vector2::new(-1.0, 0.0)),
            std::f32::consts::PI
        ));
        assert!(approx_eq(
            angle_between(&a, &Vector2::new(0.0, 1.0)),
            std::f32::consts::FRAC_PI_2
        ));
    }
}
