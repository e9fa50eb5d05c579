pub mod arc_2d;
pub mod fresnel;
pub mod generalized_fresnel;
pub mod spiral;

use std::f64::consts::{PI, TAU};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Curvatures (and curvature derivatives) below this are treated as zero.
pub const CURVATURE_TOLERANCE: f64 = 1e-12;

/// Residual tolerance of the clothoid Newton iteration.
pub const NEWTON_TOLERANCE: f64 = 1e-12;

/// Iteration cap of the clothoid Newton iteration.
pub const NEWTON_MAX_ITERATIONS: usize = 500;

/// Coordinate tolerance used when comparing widths, heights and positions.
pub const COORDINATE_TOLERANCE: f64 = 1e-6;

/// Arc-length slivers shorter than this are dropped when cutting geometry.
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// Normalizes an angle into `(-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Unit direction vector for a heading in radians.
#[must_use]
pub fn heading_vector(heading: f64) -> Vector2 {
    Vector2::new(heading.cos(), heading.sin())
}

/// Left-hand normal for a heading (the direction of positive lateral offset).
#[must_use]
pub fn left_normal(heading: f64) -> Vector2 {
    Vector2::new(-heading.sin(), heading.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-15);
        assert!((normalize_angle(TAU + 0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn left_normal_is_perpendicular() {
        let h = 0.7;
        assert!(heading_vector(h).dot(&left_normal(h)).abs() < 1e-15);
        // Heading 0 points along +x, left is +y.
        let n = left_normal(0.0);
        assert!((n.y - 1.0).abs() < 1e-15);
    }
}
