//! 2D arc math utilities for plan-view geometry.
//!
//! Curvature convention: `curvature = ±1 / radius`.
//! - `curvature = 0`: straight line
//! - `curvature > 0`: counter-clockwise (left) turn
//! - `curvature < 0`: clockwise (right) turn
use super::{normalize_angle, CURVATURE_TOLERANCE, LENGTH_TOLERANCE};

/// A chord joined by the arc implied by its end tangents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TangentArc {
    /// Parallel tangents: the straight chord.
    Line { heading: f64, length: f64 },
    /// Circular arc leaving the start point along the start tangent.
    Arc { curvature: f64, length: f64 },
}

impl TangentArc {
    /// Arc length of the joining curve.
    #[must_use]
    pub fn length(&self) -> f64 {
        match *self {
            Self::Line { length, .. } | Self::Arc { length, .. } => length,
        }
    }
}

/// Builds the arc between two points with known tangent headings.
///
/// The turning angle is the normalized difference of the headings; its sign
/// equals the sign of the cross product of the start and end tangent
/// vectors. The radius follows from the chord: `r = c / (2 sin(|Δθ| / 2))`.
/// When the radius is infinite the result collapses to a line along the
/// chord with the chord's length.
#[must_use]
pub fn arc_from_tangents(x0: f64, y0: f64, theta0: f64, x1: f64, y1: f64, theta1: f64) -> TangentArc {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let chord = dx.hypot(dy);
    let turn = normalize_angle(theta1 - theta0);

    let half_sin = (turn.abs() * 0.5).sin();
    if chord < LENGTH_TOLERANCE || half_sin < CURVATURE_TOLERANCE {
        return TangentArc::Line {
            heading: dy.atan2(dx),
            length: chord,
        };
    }

    // sign(t0 × t1) = sign(sin Δθ) = sign(Δθ) for Δθ in (-π, π].
    let cross = theta0.cos() * theta1.sin() - theta0.sin() * theta1.cos();
    let sign = if cross < 0.0 { -1.0 } else { 1.0 };

    let radius = chord / (2.0 * half_sin);
    TangentArc::Arc {
        curvature: sign / radius,
        length: radius * turn.abs(),
    }
}

/// Local offset along a constant-curvature curve starting at the origin with
/// heading 0. Returns `(u, v, heading_change)`.
#[must_use]
pub fn arc_local_point(curvature: f64, s: f64) -> (f64, f64, f64) {
    if curvature.abs() < CURVATURE_TOLERANCE {
        return (s, 0.0, 0.0);
    }
    let angle = curvature * s;
    let (sin_a, cos_a) = angle.sin_cos();
    (sin_a / curvature, (1.0 - cos_a) / curvature, angle)
}
