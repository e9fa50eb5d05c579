use crate::math::Point3;

use super::primitive::Pose;

/// A user-authored point a spline passes through, with its tangent heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Position; `z` is carried for elevation collaborators and ignored by
    /// plan-view fitting.
    pub position: Point3,
    /// Heading in radians.
    pub heading: f64,
}

impl ControlPoint {
    /// Creates a new control point.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, heading: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            heading,
        }
    }

    /// Plan-view pose of the control point.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position.x, self.position.y, self.heading)
    }
}

/// How consecutive control points are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplineKind {
    /// G1 clothoid fit per pair, emitted as lines, arcs and spirals.
    #[default]
    AutoFit,
    /// Circular arc implied by the start and end tangents.
    Explicit,
    /// Cubic Hermite curve, emitted as a parametric cubic polynomial.
    SmoothInterpolated,
}
