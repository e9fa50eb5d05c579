use crate::geometry::{ControlPoint, GeometryPrimitive, Pose};
use crate::math::arc_2d::{arc_from_tangents, TangentArc};

/// Joins two control points with the arc implied by their tangents.
pub(super) fn join(start: &ControlPoint, end: &ControlPoint, s: f64) -> GeometryPrimitive {
    let (p0, p1) = (start.position, end.position);
    match arc_from_tangents(p0.x, p0.y, start.heading, p1.x, p1.y, end.heading) {
        TangentArc::Line { heading, length } => {
            GeometryPrimitive::line(s, Pose::new(p0.x, p0.y, heading), length)
        }
        TangentArc::Arc { curvature, length } => {
            GeometryPrimitive::arc(s, start.pose(), length, curvature)
        }
    }
}
