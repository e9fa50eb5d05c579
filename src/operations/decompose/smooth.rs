use crate::geometry::{ControlPoint, CubicPoly, GeometryPrimitive, PrimitiveShape};
use crate::math::normalize_angle;

/// Joins two control points with a cubic Hermite curve whose end tangents
/// are scaled by the chord length.
pub(super) fn join(start: &ControlPoint, end: &ControlPoint, s: f64) -> GeometryPrimitive {
    let dx = end.position.x - start.position.x;
    let dy = end.position.y - start.position.y;
    let chord = dx.hypot(dy);

    let (sin_h, cos_h) = start.heading.sin_cos();
    let u = dx * cos_h + dy * sin_h;
    let v = -dx * sin_h + dy * cos_h;
    let poly = CubicPoly::hermite(u, v, normalize_angle(end.heading - start.heading), chord);
    let length = poly.arc_length(0.0, 1.0);

    GeometryPrimitive::new(s, start.pose(), length, PrimitiveShape::CubicPoly(poly))
}
