use crate::error::{GeometryError, Result};
use crate::geometry::{ControlPoint, GeometryPrimitive};
use crate::math::spiral::{ClothoidKind, ClothoidSolver};

use super::GeometryParams;

/// Joins two control points with the primitive selected by their clothoid
/// fit.
pub(super) fn join(
    start: &ControlPoint,
    end: &ControlPoint,
    s: f64,
    params: &GeometryParams,
) -> Result<GeometryPrimitive> {
    let solver = ClothoidSolver {
        tolerance: params.newton_tolerance,
        max_iterations: params.newton_max_iterations,
    };
    let fit = solver.solve(
        start.position.x,
        start.position.y,
        start.heading,
        end.position.x,
        end.position.y,
        end.heading,
    )?;
    if !fit.converged && params.strict_convergence {
        return Err(GeometryError::ClothoidConvergence {
            residual: fit.residual,
            iterations: fit.iterations,
        }
        .into());
    }

    let pose = start.pose();
    Ok(match fit.classify(params.curvature_tolerance) {
        ClothoidKind::Line => GeometryPrimitive::line(s, pose, fit.length),
        ClothoidKind::Arc => GeometryPrimitive::arc(s, pose, fit.length, fit.curvature),
        ClothoidKind::Spiral => {
            GeometryPrimitive::spiral(s, pose, fit.length, fit.curvature, fit.curvature_end())
        }
    })
}
