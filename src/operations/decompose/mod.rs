mod auto_fit;
mod explicit;
mod smooth;

use crate::error::{GeometryError, Result};
use crate::geometry::{ControlPoint, GeometryPrimitive, PrimitiveKind, SplineKind};
use crate::math::{
    normalize_angle, COORDINATE_TOLERANCE, CURVATURE_TOLERANCE, LENGTH_TOLERANCE,
    NEWTON_MAX_ITERATIONS, NEWTON_TOLERANCE,
};
use crate::topology::SplineData;

/// Parameters controlling curve fitting and decomposition.
#[derive(Debug, Clone, Copy)]
pub struct GeometryParams {
    /// Curvatures below this classify a fit as a line or an arc.
    pub curvature_tolerance: f64,
    /// Residual tolerance of the clothoid Newton iteration.
    pub newton_tolerance: f64,
    /// Iteration cap of the clothoid Newton iteration.
    pub newton_max_iterations: usize,
    /// Consecutive lines whose headings differ by less than this are merged.
    pub heading_tolerance: f64,
    /// Treat a non-converged clothoid fit as an error instead of using the
    /// best estimate.
    pub strict_convergence: bool,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            curvature_tolerance: CURVATURE_TOLERANCE,
            newton_tolerance: NEWTON_TOLERANCE,
            newton_max_iterations: NEWTON_MAX_ITERATIONS,
            heading_tolerance: 1e-9,
            strict_convergence: false,
        }
    }
}

/// Decomposes an ordered control-point list into a contiguous list of
/// plan-view primitives.
///
/// Each consecutive pair of control points becomes one primitive, chosen by
/// the spline kind. Offsets `s` are cumulative from the first control point,
/// and consecutive collinear lines are merged.
#[derive(Debug)]
pub struct DecomposeSpline {
    points: Vec<ControlPoint>,
    kind: SplineKind,
    closed: bool,
    params: GeometryParams,
}

impl DecomposeSpline {
    /// Creates a new `DecomposeSpline` operation for an open curve.
    #[must_use]
    pub fn new(points: Vec<ControlPoint>, kind: SplineKind) -> Self {
        Self {
            points,
            kind,
            closed: false,
            params: GeometryParams::default(),
        }
    }

    /// Creates the operation from a spline's control points and flags.
    #[must_use]
    pub fn from_spline(spline: &SplineData) -> Self {
        Self::new(spline.control_points.clone(), spline.kind).closed(spline.closed)
    }

    /// Joins the last control point back to the first.
    #[must_use]
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Sets custom fitting parameters.
    #[must_use]
    pub fn with_params(mut self, params: GeometryParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the decomposition.
    ///
    /// Pairs of coincident control points contribute nothing and are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidSpline` with fewer than two control
    /// points, and `GeometryError::ClothoidConvergence` for a non-converged
    /// fit when `strict_convergence` is set.
    pub fn execute(&self) -> Result<Vec<GeometryPrimitive>> {
        if self.points.len() < 2 {
            return Err(GeometryError::InvalidSpline {
                count: self.points.len(),
            }
            .into());
        }

        let closing = (self.closed && self.points.len() >= 3)
            .then(|| (&self.points[self.points.len() - 1], &self.points[0]));
        let pairs = self
            .points
            .windows(2)
            .map(|pair| (&pair[0], &pair[1]))
            .chain(closing);

        let mut primitives = Vec::with_capacity(self.points.len());
        let mut s = 0.0;
        for (index, (start, end)) in pairs.enumerate() {
            let chord = (end.position.xy() - start.position.xy()).norm();
            if chord < LENGTH_TOLERANCE {
                tracing::warn!(index, "skipping coincident control points");
                continue;
            }
            let geom = match self.kind {
                SplineKind::AutoFit => auto_fit::join(start, end, s, &self.params)?,
                SplineKind::Explicit => explicit::join(start, end, s),
                SplineKind::SmoothInterpolated => smooth::join(start, end, s),
            };
            s += geom.length;
            primitives.push(geom);
        }

        Ok(merge_collinear_lines(primitives, self.params.heading_tolerance))
    }
}

/// Merges runs of contiguous lines with equal heading and re-stamps offsets.
fn merge_collinear_lines(
    primitives: Vec<GeometryPrimitive>,
    heading_tolerance: f64,
) -> Vec<GeometryPrimitive> {
    let mut merged: Vec<GeometryPrimitive> = Vec::with_capacity(primitives.len());
    for geom in primitives {
        if let Some(last) = merged.last_mut() {
            let collinear = last.kind() == PrimitiveKind::Line
                && geom.kind() == PrimitiveKind::Line
                && normalize_angle(last.heading - geom.heading).abs() < heading_tolerance
                && (last.end_pose().position() - geom.start_pose().position()).norm()
                    < COORDINATE_TOLERANCE;
            if collinear {
                last.length += geom.length;
                continue;
            }
        }
        merged.push(geom);
    }

    let mut s = 0.0;
    for geom in &mut merged {
        geom.s = s;
        s += geom.length;
    }
    merged
}
