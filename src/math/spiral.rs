//! Euler spiral evaluation and G1 Hermite clothoid fitting.
//!
//! A clothoid starting at the origin with heading 0, initial curvature `k`
//! and curvature derivative `dk` has tangent angle `θ(s) = k s + dk s² / 2`.
use std::f64::consts::PI;

use crate::error::{GeometryError, Result};

use super::fresnel::fresnel;
use super::generalized_fresnel::generalized_fresnel_cs;
use super::{normalize_angle, CURVATURE_TOLERANCE, LENGTH_TOLERANCE};
use super::{NEWTON_MAX_ITERATIONS, NEWTON_TOLERANCE};

/// Coefficients of the closed-form initial guess for the Newton iteration.
const GUESS_COEFFS: [f64; 6] = [
    2.989_696_028_701_907,
    0.716_228_953_608_281,
    -0.458_969_738_821_509,
    -0.502_821_153_340_377,
    0.261_062_141_752_652,
    -0.045_854_475_238_709,
];

/// Evaluates a point on an Euler spiral at arc length `s`.
///
/// The spiral starts at the origin with heading 0 and curvature
/// `initial_curvature`; curvature changes by `curvature_derivative` per unit
/// length. Returns `(x, y, tangent)` where `tangent` is the heading change.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn odr_spiral(s: f64, curvature_derivative: f64, initial_curvature: f64) -> (f64, f64, f64) {
    let dk = curvature_derivative;
    let k0 = initial_curvature;
    let tangent = k0 * s + 0.5 * dk * s * s;

    if k0 == 0.0 && dk.abs() > CURVATURE_TOLERANCE {
        // Standard spiral: x = a C(s/a), y = a S(s/a) with a = sqrt(π / |dk|).
        let a = (PI / dk.abs()).sqrt();
        let (c, sn) = fresnel(s / a);
        let y = if dk < 0.0 { -a * sn } else { a * sn };
        return (a * c, y, tangent);
    }

    let (x, y) = generalized_fresnel_cs(1, dk * s * s, k0 * s, 0.0);
    (s * x[0], s * y[0], tangent)
}

/// Shape of a fitted clothoid, as it selects the emitted primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClothoidKind {
    /// Both endpoint curvatures vanish.
    Line,
    /// Constant nonzero curvature.
    Arc,
    /// Linearly varying curvature.
    Spiral,
}

/// Result of a G1 Hermite clothoid fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClothoidFit {
    /// Curvature at the start point.
    pub curvature: f64,
    /// Rate of change of curvature along the arc length.
    pub curvature_derivative: f64,
    /// Arc length of the clothoid.
    pub length: f64,
    /// Newton iterations performed.
    pub iterations: usize,
    /// Absolute residual of the last Newton step.
    pub residual: f64,
    /// Whether the residual stayed within the warning threshold.
    pub converged: bool,
}

impl ClothoidFit {
    /// Curvature at the end point.
    #[must_use]
    pub fn curvature_end(&self) -> f64 {
        self.curvature + self.curvature_derivative * self.length
    }

    /// Classifies the fit as a line, arc or spiral.
    #[must_use]
    pub fn classify(&self, tolerance: f64) -> ClothoidKind {
        if self.curvature.abs() < tolerance && self.curvature_end().abs() < tolerance {
            ClothoidKind::Line
        } else if self.curvature_derivative.abs() < tolerance {
            ClothoidKind::Arc
        } else {
            ClothoidKind::Spiral
        }
    }
}

/// Newton solver for the clothoid interpolation problem.
#[derive(Debug, Clone, Copy)]
pub struct ClothoidSolver {
    /// Residual tolerance; residuals above ten times this are reported.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for ClothoidSolver {
    fn default() -> Self {
        Self {
            tolerance: NEWTON_TOLERANCE,
            max_iterations: NEWTON_MAX_ITERATIONS,
        }
    }
}

impl ClothoidSolver {
    /// Fits a clothoid through `(x0, y0)` with heading `theta0` and
    /// `(x1, y1)` with heading `theta1`.
    ///
    /// A residual above ten times the tolerance is logged and the best
    /// estimate is returned with `converged = false`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the endpoints coincide or the
    /// solution has a non-positive length.
    pub fn solve(
        &self,
        x0: f64,
        y0: f64,
        theta0: f64,
        x1: f64,
        y1: f64,
        theta1: f64,
    ) -> Result<ClothoidFit> {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let r = dx.hypot(dy);
        if r < LENGTH_TOLERANCE {
            return Err(GeometryError::Degenerate("clothoid endpoints coincide".into()).into());
        }

        // Angles relative to the chord.
        let phi = dy.atan2(dx);
        let phi0 = normalize_angle(theta0 - phi);
        let phi1 = normalize_angle(theta1 - phi);
        let delta = phi1 - phi0;

        let a_guess = guess_a(phi0, phi1);
        let mut a = a_guess;
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let (int_c, int_s) = generalized_fresnel_cs(3, 2.0 * a, delta - a, phi0);
            let f = int_s[0];
            let df = int_c[2] - int_c[1];
            residual = f.abs();
            if df.abs() < f64::MIN_POSITIVE {
                break;
            }
            a -= f / df;
            if residual < self.tolerance {
                break;
            }
        }

        let converged = residual <= self.tolerance * 10.0;
        if !converged {
            tracing::warn!(
                residual,
                iterations,
                a_guess,
                a,
                delta,
                phi0,
                "clothoid Newton iteration did not converge, using best estimate"
            );
        }

        let (h, _) = generalized_fresnel_cs(1, 2.0 * a, delta - a, phi0);
        let length = r / h[0];
        if !length.is_finite() || length <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "clothoid fit produced non-positive length {length}"
            ))
            .into());
        }

        Ok(ClothoidFit {
            curvature: (delta - a) / length,
            curvature_derivative: 2.0 * a / (length * length),
            length,
            iterations,
            residual,
            converged,
        })
    }
}

/// Solves the G1 Hermite interpolation problem with the default solver.
///
/// # Errors
///
/// See [`ClothoidSolver::solve`].
pub fn build_clothoid(
    x0: f64,
    y0: f64,
    theta0: f64,
    x1: f64,
    y1: f64,
    theta1: f64,
) -> Result<ClothoidFit> {
    ClothoidSolver::default().solve(x0, y0, theta0, x1, y1, theta1)
}

/// Polynomial approximation of the solution parameter in terms of the
/// chord-relative angles.
fn guess_a(phi0: f64, phi1: f64) -> f64 {
    let [c0, c1, c2, c3, c4, c5] = GUESS_COEFFS;
    let x = phi0 / PI;
    let y = phi1 / PI;
    let xy = x * y;
    let x2 = x * x;
    let y2 = y * y;
    (phi0 + phi1)
        * (c0 + xy * (c1 + xy * c2) + (c3 + xy * c4) * (x2 + y2) + c5 * (x2 * x2 + y2 * y2))
}
