//! Generalized Fresnel integrals
//!
//! `X_k(a, b, c) = ∫₀¹ tᵏ cos(a t² / 2 + b t + c) dt`
//! `Y_k(a, b, c) = ∫₀¹ tᵏ sin(a t² / 2 + b t + c) dt`
//!
//! for `k = 0..nk` with `nk ≤ 3`. They describe a clothoid segment normalized
//! to unit length and drive both the G1 fit and spiral evaluation.
use std::f64::consts::PI;

use super::fresnel::fresnel_moments;

/// Below this `|a|` the quadratic phase term is expanded as a series.
const SMALL_A: f64 = 0.01;

/// Number of correction terms of the small-`a` expansion.
const SMALL_A_TERMS: usize = 3;

/// Moments required by the small-`a` expansion: `nk + 4p + 2` with `nk = 3`.
const ZERO_A_MOMENTS: usize = 3 + 4 * SMALL_A_TERMS + 2;

/// Evaluates `X_k`, `Y_k` for `k < nk`, returned as `(X, Y)` arrays.
///
/// Entries at index `≥ nk` are zero.
#[must_use]
pub fn generalized_fresnel_cs(nk: usize, a: f64, b: f64, c: f64) -> ([f64; 3], [f64; 3]) {
    let nk = nk.clamp(1, 3);
    let (x, y) = if a.abs() < SMALL_A {
        eval_xy_a_small(nk, a, b)
    } else {
        eval_xy_a_large(nk, a, b)
    };

    let (sc, cc) = c.sin_cos();
    let mut gx = [0.0; 3];
    let mut gy = [0.0; 3];
    for k in 0..nk {
        gx[k] = x[k] * cc - y[k] * sc;
        gy[k] = x[k] * sc + y[k] * cc;
    }
    (gx, gy)
}

/// Completes the square in the phase and reduces to differences of
/// standard Fresnel moments.
fn eval_xy_a_large(nk: usize, a: f64, b: f64) -> ([f64; 3], [f64; 3]) {
    let s = a.signum();
    let abs_a = a.abs();
    let z = (abs_a / PI).sqrt();
    let ell = s * b / (abs_a * PI).sqrt();
    let g = -0.5 * s * b * b / abs_a;

    let (cl, sl) = fresnel_moments(nk, ell);
    let (cz, sz) = fresnel_moments(nk, ell + z);
    let dc = [cz[0] - cl[0], cz[1] - cl[1], cz[2] - cl[2]];
    let ds = [sz[0] - sl[0], sz[1] - sl[1], sz[2] - sl[2]];

    let mut x = [0.0; 3];
    let mut y = [0.0; 3];

    let mut cg = g.cos() / z;
    let mut sg = g.sin() / z;
    x[0] = cg * dc[0] - s * sg * ds[0];
    y[0] = sg * dc[0] + s * cg * ds[0];

    if nk > 1 {
        cg /= z;
        sg /= z;
        let big_c = dc[1] - ell * dc[0];
        let big_s = ds[1] - ell * ds[0];
        x[1] = cg * big_c - s * sg * big_s;
        y[1] = sg * big_c + s * cg * big_s;

        if nk > 2 {
            cg /= z;
            sg /= z;
            let big_c = dc[2] + ell * (ell * dc[0] - 2.0 * dc[1]);
            let big_s = ds[2] + ell * (ell * ds[0] - 2.0 * ds[1]);
            x[2] = cg * big_c - s * sg * big_s;
            y[2] = sg * big_c + s * cg * big_s;
        }
    }
    (x, y)
}

/// Expands `cos/sin(a t² / 2)` in powers of `a` on top of the `a = 0` moments.
#[allow(clippy::cast_precision_loss)]
fn eval_xy_a_small(nk: usize, a: f64, b: f64) -> ([f64; 3], [f64; 3]) {
    let (x0, y0) = eval_xy_a_zero(b);

    let mut x = [0.0; 3];
    let mut y = [0.0; 3];
    for j in 0..nk {
        x[j] = x0[j] - a / 2.0 * y0[j + 2];
        y[j] = y0[j] + a / 2.0 * x0[j + 2];
    }

    let mut t = 1.0;
    let aa = -a * a / 4.0;
    for n in 1..=SMALL_A_TERMS {
        let nf = n as f64;
        t *= aa / (2.0 * nf * (2.0 * nf - 1.0));
        let bf = a / (4.0 * nf + 2.0);
        for j in 0..nk {
            x[j] += t * (x0[4 * n + j] - bf * y0[4 * n + j + 2]);
            y[j] += t * (y0[4 * n + j] + bf * x0[4 * n + j + 2]);
        }
    }
    (x, y)
}

/// Moments `∫₀¹ tᵏ cos(b t) dt` and `∫₀¹ tᵏ sin(b t) dt`.
///
/// Upward recurrence is stable while `k < 2|b|`; the remaining moments come
/// from their Taylor series in `b`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn eval_xy_a_zero(b: f64) -> ([f64; ZERO_A_MOMENTS], [f64; ZERO_A_MOMENTS]) {
    let mut x = [0.0; ZERO_A_MOMENTS];
    let mut y = [0.0; ZERO_A_MOMENTS];
    let (sb, cb) = b.sin_cos();
    let b2 = b * b;

    if b.abs() < 1e-3 {
        x[0] = 1.0 - (b2 / 6.0) * (1.0 - (b2 / 20.0) * (1.0 - (b2 / 42.0)));
        y[0] = (b / 2.0) * (1.0 - (b2 / 12.0) * (1.0 - (b2 / 30.0)));
    } else {
        x[0] = sb / b;
        y[0] = (1.0 - cb) / b;
    }

    let stable = ((2.0 * b.abs()).floor() as usize).clamp(1, ZERO_A_MOMENTS);
    for k in 1..stable {
        let kf = k as f64;
        x[k] = (sb - kf * y[k - 1]) / b;
        y[k] = (kf * x[k - 1] - cb) / b;
    }
    for k in stable..ZERO_A_MOMENTS {
        (x[k], y[k]) = moment_series(k, b);
    }
    (x, y)
}

#[allow(clippy::cast_precision_loss)]
fn moment_series(k: usize, b: f64) -> (f64, f64) {
    let kf = k as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    // Holds (-1)^n b^(2n) / (2n)!.
    let mut term = 1.0;
    for n in 0..200 {
        let nf = f64::from(n);
        let tx = term / (kf + 2.0 * nf + 1.0);
        let ty = term * b / ((2.0 * nf + 1.0) * (kf + 2.0 * nf + 2.0));
        sum_x += tx;
        sum_y += ty;
        if nf > b.abs() && tx.abs() < 1e-17 * sum_x.abs() && ty.abs() <= 1e-17 * sum_y.abs() {
            break;
        }
        term *= -b * b / ((2.0 * nf + 1.0) * (2.0 * nf + 2.0));
    }
    (sum_x, sum_y)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Composite Simpson quadrature of the defining integrals.
    fn reference(k: i32, a: f64, b: f64, c: f64) -> (f64, f64) {
        let n = 20_000;
        let h = 1.0 / f64::from(n);
        let f = |t: f64| {
            let phase = a * t * t / 2.0 + b * t + c;
            let w = t.powi(k);
            (w * phase.cos(), w * phase.sin())
        };
        let (mut sx, mut sy) = (0.0, 0.0);
        for i in 0..=n {
            let t = f64::from(i) * h;
            let weight = if i == 0 || i == n {
                1.0
            } else if i % 2 == 1 {
                4.0
            } else {
                2.0
            };
            let (fx, fy) = f(t);
            sx += weight * fx;
            sy += weight * fy;
        }
        (sx * h / 3.0, sy * h / 3.0)
    }

    #[test]
    fn matches_quadrature_in_both_regimes() {
        let cases = [
            (0.0, 0.0, 0.0),
            (0.005, 0.8, -0.3),
            (-0.002, -6.5, 1.1),
            (3.7, -1.2, 0.4),
            (-25.0, 4.0, -2.0),
            (0.4, 11.0, 0.0),
        ];
        for (a, b, c) in cases {
            let (x, y) = generalized_fresnel_cs(3, a, b, c);
            for k in 0..3 {
                let (rx, ry) = reference(i32::try_from(k).unwrap(), a, b, c);
                assert_abs_diff_eq!(x[k], rx, epsilon = 1e-9);
                assert_abs_diff_eq!(y[k], ry, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn zero_phase_gives_polynomial_moments() {
        let (x, y) = generalized_fresnel_cs(3, 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(x[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(x[2], 1.0 / 3.0, epsilon = 1e-15);
        assert!(y.iter().all(|v| v.abs() < 1e-15));
    }

    #[test]
    fn unused_moments_stay_zero() {
        let (x, y) = generalized_fresnel_cs(1, 2.0, 1.0, 0.5);
        assert_eq!(x[1], 0.0);
        assert_eq!(y[2], 0.0);
    }
}
