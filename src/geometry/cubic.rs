/// Range of the polynomial parameter `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRange {
    /// `p` runs over `[0, length]`.
    ArcLength,
    /// `p` runs over `[0, 1]`.
    Normalized,
}

/// Gauss–Legendre nodes on `[-1, 1]`.
const GAUSS_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];

/// Gauss–Legendre weights matching [`GAUSS_NODES`].
const GAUSS_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

const QUADRATURE_INTERVALS: usize = 16;
const INVERSION_TOLERANCE: f64 = 1e-12;
const INVERSION_MAX_ITERATIONS: usize = 60;

/// Parametric cubic in the local frame of its start pose:
///
/// `u(p) = aU + bU p + cU p² + dU p³`, `v(p) = aV + bV p + cV p² + dV p³`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicPoly {
    pub a_u: f64,
    pub b_u: f64,
    pub c_u: f64,
    pub d_u: f64,
    pub a_v: f64,
    pub b_v: f64,
    pub c_v: f64,
    pub d_v: f64,
    pub range: ParamRange,
}

impl CubicPoly {
    /// Cubic Hermite curve from the origin (heading 0) to `(end_u, end_v)`
    /// arriving with heading `end_heading`, on a normalized parameter.
    ///
    /// `tangent_scale` is the magnitude of both end derivatives.
    #[must_use]
    pub fn hermite(end_u: f64, end_v: f64, end_heading: f64, tangent_scale: f64) -> Self {
        let (m0u, m0v) = (tangent_scale, 0.0);
        let (m1u, m1v) = (tangent_scale * end_heading.cos(), tangent_scale * end_heading.sin());
        Self {
            a_u: 0.0,
            b_u: m0u,
            c_u: 3.0 * end_u - 2.0 * m0u - m1u,
            d_u: m0u + m1u - 2.0 * end_u,
            a_v: 0.0,
            b_v: m0v,
            c_v: 3.0 * end_v - 2.0 * m0v - m1v,
            d_v: m0v + m1v - 2.0 * end_v,
            range: ParamRange::Normalized,
        }
    }

    /// Position at parameter `p`.
    #[must_use]
    pub fn eval(&self, p: f64) -> (f64, f64) {
        (
            self.a_u + p * (self.b_u + p * (self.c_u + p * self.d_u)),
            self.a_v + p * (self.b_v + p * (self.c_v + p * self.d_v)),
        )
    }

    /// First derivative with respect to `p`.
    #[must_use]
    pub fn derivative(&self, p: f64) -> (f64, f64) {
        (
            self.b_u + p * (2.0 * self.c_u + 3.0 * p * self.d_u),
            self.b_v + p * (2.0 * self.c_v + 3.0 * p * self.d_v),
        )
    }

    /// Second derivative with respect to `p`.
    #[must_use]
    pub fn second_derivative(&self, p: f64) -> (f64, f64) {
        (
            2.0 * self.c_u + 6.0 * p * self.d_u,
            2.0 * self.c_v + 6.0 * p * self.d_v,
        )
    }

    /// Signed curvature at parameter `p`.
    #[must_use]
    pub fn curvature(&self, p: f64) -> f64 {
        let (du, dv) = self.derivative(p);
        let (ddu, ddv) = self.second_derivative(p);
        let speed = du.hypot(dv);
        if speed < f64::EPSILON {
            return 0.0;
        }
        (du * ddv - dv * ddu) / (speed * speed * speed)
    }

    /// Parameter at the end of a primitive of arc length `length`.
    #[must_use]
    pub fn param_end(&self, length: f64) -> f64 {
        match self.range {
            ParamRange::ArcLength => length,
            ParamRange::Normalized => 1.0,
        }
    }

    /// Arc length between parameters `p0` and `p1`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn arc_length(&self, p0: f64, p1: f64) -> f64 {
        let step = (p1 - p0) / QUADRATURE_INTERVALS as f64;
        let half = 0.5 * step;
        let mut total = 0.0;
        for i in 0..QUADRATURE_INTERVALS {
            let mid = p0 + (i as f64 + 0.5) * step;
            for (node, weight) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS) {
                let (du, dv) = self.derivative(mid + half * node);
                total += weight * du.hypot(dv);
            }
        }
        total * half
    }

    /// Parameter at which the arc length from the start equals `ds`, for a
    /// primitive of total arc length `length`.
    ///
    /// Arc-length parameterized polynomials map `ds` directly. Normalized
    /// ones are inverted by safeguarded Newton iteration.
    #[must_use]
    pub fn param_at_length(&self, length: f64, ds: f64) -> f64 {
        if self.range == ParamRange::ArcLength {
            return ds;
        }
        if ds <= 0.0 || length <= 0.0 {
            return 0.0;
        }
        if ds >= length {
            return 1.0;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        let mut p = ds / length;
        for _ in 0..INVERSION_MAX_ITERATIONS {
            let f = self.arc_length(0.0, p) - ds;
            if f.abs() < INVERSION_TOLERANCE {
                break;
            }
            if f > 0.0 {
                hi = p;
            } else {
                lo = p;
            }
            let (du, dv) = self.derivative(p);
            let speed = du.hypot(dv);
            let next = p - f / speed;
            p = if speed > 0.0 && next > lo && next < hi {
                next
            } else {
                0.5 * (lo + hi)
            };
        }
        p
    }

    /// Restricts the curve to `[p_a, p_b]`, expressed on a normalized
    /// parameter in the local frame of the point at `p_a`.
    ///
    /// The substitution `p = p_a + (p_b - p_a) q` is exact; the result is
    /// translated to the origin and rotated so that it leaves with heading 0.
    #[must_use]
    pub fn reparameterized(&self, p_a: f64, p_b: f64) -> Self {
        let beta = p_b - p_a;
        // The constant term drops out with the translation.
        let shift = |b: f64, c: f64, d: f64| {
            [
                beta * (b + p_a * (2.0 * c + 3.0 * d * p_a)),
                beta * beta * (c + 3.0 * d * p_a),
                beta * beta * beta * d,
            ]
        };
        let u = shift(self.b_u, self.c_u, self.d_u);
        let v = shift(self.b_v, self.c_v, self.d_v);

        let (du, dv) = self.derivative(p_a);
        let (sin_phi, cos_phi) = dv.atan2(du).sin_cos();
        let rotate = |i: usize| (cos_phi * u[i] + sin_phi * v[i], -sin_phi * u[i] + cos_phi * v[i]);
        let (b_u, b_v) = rotate(0);
        let (c_u, c_v) = rotate(1);
        let (d_u, d_v) = rotate(2);

        Self {
            a_u: 0.0,
            b_u,
            c_u,
            d_u,
            a_v: 0.0,
            b_v,
            c_v,
            d_v,
            range: ParamRange::Normalized,
        }
    }
}
