use crate::math::arc_2d::arc_local_point;
use crate::math::spiral::odr_spiral;
use crate::math::{normalize_angle, Point2};

use super::cubic::CubicPoly;

/// Position and heading on the plan view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise from +x.
    pub heading: f64,
}

impl Pose {
    /// Creates a new pose.
    #[must_use]
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Returns the position as a point.
    #[must_use]
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Maps a local offset `(u, v)` with heading change `dh` into the frame
    /// of this pose.
    #[must_use]
    pub fn transform(&self, u: f64, v: f64, dh: f64) -> Self {
        let (s, c) = self.heading.sin_cos();
        Self {
            x: self.x + u * c - v * s,
            y: self.y + u * s + v * c,
            heading: self.heading + dh,
        }
    }

    /// Offsets the pose sideways; positive `t` moves to the left.
    #[must_use]
    pub fn lateral(&self, t: f64) -> Self {
        self.transform(0.0, t, 0.0)
    }

    /// Returns the same position facing the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            heading: normalize_angle(self.heading + std::f64::consts::PI),
            ..*self
        }
    }
}

/// Discriminant of a [`GeometryPrimitive`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Line,
    Arc,
    Spiral,
    CubicPoly,
}

/// Kind-specific data of a plan-view primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveShape {
    /// Straight line.
    Line,
    /// Arc with constant curvature.
    Arc { curvature: f64 },
    /// Euler spiral with linearly varying curvature.
    Spiral {
        curvature_start: f64,
        curvature_end: f64,
    },
    /// Parametric cubic in the local u/v frame of the start pose.
    CubicPoly(CubicPoly),
}

/// One plan-view geometry record of a road reference line.
///
/// `s` is the offset of the primitive within its owning segment; the start
/// pose is `(x, y, heading)`. Field names follow the plan-view schema that
/// persistence collaborators serialize verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPrimitive {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub length: f64,
    pub shape: PrimitiveShape,
}

impl GeometryPrimitive {
    /// Creates a primitive starting at `start`.
    #[must_use]
    pub fn new(s: f64, start: Pose, length: f64, shape: PrimitiveShape) -> Self {
        Self {
            s,
            x: start.x,
            y: start.y,
            heading: start.heading,
            length,
            shape,
        }
    }

    /// Creates a line primitive.
    #[must_use]
    pub fn line(s: f64, start: Pose, length: f64) -> Self {
        Self::new(s, start, length, PrimitiveShape::Line)
    }

    /// Creates an arc primitive.
    #[must_use]
    pub fn arc(s: f64, start: Pose, length: f64, curvature: f64) -> Self {
        Self::new(s, start, length, PrimitiveShape::Arc { curvature })
    }

    /// Creates a spiral primitive.
    #[must_use]
    pub fn spiral(s: f64, start: Pose, length: f64, curvature_start: f64, curvature_end: f64) -> Self {
        Self::new(
            s,
            start,
            length,
            PrimitiveShape::Spiral {
                curvature_start,
                curvature_end,
            },
        )
    }

    /// Returns the primitive kind.
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self.shape {
            PrimitiveShape::Line => PrimitiveKind::Line,
            PrimitiveShape::Arc { .. } => PrimitiveKind::Arc,
            PrimitiveShape::Spiral { .. } => PrimitiveKind::Spiral,
            PrimitiveShape::CubicPoly(_) => PrimitiveKind::CubicPoly,
        }
    }

    /// Offset at which the primitive ends.
    #[must_use]
    pub fn s_end(&self) -> f64 {
        self.s + self.length
    }

    /// Start pose.
    #[must_use]
    pub fn start_pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.heading)
    }

    /// Pose at local offset `ds` (clamped to `[0, length]`).
    #[must_use]
    pub fn pose_at(&self, ds: f64) -> Pose {
        let ds = ds.clamp(0.0, self.length);
        let (u, v, dh) = self.local_point(ds);
        self.start_pose().transform(u, v, dh)
    }

    /// End pose.
    #[must_use]
    pub fn end_pose(&self) -> Pose {
        self.pose_at(self.length)
    }

    /// Signed curvature at local offset `ds`.
    #[must_use]
    pub fn curvature_at(&self, ds: f64) -> f64 {
        match self.shape {
            PrimitiveShape::Line => 0.0,
            PrimitiveShape::Arc { curvature } => curvature,
            PrimitiveShape::Spiral {
                curvature_start, ..
            } => curvature_start + self.curvature_derivative() * ds.clamp(0.0, self.length),
            PrimitiveShape::CubicPoly(poly) => {
                let p = poly.param_at_length(self.length, ds.clamp(0.0, self.length));
                poly.curvature(p)
            }
        }
    }

    /// Extracts the sub-curve `[from, from + length)` as a new primitive
    /// starting at the evaluated pose, with `s = 0`.
    ///
    /// Arcs keep their curvature; spirals keep their curvature law; cubic
    /// polynomials are re-parameterized onto the cut range.
    #[must_use]
    pub fn sub_range(&self, from: f64, length: f64) -> Self {
        let start = self.pose_at(from);
        let shape = match self.shape {
            PrimitiveShape::Line | PrimitiveShape::Arc { .. } => self.shape,
            PrimitiveShape::Spiral {
                curvature_start, ..
            } => {
                let dk = self.curvature_derivative();
                PrimitiveShape::Spiral {
                    curvature_start: curvature_start + dk * from,
                    curvature_end: curvature_start + dk * (from + length),
                }
            }
            PrimitiveShape::CubicPoly(poly) => {
                let p_a = poly.param_at_length(self.length, from);
                let p_b = poly.param_at_length(self.length, from + length);
                PrimitiveShape::CubicPoly(poly.reparameterized(p_a, p_b))
            }
        };
        Self::new(0.0, start, length, shape)
    }

    /// Returns a copy with a different start offset.
    #[must_use]
    pub fn with_s(mut self, s: f64) -> Self {
        self.s = s;
        self
    }

    fn curvature_derivative(&self) -> f64 {
        match self.shape {
            PrimitiveShape::Spiral {
                curvature_start,
                curvature_end,
            } if self.length > 0.0 => (curvature_end - curvature_start) / self.length,
            _ => 0.0,
        }
    }

    /// Offset from the start pose in the local frame, as `(u, v, dh)`.
    fn local_point(&self, ds: f64) -> (f64, f64, f64) {
        match self.shape {
            PrimitiveShape::Line => (ds, 0.0, 0.0),
            PrimitiveShape::Arc { curvature } => arc_local_point(curvature, ds),
            PrimitiveShape::Spiral {
                curvature_start, ..
            } => odr_spiral(ds, self.curvature_derivative(), curvature_start),
            PrimitiveShape::CubicPoly(poly) => {
                let p = poly.param_at_length(self.length, ds);
                let (u, v) = poly.eval(p);
                let (du, dv) = poly.derivative(p);
                (u, v, dv.atan2(du))
            }
        }
    }
}

/// Evaluates a contiguous primitive list at offset `s`.
///
/// Offsets beyond the list are clamped to its ends. Returns `None` for an
/// empty list.
#[must_use]
pub fn pose_on_geometries(geometries: &[GeometryPrimitive], s: f64) -> Option<Pose> {
    let geom = geometries
        .iter()
        .rev()
        .find(|g| g.s <= s)
        .or_else(|| geometries.first())?;
    Some(geom.pose_at(s - geom.s))
}

/// Total arc length of a primitive list.
#[must_use]
pub fn total_length(geometries: &[GeometryPrimitive]) -> f64 {
    geometries.iter().map(|g| g.length).sum()
}
