use crate::error::{OperationError, Result};
use crate::geometry::{total_length, GeometryPrimitive, Pose};
use crate::math::LENGTH_TOLERANCE;

/// Cuts the window `[s_start, s_end)` out of a contiguous primitive list and
/// re-bases it to start at `s = 0`.
///
/// Primitives straddling a boundary are split by evaluating them at the cut
/// offset; curvature parameters are kept. Pieces shorter than the length
/// tolerance are folded into their neighbour so that the output length is
/// exactly the window length.
#[derive(Debug, Clone, Copy)]
pub struct BreakGeometries {
    s_start: f64,
    s_end: Option<f64>,
}

impl BreakGeometries {
    /// Creates a new `BreakGeometries` operation. `None` for `s_end` runs to
    /// the end of the list.
    #[must_use]
    pub fn new(s_start: f64, s_end: Option<f64>) -> Self {
        Self { s_start, s_end }
    }

    /// Executes the cut on `geometries`, whose offsets are relative to the
    /// start of the list.
    ///
    /// A window reaching past the end of the list is clipped to it.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the window starts before 0
    /// or ends before it starts.
    #[allow(clippy::float_cmp)]
    pub fn execute(&self, geometries: &[GeometryPrimitive]) -> Result<Vec<GeometryPrimitive>> {
        let total = total_length(geometries);
        let end = self.s_end.unwrap_or(total).min(total);
        if self.s_start < 0.0 || self.s_end.is_some_and(|s_end| s_end < self.s_start) {
            return Err(OperationError::InvalidInput(format!(
                "invalid geometry window [{}, {:?})",
                self.s_start, self.s_end
            ))
            .into());
        }

        let mut pieces: Vec<GeometryPrimitive> = Vec::new();
        // Leading sliver: pose at `s_start` and the length it carries.
        let mut lead: Option<(Pose, f64)> = None;
        for geom in geometries {
            let lo = geom.s.max(self.s_start);
            let hi = geom.s_end().min(end);
            if hi <= lo {
                continue;
            }
            if hi - lo < LENGTH_TOLERANCE {
                match pieces.last_mut() {
                    Some(last) => last.length += hi - lo,
                    None => {
                        let (pose, carried) =
                            lead.unwrap_or_else(|| (geom.pose_at(lo - geom.s), 0.0));
                        lead = Some((pose, carried + hi - lo));
                    }
                }
                continue;
            }

            let piece = if lo == geom.s && hi == geom.s_end() {
                *geom
            } else {
                geom.sub_range(lo - geom.s, hi - lo)
            };
            pieces.push(piece);
        }

        if let Some((pose, carried)) = lead {
            match pieces.first_mut() {
                Some(first) => {
                    first.x = pose.x;
                    first.y = pose.y;
                    first.heading = pose.heading;
                    first.length += carried;
                }
                None => pieces.push(GeometryPrimitive::line(0.0, pose, carried)),
            }
        }
        let mut s = 0.0;
        for piece in &mut pieces {
            piece.s = s;
            s += piece.length;
        }
        Ok(pieces)
    }
}
