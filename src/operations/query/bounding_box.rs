use crate::error::{OperationError, Result};
use crate::geometry::PrimitiveKind;
use crate::math::Point2;
use crate::topology::{RoadId, RoadNetwork};

/// An axis-aligned plan-view bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb {
    fn from_point(point: Point2) -> Self {
        Self { min: point, max: point }
    }

    fn include(&mut self, point: Point2) {
        self.min = Point2::from(self.min.coords.inf(&point.coords));
        self.max = Point2::from(self.max.coords.sup(&point.coords));
    }

    /// Whether `point` lies inside the box or on its boundary.
    #[must_use]
    pub fn contains(&self, point: Point2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }
}

/// Computes the plan-view bounding box of a road's reference line by
/// sampling every primitive.
///
/// Lines are exact; curved primitives are sampled at most `step` apart, so
/// the box may undercut an arc bulge by the sagitta of one step.
#[derive(Debug)]
pub struct BoundingBox {
    road: RoadId,
    step: f64,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query with a 1 m sampling step.
    #[must_use]
    pub fn new(road: RoadId) -> Self {
        Self { road, step: 1.0 }
    }

    /// Sets the sampling step along curved primitives.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the step is not positive or
    /// the road has no geometry.
    pub fn execute(&self, network: &RoadNetwork) -> Result<Aabb> {
        if self.step <= 0.0 {
            return Err(OperationError::InvalidInput(format!("sampling step {}", self.step)).into());
        }
        let road = network.road(self.road)?;
        let first = road
            .geometries
            .first()
            .ok_or_else(|| OperationError::InvalidInput(format!("road {} has no geometry", road.id)))?;

        let mut aabb = Aabb::from_point(first.start_pose().position());
        for geom in &road.geometries {
            aabb.include(geom.end_pose().position());
            if geom.kind() != PrimitiveKind::Line {
                // Ceil of a finite non-negative ratio; the cast is exact for any realistic road.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let samples = (geom.length / self.step).ceil() as usize;
                for i in 1..samples {
                    #[allow(clippy::cast_precision_loss)]
                    let ds = geom.length * i as f64 / samples as f64;
                    aabb.include(geom.pose_at(ds).position());
                }
            }
        }
        Ok(aabb)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryPrimitive, Pose};
    use crate::topology::RoadData;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn line_box_is_exact() {
        let mut network = RoadNetwork::new();
        let road = network.add_road(RoadData::new(1, 5.0).with_geometries(vec![
            GeometryPrimitive::line(0.0, Pose::new(1.0, 1.0, 3.0_f64.atan2(4.0)), 5.0),
        ]));
        let aabb = BoundingBox::new(road).execute(&network).unwrap();
        assert_abs_diff_eq!(aabb.min.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(aabb.min.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(aabb.max.x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(aabb.max.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn half_circle_bulge_is_sampled() {
        let mut network = RoadNetwork::new();
        let length = 10.0 * PI;
        let road = network.add_road(RoadData::new(1, length).with_geometries(vec![
            GeometryPrimitive::arc(0.0, Pose::new(0.0, 0.0, 0.0), length, 0.1),
        ]));
        let aabb = BoundingBox::new(road).with_step(0.1).execute(&network).unwrap();
        // Half circle of radius 10 centered at (0, 10).
        assert_abs_diff_eq!(aabb.max.x, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(aabb.min.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(aabb.max.y, 20.0, epsilon = 1e-9);
        assert!(aabb.contains(Point2::new(5.0, 10.0)));
        assert!(!aabb.contains(Point2::new(-1.0, 10.0)));
    }

    #[test]
    fn bad_step_and_bare_road_are_rejected() {
        let mut network = RoadNetwork::new();
        let road = network.create_road(5.0);
        assert!(BoundingBox::new(road).execute(&network).is_err());
        assert!(BoundingBox::new(road).with_step(0.0).execute(&network).is_err());
    }
}
