use crate::error::{OperationError, Result};
use crate::geometry::Pose;
use crate::math::LENGTH_TOLERANCE;
use crate::topology::{RoadId, RoadNetwork};

/// Evaluates the plan-view pose on a road at offset `s`, optionally shifted
/// laterally (positive to the left of the reference line).
#[derive(Debug)]
pub struct PointOnRoad {
    road: RoadId,
    s: f64,
    offset: f64,
}

impl PointOnRoad {
    /// Creates a new `PointOnRoad` query on the reference line.
    #[must_use]
    pub fn new(road: RoadId, s: f64) -> Self {
        Self { road, s, offset: 0.0 }
    }

    /// Shifts the evaluated point perpendicular to the reference line.
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Executes the query, returning the pose.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the road is missing and
    /// `OperationError::InvalidInput` if `s` lies outside the road or the
    /// road has no geometry.
    pub fn execute(&self, network: &RoadNetwork) -> Result<Pose> {
        let road = network.road(self.road)?;
        if !(-LENGTH_TOLERANCE..=road.length + LENGTH_TOLERANCE).contains(&self.s) {
            return Err(OperationError::InvalidInput(format!(
                "s = {} outside road of length {}",
                self.s, road.length
            ))
            .into());
        }
        let pose = road
            .pose_at(self.s)
            .ok_or_else(|| OperationError::InvalidInput(format!("road {} has no geometry", road.id)))?;
        Ok(pose.lateral(self.offset))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::GeometryPrimitive;
    use crate::topology::RoadData;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn quarter_circle(network: &mut RoadNetwork) -> RoadId {
        let length = 10.0 * FRAC_PI_2;
        network.add_road(RoadData::new(1, length).with_geometries(vec![GeometryPrimitive::arc(
            0.0,
            Pose::new(0.0, 0.0, 0.0),
            length,
            0.1,
        )]))
    }

    #[test]
    fn end_of_quarter_circle() {
        let mut network = RoadNetwork::new();
        let road = quarter_circle(&mut network);
        let pose = PointOnRoad::new(road, 10.0 * FRAC_PI_2)
            .execute(&network)
            .unwrap();
        assert_abs_diff_eq!(pose.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.y, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.heading, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn lateral_offset_points_left() {
        let mut network = RoadNetwork::new();
        let road = quarter_circle(&mut network);
        let pose = PointOnRoad::new(road, 0.0)
            .with_offset(2.0)
            .execute(&network)
            .unwrap();
        assert_abs_diff_eq!(pose.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn outside_the_road_is_rejected() {
        let mut network = RoadNetwork::new();
        let road = quarter_circle(&mut network);
        assert!(PointOnRoad::new(road, 20.0).execute(&network).is_err());
        assert!(PointOnRoad::new(road, -1.0).execute(&network).is_err());
        let bare = network.create_road(5.0);
        assert!(PointOnRoad::new(bare, 1.0).execute(&network).is_err());
    }
}
