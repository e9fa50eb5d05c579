use crate::error::Result;
use crate::geometry::total_length;
use crate::topology::{RoadId, RoadNetwork};

/// Computes the reference-line length of a road as the sum of its
/// primitive lengths.
#[derive(Debug)]
pub struct Length {
    road: RoadId,
}

impl Length {
    /// Creates a new `Length` query.
    #[must_use]
    pub fn new(road: RoadId) -> Self {
        Self { road }
    }

    /// Executes the query, returning the length.
    ///
    /// # Errors
    ///
    /// Returns an error if the road is not found.
    pub fn execute(&self, network: &RoadNetwork) -> Result<f64> {
        Ok(total_length(&network.road(self.road)?.geometries))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryPrimitive, Pose};
    use crate::topology::RoadData;

    #[test]
    fn line_and_arc_lengths_add_up() {
        let mut network = RoadNetwork::new();
        let line = GeometryPrimitive::line(0.0, Pose::new(0.0, 0.0, 0.0), 5.0);
        let arc = GeometryPrimitive::arc(5.0, line.end_pose(), 3.0, 0.2);
        let road = network.add_road(RoadData::new(1, 8.0).with_geometries(vec![line, arc]));

        let len = Length::new(road).execute(&network).unwrap();
        assert!((len - 8.0).abs() < 1e-12);
    }

    #[test]
    fn road_without_geometry_has_zero_length() {
        let mut network = RoadNetwork::new();
        let road = network.create_road(4.0);
        assert!(Length::new(road).execute(&network).unwrap().abs() < 1e-12);
    }
}
