use crate::math::{normalize_angle, COORDINATE_TOLERANCE, LENGTH_TOLERANCE};
use crate::topology::{RoadData, RoadId, RoadNetwork, SegmentRef};

/// Validates the geometric and structural consistency of a road.
///
/// A valid road has contiguous primitives (offsets and poses continue
/// without gaps or kinks beyond tolerance), primitive lengths adding up to
/// the road length, lane sections in strictly ascending order starting at
/// 0, and, when it belongs to a spline, an entry in that spline's segment
/// map whose offsets ascend from 0.
#[derive(Debug)]
pub struct IsValid {
    road: RoadId,
}

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new(road: RoadId) -> Self {
        Self { road }
    }

    /// Executes the validation, returning `true` if the road is valid.
    /// A missing road is not valid.
    #[must_use]
    pub fn execute(&self, network: &RoadNetwork) -> bool {
        let Ok(road) = network.road(self.road) else {
            return false;
        };
        geometries_are_contiguous(road)
            && sections_are_ordered(road)
            && road.spline.is_none_or(|id| {
                network.spline(id).is_ok_and(|spline| {
                    let segments = &spline.segments;
                    segments.position(SegmentRef::Road(self.road)).is_some()
                        && segments.get(0).is_some_and(|(s, _)| s.abs() < LENGTH_TOLERANCE)
                        && segments
                            .iter()
                            .zip(segments.iter().skip(1))
                            .all(|((a, _), (b, _))| a < b)
                })
            })
    }
}

fn geometries_are_contiguous(road: &RoadData) -> bool {
    let Some(first) = road.geometries.first() else {
        return road.length.abs() < COORDINATE_TOLERANCE;
    };
    if first.s.abs() > COORDINATE_TOLERANCE || road.geometries.iter().any(|g| g.length < 0.0) {
        return false;
    }
    let joined = road.geometries.windows(2).all(|pair| {
        let (end, start) = (pair[0].end_pose(), pair[1].start_pose());
        (pair[0].s_end() - pair[1].s).abs() < COORDINATE_TOLERANCE
            && (end.position() - start.position()).norm() < COORDINATE_TOLERANCE
            && normalize_angle(end.heading - start.heading).abs() < COORDINATE_TOLERANCE
    });
    let total: f64 = road.geometries.iter().map(|g| g.length).sum();
    joined && (total - road.length).abs() < COORDINATE_TOLERANCE
}

fn sections_are_ordered(road: &RoadData) -> bool {
    road.lane_sections
        .first()
        .is_none_or(|section| section.s.abs() < LENGTH_TOLERANCE)
        && road.lane_sections.windows(2).all(|pair| pair[0].s < pair[1].s)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{ControlPoint, GeometryPrimitive, Pose, SplineKind};
    use crate::operations::segments::{AddSegment, UpdateSplineGeometry};
    use crate::topology::{LaneSection, SplineData};

    fn road_with(geometries: Vec<GeometryPrimitive>, length: f64) -> (RoadNetwork, RoadId) {
        let mut network = RoadNetwork::new();
        let road = network.add_road(RoadData::new(1, length).with_geometries(geometries));
        (network, road)
    }

    #[test]
    fn contiguous_line_and_arc_are_valid() {
        let line = GeometryPrimitive::line(0.0, Pose::new(0.0, 0.0, 0.0), 5.0);
        let arc = GeometryPrimitive::arc(5.0, line.end_pose(), 3.0, 0.2);
        let (network, road) = road_with(vec![line, arc], 8.0);
        assert!(IsValid::new(road).execute(&network));
    }

    #[test]
    fn gap_or_length_mismatch_is_invalid() {
        let line = GeometryPrimitive::line(0.0, Pose::new(0.0, 0.0, 0.0), 5.0);
        let shifted = GeometryPrimitive::line(5.0, Pose::new(6.0, 0.0, 0.0), 3.0);
        let (network, road) = road_with(vec![line, shifted], 8.0);
        assert!(!IsValid::new(road).execute(&network));

        let (network, road) = road_with(vec![line], 6.0);
        assert!(!IsValid::new(road).execute(&network));
    }

    #[test]
    fn unordered_lane_sections_are_invalid() {
        let line = GeometryPrimitive::line(0.0, Pose::new(0.0, 0.0, 0.0), 5.0);
        let (mut network, road) = road_with(vec![line], 5.0);
        network.road_mut(road).unwrap().lane_sections =
            vec![LaneSection::new(0.0), LaneSection::new(3.0), LaneSection::new(2.0)];
        assert!(!IsValid::new(road).execute(&network));
    }

    #[test]
    fn roads_cut_from_a_spline_are_valid() {
        let mut network = RoadNetwork::new();
        let spline = network.add_spline(SplineData::new(
            SplineKind::AutoFit,
            vec![
                ControlPoint::new(0.0, 0.0, 0.0, 0.0),
                ControlPoint::new(40.0, 0.0, 0.0, 0.0),
                ControlPoint::new(40.0, 40.0, 0.0, std::f64::consts::FRAC_PI_2),
            ],
        ));
        let roads = [0.0, 25.0, 50.0].map(|s| {
            let road = network.create_road(0.0);
            AddSegment::new(spline, s, SegmentRef::Road(road))
                .execute(&mut network)
                .unwrap();
            road
        });
        UpdateSplineGeometry::new(spline).execute(&mut network).unwrap();
        for road in roads {
            assert!(IsValid::new(road).execute(&network));
        }
    }

    #[test]
    fn missing_road_is_invalid() {
        let mut network = RoadNetwork::new();
        let road = network.create_road(0.0);
        network.remove_road(road).unwrap();
        assert!(!IsValid::new(road).execute(&network));
    }
}
