use crate::error::Result;
use crate::topology::{NetworkEvent, RoadId, RoadLink, RoadNetwork, SegmentRef};

use super::{rebreak_spline, repoint_back_link};

/// Merges `second` into `first` when the roads are adjacent (end of `first`
/// to start of `second`, on the same spline) and the lane layout at the
/// shared boundary is identical.
///
/// The first road grows by the second's length, takes over its remaining
/// lane sections and its successor; the second road is removed.
#[derive(Debug)]
pub struct MergeSegments {
    first: RoadId,
    second: RoadId,
}

impl MergeSegments {
    /// Creates a new `MergeSegments` operation.
    #[must_use]
    pub fn new(first: RoadId, second: RoadId) -> Self {
        Self { first, second }
    }

    /// Executes the merge. Returns `false`, leaving both roads untouched, if
    /// they are not adjacent or their lane layouts differ.
    ///
    /// # Errors
    ///
    /// Returns an error if either road is missing.
    pub fn execute(&self, network: &mut RoadNetwork) -> Result<bool> {
        let first = network.road(self.first)?;
        let second = network.road(self.second)?;

        let adjacent = first.successor == Some(RoadLink::road_start(self.second))
            && second.predecessor == Some(RoadLink::road_end(self.first))
            && first.spline == second.spline;
        if !adjacent {
            tracing::debug!(first = ?self.first, second = ?self.second, "roads are not adjacent");
            return Ok(false);
        }

        let compatible = match (first.lane_sections.last(), second.lane_sections.first()) {
            (Some(a), Some(b)) => a.layout() == b.layout(),
            _ => false,
        };
        if !compatible {
            tracing::debug!(first = ?self.first, second = ?self.second, "lane layouts differ");
            return Ok(false);
        }

        let offset = first.length;
        let second = network.remove_road(self.second)?;

        let data = network.road_mut(self.first)?;
        let mut sections = second.lane_sections.into_iter();
        if let (Some(boundary), Some(last)) = (sections.next(), data.lane_sections.last_mut()) {
            for (id, lane) in &mut last.lanes {
                lane.successor = boundary.lanes.get(id).and_then(|l| l.successor);
            }
        }
        data.lane_sections.extend(sections.map(|mut section| {
            section.s += offset;
            section
        }));
        data.geometries
            .extend(second.geometries.iter().map(|g| g.with_s(g.s + offset)));
        data.length += second.length;
        data.successor = second.successor;
        let spline = data.spline;

        if let Some(link) = second.successor {
            repoint_back_link(network, link, self.second, RoadLink::road_end(self.first))?;
        }
        if let Some(spline) = spline {
            network
                .spline_mut(spline)?
                .segments
                .remove(SegmentRef::Road(self.second));
            rebreak_spline(network, spline)?;
        }
        network.emit(NetworkEvent::GeometryChanged(self.first));

        tracing::debug!(first = ?self.first, second = ?self.second, length = offset + second.length, "merged roads");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{ControlPoint, SplineKind};
    use crate::operations::segments::{AddSegment, UpdateSplineGeometry};
    use crate::topology::{Lane, LaneSection, LaneType, SplineData, SplineId};
    use approx::assert_abs_diff_eq;

    fn two_lane_section() -> LaneSection {
        LaneSection::new(0.0)
            .with_lane(Lane::new(1, LaneType::Driving).with_width(3.0))
            .with_lane(Lane::new(-1, LaneType::Driving).with_width(3.0))
    }

    /// Two 10 m roads on a 20 m straight spline.
    fn adjacent_roads(second_section: LaneSection) -> (RoadNetwork, SplineId, RoadId, RoadId) {
        let mut network = RoadNetwork::new();
        let spline = network.add_spline(SplineData::new(
            SplineKind::AutoFit,
            vec![
                ControlPoint::new(0.0, 0.0, 0.0, 0.0),
                ControlPoint::new(20.0, 0.0, 0.0, 0.0),
            ],
        ));
        let a = network.create_road(0.0);
        let b = network.create_road(0.0);
        network.road_mut(a).unwrap().lane_sections = vec![two_lane_section()];
        network.road_mut(b).unwrap().lane_sections = vec![second_section];
        AddSegment::new(spline, 0.0, SegmentRef::Road(a))
            .execute(&mut network)
            .unwrap();
        AddSegment::new(spline, 10.0, SegmentRef::Road(b))
            .execute(&mut network)
            .unwrap();
        UpdateSplineGeometry::new(spline).execute(&mut network).unwrap();
        (network, spline, a, b)
    }

    #[test]
    fn identical_layouts_merge() {
        let (mut network, spline, a, b) = adjacent_roads(two_lane_section());
        let tail = network.create_road(5.0);
        network.road_mut(b).unwrap().successor = Some(RoadLink::road_start(tail));
        network.road_mut(tail).unwrap().predecessor = Some(RoadLink::road_end(b));
        assert_abs_diff_eq!(network.road(a).unwrap().length, 10.0, epsilon = 1e-9);
        network.drain_events();

        assert!(MergeSegments::new(a, b).execute(&mut network).unwrap());

        let merged = network.road(a).unwrap();
        assert_abs_diff_eq!(merged.length, 20.0, epsilon = 1e-9);
        assert_eq!(merged.lane_sections.len(), 1);
        assert_eq!(merged.successor, Some(RoadLink::road_start(tail)));
        assert_eq!(
            network.road(tail).unwrap().predecessor,
            Some(RoadLink::road_end(a))
        );
        assert!(!network.contains_road(b));
        let segments = &network.spline(spline).unwrap().segments;
        assert_eq!(segments.len(), 1);
        assert_eq!(segments.position(SegmentRef::Road(b)), None);
        assert!(network.drain_events().contains(&NetworkEvent::RoadRemoved(b)));
    }

    #[test]
    fn mismatched_lane_counts_are_rejected() {
        let three_lanes = two_lane_section()
            .with_lane(Lane::new(-2, LaneType::Driving).with_width(3.0));
        let (mut network, spline, a, b) = adjacent_roads(three_lanes);
        let before_a = network.road(a).unwrap().clone();
        let before_b = network.road(b).unwrap().clone();

        assert!(!MergeSegments::new(a, b).execute(&mut network).unwrap());
        assert_eq!(network.road(a).unwrap(), &before_a);
        assert_eq!(network.road(b).unwrap(), &before_b);
        assert_eq!(network.spline(spline).unwrap().segments.len(), 2);
    }

    #[test]
    fn non_adjacent_roads_are_rejected() {
        let (mut network, _, a, b) = adjacent_roads(two_lane_section());
        assert!(!MergeSegments::new(b, a).execute(&mut network).unwrap());
    }
}
