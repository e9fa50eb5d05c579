use crate::error::Result;
use crate::topology::{ContactPoint, RoadLink, RoadNetwork, SegmentRef, SplineId};

use super::{link_to, rebreak_spline, repoint_back_link};

/// Inserts a road or junction segment into a spline's segment map at
/// arc-length offset `s`.
///
/// If an existing road segment spans `s`, its successor becomes the new
/// segment (attached at its start) and a new road inherits the old
/// successor. A segment inserted ahead of all others is linked to the
/// following road.
#[derive(Debug)]
pub struct AddSegment {
    spline: SplineId,
    s: f64,
    segment: SegmentRef,
}

impl AddSegment {
    /// Creates a new `AddSegment` operation.
    #[must_use]
    pub fn new(spline: SplineId, s: f64, segment: SegmentRef) -> Self {
        Self { spline, s, segment }
    }

    /// Executes the insertion and re-cuts the spline geometry.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::UnknownSegmentType` if the segment names no
    /// live road or junction, `TopologyError::DuplicateSegmentOffset` if a
    /// segment already starts at `s`, and `TopologyError::EntityNotFound` if
    /// the spline is missing.
    pub fn execute(&self, network: &mut RoadNetwork) -> Result<()> {
        network.check_segment(self.segment)?;
        let index = network
            .spline_mut(self.spline)?
            .segments
            .insert(self.s, self.segment)?;

        let segments = &network.spline(self.spline)?.segments;
        let previous = index.checked_sub(1).and_then(|i| segments.get(i));
        let next = segments.get(index + 1);

        if let SegmentRef::Road(road) = self.segment {
            network.road_mut(road)?.spline = Some(self.spline);
        }

        match previous {
            Some((_, SegmentRef::Road(prev))) => {
                let old_successor = network.road(prev)?.successor;
                network
                    .road_mut(prev)?
                    .set_link(ContactPoint::End, Some(link_to(self.segment, ContactPoint::Start)));

                match self.segment {
                    SegmentRef::Road(road) => {
                        let data = network.road_mut(road)?;
                        data.predecessor = Some(RoadLink::road_end(prev));
                        data.successor = old_successor;
                        if let Some(link) = old_successor {
                            repoint_back_link(network, link, prev, RoadLink::road_end(road))?;
                        }
                    }
                    SegmentRef::Junction(junction) => {
                        if let Some(link) = old_successor {
                            repoint_back_link(network, link, prev, RoadLink::Junction(junction))?;
                        }
                    }
                }
            }
            Some((_, SegmentRef::Junction(junction))) => {
                if let SegmentRef::Road(road) = self.segment {
                    network.road_mut(road)?.predecessor = Some(RoadLink::Junction(junction));
                }
            }
            None => {
                if let (SegmentRef::Road(road), Some((_, SegmentRef::Road(following)))) =
                    (self.segment, next)
                {
                    network.road_mut(road)?.successor = Some(RoadLink::road_start(following));
                    network.road_mut(following)?.predecessor = Some(RoadLink::road_end(road));
                }
            }
        }

        tracing::debug!(spline = ?self.spline, s = self.s, segment = ?self.segment, "segment added");
        rebreak_spline(network, self.spline)
    }
}
