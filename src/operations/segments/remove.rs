use crate::error::{Result, TopologyError};
use crate::topology::{
    Connection, ContactPoint, JunctionId, NetworkEvent, RoadId, RoadLink, RoadNetwork, SegmentRef,
    SplineId,
};

use super::{rebreak_spline, repoint_junction};

/// Removes a road or junction segment from a spline and from the network,
/// keeping the neighbours' links consistent.
///
/// - Road between two roads: the neighbours are linked to each other with
///   their contact points preserved.
/// - Road next to a junction: the junction's connections and connecting
///   roads are re-pointed to the road on the other side.
/// - Junction: its neighbours are joined directly and the junction is
///   removed together with its connecting roads.
///
/// When the first segment is removed, its successor takes over offset 0.
#[derive(Debug)]
pub struct RemoveSegment {
    spline: SplineId,
    segment: SegmentRef,
}

impl RemoveSegment {
    /// Creates a new `RemoveSegment` operation.
    #[must_use]
    pub fn new(spline: SplineId, segment: SegmentRef) -> Self {
        Self { spline, segment }
    }

    /// Executes the removal and re-cuts the spline geometry.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::UnknownSegmentType` if the segment names no
    /// live road or junction and `TopologyError::SegmentNotFound` if the
    /// spline's segment map does not hold it.
    pub fn execute(&self, network: &mut RoadNetwork) -> Result<()> {
        network.check_segment(self.segment)?;
        let segments = &network.spline(self.spline)?.segments;
        let index = segments
            .position(self.segment)
            .ok_or_else(|| TopologyError::SegmentNotFound(format!("{:?}", self.segment)))?;
        let previous = index.checked_sub(1).and_then(|i| segments.get(i));
        let next = segments.get(index + 1);

        match self.segment {
            SegmentRef::Road(road) => unlink_road(network, road)?,
            SegmentRef::Junction(junction) => {
                let before = previous.map(|(_, seg)| seg);
                let after = next.map(|(_, seg)| seg);
                remove_junction(network, junction, before, after)?;
            }
        }

        let segments = &mut network.spline_mut(self.spline)?.segments;
        segments.remove(self.segment);
        if index == 0 && !segments.is_empty() {
            segments.rekey(0, 0.0)?;
        }
        if let SegmentRef::Road(road) = self.segment {
            network.remove_road(road)?;
        }

        tracing::debug!(spline = ?self.spline, segment = ?self.segment, "segment removed");
        rebreak_spline(network, self.spline)
    }
}

/// Joins the predecessor and successor of `road` around it.
fn unlink_road(network: &mut RoadNetwork, road: RoadId) -> Result<()> {
    let data = network.road(road)?;
    let (predecessor, successor) = (data.predecessor, data.successor);

    match (predecessor, successor) {
        (
            Some(RoadLink::Road {
                road: before,
                contact: before_contact,
            }),
            Some(RoadLink::Road {
                road: after,
                contact: after_contact,
            }),
        ) => {
            network.road_mut(before)?.set_link(
                before_contact,
                Some(RoadLink::Road {
                    road: after,
                    contact: after_contact,
                }),
            );
            network.road_mut(after)?.set_link(
                after_contact,
                Some(RoadLink::Road {
                    road: before,
                    contact: before_contact,
                }),
            );
        }
        (Some(RoadLink::Road { road: other, contact }), Some(RoadLink::Junction(junction)))
        | (Some(RoadLink::Junction(junction)), Some(RoadLink::Road { road: other, contact })) => {
            repoint_junction(network, junction, road, other, contact)?;
            network
                .road_mut(other)?
                .set_link(contact, Some(RoadLink::Junction(junction)));
        }
        _ => {
            for link in [predecessor, successor] {
                match link {
                    Some(RoadLink::Road {
                        road: other,
                        contact: other_contact,
                    }) => {
                        let other = network.road_mut(other)?;
                        if other.link(other_contact).and_then(|l| l.road()) == Some(road) {
                            other.set_link(other_contact, None);
                        }
                    }
                    Some(RoadLink::Junction(junction)) => {
                        drop_connections(network, junction, road)?;
                    }
                    None => {}
                }
            }
        }
    }
    Ok(())
}

/// Drops the connections of `junction` that enter from or lead into `road`,
/// together with their connecting roads.
fn drop_connections(network: &mut RoadNetwork, junction: JunctionId, road: RoadId) -> Result<()> {
    let data = network.junction_mut(junction)?;
    let (dropped, kept): (Vec<Connection>, Vec<Connection>) = std::mem::take(&mut data.connections)
        .into_iter()
        .partition(|c| c.incoming_road == road || c.outgoing_road() == Some(road));
    data.connections = kept;

    for connection in dropped {
        network.remove_connecting_road(connection.connecting_road)?;
    }
    network.emit(NetworkEvent::JunctionChanged(junction));
    Ok(())
}

/// Removes a junction segment together with its connecting roads and joins
/// the road segments on either side.
fn remove_junction(
    network: &mut RoadNetwork,
    junction: JunctionId,
    before: Option<SegmentRef>,
    after: Option<SegmentRef>,
) -> Result<()> {
    let data = network.remove_junction(junction)?;
    let mut connecting: Vec<RoadId> = data.connecting_roads().collect();
    connecting.sort_unstable();
    connecting.dedup();
    for road in connecting {
        network.remove_connecting_road(road)?;
    }

    // Any road still pointing at the junction loses that link.
    let stale: Vec<(RoadId, ContactPoint)> = network
        .roads()
        .flat_map(|(id, road)| {
            [ContactPoint::Start, ContactPoint::End]
                .into_iter()
                .filter(move |end| road.link(*end) == Some(RoadLink::Junction(junction)))
                .map(move |end| (id, end))
        })
        .collect();
    for (road, end) in stale {
        network.road_mut(road)?.set_link(end, None);
    }

    if let (Some(SegmentRef::Road(before)), Some(SegmentRef::Road(after))) = (before, after) {
        network.road_mut(before)?.successor = Some(RoadLink::road_start(after));
        network.road_mut(after)?.predecessor = Some(RoadLink::road_end(before));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoadspineError;
    use crate::geometry::{ControlPoint, SplineKind};
    use crate::operations::segments::{AddSegment, UpdateSplineGeometry};
    use crate::topology::SplineData;
    use approx::assert_abs_diff_eq;

    /// A 100 m straight spline cut into roads at 0, 30 and 60.
    fn three_roads() -> (RoadNetwork, SplineId, [RoadId; 3]) {
        let mut network = RoadNetwork::new();
        let spline = network.add_spline(SplineData::new(
            SplineKind::AutoFit,
            vec![
                ControlPoint::new(0.0, 0.0, 0.0, 0.0),
                ControlPoint::new(100.0, 0.0, 0.0, 0.0),
            ],
        ));
        let roads = [0.0, 30.0, 60.0].map(|s| {
            let road = network.create_road(0.0);
            AddSegment::new(spline, s, SegmentRef::Road(road))
                .execute(&mut network)
                .unwrap();
            road
        });
        UpdateSplineGeometry::new(spline).execute(&mut network).unwrap();
        (network, spline, roads)
    }

    #[test]
    fn middle_road_neighbours_are_joined() {
        let (mut network, spline, [a, b, c]) = three_roads();
        network.drain_events();
        RemoveSegment::new(spline, SegmentRef::Road(b))
            .execute(&mut network)
            .unwrap();

        assert!(!network.contains_road(b));
        assert_eq!(network.road(a).unwrap().successor, Some(RoadLink::road_start(c)));
        assert_eq!(network.road(c).unwrap().predecessor, Some(RoadLink::road_end(a)));
        assert_eq!(network.spline(spline).unwrap().segments.len(), 2);
        assert_abs_diff_eq!(network.road(a).unwrap().length, 60.0, epsilon = 1e-9);
        assert!(network.drain_events().contains(&NetworkEvent::RoadRemoved(b)));
    }

    #[test]
    fn first_road_hands_offset_zero_to_successor() {
        let (mut network, spline, [a, b, _]) = three_roads();
        RemoveSegment::new(spline, SegmentRef::Road(a))
            .execute(&mut network)
            .unwrap();
        let segments = &network.spline(spline).unwrap().segments;
        assert_eq!(segments.get(0), Some((0.0, SegmentRef::Road(b))));
        assert!(network.road(b).unwrap().predecessor.is_none());
        assert_abs_diff_eq!(network.road(b).unwrap().length, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn road_before_junction_re_points_connections() {
        let (mut network, spline, [a, b, _]) = three_roads();
        let junction = network.create_junction("j");
        let connecting = network.create_road(5.0);
        network.road_mut(connecting).unwrap().predecessor = Some(RoadLink::road_end(b));
        network
            .junction_mut(junction)
            .unwrap()
            .add_connection(Connection {
                id: 1,
                incoming_road: b,
                connecting_road: connecting,
                contact_point: ContactPoint::Start,
                lane_links: Vec::new(),
                corner: false,
            });
        network.road_mut(b).unwrap().successor = Some(RoadLink::Junction(junction));

        RemoveSegment::new(spline, SegmentRef::Road(b))
            .execute(&mut network)
            .unwrap();

        let j = network.junction(junction).unwrap();
        assert_eq!(j.connections[0].incoming_road, a);
        assert_eq!(
            network.road(connecting).unwrap().predecessor,
            Some(RoadLink::road_end(a))
        );
        assert_eq!(network.road(a).unwrap().successor, Some(RoadLink::Junction(junction)));
    }

    #[test]
    fn junction_segment_is_removed_with_connecting_roads() {
        let (mut network, spline, [a, b, c]) = three_roads();
        RemoveSegment::new(spline, SegmentRef::Road(b))
            .execute(&mut network)
            .unwrap();
        let junction = network.create_junction("j");
        let connecting = network.create_road(5.0);
        network
            .junction_mut(junction)
            .unwrap()
            .add_connection(Connection {
                id: 1,
                incoming_road: a,
                connecting_road: connecting,
                contact_point: ContactPoint::Start,
                lane_links: Vec::new(),
                corner: false,
            });
        AddSegment::new(spline, 30.0, SegmentRef::Junction(junction))
            .execute(&mut network)
            .unwrap();
        assert_eq!(network.road(a).unwrap().successor, Some(RoadLink::Junction(junction)));

        RemoveSegment::new(spline, SegmentRef::Junction(junction))
            .execute(&mut network)
            .unwrap();
        assert!(!network.contains_junction(junction));
        assert!(!network.contains_road(connecting));
        assert_eq!(network.road(a).unwrap().successor, Some(RoadLink::road_start(c)));
        assert_eq!(network.road(c).unwrap().predecessor, Some(RoadLink::road_end(a)));
    }

    #[test]
    fn untracked_segment_is_not_found() {
        let (mut network, spline, _) = three_roads();
        let stray = network.create_road(10.0);
        let err = RemoveSegment::new(spline, SegmentRef::Road(stray))
            .execute(&mut network)
            .unwrap_err();
        assert!(matches!(
            err,
            RoadspineError::Topology(TopologyError::SegmentNotFound(_))
        ));
        assert!(network.contains_road(stray));
    }
}
