use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::{total_length, ControlPoint, SplineKind};
use crate::operations::decompose::DecomposeSpline;
use crate::topology::{
    JunctionId, Lane, LaneHeight, LaneSection, LaneWidth, NetworkEvent, RoadData, RoadId,
    RoadLink, RoadNetwork, SegmentRef, SplineData,
};

use super::lane_coord::{reference_pose, Flow, LaneCoord};
use super::{JunctionParams, RoadEnd, TrafficRule};

/// Creates the connecting road for one road-to-road maneuver.
///
/// The reference line is a clothoid fit from the incoming road's reference
/// point to the outgoing road's reference point, both oriented with
/// traffic. The road gets its own spline and a lane section holding only
/// the center lane; lanes are added per matched lane pair.
pub(super) fn create_connecting_road(
    network: &mut RoadNetwork,
    junction: JunctionId,
    incoming: RoadEnd,
    outgoing: RoadEnd,
    params: &JunctionParams,
) -> Result<RoadId> {
    let start = reference_pose(network.road(incoming.road)?, incoming.contact, Flow::Entering);
    let end = reference_pose(network.road(outgoing.road)?, outgoing.contact, Flow::Leaving);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(OperationError::InvalidInput("incident road has no geometry".into()).into());
    };

    let points = vec![
        ControlPoint::new(start.x, start.y, 0.0, start.heading),
        ControlPoint::new(end.x, end.y, 0.0, end.heading),
    ];
    let geometries = DecomposeSpline::new(points.clone(), SplineKind::AutoFit)
        .with_params(params.geometry)
        .execute()?;
    if geometries.is_empty() {
        return Err(GeometryError::Degenerate("connecting road has zero length".into()).into());
    }

    let id = network.ids_mut().next_road();
    let mut data = RoadData::new(id, total_length(&geometries))
        .with_geometries(geometries.clone())
        .with_lane_sections(vec![LaneSection::new(0.0)]);
    data.junction = Some(junction);
    data.predecessor = Some(RoadLink::Road {
        road: incoming.road,
        contact: incoming.contact,
    });
    data.successor = Some(RoadLink::Road {
        road: outgoing.road,
        contact: outgoing.contact,
    });
    let road = network.add_road(data);

    let mut spline = SplineData::new(SplineKind::AutoFit, points);
    spline.geometries = geometries;
    spline.segments.insert(0.0, SegmentRef::Road(road))?;
    let spline = network.add_spline(spline);
    network.road_mut(road)?.spline = Some(spline);

    tracing::debug!(?junction, ?road, incoming = ?incoming.road, outgoing = ?outgoing.road, "created connecting road");
    Ok(road)
}

/// Adds the lane carrying `entry` to `exit` on a connecting road and
/// returns its id.
///
/// The lane is placed outside the existing ones on the traffic side, copies
/// the entry lane type, and interpolates width and border heights linearly
/// from the entry lane to the exit lane over the road length.
pub(super) fn add_connecting_lane(
    network: &mut RoadNetwork,
    road: RoadId,
    entry: &LaneCoord,
    exit: &LaneCoord,
    params: &JunctionParams,
) -> Result<i32> {
    let data = network.road_mut(road)?;
    let length = data.length;
    if data.lane_sections.is_empty() {
        data.lane_sections.push(LaneSection::new(0.0));
    }
    let section = &mut data.lane_sections[0];

    let id = match params.traffic_rule {
        TrafficRule::RightHand => section.lanes.keys().next().map_or(0, |k| (*k).min(0)) - 1,
        TrafficRule::LeftHand => section.lanes.keys().next_back().map_or(0, |k| (*k).max(0)) + 1,
    };

    let width_change = exit.width - entry.width;
    let (slope, end_width) = if width_change.abs() <= params.coordinate_tolerance || length <= 0.0 {
        (0.0, entry.width)
    } else {
        (width_change / length, exit.width)
    };

    let mut lane = Lane::new(id, entry.lane_type);
    lane.widths = vec![
        LaneWidth {
            s_offset: 0.0,
            a: entry.width,
            b: slope,
            c: 0.0,
            d: 0.0,
        },
        LaneWidth::constant(length, end_width),
    ];
    lane.heights = vec![
        LaneHeight {
            s_offset: 0.0,
            inner: entry.height.0,
            outer: entry.height.1,
        },
        LaneHeight {
            s_offset: length,
            inner: exit.height.0,
            outer: exit.height.1,
        },
    ];
    lane.predecessor = Some(entry.lane);
    lane.successor = Some(exit.lane);
    section.lanes.insert(id, lane);

    network.emit(NetworkEvent::GeometryChanged(road));
    Ok(id)
}
