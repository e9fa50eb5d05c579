mod add;
mod merge;
mod remove;
mod update;

pub use add::AddSegment;
pub use merge::MergeSegments;
pub use remove::RemoveSegment;
pub use update::UpdateSplineGeometry;

use crate::error::Result;
use crate::geometry::total_length;
use crate::operations::breaking::BreakGeometries;
use crate::topology::{
    ContactPoint, JunctionId, NetworkEvent, RoadId, RoadLink, RoadNetwork, SegmentRef, SplineId,
};

/// Link pointing at the given end of a segment.
fn link_to(segment: SegmentRef, contact: ContactPoint) -> RoadLink {
    match segment {
        SegmentRef::Road(road) => RoadLink::Road { road, contact },
        SegmentRef::Junction(junction) => RoadLink::Junction(junction),
    }
}

/// Rewrites the far side of `link` so that it points back at `target`.
///
/// `link` is a link held by some road; the road or junction it names had a
/// back link to `from`, which now belongs to `target`.
fn repoint_back_link(
    network: &mut RoadNetwork,
    link: RoadLink,
    from: RoadId,
    target: RoadLink,
) -> Result<()> {
    match link {
        RoadLink::Road { road, contact } => {
            let other = network.road_mut(road)?;
            if other.link(contact).and_then(|l| l.road()) == Some(from) {
                other.set_link(contact, Some(target));
            }
        }
        RoadLink::Junction(junction) => {
            if let RoadLink::Road { road, contact } = target {
                repoint_junction(network, junction, from, road, contact)?;
            }
        }
    }
    Ok(())
}

/// Re-points every reference a junction holds to road `from` at road `to`,
/// attached at `contact`: connection incoming roads, outgoing lane links,
/// and the links of its connecting roads.
fn repoint_junction(
    network: &mut RoadNetwork,
    junction: JunctionId,
    from: RoadId,
    to: RoadId,
    contact: ContactPoint,
) -> Result<()> {
    let data = network.junction_mut(junction)?;
    for connection in &mut data.connections {
        if connection.incoming_road == from {
            connection.incoming_road = to;
        }
        for link in &mut connection.lane_links {
            if link.outgoing.road == from {
                link.outgoing.road = to;
            }
        }
    }
    let connecting: Vec<RoadId> = data.connecting_roads().collect();

    for road in connecting {
        let Ok(data) = network.road_mut(road) else {
            continue;
        };
        for end in [ContactPoint::Start, ContactPoint::End] {
            if data.link(end).and_then(|l| l.road()) == Some(from) {
                data.set_link(end, Some(RoadLink::Road { road: to, contact }));
            }
        }
    }
    network.emit(NetworkEvent::JunctionChanged(junction));
    tracing::debug!(?junction, ?from, ?to, "re-pointed junction connections");
    Ok(())
}

/// Re-cuts the spline's geometry onto every road segment it owns.
///
/// Does nothing while the spline has no geometry.
fn rebreak_spline(network: &mut RoadNetwork, spline: SplineId) -> Result<()> {
    let data = network.spline(spline)?;
    if data.geometries.is_empty() {
        return Ok(());
    }
    let geometries = data.geometries.clone();
    let windows: Vec<(RoadId, f64, Option<f64>)> = (0..data.segments.len())
        .filter_map(|index| {
            let (_, segment) = data.segments.get(index)?;
            let (start, end) = data.segments.window(index)?;
            match segment {
                SegmentRef::Road(road) => Some((road, start, end)),
                SegmentRef::Junction(_) => None,
            }
        })
        .collect();

    for (road, start, end) in windows {
        let pieces = BreakGeometries::new(start, end).execute(&geometries)?;
        let data = network.road_mut(road)?;
        data.length = total_length(&pieces);
        data.geometries = pieces;
        network.emit(NetworkEvent::GeometryChanged(road));
    }
    Ok(())
}
