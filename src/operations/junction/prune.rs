use crate::error::Result;
use crate::topology::{ContactPoint, JunctionId, NetworkEvent, RoadId, RoadLink, RoadNetwork};

/// What a prune pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Ids of the dropped connections.
    pub connections: Vec<u32>,
    pub connecting_roads: Vec<RoadId>,
    pub junctions: Vec<JunctionId>,
}

/// Drops junction connections that reference removed roads, then removes
/// junctions left without connections.
///
/// Connecting roads of dropped connections are removed with them. Roads
/// still linked to a removed junction lose that link.
#[derive(Debug, Default)]
pub struct PruneJunctions;

impl PruneJunctions {
    /// Creates a new `PruneJunctions` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the prune pass over every junction of the network.
    ///
    /// # Errors
    ///
    /// Returns an error if a connecting road's spline is missing.
    pub fn execute(&self, network: &mut RoadNetwork) -> Result<PruneReport> {
        let mut report = PruneReport::default();
        let ids: Vec<JunctionId> = network.junctions().map(|(id, _)| id).collect();

        for id in ids {
            let junction = network.junction(id)?;
            let (stale, kept): (Vec<_>, Vec<_>) =
                junction.connections.iter().cloned().partition(|c| {
                    !network.contains_road(c.incoming_road)
                        || !network.contains_road(c.connecting_road)
                        || c.outgoing_road().is_some_and(|r| !network.contains_road(r))
                });

            if !stale.is_empty() {
                network.junction_mut(id)?.connections = kept;
                for connection in stale {
                    if network.contains_road(connection.connecting_road) {
                        report.connecting_roads.push(connection.connecting_road);
                    }
                    network.remove_connecting_road(connection.connecting_road)?;
                    report.connections.push(connection.id);
                }
                network.emit(NetworkEvent::JunctionChanged(id));
            }

            if network.junction(id)?.connections.is_empty() {
                network.remove_junction(id)?;
                clear_links_to(network, id)?;
                report.junctions.push(id);
            }
        }

        tracing::debug!(
            connections = report.connections.len(),
            junctions = report.junctions.len(),
            "pruned junctions"
        );
        Ok(report)
    }
}

fn clear_links_to(network: &mut RoadNetwork, junction: JunctionId) -> Result<()> {
    let linked: Vec<(RoadId, ContactPoint)> = network
        .roads()
        .flat_map(|(id, road)| {
            [ContactPoint::Start, ContactPoint::End]
                .into_iter()
                .filter(move |end| road.link(*end) == Some(RoadLink::Junction(junction)))
                .map(move |end| (id, end))
        })
        .collect();
    for (road, end) in linked {
        network.road_mut(road)?.set_link(end, None);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{Connection, ConnectionLaneLink, LaneRef, TurnType};

    fn connection(id: u32, incoming: RoadId, connecting: RoadId, outgoing: RoadId) -> Connection {
        Connection {
            id,
            incoming_road: incoming,
            connecting_road: connecting,
            contact_point: ContactPoint::Start,
            lane_links: vec![ConnectionLaneLink {
                incoming_lane: -1,
                connecting_lane: -1,
                outgoing: LaneRef {
                    road: outgoing,
                    lane: 1,
                },
                turn_type: TurnType::Straight,
            }],
            corner: false,
        }
    }

    #[test]
    fn connections_to_removed_roads_are_dropped() {
        let mut network = RoadNetwork::new();
        let a = network.create_road(10.0);
        let b = network.create_road(10.0);
        let c = network.create_road(10.0);
        let ab = network.create_road(5.0);
        let ac = network.create_road(5.0);
        let junction = network.create_junction("j");
        let j = network.junction_mut(junction).unwrap();
        j.add_connection(connection(1, a, ab, b));
        j.add_connection(connection(2, a, ac, c));
        network.remove_road(b).unwrap();

        let report = PruneJunctions::new().execute(&mut network).unwrap();
        assert_eq!(report.connections, vec![1]);
        assert_eq!(report.connecting_roads, vec![ab]);
        assert!(report.junctions.is_empty());
        assert!(!network.contains_road(ab));
        assert!(network.contains_road(ac));
        assert_eq!(network.junction(junction).unwrap().connections.len(), 1);
    }

    #[test]
    fn empty_junctions_are_removed_and_unlinked() {
        let mut network = RoadNetwork::new();
        let a = network.create_road(10.0);
        let b = network.create_road(10.0);
        let ab = network.create_road(5.0);
        let junction = network.create_junction("j");
        network
            .junction_mut(junction)
            .unwrap()
            .add_connection(connection(1, a, ab, b));
        network.road_mut(a).unwrap().successor = Some(RoadLink::Junction(junction));
        network.road_mut(b).unwrap().predecessor = Some(RoadLink::Junction(junction));
        let lonely = network.create_junction("lonely");
        network.remove_road(b).unwrap();

        let report = PruneJunctions::new().execute(&mut network).unwrap();
        assert_eq!(report.junctions.len(), 2);
        assert!(!network.contains_junction(junction));
        assert!(!network.contains_junction(lonely));
        assert!(network.road(a).unwrap().successor.is_none());
    }

    #[test]
    fn intact_network_is_untouched() {
        let mut network = RoadNetwork::new();
        let a = network.create_road(10.0);
        let b = network.create_road(10.0);
        let ab = network.create_road(5.0);
        let junction = network.create_junction("j");
        network
            .junction_mut(junction)
            .unwrap()
            .add_connection(connection(1, a, ab, b));

        let report = PruneJunctions::new().execute(&mut network).unwrap();
        assert_eq!(report, PruneReport::default());
        assert!(network.contains_road(ab));
    }
}
