use super::road::{ContactPoint, RoadId};

slotmap::new_key_type! {
    /// Unique identifier for a junction in the network.
    pub struct JunctionId;
}

/// Maneuver class of a lane-to-lane connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnType {
    Straight,
    Left,
    Right,
    UTurn,
}

/// A lane of a specific road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneRef {
    pub road: RoadId,
    pub lane: i32,
}

/// Lane-level link carried by a connection: incoming lane, the lane of the
/// connecting road it enters, and the lane it finally leads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLaneLink {
    pub incoming_lane: i32,
    pub connecting_lane: i32,
    pub outgoing: LaneRef,
    pub turn_type: TurnType,
}

/// One road-to-road maneuver through a junction.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Numeric id; connections are deduplicated on it.
    pub id: u32,
    pub incoming_road: RoadId,
    pub connecting_road: RoadId,
    /// End of the connecting road attached to the incoming road.
    pub contact_point: ContactPoint,
    pub lane_links: Vec<ConnectionLaneLink>,
    /// Sharpest right-hand maneuver between two adjacent roads; only used
    /// for visual treatment of the corner.
    pub corner: bool,
}

impl Connection {
    /// Outgoing road of the connection, if any lane link exists.
    #[must_use]
    pub fn outgoing_road(&self) -> Option<RoadId> {
        self.lane_links.first().map(|link| link.outgoing.road)
    }
}

/// Data associated with a junction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JunctionData {
    /// Numeric id used by persistence collaborators.
    pub id: u32,
    pub name: String,
    pub connections: Vec<Connection>,
}

impl JunctionData {
    /// Creates a junction without connections.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            connections: Vec::new(),
        }
    }

    /// Adds a connection unless one with the same id is already held.
    /// Returns whether it was added.
    pub fn add_connection(&mut self, connection: Connection) -> bool {
        if self.connections.iter().any(|c| c.id == connection.id) {
            return false;
        }
        self.connections.push(connection);
        true
    }

    /// `(incoming lane, outgoing lane, turn type)` triples of all lane links.
    pub fn lane_triples(&self) -> impl Iterator<Item = (LaneRef, LaneRef, TurnType)> + '_ {
        self.connections.iter().flat_map(|c| {
            c.lane_links.iter().map(move |link| {
                (
                    LaneRef {
                        road: c.incoming_road,
                        lane: link.incoming_lane,
                    },
                    link.outgoing,
                    link.turn_type,
                )
            })
        })
    }

    /// Roads used as connecting roads by this junction.
    pub fn connecting_roads(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.connections.iter().map(|c| c.connecting_road)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(id: u32) -> Connection {
        Connection {
            id,
            incoming_road: RoadId::default(),
            connecting_road: RoadId::default(),
            contact_point: ContactPoint::Start,
            lane_links: vec![ConnectionLaneLink {
                incoming_lane: -1,
                connecting_lane: -1,
                outgoing: LaneRef {
                    road: RoadId::default(),
                    lane: 1,
                },
                turn_type: TurnType::Left,
            }],
            corner: false,
        }
    }

    #[test]
    fn connections_are_deduplicated_by_id() {
        let mut junction = JunctionData::new(1, "j");
        assert!(junction.add_connection(connection(7)));
        assert!(!junction.add_connection(connection(7)));
        assert!(junction.add_connection(connection(8)));
        assert_eq!(junction.connections.len(), 2);
        assert_eq!(junction.lane_triples().count(), 2);
    }
}
