mod connecting_road;
mod lane_coord;
mod prune;
mod report;
mod turn_type;

pub use lane_coord::{lane_coords, reference_pose, Flow, LaneCoord};
pub use prune::{PruneJunctions, PruneReport};
pub use report::{ConnectionDiagnostic, ConnectionFailure, JunctionBuildReport};
pub use turn_type::determine_turn_type;

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use crate::error::Result;
use crate::math::{normalize_angle, COORDINATE_TOLERANCE};
use crate::operations::decompose::GeometryParams;
use crate::topology::{
    Connection, ConnectionLaneLink, ContactPoint, JunctionId, LaneRef, NetworkEvent, RoadId,
    RoadLink, RoadNetwork, TurnType,
};

use connecting_road::{add_connecting_lane, create_connecting_road};

/// Side of the road traffic keeps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrafficRule {
    #[default]
    RightHand,
    LeftHand,
}

/// How an incoming lane picks its exit lane among the compatible, unused
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitSelection {
    /// First candidate in innermost-first order.
    #[default]
    FirstCompatible,
    /// Candidate whose lane center is closest to the entry lane center.
    Nearest,
}

/// Parameters controlling junction connection building.
#[derive(Debug, Clone, Copy)]
pub struct JunctionParams {
    pub traffic_rule: TrafficRule,
    /// Heading changes below this are straight maneuvers.
    pub straight_angle: f64,
    /// Heading changes above this are U-turns.
    pub u_turn_angle: f64,
    pub exit_selection: ExitSelection,
    /// Width differences up to this are treated as constant width.
    pub coordinate_tolerance: f64,
    /// Fitting parameters for connecting-road reference lines.
    pub geometry: GeometryParams,
}

impl Default for JunctionParams {
    fn default() -> Self {
        Self {
            traffic_rule: TrafficRule::default(),
            straight_angle: PI / 6.0,
            u_turn_angle: 5.0 * PI / 6.0,
            exit_selection: ExitSelection::default(),
            coordinate_tolerance: COORDINATE_TOLERANCE,
            geometry: GeometryParams::default(),
        }
    }
}

/// End of a road meeting a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadEnd {
    pub road: RoadId,
    pub contact: ContactPoint,
}

impl RoadEnd {
    #[must_use]
    pub fn new(road: RoadId, contact: ContactPoint) -> Self {
        Self { road, contact }
    }
}

/// Mutable bookkeeping of one junction pass.
#[derive(Default)]
struct PassState {
    /// Exit lanes already taken, per turn type.
    used: HashSet<(LaneRef, TurnType)>,
    /// Incoming lanes already connected, per outgoing road.
    linked: HashSet<(LaneRef, RoadId)>,
    /// Connections created by this pass.
    connections: Vec<Connection>,
    /// Connection index per (incoming link, outgoing link).
    by_pair: HashMap<(usize, usize), usize>,
}

/// Builds lane-to-lane connections for a junction from the road ends that
/// meet it.
///
/// Every unordered pair of links on different roads is processed in both
/// directions. Each incoming lane is matched to an exit lane of the same
/// type that is not yet used for the same turn type; lanes of one
/// road-to-road maneuver share a connecting road. Failures are collected in
/// the report and never abort the pass. Re-running a pass on an unchanged
/// junction adds nothing.
#[derive(Debug)]
pub struct BuildJunctionConnections {
    junction: JunctionId,
    links: Vec<RoadEnd>,
    params: JunctionParams,
}

impl BuildJunctionConnections {
    /// Creates a new `BuildJunctionConnections` operation.
    #[must_use]
    pub fn new(junction: JunctionId, links: Vec<RoadEnd>) -> Self {
        Self {
            junction,
            links,
            params: JunctionParams::default(),
        }
    }

    /// Sets custom junction parameters.
    #[must_use]
    pub fn with_params(mut self, params: JunctionParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the pass and adds the new connections to the junction.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EntityNotFound` if the junction or one of the
    /// linked roads is missing.
    pub fn execute(&self, network: &mut RoadNetwork) -> Result<JunctionBuildReport> {
        let existing = network.junction(self.junction)?;
        let mut state = PassState {
            used: existing.lane_triples().map(|(_, out, turn)| (out, turn)).collect(),
            linked: existing
                .lane_triples()
                .map(|(incoming, out, _)| (incoming, out.road))
                .collect(),
            ..PassState::default()
        };

        let mut eligible = Vec::with_capacity(self.links.len());
        for link in &self.links {
            eligible.push(network.road(link.road)?.junction.is_none());
        }
        let corners = self.corner_targets(network, &eligible);

        let mut report = JunctionBuildReport::default();
        for i in 0..self.links.len() {
            for j in i + 1..self.links.len() {
                if self.links[i].road == self.links[j].road || !eligible[i] || !eligible[j] {
                    continue;
                }
                for (a, b) in [(i, j), (j, i)] {
                    let corner = corners[a] == Some(b);
                    self.connect(network, a, b, corner, &mut state, &mut report)?;
                }
            }
        }

        let junction = network.junction_mut(self.junction)?;
        for connection in state.connections {
            let id = connection.id;
            if junction.add_connection(connection) {
                report.connections.push(id);
            }
        }
        for link in &self.links {
            let road = network.road_mut(link.road)?;
            if road.link(link.contact).is_none() {
                road.set_link(link.contact, Some(RoadLink::Junction(self.junction)));
            }
        }
        network.emit(NetworkEvent::JunctionChanged(self.junction));

        tracing::debug!(
            junction = ?self.junction,
            connections = report.connections.len(),
            connecting_roads = report.connecting_roads.len(),
            skipped = report.diagnostics.len(),
            "junction pass finished"
        );
        Ok(report)
    }

    /// Connects the lanes entering through link `a` to the lanes leaving
    /// through link `b`.
    fn connect(
        &self,
        network: &mut RoadNetwork,
        a: usize,
        b: usize,
        corner: bool,
        state: &mut PassState,
        report: &mut JunctionBuildReport,
    ) -> Result<()> {
        let (incoming, outgoing) = (self.links[a], self.links[b]);
        let rule = self.params.traffic_rule;
        let entries = lane_coords(
            incoming.road,
            network.road(incoming.road)?,
            incoming,
            Flow::Entering,
            rule,
        );
        let exits = lane_coords(
            outgoing.road,
            network.road(outgoing.road)?,
            outgoing,
            Flow::Leaving,
            rule,
        );
        let (entries, exits) = match (entries, exits) {
            (Ok(entries), Ok(exits)) => (entries, exits),
            (Err(err), _) | (_, Err(err)) => {
                report.skip(
                    incoming.road,
                    Some(outgoing.road),
                    None,
                    ConnectionFailure::Geometry(err.to_string()),
                );
                return Ok(());
            }
        };

        for entry in &entries {
            if state.linked.contains(&(entry.lane_ref(), outgoing.road)) {
                continue;
            }
            let Some((exit, turn_type)) = self.select_exit(entry, &exits, &state.used) else {
                report.skip(
                    incoming.road,
                    Some(outgoing.road),
                    Some(entry.lane),
                    ConnectionFailure::NoCompatibleExit,
                );
                continue;
            };

            let index = if let Some(index) = state.by_pair.get(&(a, b)).copied() {
                index
            } else {
                match create_connecting_road(network, self.junction, incoming, outgoing, &self.params)
                {
                    Ok(road) => {
                        report.connecting_roads.push(road);
                        state.connections.push(Connection {
                            id: network.ids_mut().next_connection(),
                            incoming_road: incoming.road,
                            connecting_road: road,
                            contact_point: ContactPoint::Start,
                            lane_links: Vec::new(),
                            corner,
                        });
                        let index = state.connections.len() - 1;
                        state.by_pair.insert((a, b), index);
                        index
                    }
                    Err(err) => {
                        report.skip(
                            incoming.road,
                            Some(outgoing.road),
                            None,
                            ConnectionFailure::Geometry(err.to_string()),
                        );
                        return Ok(());
                    }
                }
            };

            let connection = &mut state.connections[index];
            match add_connecting_lane(network, connection.connecting_road, entry, exit, &self.params) {
                Ok(connecting_lane) => {
                    connection.lane_links.push(ConnectionLaneLink {
                        incoming_lane: entry.lane,
                        connecting_lane,
                        outgoing: exit.lane_ref(),
                        turn_type,
                    });
                    state.used.insert((exit.lane_ref(), turn_type));
                    state.linked.insert((entry.lane_ref(), outgoing.road));
                }
                Err(err) => report.skip(
                    incoming.road,
                    Some(outgoing.road),
                    Some(entry.lane),
                    ConnectionFailure::Geometry(err.to_string()),
                ),
            }
        }
        Ok(())
    }

    /// Picks the exit lane for `entry` among lanes of the same type not yet
    /// used for the resulting turn type.
    fn select_exit<'e>(
        &self,
        entry: &LaneCoord,
        exits: &'e [LaneCoord],
        used: &HashSet<(LaneRef, TurnType)>,
    ) -> Option<(&'e LaneCoord, TurnType)> {
        let mut candidates = exits.iter().filter_map(|exit| {
            if exit.lane_type != entry.lane_type {
                return None;
            }
            let turn = determine_turn_type(entry.pose.heading, exit.pose.heading, &self.params);
            (!used.contains(&(exit.lane_ref(), turn))).then_some((exit, turn))
        });
        match self.params.exit_selection {
            ExitSelection::FirstCompatible => candidates.next(),
            ExitSelection::Nearest => candidates.min_by(|(x, _), (y, _)| {
                let dx = (x.pose.position() - entry.pose.position()).norm();
                let dy = (y.pose.position() - entry.pose.position()).norm();
                dx.total_cmp(&dy)
            }),
        }
    }

    /// For every link, the link reached by its sharpest turn towards the
    /// traffic side (right under right-hand traffic). That maneuver hugs the
    /// corner between two adjacent roads.
    fn corner_targets(&self, network: &RoadNetwork, eligible: &[bool]) -> Vec<Option<usize>> {
        let poses: Vec<_> = self
            .links
            .iter()
            .map(|link| {
                let road = network.road(link.road).ok()?;
                Some((
                    reference_pose(road, link.contact, Flow::Entering)?,
                    reference_pose(road, link.contact, Flow::Leaving)?,
                ))
            })
            .collect();
        let side = match self.params.traffic_rule {
            TrafficRule::RightHand => -1.0,
            TrafficRule::LeftHand => 1.0,
        };

        (0..self.links.len())
            .map(|a| {
                let (entering, _) = poses[a]?;
                if !eligible[a] {
                    return None;
                }
                (0..self.links.len())
                    .filter(|&b| b != a && eligible[b] && self.links[b].road != self.links[a].road)
                    .filter_map(|b| {
                        let (_, leaving) = poses[b]?;
                        let delta = side * normalize_angle(leaving.heading - entering.heading);
                        let turn = determine_turn_type(entering.heading, leaving.heading, &self.params);
                        matches!(turn, TurnType::Left | TurnType::Right)
                            .then_some((b, delta))
                            .filter(|(_, d)| *d > 0.0)
                    })
                    .max_by(|(_, x), (_, y)| x.total_cmp(y))
                    .map(|(b, _)| b)
            })
            .collect()
    }
}
