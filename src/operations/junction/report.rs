use thiserror::Error;

use crate::topology::RoadId;

/// Why a lane or road pair was skipped during a junction pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionFailure {
    /// No unused exit lane of a compatible type exists for the lane.
    #[error("no compatible exit lane")]
    NoCompatibleExit,
    /// Building the connecting road failed.
    #[error("connecting road geometry failed: {0}")]
    Geometry(String),
}

/// One skipped lane or road pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDiagnostic {
    pub incoming_road: RoadId,
    /// Outgoing road, when the failure concerns a specific pair.
    pub outgoing_road: Option<RoadId>,
    /// Incoming lane, when the failure concerns a single lane.
    pub lane: Option<i32>,
    pub failure: ConnectionFailure,
}

/// Outcome of a junction pass: what was built and what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JunctionBuildReport {
    /// Ids of the connections added to the junction.
    pub connections: Vec<u32>,
    /// Connecting roads created by the pass.
    pub connecting_roads: Vec<RoadId>,
    pub diagnostics: Vec<ConnectionDiagnostic>,
}

impl JunctionBuildReport {
    /// Whether the pass skipped nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub(super) fn skip(
        &mut self,
        incoming_road: RoadId,
        outgoing_road: Option<RoadId>,
        lane: Option<i32>,
        failure: ConnectionFailure,
    ) {
        tracing::warn!(?incoming_road, ?outgoing_road, ?lane, %failure, "skipping junction connection");
        self.diagnostics.push(ConnectionDiagnostic {
            incoming_road,
            outgoing_road,
            lane,
            failure,
        });
    }
}
