use crate::geometry::{pose_on_geometries, GeometryPrimitive, Pose};

use super::junction::JunctionId;
use super::lane::LaneSection;
use super::spline::SplineId;

slotmap::new_key_type! {
    /// Unique identifier for a road segment in the network.
    pub struct RoadId;
}

/// End of a road a link attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPoint {
    Start,
    End,
}

impl ContactPoint {
    /// The other end.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// Predecessor or successor link of a road.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadLink {
    /// Another road, attached at `contact`.
    Road { road: RoadId, contact: ContactPoint },
    /// A junction.
    Junction(JunctionId),
}

impl RoadLink {
    /// Link to the start of `road`.
    #[must_use]
    pub fn road_start(road: RoadId) -> Self {
        Self::Road {
            road,
            contact: ContactPoint::Start,
        }
    }

    /// Link to the end of `road`.
    #[must_use]
    pub fn road_end(road: RoadId) -> Self {
        Self::Road {
            road,
            contact: ContactPoint::End,
        }
    }

    /// Linked road, if the link targets one.
    #[must_use]
    pub fn road(&self) -> Option<RoadId> {
        match *self {
            Self::Road { road, .. } => Some(road),
            Self::Junction(_) => None,
        }
    }
}

/// Data associated with a road segment.
///
/// A road owns its reference-line geometry and lane sections by value; the
/// geometry list covers `[0, length)` contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadData {
    /// Numeric id used by persistence collaborators.
    pub id: u32,
    /// Authored length.
    pub length: f64,
    /// Plan-view geometry, offsets relative to the road start.
    pub geometries: Vec<GeometryPrimitive>,
    /// Lane sections ordered by `s`; the first starts at 0.
    pub lane_sections: Vec<LaneSection>,
    pub predecessor: Option<RoadLink>,
    pub successor: Option<RoadLink>,
    /// Junction this road connects through, for connecting roads.
    pub junction: Option<JunctionId>,
    /// Spline whose segment map owns this road.
    pub spline: Option<SplineId>,
}

impl RoadData {
    /// Creates an unlinked road with a single empty lane section.
    #[must_use]
    pub fn new(id: u32, length: f64) -> Self {
        Self {
            id,
            length,
            geometries: Vec::new(),
            lane_sections: vec![LaneSection::new(0.0)],
            predecessor: None,
            successor: None,
            junction: None,
            spline: None,
        }
    }

    /// Replaces the lane sections.
    #[must_use]
    pub fn with_lane_sections(mut self, sections: Vec<LaneSection>) -> Self {
        self.lane_sections = sections;
        self
    }

    /// Replaces the geometry.
    #[must_use]
    pub fn with_geometries(mut self, geometries: Vec<GeometryPrimitive>) -> Self {
        self.geometries = geometries;
        self
    }

    /// Link at the given end.
    #[must_use]
    pub fn link(&self, contact: ContactPoint) -> Option<RoadLink> {
        match contact {
            ContactPoint::Start => self.predecessor,
            ContactPoint::End => self.successor,
        }
    }

    /// Sets the link at the given end.
    pub fn set_link(&mut self, contact: ContactPoint, link: Option<RoadLink>) {
        match contact {
            ContactPoint::Start => self.predecessor = link,
            ContactPoint::End => self.successor = link,
        }
    }

    /// Offset of the given end.
    #[must_use]
    pub fn contact_s(&self, contact: ContactPoint) -> f64 {
        match contact {
            ContactPoint::Start => 0.0,
            ContactPoint::End => self.length,
        }
    }

    /// Reference-line pose at offset `s`.
    #[must_use]
    pub fn pose_at(&self, s: f64) -> Option<Pose> {
        pose_on_geometries(&self.geometries, s)
    }

    /// Lane section in effect at offset `s`.
    #[must_use]
    pub fn lane_section_at(&self, s: f64) -> Option<&LaneSection> {
        self.lane_sections
            .iter()
            .rev()
            .find(|section| section.s <= s)
            .or_else(|| self.lane_sections.first())
    }

    /// Lane section touching the given end.
    #[must_use]
    pub fn lane_section_at_contact(&self, contact: ContactPoint) -> Option<&LaneSection> {
        match contact {
            ContactPoint::Start => self.lane_sections.first(),
            ContactPoint::End => self.lane_sections.last(),
        }
    }
}
