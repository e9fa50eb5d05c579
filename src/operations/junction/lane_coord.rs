use crate::error::{OperationError, Result};
use crate::geometry::Pose;
use crate::topology::{ContactPoint, Lane, LaneRef, LaneType, RoadData, RoadId};

use super::{RoadEnd, TrafficRule};

/// Direction of travel relative to the junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Travelling into the junction.
    Entering,
    /// Travelling out of the junction.
    Leaving,
}

/// Where a lane meets a junction: the lane, the road offset of the contact,
/// and the lane-center pose oriented in the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneCoord {
    pub road: RoadId,
    pub lane: i32,
    pub s: f64,
    pub contact: ContactPoint,
    pub lane_type: LaneType,
    pub pose: Pose,
    pub width: f64,
    /// Inner and outer border height.
    pub height: (f64, f64),
}

impl LaneCoord {
    #[must_use]
    pub fn lane_ref(&self) -> LaneRef {
        LaneRef {
            road: self.road,
            lane: self.lane,
        }
    }
}

/// Whether traffic with the given flow at `contact` moves towards
/// increasing `s`.
fn travels_forward(contact: ContactPoint, flow: Flow) -> bool {
    (flow == Flow::Entering) == (contact == ContactPoint::End)
}

/// Reference-line pose at the road end, oriented with the flow.
#[must_use]
pub fn reference_pose(road: &RoadData, contact: ContactPoint, flow: Flow) -> Option<Pose> {
    let pose = road.pose_at(road.contact_s(contact))?;
    Some(if travels_forward(contact, flow) {
        pose
    } else {
        pose.reversed()
    })
}

/// Connectable lanes carrying traffic with the given flow at a road end,
/// innermost first.
///
/// Under right-hand traffic the right lanes (negative ids) run towards
/// increasing `s`; left-hand traffic mirrors that.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if the road has no geometry or
/// no lane sections.
pub fn lane_coords(
    id: RoadId,
    road: &RoadData,
    end: RoadEnd,
    flow: Flow,
    rule: TrafficRule,
) -> Result<Vec<LaneCoord>> {
    let s = road.contact_s(end.contact);
    let reference = road
        .pose_at(s)
        .ok_or_else(|| OperationError::InvalidInput(format!("road {} has no geometry", road.id)))?;
    let section = road.lane_section_at_contact(end.contact).ok_or_else(|| {
        OperationError::InvalidInput(format!("road {} has no lane sections", road.id))
    })?;
    let local = s - section.s;

    let forward = travels_forward(end.contact, flow);
    let right_is_forward = rule == TrafficRule::RightHand;
    let lanes: Vec<&Lane> = if forward == right_is_forward {
        section.right_lanes().collect()
    } else {
        section.left_lanes().collect()
    };

    Ok(lanes
        .into_iter()
        .filter(|lane| lane.lane_type.is_connectable())
        .filter_map(|lane| {
            let offset = section.lane_center_offset(lane.id, local)?;
            let pose = reference.lateral(offset);
            Some(LaneCoord {
                road: id,
                lane: lane.id,
                s,
                contact: end.contact,
                lane_type: lane.lane_type,
                pose: if forward { pose } else { pose.reversed() },
                width: lane.width_at(local),
                height: lane.height_at(local),
            })
        })
        .collect())
}
