pub mod ids;
pub mod junction;
pub mod lane;
pub mod road;
pub mod spline;

pub use ids::IdAllocator;
pub use junction::{
    Connection, ConnectionLaneLink, JunctionData, JunctionId, LaneRef, TurnType,
};
pub use lane::{Lane, LaneHeight, LaneSection, LaneType, LaneWidth};
pub use road::{ContactPoint, RoadData, RoadId, RoadLink};
pub use spline::{SegmentMap, SegmentRef, SplineData, SplineId};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Change notification for collaborators that mirror the network
/// (mesh builders, scene placement, persistence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    RoadAdded(RoadId),
    RoadRemoved(RoadId),
    /// The road's geometry or length changed and dependent data must be rebuilt.
    GeometryChanged(RoadId),
    JunctionChanged(JunctionId),
    JunctionRemoved(JunctionId),
}

/// Central arena that owns roads, junctions and splines.
///
/// Entities reference each other via typed IDs (generational indices), so
/// lane, road, junction and connection cross references never form
/// ownership cycles.
#[derive(Debug, Default)]
pub struct RoadNetwork {
    roads: SlotMap<RoadId, RoadData>,
    junctions: SlotMap<JunctionId, JunctionData>,
    splines: SlotMap<SplineId, SplineData>,
    ids: IdAllocator,
    events: Vec<NetworkEvent>,
}

impl RoadNetwork {
    /// Creates a new, empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric id allocator of this network.
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Queues a change notification.
    pub fn emit(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }

    /// Takes all queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<NetworkEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Road operations ---

    /// Inserts a road and returns its ID.
    pub fn add_road(&mut self, data: RoadData) -> RoadId {
        self.ids.reserve_road(data.id);
        let id = self.roads.insert(data);
        self.emit(NetworkEvent::RoadAdded(id));
        id
    }

    /// Inserts an unlinked road of the given length with a freshly
    /// allocated numeric id.
    pub fn create_road(&mut self, length: f64) -> RoadId {
        let id = self.ids.next_road();
        self.add_road(RoadData::new(id, length))
    }

    /// Returns a reference to the road data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn road(&self, id: RoadId) -> Result<&RoadData, TopologyError> {
        self.roads
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("road".into()))
    }

    /// Returns a mutable reference to the road data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn road_mut(&mut self, id: RoadId) -> Result<&mut RoadData, TopologyError> {
        self.roads
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("road".into()))
    }

    /// Removes a road and returns its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn remove_road(&mut self, id: RoadId) -> Result<RoadData, TopologyError> {
        let data = self
            .roads
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("road".into()))?;
        self.emit(NetworkEvent::RoadRemoved(id));
        Ok(data)
    }

    /// Removes a connecting road together with its spline, unless the
    /// spline still owns other segments. Missing roads are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the road's spline is missing.
    pub fn remove_connecting_road(&mut self, id: RoadId) -> Result<(), TopologyError> {
        let Some(data) = self.roads.remove(id) else {
            return Ok(());
        };
        self.emit(NetworkEvent::RoadRemoved(id));
        if let Some(spline) = data.spline {
            let segments = &mut self.spline_mut(spline)?.segments;
            segments.remove(SegmentRef::Road(id));
            if segments.is_empty() {
                self.splines.remove(spline);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn contains_road(&self, id: RoadId) -> bool {
        self.roads.contains_key(id)
    }

    /// Iterates over all roads.
    pub fn roads(&self) -> impl Iterator<Item = (RoadId, &RoadData)> {
        self.roads.iter()
    }

    // --- Junction operations ---

    /// Inserts a junction and returns its ID.
    pub fn add_junction(&mut self, data: JunctionData) -> JunctionId {
        let id = self.junctions.insert(data);
        self.emit(NetworkEvent::JunctionChanged(id));
        id
    }

    /// Inserts an empty junction with a freshly allocated numeric id.
    pub fn create_junction(&mut self, name: &str) -> JunctionId {
        let id = self.ids.next_junction();
        self.add_junction(JunctionData::new(id, name))
    }

    /// Returns a reference to the junction data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn junction(&self, id: JunctionId) -> Result<&JunctionData, TopologyError> {
        self.junctions
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("junction".into()))
    }

    /// Returns a mutable reference to the junction data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn junction_mut(&mut self, id: JunctionId) -> Result<&mut JunctionData, TopologyError> {
        self.junctions
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("junction".into()))
    }

    /// Removes a junction and returns its data. Connecting roads are left
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn remove_junction(&mut self, id: JunctionId) -> Result<JunctionData, TopologyError> {
        let data = self
            .junctions
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("junction".into()))?;
        self.emit(NetworkEvent::JunctionRemoved(id));
        Ok(data)
    }

    #[must_use]
    pub fn contains_junction(&self, id: JunctionId) -> bool {
        self.junctions.contains_key(id)
    }

    /// Iterates over all junctions.
    pub fn junctions(&self) -> impl Iterator<Item = (JunctionId, &JunctionData)> {
        self.junctions.iter()
    }

    // --- Spline operations ---

    /// Inserts a spline and returns its ID.
    pub fn add_spline(&mut self, data: SplineData) -> SplineId {
        self.splines.insert(data)
    }

    /// Returns a reference to the spline data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn spline(&self, id: SplineId) -> Result<&SplineData, TopologyError> {
        self.splines
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("spline".into()))
    }

    /// Returns a mutable reference to the spline data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn spline_mut(&mut self, id: SplineId) -> Result<&mut SplineData, TopologyError> {
        self.splines
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("spline".into()))
    }

    /// Removes a spline and returns its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the network.
    pub fn remove_spline(&mut self, id: SplineId) -> Result<SplineData, TopologyError> {
        self.splines
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("spline".into()))
    }

    /// Resolves a segment reference against the arena.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::UnknownSegmentType` if the reference names
    /// neither a live road nor a live junction.
    pub fn check_segment(&self, segment: SegmentRef) -> Result<(), TopologyError> {
        let known = match segment {
            SegmentRef::Road(id) => self.contains_road(id),
            SegmentRef::Junction(id) => self.contains_junction(id),
        };
        if known {
            Ok(())
        } else {
            Err(TopologyError::UnknownSegmentType(format!("{segment:?}")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn road_lifecycle_emits_events() {
        let mut network = RoadNetwork::new();
        let road = network.create_road(10.0);
        assert_eq!(network.road(road).unwrap().id, 1);
        network.remove_road(road).unwrap();
        assert!(network.road(road).is_err());
        assert_eq!(
            network.drain_events(),
            vec![NetworkEvent::RoadAdded(road), NetworkEvent::RoadRemoved(road)]
        );
        assert!(network.drain_events().is_empty());
    }

    #[test]
    fn stale_segment_is_unknown() {
        let mut network = RoadNetwork::new();
        let junction = network.create_junction("j");
        assert!(network.check_segment(SegmentRef::Junction(junction)).is_ok());
        network.remove_junction(junction).unwrap();
        assert!(matches!(
            network.check_segment(SegmentRef::Junction(junction)),
            Err(TopologyError::UnknownSegmentType(_))
        ));
    }

    #[test]
    fn imported_ids_are_reserved() {
        let mut network = RoadNetwork::new();
        network.add_road(RoadData::new(40, 5.0));
        let road = network.create_road(5.0);
        assert_eq!(network.road(road).unwrap().id, 41);
    }
}
