use crate::error::{Result, TopologyError};
use crate::geometry::{total_length, ControlPoint, GeometryPrimitive, SplineKind};

use super::junction::JunctionId;
use super::road::RoadId;

slotmap::new_key_type! {
    /// Unique identifier for a spline in the network.
    pub struct SplineId;
}

/// Segment owning a range of a spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRef {
    Road(RoadId),
    Junction(JunctionId),
}

/// Ordered association from arc-length offset to owning segment.
///
/// Keys are strictly increasing; each segment owns `[s_i, s_{i+1})`, and the
/// last one runs to the end of the spline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentMap {
    entries: Vec<(f64, SegmentRef)>,
}

impl SegmentMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, SegmentRef)> + '_ {
        self.entries.iter().copied()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(f64, SegmentRef)> {
        self.entries.get(index).copied()
    }

    /// Inserts `segment` at `s`, keeping keys ordered.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::DuplicateSegmentOffset` if a segment already
    /// starts at `s`, or `TopologyError::InvalidTopology` if `segment` is
    /// already in the map.
    pub fn insert(&mut self, s: f64, segment: SegmentRef) -> Result<usize> {
        if self.position(segment).is_some() {
            return Err(TopologyError::InvalidTopology(format!(
                "{segment:?} is already in the segment map"
            ))
            .into());
        }
        match self.entries.binary_search_by(|(key, _)| key.total_cmp(&s)) {
            Ok(_) => Err(TopologyError::DuplicateSegmentOffset(s).into()),
            Err(index) => {
                self.entries.insert(index, (s, segment));
                Ok(index)
            }
        }
    }

    /// Removes `segment`, returning its index and offset.
    pub fn remove(&mut self, segment: SegmentRef) -> Option<(usize, f64)> {
        let index = self.position(segment)?;
        let (s, _) = self.entries.remove(index);
        Some((index, s))
    }

    /// Index of `segment`.
    #[must_use]
    pub fn position(&self, segment: SegmentRef) -> Option<usize> {
        self.entries.iter().position(|(_, seg)| *seg == segment)
    }

    /// Offset at which `segment` starts.
    #[must_use]
    pub fn offset_of(&self, segment: SegmentRef) -> Option<f64> {
        self.position(segment).map(|i| self.entries[i].0)
    }

    /// Index of the segment whose range contains `s`.
    #[must_use]
    pub fn index_at(&self, s: f64) -> Option<usize> {
        self.entries.iter().rposition(|(key, _)| *key <= s)
    }

    /// Moves the entry at `index` to offset `s`.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidTopology` if `index` is out of range
    /// or the new key would break the ordering.
    pub fn rekey(&mut self, index: usize, s: f64) -> Result<()> {
        let ordered_before = index
            .checked_sub(1)
            .is_none_or(|i| self.entries.get(i).is_some_and(|(prev, _)| *prev < s));
        let ordered_after = self.entries.get(index + 1).is_none_or(|(next, _)| s < *next);
        match self.entries.get_mut(index) {
            Some(entry) if ordered_before && ordered_after => {
                entry.0 = s;
                Ok(())
            }
            _ => Err(TopologyError::InvalidTopology(format!(
                "cannot move segment {index} to s = {s}"
            ))
            .into()),
        }
    }

    /// Arc-length window `[start, end)` of the entry at `index`; `end` is
    /// `None` for the last entry.
    #[must_use]
    pub fn window(&self, index: usize) -> Option<(f64, Option<f64>)> {
        let (start, _) = self.entries.get(index)?;
        Some((*start, self.entries.get(index + 1).map(|(s, _)| *s)))
    }
}

/// A user-authored curve and the segments that own its ranges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplineData {
    pub control_points: Vec<ControlPoint>,
    pub kind: SplineKind,
    pub closed: bool,
    pub segments: SegmentMap,
    /// Primitives of the whole curve, offsets relative to its start.
    /// Recomputed wholesale when the control points change.
    pub geometries: Vec<GeometryPrimitive>,
}

impl SplineData {
    /// Creates an open spline.
    #[must_use]
    pub fn new(kind: SplineKind, control_points: Vec<ControlPoint>) -> Self {
        Self {
            control_points,
            kind,
            ..Self::default()
        }
    }

    /// Total arc length of the current geometry.
    #[must_use]
    pub fn length(&self) -> f64 {
        total_length(&self.geometries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoadspineError;
    use slotmap::SlotMap;

    fn roads(n: usize) -> Vec<RoadId> {
        let mut map: SlotMap<RoadId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn keys_stay_sorted_and_unique() {
        let r = roads(3);
        let mut map = SegmentMap::new();
        map.insert(50.0, SegmentRef::Road(r[1])).unwrap();
        map.insert(0.0, SegmentRef::Road(r[0])).unwrap();
        assert_eq!(map.insert(80.0, SegmentRef::Road(r[2])).unwrap(), 2);
        let keys: Vec<f64> = map.iter().map(|(s, _)| s).collect();
        assert_eq!(keys, vec![0.0, 50.0, 80.0]);

        assert!(map.insert(50.0, SegmentRef::Road(r[2])).is_err());
        assert!(map.insert(60.0, SegmentRef::Road(r[0])).is_err());
    }

    #[test]
    fn rekey_rejects_out_of_range_and_unordered() {
        let r = roads(2);
        let mut map = SegmentMap::new();
        map.insert(0.0, SegmentRef::Road(r[0])).unwrap();
        map.insert(10.0, SegmentRef::Road(r[1])).unwrap();

        assert!(matches!(
            map.rekey(5, 50.0),
            Err(RoadspineError::Topology(TopologyError::InvalidTopology(_)))
        ));
        assert!(map.rekey(2, 50.0).is_err());
        assert!(map.rekey(1, 0.0).is_err());
        map.rekey(1, 4.0).unwrap();
        assert_eq!(map.offset_of(SegmentRef::Road(r[1])), Some(4.0));
    }

    #[test]
    fn windows_and_lookup() {
        let r = roads(2);
        let mut map = SegmentMap::new();
        map.insert(0.0, SegmentRef::Road(r[0])).unwrap();
        map.insert(30.0, SegmentRef::Road(r[1])).unwrap();
        assert_eq!(map.window(0), Some((0.0, Some(30.0))));
        assert_eq!(map.window(1), Some((30.0, None)));
        assert_eq!(map.index_at(29.9), Some(0));
        assert_eq!(map.index_at(30.0), Some(1));
        assert_eq!(map.offset_of(SegmentRef::Road(r[1])), Some(30.0));
    }

    #[test]
    fn rekey_respects_order() {
        let r = roads(2);
        let mut map = SegmentMap::new();
        map.insert(5.0, SegmentRef::Road(r[0])).unwrap();
        map.insert(30.0, SegmentRef::Road(r[1])).unwrap();
        map.rekey(0, 0.0).unwrap();
        assert!(map.rekey(0, 40.0).is_err());
        assert_eq!(map.remove(SegmentRef::Road(r[0])), Some((0, 0.0)));
        assert!(map.remove(SegmentRef::Road(r[0])).is_none());
    }
}
