use std::collections::BTreeMap;

/// Lane usage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LaneType {
    #[default]
    Driving,
    Biking,
    Sidewalk,
    Shoulder,
    Border,
    Parking,
    Median,
    /// Center-lane placeholder and other non-drivable lanes.
    None,
}

impl LaneType {
    /// Whether lanes of this type are linked through junctions.
    #[must_use]
    pub fn is_connectable(self) -> bool {
        matches!(self, Self::Driving | Self::Biking)
    }
}

/// Cubic lane width record: `a + b ds + c ds² + d ds³` with `ds` measured
/// from `s_offset` within the lane section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneWidth {
    pub s_offset: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl LaneWidth {
    /// Constant width starting at `s_offset`.
    #[must_use]
    pub fn constant(s_offset: f64, width: f64) -> Self {
        Self {
            s_offset,
            a: width,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        }
    }

    /// Evaluates the polynomial at section offset `s`.
    #[must_use]
    pub fn eval(&self, s: f64) -> f64 {
        let ds = s - self.s_offset;
        self.a + ds * (self.b + ds * (self.c + ds * self.d))
    }
}

/// Height knot of a lane's inner and outer border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneHeight {
    pub s_offset: f64,
    pub inner: f64,
    pub outer: f64,
}

/// A single lane of a lane section.
///
/// Ids follow the plan-view convention: positive on the left of the
/// reference line, negative on the right, `0` for the center lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id: i32,
    pub lane_type: LaneType,
    /// Width records ordered by `s_offset`.
    pub widths: Vec<LaneWidth>,
    /// Height knots ordered by `s_offset`.
    pub heights: Vec<LaneHeight>,
    /// Lane id in the predecessor road or section.
    pub predecessor: Option<i32>,
    /// Lane id in the successor road or section.
    pub successor: Option<i32>,
}

impl Lane {
    /// Creates a lane without width records.
    #[must_use]
    pub fn new(id: i32, lane_type: LaneType) -> Self {
        Self {
            id,
            lane_type,
            widths: Vec::new(),
            heights: Vec::new(),
            predecessor: None,
            successor: None,
        }
    }

    /// Creates the zero-width center lane.
    #[must_use]
    pub fn center() -> Self {
        Self::new(0, LaneType::None)
    }

    /// Adds a constant width starting at the section start.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.widths.push(LaneWidth::constant(0.0, width));
        self
    }

    /// Width at section offset `s`.
    #[must_use]
    pub fn width_at(&self, s: f64) -> f64 {
        self.widths
            .iter()
            .rev()
            .find(|w| w.s_offset <= s)
            .or_else(|| self.widths.first())
            .map_or(0.0, |w| w.eval(s))
    }

    /// Inner and outer border height at section offset `s`, linearly
    /// interpolated between knots and held constant past the last one.
    #[must_use]
    pub fn height_at(&self, s: f64) -> (f64, f64) {
        let Some(first) = self.heights.first() else {
            return (0.0, 0.0);
        };
        if s <= first.s_offset {
            return (first.inner, first.outer);
        }
        for pair in self.heights.windows(2) {
            let (h0, h1) = (pair[0], pair[1]);
            if s <= h1.s_offset {
                let span = h1.s_offset - h0.s_offset;
                let t = if span > 0.0 { (s - h0.s_offset) / span } else { 1.0 };
                return (
                    h0.inner + t * (h1.inner - h0.inner),
                    h0.outer + t * (h1.outer - h0.outer),
                );
            }
        }
        self.heights
            .last()
            .map_or((0.0, 0.0), |h| (h.inner, h.outer))
    }
}

/// A lateral cross-section of a road, valid from `s` to the next section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaneSection {
    /// Start offset along the road.
    pub s: f64,
    /// Lanes keyed by id.
    pub lanes: BTreeMap<i32, Lane>,
}

impl LaneSection {
    /// Creates a section holding only the center lane.
    #[must_use]
    pub fn new(s: f64) -> Self {
        let mut lanes = BTreeMap::new();
        lanes.insert(0, Lane::center());
        Self { s, lanes }
    }

    /// Adds or replaces a lane.
    #[must_use]
    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lanes.insert(lane.id, lane);
        self
    }

    /// Returns the lane with the given id.
    #[must_use]
    pub fn lane(&self, id: i32) -> Option<&Lane> {
        self.lanes.get(&id)
    }

    /// Lanes right of the reference line, innermost first.
    pub fn right_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.range(..0).rev().map(|(_, lane)| lane)
    }

    /// Lanes left of the reference line, innermost first.
    pub fn left_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.range(1..).map(|(_, lane)| lane)
    }

    /// Lane ids and types, ordered by id. Two sections with the same layout
    /// can be joined without relinking lanes.
    #[must_use]
    pub fn layout(&self) -> Vec<(i32, LaneType)> {
        self.lanes.values().map(|l| (l.id, l.lane_type)).collect()
    }

    /// Lateral offset of the center of lane `id` at section offset `s`;
    /// positive values are left of the reference line.
    #[must_use]
    pub fn lane_center_offset(&self, id: i32, s: f64) -> Option<f64> {
        let lane = self.lanes.get(&id)?;
        let half = 0.5 * lane.width_at(s);
        let inner: f64 = match id.signum() {
            1 => self.lanes.range(1..id).map(|(_, l)| l.width_at(s)).sum(),
            -1 => self.lanes.range(id + 1..0).map(|(_, l)| l.width_at(s)).sum(),
            _ => return Some(0.0),
        };
        Some(f64::from(id.signum()) * (inner + half))
    }
}
