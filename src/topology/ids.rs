/// Allocator for the numeric ids of roads, junctions and connections.
///
/// Owned by a [`RoadNetwork`](super::RoadNetwork) so that separate networks
/// never share counters.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    road: u32,
    junction: u32,
    connection: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first ids are 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_road(&mut self) -> u32 {
        self.road += 1;
        self.road
    }

    pub fn next_junction(&mut self) -> u32 {
        self.junction += 1;
        self.junction
    }

    pub fn next_connection(&mut self) -> u32 {
        self.connection += 1;
        self.connection
    }

    /// Makes sure later road ids exceed `id`, for imported roads.
    pub fn reserve_road(&mut self, id: u32) {
        self.road = self.road.max(id);
    }
}
