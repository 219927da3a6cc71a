//! Road-network tracker: partitions flags into equivalence classes under
//! the "connected by present roads" relation (spec §4.2).
//!
//! Per spec §4.2 and §9 design notes, the incremental split-detection case
//! (flag/road destruction possibly splitting a network) is *not*
//! implemented; any mutation that could disconnect flags marks the tracker
//! dirty and the next query triggers a full rebuild. This matches both the
//! spec's explicit instruction and `original_source`'s own acknowledged
//! incompleteness (`RoadIslands.cpp` / `RoadNetworks.cpp`, where the newer
//! combined representation is the one spec.md tells us to keep).

use crate::hex::{Direction, GridDims, Point};
use fnv::FnvHashMap;
use log::debug;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NetworkId(pub u32);

pub const INVALID_NETWORK: NetworkId = NetworkId(u32::MAX);

pub struct RoadNetworkTracker {
    dims: GridDims,
    ids: FnvHashMap<Point, NetworkId>,
    dirty: bool,
}

impl RoadNetworkTracker {
    pub fn new(dims: GridDims) -> Self {
        RoadNetworkTracker {
            dims,
            ids: FnvHashMap::default(),
            dirty: true,
        }
    }

    /// Mark the tracker dirty; the next `id_of`/`rebuild_if_dirty` call
    /// performs a full rebuild. Call on every road or flag mutation.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn id_of(&mut self, pt: Point, is_flag: impl Fn(Point) -> bool, road_present: impl Fn(Point, Direction) -> bool) -> NetworkId {
        self.rebuild_if_dirty(&is_flag, &road_present);
        if is_flag(pt) {
            self.ids.get(&pt).copied().unwrap_or(INVALID_NETWORK)
        } else {
            INVALID_NETWORK
        }
    }

    pub fn rebuild_if_dirty(&mut self, is_flag: &impl Fn(Point) -> bool, road_present: &impl Fn(Point, Direction) -> bool) {
        if self.dirty {
            self.rebuild(is_flag, road_present);
        }
    }

    /// Full rebuild (spec §4.2): for every flag without an id yet,
    /// flood-fill over present-road edges assigning the next id.
    pub fn rebuild(&mut self, is_flag: &impl Fn(Point) -> bool, road_present: &impl Fn(Point, Direction) -> bool) {
        self.ids.clear();
        let mut next_id = 0u32;

        for pt in self.dims.iter_points() {
            if !is_flag(pt) || self.ids.contains_key(&pt) {
                continue;
            }
            let id = NetworkId(next_id);
            next_id += 1;
            let dims = self.dims;
            let ids = &mut self.ids;
            crate::search::flood_fill(
                dims,
                pt,
                |p, dir| road_present(p, dir),
                |p| {
                    if is_flag(p) {
                        ids.insert(p, id);
                    }
                },
            );
        }

        self.dirty = false;
        debug!("road network rebuild assigned {} networks", next_id);
    }

    pub fn same_network(&mut self, a: Point, b: Point, is_flag: impl Fn(Point) -> bool, road_present: impl Fn(Point, Direction) -> bool) -> bool {
        let ida = self.id_of(a, &is_flag, &road_present);
        let idb = self.id_of(b, &is_flag, &road_present);
        ida != INVALID_NETWORK && ida == idb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_flag_has_id_others_invalid() {
        let dims = GridDims::new(10, 10);
        let mut tracker = RoadNetworkTracker::new(dims);
        let flag = Point::new(3, 3);
        let is_flag = |p: Point| p == flag;
        let road_present = |_: Point, _: Direction| false;
        let id = tracker.id_of(flag, is_flag, road_present);
        assert_ne!(id, INVALID_NETWORK);
        let other = Point::new(4, 4);
        assert_eq!(tracker.id_of(other, is_flag, road_present), INVALID_NETWORK);
    }

    #[test]
    fn connected_flags_share_id() {
        let dims = GridDims::new(10, 10);
        let mut tracker = RoadNetworkTracker::new(dims);
        let a = Point::new(3, 3);
        let b = dims.neighbour(a, Direction::East);
        let is_flag = |p: Point| p == a || p == b;
        let road_present = move |p: Point, dir: Direction| (p == a && dir == Direction::East) || (p == b && dir == Direction::West);
        assert!(tracker.same_network(a, b, is_flag, road_present));
    }

    #[test]
    fn disconnected_flags_differ() {
        let dims = GridDims::new(10, 10);
        let mut tracker = RoadNetworkTracker::new(dims);
        let a = Point::new(3, 3);
        let b = Point::new(7, 7);
        let is_flag = |p: Point| p == a || p == b;
        let road_present = |_: Point, _: Direction| false;
        assert!(!tracker.same_network(a, b, is_flag, road_present));
    }

    #[test]
    fn invalidate_forces_rebuild_on_next_query() {
        let dims = GridDims::new(10, 10);
        let mut tracker = RoadNetworkTracker::new(dims);
        let a = Point::new(3, 3);
        let is_flag = |p: Point| p == a;
        let road_present = |_: Point, _: Direction| false;
        let first = tracker.id_of(a, is_flag, road_present);
        tracker.invalidate();
        let second = tracker.id_of(a, is_flag, road_present);
        assert_eq!(first, second);
    }
}
