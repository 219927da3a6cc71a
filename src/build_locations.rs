//! Build-location enumerator: a live index of every point usable for a
//! building or a flag, refreshed incrementally rather than recomputed from
//! scratch each tick (spec §4.4).
//!
//! Grounded on `original_source/libs/s25main/ai/beowulf/BuildLocations.cpp`.
//! The original backs this with a hand-rolled intrusive freelist/doubly
//! linked list to avoid allocation churn; here a `FnvHashMap<Point,
//! BuildingQuality>` gives the same O(1) insert/remove/lookup without unsafe
//! code, which is the idiomatic Rust shape for this kind of index (the
//! teacher's own `layer.rs::PlacementState` keeps its score table as a
//! plain hash map for the same reason).

use crate::building::BuildingQuality;
use crate::error::AgentError;
use crate::hex::{GridDims, Point};
use fnv::FnvHashMap;

pub struct BuildLocations {
    dims: GridDims,
    nodes: FnvHashMap<Point, BuildingQuality>,
    sum: u64,
    calculated: bool,
}

impl BuildLocations {
    pub fn new(dims: GridDims) -> Self {
        BuildLocations {
            dims,
            nodes: FnvHashMap::default(),
            sum: 0,
            calculated: false,
        }
    }

    /// `Calculate(start)` (spec §4.4): discards the whole index and
    /// flood-fills outward from `start` over points connectable by road,
    /// adding every point whose *effective* BQ (`bq_at`, mirroring
    /// `update`'s parameter) exceeds `Flag`.
    pub fn calculate(
        &mut self,
        start: Point,
        bq_at: impl Fn(Point) -> BuildingQuality,
        road_possible: impl FnMut(Point, crate::hex::Direction) -> bool,
    ) {
        self.nodes.clear();
        self.sum = 0;
        let dims = self.dims;
        let mut road_possible = road_possible;
        crate::search::flood_fill(dims, start, &mut road_possible, |pt| {
            let bq = bq_at(pt);
            if bq > BuildingQuality::Flag {
                self.add(pt, bq);
            }
        });
        self.calculated = true;
    }

    /// `Update(pos, radius)` (spec §4.4): re-evaluate every point within
    /// `radius` (clamped to a minimum of 2, per the original) of `pos`,
    /// adding/removing/replacing nodes whose BQ changed.
    pub fn update(&mut self, bq_at: impl Fn(Point) -> BuildingQuality, pos: Point, radius: u32) {
        let radius = radius.max(2);
        let dims = self.dims;
        for dy in -(radius as i32)..=(radius as i32) {
            for dx in -(radius as i32)..=(radius as i32) {
                let x = dims.wrap_x(pos.x() as i32 + dx);
                let y = dims.wrap_y(pos.y() as i32 + dy);
                let pt = Point::new(x, y);
                if dims.distance(pos, pt) > radius {
                    continue;
                }
                let bq = bq_at(pt);
                match self.nodes.get(&pt).copied() {
                    Some(existing) if existing != bq => {
                        self.remove(pt);
                        if bq > BuildingQuality::Flag {
                            self.add(pt, bq);
                        }
                    }
                    None if bq > BuildingQuality::Flag => self.add(pt, bq),
                    _ => {}
                }
            }
        }
    }

    fn add(&mut self, pt: Point, bq: BuildingQuality) {
        self.nodes.insert(pt, bq);
        self.sum += bq.ladder_value() as u64;
    }

    fn remove(&mut self, pt: Point) {
        if let Some(bq) = self.nodes.remove(&pt) {
            self.sum -= bq.ladder_value() as u64;
        }
    }

    /// `Get(bq)` (spec §4.4): every indexed point whose BQ covers `bq`.
    pub fn get(&self, bq: BuildingQuality) -> Result<Vec<Point>, AgentError> {
        if !self.calculated {
            return Err(AgentError::EnumeratorNotCalculated);
        }
        Ok(self.nodes.iter().filter(|(_, have)| have.covers(bq)).map(|(pt, _)| *pt).collect())
    }

    /// `Get(pos)` (spec §4.4): the indexed BQ at a single point, `None` if
    /// not indexed or only flag-capable.
    pub fn bq_at(&self, pos: Point) -> BuildingQuality {
        self.nodes.get(&pos).copied().unwrap_or(BuildingQuality::None)
    }

    /// `GetNearest(pos, amount, bq)` (spec §4.4).
    pub fn get_nearest(&self, pos: Point, amount: usize, bq: BuildingQuality) -> Result<Vec<Point>, AgentError> {
        let candidates = self.get(bq)?;
        Ok(crate::search::k_nearest(self.dims, pos, &candidates, amount))
    }

    /// `GetSum()` (spec §4.4): territory-degradation metric used by the
    /// expansion planner to weigh the cost of claiming more land.
    pub fn get_sum(&self) -> u64 {
        self.sum
    }

    pub fn get_size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_calculated(&self) -> bool {
        self.calculated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FakeEngine;

    fn dims() -> GridDims {
        GridDims::new(16, 16)
    }

    #[test]
    fn calculate_skips_flag_only_points() {
        let mut engine = FakeEngine::new(dims());
        let start = Point::new(4, 4);
        engine.set_terrain_bq(start, BuildingQuality::Flag);
        let mut locs = BuildLocations::new(dims());
        locs.calculate(start, |pt| engine.terrain_bq(pt), |_, _| true);
        assert!(locs.get(BuildingQuality::Flag).unwrap().is_empty());
    }

    #[test]
    fn calculate_indexes_hut_and_above() {
        let mut engine = FakeEngine::new(dims());
        let start = Point::new(4, 4);
        engine.set_terrain_bq(start, BuildingQuality::House);
        let mut locs = BuildLocations::new(dims());
        locs.calculate(start, |pt| engine.terrain_bq(pt), |_, _| true);
        assert_eq!(locs.bq_at(start), BuildingQuality::House);
        assert_eq!(locs.get_sum(), BuildingQuality::House.ladder_value() as u64);
    }

    #[test]
    fn get_before_calculate_errors() {
        let locs = BuildLocations::new(dims());
        assert!(locs.get(BuildingQuality::Hut).is_err());
    }

    #[test]
    fn update_removes_degraded_point() {
        let mut locs = BuildLocations::new(dims());
        let pt = Point::new(5, 5);
        locs.calculated = true;
        locs.add(pt, BuildingQuality::House);
        locs.update(|p| if p == pt { BuildingQuality::Flag } else { BuildingQuality::None }, pt, 1);
        assert!(!locs.nodes.contains_key(&pt));
    }

    #[test]
    fn update_clamps_radius_to_minimum_two() {
        let mut locs = BuildLocations::new(dims());
        let pt = Point::new(5, 5);
        locs.calculated = true;
        locs.update(|p| if p == pt { BuildingQuality::Hut } else { BuildingQuality::None }, pt, 0);
        assert_eq!(locs.bq_at(pt), BuildingQuality::Hut);
    }
}
