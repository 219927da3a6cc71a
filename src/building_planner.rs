//! Building placement planner: per-region FIFO request queues, one search
//! batch per decision tick, blacklist-on-failure (spec §4.4/§4.8 "Building
//! Planner").
//!
//! Grounded on
//! `original_source/libs/s25main/ai/beowulf/recurrent/BuildingPlanner.cpp`.
//! One region's queue is drained per call to [`BuildingPlanner::run`]
//! (the original's `OnRun` does the same, one `Search`+`Execute` pass per
//! recurrent tick), sorted fixed-point-first then by group, then placed
//! one by one against a `BuildLocations` snapshot anchored at that region.

use crate::build_locations::BuildLocations;
use crate::building::{BuildingId, BuildingQuality, BuildingType};
use crate::config::AgentConfig;
use crate::engine::Engine;
use crate::hex::Point;
use crate::resources::ResourceMap;
use crate::road_manager::RoadManager;
use crate::scoring::{hypervolume, score_building_position};
use crate::world::World;
use fnv::{FnvHashMap, FnvHashSet};
use log::info;

/// Priority order for batch placement (spec §4.8): lower sorts first.
/// Mirrors `c_buildingOrder` in `BuildingPlanner.cpp`, collapsed onto this
/// crate's building catalogue.
fn build_order(building_type: BuildingType) -> u32 {
    use BuildingType::*;
    match building_type {
        Headquarters => 0,
        HarborBuilding => 1,
        Storehouse => 2,
        Fortress => 2,
        Watchtower => 3,
        Guardhouse => 4,
        Barracks => 5,
        GraniteMine | CoalMine | IronMine | GoldMine => 30,
        LookoutTower => 100,
        Catapult => 50,
        Woodcutter => 30,
        Fishery => 20,
        Quarry => 20,
        Forester => 10,
        SlaughterHouse => 10,
        Hunter => 20,
        Brewery => 10,
        Armory => 10,
        Metalworks => 10,
        IronSmelter => 20,
        CharBurner => 30,
        PigFarm => 20,
        Mill => 20,
        Bakery => 10,
        Sawmill => 40,
        Mint => 10,
        Well => 100,
        Farm => 30,
        DonkeyBreeder => 15,
    }
}

pub struct BuildingPlanner {
    requests: FnvHashMap<Point, Vec<BuildingId>>,
    current_dest: Option<Point>,
    current_requests: Vec<BuildingId>,
    searches: u32,
    blacklist: FnvHashSet<BuildingType>,
}

impl BuildingPlanner {
    pub fn new() -> Self {
        BuildingPlanner {
            requests: FnvHashMap::default(),
            current_dest: None,
            current_requests: Vec::new(),
            searches: 0,
            blacklist: FnvHashSet::default(),
        }
    }

    /// `Request(building, regionPt)` (spec §4.8): queues a placement
    /// request keyed by the region's anchor flag.
    pub fn request(&mut self, building_id: BuildingId, region_pt: Point) {
        self.requests.entry(region_pt).or_default().push(building_id);
    }

    pub fn request_count(&self) -> usize {
        self.current_requests.len() + self.requests.values().map(|v| v.len()).sum::<usize>()
    }

    /// `GetRequestCount(types, regionPt)` (spec §4.8): counts queued
    /// requests of the given types whose region can connect to
    /// `region_pt`, so other planners avoid double-queuing work that's
    /// already pending nearby.
    pub fn request_count_for(&self, world: &mut World, types: &[BuildingType], region_pt: Point) -> usize {
        let mut count = 0;
        let dests: Vec<Point> = self.requests.keys().copied().collect();
        for dest in dests {
            if !world.same_network(region_pt, dest) {
                continue;
            }
            if let Some(ids) = self.requests.get(&dest) {
                count += ids
                    .iter()
                    .filter_map(|id| world.building(*id))
                    .filter(|b| types.contains(&b.building_type))
                    .count();
            }
        }
        if let Some(dest) = self.current_dest {
            if world.same_network(region_pt, dest) {
                count += self
                    .current_requests
                    .iter()
                    .filter_map(|id| world.building(*id))
                    .filter(|b| types.contains(&b.building_type))
                    .count();
            }
        }
        count
    }

    /// `OnRun()` (spec §4.8 decision-tick entry point): pulls one region's
    /// queue if idle, then searches and places its requests.
    pub fn run(
        &mut self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        roads: &mut RoadManager,
        config: &AgentConfig,
    ) {
        if self.current_requests.is_empty() {
            if let Some(dest) = self.requests.keys().next().copied() {
                self.current_requests = self.requests.remove(&dest).unwrap();
                self.current_dest = Some(dest);
                self.searches = 0;
            }
        }

        if !self.current_requests.is_empty() && self.searches < 1 {
            self.search(world);
            self.execute(world, engine, resources, roads, config);
        }
    }

    fn search(&mut self, world: &World) {
        self.current_requests.sort_by_key(|id| {
            world.building(*id).map(|b| build_order(b.building_type)).unwrap_or(0)
        });
        self.current_requests.sort_by(|a, b| {
            let ba = world.building(*a);
            let bb = world.building(*b);
            let a_fixed = ba.map(|b| b.point().is_some()).unwrap_or(false);
            let b_fixed = bb.map(|b| b.point().is_some()).unwrap_or(false);
            if a_fixed != b_fixed {
                return b_fixed.cmp(&a_fixed);
            }
            match (ba.and_then(|b| b.group), bb.and_then(|b| b.group)) {
                (Some(ga), Some(gb)) => ga.0.cmp(&gb.0),
                _ => std::cmp::Ordering::Equal,
            }
        });
        self.searches += 1;
    }

    fn execute(
        &mut self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        roads: &mut RoadManager,
        config: &AgentConfig,
    ) {
        let dest = match self.current_dest {
            Some(d) => d,
            None => return,
        };
        let dims = world.dims();
        let mut locations = BuildLocations::new(dims);
        {
            let world_ref: &World = world;
            locations.calculate(
                dest,
                |pt| world_ref.effective_bq(engine, pt),
                |pt, dir| {
                    world_ref.road_present(pt, dir)
                        || world_ref.effective_bq(engine, dims.neighbour(pt, dir)) != BuildingQuality::None
                },
            );
        }

        let requests = std::mem::take(&mut self.current_requests);
        for building_id in requests {
            self.place(world, engine, resources, roads, config, building_id, &mut locations);
        }
    }

    /// `Place(building, locations)` (spec §4.8): either uses the building's
    /// fixed point (military buildings) or searches `locations` for the
    /// best-scoring candidate, commits, and connects it to the road
    /// network. Blacklists the building type on failure until the next
    /// `clear_blacklist`.
    fn place(
        &mut self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        roads: &mut RoadManager,
        config: &AgentConfig,
        building_id: BuildingId,
        locations: &mut BuildLocations,
    ) -> bool {
        let Some(building) = world.building(building_id).cloned() else {
            return false;
        };
        if self.blacklist.contains(&building.building_type) {
            return false;
        }

        let pt = if let Some(fixed) = building.point() {
            if !locations.bq_at(fixed).covers(building.building_type.required_bq()) {
                info!(
                    "no viable position for {:?} (fixed point not buildable)",
                    building.building_type
                );
                self.blacklist.insert(building.building_type);
                return false;
            }
            fixed
        } else {
            let candidates = match locations.get(building.building_type.required_bq()) {
                Ok(c) => c,
                Err(_) => return false,
            };
            let mut best: Option<(f64, Point)> = None;
            for candidate in candidates {
                if let Some(scores) = score_building_position(engine, world, resources, &building, candidate, config) {
                    let score = hypervolume(&scores);
                    if best.map(|(s, _)| score > s).unwrap_or(true) {
                        best = Some((score, candidate));
                    }
                }
            }
            match best {
                Some((score, candidate)) if score > 0.0 => candidate,
                _ => {
                    info!(
                        "no viable position for {:?} (no location with positive score)",
                        building.building_type
                    );
                    self.blacklist.insert(building.building_type);
                    return false;
                }
            }
        };

        if world.construct(building_id, pt).is_err() {
            return false;
        }
        let radius = if building.building_type.required_bq() == BuildingQuality::Castle {
            config.build_location_update_radius_castle
        } else {
            config.build_location_update_radius_default
        };
        {
            let world_ref: &World = world;
            locations.update(|p| world_ref.effective_bq(engine, p), pt, radius);
        }

        if !roads.connect(world, engine, building_id, Some(locations)) {
            world.deconstruct(building_id);
            return false;
        }
        true
    }

    /// `OnNodeNote` (spec §4.8): a point's buildability changed, so
    /// previously-failed placements may now succeed.
    pub fn clear_blacklist(&mut self) {
        self.blacklist.clear();
    }
}

impl Default for BuildingPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingState;
    use crate::engine::FakeEngine;

    fn dims() -> crate::hex::GridDims {
        crate::hex::GridDims::new(20, 20)
    }

    #[test]
    fn request_queues_under_region_point() {
        let mut planner = BuildingPlanner::new();
        let id = BuildingId::new();
        planner.request(id, Point::new(1, 1));
        assert_eq!(planner.request_count(), 1);
    }

    #[test]
    fn run_places_a_queued_sawmill() {
        let mut world = World::new(dims());
        let mut engine = FakeEngine::new(dims());
        for pt in dims().iter_points() {
            engine.set_terrain_bq(pt, BuildingQuality::House);
        }
        let resources = ResourceMap::new(dims());
        let mut roads = RoadManager::new(30);
        let config = AgentConfig::default();

        let hq = world.create(BuildingType::Headquarters, BuildingState::PlanningRequest, None, Point::new(10, 10));
        world.construct(hq, Point::new(10, 10)).unwrap();

        let mut planner = BuildingPlanner::new();
        let sawmill = world.create(BuildingType::Sawmill, BuildingState::PlanningRequest, None, Point::new(10, 10));
        planner.request(sawmill, Point::new(10, 10));

        planner.run(&mut world, &engine, &resources, &mut roads, &config);

        assert!(world.building(sawmill).unwrap().point().is_some());
    }

    #[test]
    fn failed_placement_blacklists_the_type() {
        let mut world = World::new(dims());
        let engine = FakeEngine::new(dims());
        let resources = ResourceMap::new(dims());
        let mut roads = RoadManager::new(30);
        let config = AgentConfig::default();

        let mut planner = BuildingPlanner::new();
        let mint = world.create(BuildingType::Mint, BuildingState::PlanningRequest, None, Point::new(5, 5));
        planner.request(mint, Point::new(5, 5));

        planner.run(&mut world, &engine, &resources, &mut roads, &config);

        assert!(planner.blacklist.contains(&BuildingType::Mint));
    }
}
