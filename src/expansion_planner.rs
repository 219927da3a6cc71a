//! Expansion planner: proposes new military buildings to extend territory
//! (spec §4.9).
//!
//! Grounded on
//! `original_source/libs/s25main/ai/beowulf/recurrent/ExpansionPlanner.cpp`.
//! Runs on its own period (spec §4.13), separate from the building
//! planner's per-tick cadence: each run checks the global throttle, finds
//! one unconnected expansion start per warehouse region, and proposes the
//! single best-rated military building for each.

use crate::build_locations::BuildLocations;
use crate::building::{BuildingId, BuildingQuality, BuildingType};
use crate::building_planner::BuildingPlanner;
use crate::config::AgentConfig;
use crate::engine::{Engine, Job};
use crate::goods::ResourceType;
use crate::hex::Point;
use crate::resources::ResourceMap;
use crate::world::World;

pub struct ExpansionPlanner {
    min_soldiers: u32,
    max_concurrent_sites: u32,
}

impl ExpansionPlanner {
    pub fn new(config: &AgentConfig) -> Self {
        ExpansionPlanner {
            min_soldiers: config.expansion_min_soldiers,
            max_concurrent_sites: config.expansion_max_concurrent_sites,
        }
    }

    /// `OnRun()` (spec §4.9).
    pub fn run(
        &self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        building_planner: &mut BuildingPlanner,
    ) {
        if !self.should_expand(world) {
            return;
        }

        let mut starts: Vec<Point> = Vec::new();
        for warehouse in engine.own_warehouses() {
            let soldiers = [Job::Soldier]
                .iter()
                .map(|j| engine.inventory_job(warehouse, *j))
                .sum::<u32>();
            if soldiers < self.min_soldiers {
                continue;
            }
            if engine.inventory_job(warehouse, Job::Builder) < 1 || engine.inventory_job(warehouse, Job::Planer) < 1 {
                continue;
            }

            // A region already scheduled for expansion is skipped (spec
            // §4.9: "only one military building per region").
            if starts.iter().any(|s| world.same_network(warehouse, *s)) {
                continue;
            }
            starts.push(warehouse);
        }

        for start in starts {
            self.expand(world, engine, resources, building_planner, start);
        }
    }

    fn should_expand(&self, world: &World) -> bool {
        let mut military_sites = 0u32;
        let mut sawmill = 0u32;
        let mut woodcutter = 0u32;
        let mut quarry = 0u32;

        for building in world.all_buildings() {
            match building.building_type {
                BuildingType::Sawmill => sawmill += 1,
                BuildingType::Woodcutter => woodcutter += 1,
                BuildingType::Quarry => quarry += 1,
                t if t.is_military() => {
                    if building.state == crate::building::BuildingState::UnderConstruction {
                        military_sites += 1;
                        if military_sites >= self.max_concurrent_sites {
                            return false;
                        }
                    }
                }
                _ => {}
            }
        }

        sawmill > 0 && woodcutter > 0 && quarry > 0
    }

    fn expand(
        &self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        building_planner: &mut BuildingPlanner,
        start: Point,
    ) {
        let dims = world.dims();
        let mut locations = BuildLocations::new(dims);
        {
            let world_ref: &World = world;
            locations.calculate(
                start,
                |pt| world_ref.effective_bq(engine, pt),
                |pt, dir| {
                    world_ref.road_present(pt, dir)
                        || world_ref.effective_bq(engine, dims.neighbour(pt, dir)) != BuildingQuality::None
                },
            );
        }

        let mut best: Option<(u32, Point, BuildingType)> = None;

        let candidates = match locations.get(BuildingQuality::Hut) {
            Ok(c) => c,
            Err(_) => return,
        };

        for loc in candidates {
            if world.building_at(loc).is_some() {
                continue;
            }
            let mut building_type = BuildingType::Barracks;

            let bq = locations.bq_at(loc);
            let enemies = engine.in_attack_range(start, 20).len() as u32;
            if enemies > 1 {
                self.try_improve(engine, &mut building_type, bq);
                if enemies > 5 {
                    self.try_improve(engine, &mut building_type, bq);
                }
            } else if !engine.in_attack_range(start, 8).is_empty() {
                self.try_improve(engine, &mut building_type, bq);
            }

            let radius = crate::world::military_radius(building_type);
            let (gained, destroyed) = world.predict_capture(engine, loc, building_type, radius);

            let catapults_remaining = engine
                .in_attack_range(start, radius)
                .iter()
                .filter(|(_, t, _)| *t == BuildingType::Catapult)
                .any(|(p, _, _)| !destroyed.contains(p));
            if catapults_remaining {
                continue;
            }

            let mut ores = 0u32;
            let mut stones = 0u32;
            let mut plantspace = 0u32;
            for pt in &gained {
                ores += resources.get(engine, *pt, ResourceType::Coal, true)
                    + resources.get(engine, *pt, ResourceType::Iron, true)
                    + resources.get(engine, *pt, ResourceType::Gold, true);
                stones += resources.get(engine, *pt, ResourceType::Stone, true)
                    + resources.get(engine, *pt, ResourceType::Granite, true);
                plantspace += resources.get(engine, *pt, ResourceType::PlantSpaceRadius2, true);
            }

            let rating = ores * 2 + stones + plantspace + destroyed.len() as u32 * 2;
            if best.map(|(r, _, _)| rating > r).unwrap_or(rating > 0) {
                best = Some((rating, loc, building_type));
            }
        }

        if let Some((_, pt, building_type)) = best {
            let id: BuildingId = world.create(building_type, crate::building::BuildingState::PlanningRequest, None, start);
            if let Some(building) = world.building_mut(id) {
                building.set_point(pt);
            }
            building_planner.request(id, start);
        }
    }

    fn try_improve(&self, _engine: &dyn Engine, building_type: &mut BuildingType, bq: BuildingQuality) -> bool {
        match *building_type {
            BuildingType::Barracks => {
                *building_type = BuildingType::Guardhouse;
                true
            }
            BuildingType::Guardhouse if bq >= BuildingQuality::House => {
                *building_type = BuildingType::Watchtower;
                true
            }
            BuildingType::Watchtower if bq >= BuildingQuality::Castle => {
                *building_type = BuildingType::Fortress;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingState;
    use crate::engine::{FakeEngine, PlayerId};
    use crate::hex::{Direction, GridDims};
    use crate::testutil;

    /// End-to-end scenario (spec §8): of two candidate guardhouse sites A
    /// and B, only A's capture prediction destroys a standing enemy
    /// catapult; B has the higher raw resource yield but must still lose,
    /// since the catapult veto rules it out before resources are ever
    /// weighed.
    #[test]
    fn catapult_destruction_outweighs_resource_yield() {
        let dims = GridDims::new(24, 22);
        let mut engine = FakeEngine::new(dims);
        let mut world = World::new(dims);

        let start = Point::new(5, 5);
        let hq = world.create(BuildingType::Headquarters, BuildingState::PlanningRequest, None, start);
        world.construct(hq, start).unwrap();
        world.building_mut(hq).unwrap().state = BuildingState::Finished;
        engine.add_warehouse(start, BuildingType::Headquarters);

        testutil::finished_building(&mut world, BuildingType::Sawmill, Point::new(0, 0));
        testutil::finished_building(&mut world, BuildingType::Woodcutter, Point::new(1, 0));
        testutil::finished_building(&mut world, BuildingType::Quarry, Point::new(2, 0));

        // Stepping-stone points stay at Flag quality: traversable for the
        // flood fill but never indexed as a candidate (spec §4.4 "BQ
        // exceeds Flag"). Only the two contested sites carry House quality.
        let stepping_stone = dims.neighbour(start, Direction::East);
        engine.set_terrain_bq(stepping_stone, BuildingQuality::Flag);
        let a = dims.neighbour(stepping_stone, Direction::East);
        engine.set_terrain_bq(a, BuildingQuality::House);

        let mut catapult_pt = a;
        catapult_pt = dims.neighbour(catapult_pt, Direction::East);
        catapult_pt = dims.neighbour(catapult_pt, Direction::East);
        engine.add_building(catapult_pt, BuildingType::Catapult);
        engine.set_territory(catapult_pt, PlayerId(1));

        let mut west = start;
        for _ in 0..9 {
            west = dims.neighbour(west, Direction::West);
            engine.set_terrain_bq(west, BuildingQuality::Flag);
        }
        let b = dims.neighbour(west, Direction::West);
        engine.set_terrain_bq(b, BuildingQuality::House);
        engine.set_resource(b, ResourceType::Stone, 10);
        engine.set_resource(b, ResourceType::Granite, 10);

        let resources = ResourceMap::new(dims);
        let mut building_planner = BuildingPlanner::new();
        let config = AgentConfig::default();
        let planner = ExpansionPlanner::new(&config);

        planner.expand(&mut world, &engine, &resources, &mut building_planner, start);

        assert_eq!(building_planner.request_count(), 1);
        let requested = world
            .all_buildings()
            .find(|building| building.state == BuildingState::PlanningRequest && building.building_type == BuildingType::Guardhouse)
            .expect("expansion planner should have queued a guardhouse");
        assert_eq!(requested.point(), Some(a));
    }
}
