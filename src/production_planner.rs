//! Production planner: per-region goods-flow balancing (spec §4.10).
//!
//! Grounded on
//! `original_source/libs/s25main/ai/beowulf/recurrent/ProductionPlanner.{h,cpp}`.
//! Each run partitions the world into regions (one per road network holding
//! a storehouse/headquarters/harbour -- the original's separate
//! `StorehouseManager.cpp` nominates these same warehouses, which is why its
//! logic is folded into [`compute_regions`] here rather than kept as its own
//! file, per DESIGN.md), tallies a ledger per region, and walks the fixed
//! priority sequence in §4.10 against a shared builder budget.

use crate::building::{BuildingQuality, BuildingState, BuildingType};
use crate::building_planner::BuildingPlanner;
use crate::config::AgentConfig;
use crate::engine::Engine;
use crate::goods::{Good, ProductionLedger, ResourceType};
use crate::group::GroupId;
use crate::hex::Point;
use crate::metalworks::MetalworksManager;
use crate::resources::ResourceMap;
use crate::road_network::INVALID_NETWORK;
use crate::world::World;
use fnv::FnvHashMap;
use log::debug;

/// One connected road network's tally of buildings and goods balance
/// (spec §4.10 "region").
pub struct Region {
    pub anchor: Point,
    pub is_main: bool,
    pub ledger: ProductionLedger,
    pub building_counts: FnvHashMap<BuildingType, u32>,
    /// Best reachable amount found at any buildable point in the region,
    /// per resource type -- a presence/abundance probe, not a total tally
    /// (avoids double-counting the same tile from multiple candidate
    /// points; documented simplification, DESIGN.md).
    pub resources: FnvHashMap<ResourceType, u32>,
}

impl Region {
    fn building_count(&self, building_type: BuildingType) -> u32 {
        self.building_counts.get(&building_type).copied().unwrap_or(0)
    }

    fn resource_present(&self, resource: ResourceType) -> bool {
        self.resources.get(&resource).copied().unwrap_or(0) > 0
    }
}

/// Nominates one region per connected road network that holds an own
/// warehouse, tallies its buildings' production ledger, and probes nearby
/// resource availability (spec §4.10, folding in the original's
/// `StorehouseManager`).
pub fn compute_regions(world: &mut World, engine: &dyn Engine, resources: &ResourceMap, config: &AgentConfig) -> Vec<Region> {
    let warehouses = engine.own_warehouses();
    let mut region_by_nid: FnvHashMap<crate::road_network::NetworkId, usize> = FnvHashMap::default();
    let mut regions: Vec<Region> = Vec::new();

    for w in &warehouses {
        let nid = world.network_id(*w);
        if nid == INVALID_NETWORK {
            continue;
        }
        region_by_nid.entry(nid).or_insert_with(|| {
            regions.push(Region {
                anchor: *w,
                is_main: false,
                ledger: ProductionLedger::default(),
                building_counts: FnvHashMap::default(),
                resources: FnvHashMap::default(),
            });
            regions.len() - 1
        });
    }

    let buildings: Vec<(Point, BuildingType)> = world
        .all_buildings()
        .filter(|b| b.state != BuildingState::DestructionRequested)
        .filter_map(|b| b.point().map(|pt| (pt, b.building_type)))
        .collect();

    for (pt, bt) in &buildings {
        let nid = world.network_id(*pt);
        let Some(&idx) = region_by_nid.get(&nid) else { continue };
        let region = &mut regions[idx];
        *region.building_counts.entry(*bt).or_insert(0) += 1;
        let rate = bt.production().map(|(_, r)| r).unwrap_or(1);
        if let Some((good, produced_rate)) = bt.production() {
            region.ledger.add_produced(good, produced_rate);
        }
        for good in bt.consumes() {
            region.ledger.add_consumed(*good, rate);
        }
    }

    let mut main_idx = regions.iter().position(|r| r.building_count(BuildingType::Headquarters) > 0);
    if main_idx.is_none() {
        main_idx = regions.iter().position(|r| {
            r.building_count(BuildingType::Metalworks) > 0
                || r.building_count(BuildingType::Armory) > 0
                || r.building_count(BuildingType::IronSmelter) > 0
        });
    }
    if main_idx.is_none() && !regions.is_empty() {
        main_idx = Some(0);
    }
    if let Some(i) = main_idx {
        regions[i].is_main = true;
    }

    for region in regions.iter_mut() {
        probe_resources(region, world, engine, resources, config);
    }

    regions
}

fn probe_resources(region: &mut Region, world: &World, engine: &dyn Engine, resources: &ResourceMap, config: &AgentConfig) {
    let dims = world.dims();
    let mut locations = crate::build_locations::BuildLocations::new(dims);
    locations.calculate(
        region.anchor,
        |pt| world.effective_bq(engine, pt),
        |pt, dir| world.road_present(pt, dir) || world.effective_bq(engine, dims.neighbour(pt, dir)) != BuildingQuality::None,
    );

    let mut consider = |region: &mut Region, pt: Point, resource: ResourceType, guess: bool, skip_harvested: bool| {
        let reachable = resources.get_reachable(engine, pt, resource, guess, skip_harvested, false, config.worker_max_path_cost);
        let entry = region.resources.entry(resource).or_insert(0);
        *entry = (*entry).max(reachable);
    };

    if let Ok(mines) = locations.get(BuildingQuality::Mine) {
        for pt in mines {
            consider(region, pt, ResourceType::Coal, true, true);
            consider(region, pt, ResourceType::Iron, true, true);
            consider(region, pt, ResourceType::Gold, true, true);
            consider(region, pt, ResourceType::Granite, false, true);
        }
    }
    if let Ok(huts) = locations.get(BuildingQuality::Hut) {
        for pt in huts {
            consider(region, pt, ResourceType::Water, false, true);
            consider(region, pt, ResourceType::PlantSpaceRadius6, false, true);
            consider(region, pt, ResourceType::Fish, false, true);
            consider(region, pt, ResourceType::HuntableAnimals, false, true);
            consider(region, pt, ResourceType::Wood, false, false);
            consider(region, pt, ResourceType::Stone, false, false);
        }
    }
    if let Ok(castles) = locations.get(BuildingQuality::Castle) {
        for pt in castles {
            consider(region, pt, ResourceType::PlantSpaceRadius2, false, true);
        }
    }
}

pub struct ProductionPlanner;

impl ProductionPlanner {
    pub fn new() -> Self {
        ProductionPlanner
    }

    /// `OnRun()` (spec §4.10): recomputes regions and walks the fixed
    /// priority sequence for each one, sharing a single builder budget
    /// across the whole pass.
    pub fn run(
        &mut self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        building_planner: &mut BuildingPlanner,
        metalworks: &mut MetalworksManager,
        config: &AgentConfig,
    ) {
        let regions = compute_regions(world, engine, resources, config);
        for region in regions {
            self.plan_region(world, engine, building_planner, metalworks, config, region);
        }
    }

    fn plan_region(
        &mut self,
        world: &mut World,
        engine: &dyn Engine,
        building_planner: &mut BuildingPlanner,
        metalworks: &mut MetalworksManager,
        config: &AgentConfig,
        region: Region,
    ) {
        let under_construction = world
            .all_buildings()
            .filter(|b| b.state == BuildingState::ConstructionRequested || b.state == BuildingState::UnderConstruction)
            .count() as u32;
        let outstanding_requests = building_planner.request_count() as u32;
        if config.production_planner_builder_budget <= under_construction + outstanding_requests {
            return;
        }
        let mut budget = config.production_planner_builder_budget - under_construction - outstanding_requests;
        let max_queue_len = config.metalworks_max_queue_len;

        // Step 1: fill partially-placed groups reachable from this region.
        let group_ids: Vec<GroupId> = world.groups().map(|g| g.id).collect();
        for gid in group_ids {
            if budget == 0 {
                return;
            }
            let (anchor, missing) = match world.group(gid) {
                Some(g) => (g.region_anchor, g.missing_slots().collect::<Vec<_>>()),
                None => continue,
            };
            if missing.is_empty() || !world.same_network(region.anchor, anchor) {
                continue;
            }
            for (_, bt) in missing {
                if budget == 0 {
                    break;
                }
                if request_building(world, metalworks, engine, building_planner, region.anchor, bt, Some(gid), max_queue_len) {
                    budget -= 1;
                }
            }
        }

        // Step 2: board production.
        let sawmill_count = region.building_count(BuildingType::Sawmill);
        let military_count: u32 = region
            .building_counts
            .iter()
            .filter(|(t, _)| t.is_military())
            .map(|(_, c)| *c)
            .sum();
        let fib_idx = (sawmill_count as usize).min(config.production_fibonacci.len() - 1);
        if budget > 0 && (sawmill_count < 2 || military_count > config.production_fibonacci[fib_idx]) {
            request_group(
                world,
                metalworks,
                engine,
                building_planner,
                region.anchor,
                &[BuildingType::Woodcutter, BuildingType::Woodcutter, BuildingType::Forester, BuildingType::Sawmill],
                &mut budget,
                max_queue_len,
            );
        }

        // Step 3: stone production.
        let stone_count = region.building_count(BuildingType::Quarry) + region.building_count(BuildingType::GraniteMine);
        let stone_fib_idx = (stone_count as usize).min(config.production_fibonacci.len() - 1);
        if budget > 0 && (stone_count == 0 || military_count > config.production_fibonacci[stone_fib_idx]) {
            let bt = if region.resource_present(ResourceType::Stone) {
                BuildingType::Quarry
            } else {
                BuildingType::GraniteMine
            };
            if request_building(world, metalworks, engine, building_planner, region.anchor, bt, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 4: beer.
        if budget > 0 && region.ledger.get(Good::Beer).overproduction() < 0 {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Brewery, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 5: tools (main region only).
        if budget > 0
            && region.is_main
            && region.ledger.get(Good::Iron).produced > 0
            && region.building_count(BuildingType::Metalworks) == 0
        {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Metalworks, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 6: coins.
        if budget > 0 && region.ledger.get(Good::Gold).overproduction() > 0 {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Mint, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 7: weapons (main region only).
        if budget > 0
            && region.is_main
            && region.ledger.get(Good::Coal).overproduction() > 0
            && region.ledger.get(Good::IronOre).overproduction() > 0
        {
            request_group(
                world,
                metalworks,
                engine,
                building_planner,
                region.anchor,
                &[BuildingType::IronSmelter, BuildingType::Armory],
                &mut budget,
                max_queue_len,
            );
        }

        // Step 8: food.
        if budget > 0 && region.ledger.get(Good::Grain).overproduction() > 0 {
            let bakers = sum_job_inventory(engine, &region, world, crate::engine::Job::Baker);
            let butchers = sum_job_inventory(engine, &region, world, crate::engine::Job::Butcher);
            let types: &[BuildingType] = if bakers >= butchers {
                &[BuildingType::Mill, BuildingType::Bakery]
            } else {
                &[BuildingType::SlaughterHouse, BuildingType::PigFarm]
            };
            request_group(world, metalworks, engine, building_planner, region.anchor, types, &mut budget, max_queue_len);
        }

        // Step 9: donkey breeder, main region only. The reference
        // implementation's corresponding branch requests BLD_MINT here
        // instead of the donkey breeder it clearly means to (the rest of the
        // branch is entirely about JOB_PACKDONKEY); this is corrected here
        // rather than reproduced (DESIGN.md).
        if budget > 0
            && region.is_main
            && region.building_count(BuildingType::DonkeyBreeder) == 0
            && region.ledger.get(Good::Donkey).overproduction() <= 0
        {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::DonkeyBreeder, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 10: hunters / fishermen. Requests at most one of each per
        // region once the resource is known reachable -- the spec leaves
        // the repeat policy unspecified, so this caps at one request per
        // type per region to avoid spamming a request every pass
        // (DESIGN.md).
        if budget > 0 && region.building_count(BuildingType::Hunter) == 0 && region.resource_present(ResourceType::HuntableAnimals) {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Hunter, None, max_queue_len) {
                budget -= 1;
            }
        }
        if budget > 0 && region.building_count(BuildingType::Fishery) == 0 && region.resource_present(ResourceType::Fish) {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Fishery, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 11: farms and wells, kept at produced > consumed.
        if budget > 0 && region.ledger.get(Good::Grain).overproduction() <= 0 && region.resource_present(ResourceType::PlantSpaceRadius2) {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Farm, None, max_queue_len) {
                budget -= 1;
            }
        }
        if budget > 0 && region.ledger.get(Good::Water).overproduction() <= 0 && region.resource_present(ResourceType::Water) {
            if request_building(world, metalworks, engine, building_planner, region.anchor, BuildingType::Well, None, max_queue_len) {
                budget -= 1;
            }
        }

        // Step 12: mines, worst overproduction first, skipping any whose
        // underlying resource isn't reachable from this region.
        let mut mine_candidates = [
            (BuildingType::CoalMine, Good::Coal, ResourceType::Coal),
            (BuildingType::IronMine, Good::IronOre, ResourceType::Iron),
            (BuildingType::GoldMine, Good::Gold, ResourceType::Gold),
        ];
        mine_candidates.sort_by_key(|(_, good, _)| region.ledger.get(*good).overproduction());
        for (bt, _good, resource) in mine_candidates {
            if budget == 0 {
                break;
            }
            if !region.resource_present(resource) {
                continue;
            }
            if request_building(world, metalworks, engine, building_planner, region.anchor, bt, None, max_queue_len) {
                budget -= 1;
                break;
            }
        }

        debug!("production planner: region at {:?} left with {} builder budget", region.anchor, budget);
    }
}

impl Default for ProductionPlanner {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_job_inventory(engine: &dyn Engine, region: &Region, world: &mut World, job: crate::engine::Job) -> u32 {
    engine
        .own_warehouses()
        .into_iter()
        .filter(|w| world.same_network(region.anchor, *w))
        .map(|w| engine.inventory_job(w, job))
        .sum()
}

fn request_building(
    world: &mut World,
    metalworks: &mut MetalworksManager,
    engine: &dyn Engine,
    building_planner: &mut BuildingPlanner,
    region_anchor: Point,
    building_type: BuildingType,
    group: Option<GroupId>,
    max_queue_len: u32,
) -> bool {
    if let Some(job) = crate::engine::building_job(building_type) {
        if !metalworks.job_or_tool_or_queue_space(engine, job, true, max_queue_len) {
            debug!("production planner: no job/tool/queue space for {:?}, skipping request", building_type);
            return false;
        }
    }
    let id = world.create(building_type, BuildingState::PlanningRequest, group, region_anchor);
    building_planner.request(id, region_anchor);
    true
}

fn request_group(
    world: &mut World,
    metalworks: &mut MetalworksManager,
    engine: &dyn Engine,
    building_planner: &mut BuildingPlanner,
    anchor: Point,
    types: &[BuildingType],
    budget: &mut u32,
    max_queue_len: u32,
) {
    if *budget == 0 || types.is_empty() {
        return;
    }
    let gid = world.create_group(types.to_vec(), anchor);
    for bt in types {
        if *budget == 0 {
            break;
        }
        if request_building(world, metalworks, engine, building_planner, anchor, *bt, Some(gid), max_queue_len) {
            *budget -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingState;
    use crate::engine::FakeEngine;
    use crate::hex::GridDims;

    fn dims() -> GridDims {
        GridDims::new(24, 22)
    }

    #[test]
    fn compute_regions_marks_headquarters_region_main() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        for pt in dims.iter_points() {
            engine.set_terrain_bq(pt, BuildingQuality::House);
        }
        let mut world = World::new(dims);
        let hq = world.create(BuildingType::Headquarters, BuildingState::PlanningRequest, None, Point::new(10, 10));
        world.construct(hq, Point::new(10, 10)).unwrap();
        engine.add_warehouse(Point::new(10, 10), BuildingType::Headquarters);

        let resources = ResourceMap::new(dims);
        let config = AgentConfig::default();
        let regions = compute_regions(&mut world, &engine, &resources, &config);

        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_main);
        assert_eq!(regions[0].building_count(BuildingType::Headquarters), 1);
    }

    #[test]
    fn beer_deficit_requests_a_brewery() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        for pt in dims.iter_points() {
            engine.set_terrain_bq(pt, BuildingQuality::House);
        }
        let mut world = World::new(dims);
        let hq = world.create(BuildingType::Headquarters, BuildingState::PlanningRequest, None, Point::new(10, 10));
        world.construct(hq, Point::new(10, 10)).unwrap();
        engine.add_warehouse(Point::new(10, 10), BuildingType::Headquarters);

        let barracks = world.create(BuildingType::Barracks, BuildingState::PlanningRequest, None, Point::new(12, 10));
        world.construct(barracks, Point::new(12, 10)).unwrap();

        let resources = ResourceMap::new(dims);
        let config = AgentConfig::default();
        let mut building_planner = BuildingPlanner::new();
        let mut metalworks = MetalworksManager::new();
        let mut planner = ProductionPlanner::new();
        planner.run(&mut world, &engine, &resources, &mut building_planner, &mut metalworks, &config);

        assert!(building_planner.request_count() > 0);
    }
}
