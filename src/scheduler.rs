//! Top-level recurrent scheduler (spec §4.13): fixed order build -> roads ->
//! expand -> produce -> metalworks -> attack -> coins, run on one decision
//! tick out of every `decision_tick_period` engine ticks, staggered by
//! player id so not every agent in a match recomputes on the same engine
//! tick.
//!
//! Grounded on `original_source/libs/s25main/ai/beowulf/Beowulf.cpp`'s
//! `RunGF` dispatch (the fixed subsystem order and the defeat/surrender
//! check) and on the teacher's own top-level `Planner::run_tick` for the
//! "gate on a period, dispatch a fixed pipeline" shape.

use crate::attack_manager::AttackManager;
use crate::building::BuildingState;
use crate::building_planner::BuildingPlanner;
use crate::catapult_manager::CatapultManager;
use crate::coin_manager::CoinManager;
use crate::config::AgentConfig;
use crate::engine::{Command, Engine};
use crate::expansion_planner::ExpansionPlanner;
use crate::metalworks::MetalworksManager;
use crate::production_planner::ProductionPlanner;
use crate::resources::ResourceMap;
use crate::road_manager::RoadManager;
use crate::world::World;
use log::info;

pub struct Scheduler {
    expansion_counter: u32,
    production_counter: u32,
    defeated: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            expansion_counter: 0,
            production_counter: 0,
            defeated: false,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    /// Whether `tick` is this player's decision tick (spec §2, §4.13):
    /// decision ticks land every `period` engine ticks, offset by player id
    /// so players don't all pay their decision-tick cost on the same engine
    /// tick.
    pub fn is_decision_tick(tick: u64, player_id: u8, period: u32) -> bool {
        period > 0 && tick % period as u64 == (player_id as u64) % period as u64
    }

    /// `RunGF()` (spec §4.13): runs the defeat check, then the fixed
    /// subsystem order. Once defeated, surrenders once and goes inert for
    /// the rest of the match.
    #[allow(clippy::too_many_arguments)]
    pub fn run_decision_tick(
        &mut self,
        world: &mut World,
        engine: &dyn Engine,
        resources: &ResourceMap,
        building_planner: &mut BuildingPlanner,
        roads: &mut RoadManager,
        expansion_planner: &ExpansionPlanner,
        production_planner: &mut ProductionPlanner,
        metalworks: &mut MetalworksManager,
        attack: &mut AttackManager,
        coins: &mut CoinManager,
        catapults: &mut CatapultManager,
        config: &AgentConfig,
    ) {
        if self.defeated {
            return;
        }
        if engine.own_warehouses().is_empty() {
            info!("scheduler: no warehouses remain, surrendering");
            world.emit_command(Command::Surrender);
            world.emit_command(Command::Chat("gg".to_string()));
            self.defeated = true;
            return;
        }

        building_planner.run(world, engine, resources, roads, config);
        self.run_roads(world, engine, roads);

        self.expansion_counter += 1;
        if self.expansion_counter >= config.expansion_planner_period {
            self.expansion_counter = 0;
            expansion_planner.run(world, engine, resources, building_planner);
        }

        self.production_counter += 1;
        if self.production_counter >= config.production_planner_period {
            self.production_counter = 0;
            production_planner.run(world, engine, resources, building_planner, metalworks, config);
        }

        metalworks.run(world);
        catapults.refresh(world, engine, config.base_attack_distance);
        attack.run(world, engine, catapults, config);
        coins.run(world, engine, building_planner, config);
    }

    /// "roads" step (spec §4.13, §4.6): any finished or under-construction
    /// building the road manager doesn't yet consider connected gets one
    /// connection attempt. Catches buildings whose `BuildingPlanner::place`
    /// connection attempt hasn't run yet (e.g. fixed-point military
    /// buildings placed directly by the expansion planner) and ones a prior
    /// reroute left stranded.
    fn run_roads(&self, world: &mut World, engine: &dyn Engine, roads: &mut RoadManager) {
        let candidates: Vec<_> = world
            .all_buildings()
            .filter(|b| matches!(b.state, BuildingState::UnderConstruction | BuildingState::Finished))
            .filter(|b| !roads.is_connected_building(b.id))
            .map(|b| b.id)
            .collect();
        for id in candidates {
            roads.connect(world, engine, id, None);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingType;
    use crate::engine::{FakeEngine, PlayerId};
    use crate::hex::{GridDims, Point};

    fn dims() -> GridDims {
        GridDims::new(20, 20)
    }

    #[test]
    fn decision_tick_staggers_by_player_id() {
        assert!(Scheduler::is_decision_tick(0, 0, 16));
        assert!(!Scheduler::is_decision_tick(0, 1, 16));
        assert!(Scheduler::is_decision_tick(1, 1, 16));
        assert!(Scheduler::is_decision_tick(16, 0, 16));
    }

    #[test]
    fn empty_warehouses_triggers_surrender_once() {
        let dims = dims();
        let engine = FakeEngine::new(dims);
        let mut world = World::new(dims);
        let resources = ResourceMap::new(dims);
        let mut building_planner = BuildingPlanner::new();
        let mut roads = RoadManager::new(30);
        let expansion_planner = ExpansionPlanner::new(&AgentConfig::default());
        let mut production_planner = ProductionPlanner::new();
        let mut metalworks = MetalworksManager::new();
        let mut attack = AttackManager::new();
        let mut coins = CoinManager::new();
        let mut catapults = CatapultManager::new();
        let config = AgentConfig::default();
        let mut scheduler = Scheduler::new();

        scheduler.run_decision_tick(
            &mut world,
            &engine,
            &resources,
            &mut building_planner,
            &mut roads,
            &expansion_planner,
            &mut production_planner,
            &mut metalworks,
            &mut attack,
            &mut coins,
            &mut catapults,
            &config,
        );

        assert!(scheduler.is_defeated());
        let commands = world.drain_commands();
        assert!(commands.iter().any(|c| matches!(c, Command::Surrender)));

        // Defeated is sticky: a second call is a no-op, even if warehouses
        // somehow reappear.
        let mut engine2 = engine.clone();
        engine2.add_warehouse(Point::new(5, 5), BuildingType::Headquarters);
        scheduler.run_decision_tick(
            &mut world,
            &engine2,
            &resources,
            &mut building_planner,
            &mut roads,
            &expansion_planner,
            &mut production_planner,
            &mut metalworks,
            &mut attack,
            &mut coins,
            &mut catapults,
            &config,
        );
        assert!(world.drain_commands().is_empty());
    }

    #[test]
    fn connected_military_building_gets_roaded() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        for pt in dims.iter_points() {
            engine.set_terrain_bq(pt, crate::building::BuildingQuality::House);
        }
        let mut world = World::new(dims);
        let hq = world.create(BuildingType::Headquarters, BuildingState::PlanningRequest, None, Point::new(10, 10));
        world.construct(hq, Point::new(10, 10)).unwrap();

        let barracks = world.create(BuildingType::Barracks, BuildingState::PlanningRequest, None, Point::new(12, 10));
        world.construct(barracks, Point::new(12, 10)).unwrap();
        world.building_mut(barracks).unwrap().state = BuildingState::UnderConstruction;

        let mut roads = RoadManager::new(30);
        let scheduler = Scheduler::new();
        scheduler.run_roads(&mut world, &engine, &mut roads);

        assert!(roads.is_connected_building(barracks));
    }
}
