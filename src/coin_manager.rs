//! Coin manager: keeps one academy fortress staffed and toggles coin
//! production against its soldier count (spec §4.12, coin half).
//!
//! Grounded on
//! `original_source/libs/s25main/ai/beowulf/recurrent/CoinManager.cpp`.
//! The original distinguishes promotable soldiers from max-rank ones via a
//! per-soldier rank query the host engine exposes; this crate's `Engine`
//! trait has no rank surface, so both checks collapse onto
//! `inventory_job(pt, Job::Soldier)` -- the academy's total soldier count
//! (documented simplification, DESIGN.md).

use crate::building::{BuildingId, BuildingState, BuildingType};
use crate::building_planner::BuildingPlanner;
use crate::config::AgentConfig;
use crate::engine::{BuildingNote, BuildingNoteKind, Command, Engine, Job};
use crate::goods::Good;
use crate::world::World;
use log::debug;

pub struct CoinManager {
    academy: Option<BuildingId>,
    coins_enabled: bool,
}

impl CoinManager {
    pub fn new() -> Self {
        CoinManager {
            academy: None,
            coins_enabled: false,
        }
    }

    /// `OnRun()` (spec §4.12): requests the academy once any coin is being
    /// produced, then toggles coin production and rotates soldiers once
    /// it's finished.
    pub fn run(&mut self, world: &mut World, engine: &dyn Engine, building_planner: &mut BuildingPlanner, config: &AgentConfig) {
        if let Some(id) = self.academy {
            self.update(world, engine, id, config.coin_academy_min_soldiers);
            return;
        }

        let has_mint = world
            .all_buildings()
            .any(|b| b.building_type == BuildingType::Mint && b.state == BuildingState::Finished);
        if !has_mint {
            return;
        }
        let Some(anchor) = engine.own_warehouses().into_iter().next() else {
            return;
        };
        let id = world.create(BuildingType::Fortress, BuildingState::PlanningRequest, None, anchor);
        building_planner.request(id, anchor);
        self.academy = Some(id);
        debug!("coin manager: requested academy fortress near {:?}", anchor);
    }

    fn update(&mut self, world: &mut World, engine: &dyn Engine, id: BuildingId, config_threshold: u32) {
        let Some(building) = world.building(id) else {
            self.academy = None;
            return;
        };
        if building.state != BuildingState::Finished {
            return;
        }
        let Some(pt) = building.point() else { return };

        let soldiers = engine.inventory_job(pt, Job::Soldier);
        if soldiers >= config_threshold {
            if !self.coins_enabled {
                world.emit_command(Command::SetCoinsAllowed(pt, true));
                self.coins_enabled = true;
            }
        } else if self.coins_enabled {
            world.emit_command(Command::SetCoinsAllowed(pt, false));
            self.coins_enabled = false;
        }
        world.emit_command(Command::SendSoldiersHome(pt));
        world.emit_command(Command::OrderNewSoldiers(pt));
    }

    /// Building-event hook (spec §4.12): a failed site re-requests on the
    /// next `run`; a destroyed/captured academy is forgotten the same way.
    pub fn on_building_note(&mut self, id: BuildingId, note: &BuildingNote) {
        if self.academy != Some(id) {
            return;
        }
        if matches!(
            note.subtype,
            BuildingNoteKind::SetBuildingSiteFailed | BuildingNoteKind::Destroyed | BuildingNoteKind::Captured
        ) {
            self.academy = None;
            self.coins_enabled = false;
        }
    }
}

impl Default for CoinManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FakeEngine;
    use crate::hex::{GridDims, Point};

    fn dims() -> GridDims {
        GridDims::new(20, 20)
    }

    #[test]
    fn requests_academy_once_mint_finished() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        let mut world = World::new(dims);
        let mint = world.create(BuildingType::Mint, BuildingState::PlanningRequest, None, Point::new(4, 4));
        world.construct(mint, Point::new(4, 4)).unwrap();
        world.building_mut(mint).unwrap().state = BuildingState::Finished;

        engine.add_warehouse(Point::new(10, 10), BuildingType::Headquarters);

        let mut building_planner = BuildingPlanner::new();
        let mut coins = CoinManager::new();
        coins.run(&mut world, &engine, &mut building_planner, &AgentConfig::default());

        assert!(coins.academy.is_some());
        assert_eq!(building_planner.request_count(), 1);
    }

    #[test]
    fn enough_soldiers_enables_coins_and_drains_them_home() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        let mut world = World::new(dims);
        let fortress = world.create(BuildingType::Fortress, BuildingState::PlanningRequest, None, Point::new(6, 6));
        world.construct(fortress, Point::new(6, 6)).unwrap();
        world.building_mut(fortress).unwrap().state = BuildingState::Finished;
        engine.set_inventory_job(Point::new(6, 6), Job::Soldier, 5);

        let mut coins = CoinManager::new();
        coins.academy = Some(fortress);
        coins.coins_enabled = false;
        coins.update(&mut world, &engine, fortress, 3);

        let commands = world.drain_commands();
        assert!(commands.iter().any(|c| matches!(c, Command::SetCoinsAllowed(_, true))));
        assert!(commands.iter().any(|c| matches!(c, Command::SendSoldiersHome(_))));
        assert!(commands.iter().any(|c| matches!(c, Command::OrderNewSoldiers(_))));
        assert!(coins.coins_enabled);
    }

    #[test]
    fn soldier_count_dropping_below_threshold_disables_coins() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        let mut world = World::new(dims);
        let fortress = world.create(BuildingType::Fortress, BuildingState::PlanningRequest, None, Point::new(6, 6));
        world.construct(fortress, Point::new(6, 6)).unwrap();
        world.building_mut(fortress).unwrap().state = BuildingState::Finished;
        engine.set_inventory_job(Point::new(6, 6), Job::Soldier, 2);

        let mut coins = CoinManager::new();
        coins.academy = Some(fortress);
        coins.coins_enabled = true;
        coins.update(&mut world, &engine, fortress, 3);

        let commands = world.drain_commands();
        assert!(commands.iter().any(|c| matches!(c, Command::SetCoinsAllowed(_, false))));
        assert!(commands.iter().any(|c| matches!(c, Command::SendSoldiersHome(_))));
        assert!(commands.iter().any(|c| matches!(c, Command::OrderNewSoldiers(_))));
        assert!(!coins.coins_enabled);
    }

    #[test]
    fn building_site_failure_clears_academy_for_retry() {
        let mut coins = CoinManager::new();
        let id = BuildingId::new();
        coins.academy = Some(id);
        let note = BuildingNote {
            pos: Point::new(0, 0),
            building_type: BuildingType::Fortress,
            subtype: BuildingNoteKind::SetBuildingSiteFailed,
        };
        coins.on_building_note(id, &note);
        assert!(coins.academy.is_none());
    }
}
