//! Attack manager: ranks nearby enemy targets and launches one attack per
//! decision tick with whatever soldiers are available (spec §4.12, attack
//! half).
//!
//! Grounded on
//! `original_source/libs/s25main/ai/beowulf/recurrent/AttackPlanner.cpp`.
//! Targets rank headquarters first, then harbours, then by a weighted
//! demolition score over everything else within range; catapults get a
//! large bonus on top of their own building-type weight, using
//! [`crate::catapult_manager::CatapultManager`] to tell enemy catapults
//! apart from the rest of a target's garrison.

use crate::building::BuildingType;
use crate::catapult_manager::CatapultManager;
use crate::config::AgentConfig;
use crate::engine::{Command, Engine};
use crate::hex::Point;
use crate::world::World;
use log::debug;

/// Demolition weight per destroyed building type (spec §4.12; grounded on
/// `AttackPlanner.cpp`'s `GetAttackValue`). Catapults get an extra flat
/// bonus on top of their own entry, applied separately in [`score_target`].
fn demolition_weight(building_type: BuildingType) -> u32 {
    use BuildingType::*;
    match building_type {
        Barracks | Guardhouse => 2,
        Watchtower => 5,
        Fortress => 10,
        _ if building_type.is_mine() => 10,
        Catapult => 50,
        _ => 1,
    }
}

pub struct AttackManager;

impl AttackManager {
    pub fn new() -> Self {
        AttackManager
    }

    /// `OnRun()` (spec §4.12): picks the best reachable target and sends
    /// the largest available rank of soldiers from nearby own military
    /// buildings against it.
    pub fn run(&mut self, world: &mut World, engine: &dyn Engine, catapults: &CatapultManager, config: &AgentConfig) {
        let Some((target, _score)) = self.best_target(world, engine, catapults, config) else {
            return;
        };

        let attackers = self.available_attackers(world, engine, target, config);
        if attackers == 0 {
            return;
        }

        debug!("attack manager: sending {} soldiers against {:?}", attackers, target);
        world.emit_command(Command::Attack {
            target,
            soldier_count: attackers,
            strong_first: true,
        });
    }

    fn best_target(&self, world: &World, engine: &dyn Engine, catapults: &CatapultManager, config: &AgentConfig) -> Option<(Point, u32)> {
        let own_military: Vec<Point> = world
            .all_buildings()
            .filter(|b| b.building_type.is_military())
            .filter_map(|b| b.point())
            .collect();

        let mut best: Option<(Point, u32)> = None;
        for pt in &own_military {
            for (epos, etype, _owner) in engine.in_attack_range(*pt, config.base_attack_distance) {
                let score = score_target(etype, epos, catapults);
                if best.map(|(_, s)| score > s).unwrap_or(true) {
                    best = Some((epos, score));
                }
            }
        }
        best
    }

    fn available_attackers(&self, world: &World, engine: &dyn Engine, target: Point, config: &AgentConfig) -> u32 {
        world
            .all_buildings()
            .filter(|b| b.building_type.is_military())
            .filter_map(|b| b.point().map(|pt| (pt, b)))
            .filter(|(pt, _)| world.dims().distance(*pt, target) <= config.base_attack_distance)
            .map(|(pt, _)| engine.inventory_job(pt, crate::engine::Job::Soldier))
            .sum()
    }
}

/// Headquarters and harbours always outrank everything else; otherwise
/// score by demolition weight, with enemy catapults bonused further.
fn score_target(building_type: BuildingType, pt: Point, catapults: &CatapultManager) -> u32 {
    match building_type {
        BuildingType::Headquarters => u32::MAX,
        BuildingType::HarborBuilding => u32::MAX - 1,
        _ => {
            let weight = demolition_weight(building_type) as u32;
            if catapults.is_enemy_catapult(pt) {
                weight + demolition_weight(BuildingType::Catapult)
            } else {
                weight
            }
        }
    }
}

impl Default for AttackManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingState;
    use crate::engine::{FakeEngine, PlayerId};
    use crate::hex::GridDims;

    fn dims() -> GridDims {
        GridDims::new(30, 30)
    }

    #[test]
    fn headquarters_outranks_a_mine_at_equal_distance() {
        let catapults = CatapultManager::new();
        let hq_score = score_target(BuildingType::Headquarters, Point::new(1, 1), &catapults);
        let mine_score = score_target(BuildingType::CoalMine, Point::new(2, 2), &catapults);
        assert!(hq_score > mine_score);
    }

    #[test]
    fn enemy_catapult_scores_above_a_plain_guardhouse() {
        let mut catapults = CatapultManager::new();
        let pt = Point::new(5, 5);
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        let world = World::new(dims);
        engine.add_building(pt, BuildingType::Catapult);
        engine.set_territory(pt, PlayerId(1));
        catapults.refresh(&world, &engine, 21);

        let guardhouse_score = score_target(BuildingType::Guardhouse, Point::new(6, 6), &catapults);
        let catapult_score = score_target(BuildingType::Catapult, pt, &catapults);
        assert!(catapult_score > guardhouse_score);
    }

    #[test]
    fn best_target_prefers_headquarters_within_range() {
        let dims = dims();
        let mut engine = FakeEngine::new(dims);
        let mut world = World::new(dims);
        let barracks = world.create(BuildingType::Barracks, BuildingState::PlanningRequest, None, Point::new(5, 5));
        world.construct(barracks, Point::new(5, 5)).unwrap();

        let hq_pt = Point::new(6, 5);
        engine.add_building(hq_pt, BuildingType::Headquarters);
        engine.set_territory(hq_pt, PlayerId(1));
        let mine_pt = Point::new(7, 5);
        engine.add_building(mine_pt, BuildingType::CoalMine);
        engine.set_territory(mine_pt, PlayerId(1));

        let catapults = CatapultManager::new();
        let config = AgentConfig::default();
        let manager = AttackManager::new();
        let (target, _) = manager.best_target(&world, &engine, &catapults, &config).unwrap();
        assert_eq!(target, hq_pt);
    }
}
