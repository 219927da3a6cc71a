//! Catapult tracker (spec §4.9 "skip if any enemy catapult in reach would
//! remain alive", §4.12 "catapults hugely bonused").
//!
//! `spec.md` references catapult-awareness from two different planners but
//! never names a manager for it. `original_source` has a
//! `recurrent/CatapultManager.h` with no matching `.cpp` -- a stub the
//! reference agent apparently never wired into its recurrent order (it is
//! absent from `Beowulf.h`'s member list, unlike every other manager). This
//! keeps that shape: a small, independently-queryable tracker rather than a
//! recurrent subsystem, since the expansion and attack planners only need to
//! ask "is there a catapult here", not have one scheduled.

use crate::building::BuildingType;
use crate::engine::Engine;
use crate::hex::Point;
use crate::world::World;
use fnv::FnvHashSet;

pub struct CatapultManager {
    own: Vec<Point>,
    enemy: Vec<Point>,
}

impl CatapultManager {
    pub fn new() -> Self {
        CatapultManager {
            own: Vec::new(),
            enemy: Vec::new(),
        }
    }

    /// Rescans known own catapults and every enemy catapult within attack
    /// range of one of the agent's own military buildings.
    pub fn refresh(&mut self, world: &World, engine: &dyn Engine, base_attack_distance: u32) {
        self.own = engine.own_buildings_of_type(BuildingType::Catapult);

        let mut enemy = FnvHashSet::default();
        for building in world.all_buildings() {
            if !building.building_type.is_military() {
                continue;
            }
            let Some(pt) = building.point() else { continue };
            for (epos, etype, _owner) in engine.in_attack_range(pt, base_attack_distance) {
                if etype == BuildingType::Catapult {
                    enemy.insert(epos);
                }
            }
        }
        self.enemy = enemy.into_iter().collect();
    }

    pub fn own_catapults(&self) -> &[Point] {
        &self.own
    }

    pub fn enemy_catapults(&self) -> &[Point] {
        &self.enemy
    }

    pub fn is_enemy_catapult(&self, pt: Point) -> bool {
        self.enemy.contains(&pt)
    }
}

impl Default for CatapultManager {
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

    #[test]
    fn refresh_finds_enemy_catapult_near_own_military_building() {
        let dims = GridDims::new(20, 20);
        let mut engine = FakeEngine::new(dims);
        let mut world = World::new(dims);

        let barracks = world.create(BuildingType::Barracks, BuildingState::PlanningRequest, None, Point::new(5, 5));
        world.construct(barracks, Point::new(5, 5)).unwrap();

        let enemy_pt = Point::new(6, 5);
        engine.add_building(enemy_pt, BuildingType::Catapult);
        engine.set_territory(enemy_pt, PlayerId(1));

        let mut manager = CatapultManager::new();
        manager.refresh(&world, &engine, 21);

        assert!(manager.is_enemy_catapult(enemy_pt));
    }

    #[test]
    fn refresh_lists_own_catapults() {
        let dims = GridDims::new(20, 20);
        let mut engine = FakeEngine::new(dims);
        let world = World::new(dims);
        engine.add_building(Point::new(3, 3), BuildingType::Catapult);

        let mut manager = CatapultManager::new();
        manager.refresh(&world, &engine, 21);

        assert_eq!(manager.own_catapults(), &[Point::new(3, 3)]);
    }
}
