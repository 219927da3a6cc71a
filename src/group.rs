//! Production groups: ordered templates of building types whose members'
//! locality the planner enforces (spec §3 "Production group"; grounded on
//! `original_source/libs/s25main/ai/beowulf/World.h`'s `ProductionGroup`).

use crate::building::{BuildingId, BuildingType};
use crate::hex::Point;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// An ordered list of expected building types with a parallel list of
/// currently-assigned buildings (some slots may be empty).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductionGroup {
    pub id: GroupId,
    pub types: Vec<BuildingType>,
    pub buildings: Vec<Option<BuildingId>>,
    /// The anchor flag/region this group was seeded for (spec §4.10).
    pub region_anchor: Point,
}

impl ProductionGroup {
    pub fn new(id: GroupId, types: Vec<BuildingType>, region_anchor: Point) -> Self {
        let buildings = vec![None; types.len()];
        ProductionGroup {
            id,
            types,
            buildings,
            region_anchor,
        }
    }

    /// Index of the first empty slot whose type matches `building_type`,
    /// if any.
    pub fn free_slot_for(&self, building_type: BuildingType) -> Option<usize> {
        self.types
            .iter()
            .zip(self.buildings.iter())
            .position(|(t, b)| *t == building_type && b.is_none())
    }

    pub fn assign(&mut self, slot: usize, building: BuildingId) {
        self.buildings[slot] = Some(building);
    }

    pub fn unassign(&mut self, building: BuildingId) {
        for slot in self.buildings.iter_mut() {
            if *slot == Some(building) {
                *slot = None;
            }
        }
    }

    pub fn member_of_type(&self, building_type: BuildingType) -> Option<BuildingId> {
        self.types
            .iter()
            .zip(self.buildings.iter())
            .find(|(t, _)| **t == building_type)
            .and_then(|(_, b)| *b)
    }

    pub fn is_fully_placed(&self) -> bool {
        self.buildings.iter().all(Option::is_some)
    }

    pub fn missing_slots(&self) -> impl Iterator<Item = (usize, BuildingType)> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.buildings[*i].is_none())
            .map(|(i, t)| (i, *t))
    }
}

/// Standard production-group templates seeded when a building is created
/// without an explicit group (spec §4.3 "Building creation"; grounded on
/// `original_source/.../recurrent/ProductionPlanner.cpp`'s `CreateGroup`
/// call sites).
pub fn default_template_for(building_type: BuildingType) -> Option<Vec<BuildingType>> {
    use BuildingType::*;
    match building_type {
        Sawmill | Woodcutter | Forester => {
            Some(vec![Woodcutter, Woodcutter, Forester, Sawmill])
        }
        IronSmelter | Armory => Some(vec![IronSmelter, Armory]),
        Mill | Bakery => Some(vec![Mill, Bakery]),
        SlaughterHouse | PigFarm => Some(vec![SlaughterHouse, PigFarm]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_slot_matches_first_unassigned_of_type() {
        let g = ProductionGroup::new(
            GroupId(0),
            vec![
                BuildingType::Woodcutter,
                BuildingType::Woodcutter,
                BuildingType::Forester,
                BuildingType::Sawmill,
            ],
            Point::new(0, 0),
        );
        assert_eq!(g.free_slot_for(BuildingType::Woodcutter), Some(0));
        assert_eq!(g.free_slot_for(BuildingType::Sawmill), Some(3));
        assert_eq!(g.free_slot_for(BuildingType::Mint), None);
    }

    #[test]
    fn invariant_assigned_count_never_exceeds_types() {
        let mut g = ProductionGroup::new(GroupId(1), vec![BuildingType::Sawmill], Point::new(0, 0));
        let id = BuildingId::new();
        g.assign(0, id);
        assert!(g.buildings.iter().filter(|b| b.is_some()).count() <= g.types.len());
        assert!(g.is_fully_placed());
    }
}
