//! Goods and resource-type enums, and the per-good production ledger the
//! production planner balances (spec §4.10; grounded on
//! `original_source/libs/s25main/ai/beowulf/Types.h`'s `BGoodType` /
//! `BResourceType`, which spec.md's distillation compresses to prose
//! ("a per-good (produced, consumed) balance") without naming the goods).

use serde::{Deserialize, Serialize};

/// Goods tracked by the production planner. Ordered (as in the original)
/// so that a good's production never depends on a good with a larger index
/// -- i.e. earlier entries are "more downstream".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Good {
    Weapon,
    Beer,
    Tool,
    Ship,
    Donkey,
    Coin,
    Iron,
    Coal,
    IronOre,
    Gold,
    Board,
    Wood,
    Tree,
    Stone,
    Food,
    Flour,
    Pig,
    Grain,
    Water,
}

impl Good {
    pub const COUNT: usize = 19;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The resource types the resource map can query per point (spec §3, §4.5).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ResourceType {
    Iron,
    Gold,
    Coal,
    Granite,
    Water,
    PlantSpaceRadius2,
    PlantSpaceRadius6,
    Fish,
    HuntableAnimals,
    Wood,
    Stone,
}

impl ResourceType {
    pub const COUNT: usize = 11;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Radius within which a building of this resource type reaches out to
    /// harvest it (spec §4.5 `GetReachable`).
    pub fn radius(self) -> u32 {
        match self {
            ResourceType::Water => 1,
            ResourceType::Iron | ResourceType::Gold | ResourceType::Coal => 2,
            ResourceType::PlantSpaceRadius2 => 2,
            ResourceType::PlantSpaceRadius6 => 6,
            ResourceType::Wood => 6,
            ResourceType::Fish => 7,
            ResourceType::Granite => 8,
            ResourceType::Stone => 8,
            ResourceType::HuntableAnimals => 20,
        }
    }

    /// Whether this resource requires visibility to query directly (all but
    /// water, per spec §4.5).
    pub fn requires_visibility(self) -> bool {
        !matches!(self, ResourceType::Water)
    }

    /// Whether this resource is a mineral subject to fog-of-war guessing
    /// from neighbouring mineable points (spec §4.5).
    pub fn is_mineral(self) -> bool {
        matches!(self, ResourceType::Iron | ResourceType::Gold | ResourceType::Coal)
    }
}

/// A single good's (produced, consumed) tally for one planning region
/// (spec §4.10).
#[derive(Copy, Clone, Default, Debug, Serialize, Deserialize)]
pub struct GoodBalance {
    pub produced: u32,
    pub consumed: u32,
}

impl GoodBalance {
    pub fn overproduction(self) -> i64 {
        self.produced as i64 - self.consumed as i64
    }
}

/// Per-good production ledger for a region (spec §4.10: "tallies a per-good
/// (produced, consumed) balance from all of that region's production
/// buildings").
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct ProductionLedger {
    balances: [GoodBalance; Good::COUNT],
}

impl ProductionLedger {
    pub fn get(&self, good: Good) -> GoodBalance {
        self.balances[good.index()]
    }

    pub fn add_produced(&mut self, good: Good, amount: u32) {
        self.balances[good.index()].produced += amount;
    }

    pub fn add_consumed(&mut self, good: Good, amount: u32) {
        self.balances[good.index()].consumed += amount;
    }

    pub fn merge(&mut self, other: &ProductionLedger) {
        for i in 0..Good::COUNT {
            self.balances[i].produced += other.balances[i].produced;
            self.balances[i].consumed += other.balances[i].consumed;
        }
    }
}
