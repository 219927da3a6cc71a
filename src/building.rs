//! Building types, building quality, and the `Building` record itself
//! (spec §3 Data model; grounded on
//! `original_source/libs/s25main/ai/beowulf/Building.h` /
//! `Buildings.h` for the type catalogue and state machine, and on the
//! teacher's `plan.rs::RoomItem` for the "typed placement + derived data"
//! shape).

use crate::goods::Good;
use crate::hex::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every building type the agent plans for. Grouped roughly by role;
/// ordering has no semantic meaning beyond matching the catalogue in
/// `original_source`'s `Buildings.cpp`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum BuildingType {
    Headquarters,
    Storehouse,
    HarborBuilding,

    Woodcutter,
    Forester,
    Sawmill,
    Quarry,
    GraniteMine,

    CoalMine,
    IronMine,
    GoldMine,
    IronSmelter,
    Armory,
    Metalworks,
    Mint,

    Farm,
    Well,
    Mill,
    Bakery,
    PigFarm,
    SlaughterHouse,
    Brewery,
    Hunter,
    Fishery,
    CharBurner,

    DonkeyBreeder,

    Barracks,
    Guardhouse,
    Watchtower,
    Fortress,
    Catapult,
    LookoutTower,
}

impl BuildingType {
    /// The building-quality level required to host this building (spec §3).
    pub fn required_bq(self) -> BuildingQuality {
        use BuildingType::*;
        match self {
            Headquarters | Fortress | Watchtower => BuildingQuality::Castle,
            Storehouse | HarborBuilding | Sawmill | IronSmelter | Armory | Metalworks | Mint
            | Mill | Bakery | SlaughterHouse | Brewery | Barracks | Guardhouse | LookoutTower => {
                BuildingQuality::House
            }
            Woodcutter | Forester | Farm | Well | PigFarm | Hunter | Fishery | CharBurner
            | DonkeyBreeder => BuildingQuality::Hut,
            Quarry => BuildingQuality::Flag,
            CoalMine | IronMine | GoldMine | GraniteMine => BuildingQuality::Mine,
            Catapult => BuildingQuality::House,
        }
    }

    /// True for the types the expansion planner manages (spec §4.9).
    pub fn is_military(self) -> bool {
        matches!(
            self,
            BuildingType::Barracks
                | BuildingType::Guardhouse
                | BuildingType::Watchtower
                | BuildingType::Fortress
        )
    }

    pub fn is_mine(self) -> bool {
        matches!(
            self,
            BuildingType::CoalMine | BuildingType::IronMine | BuildingType::GoldMine | BuildingType::GraniteMine
        )
    }

    pub fn is_warehouse(self) -> bool {
        matches!(
            self,
            BuildingType::Headquarters | BuildingType::Storehouse | BuildingType::HarborBuilding
        )
    }

    /// (good produced, units/tick, good consumed + rate) -- used to seed
    /// expected traffic and the production planner's ledger (spec §4.10,
    /// §3 "expected traffic"). Consumption rates are approximate multiples
    /// of the production rate, following the original's `ProductionConsts.h`
    /// relative weighting rather than exact engine timings (out of scope).
    pub fn production(self) -> Option<(Good, u32)> {
        use BuildingType::*;
        match self {
            Woodcutter => Some((Good::Wood, 1)),
            Forester => Some((Good::Tree, 1)),
            Sawmill => Some((Good::Board, 1)),
            Quarry => Some((Good::Stone, 1)),
            GraniteMine => Some((Good::Stone, 1)),
            CoalMine => Some((Good::Coal, 1)),
            IronMine => Some((Good::IronOre, 1)),
            GoldMine => Some((Good::Gold, 1)),
            IronSmelter => Some((Good::Iron, 1)),
            Armory => Some((Good::Weapon, 1)),
            Mint => Some((Good::Coin, 1)),
            Farm => Some((Good::Grain, 1)),
            Well => Some((Good::Water, 1)),
            Mill => Some((Good::Flour, 1)),
            Bakery => Some((Good::Food, 1)),
            PigFarm => Some((Good::Pig, 1)),
            SlaughterHouse => Some((Good::Food, 1)),
            Brewery => Some((Good::Beer, 1)),
            Hunter => Some((Good::Food, 1)),
            Fishery => Some((Good::Food, 1)),
            CharBurner => Some((Good::Coal, 1)),
            DonkeyBreeder => Some((Good::Donkey, 1)),
            _ => None,
        }
    }

    /// Goods this type consumes per production cycle, at the same rate as
    /// its output (spec §4.10's ledger needs both sides of the balance;
    /// approximate chain grounded on the Settlers II production graph,
    /// narrower than `original_source`'s exact `ProductionConsts` tables).
    pub fn consumes(self) -> &'static [Good] {
        use BuildingType::*;
        use Good::*;
        match self {
            Sawmill => &[Wood],
            IronSmelter => &[Coal, IronOre],
            Armory => &[Iron, Coal],
            Mint => &[Gold, Coal],
            Mill => &[Grain],
            Bakery => &[Flour, Water],
            SlaughterHouse => &[Pig],
            PigFarm => &[Grain, Water],
            Brewery => &[Grain, Water],
            DonkeyBreeder => &[Grain, Water],
            Woodcutter => &[Tree],
            CharBurner => &[Wood],
            CoalMine | IronMine | GoldMine | GraniteMine => &[Food],
            _ => &[],
        }
    }

    /// Required underlying resource type, for types that need one nearby
    /// to be worth placing (spec §4.10 step 11 "Farms and wells").
    pub fn required_resource(self) -> Option<crate::goods::ResourceType> {
        use crate::goods::ResourceType as R;
        use BuildingType::*;
        match self {
            Farm => Some(R::PlantSpaceRadius2),
            Well => Some(R::Water),
            Woodcutter => Some(R::Wood),
            Forester => Some(R::PlantSpaceRadius6),
            Quarry => Some(R::Stone),
            GraniteMine => Some(R::Granite),
            CoalMine => Some(R::Coal),
            IronMine => Some(R::Iron),
            GoldMine => Some(R::Gold),
            Hunter => Some(R::HuntableAnimals),
            Fishery => Some(R::Fish),
            _ => None,
        }
    }
}

/// Building quality at a point (spec §3): an ordered ladder plus two
/// non-ordered special cases.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum BuildingQuality {
    None,
    Flag,
    Hut,
    House,
    Castle,
    Mine,
    Harbour,
}

impl BuildingQuality {
    /// Whether a point with this BQ can host a building requiring `required`.
    /// Mine/Harbour only cover themselves; the ordered ladder covers
    /// anything up to and including itself.
    pub fn covers(self, required: BuildingQuality) -> bool {
        match (self, required) {
            (BuildingQuality::Mine, BuildingQuality::Mine) => true,
            (BuildingQuality::Harbour, BuildingQuality::Harbour) => true,
            (BuildingQuality::Mine, _) | (BuildingQuality::Harbour, _) => false,
            (_, BuildingQuality::Mine) | (_, BuildingQuality::Harbour) => false,
            (have, need) => have >= need,
        }
    }

    /// Ordinal value on the ordered ladder, used by the enumerator's
    /// `GetSum` territory-degradation metric (spec §4.4). Mine/Harbour
    /// contribute a fixed high value since they're scarce.
    pub fn ladder_value(self) -> u32 {
        match self {
            BuildingQuality::None => 0,
            BuildingQuality::Flag => 1,
            BuildingQuality::Hut => 2,
            BuildingQuality::House => 3,
            BuildingQuality::Castle => 4,
            BuildingQuality::Mine => 3,
            BuildingQuality::Harbour => 4,
        }
    }
}

/// Lifecycle of a building, flag, or road segment (spec §3).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum BuildingState {
    PlanningRequest,
    ConstructionRequested,
    UnderConstruction,
    Finished,
    DestructionRequested,
}

impl BuildingState {
    pub fn has_valid_point(self) -> bool {
        matches!(
            self,
            BuildingState::ConstructionRequested
                | BuildingState::UnderConstruction
                | BuildingState::Finished
                | BuildingState::DestructionRequested
        )
    }
}

/// Opaque id for a `Building`, stable for the building's lifetime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BuildingId(pub Uuid);

impl BuildingId {
    pub fn new() -> Self {
        BuildingId(Uuid::new_v4())
    }
}

/// Expected traffic for a building: wares/unit-time it consumes (inbound)
/// and produces (outbound), used by the road manager's traffic-aware
/// routing (spec §3, §4.6).
#[derive(Copy, Clone, Default, Debug, Serialize, Deserialize)]
pub struct Traffic {
    pub produced: u32,
    pub consumed: u32,
}

/// A single planned/placed building (spec §3).
///
/// Invariant: `point.is_some()` iff `state.has_valid_point()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub building_type: BuildingType,
    pub state: BuildingState,
    point: Option<Point>,
    pub group: Option<crate::group::GroupId>,
    pub traffic: Traffic,
    /// Set when this building was captured from an opponent rather than
    /// built by the agent (spec §3 "captured-flag").
    pub captured: bool,
}

impl Building {
    pub fn new_request(building_type: BuildingType, group: Option<crate::group::GroupId>) -> Self {
        let traffic = default_traffic(building_type);
        Building {
            id: BuildingId::new(),
            building_type,
            state: BuildingState::PlanningRequest,
            point: None,
            group,
            traffic,
            captured: false,
        }
    }

    pub fn new_fixed(building_type: BuildingType, point: Point, group: Option<crate::group::GroupId>) -> Self {
        let mut b = Self::new_request(building_type, group);
        b.point = Some(point);
        b
    }

    pub fn point(&self) -> Option<Point> {
        self.point
    }

    /// Bind the building to a point, e.g. when the planner commits a
    /// placement. Only valid while the building has no point yet.
    pub fn set_point(&mut self, point: Point) {
        self.point = Some(point);
    }

    /// The building's flag point: its south-east neighbour (spec §3).
    pub fn flag_point(&self, dims: &crate::hex::GridDims) -> Option<Point> {
        self.point
            .map(|pt| dims.neighbour(pt, crate::hex::Direction::SouthEast))
    }

    pub fn is_fixed_position(&self) -> bool {
        self.building_type.is_military()
    }
}

fn default_traffic(building_type: BuildingType) -> Traffic {
    match building_type.production() {
        Some((_, rate)) => Traffic {
            produced: rate,
            consumed: rate,
        },
        None => Traffic::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bq_covers_ladder_transitively() {
        assert!(BuildingQuality::Castle.covers(BuildingQuality::Hut));
        assert!(BuildingQuality::House.covers(BuildingQuality::Flag));
        assert!(!BuildingQuality::Hut.covers(BuildingQuality::House));
    }

    #[test]
    fn bq_mine_and_harbour_only_cover_themselves() {
        assert!(BuildingQuality::Mine.covers(BuildingQuality::Mine));
        assert!(!BuildingQuality::Mine.covers(BuildingQuality::Flag));
        assert!(!BuildingQuality::Castle.covers(BuildingQuality::Mine));
    }

    #[test]
    fn building_point_invariant_on_construct() {
        let mut b = Building::new_request(BuildingType::Sawmill, None);
        assert!(b.point().is_none());
        b.state = BuildingState::ConstructionRequested;
        b.set_point(Point::new(1, 1));
        assert!(b.state.has_valid_point());
        assert!(b.point().is_some());
    }

    #[test]
    fn flag_point_is_south_east_neighbour() {
        let dims = crate::hex::GridDims::new(24, 22);
        let mut b = Building::new_request(BuildingType::Sawmill, None);
        b.set_point(Point::new(10, 10));
        let expected = dims.neighbour(Point::new(10, 10), crate::hex::Direction::SouthEast);
        assert_eq!(b.flag_point(&dims), Some(expected));
    }
}
