//! The external interface to the host game engine (spec §6).
//!
//! `Engine` is the read-only capability set the agent queries; `Command` is
//! what the agent emits; `Notification` is what the engine delivers back.
//! Grounded on the teacher's split between `PlannerRoomDataSource` (a read
//! trait implemented once for the live Screeps API and once for an offline
//! bench source) -- here the same split is `Engine` (trait) plus
//! `FakeEngine` (an in-memory implementation used by every other module's
//! unit tests, since there is no live binding in this crate's scope).

use crate::building::BuildingType;
use crate::goods::ResourceType;
use crate::hex::{Direction, GridDims, Point};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Read-only queries the agent issues against the host engine (spec §6).
pub trait Engine {
    fn dims(&self) -> GridDims;

    /// Building quality the engine computes from terrain alone, before any
    /// of the agent's planning overlays (spec §4.3 BQ calculator input).
    fn terrain_bq(&self, pt: Point) -> crate::building::BuildingQuality;

    fn is_visible(&self, pt: Point) -> bool;

    /// Territory owner at `pt`, `None` if unowned (spec §4.3 capture
    /// prediction, §4.9).
    fn territory_owner(&self, pt: Point) -> Option<PlayerId>;

    /// Raw resource amount at `pt` for `resource`, only meaningful when
    /// visible or (for water) always.
    fn resource_amount(&self, pt: Point, resource: ResourceType) -> u32;

    /// Whether the point's underlying terrain can ever host this resource
    /// at all (distinct from whether an amount has been revealed yet).
    fn is_mineable(&self, pt: Point, resource: ResourceType) -> bool;

    fn road_present(&self, pt: Point, dir: Direction) -> bool;

    /// Own headquarters/storehouse/harbour locations.
    fn own_warehouses(&self) -> Vec<Point>;

    fn own_buildings_of_type(&self, building_type: BuildingType) -> Vec<Point>;

    fn inventory_good(&self, warehouse: Point, good: crate::goods::Good) -> u32;

    fn inventory_job(&self, warehouse: Point, job: Job) -> u32;

    /// `pathfind(src, dst, max_cost)`: `Some(first direction)` toward dst if
    /// reachable within `max_cost`, `None` otherwise (spec §6).
    fn pathfind(&self, src: Point, dst: Point, max_cost: u32) -> Option<Direction>;

    fn player_id(&self) -> PlayerId;

    fn is_enemy_of(&self, other: PlayerId) -> bool;

    /// Enemy military buildings able to attack/influence `pt` within
    /// `radius` (spec §6 `in-attack-range-from-here`).
    fn in_attack_range(&self, pt: Point, radius: u32) -> Vec<(Point, BuildingType, PlayerId)>;

    fn tick(&self) -> u64;
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Job {
    Builder,
    Planer,
    Soldier,
    Baker,
    Butcher,
    PackDonkey,
    Hunter,
    Fisher,
    Geologist,
}

/// The worker job a finished building of this type employs, where the
/// catalogue names one explicitly (spec §4.10/§4.11 `JobOrToolOrQueueSpace`;
/// grounded on `BLD_WORK_DESC[type].job` in `original_source`'s
/// `GameConsts.h`). Types outside the job-producing chain (warehouses,
/// raw-good gatherers without a dedicated `Job` variant) have no modeled
/// gate and always pass the check.
pub fn building_job(building_type: BuildingType) -> Option<Job> {
    use BuildingType::*;
    match building_type {
        Bakery => Some(Job::Baker),
        SlaughterHouse => Some(Job::Butcher),
        DonkeyBreeder => Some(Job::PackDonkey),
        Hunter => Some(Job::Hunter),
        Fishery => Some(Job::Fisher),
        _ => None,
    }
}

/// The tool a worker of this job needs to take up the post (spec §4.11).
/// Collapsed onto this crate's smaller `Tool` catalogue rather than the
/// original's one-tool-per-job table; `Butcher` has no dedicated cleaver
/// variant here, so it shares `Axe` (documented simplification, DESIGN.md).
pub fn job_tool(job: Job) -> Option<Tool> {
    match job {
        Job::Builder | Job::Planer => Some(Tool::Hammer),
        Job::Soldier => None,
        Job::Baker => Some(Tool::RollingPin),
        Job::Butcher => Some(Tool::Axe),
        Job::PackDonkey => None,
        Job::Hunter => Some(Tool::Bow),
        Job::Fisher => Some(Tool::FishingRod),
        Job::Geologist => Some(Tool::PickAxe),
    }
}

/// Commands the agent may issue (spec §6).
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    PlaceBuilding(Point, BuildingType),
    PlaceFlag(Point),
    DestroyBuilding(Point),
    DestroyFlag(Point),
    BuildRoad(Point, Vec<Direction>),
    DestroyRoad(Point, Direction),
    Attack {
        target: Point,
        soldier_count: u32,
        strong_first: bool,
    },
    SetProductionEnabled(Point, bool),
    SetCoinsAllowed(Point, bool),
    SendSoldiersHome(Point),
    OrderNewSoldiers(Point),
    ChangeMilitarySettings(MilitarySettings),
    ChangeToolOrders(ToolOrders),
    ChangeBuildOrder(Vec<BuildingType>),
    Surrender,
    Chat(String),
}

/// Fixed 8-field military settings struct (spec §6). The agent sets
/// concrete values once at startup and never mutates them afterward.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MilitarySettings {
    pub recruiting_ratio: u8,
    pub prefer_strong_first_ratio: u8,
    pub active_defender_chance: u8,
    pub attackers_to_available_ratio: u8,
    pub occupation_inland: u8,
    pub occupation_middle: u8,
    pub occupation_harbour: u8,
    pub occupation_border: u8,
}

impl Default for MilitarySettings {
    fn default() -> Self {
        MilitarySettings {
            recruiting_ratio: 100,
            prefer_strong_first_ratio: 100,
            active_defender_chance: 100,
            attackers_to_available_ratio: 100,
            occupation_inland: 10,
            occupation_middle: 50,
            occupation_harbour: 80,
            occupation_border: 100,
        }
    }
}

/// Per-tool desired order counts (spec §4.11).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOrders {
    pub orders: FnvHashMap<Tool, i32>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Tool {
    Axe,
    Hammer,
    RollingPin,
    PickAxe,
    Saw,
    Scythe,
    FishingRod,
    Crucible,
    Bow,
}

/// Notifications the engine delivers back (spec §6).
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub player: PlayerId,
    pub kind: NotificationKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NotificationKind {
    Building(BuildingNote),
    Road(RoadNote),
    Flag(FlagNote),
    Tool(ToolNote),
    Node { pt: Point, kind: NodeNoteKind },
    Resource(ResourceNote),
    /// Ship/expedition lifecycle (spec §6). Expeditions are outside every
    /// in-scope subsystem (§1 Non-goals); the agent subscribes, as spec §6
    /// requires, but has nothing to act on here.
    Expedition,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingNote {
    pub pos: Point,
    pub building_type: BuildingType,
    pub subtype: BuildingNoteKind,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BuildingNoteKind {
    LuaOrder,
    SetBuildingSiteFailed,
    Constructed,
    Captured,
    Destroyed,
    NoRessources,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoadNote {
    pub pos: Point,
    pub route: Vec<Direction>,
    pub subtype: RoadNoteKind,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RoadNoteKind {
    Constructed,
    Destroyed,
    ConstructionFailed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlagNote {
    pub pos: Point,
    pub subtype: FlagNoteKind,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FlagNoteKind {
    Constructed,
    ConstructionFailed,
    Destroyed,
    DestructionFailed,
    Captured,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolNote {
    pub tool: Tool,
    pub subtype: ToolNoteKind,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ToolNoteKind {
    ToolProduced,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NodeNoteKind {
    Bq,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceNote {
    pub pt: Point,
    pub resource: ResourceType,
}

/// A scoped subscription handle releasing on drop (spec §9 design notes).
/// The agent's own tick loop owns one for its entire lifetime; this mostly
/// documents the intended resource-acquisition pattern for a host
/// integration that wires notifications in.
pub struct SubscriptionHandle {
    active: bool,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        SubscriptionHandle { active: true }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.active = false;
    }
}

/// A deterministic, fully in-memory `Engine` used by every module's unit
/// tests and by `Agent` integration tests. Not behind a `#[cfg(test)]` gate
/// since other crates embedding this one may want an offline fixture too
/// (same rationale as the teacher compiling its bench-only code paths by
/// default when the `screeps` feature is off).
#[derive(Clone)]
pub struct FakeEngine {
    dims: GridDims,
    player: PlayerId,
    terrain_bq: FnvHashMap<Point, crate::building::BuildingQuality>,
    visible: FnvHashMap<Point, bool>,
    territory: FnvHashMap<Point, PlayerId>,
    resources: FnvHashMap<(Point, ResourceType), u32>,
    mineable: FnvHashMap<(Point, ResourceType), bool>,
    roads: FnvHashMap<(Point, Direction), bool>,
    warehouses: Vec<Point>,
    buildings: FnvHashMap<Point, BuildingType>,
    inventory_goods: FnvHashMap<(Point, crate::goods::Good), u32>,
    inventory_jobs: FnvHashMap<(Point, Job), u32>,
    tick: u64,
}

impl FakeEngine {
    pub fn new(dims: GridDims) -> Self {
        FakeEngine {
            dims,
            player: PlayerId(0),
            terrain_bq: FnvHashMap::default(),
            visible: FnvHashMap::default(),
            territory: FnvHashMap::default(),
            resources: FnvHashMap::default(),
            mineable: FnvHashMap::default(),
            roads: FnvHashMap::default(),
            warehouses: Vec::new(),
            buildings: FnvHashMap::default(),
            inventory_goods: FnvHashMap::default(),
            inventory_jobs: FnvHashMap::default(),
            tick: 0,
        }
    }

    pub fn set_terrain_bq(&mut self, pt: Point, bq: crate::building::BuildingQuality) {
        self.terrain_bq.insert(pt, bq);
        self.visible.insert(pt, true);
    }

    pub fn set_visible(&mut self, pt: Point, visible: bool) {
        self.visible.insert(pt, visible);
    }

    pub fn set_resource(&mut self, pt: Point, resource: ResourceType, amount: u32) {
        self.resources.insert((pt, resource), amount);
        self.mineable.insert((pt, resource), true);
    }

    pub fn set_mineable(&mut self, pt: Point, resource: ResourceType, mineable: bool) {
        self.mineable.insert((pt, resource), mineable);
    }

    pub fn set_road(&mut self, pt: Point, dir: Direction, present: bool) {
        self.roads.insert((pt, dir), present);
        let n = self.dims.neighbour(pt, dir);
        self.roads.insert((n, dir.opposite()), present);
    }

    pub fn add_warehouse(&mut self, pt: Point, building_type: BuildingType) {
        self.warehouses.push(pt);
        self.buildings.insert(pt, building_type);
    }

    pub fn add_building(&mut self, pt: Point, building_type: BuildingType) {
        self.buildings.insert(pt, building_type);
    }

    pub fn set_inventory_good(&mut self, warehouse: Point, good: crate::goods::Good, amount: u32) {
        self.inventory_goods.insert((warehouse, good), amount);
    }

    pub fn set_inventory_job(&mut self, warehouse: Point, job: Job, amount: u32) {
        self.inventory_jobs.insert((warehouse, job), amount);
    }

    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn set_territory(&mut self, pt: Point, owner: PlayerId) {
        self.territory.insert(pt, owner);
    }
}

impl Engine for FakeEngine {
    fn dims(&self) -> GridDims {
        self.dims
    }

    fn terrain_bq(&self, pt: Point) -> crate::building::BuildingQuality {
        self.terrain_bq
            .get(&pt)
            .copied()
            .unwrap_or(crate::building::BuildingQuality::None)
    }

    fn is_visible(&self, pt: Point) -> bool {
        self.visible.get(&pt).copied().unwrap_or(false)
    }

    fn territory_owner(&self, pt: Point) -> Option<PlayerId> {
        self.territory.get(&pt).copied()
    }

    fn resource_amount(&self, pt: Point, resource: ResourceType) -> u32 {
        self.resources.get(&(pt, resource)).copied().unwrap_or(0)
    }

    fn is_mineable(&self, pt: Point, resource: ResourceType) -> bool {
        self.mineable.get(&(pt, resource)).copied().unwrap_or(false)
    }

    fn road_present(&self, pt: Point, dir: Direction) -> bool {
        self.roads.get(&(pt, dir)).copied().unwrap_or(false)
    }

    fn own_warehouses(&self) -> Vec<Point> {
        self.warehouses.clone()
    }

    fn own_buildings_of_type(&self, building_type: BuildingType) -> Vec<Point> {
        self.buildings
            .iter()
            .filter(|(_, t)| **t == building_type)
            .map(|(pt, _)| *pt)
            .collect()
    }

    fn inventory_good(&self, warehouse: Point, good: crate::goods::Good) -> u32 {
        self.inventory_goods.get(&(warehouse, good)).copied().unwrap_or(0)
    }

    fn inventory_job(&self, warehouse: Point, job: Job) -> u32 {
        self.inventory_jobs.get(&(warehouse, job)).copied().unwrap_or(0)
    }

    fn pathfind(&self, src: Point, dst: Point, max_cost: u32) -> Option<Direction> {
        if self.dims.distance(src, dst) > max_cost {
            return None;
        }
        Direction::ALL
            .iter()
            .copied()
            .min_by_key(|dir| self.dims.distance(self.dims.neighbour(src, *dir), dst))
    }

    fn player_id(&self) -> PlayerId {
        self.player
    }

    fn is_enemy_of(&self, other: PlayerId) -> bool {
        other != self.player
    }

    fn in_attack_range(&self, pt: Point, radius: u32) -> Vec<(Point, BuildingType, PlayerId)> {
        self.buildings
            .iter()
            .filter(|(bpt, _)| self.dims.distance(**bpt, pt) <= radius)
            .filter_map(|(bpt, bt)| {
                let owner = self.territory.get(bpt).copied().unwrap_or(self.player);
                if owner != self.player {
                    Some((*bpt, *bt, owner))
                } else {
                    None
                }
            })
            .collect()
    }

    fn tick(&self) -> u64 {
        self.tick
    }
}
