//! Planning world: the shadow map unifying committed engine state with
//! planning overlays (spec §4.3).
//!
//! Grounded on `original_source/libs/s25main/ai/beowulf/World.{h,cpp}` for
//! the Construct/Deconstruct/Plan/ClearPlan split and the goods-destination
//! lookup table, and on the teacher's `plan.rs`/`room_data.rs` for the
//! "typed per-point committed state + derived index" shape.

use crate::building::{Building, BuildingId, BuildingQuality, BuildingState, BuildingType, Traffic};
use crate::engine::{Command, Engine, PlayerId};
use crate::group::{default_template_for, GroupId, ProductionGroup};
use crate::hex::{Direction, GridDims, Point};
use crate::road_network::{NetworkId, RoadNetworkTracker, INVALID_NETWORK};
use fnv::{FnvHashMap, FnvHashSet};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FlagState {
    DoesNotExist,
    Requested,
    Finished,
    DestructionRequested,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RoadState {
    DoesNotExist,
    Requested,
    Finished,
    DestructionRequested,
}

#[derive(Default, Clone)]
struct PlanOverlay {
    flag_count: u32,
    road_count: [u32; 3],
}

pub struct World {
    dims: GridDims,
    buildings: FnvHashMap<BuildingId, Building>,
    building_at: FnvHashMap<Point, BuildingId>,
    /// Buildings created purely to probe a hypothetical placement during a
    /// scoring pass; removed by `clear_plan` (spec §4.3: "ClearPlan ...
    /// drops all PlanningRequest buildings" -- narrowed here to trial
    /// buildings specifically, see DESIGN.md Open Question #4).
    trial_buildings: FnvHashSet<BuildingId>,
    planned_points: FnvHashMap<BuildingId, Point>,

    flag_state: FnvHashMap<Point, FlagState>,
    road_state: FnvHashMap<(Point, Direction), RoadState>,
    overlay: FnvHashMap<Point, PlanOverlay>,

    groups: FnvHashMap<GroupId, ProductionGroup>,
    next_group_id: u32,

    pub network: RoadNetworkTracker,
    farmland: FnvHashSet<Point>,

    commands: Vec<Command>,
}

impl World {
    pub fn new(dims: GridDims) -> Self {
        World {
            dims,
            buildings: FnvHashMap::default(),
            building_at: FnvHashMap::default(),
            trial_buildings: FnvHashSet::default(),
            planned_points: FnvHashMap::default(),
            flag_state: FnvHashMap::default(),
            road_state: FnvHashMap::default(),
            overlay: FnvHashMap::default(),
            groups: FnvHashMap::default(),
            next_group_id: 0,
            network: RoadNetworkTracker::new(dims),
            farmland: FnvHashSet::default(),
            commands: Vec::new(),
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Drain engine commands emitted since the last call (the scheduler
    /// pulls these once per tick and forwards them to the host engine).
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Queues a command that isn't a planning-world mutation in its own
    /// right (tool orders, production toggles, attacks, military settings).
    /// The metalworks/coin/attack managers and the scheduler use this to
    /// share the same outbound queue as `Construct`/`ConstructRoad`/etc.
    pub fn emit_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    pub fn building_at(&self, pt: Point) -> Option<&Building> {
        self.building_at.get(&pt).and_then(|id| self.buildings.get(id))
    }

    pub fn all_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn flag_present(&self, pt: Point) -> bool {
        let committed = matches!(
            self.flag_state.get(&pt),
            Some(FlagState::Requested) | Some(FlagState::Finished)
        );
        committed || self.overlay.get(&pt).map(|o| o.flag_count > 0).unwrap_or(false)
    }

    fn canonicalize(&self, pt: Point, dir: Direction) -> (Point, Direction) {
        crate::hex::canonical_edge(self.dims, pt, dir)
    }

    fn canonical_index(dir: Direction) -> usize {
        crate::hex::canonical_slot(dir)
    }

    pub fn road_present(&self, pt: Point, dir: Direction) -> bool {
        let (cpt, cdir) = self.canonicalize(pt, dir);
        let committed = matches!(
            self.road_state.get(&(cpt, cdir)),
            Some(RoadState::Requested) | Some(RoadState::Finished)
        );
        let planned = self
            .overlay
            .get(&cpt)
            .map(|o| o.road_count[Self::canonical_index(cdir)] > 0)
            .unwrap_or(false);
        committed || planned
    }

    pub fn is_road_possible(&self, pt: Point, dir: Direction) -> bool {
        !self.road_present(pt, dir)
    }

    pub fn is_farmland(&self, pt: Point) -> bool {
        self.farmland.contains(&pt)
    }

    pub fn mark_farmland(&mut self, pt: Point) {
        self.farmland.insert(pt);
    }

    /// The effective building quality at `pt`: `None` if a building/flag
    /// already occupies it (committed or planned), otherwise the engine's
    /// terrain BQ reduced by the castle-neighbour blocking rule (spec §4.3
    /// "Blocking manner").
    pub fn effective_bq(&self, engine: &dyn Engine, pt: Point) -> BuildingQuality {
        if self.building_at.contains_key(&pt) || self.flag_present(pt) {
            return BuildingQuality::None;
        }
        let base = engine.terrain_bq(pt);
        if base == BuildingQuality::Castle && self.has_castle_neighbour(pt) {
            BuildingQuality::House
        } else {
            base
        }
    }

    fn has_castle_neighbour(&self, pt: Point) -> bool {
        self.dims.neighbours(pt).iter().any(|n| {
            self.building_at(*n)
                .map(|b| b.building_type.required_bq() == BuildingQuality::Castle && b.state != BuildingState::DestructionRequested)
                .unwrap_or(false)
        })
    }

    /// Resolves `pt` to a flag and looks up its network. Every planner in
    /// this crate calls `network_id`/`same_network` with a building's own
    /// anchor point (its warehouse/region point), not the flag `construct`
    /// plants at that building's south-east neighbour -- so a literal flag
    /// point is used unchanged, and anything else is resolved to its own
    /// south-east neighbour's flag first.
    pub fn network_id(&mut self, pt: Point) -> NetworkId {
        let pt = if self.flag_present(pt) {
            pt
        } else {
            let candidate = self.dims.neighbour(pt, Direction::SouthEast);
            if self.flag_present(candidate) {
                candidate
            } else {
                pt
            }
        };
        let flag_state = self.flag_state.clone();
        let overlay = self.overlay.clone();
        let road_state = self.road_state.clone();
        let dims = self.dims;
        let is_flag = |p: Point| {
            matches!(flag_state.get(&p), Some(FlagState::Requested) | Some(FlagState::Finished))
                || overlay.get(&p).map(|o| o.flag_count > 0).unwrap_or(false)
        };
        let road_present = move |p: Point, dir: Direction| {
            let (cpt, cdir) = if Direction::CANONICAL_HALF.contains(&dir) {
                (p, dir)
            } else {
                (dims.neighbour(p, dir), dir.opposite())
            };
            let idx = Direction::CANONICAL_HALF.iter().position(|d| *d == cdir).expect("canonical");
            matches!(road_state.get(&(cpt, cdir)), Some(RoadState::Requested) | Some(RoadState::Finished))
                || overlay.get(&cpt).map(|o| o.road_count[idx] > 0).unwrap_or(false)
        };
        self.network.id_of(pt, is_flag, road_present)
    }

    pub fn same_network(&mut self, a: Point, b: Point) -> bool {
        self.network_id(a) != INVALID_NETWORK && self.network_id(a) == self.network_id(b)
    }

    // ------------------------------------------------------------------
    // Building creation & groups (spec §4.3 "Building creation")
    // ------------------------------------------------------------------

    /// `anchor` is the anchor flag this building is being requested/placed
    /// from; it seeds `region_anchor` on any production group auto-created
    /// for `building_type` (spec §4.3 "Building creation"). Callers that
    /// already pass an explicit `group` or whose type has no default
    /// template never seed a group, so the value is immaterial there.
    pub fn create(&mut self, building_type: BuildingType, state: BuildingState, group: Option<GroupId>, anchor: Point) -> BuildingId {
        let resolved_group = group.or_else(|| self.auto_assign_group(building_type, anchor));
        let mut building = Building::new_request(building_type, resolved_group);
        building.state = state;
        let id = building.id;
        if let Some(gid) = resolved_group {
            if let Some(g) = self.groups.get_mut(&gid) {
                if let Some(slot) = g.free_slot_for(building_type) {
                    g.assign(slot, id);
                }
            }
        }
        self.buildings.insert(id, building);
        id
    }

    fn auto_assign_group(&mut self, building_type: BuildingType, anchor: Point) -> Option<GroupId> {
        for (gid, group) in self.groups.iter() {
            if group.free_slot_for(building_type).is_some() {
                return Some(*gid);
            }
        }
        let template = default_template_for(building_type)?;
        Some(self.create_group(template, anchor))
    }

    pub fn create_group(&mut self, types: Vec<BuildingType>, anchor: Point) -> GroupId {
        let gid = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.groups.insert(gid, ProductionGroup::new(gid, types, anchor));
        gid
    }

    pub fn groups(&self) -> impl Iterator<Item = &ProductionGroup> {
        self.groups.values()
    }

    pub fn group(&self, id: GroupId) -> Option<&ProductionGroup> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut ProductionGroup> {
        self.groups.get_mut(&id)
    }

    /// Create(type, PlanningRequest) then Remove before Construct: restores
    /// the building list to its prior length (spec §8 round-trip law).
    pub fn remove(&mut self, id: BuildingId) {
        if let Some(building) = self.buildings.remove(&id) {
            if let Some(pt) = building.point() {
                self.building_at.remove(&pt);
            }
            if let Some(gid) = building.group {
                if let Some(g) = self.groups.get_mut(&gid) {
                    g.unassign(id);
                }
            }
            self.trial_buildings.remove(&id);
            self.planned_points.remove(&id);
        }
    }

    // ------------------------------------------------------------------
    // Planning mutations (no engine commands; spec §4.3)
    // ------------------------------------------------------------------

    pub fn plan(&mut self, id: BuildingId, pt: Point) {
        self.trial_buildings.insert(id);
        self.planned_points.insert(id, pt);
        let flag_pt = self.dims.neighbour(pt, Direction::SouthEast);
        self.plan_flag(flag_pt);
    }

    pub fn plan_flag(&mut self, pt: Point) {
        self.overlay.entry(pt).or_default().flag_count += 1;
    }

    pub fn plan_road(&mut self, pt: Point, route: &[Direction]) {
        let mut cur = pt;
        for dir in route {
            let (cpt, cdir) = self.canonicalize(cur, *dir);
            let idx = Self::canonical_index(cdir);
            self.overlay.entry(cpt).or_default().road_count[idx] += 1;
            cur = self.dims.neighbour(cur, *dir);
        }
    }

    /// Erase all planning overlays and drop all trial buildings (spec
    /// §4.3 ClearPlan). Every committed mutation calls this first.
    pub fn clear_plan(&mut self) {
        self.overlay.clear();
        for id in self.trial_buildings.drain().collect::<Vec<_>>() {
            if let Some(building) = self.buildings.get(&id) {
                if building.point().is_none() {
                    self.buildings.remove(&id);
                }
            }
            self.planned_points.remove(&id);
        }
    }

    pub fn planned_point(&self, id: BuildingId) -> Option<Point> {
        self.planned_points.get(&id).copied()
    }

    // ------------------------------------------------------------------
    // Committed mutations (spec §4.3)
    // ------------------------------------------------------------------

    pub fn construct(&mut self, id: BuildingId, pt: Point) -> Result<(), crate::error::AgentError> {
        self.clear_plan();
        let state = self.buildings.get(&id).map(|b| b.state);
        match state {
            Some(BuildingState::Finished)
            | Some(BuildingState::ConstructionRequested)
            | Some(BuildingState::UnderConstruction) => {
                return Err(crate::error::AgentError::InvalidBuildingState(state.unwrap()));
            }
            None => return Ok(()),
            _ => {}
        }
        let building_type = self.buildings.get(&id).unwrap().building_type;
        self.commands.push(Command::PlaceBuilding(pt, building_type));
        if let Some(building) = self.buildings.get_mut(&id) {
            building.state = BuildingState::ConstructionRequested;
            building.set_point(pt);
        }
        self.building_at.insert(pt, id);

        let flag_pt = self.dims.neighbour(pt, Direction::SouthEast);
        if !self.flag_present(flag_pt) {
            self.construct_flag_inner(flag_pt);
        }
        self.network.invalidate();
        Ok(())
    }

    pub fn construct_flag(&mut self, pt: Point) {
        self.clear_plan();
        self.construct_flag_inner(pt);
    }

    fn construct_flag_inner(&mut self, pt: Point) {
        if self.flag_present(pt) {
            return;
        }
        self.commands.push(Command::PlaceFlag(pt));
        self.flag_state.insert(pt, FlagState::Requested);
        self.network.invalidate();
    }

    pub fn construct_road(&mut self, pt: Point, route: Vec<Direction>) -> Result<(), crate::error::AgentError> {
        self.clear_plan();
        if !self.flag_present(pt) {
            return Err(crate::error::AgentError::NoFlagAt(pt));
        }
        let mut cur = pt;
        for dir in &route {
            let (cpt, cdir) = self.canonicalize(cur, *dir);
            self.road_state.insert((cpt, cdir), RoadState::Requested);
            cur = self.dims.neighbour(cur, *dir);
        }
        self.commands.push(Command::BuildRoad(pt, route));
        self.network.invalidate();
        Ok(())
    }

    pub fn deconstruct(&mut self, id: BuildingId) {
        self.clear_plan();
        if let Some(building) = self.buildings.get_mut(&id) {
            if let Some(pt) = building.point() {
                self.commands.push(Command::DestroyBuilding(pt));
            }
            building.state = BuildingState::DestructionRequested;
        }
        self.network.invalidate();
    }

    pub fn deconstruct_flag(&mut self, pt: Point) {
        self.clear_plan();
        self.commands.push(Command::DestroyFlag(pt));
        self.flag_state.insert(pt, FlagState::DestructionRequested);

        // Flood-fill the connected roads out to the next flag, marking them
        // DestructionRequested (spec §4.3).
        let dims = self.dims;
        let mut to_mark = Vec::new();
        for dir in Direction::ALL {
            if self.road_present(pt, dir) {
                let mut cur = pt;
                let mut cur_dir = dir;
                loop {
                    to_mark.push((cur, cur_dir));
                    let next = dims.neighbour(cur, cur_dir);
                    if self.flag_state.get(&next).map(|s| matches!(s, FlagState::Requested | FlagState::Finished)).unwrap_or(false) {
                        break;
                    }
                    let continuing = Direction::ALL
                        .into_iter()
                        .find(|d| *d != cur_dir.opposite() && self.road_present(next, *d));
                    match continuing {
                        Some(d) => {
                            cur = next;
                            cur_dir = d;
                        }
                        None => break,
                    }
                }
            }
        }
        for (cur, dir) in to_mark {
            let (cpt, cdir) = self.canonicalize(cur, dir);
            self.road_state.insert((cpt, cdir), RoadState::DestructionRequested);
        }
        self.network.invalidate();
    }

    pub fn deconstruct_road(&mut self, pt: Point, route: &[Direction]) {
        self.clear_plan();
        if route.is_empty() {
            return;
        }
        let mut cur = pt;
        for dir in route {
            let (cpt, cdir) = self.canonicalize(cur, *dir);
            self.road_state.insert((cpt, cdir), RoadState::DestructionRequested);
            cur = self.dims.neighbour(cur, *dir);
        }
        self.commands.push(Command::DestroyRoad(pt, route[0]));
        self.network.invalidate();
    }

    // ------------------------------------------------------------------
    // Goods destination lookup (spec §4.3)
    // ------------------------------------------------------------------

    /// `(check_group, candidate_types)` per building type, per spec §4.3's
    /// worked examples; unlisted types fall back to nearest storehouse.
    fn goods_destination_candidates(building_type: BuildingType) -> (bool, &'static [BuildingType]) {
        use BuildingType::*;
        match building_type {
            Woodcutter => (true, &[Sawmill]),
            IronSmelter => (true, &[Armory, Metalworks]),
            Well => (true, &[Bakery, Brewery, DonkeyBreeder, SlaughterHouse]),
            _ => (false, &[Storehouse, Headquarters, HarborBuilding]),
        }
    }

    pub fn goods_destination(&mut self, building_id: BuildingId) -> Option<BuildingId> {
        let building = self.buildings.get(&building_id)?.clone();
        let (check_group, candidates) = Self::goods_destination_candidates(building.building_type);

        if check_group {
            if let Some(gid) = building.group {
                if let Some(group) = self.groups.get(&gid) {
                    for candidate_type in candidates {
                        if let Some(found) = group.member_of_type(*candidate_type) {
                            return Some(found);
                        }
                    }
                }
            }
        }

        let flag = building.flag_point(&self.dims)?;
        let network = self.network_id(flag);
        if network == INVALID_NETWORK {
            return None;
        }

        let mut best: Option<(u32, BuildingId)> = None;
        for other in self.buildings.values() {
            if !candidates.contains(&other.building_type) {
                continue;
            }
            let Some(other_flag) = other.flag_point(&self.dims) else { continue };
            if self.network_id(other_flag) != network {
                continue;
            }
            let dist = self.dims.distance(flag, other_flag);
            if best.map(|(d, _)| dist < d).unwrap_or(true) {
                best = Some((dist, other.id));
            }
        }
        best.map(|(_, id)| id)
    }

    // ------------------------------------------------------------------
    // Military capture prediction (spec §4.3)
    // ------------------------------------------------------------------

    /// Predicts the set of points that would transfer to the agent's
    /// territory, and the hostile buildings destroyed by the transfer, if a
    /// hypothetical new military building of `building_type` were placed at
    /// `pt`. Simplifies the original's line-of-influence tie-break to
    /// strict nearest-military-building-wins (documented Open Question in
    /// DESIGN.md).
    pub fn predict_capture(
        &self,
        engine: &dyn Engine,
        pt: Point,
        building_type: BuildingType,
        radius: u32,
    ) -> (FnvHashSet<Point>, Vec<Point>) {
        let me = engine.player_id();
        let mut military: Vec<(Point, u32, PlayerId)> = Vec::new();
        military.push((pt, radius, me));

        for building in self.buildings.values() {
            if !building.building_type.is_military() || building.state == BuildingState::DestructionRequested {
                continue;
            }
            if let Some(bpt) = building.point() {
                let owner = engine.territory_owner(bpt).unwrap_or(me);
                military.push((bpt, military_radius(building.building_type), owner));
            }
        }
        // Enemy buildings observed within range, keyed by point, so a
        // captured candidate can be matched against an actual hostile
        // building rather than this crate's own (never-enemy-owned)
        // `building_at` index (spec §4.3 "hostile buildings ... destroyed").
        let mut enemy_buildings: FnvHashMap<Point, BuildingType> = FnvHashMap::default();
        for (epos, etype, eowner) in engine.in_attack_range(pt, radius.max(20)) {
            if etype.is_military() {
                military.push((epos, military_radius(etype), eowner));
            }
            if eowner != me {
                enemy_buildings.insert(epos, etype);
            }
        }

        let mut gained = FnvHashSet::default();
        let mut destroyed = Vec::new();

        for dy in -(radius as i32)..=(radius as i32) {
            for dx in -(radius as i32)..=(radius as i32) {
                let x = self.dims.wrap_x(pt.x() as i32 + dx);
                let y = self.dims.wrap_y(pt.y() as i32 + dy);
                let candidate = Point::new(x, y);
                let dist_to_new = self.dims.distance(pt, candidate);
                if dist_to_new > radius {
                    continue;
                }

                let mut owner: Option<PlayerId> = None;
                let mut best_dist = u32::MAX;
                for (mpos, mradius, mowner) in &military {
                    let d = self.dims.distance(*mpos, candidate);
                    if d <= *mradius && d < best_dist {
                        best_dist = d;
                        owner = Some(*mowner);
                    }
                }

                let previous_owner = engine.territory_owner(candidate);
                if owner == Some(me) && previous_owner != Some(me) {
                    gained.insert(candidate);
                    if let Some(&building_type) = enemy_buildings.get(&candidate) {
                        // Military buildings are captured intact, not
                        // destroyed, by a territory transfer (spec §6
                        // `BuildingNoteKind::Captured`); everything else --
                        // including catapults, which this crate's
                        // `is_military` deliberately excludes -- is lost.
                        if !building_type.is_military() {
                            destroyed.push(candidate);
                        }
                    }
                }
            }
        }

        (gained, destroyed)
    }
}

/// Territory-influence radius per military building type (spec §4.9
/// "military-capable points"; approximate scale grounded on the relative
/// size ordering barracks < guardhouse < watchtower < fortress implied by
/// §4.9's upgrade chain).
pub fn military_radius(building_type: BuildingType) -> u32 {
    match building_type {
        BuildingType::Barracks => 6,
        BuildingType::Guardhouse => 8,
        BuildingType::Watchtower => 12,
        BuildingType::Fortress => 16,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FakeEngine;

    fn dims() -> GridDims {
        GridDims::new(24, 22)
    }

    #[test]
    fn create_then_remove_restores_building_count() {
        let mut world = World::new(dims());
        let before = world.all_buildings().count();
        let id = world.create(BuildingType::Sawmill, BuildingState::PlanningRequest, None, Point::new(3, 3));
        world.remove(id);
        assert_eq!(world.all_buildings().count(), before);
    }

    #[test]
    fn plan_then_clear_restores_flag_presence() {
        let mut world = World::new(dims());
        let pt = Point::new(5, 5);
        assert!(!world.flag_present(pt));
        world.plan_flag(pt);
        assert!(world.flag_present(pt));
        world.clear_plan();
        assert!(!world.flag_present(pt));
    }

    #[test]
    fn construct_requires_not_already_finished() {
        let mut world = World::new(dims());
        let id = world.create(BuildingType::Sawmill, BuildingState::PlanningRequest, None, Point::new(3, 3));
        world.construct(id, Point::new(3, 3)).unwrap();
        world.building_mut(id).unwrap().state = BuildingState::Finished;
        let result = world.construct(id, Point::new(3, 3));
        assert!(result.is_err());
    }

    #[test]
    fn construct_also_requests_flag_if_missing() {
        let mut world = World::new(dims());
        let pt = Point::new(3, 3);
        let id = world.create(BuildingType::Sawmill, BuildingState::PlanningRequest, None, pt);
        world.construct(id, pt).unwrap();
        let flag_pt = dims().neighbour(pt, Direction::SouthEast);
        assert!(world.flag_present(flag_pt));
    }

    #[test]
    fn construct_road_requires_present_flag() {
        let mut world = World::new(dims());
        let pt = Point::new(3, 3);
        let result = world.construct_road(pt, vec![Direction::East]);
        assert!(result.is_err());
    }

    #[test]
    fn construct_road_round_trips_with_deconstruct() {
        let mut world = World::new(dims());
        let pt = Point::new(3, 3);
        world.construct_flag(pt);
        world.construct_road(pt, vec![Direction::East]).unwrap();
        assert!(world.road_present(pt, Direction::East));
        world.deconstruct_road(pt, &[Direction::East]);
        assert!(!matches!(
            world.road_state.get(&(pt, Direction::East)),
            Some(RoadState::Requested) | Some(RoadState::Finished)
        ));
    }

    #[test]
    fn goods_destination_prefers_group_member() {
        let mut world = World::new(dims());
        let gid = world.create_group(vec![BuildingType::Woodcutter, BuildingType::Sawmill], Point::new(0, 0));
        let woodcutter = world.create(BuildingType::Woodcutter, BuildingState::Finished, Some(gid), Point::new(0, 0));
        let sawmill = world.create(BuildingType::Sawmill, BuildingState::Finished, Some(gid), Point::new(0, 0));
        world.group_mut(gid).unwrap().assign(0, woodcutter);
        world.group_mut(gid).unwrap().assign(1, sawmill);
        let dest = world.goods_destination(woodcutter);
        assert_eq!(dest, Some(sawmill));
    }

    #[test]
    fn auto_assigned_group_anchors_to_the_seeding_point_not_the_origin() {
        let mut world = World::new(dims());
        let anchor = Point::new(9, 9);
        let id = world.create(BuildingType::Woodcutter, BuildingState::PlanningRequest, None, anchor);
        let gid = world.building(id).unwrap().group.unwrap();
        assert_eq!(world.group(gid).unwrap().region_anchor, anchor);
    }

    #[test]
    fn effective_bq_none_when_building_present() {
        let mut world = World::new(dims());
        let mut engine = FakeEngine::new(dims());
        let pt = Point::new(4, 4);
        engine.set_terrain_bq(pt, BuildingQuality::House);
        assert_eq!(world.effective_bq(&engine, pt), BuildingQuality::House);
        let id = world.create(BuildingType::Sawmill, BuildingState::PlanningRequest, None, pt);
        world.construct(id, pt).unwrap();
        assert_eq!(world.effective_bq(&engine, pt), BuildingQuality::None);
    }
}
