//! Agent façade: owns every subsystem and exposes the single per-tick
//! entry point a host integration calls (spec §2, §6).
//!
//! Grounded on `original_source/libs/s25main/ai/beowulf/Beowulf.{h,cpp}`,
//! the top-level object that owns one instance of every recurrent manager
//! plus the shared `World`/`ResourceMap`, and on the teacher's top-level
//! `Planner` struct for the "one façade object wired up once, called every
//! tick" shape.

use crate::attack_manager::AttackManager;
use crate::building::{BuildingState, BuildingType};
use crate::building_planner::BuildingPlanner;
use crate::catapult_manager::CatapultManager;
use crate::coin_manager::CoinManager;
use crate::config::AgentConfig;
use crate::engine::{
    BuildingNoteKind, Command, Engine, FlagNoteKind, Notification, NotificationKind, RoadNoteKind, SubscriptionHandle,
};
use crate::expansion_planner::ExpansionPlanner;
use crate::hex::Direction;
use crate::metalworks::MetalworksManager;
use crate::production_planner::ProductionPlanner;
use crate::resources::ResourceMap;
use crate::rng::AgentRng;
use crate::road_manager::RoadManager;
use crate::scheduler::Scheduler;
use crate::world::World;
use log::{debug, trace};

/// Everything the agent needs across the lifetime of one match, wired up
/// once at construction and driven one engine tick at a time (spec §2
/// "Lifecycle").
pub struct Agent {
    world: World,
    resources: ResourceMap,
    roads: RoadManager,
    building_planner: BuildingPlanner,
    expansion_planner: ExpansionPlanner,
    production_planner: ProductionPlanner,
    metalworks: MetalworksManager,
    coins: CoinManager,
    attack: AttackManager,
    catapults: CatapultManager,
    scheduler: Scheduler,
    #[allow(dead_code)]
    rng: AgentRng,
    config: AgentConfig,
    #[allow(dead_code)]
    subscription: SubscriptionHandle,
}

impl Agent {
    /// Construction: one `Agent` per player, bound to its engine-reported
    /// dimensions, seeding its RNG from the current tick (spec §9 design
    /// notes).
    pub fn new(engine: &dyn Engine, config: AgentConfig) -> Self {
        let dims = engine.dims();
        Agent {
            world: World::new(dims),
            resources: ResourceMap::new(dims),
            roads: RoadManager::new(config.upper_traffic_limit),
            building_planner: BuildingPlanner::new(),
            expansion_planner: ExpansionPlanner::new(&config),
            production_planner: ProductionPlanner::new(),
            metalworks: MetalworksManager::new(),
            coins: CoinManager::new(),
            attack: AttackManager::new(),
            catapults: CatapultManager::new(),
            scheduler: Scheduler::new(),
            rng: AgentRng::from_tick(engine.tick()),
            config,
            subscription: SubscriptionHandle::new(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.scheduler.is_defeated()
    }

    /// The single per-tick entry point (spec §2, §6): applies every
    /// notification delivered since the last call, runs the fixed
    /// recurrent pipeline on decision ticks, and returns the commands
    /// accumulated this call.
    pub fn tick(&mut self, engine: &dyn Engine, notifications: &[Notification]) -> Vec<Command> {
        if self.scheduler.is_defeated() {
            return Vec::new();
        }

        let me = engine.player_id();
        for note in notifications {
            if note.player != me {
                continue;
            }
            self.handle_notification(engine, &note.kind);
        }

        if Scheduler::is_decision_tick(engine.tick(), me.0, self.config.decision_tick_period) {
            self.scheduler.run_decision_tick(
                &mut self.world,
                engine,
                &self.resources,
                &mut self.building_planner,
                &mut self.roads,
                &self.expansion_planner,
                &mut self.production_planner,
                &mut self.metalworks,
                &mut self.attack,
                &mut self.coins,
                &mut self.catapults,
                &self.config,
            );
        }

        self.world.drain_commands()
    }

    fn handle_notification(&mut self, engine: &dyn Engine, kind: &NotificationKind) {
        match kind {
            NotificationKind::Building(note) => self.handle_building_note(engine, note),
            NotificationKind::Road(note) => self.handle_road_note(engine, note),
            NotificationKind::Flag(note) => self.handle_flag_note(engine, note),
            NotificationKind::Tool(note) => {
                if note.subtype == crate::engine::ToolNoteKind::ToolProduced {
                    self.metalworks.on_tool_produced(&mut self.world);
                }
            }
            NotificationKind::Node { pt, kind } => {
                if *kind == crate::engine::NodeNoteKind::Bq {
                    trace!("agent: node bq changed at {:?}, clearing placement blacklist", pt);
                    self.building_planner.clear_blacklist();
                }
            }
            NotificationKind::Resource(note) => {
                self.resources.mark_reported(note.pt, note.resource);
            }
            NotificationKind::Expedition => {}
        }
    }

    fn handle_building_note(&mut self, engine: &dyn Engine, note: &crate::engine::BuildingNote) {
        let dims = self.world.dims();
        let id = self.world.building_at(note.pos).map(|b| b.id);

        match note.subtype {
            BuildingNoteKind::Constructed => {
                if let Some(id) = id {
                    self.world.building_mut(id).unwrap().state = BuildingState::Finished;
                    if let Some(resource) = note.building_type.required_resource() {
                        if is_gathered_on_place(note.building_type) {
                            self.resources.added(note.pos, resource);
                        }
                    }
                    self.coins.on_building_note(id, note);
                }
            }
            BuildingNoteKind::SetBuildingSiteFailed => {
                if let Some(id) = id {
                    debug!("agent: building site failed for {:?} at {:?}", note.building_type, note.pos);
                    self.world.remove(id);
                    self.coins.on_building_note(id, note);
                }
            }
            BuildingNoteKind::Captured => {
                if let Some(id) = id {
                    self.world.building_mut(id).unwrap().captured = true;
                    self.roads.on_building_captured(&mut self.world, engine, id);
                    self.coins.on_building_note(id, note);
                }
            }
            BuildingNoteKind::Destroyed => {
                let flag = dims.neighbour(note.pos, Direction::SouthEast);
                if let Some(id) = id {
                    if let Some(resource) = note.building_type.required_resource() {
                        if is_gathered_on_place(note.building_type) {
                            self.resources.removed(note.pos, resource);
                        }
                    }
                    self.world.remove(id);
                    self.coins.on_building_note(id, note);
                }
                self.roads.on_site_lost(dims, flag);
            }
            BuildingNoteKind::NoRessources => {
                if let Some(resource) = note.building_type.required_resource() {
                    self.resources.mark_exhausted(note.pos, resource);
                }
            }
            BuildingNoteKind::LuaOrder => {
                trace!("agent: ignoring host-scripted order for building at {:?}", note.pos);
            }
        }
    }

    fn handle_road_note(&mut self, engine: &dyn Engine, note: &crate::engine::RoadNote) {
        match note.subtype {
            RoadNoteKind::Destroyed => {
                self.roads.on_road_destroyed(&mut self.world, engine, note.pos, &note.route);
            }
            RoadNoteKind::ConstructionFailed => {
                self.roads.on_road_construction_failed(&mut self.world, note.pos);
            }
            RoadNoteKind::Constructed => {}
        }
    }

    fn handle_flag_note(&mut self, _engine: &dyn Engine, note: &crate::engine::FlagNote) {
        let dims = self.world.dims();
        match note.subtype {
            FlagNoteKind::Destroyed | FlagNoteKind::ConstructionFailed | FlagNoteKind::DestructionFailed => {
                self.roads.on_site_lost(dims, note.pos);
            }
            FlagNoteKind::Constructed | FlagNoteKind::Captured => {}
        }
    }
}

/// Whether a finished building of this type should mark its required
/// resource as actively harvested (spec §4.5 `Added`/`Removed`): only the
/// direct resource-gathering buildings, not the downstream types that merely
/// need *reachable* resource radius to be worth placing.
fn is_gathered_on_place(building_type: BuildingType) -> bool {
    matches!(
        building_type,
        BuildingType::Woodcutter
            | BuildingType::Forester
            | BuildingType::Quarry
            | BuildingType::GraniteMine
            | BuildingType::CoalMine
            | BuildingType::IronMine
            | BuildingType::GoldMine
            | BuildingType::Hunter
            | BuildingType::Fishery
            | BuildingType::Farm
            | BuildingType::Well
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FakeEngine, PlayerId};
    use crate::hex::{GridDims, Point};
    use crate::testutil::{buildable_engine, finished_building};

    fn dims() -> GridDims {
        GridDims::new(20, 20)
    }

    #[test]
    fn tick_is_a_no_op_without_warehouses_until_surrender() {
        let dims = dims();
        let engine = FakeEngine::new(dims);
        let mut agent = Agent::new(&engine, AgentConfig::default());
        let commands = agent.tick(&engine, &[]);
        assert!(commands.iter().any(|c| matches!(c, Command::Surrender)));
        assert!(agent.is_defeated());

        let commands2 = agent.tick(&engine, &[]);
        assert!(commands2.is_empty());
    }

    #[test]
    fn constructed_note_marks_building_finished() {
        let mut engine = buildable_engine();
        let mut agent = Agent::new(&engine, AgentConfig::default());
        let hq = agent.world.create(BuildingType::Headquarters, BuildingState::PlanningRequest, None, Point::new(10, 10));
        agent.world.construct(hq, Point::new(10, 10)).unwrap();
        engine.add_warehouse(Point::new(10, 10), BuildingType::Headquarters);

        let note = Notification {
            player: PlayerId(0),
            kind: NotificationKind::Building(crate::engine::BuildingNote {
                pos: Point::new(10, 10),
                building_type: BuildingType::Headquarters,
                subtype: BuildingNoteKind::Constructed,
            }),
        };
        agent.tick(&engine, std::slice::from_ref(&note));

        assert_eq!(agent.world.building(hq).unwrap().state, BuildingState::Finished);
    }

    #[test]
    fn tool_produced_note_reaches_metalworks_manager() {
        let dims = dims();
        let engine = FakeEngine::new(dims);
        let mut agent = Agent::new(&engine, AgentConfig::default());
        finished_building(&mut agent.world, BuildingType::Metalworks, Point::new(5, 5));
        agent.metalworks.request(crate::engine::Tool::Axe);
        agent.metalworks.request(crate::engine::Tool::Hammer);
        agent.metalworks.run(&mut agent.world);
        agent.world.drain_commands();

        let note = Notification {
            player: PlayerId(0),
            kind: NotificationKind::Tool(crate::engine::ToolNote {
                tool: crate::engine::Tool::Axe,
                subtype: crate::engine::ToolNoteKind::ToolProduced,
            }),
        };
        agent.tick(&engine, std::slice::from_ref(&note));
        assert_eq!(agent.metalworks.queue_len(), 1);
    }
}
