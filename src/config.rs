//! Tunable constants for the agent's recurrent subsystems.
//!
//! The reference implementation scatters these as bare literals through its
//! planner source; collecting them here (same role as the teacher's
//! `constants.rs`) keeps planner logic readable and lets tests override
//! thresholds without patching the algorithms.

/// Every engine tick the agent is invoked; `decision_tick_period` gates how
/// often the recurrent subsystems actually run (spec §2, §4.13).
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Ticks between decision ticks (spec: 16).
    pub decision_tick_period: u32,
    /// Ticks between expansion-planner runs, in decision-tick units (spec: 10).
    pub expansion_planner_period: u32,
    /// Ticks between production-planner runs, in decision-tick units (spec: 15).
    pub production_planner_period: u32,
    /// Wares/unit-time above which the road manager penalizes reusing a
    /// road segment (spec §4.6: 30).
    pub upper_traffic_limit: u32,
    /// Minimum soldiers at a storehouse before the expansion planner will
    /// consider it (spec §4.9: 5).
    pub expansion_min_soldiers: u32,
    /// Maximum number of military sites under construction before the
    /// expansion planner throttles to zero (spec §4.9: 3).
    pub expansion_max_concurrent_sites: u32,
    /// Fibonacci thresholds indexed by board/stone producer count, used by
    /// the production planner's board and stone rules (spec §4.10: steps 2-3).
    pub production_fibonacci: [u32; 8],
    /// Bucketed score breakpoints for resource-abundance scoring
    /// (spec §4.7).
    pub resource_abundance_buckets: [u32; 20],
    /// Bucketed score breakpoints for goods-destination-distance scoring
    /// (spec §4.7).
    pub distance_buckets: [u32; 10],
    /// Minimum promotable soldiers at the coin academy before coins are
    /// enabled there (spec §4.12: 3).
    pub coin_academy_min_soldiers: u32,
    /// Maximum concurrent builders the production planner may keep busy
    /// across a region (original source: 10).
    pub production_planner_builder_budget: u32,
    /// Update radius the build-location enumerator re-evaluates around a
    /// changed point, before the spec's minimum-2 clamp (spec §4.4).
    pub build_location_update_radius_default: u32,
    /// Update radius used after placing a castle-sized building (spec §4.4: 4).
    pub build_location_update_radius_castle: u32,
    /// Maximum pathfinding cost a worker may walk to reach a resource tile
    /// when scoring reachability (spec §4.5 `GetReachable`).
    pub worker_max_path_cost: u32,
    /// Radius around a point checked for nearby farmland before a
    /// non-farm building may be placed there (spec §4.4, grounded on
    /// `original_source`'s `2*FARMER_RADIUS` exclusion).
    pub farmland_exclusion_radius: u32,
    /// "Base attacking distance" the attack manager and catapult tracker
    /// scan within (spec §4.12, §6 `in-attack-range-from-here`; grounded
    /// on `original_source`'s `BASE_ATTACKING_DISTANCE`).
    pub base_attack_distance: u32,
    /// Maximum length of the metalworks manager's desired-tool queue
    /// before `job_or_tool_or_queue_space` refuses new orders (spec §4.11;
    /// original source: 20).
    pub metalworks_max_queue_len: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            decision_tick_period: 16,
            expansion_planner_period: 10,
            production_planner_period: 15,
            upper_traffic_limit: 30,
            expansion_min_soldiers: 5,
            expansion_max_concurrent_sites: 3,
            production_fibonacci: [1, 2, 3, 5, 8, 13, 21, 34],
            resource_abundance_buckets: [
                5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100,
            ],
            distance_buckets: [2, 4, 6, 8, 10, 12, 14, 16, 18, 20],
            coin_academy_min_soldiers: 3,
            production_planner_builder_budget: 10,
            build_location_update_radius_default: 3,
            build_location_update_radius_castle: 4,
            worker_max_path_cost: 20,
            farmland_exclusion_radius: 6,
            base_attack_distance: 21,
            metalworks_max_queue_len: 20,
        }
    }
}
