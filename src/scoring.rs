//! Per-point scoring for non-military building placement (spec §4.4
//! "Scoring", §4.8).
//!
//! Grounded on `original_source/libs/s25main/ai/beowulf/Heuristics.cpp`:
//! each criterion contributes a score in `[0, 1]` (`RateHigh`/`RateSmall`
//! bucket into ten user-tuned thresholds), criteria that represent a hard
//! requirement return `None` for the whole vector instead of a low score,
//! and the final decision combines the vector via a hypervolume (product)
//! exactly as `BuildingPlanner.cpp::HyperVolume` does.

use crate::building::{Building, BuildingType};
use crate::engine::Engine;
use crate::group::GroupId;
use crate::hex::Point;
use crate::resources::ResourceMap;
use crate::world::World;

/// Higher `val` scores closer to 1.0.
pub fn rate_high(val: u32, buckets: &[u32]) -> f64 {
    let mut count = 0usize;
    while count < buckets.len() && val > buckets[count] {
        count += 1;
    }
    1.0 / ((buckets.len() + 2) as f64 - count as f64)
}

/// Lower `val` scores closer to 1.0.
pub fn rate_small(val: u32, buckets: &[u32]) -> f64 {
    1.0 - rate_high(val, buckets)
}

/// Combines a score vector into a single rank via product (spec §4.4): any
/// zero component kills the whole placement, same as the original.
pub fn hypervolume(scores: &[f64]) -> f64 {
    scores.iter().product()
}

/// `(minimum reachable resources required, group members to score distance
/// to, whether to score distance to the goods destination)` per building
/// type (spec §4.4; grounded on `Heuristics.cpp`'s `S_build_location_checks`
/// table). Types not listed have no special requirement.
fn location_checks(building_type: BuildingType) -> (u32, &'static [BuildingType], bool) {
    use BuildingType::*;
    match building_type {
        GraniteMine | CoalMine | IronMine | GoldMine | Fishery | Quarry | Well => (1, &[], true),
        Woodcutter => (0, &[Forester, Sawmill], true),
        Forester => (4, &[Woodcutter], true),
        SlaughterHouse => (0, &[PigFarm], true),
        Hunter => (2, &[], false),
        Brewery | Metalworks | IronSmelter | PigFarm => (0, &[], true),
        Armory => (0, &[IronSmelter], true),
        CharBurner => (8, &[], true),
        Mill => (0, &[], true),
        Bakery => (0, &[Mill], true),
        Sawmill => (0, &[Woodcutter], true),
        Mint => (0, &[], true),
        Farm => (20, &[], true),
        _ => (0, &[], false),
    }
}

/// Scores `building` placed at `pt`. Returns `None` if the placement is
/// invalid outright (hard requirement failed); otherwise a vector of
/// `[0, 1]` scores to be combined with [`hypervolume`].
#[allow(clippy::too_many_arguments)]
pub fn score_building_position(
    engine: &dyn Engine,
    world: &World,
    resources: &ResourceMap,
    building: &Building,
    pt: Point,
    config: &crate::config::AgentConfig,
) -> Option<Vec<f64>> {
    let building_type = building.building_type;
    let mut score = Vec::new();
    let (required_resource_amount, group_distance_types, wares_destination) = location_checks(building_type);

    if required_resource_amount > 0 {
        if let Some(resource_type) = building_type.required_resource() {
            let reachable = resources.get_reachable(engine, pt, resource_type, true, true, false, config.worker_max_path_cost);
            if reachable < required_resource_amount {
                return None;
            }
            score.push(rate_high(reachable, &config.resource_abundance_buckets));
        }
    }

    for member_type in group_distance_types {
        if let Some(gid) = building.group {
            if let Some(dist) = group_member_distance(world, gid, *member_type, pt) {
                score.push(rate_small(dist, &config.distance_buckets));
            }
        }
    }

    if wares_destination {
        // Distance to the goods destination is unknown until the building
        // actually exists; new requests default to a neutral 1.0 and are
        // re-scored once placed and connected (spec §4.4: `Update()` later
        // re-weighs nearby candidates once the destination is known).
        score.push(1.0);
    }

    if is_near_farmland(world, pt, config.farmland_exclusion_radius) {
        return None;
    }
    score.push(1.0);

    match building_type {
        BuildingType::Hunter => {
            let nearest = nearest_building_distance(world, pt, &[BuildingType::Hunter]);
            score.push(rate_high(nearest.unwrap_or(24), &[4, 8, 12, 16, 20, 24]));
        }
        BuildingType::HarborBuilding | BuildingType::Storehouse => {
            let nearest = nearest_building_distance(world, pt, &[BuildingType::Headquarters, BuildingType::Storehouse, BuildingType::HarborBuilding]);
            score.push(rate_high(nearest.unwrap_or(12), &[2, 3, 5, 7, 10, 12]));
        }
        BuildingType::Quarry => {
            let nearest = nearest_building_distance(world, pt, &[BuildingType::Headquarters, BuildingType::Storehouse, BuildingType::HarborBuilding]);
            score.push(0.2 * rate_small(nearest.unwrap_or(0), &config.distance_buckets));
        }
        _ => {}
    }

    score.push(1.0 - possible_flags_removed(world, pt) as f64 / 8.0);

    Some(score)
}

fn group_member_distance(world: &World, gid: GroupId, member_type: BuildingType, pt: Point) -> Option<u32> {
    let dims = world.dims();
    let member_id = world.group(gid)?.member_of_type(member_type)?;
    let member_pt = world.building(member_id)?.point()?;
    Some(dims.distance(pt, member_pt))
}

fn nearest_building_distance(world: &World, pt: Point, types: &[BuildingType]) -> Option<u32> {
    let dims = world.dims();
    world
        .all_buildings()
        .filter(|b| types.contains(&b.building_type))
        .filter_map(|b| b.point())
        .map(|bp| dims.distance(pt, bp))
        .min()
}

fn is_near_farmland(world: &World, pt: Point, radius: u32) -> bool {
    let dims = world.dims();
    for dy in -(radius as i32)..=(radius as i32) {
        for dx in -(radius as i32)..=(radius as i32) {
            let x = dims.wrap_x(pt.x() as i32 + dx);
            let y = dims.wrap_y(pt.y() as i32 + dy);
            let candidate = Point::new(x, y);
            if dims.distance(pt, candidate) > radius {
                continue;
            }
            if world.is_farmland(candidate) {
                return true;
            }
        }
    }
    false
}

/// Approximate count of the (up to 8) points around `pt` and its flag that
/// would stop being flag-capable once `pt` hosts a building (spec §4.4
/// "Universal penalty").
fn possible_flags_removed(world: &World, pt: Point) -> u32 {
    let dims = world.dims();
    let mut count = 0u32;
    for n in dims.neighbours(pt) {
        if world.flag_present(n) {
            count += 1;
        }
    }
    count.min(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_high_increases_with_value() {
        let buckets = [2, 4, 6];
        assert!(rate_high(10, &buckets) > rate_high(1, &buckets));
    }

    #[test]
    fn rate_small_is_complement_of_rate_high() {
        let buckets = [2, 4, 6];
        assert_eq!(rate_small(3, &buckets), 1.0 - rate_high(3, &buckets));
    }

    #[test]
    fn hypervolume_is_product() {
        assert_eq!(hypervolume(&[0.5, 0.5, 1.0]), 0.25);
    }

    #[test]
    fn hypervolume_zero_score_kills_placement() {
        assert_eq!(hypervolume(&[0.8, 0.0, 0.9]), 0.0);
    }
}
