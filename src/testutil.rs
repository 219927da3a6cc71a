//! Small map/building builders shared by more than one module's test suite.
//! Most modules keep their own one-off `dims()` helper since the teacher's
//! own `layers/*.rs` tests do the same; this only collects the handful of
//! setup steps repeated across several files (an all-buildable map, a
//! finished building at a point).

use crate::building::{BuildingId, BuildingQuality, BuildingState, BuildingType};
use crate::engine::FakeEngine;
use crate::hex::{GridDims, Point};
use crate::world::World;

pub fn standard_dims() -> GridDims {
    GridDims::new(24, 22)
}

/// A `FakeEngine` over `standard_dims()` with every point set to `House`
/// quality, suitable for tests that place buildings without caring about
/// terrain variety.
pub fn buildable_engine() -> FakeEngine {
    let dims = standard_dims();
    let mut engine = FakeEngine::new(dims);
    for pt in dims.iter_points() {
        engine.set_terrain_bq(pt, BuildingQuality::House);
    }
    engine
}

/// Creates, constructs, and immediately finishes a building of `building_type`
/// at `pt`, returning its id.
pub fn finished_building(world: &mut World, building_type: BuildingType, pt: Point) -> BuildingId {
    let id = world.create(building_type, BuildingState::PlanningRequest, None, pt);
    world.construct(id, pt).expect("construct should succeed on an empty point");
    world.building_mut(id).unwrap().state = BuildingState::Finished;
    id
}
