//! Local, non-propagating error types (spec §7).
//!
//! Every variant here is handled at the point it is produced; per spec §7
//! nothing escapes `Agent::tick`. These exist so internal inconsistencies
//! are named and logged rather than silently ignored, matching the spec's
//! "release: correct by forcing a rebuild" policy.

use crate::hex::Point;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("point {0:?} has no assigned road-network id")]
    NotConnected(Point),

    #[error("no flag present at {0:?}")]
    NoFlagAt(Point),

    #[error("build-location enumerator was queried before Calculate() ran")]
    EnumeratorNotCalculated,

    #[error("no legal placement found for building type {0:?}")]
    NoPositionFound(crate::building::BuildingType),

    #[error("road routing from {from:?} to {to:?} failed")]
    RoutingFailed { from: Point, to: Point },

    #[error("attempted to construct building already in state {0:?}")]
    InvalidBuildingState(crate::building::BuildingState),
}
