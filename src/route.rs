//! Route and flight-plan input model

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::track::validate_coordinate;

/// A start gate or checkpoint: a named geographic center with a nominal
/// capture radius. Sequence position is the point's index in the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Nominal capture radius in nautical miles
    pub radius_nm: f64,
}

impl RoutePoint {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, radius_nm: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            radius_nm,
        }
    }
}

/// The planned course: the start gate plus checkpoints in flying order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub start_gate: RoutePoint,
    pub checkpoints: Vec<RoutePoint>,
}

/// The pilot's pre-flight time estimates, one per leg plus a separately
/// estimated total. The total is the pilot's own arithmetic, not the sum
/// of the legs; a total that disagrees with the legs is scored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegPlan {
    /// Estimated elapsed seconds for each leg, gate to first checkpoint
    /// onward. Must have one entry per checkpoint.
    pub leg_times_sec: Vec<f64>,
    pub total_time_sec: f64,
}

/// Post-flight self-reported figures that score independently of the
/// GPS track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightActuals {
    pub fuel_estimate_gal: f64,
    pub fuel_actual_gal: f64,
    pub secrets_missed_checkpoint: u32,
    pub secrets_missed_enroute: u32,
}

pub(crate) fn validate_route(route: &Route, plan: &LegPlan) -> Result<(), ScoreError> {
    if route.checkpoints.is_empty() {
        return Err(ScoreError::NoCheckpoints);
    }
    validate_coordinate(route.start_gate.latitude, route.start_gate.longitude)?;
    for checkpoint in &route.checkpoints {
        validate_coordinate(checkpoint.latitude, checkpoint.longitude)?;
    }
    if plan.leg_times_sec.len() != route.checkpoints.len() {
        return Err(ScoreError::LegCountMismatch {
            legs: plan.leg_times_sec.len(),
            checkpoints: route.checkpoints.len(),
        });
    }
    Ok(())
}
