//! Scoring configuration
//!
//! Every rate, threshold, and curve the engine applies lives here and is
//! threaded explicitly through each call. Nothing is read from the
//! environment or from globals, so tests can score against arbitrary
//! literal configs.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Shape of the off-course penalty ramp between the tolerance distance
/// and the maximum distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum OffCourseCurve {
    /// Continuous linear interpolation from min to max penalty
    Linear,
    /// The same ramp quantized into `steps` equal increments, rounding up
    Stepped { steps: u32 },
}

/// All scoring rules as plain data.
///
/// Defaults follow the competition rulebook values. Every field is
/// `serde(default)` so a stored config may specify only the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Deviation at or under this distance scores zero off-course penalty
    pub off_course_tolerance_nm: f64,
    /// Deviation at or beyond this distance scores the full penalty
    pub off_course_max_nm: f64,
    /// Penalty at the tolerance edge
    pub off_course_min_penalty: f64,
    /// Penalty at and beyond the maximum distance
    pub off_course_max_penalty: f64,
    pub off_course_curve: OffCourseCurve,

    /// Points per second of leg or total-time deviation
    pub timing_penalty_rate_per_sec: f64,
    /// Fixed penalty for a leg whose crossing was never detected
    pub leg_forfeit_penalty: f64,

    /// Points per gallon of fuel-estimate error, either direction
    pub fuel_penalty_rate: f64,

    /// Points per missed checkpoint secret
    pub checkpoint_secret_penalty: f64,
    /// Points per missed enroute secret
    pub enroute_secret_penalty: f64,

    /// Minimum ground speed for a gate-crossing candidate (filters taxi)
    pub gate_speed_threshold_mps: f64,
    pub gate_initial_radius_nm: f64,
    pub gate_max_radius_nm: f64,
    pub gate_radius_step_nm: f64,
    /// Fraction of the track's elapsed time searched for the gate crossing
    pub gate_search_fraction: f64,
}

impl ScoringConfig {
    /// Reject values that would break the detectors' termination or
    /// windowing guarantees. Sparse stored configs make every field
    /// reachable from external data, so the engine re-checks the ones it
    /// iterates on.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if !(self.gate_radius_step_nm.is_finite() && self.gate_radius_step_nm > 0.0) {
            return Err(ScoreError::InvalidConfig {
                field: "gate_radius_step_nm",
                value: self.gate_radius_step_nm,
            });
        }
        if !(self.gate_search_fraction.is_finite() && self.gate_search_fraction > 0.0) {
            return Err(ScoreError::InvalidConfig {
                field: "gate_search_fraction",
                value: self.gate_search_fraction,
            });
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            off_course_tolerance_nm: 0.25,
            off_course_max_nm: 5.0,
            off_course_min_penalty: 100.0,
            off_course_max_penalty: 600.0,
            off_course_curve: OffCourseCurve::Linear,
            timing_penalty_rate_per_sec: 1.0,
            leg_forfeit_penalty: 600.0,
            fuel_penalty_rate: 50.0,
            checkpoint_secret_penalty: 20.0,
            enroute_secret_penalty: 10.0,
            gate_speed_threshold_mps: 5.0,
            gate_initial_radius_nm: 0.02,
            gate_max_radius_nm: 0.10,
            gate_radius_step_nm: 0.01,
            gate_search_fraction: 0.5,
        }
    }
}
