//! Penalty arithmetic
//!
//! Pure functions from measured deviations to point penalties. Every rate
//! and threshold comes from the `ScoringConfig` passed in; none of these
//! touch state, so each rule is unit-testable with a literal config.

use crate::config::{OffCourseCurve, ScoringConfig};

/// Timing penalty for one leg or for the total-time estimate: points per
/// second of deviation in either direction.
pub fn timing_penalty(actual_sec: f64, estimated_sec: f64, config: &ScoringConfig) -> f64 {
    (actual_sec - estimated_sec).abs() * config.timing_penalty_rate_per_sec
}

/// Off-course penalty for a checkpoint's lateral deviation.
///
/// Zero at or under the tolerance; beyond it the penalty ramps from the
/// configured minimum to the configured maximum over the span between
/// tolerance and max distance, then saturates. The ramp's shape (linear
/// or stepped) is a rulebook decision carried as config.
pub fn off_course_penalty(deviation_nm: f64, config: &ScoringConfig) -> f64 {
    if deviation_nm <= config.off_course_tolerance_nm {
        return 0.0;
    }
    let span = config.off_course_max_nm - config.off_course_tolerance_nm;
    if span <= 0.0 {
        return config.off_course_max_penalty;
    }
    let fraction = ((deviation_nm - config.off_course_tolerance_nm) / span).min(1.0);
    let fraction = match config.off_course_curve {
        OffCourseCurve::Linear => fraction,
        OffCourseCurve::Stepped { steps } if steps > 0 => {
            (fraction * steps as f64).ceil() / steps as f64
        }
        // Zero steps degenerates to the linear ramp
        OffCourseCurve::Stepped { .. } => fraction,
    };
    config.off_course_min_penalty
        + fraction * (config.off_course_max_penalty - config.off_course_min_penalty)
}

/// Fuel-estimate penalty: points per gallon of error, symmetric in sign.
/// Over- and under-estimating both score against the pilot.
pub fn fuel_penalty(estimated_gal: f64, actual_gal: f64, config: &ScoringConfig) -> f64 {
    (actual_gal - estimated_gal).abs() * config.fuel_penalty_rate
}

/// Secrets penalties from reported miss counts, geometry-free. Returns
/// (checkpoint secrets penalty, enroute secrets penalty).
pub fn secrets_penalty(
    missed_checkpoint: u32,
    missed_enroute: u32,
    config: &ScoringConfig,
) -> (f64, f64) {
    (
        missed_checkpoint as f64 * config.checkpoint_secret_penalty,
        missed_enroute as f64 * config.enroute_secret_penalty,
    )
}
