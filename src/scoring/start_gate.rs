//! Start gate detection
//!
//! The gate crossing anchors time-zero for every leg, so detection is
//! deliberately conservative: a wrong match corrupts the whole score,
//! while a miss only invalidates the flight.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::geometry::haversine_distance_nm;
use crate::route::RoutePoint;
use crate::track::TrackPoint;

/// A detected gate crossing: the qualifying sample plus its distance to
/// the gate center.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCrossing {
    /// Index of the qualifying point in the full track
    pub index: usize,
    pub time: DateTime<Utc>,
    pub distance_nm: f64,
}

/// Find the gate crossing in the early portion of the track.
///
/// Search policy, fixed by design:
/// - Only points within the first `gate_search_fraction` of the track's
///   elapsed time are considered (the gate crossing is a takeoff event).
/// - The capture radius starts at `gate_initial_radius_nm` and relaxes
///   outward in `gate_radius_step_nm` increments up to
///   `gate_max_radius_nm`, tolerating GPS noise near the gate without
///   over-matching on the first pass.
/// - A candidate must also carry a recorded ground speed of at least
///   `gate_speed_threshold_mps`, so taxi movement past the gate does not
///   register as the takeoff crossing. Points without a speed sample
///   never qualify.
/// - Among qualifying points at a given radius, the first in
///   chronological order wins.
///
/// Returns `ScoreError::GateNotDetected` when no point qualifies at any
/// radius. Callers must treat that as an unscorable flight; substituting
/// the track's start time would silently corrupt every leg time.
pub(crate) fn detect_gate_crossing(
    track: &[TrackPoint],
    gate: &RoutePoint,
    config: &ScoringConfig,
) -> Result<GateCrossing, ScoreError> {
    let first_time = track[0].time;
    let last_time = track[track.len() - 1].time;
    let elapsed_ms = last_time.signed_duration_since(first_time).num_milliseconds() as f64;
    let search_limit = first_time
        + chrono::Duration::milliseconds((elapsed_ms * config.gate_search_fraction) as i64);

    let mut radius_nm = config.gate_initial_radius_nm;
    while radius_nm <= config.gate_max_radius_nm + f64::EPSILON {
        for (index, point) in track.iter().enumerate() {
            if point.time > search_limit {
                break;
            }
            let speed_ok = point
                .ground_speed_mps
                .is_some_and(|speed| speed >= config.gate_speed_threshold_mps);
            if !speed_ok {
                continue;
            }
            let distance_nm = haversine_distance_nm(
                point.latitude,
                point.longitude,
                gate.latitude,
                gate.longitude,
            );
            if distance_nm <= radius_nm {
                info!(
                    "Start gate crossing detected at {} ({:.3} NM from gate, threshold {:.3} NM)",
                    point.time, distance_nm, radius_nm
                );
                return Ok(GateCrossing {
                    index,
                    time: point.time,
                    distance_nm,
                });
            }
        }
        debug!(
            "No gate crossing within {:.3} NM, relaxing threshold",
            radius_nm
        );
        radius_nm += config.gate_radius_step_nm;
    }

    warn!(
        "No start gate crossing found within {:.2} NM of gate '{}'",
        config.gate_max_radius_nm, gate.name
    );
    Err(ScoreError::GateNotDetected {
        radius_nm: config.gate_max_radius_nm,
    })
}
