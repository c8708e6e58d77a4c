//! Checkpoint crossing detection
//!
//! For each checkpoint, in route order, the detector works out when the
//! aircraft passed it and how far off the nominal center it was. Three
//! strategies run as a fixed cascade, first success wins:
//!
//! 1. Perpendicular-plane crossing (CTP): a sign change of consecutive
//!    samples across the line through the checkpoint perpendicular to the
//!    leg bearing, with the exact instant interpolated between the two
//!    samples.
//! 2. Radius entry: the first sample inside the checkpoint's capture
//!    radius after the plane was crossed.
//! 3. Closest point of approach (PCA): the minimum-distance sample over
//!    the remaining track. Needs no threshold, so it always succeeds when
//!    any track remains.
//!
//! The cascade is closed by design; the three strategies are not a plugin
//! surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::geometry::{along_course_offset_nm, haversine_distance_nm, initial_bearing, interpolate};
use crate::route::RoutePoint;
use crate::track::TrackPoint;

/// Which strategy resolved a checkpoint crossing. Serialized with the
/// competition's names so reports read the way judges expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossingMethod {
    #[serde(rename = "CTP")]
    PlaneCrossing,
    #[serde(rename = "Radius Entry")]
    RadiusEntry,
    #[serde(rename = "PCA")]
    ClosestApproach,
}

/// A resolved checkpoint crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingResult {
    pub time: DateTime<Utc>,
    /// Lateral miss-distance from the checkpoint center in nautical miles
    pub distance_nm: f64,
    pub method: CrossingMethod,
    /// Whether the deviation is within the configured on-course tolerance
    pub within_tolerance: bool,
}

/// Where the next checkpoint's search window begins, carried between
/// cascade invocations so crossings stay monotonic in time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchWindow {
    /// Index of the first track point eligible for the next search
    pub start_index: usize,
    /// Crossings must resolve strictly after this instant
    pub after: DateTime<Utc>,
}

/// Run the strategy cascade for one checkpoint over the remaining track.
///
/// `previous` is the route point flown from (the gate for the first leg);
/// the leg bearing used for the perpendicular plane is the bearing from
/// it to this checkpoint. Returns `None` only when the window holds no
/// track points, which callers score as a forfeited leg.
pub(crate) fn find_checkpoint_crossing(
    track: &[TrackPoint],
    window: SearchWindow,
    checkpoint: &RoutePoint,
    previous: &RoutePoint,
    config: &ScoringConfig,
) -> Option<(CrossingResult, SearchWindow)> {
    let remaining = &track[window.start_index.min(track.len())..];
    if remaining.is_empty() {
        return None;
    }

    let leg_bearing = initial_bearing(
        previous.latitude,
        previous.longitude,
        checkpoint.latitude,
        checkpoint.longitude,
    );

    // Step 1: perpendicular-plane crossing. Also remember the first
    // plane-crossing instant even when the crossing misses the radius;
    // step 2 only considers samples after the plane was reached.
    let mut first_plane_time: Option<DateTime<Utc>> = None;
    for (j, pair) in remaining.windows(2).enumerate() {
        let (p1, p2) = (&pair[0], &pair[1]);
        let offset1 = along_course_offset_nm(
            p1.latitude,
            p1.longitude,
            checkpoint.latitude,
            checkpoint.longitude,
            leg_bearing,
        );
        let offset2 = along_course_offset_nm(
            p2.latitude,
            p2.longitude,
            checkpoint.latitude,
            checkpoint.longitude,
            leg_bearing,
        );
        if offset1.signum() == offset2.signum() {
            continue;
        }

        let span = offset1.abs() + offset2.abs();
        let fraction = if span < 1e-12 {
            0.5
        } else {
            offset1.abs() / span
        };
        let (lat, lon, time) = interpolate(
            p1.latitude,
            p1.longitude,
            p1.time,
            p2.latitude,
            p2.longitude,
            p2.time,
            fraction,
        );
        if time <= window.after {
            continue;
        }
        if first_plane_time.is_none() {
            first_plane_time = Some(time);
        }

        let distance_nm =
            haversine_distance_nm(lat, lon, checkpoint.latitude, checkpoint.longitude);
        if distance_nm <= checkpoint.radius_nm && p1.time <= time && time <= p2.time {
            debug!(
                "Checkpoint '{}' crossed via CTP at {} ({:.3} NM off center)",
                checkpoint.name, time, distance_nm
            );
            return Some((
                CrossingResult {
                    time,
                    distance_nm,
                    method: CrossingMethod::PlaneCrossing,
                    within_tolerance: distance_nm <= config.off_course_tolerance_nm,
                },
                SearchWindow {
                    // The second bracketing sample stays eligible; its
                    // timestamp is at or after the interpolated instant
                    start_index: window.start_index + j + 1,
                    after: time,
                },
            ));
        }
    }

    // Step 2: radius entry, only on the far side of the plane
    if let Some(plane_time) = first_plane_time {
        for (j, point) in remaining.iter().enumerate() {
            if point.time <= plane_time {
                continue;
            }
            let distance_nm = haversine_distance_nm(
                point.latitude,
                point.longitude,
                checkpoint.latitude,
                checkpoint.longitude,
            );
            if distance_nm <= checkpoint.radius_nm {
                debug!(
                    "Checkpoint '{}' captured via radius entry at {} ({:.3} NM off center)",
                    checkpoint.name, point.time, distance_nm
                );
                return Some((
                    CrossingResult {
                        time: point.time,
                        distance_nm,
                        method: CrossingMethod::RadiusEntry,
                        within_tolerance: distance_nm <= config.off_course_tolerance_nm,
                    },
                    SearchWindow {
                        start_index: window.start_index + j + 1,
                        after: point.time,
                    },
                ));
            }
        }
    }

    // Step 3: closest point of approach over the whole remaining window
    let (j, closest, distance_nm) = remaining
        .iter()
        .enumerate()
        .map(|(j, point)| {
            let distance = haversine_distance_nm(
                point.latitude,
                point.longitude,
                checkpoint.latitude,
                checkpoint.longitude,
            );
            (j, point, distance)
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))?;

    debug!(
        "Checkpoint '{}' resolved via PCA at {} ({:.3} NM off center)",
        checkpoint.name, closest.time, distance_nm
    );
    Some((
        CrossingResult {
            time: closest.time,
            distance_nm,
            method: CrossingMethod::ClosestApproach,
            within_tolerance: distance_nm <= config.off_course_tolerance_nm,
        },
        SearchWindow {
            start_index: window.start_index + j + 1,
            after: closest.time,
        },
    ))
}
