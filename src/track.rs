//! Track input model
//!
//! The engine receives an already-parsed, time-ordered sequence of GPS
//! samples. File-format handling (GPX, IGC, ...) is upstream's job; the
//! only validation repeated here is what every downstream computation
//! assumes: finite in-range coordinates and non-decreasing timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// One GPS sample of a flight's recorded track. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: Option<f64>,
    /// Instantaneous ground speed in meters per second, when the source
    /// recorded one
    pub ground_speed_mps: Option<f64>,
}

impl TrackPoint {
    pub fn new(time: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            time,
            latitude,
            longitude,
            elevation_m: None,
            ground_speed_mps: None,
        }
    }

    pub fn with_speed(mut self, ground_speed_mps: f64) -> Self {
        self.ground_speed_mps = Some(ground_speed_mps);
        self
    }
}

pub(crate) fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), ScoreError> {
    let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
    let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(ScoreError::InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

/// Reject tracks the geometric pipeline cannot safely consume. Duplicate
/// timestamps are tolerated; regressions are not.
pub(crate) fn validate_track(track: &[TrackPoint]) -> Result<(), ScoreError> {
    if track.is_empty() {
        return Err(ScoreError::EmptyTrack);
    }
    for (index, point) in track.iter().enumerate() {
        validate_coordinate(point.latitude, point.longitude)?;
        if index > 0 && point.time < track[index - 1].time {
            return Err(ScoreError::NonMonotonicTrack { index });
        }
    }
    Ok(())
}
