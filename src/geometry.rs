//! Geodesy primitives shared by the gate and checkpoint detectors.
//!
//! All distances are great-circle (haversine) and reported in nautical
//! miles; all bearings are true degrees in [0, 360).

use chrono::{DateTime, Utc};

/// Nautical miles to meters conversion factor
pub const NM_TO_METERS: f64 = 1852.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in nautical miles
pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c / NM_TO_METERS
}

/// Initial bearing from point 1 to point 2 along the great circle,
/// in true degrees [0, 360)
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let x = delta_lon.sin() * lat2_rad.cos();
    let y = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Calculate the angular difference between two headings in degrees
/// Returns the smallest angle between the two headings (0-180 degrees)
pub fn angular_difference(angle1: f64, angle2: f64) -> f64 {
    let diff = (angle1 - angle2).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Normalize a heading difference into the signed range (-180, 180]
fn signed_angle(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a > 180.0 {
        a - 360.0
    } else if a <= -180.0 {
        a + 360.0
    } else {
        a
    }
}

/// Signed distance in nautical miles from a point to the plane through
/// `center` perpendicular to `course_bearing`.
///
/// Positive when the point lies ahead of the plane along the course
/// direction, negative when it lies behind. A point exactly on the
/// perpendicular line (or at the center itself) yields 0.
pub fn along_course_offset_nm(
    lat: f64,
    lon: f64,
    center_lat: f64,
    center_lon: f64,
    course_bearing: f64,
) -> f64 {
    let distance = haversine_distance_nm(center_lat, center_lon, lat, lon);
    if distance == 0.0 {
        return 0.0;
    }
    let bearing_to_point = initial_bearing(center_lat, center_lon, lat, lon);
    let relative = signed_angle(bearing_to_point - course_bearing);
    distance * relative.to_radians().cos()
}

/// Which side of the perpendicular plane a point falls on: +1 ahead of
/// the plane along `course_bearing`, -1 behind it.
///
/// A crossing shows up as a sign change between two consecutive track
/// samples.
pub fn side_of_plane(
    lat: f64,
    lon: f64,
    center_lat: f64,
    center_lon: f64,
    course_bearing: f64,
) -> i8 {
    if along_course_offset_nm(lat, lon, center_lat, center_lon, course_bearing) >= 0.0 {
        1
    } else {
        -1
    }
}

/// Linearly interpolate between two positions sampled at two instants.
///
/// Linear lat/lon interpolation is not geodesic-exact but is adequate at
/// the sub-nautical-mile spacing of consecutive GPS samples. Returns the
/// interpolated (latitude, longitude, timestamp).
pub fn interpolate(
    lat1: f64,
    lon1: f64,
    time1: DateTime<Utc>,
    lat2: f64,
    lon2: f64,
    time2: DateTime<Utc>,
    fraction: f64,
) -> (f64, f64, DateTime<Utc>) {
    let lat = lat1 + fraction * (lat2 - lat1);
    let lon = lon1 + fraction * (lon2 - lon1);
    let span_ms = time2.signed_duration_since(time1).num_milliseconds() as f64;
    let time = time1 + chrono::Duration::milliseconds((fraction * span_ms).round() as i64);
    (lat, lon, time)
}
