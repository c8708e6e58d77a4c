use thiserror::Error;

/// Failures that prevent a flight from being scored at all.
///
/// Track exhaustion mid-route is deliberately NOT represented here: a
/// track that ends before the final checkpoint produces forfeited legs in
/// the breakdown, not an error. Everything in this enum means "no score".
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("track contains no points")]
    EmptyTrack,

    #[error("route contains no checkpoints")]
    NoCheckpoints,

    #[error("config field {field} must be positive and finite, got {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("leg time estimate count ({legs}) does not match checkpoint count ({checkpoints})")]
    LegCountMismatch { legs: usize, checkpoints: usize },

    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("track timestamp at index {index} precedes the previous point")]
    NonMonotonicTrack { index: usize },

    #[error("no start gate crossing found within {radius_nm} NM")]
    GateNotDetected { radius_nm: f64 },
}
