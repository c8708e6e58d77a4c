//! navscore - scoring engine for precision navigation flight competitions
//!
//! Given a recorded GPS track, a planned route (start gate plus ordered
//! checkpoints), the pilot's pre-flight time and fuel estimates, and the
//! post-flight actuals, this library reconstructs when the aircraft
//! crossed the start gate and each checkpoint and derives a penalty score
//! from timing deviation, lateral track deviation, fuel-estimate error,
//! and missed secrets.
//!
//! The engine is a pure function of its inputs: no I/O, no persistence,
//! no shared state. Track parsing, storage, and report rendering live in
//! the hosting application.

pub mod config;
pub mod error;
pub mod geometry;
pub mod route;
pub mod scoring;
pub mod track;

pub use config::{OffCourseCurve, ScoringConfig};
pub use error::ScoreError;
pub use route::{FlightActuals, LegPlan, Route, RoutePoint};
pub use scoring::{
    CheckpointScore, CrossingMethod, CrossingResult, ScoreBreakdown, ScoringEngine,
};
pub use track::TrackPoint;
