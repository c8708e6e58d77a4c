//! Flight scoring engine
//!
//! One call scores one flight: the recorded track is anchored at the
//! detected start gate crossing, each checkpoint is resolved in route
//! order over the not-yet-consumed remainder of the track, and the
//! measured deviations are turned into penalties and summed. The engine
//! is synchronous, stateless between calls, and allocates its output
//! fresh; inputs are never mutated.

mod checkpoint;
pub mod penalties;
mod start_gate;

pub use checkpoint::{CrossingMethod, CrossingResult};
pub use start_gate::GateCrossing;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::route::{FlightActuals, LegPlan, Route, validate_route};
use crate::track::{TrackPoint, validate_track};
use checkpoint::SearchWindow;
use penalties::{fuel_penalty, off_course_penalty, secrets_penalty, timing_penalty};

/// Per-checkpoint scoring detail, in route order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointScore {
    pub name: String,
    /// `None` when the track ended before this checkpoint could resolve
    pub crossing: Option<CrossingResult>,
    pub estimated_time_sec: f64,
    pub actual_time_sec: Option<f64>,
    /// Signed actual minus estimated leg seconds
    pub deviation_sec: Option<f64>,
    pub timing_penalty: f64,
    pub off_course_penalty: f64,
    pub forfeited: bool,
}

/// The engine's only output: every penalty category plus the figures it
/// was computed from, ready for the reporting layer without further
/// arithmetic. All penalty fields are non-negative deductions; `total` is
/// their plain sum (lower is better). Presentation decides whether to
/// display a baseline minus this total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub gate_crossing_time: DateTime<Utc>,
    pub checkpoints: Vec<CheckpointScore>,
    pub planned_total_time_sec: f64,
    /// `None` when the final checkpoint was forfeited
    pub actual_total_time_sec: Option<f64>,
    pub total_time_penalty: f64,
    pub fuel_estimate_gal: f64,
    pub fuel_actual_gal: f64,
    pub fuel_penalty: f64,
    pub secrets_missed_checkpoint: u32,
    pub secrets_missed_enroute: u32,
    pub checkpoint_secrets_penalty: f64,
    pub enroute_secrets_penalty: f64,
    pub total_penalty: f64,
}

/// Scores flights against a route under one immutable rule set.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one flight's track against the planned route.
    ///
    /// Fails only for inputs that make the flight unscorable: a malformed
    /// track or plan, or a start gate that never matched. A track that
    /// runs out mid-route is a legitimate scoring outcome; the exhausted
    /// legs come back forfeited at the configured maximum penalties and
    /// the breakdown is still produced.
    pub fn score(
        &self,
        track: &[TrackPoint],
        route: &Route,
        plan: &LegPlan,
        actuals: &FlightActuals,
    ) -> Result<ScoreBreakdown, ScoreError> {
        self.config.validate()?;
        validate_track(track)?;
        validate_route(route, plan)?;

        let gate = start_gate::detect_gate_crossing(track, &route.start_gate, &self.config)?;
        debug!(
            "Scoring {} checkpoints from gate crossing at {}",
            route.checkpoints.len(),
            gate.time
        );

        let mut window = SearchWindow {
            start_index: gate.index + 1,
            after: gate.time,
        };
        let mut previous_point = &route.start_gate;
        let mut previous_time = gate.time;

        let mut checkpoints = Vec::with_capacity(route.checkpoints.len());
        for (leg, cp) in route.checkpoints.iter().enumerate() {
            let estimated = plan.leg_times_sec[leg];
            match checkpoint::find_checkpoint_crossing(
                track,
                window,
                cp,
                previous_point,
                &self.config,
            ) {
                Some((crossing, next_window)) => {
                    let actual = crossing
                        .time
                        .signed_duration_since(previous_time)
                        .num_milliseconds() as f64
                        / 1000.0;
                    checkpoints.push(CheckpointScore {
                        name: cp.name.clone(),
                        estimated_time_sec: estimated,
                        actual_time_sec: Some(actual),
                        deviation_sec: Some(actual - estimated),
                        timing_penalty: timing_penalty(actual, estimated, &self.config),
                        off_course_penalty: off_course_penalty(crossing.distance_nm, &self.config),
                        crossing: Some(crossing.clone()),
                        forfeited: false,
                    });
                    previous_time = crossing.time;
                    window = next_window;
                }
                None => {
                    // Track exhausted: this leg and every later one
                    // forfeit at the maximum penalties
                    warn!(
                        "Track exhausted before checkpoint '{}'; forfeiting leg {}",
                        cp.name,
                        leg + 1
                    );
                    checkpoints.push(CheckpointScore {
                        name: cp.name.clone(),
                        crossing: None,
                        estimated_time_sec: estimated,
                        actual_time_sec: None,
                        deviation_sec: None,
                        timing_penalty: self.config.leg_forfeit_penalty,
                        off_course_penalty: self.config.off_course_max_penalty,
                        forfeited: true,
                    });
                }
            }
            previous_point = cp;
        }

        // Total time runs gate to final checkpoint; without a detected
        // final crossing there is no actual total and the estimate
        // forfeits like a leg
        let final_crossing_time = checkpoints
            .last()
            .and_then(|score| score.crossing.as_ref())
            .map(|crossing| crossing.time);
        let (actual_total, total_time_penalty) = match final_crossing_time {
            Some(time) => {
                let actual =
                    time.signed_duration_since(gate.time).num_milliseconds() as f64 / 1000.0;
                (
                    Some(actual),
                    timing_penalty(actual, plan.total_time_sec, &self.config),
                )
            }
            None => (None, self.config.leg_forfeit_penalty),
        };

        let fuel = fuel_penalty(actuals.fuel_estimate_gal, actuals.fuel_actual_gal, &self.config);
        let (checkpoint_secrets, enroute_secrets) = secrets_penalty(
            actuals.secrets_missed_checkpoint,
            actuals.secrets_missed_enroute,
            &self.config,
        );

        let total_penalty = checkpoints
            .iter()
            .map(|score| score.timing_penalty + score.off_course_penalty)
            .sum::<f64>()
            + total_time_penalty
            + fuel
            + checkpoint_secrets
            + enroute_secrets;

        info!(
            "Flight scored: {:.1} penalty points over {} checkpoints ({} forfeited)",
            total_penalty,
            checkpoints.len(),
            checkpoints.iter().filter(|score| score.forfeited).count()
        );

        Ok(ScoreBreakdown {
            gate_crossing_time: gate.time,
            checkpoints,
            planned_total_time_sec: plan.total_time_sec,
            actual_total_time_sec: actual_total,
            total_time_penalty,
            fuel_estimate_gal: actuals.fuel_estimate_gal,
            fuel_actual_gal: actuals.fuel_actual_gal,
            fuel_penalty: fuel,
            secrets_missed_checkpoint: actuals.secrets_missed_checkpoint,
            secrets_missed_enroute: actuals.secrets_missed_enroute,
            checkpoint_secrets_penalty: checkpoint_secrets,
            enroute_secrets_penalty: enroute_secrets,
            total_penalty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RoutePoint;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap()
    }

    fn point_at(offset_sec: i64, lat: f64, lon: f64, speed: Option<f64>) -> TrackPoint {
        TrackPoint {
            time: base_time() + chrono::Duration::seconds(offset_sec),
            latitude: lat,
            longitude: lon,
            elevation_m: None,
            ground_speed_mps: speed,
        }
    }

    fn two_checkpoint_route() -> Route {
        Route {
            start_gate: RoutePoint::new("Gate", 38.0, -89.0, 0.02),
            checkpoints: vec![
                RoutePoint::new("CP1", 38.1, -89.0, 0.25),
                RoutePoint::new("CP2", 38.2, -89.0, 0.25),
            ],
        }
    }

    fn actuals() -> FlightActuals {
        FlightActuals {
            fuel_estimate_gal: 15.0,
            fuel_actual_gal: 15.0,
            secrets_missed_checkpoint: 0,
            secrets_missed_enroute: 0,
        }
    }

    /// Northbound flight crossing the gate at t=100 and both checkpoint
    /// planes cleanly.
    fn clean_track() -> Vec<TrackPoint> {
        vec![
            point_at(0, 37.995, -89.0, Some(2.0)),
            point_at(100, 38.0, -89.0, Some(30.0)),
            point_at(250, 38.05, -89.0, Some(40.0)),
            point_at(395, 38.098, -89.0, Some(40.0)),
            point_at(405, 38.102, -89.0, Some(40.0)),
            point_at(600, 38.15, -89.0, Some(40.0)),
            point_at(795, 38.198, -89.0, Some(40.0)),
            point_at(805, 38.202, -89.0, Some(40.0)),
            point_at(900, 38.25, -89.0, Some(40.0)),
        ]
    }

    fn plan() -> LegPlan {
        LegPlan {
            leg_times_sec: vec![300.0, 400.0],
            total_time_sec: 700.0,
        }
    }

    #[test]
    fn test_clean_flight_scores_all_checkpoints() {
        let engine = ScoringEngine::new(ScoringConfig::default());
        let breakdown = engine
            .score(&clean_track(), &two_checkpoint_route(), &plan(), &actuals())
            .unwrap();

        assert_eq!(breakdown.gate_crossing_time, base_time() + chrono::Duration::seconds(100));
        assert_eq!(breakdown.checkpoints.len(), 2);
        assert!(breakdown.checkpoints.iter().all(|score| !score.forfeited));
        assert!(
            breakdown
                .checkpoints
                .iter()
                .all(|score| score.crossing.as_ref().unwrap().method
                    == CrossingMethod::PlaneCrossing)
        );
        // Crossings are monotonic in time
        let t1 = breakdown.checkpoints[0].crossing.as_ref().unwrap().time;
        let t2 = breakdown.checkpoints[1].crossing.as_ref().unwrap().time;
        assert!(t1 < t2);
        // Both legs ran ~300s and ~400s against estimates of the same,
        // so timing penalties are small
        assert!(breakdown.checkpoints[0].timing_penalty < 10.0);
        assert!(breakdown.checkpoints[1].timing_penalty < 10.0);
        assert_eq!(breakdown.fuel_penalty, 0.0);
        assert_eq!(breakdown.checkpoint_secrets_penalty, 0.0);
    }

    #[test]
    fn test_idempotent_scoring() {
        let engine = ScoringEngine::new(ScoringConfig::default());
        let track = clean_track();
        let route = two_checkpoint_route();
        let first = engine.score(&track, &route, &plan(), &actuals()).unwrap();
        let second = engine.score(&track, &route, &plan(), &actuals()).unwrap();
        assert_eq!(first, second);
        // Byte-identical serialized form as well
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_gate_failure_aborts_scoring() {
        // Track never comes near the gate
        let track = vec![
            point_at(0, 38.5, -89.0, Some(40.0)),
            point_at(500, 38.6, -89.0, Some(40.0)),
        ];
        let engine = ScoringEngine::new(ScoringConfig::default());
        let result = engine.score(&track, &two_checkpoint_route(), &plan(), &actuals());
        assert!(matches!(result, Err(ScoreError::GateNotDetected { .. })));
    }

    #[test]
    fn test_track_exhaustion_forfeits_remaining_legs() {
        // Track ends well short of CP1: the first leg resolves via PCA at
        // the final sample, which consumes the track and leaves nothing
        // for CP2
        let track = vec![
            point_at(0, 37.995, -89.0, Some(2.0)),
            point_at(100, 38.0, -89.0, Some(30.0)),
            point_at(250, 38.05, -89.0, Some(40.0)),
            point_at(300, 38.07, -89.0, Some(40.0)),
        ];
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(config.clone());
        let breakdown = engine
            .score(&track, &two_checkpoint_route(), &plan(), &actuals())
            .unwrap();

        // First leg still scores, via the closest-approach fallback
        assert!(!breakdown.checkpoints[0].forfeited);
        let crossing = breakdown.checkpoints[0].crossing.as_ref().unwrap();
        assert_eq!(crossing.method, CrossingMethod::ClosestApproach);
        // Second leg forfeited at maximum penalties
        assert!(breakdown.checkpoints[1].forfeited);
        assert!(breakdown.checkpoints[1].crossing.is_none());
        assert_eq!(
            breakdown.checkpoints[1].timing_penalty,
            config.leg_forfeit_penalty
        );
        assert_eq!(
            breakdown.checkpoints[1].off_course_penalty,
            config.off_course_max_penalty
        );
        // No actual total without a final crossing
        assert_eq!(breakdown.actual_total_time_sec, None);
        assert_eq!(breakdown.total_time_penalty, config.leg_forfeit_penalty);
    }

    #[test]
    fn test_total_time_independent_of_leg_sum() {
        // Pilot's stated total disagrees with the leg estimates; the
        // total-time penalty is measured against the stated total
        let engine = ScoringEngine::new(ScoringConfig::default());
        let bad_total = LegPlan {
            leg_times_sec: vec![300.0, 400.0],
            total_time_sec: 760.0, // legs sum to 700
        };
        let breakdown = engine
            .score(&clean_track(), &two_checkpoint_route(), &bad_total, &actuals())
            .unwrap();
        let actual_total = breakdown.actual_total_time_sec.unwrap();
        // Actual total is ~700s; deviation against the stated 760
        assert!(
            (breakdown.total_time_penalty - (actual_total - 760.0).abs()).abs() < 1e-6
        );
        assert!(breakdown.total_time_penalty > 50.0);
    }

    #[test]
    fn test_fuel_and_secrets_flow_into_total() {
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(config.clone());
        let actuals = FlightActuals {
            fuel_estimate_gal: 15.0,
            fuel_actual_gal: 16.2,
            secrets_missed_checkpoint: 1,
            secrets_missed_enroute: 2,
        };
        let breakdown = engine
            .score(&clean_track(), &two_checkpoint_route(), &plan(), &actuals)
            .unwrap();
        assert!((breakdown.fuel_penalty - 1.2 * config.fuel_penalty_rate).abs() < 1e-9);
        assert_eq!(
            breakdown.checkpoint_secrets_penalty,
            config.checkpoint_secret_penalty
        );
        assert_eq!(
            breakdown.enroute_secrets_penalty,
            2.0 * config.enroute_secret_penalty
        );

        let expected_total = breakdown
            .checkpoints
            .iter()
            .map(|score| score.timing_penalty + score.off_course_penalty)
            .sum::<f64>()
            + breakdown.total_time_penalty
            + breakdown.fuel_penalty
            + breakdown.checkpoint_secrets_penalty
            + breakdown.enroute_secrets_penalty;
        assert!((breakdown.total_penalty - expected_total).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gate_step_rejected_not_looped() {
        // A sparse stored config can zero out the relaxation step; the
        // engine must reject it up front rather than relax the gate
        // radius forever when no point qualifies
        let track = vec![
            point_at(0, 38.5, -89.0, Some(40.0)),
            point_at(500, 38.6, -89.0, Some(40.0)),
        ];
        let config = ScoringConfig {
            gate_radius_step_nm: 0.0,
            ..ScoringConfig::default()
        };
        let engine = ScoringEngine::new(config);
        let result = engine.score(&track, &two_checkpoint_route(), &plan(), &actuals());
        assert_eq!(
            result,
            Err(ScoreError::InvalidConfig {
                field: "gate_radius_step_nm",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_malformed_plan_rejected_before_geometry() {
        let engine = ScoringEngine::new(ScoringConfig::default());
        let short_plan = LegPlan {
            leg_times_sec: vec![300.0],
            total_time_sec: 300.0,
        };
        let result = engine.score(&clean_track(), &two_checkpoint_route(), &short_plan, &actuals());
        assert_eq!(
            result,
            Err(ScoreError::LegCountMismatch {
                legs: 1,
                checkpoints: 2
            })
        );
    }
}
