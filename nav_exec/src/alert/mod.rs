//! # Turn Alert Engine
//!
//! Matches the traveler's pose against the upcoming turn of the route and cues the haptic device
//! once per turn.
//!
//! Turns are consumed strictly in path order. The engine only ever looks at the next unconsumed
//! turn, and triggers an alert for it when the traveler is:
//!
//! - within `alert_distance` of the turn point, and
//! - heading towards it, i.e. the bearing to the turn point is within `direction_alignment_deg`
//!   of the traveler's heading.
//!
//! On triggering the actuator is called exactly once, whether or not that call succeeds, and the
//! turn is consumed. The alert then stays active for `display_duration_s`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::haptic::TurnDirection;
use log::{debug, info, warn};
use serde::Serialize;
use util::maths::ang_diff;

use crate::{haptic_client::Actuator, pose::PoseSample, route::TurnPoint};

pub use params::{graded_level, AlertParams, AlertProfile, MAX_SAMPLE_SPACING_RATIO};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct TurnAlertEngine {
    params: AlertParams,

    turn_points: Vec<TurnPoint>,

    state: AlertState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertState {
    /// Index of the next turn which hasn't triggered yet
    pub next_turn_idx: usize,

    pub active: Option<ActiveAlert>,
}

/// An alert which has been triggered and is still being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveAlert {
    pub turn_idx: usize,

    pub direction: TurnDirection,

    pub angle_deg: f64,

    /// Distance to the turn point when the alert triggered
    pub distance: f64,

    pub trigger_time_s: f64,

    /// Severity level, only set for the graded profile
    pub level: Option<u8>,
}

/// What happened during a single step of the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertReport {
    pub phase: AlertPhase,

    /// Set if an alert was triggered this step
    pub triggered: Option<ActiveAlert>,

    /// True if the previously active alert expired this step
    pub expired: bool,

    /// Distance to the next turn point, if there was a pose and a turn left to make
    pub distance_to_next: Option<f64>,

    /// True if a command was delivered to the actuator this step
    pub actuation_sent: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertPhase {
    Idle,
    Alerting,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TurnAlertEngine {
    pub fn new(params: AlertParams, turn_points: Vec<TurnPoint>) -> Self {
        Self {
            params,
            turn_points,
            state: AlertState::default(),
        }
    }

    /// Run one step of the engine.
    ///
    /// `pose` is the sample received this cycle, if any. Expiry of the active alert is processed
    /// even without a pose.
    pub fn step(
        &mut self,
        pose: Option<&PoseSample>,
        now_s: f64,
        actuator: &mut dyn Actuator,
    ) -> AlertReport {
        let mut report = AlertReport::default();

        // ---- EXPIRY ----

        if let Some(active) = self.state.active {
            if now_s - active.trigger_time_s >= self.params.display_duration_s {
                debug!("Alert for turn {} expired", active.turn_idx);
                self.state.active = None;
                report.expired = true;
            }
        }

        // ---- TRIGGER ----

        let turn_idx = self.state.next_turn_idx;

        if let (Some(pose), Some(turn)) = (pose, self.turn_points.get(turn_idx)) {
            let to_turn = turn.position - pose.position;
            let distance = to_turn.norm();
            report.distance_to_next = Some(distance);

            // A pose exactly on the turn point has no bearing to it
            let aligned = distance > 0.0 && {
                let bearing_rad = to_turn.y.atan2(to_turn.x);
                ang_diff(bearing_rad, pose.heading_rad).abs()
                    <= self.params.direction_alignment_deg.to_radians()
            };

            if distance <= self.params.alert_distance && aligned {
                let alert = ActiveAlert {
                    turn_idx,
                    direction: turn.direction,
                    angle_deg: turn.angle_deg,
                    distance,
                    trigger_time_s: now_s,
                    level: match self.params.profile {
                        AlertProfile::Binary => None,
                        AlertProfile::Graded => Some(graded_level(turn.angle_deg)),
                    },
                };

                info!(
                    "Turn {} alert: {} ({:.1} deg) in {:.1}",
                    turn_idx, alert.direction, alert.angle_deg, distance
                );

                match self.params.profile.command(alert.direction, alert.angle_deg) {
                    Some(cmd) => match actuator.notify(&cmd) {
                        Ok(()) => report.actuation_sent = true,
                        Err(e) => warn!("Could not notify the actuator: {}", e),
                    },
                    None => debug!("Turn {} is too shallow to cue", turn_idx),
                }

                self.state.active = Some(alert);
                self.state.next_turn_idx += 1;
                report.triggered = Some(alert);
            }
        }

        report.phase = self.phase();

        report
    }

    /// Restore the engine to its initial state, with no turns consumed.
    pub fn reset(&mut self) {
        self.state = AlertState::default();
    }

    pub fn phase(&self) -> AlertPhase {
        match self.state.active {
            Some(_) => AlertPhase::Alerting,
            None => AlertPhase::Idle,
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn turn_points(&self) -> &[TurnPoint] {
        &self.turn_points
    }

    /// True once every turn has triggered.
    pub fn all_turns_consumed(&self) -> bool {
        self.state.next_turn_idx >= self.turn_points.len()
    }
}

impl Default for AlertPhase {
    fn default() -> Self {
        AlertPhase::Idle
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{grid::GridCoord, haptic_client::HapticClientError};
    use comms_if::eqpt::haptic::HapticCmd;
    use nalgebra::Point2;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[derive(Default)]
    struct Recorder {
        cmds: Vec<HapticCmd>,
        fail: bool,
    }

    impl Actuator for Recorder {
        fn notify(&mut self, cmd: &HapticCmd) -> Result<(), HapticClientError> {
            self.cmds.push(*cmd);
            if self.fail {
                Err(HapticClientError::SendError(std::io::ErrorKind::Other.into()))
            } else {
                Ok(())
            }
        }
    }

    fn turn(x: f64, y: f64, direction: TurnDirection, angle_deg: f64) -> TurnPoint {
        TurnPoint {
            path_index: 1,
            coord: GridCoord::new(0, 0),
            position: Point2::new(x, y),
            direction,
            angle_deg,
        }
    }

    fn pose(x: f64, y: f64, heading_rad: f64) -> PoseSample {
        PoseSample {
            position: Point2::new(x, y),
            heading_rad,
            time_s: 0.0,
        }
    }

    fn engine(turns: Vec<TurnPoint>) -> TurnAlertEngine {
        TurnAlertEngine::new(
            AlertParams {
                alert_distance: 40.0,
                ..Default::default()
            },
            turns,
        )
    }

    #[test]
    fn test_dense_lingering() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Left, 90.0)]);
        let mut act = Recorder::default();

        // Many poses inside the gate, all facing the turn
        for i in 0..100 {
            let x = 65.0 + (i % 30) as f64;
            engine.step(Some(&pose(x, 0.5, 0.0)), i as f64 * 0.1, &mut act);
        }

        assert_eq!(act.cmds, vec![HapticCmd::Turn(TurnDirection::Left)]);
        assert!(engine.all_turns_consumed());
    }

    #[test]
    fn test_misaligned() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Left, 90.0)]);
        let mut act = Recorder::default();

        // Facing away, facing sideways, and just outside the alignment cone
        for h in [PI, FRAC_PI_2, -FRAC_PI_2, 31f64.to_radians()].iter() {
            let r = engine.step(Some(&pose(80.0, 0.0, *h)), 0.0, &mut act);
            assert!(r.triggered.is_none());
            assert_eq!(r.distance_to_next, Some(20.0));
        }

        assert!(act.cmds.is_empty());
        assert_eq!(engine.state().next_turn_idx, 0);

        // Inside the cone triggers
        let r = engine.step(Some(&pose(80.0, 0.0, 29f64.to_radians())), 0.0, &mut act);
        assert!(r.triggered.is_some());
    }

    #[test]
    fn test_out_of_range() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Right, 90.0)]);
        let mut act = Recorder::default();

        let r = engine.step(Some(&pose(59.0, 0.0, 0.0)), 0.0, &mut act);
        assert!(r.triggered.is_none());
        assert_eq!(r.phase, AlertPhase::Idle);

        // Exactly on the boundary triggers
        let r = engine.step(Some(&pose(60.0, 0.0, 0.0)), 0.1, &mut act);
        assert!(r.triggered.is_some());
        assert!(r.actuation_sent);
        assert_eq!(r.phase, AlertPhase::Alerting);
    }

    #[test]
    fn test_on_turn_point() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Right, 90.0)]);
        let mut act = Recorder::default();

        let r = engine.step(Some(&pose(100.0, 0.0, 0.0)), 0.0, &mut act);
        assert!(r.triggered.is_none());
        assert_eq!(r.distance_to_next, Some(0.0));
    }

    #[test]
    fn test_path_order() {
        let mut engine = engine(vec![
            turn(100.0, 0.0, TurnDirection::Right, 90.0),
            turn(100.0, 200.0, TurnDirection::Left, 90.0),
        ]);
        let mut act = Recorder::default();

        // Approaching the second turn first doesn't trigger it
        engine.step(Some(&pose(100.0, 170.0, FRAC_PI_2)), 0.0, &mut act);
        assert!(act.cmds.is_empty());

        engine.step(Some(&pose(80.0, 0.0, 0.0)), 1.0, &mut act);
        engine.step(Some(&pose(100.0, 170.0, FRAC_PI_2)), 2.0, &mut act);

        assert_eq!(
            act.cmds,
            vec![
                HapticCmd::Turn(TurnDirection::Right),
                HapticCmd::Turn(TurnDirection::Left)
            ]
        );

        // Nothing left to do
        let r = engine.step(Some(&pose(100.0, 190.0, FRAC_PI_2)), 3.0, &mut act);
        assert!(r.triggered.is_none());
        assert!(r.distance_to_next.is_none());
        assert_eq!(act.cmds.len(), 2);
    }

    #[test]
    fn test_expiry() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Right, 90.0)]);
        let mut act = Recorder::default();

        engine.step(Some(&pose(80.0, 0.0, 0.0)), 10.0, &mut act);
        assert_eq!(engine.phase(), AlertPhase::Alerting);

        let r = engine.step(None, 11.9, &mut act);
        assert!(!r.expired);
        assert_eq!(r.phase, AlertPhase::Alerting);

        // Expires with no pose input
        let r = engine.step(None, 12.0, &mut act);
        assert!(r.expired);
        assert_eq!(r.phase, AlertPhase::Idle);
        assert!(engine.state().active.is_none());
    }

    #[test]
    fn test_graded() {
        let mut engine = TurnAlertEngine::new(
            AlertParams {
                profile: AlertProfile::Graded,
                ..Default::default()
            },
            vec![
                turn(100.0, 0.0, TurnDirection::Right, 90.0),
                turn(300.0, 0.0, TurnDirection::Left, 5.0),
                turn(500.0, 0.0, TurnDirection::Left, 150.0),
            ],
        );
        let mut act = Recorder::default();

        for (i, x) in [80.0, 280.0, 480.0].iter().enumerate() {
            let r = engine.step(Some(&pose(*x, 0.0, 0.0)), i as f64 * 10.0, &mut act);
            assert!(r.triggered.is_some());
        }

        // The shallow turn is consumed without a cue
        assert_eq!(act.cmds, vec![HapticCmd::Level(2), HapticCmd::Level(3)]);
        assert_eq!(engine.state().active.and_then(|a| a.level), Some(3));
        assert!(engine.all_turns_consumed());
    }

    #[test]
    fn test_actuator_failure() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Right, 90.0)]);
        let mut act = Recorder {
            fail: true,
            ..Default::default()
        };

        for i in 0..10 {
            let r = engine.step(Some(&pose(80.0, 0.0, 0.0)), i as f64, &mut act);
            assert!(!r.actuation_sent);
        }

        // Called once, not retried
        assert_eq!(act.cmds.len(), 1);
        assert!(engine.all_turns_consumed());
    }

    #[test]
    fn test_reset() {
        let mut engine = engine(vec![turn(100.0, 0.0, TurnDirection::Right, 90.0)]);
        let mut act = Recorder::default();

        engine.step(Some(&pose(80.0, 0.0, 0.0)), 0.0, &mut act);
        assert!(engine.all_turns_consumed());

        engine.reset();
        assert_eq!(engine.state(), &AlertState::default());
        assert_eq!(engine.phase(), AlertPhase::Idle);

        engine.step(Some(&pose(80.0, 0.0, 0.0)), 1.0, &mut act);
        assert_eq!(act.cmds.len(), 2);
    }

    #[test]
    fn test_no_turns() {
        let mut engine = engine(vec![]);
        let mut act = Recorder::default();

        let r = engine.step(Some(&pose(0.0, 0.0, 0.0)), 0.0, &mut act);
        assert_eq!(r, AlertReport::default());
        assert!(engine.all_turns_consumed());
    }
}
