//! Motor controller command generation
//!
//! Commands use the controller's `{flag}{speed}|{angle}|{value}` grammar:
//! `T`/`t` drive forward/backward for a target distance in centimeters,
//! `W`/`w` drive forward/backward until a measured distance from the
//! obstacle ahead. Angles are in degrees, positive steering right. Two
//! out-of-band tokens complete the stream: `SNAP<tag>` requests an image
//! capture and `FIN` marks the end of the run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use comms_if::moto::Motion;

use super::MotionPath;
use crate::arena::{Obstacle, Pose};
use crate::params::NavParams;
use crate::plan::PlannedPose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance covered by one grid cell, in centimeters.
const UNIT_DIST_CM: u32 = 10;

/// Terminal token of every command stream.
const FIN: &str = "FIN";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generates motor controller command strings from a motion stream.
///
/// The turn sequences are tuned for the robot's 3-point turns and carry
/// their speeds as literals; only the straight-line speed is parameterised.
pub struct CommandGenerator {
    straight_speed: u32,
    use_distance_calibration: bool,
    robot_offset: i32,
    obstacle_size: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandGenerator {
    pub fn new(params: &NavParams) -> Self {
        CommandGenerator {
            straight_speed: params.straight_speed,
            use_distance_calibration: params.use_distance_calibration,
            robot_offset: params.robot_offset,
            obstacle_size: params.obstacle_size,
        }
    }

    /// Generate the command stream for a motion path.
    ///
    /// Runs of combinable primitives merge into a single command. The
    /// stream always ends with `FIN`.
    pub fn generate(&self, motion_path: &MotionPath, path: &[PlannedPose]) -> Vec<String> {
        let mut commands = Vec::new();

        let view_poses: Vec<Pose> = path
            .iter()
            .filter(|p| p.screenshot.is_some())
            .map(|p| p.pose)
            .collect();

        let mut motions = motion_path.motions.iter().copied();

        let mut prev = match motions.next() {
            Some(m) => m,
            None => {
                commands.push(FIN.to_string());
                return commands;
            }
        };
        let mut run_len = 1u32;
        let mut snap_count = 0usize;

        for motion in motions {
            if motion == prev && prev.is_combinable() {
                run_len += 1;
                continue;
            }

            if prev == Motion::Capture {
                self.push_capture(&mut commands, motion_path, &view_poses, snap_count);
                snap_count += 1;
            } else {
                commands.extend(self.motion_commands(prev, run_len));
                run_len = 1;
            }

            prev = motion;
        }

        if prev == Motion::Capture {
            self.push_capture(&mut commands, motion_path, &view_poses, snap_count);
        } else {
            commands.extend(self.motion_commands(prev, run_len));
        }

        commands.push(FIN.to_string());
        commands
    }

    /// Commands for a run of a single motion primitive.
    fn motion_commands(&self, motion: Motion, run_len: u32) -> Vec<String> {
        let dist = run_len * UNIT_DIST_CM;

        match motion {
            Motion::Forward => vec![format!("T{}|0|{}", self.straight_speed, dist)],

            Motion::Reverse => {
                // The servo drifts left when reversing, re-align every 20cm
                let mut cmds = Vec::new();

                for _ in 0..dist / 20 {
                    cmds.push("t35|0|20".to_string());
                    cmds.push("T25|30|0.1".to_string());
                }

                let remainder = dist % 20;
                if remainder > 0 {
                    cmds.push(format!("t35|0|{}", remainder));
                    if remainder >= 5 {
                        cmds.push("T25|30|0.1".to_string());
                    }
                }

                cmds
            }

            Motion::ForwardLeftTurn => vec![
                "T30|-50|46".to_string(),
                "t25|0|23".to_string(),
                "T30|-50|45.5".to_string(),
                "T25|10|0.1".to_string(),
                "t25|0|3".to_string(),
            ],

            Motion::ForwardRightTurn => vec![
                "T30|50|46".to_string(),
                "t25|0|20".to_string(),
                "T30|50|45.7".to_string(),
                "t25|0|4".to_string(),
            ],

            Motion::ReverseLeftTurn => vec![
                "T25|0|3".to_string(),
                "t30|-50|46".to_string(),
                "T25|0|22".to_string(),
                "t30|-50|46.5".to_string(),
                "T25|10|0.1".to_string(),
            ],

            Motion::ReverseRightTurn => vec![
                "T25|0|6".to_string(),
                "t30|48|45.4".to_string(),
                "T25|0|14".to_string(),
                "t30|48|45.5".to_string(),
            ],

            Motion::Capture => unreachable!("capture runs are emitted by push_capture"),
        }
    }

    /// Emit the capture sequence for snap number `index`: the optional
    /// distance calibration, then the snap request itself.
    fn push_capture(
        &self,
        commands: &mut Vec<String>,
        motion_path: &MotionPath,
        view_poses: &[Pose],
        index: usize,
    ) {
        let tag = &motion_path.capture_tags[index];

        if self.use_distance_calibration && tag.ends_with("_C") {
            commands.extend(
                self.calibration_commands(view_poses[index], &motion_path.scanned[index]),
            );
        }

        commands.push(format!("SNAP{}", tag));
    }

    /// Drive to the measured viewing distance and back, using the
    /// distance-sensing command pair.
    fn calibration_commands(&self, view: Pose, obstacle: &Obstacle) -> Vec<String> {
        // Small extra gap so the distance sensor never reports zero
        const CLEARANCE: f64 = 0.3;

        let gap_cells = (view.x - obstacle.x).abs().max((view.y - obstacle.y).abs())
            - self.robot_offset
            - self.obstacle_size;
        let dist_cm = ((gap_cells as f64 + CLEARANCE) * UNIT_DIST_CM as f64) as i32;

        vec![
            format!("W{}|0|{}", self.straight_speed, dist_cm),
            format!("w{}|0|{}", self.straight_speed, dist_cm),
        ]
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
