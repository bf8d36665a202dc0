//! # Motion compilation
//!
//! Turns the planned pose sequence into motion primitives and the motor
//! controller command strings that execute them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd_gen;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use comms_if::moto::Motion;

use crate::arena::Obstacle;
use crate::plan::{PlanError, PlannedPose, Solver};

pub use cmd_gen::CommandGenerator;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The motion primitive stream for a planned path, with the capture
/// bookkeeping command generation needs.
#[derive(Debug, Clone)]
pub struct MotionPath {
    /// Primitives in execution order, including the virtual captures.
    pub motions: Vec<Motion>,

    /// Screenshot tags, one per capture, in execution order.
    pub capture_tags: Vec<String>,

    /// The obstacles being scanned, parallel to `capture_tags`.
    pub scanned: Vec<Obstacle>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Solver {
    /// Convert a planned pose sequence into its motion primitive stream.
    ///
    /// Each consecutive pose pair is looked up in the motion table; an edge
    /// recorded in the opposite orientation yields the opposite primitive.
    /// A capture primitive follows any motion entering a tagged pose.
    pub fn motion_path(&self, path: &[PlannedPose]) -> Result<MotionPath, PlanError> {
        let mut motions = Vec::new();
        let mut capture_tags = Vec::new();
        let mut scanned = Vec::new();

        for pair in path.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);

            let motion = if let Some(m) = self.motion_table.get(&(to.pose, from.pose)) {
                m.opposite()
            } else if let Some(m) = self.motion_table.get(&(from.pose, to.pose)) {
                *m
            } else {
                return Err(PlanError::MissingMotion(from.pose, to.pose));
            };

            motions.push(motion);

            if let Some(tag) = &to.screenshot {
                motions.push(Motion::Capture);

                let obstacle_id: u32 = tag
                    .split('_')
                    .next()
                    .and_then(|id| id.parse().ok())
                    .ok_or_else(|| PlanError::MalformedTag(tag.clone()))?;

                let obstacle = self
                    .arena
                    .find_obstacle_by_id(obstacle_id)
                    .ok_or(PlanError::UnknownObstacle(obstacle_id))?;

                capture_tags.push(tag.clone());
                scanned.push(*obstacle);
            }
        }

        Ok(MotionPath {
            motions,
            capture_tags,
            scanned,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
