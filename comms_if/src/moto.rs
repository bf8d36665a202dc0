//! # Motor controller motion vocabulary

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A motion primitive the robot can execute.
///
/// Arena motion is built from single-cell straight steps and
/// fixed-displacement 3-point turn arcs. `Capture` is a virtual primitive
/// marking an image capture; it produces no motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Forward,
    Reverse,
    ForwardLeftTurn,
    ForwardRightTurn,
    ReverseLeftTurn,
    ReverseRightTurn,
    Capture,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Motion {
    /// The primitive which traverses the same edge in the opposite travel
    /// direction.
    pub fn opposite(self) -> Motion {
        match self {
            Motion::Forward => Motion::Reverse,
            Motion::Reverse => Motion::Forward,
            Motion::ForwardLeftTurn => Motion::ReverseRightTurn,
            Motion::ForwardRightTurn => Motion::ReverseLeftTurn,
            Motion::ReverseLeftTurn => Motion::ForwardRightTurn,
            Motion::ReverseRightTurn => Motion::ForwardLeftTurn,
            Motion::Capture => Motion::Capture,
        }
    }

    /// True if consecutive repeats of this primitive may be merged into a
    /// single longer command.
    pub fn is_combinable(self) -> bool {
        matches!(self, Motion::Forward | Motion::Reverse)
    }

    /// Cost weight applied to reversing primitives.
    pub fn reverse_cost(self) -> u64 {
        match self {
            Motion::Reverse | Motion::ReverseLeftTurn | Motion::ReverseRightTurn => 1,
            _ => 0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
