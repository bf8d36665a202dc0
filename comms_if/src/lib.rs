//! # Communications interface crate.
//!
//! Provides the interface types shared between the navigation core, the
//! service wrapper that fronts it, and the motor controller link.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pathfinding request and response schema
pub mod nav;

/// Motor controller motion vocabulary
pub mod moto;
