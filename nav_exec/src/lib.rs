//! # Navigation library.
//!
//! Path-planning core of the arena navigation service: the arena model,
//! viewpoint generation, pose-graph search, visit ordering and motion
//! compilation. The service wrapper and the benchmark access the pipeline
//! through [`solve`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arena;
pub mod moto_ctrl;
pub mod params;
pub mod plan;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use plan::solve;
