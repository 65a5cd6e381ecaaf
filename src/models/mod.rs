//! Core data models for the tracker.

mod ids;
mod placement;
mod run;
mod stats;

pub use ids::*;
pub use placement::*;
pub use run::*;
pub use stats::*;
