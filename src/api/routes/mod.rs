pub mod runs;
pub mod stats;
