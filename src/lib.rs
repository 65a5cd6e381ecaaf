//! # Bazaar Tracker
//!
//! A personal run tracker: record the result of each run, browse the
//! history, and see placement and hero statistics per season.
//!
//! ## Architecture
//!
//! - **models**: Runs, placement categories, and derived statistics types
//! - **calculate**: Pure aggregation of runs into percentages and tables
//! - **storage**: JSONL run store and change notifications
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
