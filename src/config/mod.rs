//! Configuration module for the breakout engine.

pub mod analysis;
pub mod series;

mod debug; // Private: files use crate::config::DEBUG_FLAGS, not crate::config::debug::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod persistence;

// Re-export commonly used items
pub use analysis::{ENGINE, EngineConfig, EngineDefaults, validate_sigma};
pub use persistence::{SNAPSHOT_PATH, SNAPSHOT_VERSION};
pub use series::default_series_specs;
