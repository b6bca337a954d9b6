pub mod core;
pub mod messages;
pub mod scheduler;
pub mod state;

// Re-export key components
pub use self::core::BreakoutEngine;
pub use messages::{AnomalyNote, MultiBreakoutEvent, SkippedSeries, TickReport};
pub use scheduler::TickScheduler;
pub use state::{SeriesRegistry, SeriesState};
