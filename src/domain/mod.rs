// Domain types and value objects
pub mod series;
pub mod series_kind;

// Re-export commonly used types
pub use series::{SeriesSpec, SeriesWindow, TimeSeries, slug};
pub use series_kind::SeriesKind;
