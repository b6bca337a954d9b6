// Data-fetcher boundary: the engine reads series, it never retrieves them
pub mod fetcher;
pub mod snapshot;

// Re-export commonly used types
pub use fetcher::{InMemoryFetcher, SeriesFetcher};
pub use snapshot::{JsonSnapshotFetcher, SeriesSnapshot, SnapshotEntry};
