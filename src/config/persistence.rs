//! Snapshot file configuration

/// Default path of the JSON snapshot the CLI reads series from
pub const SNAPSHOT_PATH: &str = "series_snapshot.json";

/// Current version of the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;
