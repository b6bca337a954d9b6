use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::TimeUtils;

/// The family a monitored series belongs to. Drives display labels, the
/// expected sample cadence and the cache TTL handed to fetchers.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeriesKind {
    Trends,
    Prices,
    FuturesPremiums,
    Volume,
    HfVolatility,
}

impl SeriesKind {
    /// Label used in alert bodies
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Trends => "📊 Search Trends",
            SeriesKind::Prices => "💰 Prices",
            SeriesKind::FuturesPremiums => "📈 Futures Premium",
            SeriesKind::Volume => "📦 Volume",
            SeriesKind::HfVolatility => "⚡ HF Volatility",
        }
    }

    /// Short label used when summarising several kinds at once
    pub fn short_label(&self) -> &'static str {
        match self {
            SeriesKind::Trends => "Trends",
            SeriesKind::Prices => "Prices",
            SeriesKind::FuturesPremiums => "Futures",
            SeriesKind::Volume => "Volume",
            SeriesKind::HfVolatility => "Volatility",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SeriesKind::Trends => "📊",
            SeriesKind::Prices => "💰",
            SeriesKind::FuturesPremiums => "📈",
            SeriesKind::Volume => "📦",
            SeriesKind::HfVolatility => "⚡",
        }
    }

    /// Sample spacing fetchers must resample to before handing data over.
    pub fn cadence_ms(&self) -> i64 {
        match self {
            SeriesKind::HfVolatility => TimeUtils::MS_IN_5_MIN,
            _ => TimeUtils::MS_IN_H,
        }
    }

    /// How long a fetcher may serve cached data for this kind.
    /// Trends-like series refresh faster than price-like ones.
    pub fn cache_ttl(&self) -> Duration {
        match self {
            SeriesKind::Trends => Duration::from_secs(5 * 60),
            _ => Duration::from_secs(15 * 60),
        }
    }
}
