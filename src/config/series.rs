//! Default catalogue of monitored series.

use crate::domain::{SeriesKind, SeriesSpec};

/// Search-interest keywords (trend APIs cap a request at five).
pub const TREND_KEYWORDS: &[&str] = &["Bitcoin", "Ethereum", "Cryptocurrency", "Solana", "Cardano"];

/// Spot symbols tracked for price breakouts
pub const PRICE_SYMBOLS: &[&str] = &["BTC", "ETH", "BNB", "SOL", "XRP", "USDC", "ADA", "DOGE"];

/// Quarterly COIN-M contracts and their display names, used for the futures premium
pub const FUTURES_CONTRACTS: &[(&str, &str)] = &[
    ("BTCUSD_250926", "BTC Sep 2025"),
    ("BTCUSD_251226", "BTC Dec 2025"),
    ("ETHUSD_250926", "ETH Sep 2025"),
    ("ETHUSD_251226", "ETH Dec 2025"),
];

/// Pairs with volume and intra-hour volatility series
pub const VOLUME_PAIRS: &[&str] = &["BTCUSD", "ETHUSD"];

pub const PRICE_ALT_INDEX: &str = "Price Alt Index";
pub const TRENDS_ALT_INDEX: &str = "Trends Alt Index";

/// Every series the dashboard watches, in the order ticks process them.
pub fn default_series_specs() -> Vec<SeriesSpec> {
    let mut specs: Vec<SeriesSpec> = TREND_KEYWORDS
        .iter()
        .map(|kw| SeriesSpec::new(SeriesKind::Trends, kw))
        .collect();
    specs.push(SeriesSpec::new(SeriesKind::Trends, TRENDS_ALT_INDEX));

    specs.extend(
        PRICE_SYMBOLS
            .iter()
            .map(|sym| SeriesSpec::new(SeriesKind::Prices, sym)),
    );
    specs.push(SeriesSpec::new(SeriesKind::Prices, PRICE_ALT_INDEX));

    specs.extend(FUTURES_CONTRACTS.iter().map(|(contract, name)| {
        SeriesSpec::with_id(
            SeriesKind::FuturesPremiums,
            &format!("{}_{}", SeriesKind::FuturesPremiums, contract.to_lowercase()),
            name,
        )
    }));

    specs.extend(
        VOLUME_PAIRS
            .iter()
            .map(|pair| SeriesSpec::new(SeriesKind::Volume, pair)),
    );
    specs.extend(
        VOLUME_PAIRS
            .iter()
            .map(|pair| SeriesSpec::new(SeriesKind::HfVolatility, pair)),
    );

    specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use strum::IntoEnumIterator;

    #[test]
    fn catalogue_is_a_valid_config() {
        let config = EngineConfig::with_series(default_series_specs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn catalogue_covers_every_kind() {
        let specs = default_series_specs();
        for kind in SeriesKind::iter() {
            assert!(specs.iter().any(|s| s.kind == kind), "missing {kind}");
        }
        assert!(specs.iter().any(|s| s.id == "futures_premiums_btcusd_250926"));
        assert!(specs.iter().any(|s| s.id == "prices_price_alt_index"));
    }
}
