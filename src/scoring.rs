//! Multi-indicator fusion into a single confidence score
//!
//! Confidence starts at 0 and each firing condition adds a signed weight and
//! appends its reason. Mutually exclusive conditions (overbought/oversold,
//! inflow/outflow, near support/near resistance) are checked as one branch,
//! the first match winning.

use crate::config::AnalysisConfig;
use crate::indicators::Indicators;
use crate::ExternalSignals;

pub const TREND_WEIGHT: f64 = 0.2;
pub const TREND_WEIGHT_HIGH_CONVICTION: f64 = 0.4;
pub const VWMA_CONFIRMATION_WEIGHT: f64 = 0.1;
pub const OVERBOUGHT_PENALTY: f64 = 0.3;
pub const MONEY_FLOW_WEIGHT: f64 = 0.25;
pub const VOLUME_SPIKE_WEIGHT: f64 = 0.3;
pub const LEVEL_WEIGHT: f64 = 0.2;
pub const FUNDING_WEIGHT: f64 = 0.1;
pub const OPEN_INTEREST_WEIGHT: f64 = 0.1;

/// Fused confidence and the reasons behind it
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Score {
    pub confidence: f64,
    /// Human-readable reasons, in firing order
    pub signals: Vec<String>,
}

impl Score {
    fn add(&mut self, delta: f64, reason: impl Into<String>) {
        self.confidence += delta;
        self.signals.push(reason.into());
    }
}

/// Score the latest indicators against the current price and external signals.
pub fn score(
    indicators: &Indicators,
    price: f64,
    external: &ExternalSignals,
    config: &AnalysisConfig,
) -> Score {
    let mut score = Score::default();
    let trend = indicators.trend;
    let conviction_weight = if indicators.is_high_conviction {
        TREND_WEIGHT_HIGH_CONVICTION
    } else {
        TREND_WEIGHT
    };

    // Trend
    if trend.is_up() {
        score.add(conviction_weight, trend.label());
        if price > indicators.vwma_fast {
            score.add(VWMA_CONFIRMATION_WEIGHT, "Price > VWMA20");
        }
    } else if trend.is_down() {
        score.add(-conviction_weight, trend.label());
        if price < indicators.vwma_fast {
            score.add(-VWMA_CONFIRMATION_WEIGHT, "Price < VWMA20");
        }
    }

    // Momentum oscillator
    if indicators.mfi > config.mfi_overbought {
        score.add(-OVERBOUGHT_PENALTY, "Overbought");
    } else if indicators.mfi < config.mfi_oversold {
        score.add(conviction_weight, "Oversold");
    }

    // Money flow
    if indicators.cmf > config.cmf_threshold {
        score.add(MONEY_FLOW_WEIGHT, "Strong Money Inflow");
    } else if indicators.cmf < -config.cmf_threshold {
        score.add(-MONEY_FLOW_WEIGHT, "Strong Money Outflow");
    }

    // Volume
    if indicators.volume_ratio > config.volume_spike_ratio {
        let delta = if trend.is_up() { VOLUME_SPIKE_WEIGHT } else { -VOLUME_SPIKE_WEIGHT };
        score.add(delta, format!("Volume Spike ({:.1}x)", indicators.volume_ratio));
    }

    // Levels
    if within_band(price, indicators.support, config.near_level_pct) {
        score.add(LEVEL_WEIGHT, "Near Support");
    } else if within_band(price, indicators.resistance, config.near_level_pct) {
        score.add(-LEVEL_WEIGHT, "Near Resistance");
    }

    // Derivatives positioning
    if external.funding_rate > config.funding_threshold {
        score.add(FUNDING_WEIGHT, "Short Squeeze Risk");
    } else if external.funding_rate < -config.funding_threshold {
        score.add(-FUNDING_WEIGHT, "Long Squeeze Risk");
    } else {
        score.add(0.0, "Funding Balanced");
    }

    if external.open_interest_delta > 0.0 && trend.is_up() {
        score.add(OPEN_INTEREST_WEIGHT, "OI Rising w/ Uptrend");
    } else if external.open_interest_delta > 0.0 && trend.is_down() {
        score.add(-OPEN_INTEREST_WEIGHT, "OI Rising w/ Downtrend");
    } else {
        score.add(0.0, "OI Stable/Decreasing");
    }

    score
}

/// `price` lies within `level * (1 ± pct)`, bounds inclusive.
#[inline]
pub fn within_band(price: f64, level: f64, pct: f64) -> bool {
    price <= level * (1.0 + pct) && price >= level * (1.0 - pct)
}
