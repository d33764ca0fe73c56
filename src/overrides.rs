//! Override pipeline
//!
//! Re-resolves the base position against momentum, volume-conflict and
//! large-trade evidence. Rules run in a fixed order and each one that fires
//! overwrites the running signal and reason, so the last firing rule owns
//! `override_reason`. The integer confidence starts from the base position
//! and is clamped to `[-2, 2]` at the end.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::indicators::Indicators;
use crate::{Candle, CandleSeries, ExternalSignals, PositionType};

pub const MIN_CONFIDENCE: i8 = -2;
pub const MAX_CONFIDENCE: i8 = 2;

/// Market evidence consulted by the override rules
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct OverrideEvidence {
    /// Close versus the close `momentum_lookback` candles back, in percent
    pub price_change_pct: f64,
    /// Volume ratio above the override spike threshold
    pub volume_spike: bool,
    pub sell_volume_spike: bool,
    pub whale_buy: bool,
    pub whale_sell: bool,
}

impl OverrideEvidence {
    /// Gather evidence for the latest candle of `series`.
    pub fn from_market(
        series: &CandleSeries,
        indicators: &Indicators,
        external: &ExternalSignals,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            price_change_pct: price_change_pct(series, config.momentum_lookback.get()),
            volume_spike: indicators.volume_ratio > config.override_volume_spike_ratio,
            sell_volume_spike: external.sell_volume_spike,
            whale_buy: external.whale_buy_detected,
            whale_sell: external.whale_sell_detected,
        }
    }
}

/// Percent change of the last close versus the close `lookback` candles back.
///
/// Returns 0 when the series is too short or the reference close is 0.
pub fn price_change_pct(series: &[Candle], lookback: usize) -> f64 {
    let n = series.len();
    if n <= lookback {
        return 0.0;
    }
    let reference = series[n - 1 - lookback].close;
    if reference == 0.0 {
        return 0.0;
    }
    (series[n - 1].close - reference) / reference * 100.0
}

/// Resolved signal after every override rule has run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FinalSignal {
    pub signal: PositionType,
    /// Always within `[-2, 2]`
    pub confidence: i8,
    pub override_reason: Option<&'static str>,
}

impl FinalSignal {
    #[inline]
    pub fn is_overridden(&self) -> bool {
        self.override_reason.is_some()
    }
}

/// Running state threaded through the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub signal: PositionType,
    pub confidence: i8,
}

/// One override rule: returns the new state and its reason when it fires.
#[derive(Clone, Copy)]
pub struct OverrideRule {
    pub name: &'static str,
    pub apply: fn(Resolution, &OverrideEvidence, &AnalysisConfig) -> Option<(Resolution, &'static str)>,
}

impl std::fmt::Debug for OverrideRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideRule").field("name", &self.name).finish()
    }
}

/// Override rules in evaluation order
pub const RULES: &[OverrideRule] = &[
    OverrideRule { name: "pump", apply: pump },
    OverrideRule { name: "dump", apply: dump },
    OverrideRule { name: "volume_vs_sell", apply: volume_vs_sell },
    OverrideRule { name: "sell_volume_vs_buy", apply: sell_volume_vs_buy },
    OverrideRule { name: "whale_buy", apply: whale_buy },
    OverrideRule { name: "whale_sell", apply: whale_sell },
];

fn pump(r: Resolution, e: &OverrideEvidence, c: &AnalysisConfig) -> Option<(Resolution, &'static str)> {
    (r.signal == PositionType::Sell && e.price_change_pct > c.momentum_threshold_pct).then(|| {
        (
            Resolution { signal: PositionType::Hold, confidence: r.confidence.max(0) },
            "Pump detected",
        )
    })
}

fn dump(r: Resolution, e: &OverrideEvidence, c: &AnalysisConfig) -> Option<(Resolution, &'static str)> {
    (r.signal == PositionType::Buy && e.price_change_pct < -c.momentum_threshold_pct).then(|| {
        (
            Resolution { signal: PositionType::Hold, confidence: r.confidence.min(0) },
            "Dump detected",
        )
    })
}

fn volume_vs_sell(r: Resolution, e: &OverrideEvidence, _: &AnalysisConfig) -> Option<(Resolution, &'static str)> {
    (r.signal == PositionType::Sell && e.volume_spike).then(|| {
        (
            Resolution { signal: PositionType::Hold, confidence: r.confidence.max(0) },
            "Conflict: High Volume vs SELL",
        )
    })
}

fn sell_volume_vs_buy(r: Resolution, e: &OverrideEvidence, _: &AnalysisConfig) -> Option<(Resolution, &'static str)> {
    (r.signal == PositionType::Buy && e.sell_volume_spike).then(|| {
        (
            Resolution { signal: PositionType::Hold, confidence: r.confidence.min(0) },
            "Conflict: Heavy Sell-Side Volume vs BUY",
        )
    })
}

fn whale_buy(r: Resolution, e: &OverrideEvidence, _: &AnalysisConfig) -> Option<(Resolution, &'static str)> {
    e.whale_buy.then(|| {
        let signal = match r.signal {
            PositionType::Sell => PositionType::Hold,
            PositionType::Hold | PositionType::Buy => PositionType::Buy,
        };
        (
            Resolution { signal, confidence: r.confidence.saturating_add(1) },
            "Whale Buy Detected",
        )
    })
}

fn whale_sell(r: Resolution, e: &OverrideEvidence, _: &AnalysisConfig) -> Option<(Resolution, &'static str)> {
    e.whale_sell.then(|| {
        let signal = match r.signal {
            PositionType::Buy => PositionType::Hold,
            PositionType::Hold | PositionType::Sell => PositionType::Sell,
        };
        (
            Resolution { signal, confidence: r.confidence.saturating_sub(1) },
            "Whale Sell Detected",
        )
    })
}

/// Run every override rule over the base position.
pub fn resolve(base: PositionType, evidence: &OverrideEvidence, config: &AnalysisConfig) -> FinalSignal {
    let mut state = Resolution {
        signal: base,
        confidence: base.baseline_confidence(),
    };
    let mut reason = None;

    for rule in RULES {
        if let Some((next, why)) = (rule.apply)(state, evidence, config) {
            debug!(rule = rule.name, from = %state.signal, to = %next.signal, "override fired");
            state = next;
            reason = Some(why);
        }
    }

    FinalSignal {
        signal: state.signal,
        confidence: state.confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
        override_reason: reason,
    }
}
