//! Risk-managed trade recommendation
//!
//! Confidence picks the position side; support/resistance, a percentage
//! buffer and ATR pick the stop; the target sits a fixed reward multiple of
//! the risk away from entry. Taking the farthest of the three stop
//! candidates keeps `stop < entry < target` for BUY and
//! `target < entry < stop` for SELL whenever price is positive.

use crate::config::AnalysisConfig;
use crate::indicators::Indicators;
use crate::PositionType;

/// Text reported for levels that do not exist (HOLD)
pub const UNDEFINED_LEVEL: &str = "N/A";

/// Trade recommendation derived from the fused confidence.
///
/// Price levels and the risk-reward ratio are `None` for HOLD.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Recommendation {
    pub position_type: PositionType,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub risk_reward_ratio: Option<f64>,
    pub confidence: f64,
    pub is_high_conviction: bool,
}

impl Recommendation {
    fn hold(confidence: f64, is_high_conviction: bool) -> Self {
        Self {
            position_type: PositionType::Hold,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            risk_reward_ratio: None,
            confidence,
            is_high_conviction,
        }
    }

    #[inline]
    pub fn is_actionable(&self) -> bool {
        self.position_type != PositionType::Hold
    }

    pub fn risk_reward_label(&self) -> String {
        level_label(self.risk_reward_ratio, 2)
    }
}

/// Fixed-precision text for an optional level, `"N/A"` when absent.
pub fn level_label(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => UNDEFINED_LEVEL.to_string(),
    }
}

/// Side implied by `confidence`; the threshold relaxes under high conviction.
pub fn position_type(confidence: f64, is_high_conviction: bool, config: &AnalysisConfig) -> PositionType {
    let threshold = config.entry_threshold_for(is_high_conviction);
    if confidence >= threshold {
        PositionType::Buy
    } else if confidence <= -threshold {
        PositionType::Sell
    } else {
        PositionType::Hold
    }
}

/// Build the recommendation for `price` from the fused confidence.
pub fn build(confidence: f64, price: f64, indicators: &Indicators, config: &AnalysisConfig) -> Recommendation {
    let high_conviction = indicators.is_high_conviction;
    let multiple = config.reward_multiple(high_conviction);
    let atr_distance = config.atr_stop_multiple * indicators.atr;

    let position_type = position_type(confidence, high_conviction, config);
    let entry = price;
    let (stop, target, risk_reward) = match position_type {
        PositionType::Buy => {
            let stop = indicators
                .support
                .min(price * (1.0 - config.stop_buffer_pct))
                .min(price - atr_distance);
            let target = entry + (entry - stop) * multiple;
            (stop, target, (target - entry) / (entry - stop))
        }
        PositionType::Sell => {
            let stop = indicators
                .resistance
                .max(price * (1.0 + config.stop_buffer_pct))
                .max(price + atr_distance);
            let target = entry - (stop - entry) * multiple;
            (stop, target, (entry - target) / (stop - entry))
        }
        PositionType::Hold => return Recommendation::hold(confidence, high_conviction),
    };

    Recommendation {
        position_type,
        entry_price: Some(entry),
        stop_loss: Some(stop),
        take_profit: Some(target),
        risk_reward_ratio: Some(risk_reward),
        confidence,
        is_high_conviction: high_conviction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trend;

    fn indicators(support: f64, resistance: f64, atr: f64, high_conviction: bool) -> Indicators {
        Indicators {
            trend: Trend::Neutral,
            mfi: 50.0,
            cmf: 0.0,
            vwma_fast: 100.0,
            vwma_slow: 100.0,
            atr,
            support,
            resistance,
            volume_ratio: 1.0,
            is_high_conviction: high_conviction,
        }
    }

    #[test]
    fn test_thresholds() {
        let c = AnalysisConfig::default();
        assert_eq!(position_type(0.5, true, &c), PositionType::Buy);
        assert_eq!(position_type(0.5, false, &c), PositionType::Hold);
        assert_eq!(position_type(0.7, false, &c), PositionType::Buy);
        assert_eq!(position_type(-0.5, true, &c), PositionType::Sell);
        assert_eq!(position_type(-0.69, false, &c), PositionType::Hold);
        assert_eq!(position_type(-0.7, false, &c), PositionType::Sell);
        assert_eq!(position_type(0.0, true, &c), PositionType::Hold);
    }

    #[test]
    fn test_buy_levels() {
        let rec = build(0.8, 100.0, &indicators(90.0, 110.0, 1.0, false), &AnalysisConfig::default());
        assert_eq!(rec.position_type, PositionType::Buy);
        assert_eq!(rec.entry_price, Some(100.0));
        assert_eq!(rec.stop_loss, Some(90.0));
        assert_eq!(rec.take_profit, Some(120.0));
        assert_eq!(rec.risk_reward_ratio, Some(2.0));
    }

    #[test]
    fn test_buy_stop_uses_atr_when_wider() {
        let rec = build(0.8, 100.0, &indicators(99.0, 110.0, 5.0, false), &AnalysisConfig::default());
        assert_eq!(rec.stop_loss, Some(90.0));
    }

    #[test]
    fn test_buy_high_conviction_stretches_target() {
        let rec = build(0.6, 100.0, &indicators(90.0, 110.0, 1.0, true), &AnalysisConfig::default());
        assert_eq!(rec.position_type, PositionType::Buy);
        assert_eq!(rec.take_profit, Some(130.0));
        assert_eq!(rec.risk_reward_ratio, Some(3.0));
        assert!(rec.is_high_conviction);
    }

    #[test]
    fn test_sell_levels() {
        let rec = build(-0.9, 100.0, &indicators(90.0, 102.0, 3.0, false), &AnalysisConfig::default());
        assert_eq!(rec.position_type, PositionType::Sell);
        assert_eq!(rec.stop_loss, Some(106.0));
        assert_eq!(rec.take_profit, Some(88.0));
        assert_eq!(rec.risk_reward_ratio, Some(2.0));
    }

    #[test]
    fn test_sell_stop_uses_buffer_when_resistance_is_close() {
        let rec = build(-0.9, 100.0, &indicators(90.0, 100.5, 0.0, false), &AnalysisConfig::default());
        assert!((rec.stop_loss.unwrap() - 103.0).abs() < 1e-9);
    }

    #[test]
    fn test_hold_has_undefined_levels() {
        let rec = build(0.1, 100.0, &indicators(90.0, 110.0, 1.0, false), &AnalysisConfig::default());
        assert_eq!(rec.position_type, PositionType::Hold);
        assert!(!rec.is_actionable());
        assert_eq!(rec.entry_price, None);
        assert_eq!(rec.risk_reward_ratio, None);
        assert_eq!(rec.risk_reward_label(), "N/A");
        assert_eq!(rec.confidence, 0.1);
    }

    #[test]
    fn test_level_label() {
        assert_eq!(level_label(Some(1.23456), 4), "1.2346");
        assert_eq!(level_label(None, 4), "N/A");
    }
}
