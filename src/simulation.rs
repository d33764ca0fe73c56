//! Paper-trade tracking of a recommendation against a live price

use crate::config::AnalysisConfig;
use crate::recommendation::Recommendation;
use crate::PositionType;

/// Mark-to-market view of a simulated leveraged position
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SimulatedPosition {
    pub position_type: PositionType,
    /// Margin times leverage, in quote currency
    pub notional: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    /// Remaining move to the target, in percent of the current price
    pub distance_to_tp_pct: f64,
    /// Remaining move to the stop, in percent of the current price
    pub distance_to_sl_pct: f64,
}

impl SimulatedPosition {
    /// Mark `recommendation` at `current_price`.
    ///
    /// Returns `None` for HOLD, missing levels, or a non-positive price.
    pub fn evaluate(
        recommendation: &Recommendation,
        current_price: f64,
        config: &AnalysisConfig,
    ) -> Option<Self> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return None;
        }
        let entry = recommendation.entry_price?;
        let stop = recommendation.stop_loss?;
        let target = recommendation.take_profit?;
        if entry <= 0.0 {
            return None;
        }
        let notional = config.simulation_position_size * config.simulation_leverage;

        let (move_pct, to_tp, to_sl) = match recommendation.position_type {
            PositionType::Buy => (
                (current_price - entry) / entry,
                target - current_price,
                current_price - stop,
            ),
            PositionType::Sell => (
                (entry - current_price) / entry,
                current_price - target,
                stop - current_price,
            ),
            PositionType::Hold => return None,
        };

        Some(Self {
            position_type: recommendation.position_type,
            notional,
            pnl: notional * move_pct,
            pnl_pct: move_pct * 100.0,
            distance_to_tp_pct: to_tp / current_price * 100.0,
            distance_to_sl_pct: to_sl / current_price * 100.0,
        })
    }

    #[inline]
    pub fn is_profitable(&self) -> bool {
        self.pnl >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(position_type: PositionType, entry: f64, stop: f64, target: f64) -> Recommendation {
        Recommendation {
            position_type,
            entry_price: Some(entry),
            stop_loss: Some(stop),
            take_profit: Some(target),
            risk_reward_ratio: Some(2.0),
            confidence: 0.8,
            is_high_conviction: false,
        }
    }

    #[test]
    fn test_buy_in_profit() {
        let config = AnalysisConfig::default();
        let pos = SimulatedPosition::evaluate(&rec(PositionType::Buy, 100.0, 90.0, 120.0), 105.0, &config)
            .unwrap();
        assert_eq!(pos.notional, 200.0);
        assert!((pos.pnl - 10.0).abs() < 1e-9);
        assert!((pos.pnl_pct - 5.0).abs() < 1e-9);
        assert!((pos.distance_to_tp_pct - 15.0 / 105.0 * 100.0).abs() < 1e-9);
        assert!((pos.distance_to_sl_pct - 15.0 / 105.0 * 100.0).abs() < 1e-9);
        assert!(pos.is_profitable());
    }

    #[test]
    fn test_sell_mirrors() {
        let config = AnalysisConfig::default();
        let pos = SimulatedPosition::evaluate(&rec(PositionType::Sell, 100.0, 110.0, 80.0), 104.0, &config)
            .unwrap();
        assert!((pos.pnl + 8.0).abs() < 1e-9);
        assert!((pos.pnl_pct + 4.0).abs() < 1e-9);
        assert!((pos.distance_to_tp_pct - 24.0 / 104.0 * 100.0).abs() < 1e-9);
        assert!((pos.distance_to_sl_pct - 6.0 / 104.0 * 100.0).abs() < 1e-9);
        assert!(!pos.is_profitable());
    }

    #[test]
    fn test_hold_and_bad_price_are_not_simulated() {
        let config = AnalysisConfig::default();
        let hold = Recommendation {
            position_type: PositionType::Hold,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            risk_reward_ratio: None,
            confidence: 0.0,
            is_high_conviction: false,
        };
        assert!(SimulatedPosition::evaluate(&hold, 100.0, &config).is_none());
        let buy = rec(PositionType::Buy, 100.0, 90.0, 120.0);
        assert!(SimulatedPosition::evaluate(&buy, f64::NAN, &config).is_none());
        assert!(SimulatedPosition::evaluate(&buy, 0.0, &config).is_none());
    }
}
