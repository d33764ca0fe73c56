//! Volume-weighted technical indicators
//!
//! VWMA, ATR, MFI, CMF, pivot-based support/resistance and the VWMA trend
//! classification. Every function degrades to a documented default when the
//! series is shorter than its window and never yields NaN or infinity for
//! finite input: zero denominators are replaced by 1 (or 0.0001 for negative
//! money flow).

use crate::config::AnalysisConfig;
use crate::{CandleSeries, OHLCVExt, TickerSnapshot, Trend, OHLCV};

/// Floor applied to MFI's negative money flow
pub const MIN_NEGATIVE_FLOW: f64 = 0.0001;

/// MFI reported when there is no money-flow sample at all
pub const NEUTRAL_MFI: f64 = 50.0;

/// Indicator snapshot for the most recent candle
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Indicators {
    pub trend: Trend,
    /// Money Flow Index, always in 0..=100
    pub mfi: f64,
    /// Chaikin Money Flow
    pub cmf: f64,
    /// Latest fast VWMA (20 candles by default), 0 when history is too short
    pub vwma_fast: f64,
    /// Latest slow VWMA (50 candles by default), 0 when history is too short
    pub vwma_slow: f64,
    pub atr: f64,
    pub support: f64,
    pub resistance: f64,
    /// 24h volume over the trailing average candle volume
    pub volume_ratio: f64,
    pub is_high_conviction: bool,
}

/// Volume-weighted support and resistance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub support: f64,
    pub resistance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy)]
struct Pivot {
    price: f64,
    strength: f64,
    kind: PivotKind,
}

/// Replaces a zero (or NaN) denominator with 1.
#[inline]
pub fn or_one(value: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        1.0
    } else {
        value
    }
}

/// Arithmetic mean; an empty input averages to 0.
pub fn average(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    sum / count.max(1) as f64
}

/// Trailing `period` bars (or all of them when fewer exist)
#[inline]
fn tail<T>(bars: &[T], period: usize) -> &[T] {
    &bars[bars.len().saturating_sub(period)..]
}

// ============================================================
// MOVING AVERAGES & VOLATILITY
// ============================================================

/// Volume-weighted moving average of close, one value per full window.
///
/// A series shorter than `period` yields a zero-filled vector of the
/// series' length.
pub fn vwma<T: OHLCV>(bars: &[T], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period {
        return vec![0.0; bars.len()];
    }

    bars.windows(period)
        .map(|window| {
            let (sum_pv, sum_v) = window.iter().fold((0.0, 0.0), |(pv, v), bar| {
                (pv + bar.close() * bar.volume(), v + bar.volume())
            });
            sum_pv / or_one(sum_v)
        })
        .collect()
}

#[inline]
fn true_range<T: OHLCV>(bar: &T, prev_close: f64) -> f64 {
    (bar.high() - bar.low())
        .max((bar.high() - prev_close).abs())
        .max((bar.low() - prev_close).abs())
}

/// Simple average of true range over the most recent `period` candles.
/// Returns 0 with fewer than `period + 1` candles.
pub fn atr<T: OHLCV>(bars: &[T], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 0.0;
    }

    let start = bars.len() - period;
    let sum: f64 = (start..bars.len())
        .map(|i| true_range(&bars[i], bars[i - 1].close()))
        .sum();
    sum / period as f64
}

// ============================================================
// MONEY FLOW
// ============================================================

/// Money Flow Index over the trailing `period` money-flow samples.
///
/// A sample is positive when close rose against the previous candle and
/// negative when it fell. Fewer samples than `period` are summed as they
/// are; no samples at all yields [`NEUTRAL_MFI`].
pub fn mfi<T: OHLCV>(bars: &[T], period: usize) -> f64 {
    if bars.len() < 2 || period == 0 {
        return NEUTRAL_MFI;
    }

    let start = (bars.len() - 1).saturating_sub(period) + 1;
    let (positive, negative) = (start..bars.len()).fold((0.0, 0.0), |(pos, neg), i| {
        let bar = &bars[i];
        let flow = bar.typical_price() * bar.volume();
        let prev_close = bars[i - 1].close();
        if bar.close() > prev_close {
            (pos + flow, neg)
        } else if bar.close() < prev_close {
            (pos, neg + flow)
        } else {
            (pos, neg)
        }
    });

    let negative = if negative == 0.0 { MIN_NEGATIVE_FLOW } else { negative };
    let value = 100.0 - 100.0 / (1.0 + positive / negative);
    if value.is_nan() {
        return NEUTRAL_MFI;
    }
    value.clamp(0.0, 100.0)
}

/// Chaikin Money Flow over the trailing `period` candles.
pub fn cmf<T: OHLCV>(bars: &[T], period: usize) -> f64 {
    let window = tail(bars, period);
    let (flow_volume, volume) = window.iter().fold((0.0, 0.0), |(mfv, vol), bar| {
        let multiplier =
            ((bar.close() - bar.low()) - (bar.high() - bar.close())) / or_one(bar.range());
        (mfv + multiplier * bar.volume(), vol + bar.volume())
    });
    flow_volume / or_one(volume)
}

// ============================================================
// SUPPORT / RESISTANCE
// ============================================================

/// Volume-weighted support and resistance from local close pivots.
///
/// Interior candles (skipping `edge` at each end) whose close is a strict
/// local max or min become pivots with strength
/// `volume / avg_volume(i - half_window ..= i + half_window - 1) * range`.
/// Pivots stronger than the mean pivot strength are significant. Support
/// is the lowest significant low pivot, resistance the highest significant
/// high pivot; each side falls back to the extreme low/high of the last
/// `fallback_lookback` candles.
pub fn support_resistance<T: OHLCV>(
    bars: &[T],
    edge: usize,
    half_window: usize,
    fallback_lookback: usize,
) -> Levels {
    let edge = edge.max(1);
    let n = bars.len();
    let mut pivots = Vec::new();

    if n > 2 * edge {
        for i in edge..n - edge {
            let close = bars[i].close();
            let before = bars[i - 1].close();
            let after = bars[i + 1].close();

            let kind = if close > before && close > after {
                PivotKind::High
            } else if close < before && close < after {
                PivotKind::Low
            } else {
                continue;
            };

            let start = i.saturating_sub(half_window);
            let end = (i + half_window).min(n);
            let avg_volume = or_one(average(bars[start..end].iter().map(|b| b.volume())));

            pivots.push(Pivot {
                price: close,
                strength: bars[i].volume() / avg_volume * bars[i].range(),
                kind,
            });
        }
    }

    let mean_strength = or_one(average(pivots.iter().map(|p| p.strength)));
    let significant = |kind: PivotKind| {
        pivots
            .iter()
            .filter(move |p| p.kind == kind && p.strength > mean_strength)
            .map(|p| p.price)
    };

    let recent = tail(bars, fallback_lookback);
    let support = significant(PivotKind::Low)
        .reduce(f64::min)
        .unwrap_or_else(|| recent.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min));
    let resistance = significant(PivotKind::High)
        .reduce(f64::max)
        .unwrap_or_else(|| recent.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max));

    Levels { support, resistance }
}

// ============================================================
// TREND & VOLUME
// ============================================================

/// Classify trend from the latest slopes of two VWMA series and the price
/// position against them. Fewer than two points in either series is Neutral.
pub fn trend(price: f64, fast: &[f64], slow: &[f64]) -> Trend {
    let (Some(&[fast_prev, fast_last]), Some(&[slow_prev, slow_last])) =
        (last_two(fast), last_two(slow))
    else {
        return Trend::Neutral;
    };

    Trend::classify(
        price > fast_last,
        price > slow_last,
        fast_last - fast_prev,
        slow_last - slow_prev,
    )
}

#[inline]
fn last_two(values: &[f64]) -> Option<&[f64; 2]> {
    values.len().checked_sub(2).and_then(|s| values[s..].try_into().ok())
}

/// 24h volume relative to the average candle volume of the trailing
/// `lookback` candles.
pub fn volume_ratio<T: OHLCV>(volume_24h: f64, bars: &[T], lookback: usize) -> f64 {
    let avg = average(tail(bars, lookback).iter().map(|b| b.volume()));
    volume_24h / or_one(avg)
}

/// Compute the full indicator snapshot for the latest candle.
pub fn compute(series: &CandleSeries, ticker: &TickerSnapshot, config: &AnalysisConfig) -> Indicators {
    let bars = series.candles();
    let price = ticker.last_price();

    let vwma_fast = vwma(bars, config.vwma_fast_period.get());
    let vwma_slow = vwma(bars, config.vwma_slow_period.get());
    let levels = support_resistance(
        bars,
        config.sr_edge.get(),
        config.sr_volume_half_window.get(),
        config.sr_fallback_lookback.get(),
    );
    let volume_ratio = volume_ratio(ticker.volume_24h(), bars, config.volume_avg_lookback.get());
    let is_high_conviction = volume_ratio > config.high_conviction_volume_ratio
        && ticker.quote_volume_24h() > config.high_conviction_quote_volume;

    Indicators {
        trend: trend(price, &vwma_fast, &vwma_slow),
        mfi: mfi(bars, config.mfi_period.get()),
        cmf: cmf(bars, config.cmf_period.get()),
        vwma_fast: vwma_fast.last().copied().unwrap_or_default(),
        vwma_slow: vwma_slow.last().copied().unwrap_or_default(),
        atr: atr(bars, config.atr_period.get()),
        support: levels.support,
        resistance: levels.resistance,
        volume_ratio,
        is_high_conviction,
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn bar(o: f64, h: f64, l: f64, c: f64, v: f64) -> Candle {
        Candle::new(0, o, h, l, c, v)
    }

    fn flat(n: usize) -> Vec<Candle> {
        (0..n).map(|_| bar(100.0, 100.0, 100.0, 100.0, 1000.0)).collect()
    }

    fn closes(values: &[f64]) -> Vec<Candle> {
        values.iter().map(|&c| bar(c, c + 1.0, c - 1.0, c, 1000.0)).collect()
    }

    #[test]
    fn test_or_one() {
        assert_eq!(or_one(0.0), 1.0);
        assert_eq!(or_one(f64::NAN), 1.0);
        assert_eq!(or_one(2.5), 2.5);
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average(std::iter::empty()), 0.0);
        assert_eq!(average([1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_vwma_weights_by_volume() {
        let bars = vec![bar(10.0, 10.0, 10.0, 10.0, 1.0), bar(20.0, 20.0, 20.0, 20.0, 3.0)];
        assert_eq!(vwma(&bars, 2), vec![17.5]);
    }

    #[test]
    fn test_vwma_short_series_is_zero_filled() {
        assert_eq!(vwma(&flat(5), 20), vec![0.0; 5]);
    }

    #[test]
    fn test_vwma_zero_volume_window() {
        let bars: Vec<Candle> = (0..3).map(|_| bar(5.0, 5.0, 5.0, 5.0, 0.0)).collect();
        assert_eq!(vwma(&bars, 3), vec![0.0]);
    }

    #[test]
    fn test_vwma_length() {
        assert_eq!(vwma(&flat(60), 20).len(), 41);
    }

    #[test]
    fn test_atr_needs_period_plus_one() {
        assert_eq!(atr(&flat(14), 14), 0.0);
        assert_eq!(atr(&flat(15), 14), 0.0);
    }

    #[test]
    fn test_atr_uses_most_recent_candles() {
        let mut bars = closes(&[100.0; 20]);
        // widen only the final candle: range 10 instead of 2
        bars[19] = bar(100.0, 105.0, 95.0, 100.0, 1000.0);
        let value = atr(&bars, 14);
        assert!((value - (13.0 * 2.0 + 10.0) / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_atr_includes_gap_from_previous_close() {
        let bars = vec![bar(100.0, 101.0, 99.0, 100.0, 1.0), bar(110.0, 111.0, 109.0, 110.0, 1.0)];
        assert_eq!(atr(&bars, 1), 11.0);
    }

    #[test]
    fn test_mfi_all_rising_is_100() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let value = mfi(&closes(&values), 14);
        assert!(value > 99.99 && value <= 100.0);
    }

    #[test]
    fn test_mfi_all_falling_is_0() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        assert_eq!(mfi(&closes(&values), 14), 0.0);
    }

    #[test]
    fn test_mfi_balanced_flow() {
        let values = [100.0, 101.0, 100.0, 101.0, 100.0];
        let value = mfi(&closes(&values), 4);
        assert!(value > 0.0 && value < 100.0);
    }

    #[test]
    fn test_mfi_single_candle_is_neutral() {
        assert_eq!(mfi(&flat(1), 14), NEUTRAL_MFI);
    }

    #[test]
    fn test_mfi_flat_series_has_no_positive_flow() {
        assert_eq!(mfi(&flat(30), 14), 0.0);
    }

    #[test]
    fn test_cmf_close_at_high_is_one() {
        let bars: Vec<Candle> = (0..25).map(|_| bar(100.0, 110.0, 90.0, 110.0, 500.0)).collect();
        assert!((cmf(&bars, 20) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cmf_close_at_low_is_minus_one() {
        let bars: Vec<Candle> = (0..25).map(|_| bar(100.0, 110.0, 90.0, 90.0, 500.0)).collect();
        assert!((cmf(&bars, 20) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cmf_degenerate_range_and_volume() {
        assert_eq!(cmf(&flat(10), 20), 0.0);
        let zero: Vec<Candle> = (0..5).map(|_| bar(1.0, 2.0, 0.5, 1.5, 0.0)).collect();
        assert_eq!(cmf(&zero, 20), 0.0);
    }

    #[test]
    fn test_support_resistance_fallback_without_pivots() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let levels = support_resistance(&closes(&values), 2, 5, 20);
        // last 20 closes are 120..=139 with lows 1 below and highs 1 above
        assert_eq!(levels.support, 119.0);
        assert_eq!(levels.resistance, 140.0);
    }

    #[test]
    fn test_support_resistance_picks_strong_pivots() {
        let mut values = vec![100.0; 30];
        values[10] = 90.0; // strong low
        values[20] = 115.0; // strong high
        values[25] = 101.0; // weak high
        let mut bars = closes(&values);
        bars[10] = bar(95.0, 96.0, 80.0, 90.0, 5000.0);
        bars[20] = bar(105.0, 125.0, 104.0, 115.0, 5000.0);
        let levels = support_resistance(&bars, 2, 5, 20);
        assert_eq!(levels.support, 90.0);
        assert_eq!(levels.resistance, 115.0);
    }

    #[test]
    fn test_support_resistance_tiny_series() {
        let levels = support_resistance(&closes(&[100.0, 101.0]), 2, 5, 20);
        assert_eq!(levels.support, 99.0);
        assert_eq!(levels.resistance, 102.0);
    }

    #[test]
    fn test_trend_needs_two_points() {
        assert_eq!(trend(100.0, &[1.0], &[1.0, 2.0]), Trend::Neutral);
        assert_eq!(trend(100.0, &[], &[]), Trend::Neutral);
    }

    #[test]
    fn test_trend_from_series() {
        assert_eq!(trend(110.0, &[100.0, 101.0], &[99.0, 100.0]), Trend::StrongUp);
        assert_eq!(trend(90.0, &[100.0, 99.0], &[101.0, 100.0]), Trend::StrongDown);
        assert_eq!(trend(100.0, &[0.0, 0.0], &[0.0, 0.0]), Trend::Neutral);
    }

    #[test]
    fn test_volume_ratio_floors_zero_average() {
        let bars: Vec<Candle> = (0..5).map(|_| bar(1.0, 1.0, 1.0, 1.0, 0.0)).collect();
        assert_eq!(volume_ratio(42.0, &bars, 30), 42.0);
        assert_eq!(volume_ratio(2000.0, &flat(40), 30), 2.0);
    }

    #[test]
    fn test_compute_degraded_series_is_finite() {
        let series = CandleSeries::new(
            (0..5)
                .map(|i| Candle::new(i, 10.0, 11.0, 9.0, 10.0 + i as f64 * 0.1, 100.0))
                .collect(),
        )
        .unwrap();
        let ticker = TickerSnapshot::new(10.5, 0.0, 0.0).unwrap();
        let ind = compute(&series, &ticker, &AnalysisConfig::default());
        assert_eq!(ind.vwma_fast, 0.0);
        assert_eq!(ind.vwma_slow, 0.0);
        assert_eq!(ind.atr, 0.0);
        assert_eq!(ind.trend, Trend::Neutral);
        for v in [ind.mfi, ind.cmf, ind.support, ind.resistance, ind.volume_ratio] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_high_conviction_requires_volume_and_liquidity() {
        let series = CandleSeries::new(
            (0..40).map(|i| Candle::new(i, 100.0, 101.0, 99.0, 100.0, 1000.0)).collect(),
        )
        .unwrap();
        let config = AnalysisConfig::default();
        let liquid = TickerSnapshot::new(100.0, 2000.0, 2_000_000.0).unwrap();
        assert!(compute(&series, &liquid, &config).is_high_conviction);
        let thin = TickerSnapshot::new(100.0, 2000.0, 500_000.0).unwrap();
        assert!(!compute(&series, &thin, &config).is_high_conviction);
        let quiet = TickerSnapshot::new(100.0, 1200.0, 2_000_000.0).unwrap();
        assert!(!compute(&series, &quiet, &config).is_high_conviction);
    }
}
