//! Common helper functions for candlestick pattern detection
//!
//! Shape thresholds shared across the detector modules. All comparisons are
//! ratio based against the candle's own body or range.

use crate::{Candle, OHLCVExt};

/// Body is doji-like: body <= range * DOJI_RATIO
pub const DOJI_RATIO: f64 = 0.1;
/// Body is short: body <= range * BODY_SHORT_RATIO
pub const BODY_SHORT_RATIO: f64 = 0.3;
/// Shadow is very long: shadow > body * SHADOW_VERYLONG_FACTOR
pub const SHADOW_VERYLONG_FACTOR: f64 = 2.0;

/// Zero-range candles count as doji (0 <= 0).
#[inline]
pub fn is_doji(body: f64, range: f64) -> bool {
    body <= range * DOJI_RATIO
}

#[inline]
pub fn is_body_short(body: f64, range: f64) -> bool {
    body <= range * BODY_SHORT_RATIO
}

#[inline]
pub fn is_shadow_verylong(shadow: f64, body: f64) -> bool {
    shadow > body * SHADOW_VERYLONG_FACTOR
}

/// `outer`'s body covers `inner`'s body, bounds inclusive
#[inline]
pub fn body_contains(outer: &Candle, inner: &Candle) -> bool {
    let (outer_lo, outer_hi) = (outer.open.min(outer.close), outer.open.max(outer.close));
    let (inner_lo, inner_hi) = (inner.open.min(inner.close), inner.open.max(inner.close));
    outer_lo <= inner_lo && outer_hi >= inner_hi
}

/// Three candles share a direction with strictly monotonic closes
#[inline]
pub fn three_in_a_row(bars: [&Candle; 3], bullish: bool) -> bool {
    let [a, b, c] = bars;
    if bullish {
        a.is_bullish() && b.is_bullish() && c.is_bullish() && a.close < b.close && b.close < c.close
    } else {
        a.is_bearish() && b.is_bearish() && c.is_bearish() && a.close > b.close && b.close > c.close
    }
}
