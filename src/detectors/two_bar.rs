//! Two-bar candlestick patterns
//!
//! Bullish/Bearish Engulfing, Piercing Line, Dark Cloud Cover. Midpoints
//! refer to the previous candle's real body.

use super::helpers::body_contains;
use super::{PatternRule, PatternTag, TailWindow};
use crate::OHLCVExt;

pub const RULES: &[PatternRule] = &[
    PatternRule { tag: PatternTag::BullishEngulfing, predicate: bullish_engulfing },
    PatternRule { tag: PatternTag::BearishEngulfing, predicate: bearish_engulfing },
    PatternRule { tag: PatternTag::PiercingLine, predicate: piercing_line },
    PatternRule { tag: PatternTag::DarkCloudCover, predicate: dark_cloud_cover },
];

fn bullish_engulfing(w: &TailWindow) -> bool {
    w.last.is_bullish() && w.prev.is_bearish() && body_contains(&w.last, &w.prev)
}

fn bearish_engulfing(w: &TailWindow) -> bool {
    w.last.is_bearish() && w.prev.is_bullish() && body_contains(&w.last, &w.prev)
}

/// Gap below the prior low, recovery past its body midpoint
fn piercing_line(w: &TailWindow) -> bool {
    w.prev.is_bearish() && w.last.open < w.prev.low && w.last.close > w.prev.body_midpoint()
}

fn dark_cloud_cover(w: &TailWindow) -> bool {
    w.prev.is_bullish() && w.last.open > w.prev.high && w.last.close < w.prev.body_midpoint()
}
