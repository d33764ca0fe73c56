//! Three-bar candlestick patterns
//!
//! Morning/Evening Star, Three White Soldiers, Three Black Crows.

use super::helpers::{is_body_short, three_in_a_row};
use super::{PatternRule, PatternTag, TailWindow};
use crate::OHLCVExt;

pub const RULES: &[PatternRule] = &[
    PatternRule { tag: PatternTag::MorningStar, predicate: morning_star },
    PatternRule { tag: PatternTag::EveningStar, predicate: evening_star },
    PatternRule { tag: PatternTag::ThreeWhiteSoldiers, predicate: three_white_soldiers },
    PatternRule { tag: PatternTag::ThreeBlackCrows, predicate: three_black_crows },
];

/// Bearish candle, indecisive middle, close back above the first body's midpoint
fn morning_star(w: &TailWindow) -> bool {
    w.prev2.is_bearish()
        && is_body_short(w.prev.body(), w.prev.range())
        && w.last.close > w.prev2.body_midpoint()
}

fn evening_star(w: &TailWindow) -> bool {
    w.prev2.is_bullish()
        && is_body_short(w.prev.body(), w.prev.range())
        && w.last.close < w.prev2.body_midpoint()
}

fn three_white_soldiers(w: &TailWindow) -> bool {
    three_in_a_row([&w.prev2, &w.prev, &w.last], true)
}

fn three_black_crows(w: &TailWindow) -> bool {
    three_in_a_row([&w.prev2, &w.prev, &w.last], false)
}
