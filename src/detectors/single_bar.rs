//! Single-bar candlestick patterns
//!
//! Hammer, Inverted Hammer, Shooting Star, Doji, Spinning Top. Only the last
//! candle of the window is inspected.

use super::helpers::{is_body_short, is_doji, is_shadow_verylong};
use super::{PatternRule, PatternTag, TailWindow};
use crate::OHLCVExt;

pub const RULES: &[PatternRule] = &[
    PatternRule { tag: PatternTag::Hammer, predicate: hammer },
    PatternRule { tag: PatternTag::InvertedHammer, predicate: inverted_hammer },
    PatternRule { tag: PatternTag::ShootingStar, predicate: shooting_star },
    PatternRule { tag: PatternTag::Doji, predicate: doji },
    PatternRule { tag: PatternTag::SpinningTop, predicate: spinning_top },
];

/// Long lower wick under a bullish body
fn hammer(w: &TailWindow) -> bool {
    let c = &w.last;
    is_shadow_verylong(c.lower_wick(), c.body()) && c.is_bullish()
}

fn inverted_hammer(w: &TailWindow) -> bool {
    let c = &w.last;
    is_shadow_verylong(c.upper_wick(), c.body()) && c.is_bullish()
}

fn shooting_star(w: &TailWindow) -> bool {
    let c = &w.last;
    is_shadow_verylong(c.upper_wick(), c.body()) && c.is_bearish()
}

fn doji(w: &TailWindow) -> bool {
    is_doji(w.last.body(), w.last.range())
}

/// Small body with both wicks longer than it
fn spinning_top(w: &TailWindow) -> bool {
    let c = &w.last;
    let body = c.body();
    is_body_short(body, c.range()) && c.upper_wick() > body && c.lower_wick() > body
}
