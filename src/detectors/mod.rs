//! Candlestick pattern detectors
//!
//! Patterns are independent boolean rules over the trailing three candles.
//! Any number of them may fire for the same window, so detection returns a
//! set of tags rather than a single classification.
//!
//! # Pattern Categories
//!
//! - **Single-bar (5)**: Hammer, Inverted Hammer, Shooting Star, Doji, Spinning Top
//! - **Two-bar (4)**: Bullish/Bearish Engulfing, Piercing Line, Dark Cloud Cover
//! - **Three-bar (4)**: Morning/Evening Star, Three White Soldiers, Three Black Crows

use std::collections::BTreeSet;

use crate::{Candle, Direction, SignalError, OHLCV};

pub mod helpers;
pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

pub use helpers::*;

/// Candles a window needs before any pattern is reported
pub const WINDOW_BARS: usize = 3;

// ============================================================
// PATTERN TAGS
// ============================================================

/// Closed set of detectable patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternTag {
    Hammer,
    InvertedHammer,
    ShootingStar,
    Doji,
    SpinningTop,
    BullishEngulfing,
    BearishEngulfing,
    PiercingLine,
    DarkCloudCover,
    MorningStar,
    EveningStar,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
}

impl PatternTag {
    pub const ALL: [PatternTag; 13] = [
        PatternTag::Hammer,
        PatternTag::InvertedHammer,
        PatternTag::ShootingStar,
        PatternTag::Doji,
        PatternTag::SpinningTop,
        PatternTag::BullishEngulfing,
        PatternTag::BearishEngulfing,
        PatternTag::PiercingLine,
        PatternTag::DarkCloudCover,
        PatternTag::MorningStar,
        PatternTag::EveningStar,
        PatternTag::ThreeWhiteSoldiers,
        PatternTag::ThreeBlackCrows,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            PatternTag::Hammer => "Hammer",
            PatternTag::InvertedHammer => "Inverted Hammer",
            PatternTag::ShootingStar => "Shooting Star",
            PatternTag::Doji => "Doji",
            PatternTag::SpinningTop => "Spinning Top",
            PatternTag::BullishEngulfing => "Bullish Engulfing",
            PatternTag::BearishEngulfing => "Bearish Engulfing",
            PatternTag::PiercingLine => "Piercing Line",
            PatternTag::DarkCloudCover => "Dark Cloud Cover",
            PatternTag::MorningStar => "Morning Star",
            PatternTag::EveningStar => "Evening Star",
            PatternTag::ThreeWhiteSoldiers => "Three White Soldiers",
            PatternTag::ThreeBlackCrows => "Three Black Crows",
        }
    }

    /// Number of candles the pattern inspects
    pub fn bars(self) -> usize {
        match self {
            PatternTag::Hammer
            | PatternTag::InvertedHammer
            | PatternTag::ShootingStar
            | PatternTag::Doji
            | PatternTag::SpinningTop => 1,
            PatternTag::BullishEngulfing
            | PatternTag::BearishEngulfing
            | PatternTag::PiercingLine
            | PatternTag::DarkCloudCover => 2,
            PatternTag::MorningStar
            | PatternTag::EveningStar
            | PatternTag::ThreeWhiteSoldiers
            | PatternTag::ThreeBlackCrows => 3,
        }
    }

    pub fn typical_direction(self) -> Direction {
        match self {
            PatternTag::Hammer
            | PatternTag::InvertedHammer
            | PatternTag::BullishEngulfing
            | PatternTag::PiercingLine
            | PatternTag::MorningStar
            | PatternTag::ThreeWhiteSoldiers => Direction::Bullish,
            PatternTag::ShootingStar
            | PatternTag::BearishEngulfing
            | PatternTag::DarkCloudCover
            | PatternTag::EveningStar
            | PatternTag::ThreeBlackCrows => Direction::Bearish,
            PatternTag::Doji | PatternTag::SpinningTop => Direction::Neutral,
        }
    }

    /// Look up a tag by its display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl std::fmt::Display for PatternTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for PatternTag {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for PatternTag {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        PatternTag::from_name(&name).ok_or_else(|| {
            serde::de::Error::custom(SignalError::MalformedPayload(format!("unknown pattern `{name}`")))
        })
    }
}

// ============================================================
// RULES
// ============================================================

/// The trailing three candles, oldest first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailWindow {
    pub prev2: Candle,
    pub prev: Candle,
    pub last: Candle,
}

impl TailWindow {
    /// Window over the last three bars, `None` when fewer are available.
    pub fn from_bars<T: OHLCV>(bars: &[T]) -> Option<Self> {
        let n = bars.len();
        if n < WINDOW_BARS {
            return None;
        }
        Some(Self {
            prev2: Candle::from_ohlcv(&bars[n - 3]),
            prev: Candle::from_ohlcv(&bars[n - 2]),
            last: Candle::from_ohlcv(&bars[n - 1]),
        })
    }
}

/// One named pattern test
#[derive(Clone, Copy)]
pub struct PatternRule {
    pub tag: PatternTag,
    pub predicate: fn(&TailWindow) -> bool,
}

impl PatternRule {
    #[inline]
    pub fn matches(&self, window: &TailWindow) -> bool {
        (self.predicate)(window)
    }
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule").field("tag", &self.tag).finish()
    }
}

// ============================================================
// SCANNER
// ============================================================

/// Registered pattern rules plus an optional tag filter
#[derive(Debug, Clone, Default)]
pub struct PatternScanner {
    rules: Vec<PatternRule>,
    filter: Option<BTreeSet<PatternTag>>,
}

impl PatternScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner with every builtin rule table registered
    pub fn with_all_rules() -> Self {
        let mut scanner = Self::new();
        scanner.extend(single_bar::RULES);
        scanner.extend(two_bar::RULES);
        scanner.extend(three_bar::RULES);
        scanner
    }

    /// Register rules; a tag already present is not added twice.
    pub fn extend(&mut self, rules: &[PatternRule]) {
        for rule in rules {
            if !self.rules.iter().any(|r| r.tag == rule.tag) {
                self.rules.push(*rule);
            }
        }
    }

    /// Report only `tags` from now on
    pub fn set_filter(&mut self, tags: impl IntoIterator<Item = PatternTag>) {
        self.filter = Some(tags.into_iter().collect());
    }

    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn tags(&self) -> impl Iterator<Item = PatternTag> + '_ {
        self.rules.iter().map(|r| r.tag)
    }

    fn enabled(&self, tag: PatternTag) -> bool {
        self.filter.as_ref().map_or(true, |f| f.contains(&tag))
    }

    /// Every registered pattern matching the trailing window of `bars`.
    ///
    /// Fewer than three bars yields an empty set.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> BTreeSet<PatternTag> {
        match TailWindow::from_bars(bars) {
            Some(window) => self.scan_window(&window),
            None => BTreeSet::new(),
        }
    }

    pub fn scan_window(&self, window: &TailWindow) -> BTreeSet<PatternTag> {
        self.rules
            .iter()
            .filter(|rule| self.enabled(rule.tag) && rule.matches(window))
            .map(|rule| rule.tag)
            .collect()
    }
}
