//! Integration tests for candlestick pattern detection through the engine.

use std::collections::BTreeSet;

use candlesight::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        1000.0
    }
}

/// Generate downtrend bars
fn make_downtrend(n: usize) -> Vec<TestBar> {
    (0..n)
        .map(|i| {
            let base = 100.0 - (i as f64) * 2.0;
            TestBar::new(base + 1.0, base + 1.5, base - 1.5, base - 1.0)
        })
        .collect()
}

/// Generate uptrend bars
fn make_uptrend(n: usize) -> Vec<TestBar> {
    (0..n)
        .map(|i| {
            let base = 100.0 + (i as f64) * 2.0;
            TestBar::new(base - 1.0, base + 1.5, base - 1.5, base + 1.0)
        })
        .collect()
}

fn engine() -> SignalEngine {
    EngineBuilder::new().with_all_patterns().build().unwrap()
}

#[test]
fn test_doji_reference_candle() {
    let mut bars = make_uptrend(5);
    bars.push(TestBar::new(100.0, 101.0, 99.0, 100.05));
    assert!(engine().detect_patterns(&bars).contains(&PatternTag::Doji));
}

#[test]
fn test_requires_three_bars() {
    let bars = vec![TestBar::new(100.0, 101.0, 99.0, 100.0); 2];
    assert!(engine().detect_patterns(&bars).is_empty());
}

#[test]
fn test_uptrend_reports_soldiers() {
    let patterns = engine().detect_patterns(&make_uptrend(10));
    assert!(patterns.contains(&PatternTag::ThreeWhiteSoldiers));
    assert!(!patterns.contains(&PatternTag::ThreeBlackCrows));
}

#[test]
fn test_downtrend_reports_crows() {
    let patterns = engine().detect_patterns(&make_downtrend(10));
    assert!(patterns.contains(&PatternTag::ThreeBlackCrows));
    assert!(!patterns.contains(&PatternTag::ThreeWhiteSoldiers));
}

#[test]
fn test_patterns_co_fire() {
    // Bearish, then a bullish hammer-shaped candle engulfing it
    let mut bars = make_downtrend(4);
    bars.push(TestBar::new(94.0, 94.2, 91.8, 92.5));
    bars.push(TestBar::new(92.0, 95.2, 84.0, 95.0));
    let patterns = engine().detect_patterns(&bars);
    assert!(patterns.contains(&PatternTag::BullishEngulfing));
    assert!(patterns.contains(&PatternTag::Hammer));
}

#[test]
fn test_only_patterns_filter() {
    let engine = EngineBuilder::new()
        .with_all_patterns()
        .only_patterns([PatternTag::ThreeBlackCrows])
        .build()
        .unwrap();
    let expected: BTreeSet<_> = [PatternTag::ThreeBlackCrows].into_iter().collect();
    assert_eq!(engine.detect_patterns(&make_downtrend(6)), expected);
    assert!(engine.detect_patterns(&make_uptrend(6)).is_empty());
}

#[test]
fn test_partial_registration() {
    let singles = EngineBuilder::new().with_single_bar_patterns().build().unwrap();
    let patterns = singles.detect_patterns(&make_uptrend(6));
    assert!(patterns.iter().all(|tag| tag.bars() == 1));

    let triples = EngineBuilder::new().with_three_bar_patterns().build().unwrap();
    assert_eq!(triples.pattern_scanner().rule_count(), 4);
}

#[test]
fn test_default_builder_registers_every_pattern() {
    let default = EngineBuilder::new().build().unwrap();
    assert_eq!(default.pattern_scanner().rule_count(), PatternTag::ALL.len());

    for bars in [make_uptrend(10), make_downtrend(10)] {
        assert_eq!(default.detect_patterns(&bars), engine().detect_patterns(&bars));
    }

    let flat = vec![TestBar::new(100.0, 101.0, 99.0, 100.0); 10];
    let patterns = default.detect_patterns(&flat);
    assert!(patterns.contains(&PatternTag::Doji));
    assert!(patterns.contains(&PatternTag::SpinningTop));
}

#[test]
fn test_only_patterns_narrows_default_set() {
    let engine = EngineBuilder::new()
        .only_patterns([PatternTag::ThreeWhiteSoldiers])
        .build()
        .unwrap();
    let expected: BTreeSet<_> = [PatternTag::ThreeWhiteSoldiers].into_iter().collect();
    assert_eq!(engine.detect_patterns(&make_uptrend(10)), expected);

    let none = EngineBuilder::new().without_patterns().build().unwrap();
    assert!(none.detect_patterns(&make_uptrend(10)).is_empty());
}

#[test]
fn test_directions() {
    assert_eq!(PatternTag::Hammer.typical_direction(), Direction::Bullish);
    assert_eq!(PatternTag::EveningStar.typical_direction(), Direction::Bearish);
    assert_eq!(PatternTag::Doji.typical_direction(), Direction::Neutral);
    assert_eq!(PatternTag::DarkCloudCover.to_string(), "Dark Cloud Cover");
}
