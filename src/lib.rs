//! # Candlesight - deterministic market-signal engine
//!
//! Turns one symbol's recent candle window, a ticker snapshot and optional
//! derivative-market signals into indicators, a scored trade recommendation,
//! an override-resolved final signal and the set of candlestick patterns on
//! the trailing bars.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlesight::prelude::*;
//!
//! let candles: Vec<Candle> = (0..120)
//!     .map(|i| {
//!         let c = 100.0 + i as f64;
//!         Candle::new(i * 60_000, c - 0.5, c + 1.0, c - 1.0, c, 1_000.0)
//!     })
//!     .collect();
//! let series = CandleSeries::new(candles).unwrap();
//! let ticker = TickerSnapshot::new(219.0, 2_500.0, 2_000_000.0).unwrap();
//!
//! let engine = EngineBuilder::new().with_all_patterns().build().unwrap();
//! let result = engine.analyze(&series, &ticker, &ExternalSignals::default());
//!
//! assert_eq!(result.indicators.trend, Trend::StrongUp);
//! ```

pub mod config;
pub mod decode;
pub mod detectors;
pub mod indicators;
pub mod leaderboard;
pub mod overrides;
pub mod recommendation;
pub mod scoring;
pub mod simulation;

pub mod prelude {
    pub use crate::{
        // Configuration
        config::{AnalysisConfig, ParamMeta, ParamType},
        // Patterns
        detectors::{PatternRule, PatternScanner, PatternTag, TailWindow},
        // Stages
        indicators::Indicators,
        leaderboard::{Leaderboard, RankedSymbol},
        overrides::{FinalSignal, OverrideEvidence},
        recommendation::Recommendation,
        scoring::Score,
        simulation::SimulatedPosition,
        // Parallel
        analyze_parallel,
        scan_parallel,
        // Results
        AnalysisResult,
        // Input data
        Candle,
        CandleSeries,
        Direction,
        // Engine
        EngineBuilder,
        ExternalSignals,
        MarketSnapshot,
        OHLCVExt,
        Period,
        PositionType,
        Ratio,
        RawMarket,
        Result,
        ScanError,
        ScanResult,
        // Errors
        SignalEngine,
        SignalError,
        TickerSnapshot,
        Trend,
        // Core traits
        OHLCV,
    };
}

use std::collections::BTreeSet;

use tracing::{debug, warn};

use config::AnalysisConfig;
use detectors::{PatternScanner, PatternTag};
use indicators::Indicators;
use overrides::{FinalSignal, OverrideEvidence};
use recommendation::Recommendation;
use scoring::Score;
use simulation::SimulatedPosition;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors raised while validating or decoding engine inputs.
///
/// Analysis itself never fails once inputs are validated.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Candle series is empty")]
    EmptySeries,

    #[error("Candle at index {index} is not after its predecessor")]
    NonChronological { index: usize },

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },

    #[error("Invalid ticker: {0}")]
    InvalidTicker(&'static str),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(SignalError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(SignalError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Lookback length in candles (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SignalError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with candle geometry derived from OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_wick(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_wick(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Midpoint of the real body
    #[inline]
    fn body_midpoint(&self) -> f64 {
        (self.open() + self.close()) / 2.0
    }

    #[inline]
    fn typical_price(&self) -> f64 {
        (self.high() + self.low() + self.close()) / 3.0
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if self.volume() < 0.0 {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

// ============================================================
// INPUT DATA
// ============================================================

/// One interval's OHLCV summary
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Open time, milliseconds since the Unix epoch
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub quote_volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            quote_volume: 0.0,
        }
    }

    pub fn with_quote_volume(mut self, quote_volume: f64) -> Self {
        self.quote_volume = quote_volume;
        self
    }

    /// Copy any OHLCV bar into a `Candle`; missing timestamps become 0.
    pub fn from_ohlcv<T: OHLCV>(bar: &T) -> Self {
        Self::new(
            bar.timestamp().unwrap_or_default(),
            bar.open(),
            bar.high(),
            bar.low(),
            bar.close(),
            bar.volume(),
        )
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.time)
    }
}

/// Non-empty, strictly chronological candle window for one symbol/interval
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if candles.is_empty() {
            return Err(SignalError::EmptySeries);
        }
        for (i, candle) in candles.iter().enumerate() {
            candle.validate().map_err(|e| match e {
                SignalError::InvalidCandle { reason, .. } => {
                    SignalError::InvalidCandle { index: i, reason }
                }
                other => other,
            })?;
            if i > 0 && candle.time <= candles[i - 1].time {
                return Err(SignalError::NonChronological { index: i });
            }
        }
        Ok(Self { candles })
    }

    #[inline]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Most recent candle
    #[inline]
    pub fn last(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.candles.iter().map(|c| c.close)
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }
}

impl std::ops::Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &[Candle] {
        &self.candles
    }
}

/// Point-in-time 24h ticker read
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TickerSnapshot {
    last_price: f64,
    volume_24h: f64,
    quote_volume_24h: f64,
}

impl TickerSnapshot {
    pub fn new(last_price: f64, volume_24h: f64, quote_volume_24h: f64) -> Result<Self> {
        if !last_price.is_finite() || last_price <= 0.0 {
            return Err(SignalError::InvalidTicker("last price must be finite and > 0"));
        }
        if !volume_24h.is_finite() || volume_24h < 0.0 {
            return Err(SignalError::InvalidTicker("volume must be finite and >= 0"));
        }
        if !quote_volume_24h.is_finite() || quote_volume_24h < 0.0 {
            return Err(SignalError::InvalidTicker("quote volume must be finite and >= 0"));
        }
        Ok(Self {
            last_price,
            volume_24h,
            quote_volume_24h,
        })
    }

    #[inline]
    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    #[inline]
    pub fn volume_24h(&self) -> f64 {
        self.volume_24h
    }

    #[inline]
    pub fn quote_volume_24h(&self) -> f64 {
        self.quote_volume_24h
    }
}

/// Derivative-market evidence; every field defaults to neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExternalSignals {
    pub funding_rate: f64,
    pub open_interest_delta: f64,
    pub whale_buy_detected: bool,
    pub whale_sell_detected: bool,
    /// Supplied by the caller's order-flow feed; the engine never derives it.
    pub sell_volume_spike: bool,
}

impl ExternalSignals {
    pub fn with_funding_rate(mut self, rate: f64) -> Self {
        self.funding_rate = rate;
        self
    }

    pub fn with_open_interest_delta(mut self, delta: f64) -> Self {
        self.open_interest_delta = delta;
        self
    }

    pub fn with_whales(mut self, buy: bool, sell: bool) -> Self {
        self.whale_buy_detected = buy;
        self.whale_sell_detected = sell;
        self
    }

    pub fn with_sell_volume_spike(mut self, spike: bool) -> Self {
        self.sell_volume_spike = spike;
        self
    }

    /// Non-finite readings count as unavailable, i.e. neutral.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            funding_rate: finite_or_zero(self.funding_rate),
            open_interest_delta: finite_or_zero(self.open_interest_delta),
            ..self
        }
    }
}

/// Everything the engine needs for one symbol
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub series: CandleSeries,
    pub ticker: TickerSnapshot,
    pub external: ExternalSignals,
}

// ============================================================
// MARKET CLASSIFICATION
// ============================================================

/// VWMA-based trend classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Trend {
    StrongUp,
    WeakUp,
    #[default]
    Neutral,
    WeakDown,
    StrongDown,
}

impl Trend {
    /// Priority-ordered classification from price position and MA slopes.
    pub fn classify(above_fast: bool, above_slow: bool, fast_slope: f64, slow_slope: f64) -> Self {
        if above_fast && above_slow && fast_slope > 0.0 && slow_slope > 0.0 {
            Trend::StrongUp
        } else if above_fast && fast_slope > 0.0 {
            Trend::WeakUp
        } else if !above_fast && !above_slow && fast_slope < 0.0 && slow_slope < 0.0 {
            Trend::StrongDown
        } else if !above_fast && fast_slope < 0.0 {
            Trend::WeakDown
        } else {
            Trend::Neutral
        }
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Trend::WeakDown | Trend::StrongDown)
    }

    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Trend::WeakUp | Trend::StrongUp)
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::StrongUp => "Strong Uptrend",
            Trend::WeakUp => "Weak Uptrend",
            Trend::Neutral => "Neutral",
            Trend::WeakDown => "Weak Downtrend",
            Trend::StrongDown => "Strong Downtrend",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trade direction of a recommendation or resolved signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionType {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl PositionType {
    /// Starting point of the override pipeline's integer confidence
    #[inline]
    pub fn baseline_confidence(self) -> i8 {
        match self {
            PositionType::Buy => 1,
            PositionType::Sell => -1,
            PositionType::Hold => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionType::Buy => "BUY",
            PositionType::Sell => "SELL",
            PositionType::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for PositionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional bias of a candlestick pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

// ============================================================
// ANALYSIS RESULT
// ============================================================

/// Complete output of one analysis call
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisResult {
    pub indicators: Indicators,
    /// Reasons in the order they fired
    pub signals: Vec<String>,
    pub recommendation: Recommendation,
    pub final_signal: FinalSignal,
    pub patterns: BTreeSet<PatternTag>,
}

// ============================================================
// SIGNAL ENGINE
// ============================================================

/// Stateless analysis engine. Holds only its immutable configuration and
/// pattern table, so one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: AnalysisConfig,
    patterns: PatternScanner,
}

impl SignalEngine {
    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[inline]
    pub fn pattern_scanner(&self) -> &PatternScanner {
        &self.patterns
    }

    // ===========================================
    // Stages
    // ===========================================

    pub fn indicators(&self, series: &CandleSeries, ticker: &TickerSnapshot) -> Indicators {
        indicators::compute(series, ticker, &self.config)
    }

    pub fn score(
        &self,
        indicators: &Indicators,
        ticker: &TickerSnapshot,
        external: &ExternalSignals,
    ) -> Score {
        scoring::score(indicators, ticker.last_price(), &external.sanitized(), &self.config)
    }

    pub fn recommend(
        &self,
        score: &Score,
        indicators: &Indicators,
        ticker: &TickerSnapshot,
    ) -> Recommendation {
        recommendation::build(score.confidence, ticker.last_price(), indicators, &self.config)
    }

    pub fn resolve(&self, base: PositionType, evidence: &OverrideEvidence) -> FinalSignal {
        overrides::resolve(base, evidence, &self.config)
    }

    pub fn detect_patterns<T: OHLCV>(&self, bars: &[T]) -> BTreeSet<PatternTag> {
        self.patterns.scan(bars)
    }

    // ===========================================
    // Full pipeline
    // ===========================================

    pub fn analyze(
        &self,
        series: &CandleSeries,
        ticker: &TickerSnapshot,
        external: &ExternalSignals,
    ) -> AnalysisResult {
        let indicators = self.indicators(series, ticker);
        let score = self.score(&indicators, ticker, external);
        let recommendation = self.recommend(&score, &indicators, ticker);
        let evidence = OverrideEvidence::from_market(series, &indicators, external, &self.config);
        let final_signal = self.resolve(recommendation.position_type, &evidence);
        let patterns = self.detect_patterns(series.candles());

        debug!(
            trend = %indicators.trend,
            confidence = score.confidence,
            position = %recommendation.position_type,
            final_signal = %final_signal.signal,
            patterns = patterns.len(),
            "analysis complete"
        );

        AnalysisResult {
            indicators,
            signals: score.signals,
            recommendation,
            final_signal,
            patterns,
        }
    }

    pub fn analyze_snapshot(&self, snapshot: &MarketSnapshot) -> AnalysisResult {
        self.analyze(&snapshot.series, &snapshot.ticker, &snapshot.external)
    }

    // ===========================================
    // Follow-up helpers
    // ===========================================

    /// Mark a recommendation against a live price with the configured
    /// position size and leverage.
    pub fn simulate(&self, recommendation: &Recommendation, current_price: f64) -> Option<SimulatedPosition> {
        SimulatedPosition::evaluate(recommendation, current_price, &self.config)
    }

    /// Empty leaderboard sized by the configuration
    pub fn leaderboard(&self) -> leaderboard::Leaderboard {
        leaderboard::Leaderboard::from_config(&self.config)
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating SignalEngine instances.
///
/// Every builtin pattern is registered unless a group method or
/// `without_patterns` narrows the set.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: AnalysisConfig,
    patterns: Option<PatternScanner>,
    filter: Option<Vec<PatternTag>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the analysis configuration
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Register every builtin pattern
    pub fn with_all_patterns(self) -> Self {
        self.with_single_bar_patterns()
            .with_two_bar_patterns()
            .with_three_bar_patterns()
    }

    pub fn with_single_bar_patterns(self) -> Self {
        self.register(detectors::single_bar::RULES)
    }

    pub fn with_two_bar_patterns(self) -> Self {
        self.register(detectors::two_bar::RULES)
    }

    pub fn with_three_bar_patterns(self) -> Self {
        self.register(detectors::three_bar::RULES)
    }

    /// Disable pattern detection entirely
    pub fn without_patterns(mut self) -> Self {
        self.patterns = Some(PatternScanner::new());
        self
    }

    /// Report only the listed patterns
    pub fn only_patterns(mut self, tags: impl IntoIterator<Item = PatternTag>) -> Self {
        self.filter = Some(tags.into_iter().collect());
        self
    }

    // The first explicit group replaces the all-rules default.
    fn register(mut self, rules: &[detectors::PatternRule]) -> Self {
        self.patterns
            .get_or_insert_with(PatternScanner::new)
            .extend(rules);
        self
    }

    pub fn build(self) -> Result<SignalEngine> {
        self.config.validate()?;
        let mut patterns = self.patterns.unwrap_or_else(PatternScanner::with_all_rules);
        if let Some(tags) = self.filter {
            patterns.set_filter(tags);
        }
        Ok(SignalEngine {
            config: self.config,
            patterns,
        })
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Undecoded payloads for one symbol, as handed over by the fetch layer
#[derive(Debug, Clone, Copy)]
pub struct RawMarket<'a> {
    pub symbol: &'a str,
    /// JSON array of kline tuples
    pub klines: &'a str,
    /// JSON 24h ticker object
    pub ticker: &'a str,
    pub external: ExternalSignals,
}

/// Result of analysing a single symbol
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub symbol: String,
    pub analysis: AnalysisResult,
}

/// Error from decoding a single symbol's payloads
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: SignalError,
}

/// Decode and analyse many symbols concurrently.
pub fn scan_parallel<'a, I>(engine: &SignalEngine, payloads: I) -> (Vec<ScanResult>, Vec<ScanError>)
where
    I: IntoParallelIterator<Item = RawMarket<'a>>,
{
    let results: Vec<_> = payloads
        .into_par_iter()
        .map(|raw| {
            MarketSnapshot::decode(&raw)
                .map(|snapshot| ScanResult {
                    symbol: raw.symbol.to_string(),
                    analysis: engine.analyze_snapshot(&snapshot),
                })
                .map_err(|error| {
                    warn!(symbol = raw.symbol, %error, "skipping undecodable market payload");
                    ScanError {
                        symbol: raw.symbol.to_string(),
                        error,
                    }
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

/// Analyse already-validated snapshots concurrently, preserving input order.
pub fn analyze_parallel<'a, I>(engine: &SignalEngine, snapshots: I) -> Vec<ScanResult>
where
    I: IntoParallelIterator<Item = (&'a str, &'a MarketSnapshot)>,
{
    snapshots
        .into_par_iter()
        .map(|(symbol, snapshot)| ScanResult {
            symbol: symbol.to_string(),
            analysis: engine.analyze_snapshot(snapshot),
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================
