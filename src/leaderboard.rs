//! Ranking of the strongest signals across a scan
//!
//! The leaderboard is owned by the caller and fed with analysis results; the
//! engine itself keeps no state between calls.

use crate::config::AnalysisConfig;
use crate::{PositionType, ScanResult};

/// One ranked symbol
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedSymbol {
    pub symbol: String,
    pub confidence: f64,
    pub position_type: PositionType,
}

impl RankedSymbol {
    pub fn new(symbol: impl Into<String>, confidence: f64, position_type: PositionType) -> Self {
        Self {
            symbol: symbol.into(),
            confidence,
            position_type,
        }
    }

    /// Ranking key for a finished analysis
    pub fn from_scan(result: &ScanResult) -> Self {
        let rec = &result.analysis.recommendation;
        Self::new(result.symbol.clone(), rec.confidence, rec.position_type)
    }

    #[inline]
    pub fn strength(&self) -> f64 {
        self.confidence.abs()
    }
}

/// Best symbols by absolute confidence, strongest first
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    entries: Vec<RankedSymbol>,
    min_confidence: f64,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(min_confidence: f64, capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            min_confidence,
            capacity,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.leaderboard_min_confidence, config.leaderboard_capacity.get())
    }

    /// Offer a candidate. Returns whether it is on the board afterwards.
    ///
    /// Weak or non-finite candidates are ignored. A symbol already on the
    /// board is replaced by the newer reading.
    pub fn offer(&mut self, candidate: RankedSymbol) -> bool {
        if !candidate.confidence.is_finite() || candidate.strength() < self.min_confidence {
            return false;
        }
        let symbol = candidate.symbol.clone();
        match self.entries.iter_mut().find(|e| e.symbol == candidate.symbol) {
            Some(existing) => *existing = candidate,
            None => self.entries.push(candidate),
        }
        self.entries
            .sort_by(|a, b| b.strength().total_cmp(&a.strength()));
        self.entries.truncate(self.capacity);
        self.contains(&symbol)
    }

    /// Offer every successful scan result
    pub fn extend_from_scan<'a>(&mut self, results: impl IntoIterator<Item = &'a ScanResult>) {
        for result in results {
            self.offer(RankedSymbol::from_scan(result));
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    #[inline]
    pub fn entries(&self) -> &[RankedSymbol] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
