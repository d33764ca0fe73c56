//! Analysis configuration
//!
//! Every threshold, lookback and multiplier the engine uses lives in
//! [`AnalysisConfig`]. The struct is injected at engine construction and
//! never mutated afterwards. Each scalar also has a [`ParamMeta`] entry so
//! callers can:
//! - validate hand-written or deserialized configs
//! - override named values from a flat map
//! - drive parameter sweeps from the declared ranges
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use candlesight::config::AnalysisConfig;
//!
//! let mut params = HashMap::new();
//! params.insert("near_level_pct", 0.01);
//! let config = AnalysisConfig::with_params(&params).unwrap();
//! assert_eq!(config.near_level_pct, 0.01);
//! ```

use std::collections::HashMap;

use crate::{Period, Ratio, Result, SignalError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Fraction in 0.0..=1.0
  Ratio,
  /// Positive integer candle count
  Period,
  /// Any finite value inside its declared range
  Scalar,
}

/// Metadata for a single configuration parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Field name on [`AnalysisConfig`]
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Accepted range and sweep step: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn new(
    name: &'static str,
    param_type: ParamType,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type, default, range, description }
  }

  /// Generate all values for a parameter sweep
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    if step.is_nan() || step <= 0.0 || max < min {
      return vec![min];
    }
    let steps = ((max - min) / step + 1e-9).floor() as usize;
    (0..=steps).map(|i| (min + i as f64 * step).min(max)).collect()
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    if !value.is_finite() {
      return Err(SignalError::InvalidValue("parameter must be finite"));
    }
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(SignalError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Scalar => Ok(()),
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(SignalError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

fn period_from_f64(value: f64) -> Result<Period> {
  if !value.is_finite() || value.fract() != 0.0 || value < 1.0 {
    return Err(SignalError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

// ============================================================
// CONFIG DEFINITION
// ============================================================

/// Generates the config struct, its defaults, the metadata table and
/// name-based accessors from one field list.
macro_rules! define_config {
  (
    $(
      $field:ident : $kind:ident = $default:expr, ($min:expr, $max:expr, $step:expr), $desc:literal;
    )*
  ) => {
    /// Engine thresholds, lookbacks and multipliers
    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    #[serde(default)]
    pub struct AnalysisConfig {
      $(
        #[doc = $desc]
        pub $field: define_config!(@ty $kind),
      )*
    }

    impl Default for AnalysisConfig {
      fn default() -> Self {
        Self {
          $($field: define_config!(@default $kind, $default),)*
        }
      }
    }

    /// Metadata for every tunable field of [`AnalysisConfig`]
    pub static PARAM_META: &[ParamMeta] = &[
      $(
        ParamMeta::new(
          stringify!($field),
          ParamType::$kind,
          $default as f64,
          ($min as f64, $max as f64, $step as f64),
          $desc,
        ),
      )*
    ];

    impl AnalysisConfig {
      /// Read a parameter by name
      pub fn get(&self, name: &str) -> Option<f64> {
        match name {
          $(stringify!($field) => Some(define_config!(@get $kind, self.$field)),)*
          _ => None,
        }
      }

      /// Overwrite a parameter by name (range is checked by [`AnalysisConfig::validate`])
      pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
          $(stringify!($field) => self.$field = define_config!(@set $kind, value),)*
          _ => return Err(SignalError::InvalidConfig(format!("unknown parameter `{name}`"))),
        }
        Ok(())
      }
    }
  };

  (@ty Period) => { Period };
  (@ty Ratio) => { f64 };
  (@ty Scalar) => { f64 };

  (@default Period, $v:expr) => { Period::new_const($v) };
  (@default Ratio, $v:expr) => { $v };
  (@default Scalar, $v:expr) => { $v };

  (@get Period, $e:expr) => { $e.get() as f64 };
  (@get Ratio, $e:expr) => { $e };
  (@get Scalar, $e:expr) => { $e };

  (@set Period, $v:expr) => { period_from_f64($v)? };
  (@set Ratio, $v:expr) => { $v };
  (@set Scalar, $v:expr) => { $v };
}

define_config! {
  // Indicators
  vwma_fast_period: Period = 20, (5, 100, 5), "Candles in the fast VWMA";
  vwma_slow_period: Period = 50, (10, 200, 10), "Candles in the slow VWMA";
  atr_period: Period = 14, (2, 50, 1), "Candles averaged by ATR";
  mfi_period: Period = 14, (2, 50, 1), "Money-flow samples summed by MFI";
  cmf_period: Period = 20, (2, 100, 1), "Candles summed by CMF";
  volume_avg_lookback: Period = 30, (5, 200, 5), "Candles averaged for the 24h volume ratio";
  sr_edge: Period = 2, (1, 10, 1), "Candles skipped at each end of the pivot scan";
  sr_volume_half_window: Period = 5, (1, 20, 1), "Half-width of the pivot volume-average window";
  sr_fallback_lookback: Period = 20, (5, 100, 5), "Candles scanned for fallback support/resistance";

  // Conviction
  high_conviction_volume_ratio: Scalar = 1.5, (1.0, 10.0, 0.25), "Volume ratio above which volume backs the signal";
  high_conviction_quote_volume: Scalar = 1_000_000.0, (0.0, 1e12, 250_000.0), "24h quote volume needed for high conviction";

  // Scoring
  mfi_overbought: Scalar = 80.0, (50.0, 100.0, 5.0), "MFI level treated as overbought";
  mfi_oversold: Scalar = 20.0, (0.0, 50.0, 5.0), "MFI level treated as oversold";
  cmf_threshold: Scalar = 0.2, (0.0, 1.0, 0.05), "Absolute CMF marking strong money flow";
  volume_spike_ratio: Scalar = 2.0, (1.0, 20.0, 0.5), "Volume ratio reported as a spike by scoring";
  near_level_pct: Ratio = 0.02, (0.0, 0.2, 0.005), "Band around support/resistance counted as near";
  funding_threshold: Scalar = 0.0005, (0.0, 0.01, 0.0001), "Absolute funding rate marking squeeze risk";

  // Recommendation
  entry_threshold: Scalar = 0.7, (0.0, 5.0, 0.05), "Absolute confidence needed for BUY/SELL";
  entry_threshold_high_conviction: Scalar = 0.5, (0.0, 5.0, 0.05), "Absolute confidence needed for BUY/SELL under high conviction";
  base_risk_reward: Scalar = 2.0, (0.5, 10.0, 0.5), "Reward multiple of risk for targets";
  high_conviction_multiplier: Scalar = 1.5, (1.0, 5.0, 0.25), "Extra reward multiple under high conviction";
  stop_buffer_pct: Ratio = 0.03, (0.001, 0.5, 0.005), "Minimum stop distance as a fraction of price";
  atr_stop_multiple: Scalar = 2.0, (0.0, 10.0, 0.5), "Minimum stop distance in ATRs";

  // Overrides
  momentum_lookback: Period = 4, (1, 50, 1), "Candles back for the momentum price change";
  momentum_threshold_pct: Scalar = 3.0, (0.1, 50.0, 0.5), "Percent move treated as a pump or dump";
  override_volume_spike_ratio: Scalar = 5.0, (1.0, 50.0, 0.5), "Volume ratio that conflicts with a SELL";

  // Simulation and ranking
  simulation_position_size: Scalar = 10.0, (0.0, 1e9, 10.0), "Margin per simulated position";
  simulation_leverage: Scalar = 20.0, (1.0, 125.0, 1.0), "Leverage applied to simulated positions";
  leaderboard_min_confidence: Scalar = 0.7, (0.0, 5.0, 0.05), "Absolute confidence needed to enter the leaderboard";
  leaderboard_capacity: Period = 6, (1, 100, 1), "Symbols kept on the leaderboard";
}

impl AnalysisConfig {
  /// Default config with the named parameters overridden, validated.
  pub fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    let mut config = Self::default();
    for (name, value) in params {
      config.set(name, *value)?;
    }
    config.validate()?;
    Ok(config)
  }

  /// Decode a JSON config; missing fields take their defaults.
  pub fn from_json(json: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn param_meta() -> &'static [ParamMeta] {
    PARAM_META
  }

  /// Copies of this config with `name` set to each value of its grid.
  ///
  /// Grid points that break a cross-parameter rule are skipped.
  pub fn sweep(&self, name: &str) -> Result<Vec<Self>> {
    let meta = PARAM_META
      .iter()
      .find(|m| m.name == name)
      .ok_or_else(|| SignalError::InvalidConfig(format!("unknown parameter `{name}`")))?;
    let mut configs = Vec::new();
    for value in meta.generate_grid() {
      let mut config = self.clone();
      config.set(name, value)?;
      if config.validate().is_ok() {
        configs.push(config);
      }
    }
    Ok(configs)
  }

  /// Check every parameter against its declared range, then the
  /// relationships between parameters.
  pub fn validate(&self) -> Result<()> {
    for meta in PARAM_META {
      if let Some(value) = self.get(meta.name) {
        meta.validate(value)?;
      }
    }
    if self.vwma_fast_period >= self.vwma_slow_period {
      return Err(SignalError::InvalidConfig(
        "vwma_fast_period must be shorter than vwma_slow_period".into(),
      ));
    }
    if self.mfi_oversold >= self.mfi_overbought {
      return Err(SignalError::InvalidConfig("mfi_oversold must be below mfi_overbought".into()));
    }
    if self.entry_threshold_high_conviction > self.entry_threshold {
      return Err(SignalError::InvalidConfig(
        "entry_threshold_high_conviction must not exceed entry_threshold".into(),
      ));
    }
    Ok(())
  }

  /// Reward multiple of risk used for targets
  #[inline]
  pub fn reward_multiple(&self, high_conviction: bool) -> f64 {
    if high_conviction {
      self.base_risk_reward * self.high_conviction_multiplier
    } else {
      self.base_risk_reward
    }
  }

  /// Confidence magnitude needed to leave HOLD
  #[inline]
  pub fn entry_threshold_for(&self, high_conviction: bool) -> f64 {
    if high_conviction {
      self.entry_threshold_high_conviction
    } else {
      self.entry_threshold
    }
  }
}

// ============================================================
// TESTS
// ============================================================
