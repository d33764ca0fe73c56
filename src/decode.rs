//! Exchange payload decoding
//!
//! Klines arrive as positional tuples `[openTime, open, high, low, close,
//! volume, closeTime, quoteVolume, ...]` with prices and volumes encoded as
//! decimal strings. The 24h ticker is an object carrying `lastPrice`,
//! `volume` and `quoteVolume`. Numbers are accepted wherever strings are.

use serde_json::Value;

use crate::{Candle, CandleSeries, MarketSnapshot, RawMarket, Result, SignalError, TickerSnapshot};

const KLINE_MIN_FIELDS: usize = 8;

const OPEN_TIME: usize = 0;
const OPEN: usize = 1;
const HIGH: usize = 2;
const LOW: usize = 3;
const CLOSE: usize = 4;
const VOLUME: usize = 5;
const QUOTE_VOLUME: usize = 7;

fn malformed(what: impl Into<String>) -> SignalError {
    SignalError::MalformedPayload(what.into())
}

/// Decimal from a JSON string or number
fn decimal(value: &Value, field: &str) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(format!("`{field}` is not a decimal: {value}")))
}

fn millis(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| malformed(format!("open time is not an integer: {value}")))
}

impl Candle {
    /// Decode one kline tuple.
    pub fn from_kline(fields: &[Value]) -> Result<Self> {
        if fields.len() < KLINE_MIN_FIELDS {
            return Err(malformed(format!(
                "kline has {} fields, expected at least {KLINE_MIN_FIELDS}",
                fields.len()
            )));
        }
        Ok(Candle::new(
            millis(&fields[OPEN_TIME])?,
            decimal(&fields[OPEN], "open")?,
            decimal(&fields[HIGH], "high")?,
            decimal(&fields[LOW], "low")?,
            decimal(&fields[CLOSE], "close")?,
            decimal(&fields[VOLUME], "volume")?,
        )
        .with_quote_volume(decimal(&fields[QUOTE_VOLUME], "quoteVolume")?))
    }
}

impl CandleSeries {
    /// Decode a JSON array of kline tuples and validate the series.
    pub fn from_klines_json(json: &str) -> Result<Self> {
        let rows: Vec<Vec<Value>> = serde_json::from_str(json)?;
        let candles = rows
            .iter()
            .map(|row| Candle::from_kline(row))
            .collect::<Result<Vec<_>>>()?;
        CandleSeries::new(candles)
    }
}

impl TickerSnapshot {
    /// Decode a 24h ticker object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let field = |name: &str| -> Result<f64> {
            let v = value
                .get(name)
                .ok_or_else(|| malformed(format!("ticker is missing `{name}`")))?;
            decimal(v, name)
        };
        TickerSnapshot::new(field("lastPrice")?, field("volume")?, field("quoteVolume")?)
    }
}

impl MarketSnapshot {
    /// Decode and validate one symbol's payloads.
    pub fn decode(raw: &RawMarket<'_>) -> Result<Self> {
        Ok(MarketSnapshot {
            series: CandleSeries::from_klines_json(raw.klines)?,
            ticker: TickerSnapshot::from_json(raw.ticker)?,
            external: raw.external.sanitized(),
        })
    }
}
