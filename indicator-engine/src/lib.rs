use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Derived values index-aligned one-to-one with the price series they were
/// computed from. `None` marks the warm-up region. Serializes as
/// `number | null` entries.
pub type DerivedSeries = Vec<Option<f64>>;

/// Supported indicator kinds. Wire names are uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Ema,
    Macd,
    Rsi,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 3] = [IndicatorKind::Ema, IndicatorKind::Macd, IndicatorKind::Rsi];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Rsi => "RSI",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIndicatorKindError;

impl fmt::Display for ParseIndicatorKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown indicator kind")
    }
}

impl std::error::Error for ParseIndicatorKindError {}

impl FromStr for IndicatorKind {
    type Err = ParseIndicatorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMA" => Ok(IndicatorKind::Ema),
            "MACD" => Ok(IndicatorKind::Macd),
            "RSI" => Ok(IndicatorKind::Rsi),
            _ => Err(ParseIndicatorKindError),
        }
    }
}

/// Default parameters per kind, applied when a command omits `params`.
pub fn default_params(kind: IndicatorKind) -> BTreeMap<String, f64> {
    let mut params = BTreeMap::new();
    match kind {
        IndicatorKind::Ema => {
            params.insert("period".to_string(), 20.0);
        }
        IndicatorKind::Macd => {
            params.insert("fast".to_string(), 12.0);
            params.insert("slow".to_string(), 26.0);
            params.insert("signal".to_string(), 9.0);
        }
        IndicatorKind::Rsi => {
            params.insert("period".to_string(), 14.0);
        }
    }
    params
}

/// Config for one active indicator. The state keeps at most one per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub kind: IndicatorKind,
    pub params: BTreeMap<String, f64>,
    pub visible: bool,
}

impl IndicatorConfig {
    pub fn with_defaults(kind: IndicatorKind) -> Self {
        Self {
            kind,
            params: default_params(kind),
            visible: true,
        }
    }

    pub fn with_params(kind: IndicatorKind, params: BTreeMap<String, f64>) -> Self {
        Self {
            kind,
            params,
            visible: true,
        }
    }

    /// Parameter lookup, falling back to the kind's default for omitted keys.
    pub fn param(&self, key: &str) -> Option<f64> {
        self.params
            .get(key)
            .copied()
            .or_else(|| default_params(self.kind).get(key).copied())
    }

    /// A window-length parameter as `usize`. Non-finite or sub-1 values
    /// collapse to 0, which makes every computation yield an all-`None`
    /// series rather than an error.
    fn period_param(&self, key: &str) -> usize {
        match self.param(key) {
            Some(v) if v.is_finite() && v >= 1.0 => v as usize,
            _ => 0,
        }
    }
}

// ---------- pure series computation ------------------------------------------

/// Exponential moving average with an SMA seed.
///
/// Entries below index `period - 1` are `None`; the value at `period - 1` is
/// the arithmetic mean of the first `period` inputs, and every later entry
/// follows `ema[i] = (data[i] - ema[i-1]) * k + ema[i-1]` with
/// `k = 2 / (period + 1)`. Inputs shorter than `period` yield all-`None`.
pub fn ema(data: &[f64], period: usize) -> DerivedSeries {
    let mut out = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = data[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(prev);
    for i in period..data.len() {
        prev = (data[i] - prev) * k + prev;
        out[i] = Some(prev);
    }
    out
}

/// The three MACD output lines, each index-aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: DerivedSeries,
    pub signal: DerivedSeries,
    pub histogram: DerivedSeries,
}

/// MACD line, signal line, histogram.
///
/// The signal line's warm-up is measured from the first defined MACD sample:
/// the defined suffix of the MACD line is compacted, smoothed with
/// `ema(_, signal)`, and written back through an explicit index offset.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let len = data.len();
    let fast_ema = ema(data, fast);
    let slow_ema = ema(data, slow);

    let mut macd_line: DerivedSeries = vec![None; len];
    for i in 0..len {
        if let (Some(f), Some(s)) = (fast_ema[i], slow_ema[i]) {
            macd_line[i] = Some(f - s);
        }
    }

    let mut signal_line: DerivedSeries = vec![None; len];
    if let Some(offset) = macd_line.iter().position(Option::is_some) {
        // Once both EMAs are seeded the MACD line stays defined, so the
        // suffix from `offset` compacts without gaps.
        let compact: Vec<f64> = macd_line[offset..].iter().filter_map(|v| *v).collect();
        for (j, v) in ema(&compact, signal).into_iter().enumerate() {
            signal_line[offset + j] = v;
        }
    }

    let mut histogram: DerivedSeries = vec![None; len];
    for i in 0..len {
        if let (Some(m), Some(s)) = (macd_line[i], signal_line[i]) {
            histogram[i] = Some(m - s);
        }
    }

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// Relative Strength Index (Wilder).
///
/// The first `period` deltas seed the gain/loss averages as simple means; the
/// first defined value lands at index `period`. Later values use the Wilder
/// recursion `avg = (avg * (period - 1) + current) / period`. A zero average
/// loss pins the output at exactly `100.0` instead of dividing by zero.
/// Inputs shorter than `period + 1` yield all-`None`.
pub fn rsi(data: &[f64], period: usize) -> DerivedSeries {
    let mut out = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return out;
    }
    let pf = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = data[i] - data[i - 1];
        avg_gain += delta.max(0.0);
        avg_loss += (-delta).max(0.0);
    }
    avg_gain /= pf;
    avg_loss /= pf;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in period + 1..data.len() {
        let delta = data[i] - data[i - 1];
        avg_gain = (avg_gain * (pf - 1.0) + delta.max(0.0)) / pf;
        avg_loss = (avg_loss * (pf - 1.0) + (-delta).max(0.0)) / pf;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

// ---------- config-driven dispatch -------------------------------------------

/// Output of one indicator config: a single line or the MACD triple.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    Line(DerivedSeries),
    Macd(MacdSeries),
}

/// Compute an indicator over a close series. Total: malformed or missing
/// parameters degrade to an all-`None` output of matching length.
pub fn compute(config: &IndicatorConfig, closes: &[f64]) -> IndicatorOutput {
    match config.kind {
        IndicatorKind::Ema => IndicatorOutput::Line(ema(closes, config.period_param("period"))),
        IndicatorKind::Rsi => IndicatorOutput::Line(rsi(closes, config.period_param("period"))),
        IndicatorKind::Macd => IndicatorOutput::Macd(macd(
            closes,
            config.period_param("fast"),
            config.period_param("slow"),
            config.period_param("signal"),
        )),
    }
}
