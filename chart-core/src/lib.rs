use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds since Unix epoch.
pub type Timestamp = i64;

/// Number of seconds in common units.
pub const MINUTE_SECS: i64 = 60;
pub const HOUR_SECS: i64 = 60 * MINUTE_SECS;
pub const DAY_SECS: i64 = 24 * HOUR_SECS;

/// Instrument shown before any command has arrived.
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

/// Chart granularities the command surface accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[default]
    #[serde(rename = "1d")]
    D1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 3] = [TimeFrame::H1, TimeFrame::H4, TimeFrame::D1];

    /// Wire name ("1h", "4h", "1d").
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::H1 => "1h",
            TimeFrame::H4 => "4h",
            TimeFrame::D1 => "1d",
        }
    }

    /// Bucket duration in seconds.
    pub fn duration_secs(&self) -> i64 {
        match self {
            TimeFrame::H1 => HOUR_SECS,
            TimeFrame::H4 => 4 * HOUR_SECS,
            TimeFrame::D1 => DAY_SECS,
        }
    }

    /// Align a timestamp to this timeframe's bucket boundary.
    pub fn align_ts(&self, ts: Timestamp) -> Timestamp {
        let dur = self.duration_secs();
        ts.div_euclid(dur) * dur
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeFrameError;

impl fmt::Display for ParseTimeFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown timeframe")
    }
}

impl std::error::Error for ParseTimeFrameError {}

impl FromStr for TimeFrame {
    type Err = ParseTimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeFrame::H1),
            "4h" => Ok(TimeFrame::H4),
            "1d" => Ok(TimeFrame::D1),
            _ => Err(ParseTimeFrameError),
        }
    }
}

/// One OHLCV bar. Within a series, candles are ordered by strictly
/// increasing `time` with no duplicate timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Close prices of a candle slice, index-aligned.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Bucket timestamps of a candle slice, index-aligned.
pub fn times(candles: &[Candle]) -> Vec<Timestamp> {
    candles.iter().map(|c| c.time).collect()
}

/// Checks the series ordering invariant: strictly increasing timestamps.
pub fn is_strictly_ordered(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].time < w[1].time)
}

/// Which chart pane a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Price,
    Indicator,
}

impl Pane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pane::Price => "price",
            Pane::Indicator => "indicator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePaneError;

impl fmt::Display for ParsePaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown pane")
    }
}

impl std::error::Error for ParsePaneError {}

impl FromStr for Pane {
    type Err = ParsePaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(Pane::Price),
            "indicator" => Ok(Pane::Indicator),
            _ => Err(ParsePaneError),
        }
    }
}

/// A single marked point on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightPoint {
    pub time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A text note anchored to a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
}
