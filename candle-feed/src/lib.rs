use async_trait::async_trait;
use chart_core::{Candle, TimeFrame, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A candle reload request. `timeframe` stays an opaque string here: the
/// execution engine forwards whatever the command carried, and each source
/// decides what it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub symbol: String,
    pub timeframe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Timestamp>,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            from: None,
            to: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed unavailable: {0}")]
    Unavailable(String),
    #[error("malformed candle payload: {0}")]
    BadResponse(String),
    #[error("unsupported timeframe: {0}")]
    UnsupportedTimeframe(String),
    #[error("no candles for requested range")]
    EmptyRange,
}

/// The candle-fetch collaborator seam. Implementations return candles
/// already sorted by strictly increasing `time`.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Candle>, FeedError>;
}

// ---------- deterministic synthetic source -----------------------------------

/// Fixed anchor so generated history is stable across runs.
const SYNTH_ANCHOR: Timestamp = 1_700_000_000;

/// Seeded random-walk source for demos and tests. The seed is derived from
/// symbol and timeframe, so the same request always yields the same series.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub bars: usize,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self { bars: 240 }
    }
}

impl SyntheticSource {
    pub fn new(bars: usize) -> Self {
        Self { bars }
    }

    fn seed(request: &FetchRequest) -> u64 {
        let mut seed: u64 = 0xcbf2_9ce4_8422_2325;
        for b in request.symbol.bytes().chain(request.timeframe.bytes()) {
            seed ^= b as u64;
            seed = seed.wrapping_mul(0x0000_0100_0000_01b3);
        }
        seed
    }
}

#[async_trait]
impl CandleSource for SyntheticSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Candle>, FeedError> {
        let tf: TimeFrame = request
            .timeframe
            .parse()
            .map_err(|_| FeedError::UnsupportedTimeframe(request.timeframe.clone()))?;
        let step = tf.duration_secs();

        let end = tf.align_ts(request.to.unwrap_or(SYNTH_ANCHOR));
        let start = match request.from {
            Some(from) => tf.align_ts(from),
            None => end - step * self.bars as i64,
        };
        if start >= end {
            return Err(FeedError::EmptyRange);
        }

        let mut rng = StdRng::seed_from_u64(Self::seed(request));
        let mut price: f64 = 100.0 + rng.gen_range(0.0..50.0);
        let mut out = Vec::new();
        let mut time = start;
        while time < end {
            let open = price;
            let delta: f64 = rng.gen_range(-2.0..2.0);
            price = (price + delta).max(0.1);
            let close = price;
            let spread: f64 = rng.gen_range(0.0..1.0);
            out.push(Candle {
                time,
                open,
                high: open.max(close) + spread,
                low: (open.min(close) - spread).max(0.05),
                close,
                volume: Some(rng.gen_range(10.0..1_000.0)),
            });
            time += step;
        }
        debug!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            count = out.len(),
            "synthesized candle history"
        );
        Ok(out)
    }
}

// ---------- test doubles ------------------------------------------------------

/// Returns a preset series, whatever the request.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    pub candles: Vec<Candle>,
}

impl FixedSource {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }
}

#[async_trait]
impl CandleSource for FixedSource {
    async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<Candle>, FeedError> {
        Ok(self.candles.clone())
    }
}

/// Always fails; exercises the reload-failure path.
#[derive(Debug, Clone)]
pub struct FailingSource {
    pub message: String,
}

impl FailingSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl CandleSource for FailingSource {
    async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<Candle>, FeedError> {
        Err(FeedError::Unavailable(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_core::is_strictly_ordered;

    #[tokio::test]
    async fn synthetic_is_deterministic_per_request() {
        let source = SyntheticSource::default();
        let request = FetchRequest::new("BTCUSDT", "1d");
        let a = source.fetch(&request).await.unwrap();
        let b = source.fetch(&request).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 240);
    }

    #[tokio::test]
    async fn different_symbols_get_different_walks() {
        let source = SyntheticSource::default();
        let a = source.fetch(&FetchRequest::new("BTCUSDT", "1d")).await.unwrap();
        let b = source.fetch(&FetchRequest::new("ETHUSDT", "1d")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn synthetic_output_is_strictly_ordered() {
        let source = SyntheticSource::new(50);
        let candles = source.fetch(&FetchRequest::new("BTCUSDT", "4h")).await.unwrap();
        assert!(is_strictly_ordered(&candles));
        for c in &candles {
            assert!(c.low <= c.open && c.low <= c.close);
            assert!(c.high >= c.open && c.high >= c.close);
        }
    }

    #[tokio::test]
    async fn synthetic_honors_explicit_bounds() {
        let source = SyntheticSource::default();
        let request = FetchRequest {
            symbol: "BTCUSDT".into(),
            timeframe: "1h".into(),
            from: Some(SYNTH_ANCHOR - 10 * 3600),
            to: Some(SYNTH_ANCHOR),
        };
        let candles = source.fetch(&request).await.unwrap();
        assert_eq!(candles.len(), 10);
        assert!(candles.last().unwrap().time < SYNTH_ANCHOR);
    }

    #[tokio::test]
    async fn synthetic_rejects_unknown_timeframe() {
        let source = SyntheticSource::default();
        let err = source.fetch(&FetchRequest::new("BTCUSDT", "15m")).await;
        assert!(matches!(err, Err(FeedError::UnsupportedTimeframe(_))));
    }
}
