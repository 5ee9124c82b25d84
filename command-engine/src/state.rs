use chart_core::{Annotation, Candle, HighlightPoint, TimeFrame, Timestamp, DEFAULT_SYMBOL};
use indicator_engine::{IndicatorConfig, IndicatorKind};
use serde::{Deserialize, Serialize};

/// Single source of truth for what the chart shows. Created per session,
/// mutated only by the execution engine, handed out read-only to renderers,
/// and dropped with the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationState {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub candles: Vec<Candle>,
    /// Unique by kind; the engine upserts.
    pub indicators: Vec<IndicatorConfig>,
    pub highlights: Vec<HighlightPoint>,
    pub annotations: Vec<Annotation>,
    pub visible_from: Option<Timestamp>,
    pub visible_to: Option<Timestamp>,
    pub is_loading: bool,
    /// Set when the last candle reload failed; the previous series is kept.
    pub load_error: Option<String>,
}

impl Default for VisualizationState {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            timeframe: TimeFrame::D1,
            candles: Vec::new(),
            indicators: Vec::new(),
            highlights: Vec::new(),
            annotations: Vec::new(),
            visible_from: None,
            visible_to: None,
            is_loading: false,
            load_error: None,
        }
    }
}

impl VisualizationState {
    pub fn closes(&self) -> Vec<f64> {
        chart_core::closes(&self.candles)
    }

    pub fn times(&self) -> Vec<Timestamp> {
        chart_core::times(&self.candles)
    }

    pub fn indicator(&self, kind: IndicatorKind) -> Option<&IndicatorConfig> {
        self.indicators.iter().find(|c| c.kind == kind)
    }

    pub(crate) fn indicator_mut(&mut self, kind: IndicatorKind) -> Option<&mut IndicatorConfig> {
        self.indicators.iter_mut().find(|c| c.kind == kind)
    }

    /// Replace the config of the same kind, or append.
    pub(crate) fn upsert_indicator(&mut self, config: IndicatorConfig) {
        match self.indicator_mut(config.kind) {
            Some(existing) => *existing = config,
            None => self.indicators.push(config),
        }
    }
}
