use chart_core::{Pane, TimeFrame, Timestamp};
use indicator_engine::IndicatorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated chart command. The wire shape is a JSON object whose `type`
/// field carries the discriminant; payload fields use the wire's camelCase.
///
/// Untrusted input must go through [`crate::validate::validate`]; the serde
/// derive is the trusted path used by lesson files and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "SET_SYMBOL")]
    SetSymbol { symbol: String },
    #[serde(rename = "SET_TIMEFRAME")]
    SetTimeframe { timeframe: TimeFrame },
    #[serde(rename = "LOAD_CANDLES")]
    LoadCandles {
        symbol: String,
        timeframe: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<Timestamp>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<Timestamp>,
    },
    #[serde(rename = "ADD_INDICATOR")]
    AddIndicator {
        indicator: IndicatorKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<BTreeMap<String, f64>>,
    },
    #[serde(rename = "UPDATE_INDICATOR_PARAMS")]
    UpdateIndicatorParams {
        indicator: IndicatorKind,
        params: BTreeMap<String, f64>,
    },
    #[serde(rename = "HIGHLIGHT_POINTS")]
    HighlightPoints { points: Vec<PointSpec> },
    #[serde(rename = "HIGHLIGHT_REGION")]
    HighlightRegion { region: RegionSpec },
    #[serde(rename = "ADD_ANNOTATION")]
    AddAnnotation { annotation: AnnotationSpec },
    #[serde(rename = "FOCUS_RANGE")]
    FocusRange { range: RangeSpec },
    #[serde(rename = "CLEAR_HIGHLIGHTS")]
    ClearHighlights,
    #[serde(rename = "CLEAR_INDICATORS")]
    ClearIndicators,
}

impl Command {
    /// Wire discriminant, for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Command::SetSymbol { .. } => "SET_SYMBOL",
            Command::SetTimeframe { .. } => "SET_TIMEFRAME",
            Command::LoadCandles { .. } => "LOAD_CANDLES",
            Command::AddIndicator { .. } => "ADD_INDICATOR",
            Command::UpdateIndicatorParams { .. } => "UPDATE_INDICATOR_PARAMS",
            Command::HighlightPoints { .. } => "HIGHLIGHT_POINTS",
            Command::HighlightRegion { .. } => "HIGHLIGHT_REGION",
            Command::AddAnnotation { .. } => "ADD_ANNOTATION",
            Command::FocusRange { .. } => "FOCUS_RANGE",
            Command::ClearHighlights => "CLEAR_HIGHLIGHTS",
            Command::ClearIndicators => "CLEAR_INDICATORS",
        }
    }
}

/// One point of a HIGHLIGHT_POINTS payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSpec {
    pub time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// HIGHLIGHT_REGION payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpec {
    pub from_time: Timestamp,
    pub to_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// ADD_ANNOTATION payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSpec {
    pub time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
}

/// FOCUS_RANGE payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSpec {
    pub from_time: Timestamp,
    pub to_time: Timestamp,
}

/// A named, pre-validated command batch triggered by a single user gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonOption {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actions: Vec<Command>,
}
