use chart_core::{TimeFrame, Timestamp};
use indicator_engine::{compute, DerivedSeries, IndicatorKind, IndicatorOutput};
use serde::Serialize;
use signal_engine::{crossovers, zero_crossings, CrossEvent};

use crate::state::VisualizationState;

/// One named line of an indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    pub name: &'static str,
    pub values: DerivedSeries,
}

/// Derived output for one visible indicator config: its lines plus the
/// display events detected on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorView {
    pub kind: IndicatorKind,
    pub lines: Vec<SeriesView>,
    pub events: Vec<CrossEvent>,
}

/// Everything the rendering collaborator needs besides the raw candles:
/// index-aligned derived series (`null` in the warm-up region) and event
/// markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub times: Vec<Timestamp>,
    pub indicators: Vec<IndicatorView>,
}

/// Pure read side: derives series and events from the state without touching
/// it. Hidden (`visible: false`) configs are skipped.
pub fn build_view(state: &VisualizationState) -> ChartView {
    let closes = state.closes();
    let times = state.times();
    let close_series: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();

    let mut indicators = Vec::new();
    for config in state.indicators.iter().filter(|c| c.visible) {
        let view = match compute(config, &closes) {
            IndicatorOutput::Line(series) => {
                let events = match config.kind {
                    // Price crossing its EMA is the classic trend signal.
                    IndicatorKind::Ema => crossovers(&close_series, &series, &times),
                    _ => Vec::new(),
                };
                IndicatorView {
                    kind: config.kind,
                    lines: vec![SeriesView {
                        name: "value",
                        values: series,
                    }],
                    events,
                }
            }
            IndicatorOutput::Macd(output) => {
                let mut events = crossovers(&output.macd, &output.signal, &times);
                events.extend(zero_crossings(&output.histogram, &times));
                events.sort_by_key(|e| e.time);
                IndicatorView {
                    kind: config.kind,
                    lines: vec![
                        SeriesView {
                            name: "macd",
                            values: output.macd,
                        },
                        SeriesView {
                            name: "signal",
                            values: output.signal,
                        },
                        SeriesView {
                            name: "histogram",
                            values: output.histogram,
                        },
                    ],
                    events,
                }
            }
        };
        indicators.push(view);
    }

    ChartView {
        symbol: state.symbol.clone(),
        timeframe: state.timeframe,
        times,
        indicators,
    }
}
