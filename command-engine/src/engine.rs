use candle_feed::{CandleSource, FetchRequest};
use chart_core::HighlightPoint;
use indicator_engine::IndicatorConfig;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::command::{Command, LessonOption, PointSpec, RegionSpec};
use crate::state::VisualizationState;
use crate::validate::{validate, RejectReason};

/// Diagnostic record of one batch application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Commands whose effects were applied (including those whose reload
    /// failed; the failure is counted separately).
    pub applied: usize,
    pub rejected: Vec<Rejection>,
    pub fetch_failures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}

/// Applies validated commands to a [`VisualizationState`], one at a time.
/// Holds the candle source it may call for reload side effects; owns no
/// state itself, so one engine can serve many states.
pub struct ExecutionEngine<S> {
    source: S,
}

impl<S: CandleSource> ExecutionEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Untrusted entry point: validate each raw value, drop rejects, apply
    /// the valid subsequence in original order. Never fails; the report is
    /// the only account of what was skipped.
    pub async fn apply_batch(&self, state: &mut VisualizationState, batch: &[Value]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, raw) in batch.iter().enumerate() {
            match validate(raw) {
                Ok(command) => self.apply(state, &command, &mut report).await,
                Err(reason) => {
                    warn!(index, %reason, "dropping rejected command");
                    report.rejected.push(Rejection { index, reason });
                }
            }
        }
        report
    }

    /// Trusted entry point for pre-validated batches (lesson actions).
    pub async fn apply_commands(
        &self,
        state: &mut VisualizationState,
        commands: &[Command],
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for command in commands {
            self.apply(state, command, &mut report).await;
        }
        report
    }

    /// One step of the state machine. Commands with a reload side effect
    /// suspend here until the reload resolves, so a later command in the
    /// batch always observes the candle set its predecessors produced.
    async fn apply(
        &self,
        state: &mut VisualizationState,
        command: &Command,
        report: &mut BatchReport,
    ) {
        debug!(command = command.tag(), "applying");
        match command {
            Command::SetSymbol { symbol } => {
                state.symbol = symbol.clone();
                let request =
                    FetchRequest::new(symbol.clone(), state.timeframe.as_str().to_string());
                self.reload(state, &request, report).await;
            }
            Command::SetTimeframe { timeframe } => {
                state.timeframe = *timeframe;
                let request =
                    FetchRequest::new(state.symbol.clone(), timeframe.as_str().to_string());
                self.reload(state, &request, report).await;
            }
            Command::LoadCandles {
                symbol,
                timeframe,
                from,
                to,
            } => {
                // Symbol and timeframe on the state stay untouched; the
                // bounds are forwarded opaquely.
                let request = FetchRequest {
                    symbol: symbol.clone(),
                    timeframe: timeframe.clone(),
                    from: *from,
                    to: *to,
                };
                self.reload(state, &request, report).await;
            }
            Command::AddIndicator { indicator, params } => {
                let config = match params {
                    Some(p) => IndicatorConfig::with_params(*indicator, p.clone()),
                    None => IndicatorConfig::with_defaults(*indicator),
                };
                state.upsert_indicator(config);
            }
            Command::UpdateIndicatorParams { indicator, params } => {
                match state.indicator_mut(*indicator) {
                    Some(config) => config.params = params.clone(),
                    None => {
                        debug!(indicator = indicator.as_str(), "param update for inactive indicator ignored")
                    }
                }
            }
            Command::HighlightPoints { points } => {
                state.highlights.extend(points.iter().map(point_to_highlight));
            }
            Command::HighlightRegion { region } => {
                let (start, end) = region_to_highlights(region);
                state.highlights.push(start);
                state.highlights.push(end);
            }
            Command::AddAnnotation { annotation } => {
                state.annotations.push(chart_core::Annotation {
                    time: annotation.time,
                    price: annotation.price,
                    text: annotation.text.clone(),
                    pane: annotation.pane,
                });
            }
            Command::FocusRange { range } => {
                state.visible_from = Some(range.from_time);
                state.visible_to = Some(range.to_time);
            }
            Command::ClearHighlights => {
                state.highlights.clear();
                state.annotations.clear();
            }
            Command::ClearIndicators => {
                state.indicators.clear();
            }
        }
        report.applied += 1;
    }

    /// Reload candles, preserving the previous series on failure and
    /// surfacing the error through `load_error` instead of propagating it.
    async fn reload(
        &self,
        state: &mut VisualizationState,
        request: &FetchRequest,
        report: &mut BatchReport,
    ) {
        state.is_loading = true;
        match self.source.fetch(request).await {
            Ok(candles) => {
                debug!(
                    symbol = %request.symbol,
                    timeframe = %request.timeframe,
                    count = candles.len(),
                    "candles reloaded"
                );
                state.candles = candles;
                state.load_error = None;
            }
            Err(err) => {
                warn!(symbol = %request.symbol, %err, "candle reload failed; keeping previous series");
                state.load_error = Some(err.to_string());
                report.fetch_failures += 1;
            }
        }
        state.is_loading = false;
    }
}

fn point_to_highlight(point: &PointSpec) -> HighlightPoint {
    HighlightPoint {
        time: point.time,
        price: point.price,
        pane: point.pane,
        label: point.label.clone(),
    }
}

/// A region is represented purely as its two boundary markers; there is no
/// first-class region shape downstream.
fn region_to_highlights(region: &RegionSpec) -> (HighlightPoint, HighlightPoint) {
    let labelled = |prefix: &str| {
        region
            .label
            .as_ref()
            .map(|label| format!("{prefix}: {label}"))
    };
    (
        HighlightPoint {
            time: region.from_time,
            price: None,
            pane: region.pane,
            label: labelled("Start"),
        },
        HighlightPoint {
            time: region.to_time,
            price: None,
            pane: region.pane,
            label: labelled("End"),
        },
    )
}

/// One chart session: engine + state behind a fair async lock.
///
/// Cross-batch policy is queueing: a batch submitted while another is in
/// flight waits for the lock in FIFO order. Nothing is cancelled or
/// interleaved, and every batch sees the state its predecessor left behind.
pub struct ChartSession<S> {
    engine: ExecutionEngine<S>,
    state: Mutex<VisualizationState>,
}

impl<S: CandleSource> ChartSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            engine: ExecutionEngine::new(source),
            state: Mutex::new(VisualizationState::default()),
        }
    }

    /// Validate and apply an untrusted batch.
    pub async fn submit(&self, batch: &[Value]) -> BatchReport {
        let mut state = self.state.lock().await;
        self.engine.apply_batch(&mut state, batch).await
    }

    /// Apply a pre-validated lesson.
    pub async fn run_lesson(&self, lesson: &LessonOption) -> BatchReport {
        debug!(lesson = %lesson.id, actions = lesson.actions.len(), "running lesson");
        let mut state = self.state.lock().await;
        self.engine.apply_commands(&mut state, &lesson.actions).await
    }

    /// Read-side copy for renderers.
    pub async fn snapshot(&self) -> VisualizationState {
        self.state.lock().await.clone()
    }
}
