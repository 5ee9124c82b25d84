use chart_core::TimeFrame;
use indicator_engine::IndicatorKind;
use std::collections::BTreeMap;

use crate::command::{Command, LessonOption};

/// Built-in lesson library: named, pre-validated batches a user can trigger
/// with a single gesture.
pub fn builtin_lessons() -> Vec<LessonOption> {
    vec![ema_trend(), macd_momentum(), rsi_swings()]
}

pub fn find_lesson(id: &str) -> Option<LessonOption> {
    builtin_lessons().into_iter().find(|l| l.id == id)
}

fn ema_trend() -> LessonOption {
    LessonOption {
        id: "ema-trend".to_string(),
        title: "Trend with a single EMA".to_string(),
        description: Some(
            "A 20-period exponential average on the daily chart; price holding above it \
             suggests an uptrend."
                .to_string(),
        ),
        actions: vec![
            Command::SetTimeframe {
                timeframe: TimeFrame::D1,
            },
            Command::ClearIndicators,
            Command::AddIndicator {
                indicator: IndicatorKind::Ema,
                params: None,
            },
        ],
    }
}

fn macd_momentum() -> LessonOption {
    let mut faster = BTreeMap::new();
    faster.insert("fast".to_string(), 8.0);
    faster.insert("slow".to_string(), 21.0);
    faster.insert("signal".to_string(), 5.0);
    LessonOption {
        id: "macd-momentum".to_string(),
        title: "MACD momentum shifts".to_string(),
        description: Some(
            "Standard MACD first, then a faster parameter set to show how sensitivity \
             changes the crossings."
                .to_string(),
        ),
        actions: vec![
            Command::ClearIndicators,
            Command::AddIndicator {
                indicator: IndicatorKind::Macd,
                params: None,
            },
            Command::UpdateIndicatorParams {
                indicator: IndicatorKind::Macd,
                params: faster,
            },
        ],
    }
}

fn rsi_swings() -> LessonOption {
    let mut params = BTreeMap::new();
    params.insert("period".to_string(), 7.0);
    LessonOption {
        id: "rsi-swings".to_string(),
        title: "Short RSI swings".to_string(),
        description: Some("A 7-period RSI reacts quickly to overbought and oversold turns.".to_string()),
        actions: vec![
            Command::ClearHighlights,
            Command::ClearIndicators,
            Command::AddIndicator {
                indicator: IndicatorKind::Rsi,
                params: Some(params),
            },
        ],
    }
}
