use candle_feed::SyntheticSource;
use command_engine::{build_view, find_lesson, ChartSession};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replays a built-in lesson and a half-invalid untrusted batch against a
/// synthetic candle source, then prints the resulting state and view.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let session = ChartSession::new(SyntheticSource::default());

    let lesson = find_lesson("macd-momentum").expect("built-in lesson");
    tracing::info!(lesson = %lesson.id, "running lesson");
    let report = session.run_lesson(&lesson).await;
    tracing::info!(applied = report.applied, "lesson applied");

    // An untrusted batch the way a flaky generator might produce it: two
    // valid commands around one reject.
    let batch = vec![
        json!({"type": "SET_TIMEFRAME", "timeframe": "4h"}),
        json!({"type": "ADD_INDICATOR", "indicator": "OBV"}),
        json!({
            "type": "HIGHLIGHT_REGION",
            "region": {"fromTime": 1_699_000_000, "toTime": 1_699_900_000, "label": "setup"}
        }),
    ];
    let report = session.submit(&batch).await;
    tracing::info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        "untrusted batch applied"
    );
    for rejection in &report.rejected {
        tracing::warn!(index = rejection.index, reason = %rejection.reason, "dropped");
    }

    let state = session.snapshot().await;
    println!("{}", serde_json::to_string_pretty(&state)?);
    println!("{}", serde_json::to_string_pretty(&build_view(&state))?);
    Ok(())
}
