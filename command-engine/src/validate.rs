use chart_core::{Pane, TimeFrame, Timestamp};
use indicator_engine::IndicatorKind;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::command::{AnnotationSpec, Command, PointSpec, RangeSpec, RegionSpec};

/// Why a raw command was rejected. Rejections drop the single offending
/// command; they never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("command is not an object with a string `type` field")]
    MissingType,
    #[error("unknown command type `{0}`")]
    UnknownType(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
    #[error("field `{0}` must be a finite number")]
    NonFinite(&'static str),
    #[error("field `{0}` has out-of-set value `{1}`")]
    OutOfSet(&'static str, String),
    #[error("field `{0}` must not be empty")]
    EmptyValue(&'static str),
}

/// The sole trust boundary: turn one arbitrary JSON value into a typed
/// command, or reject it. Unknown extra fields are ignored; everything else
/// fails closed.
pub fn validate(value: &Value) -> Result<Command, RejectReason> {
    let obj = value.as_object().ok_or(RejectReason::MissingType)?;
    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(RejectReason::MissingType)?;

    match tag {
        "SET_SYMBOL" => Ok(Command::SetSymbol {
            symbol: req_symbol(obj, "symbol")?,
        }),
        "SET_TIMEFRAME" => {
            let raw = req_str(obj, "timeframe")?;
            let timeframe: TimeFrame = raw
                .parse()
                .map_err(|_| RejectReason::OutOfSet("timeframe", raw.to_string()))?;
            Ok(Command::SetTimeframe { timeframe })
        }
        "LOAD_CANDLES" => Ok(Command::LoadCandles {
            symbol: req_symbol(obj, "symbol")?,
            // Forwarded opaquely to the fetch collaborator; not restricted
            // to the SET_TIMEFRAME value set.
            timeframe: nonempty(req_str(obj, "timeframe")?, "timeframe")?,
            from: opt_time(obj, "from")?,
            to: opt_time(obj, "to")?,
        }),
        "ADD_INDICATOR" => Ok(Command::AddIndicator {
            indicator: req_indicator(obj)?,
            params: match field(obj, "params") {
                None => None,
                Some(v) => Some(params_map(v)?),
            },
        }),
        "UPDATE_INDICATOR_PARAMS" => Ok(Command::UpdateIndicatorParams {
            indicator: req_indicator(obj)?,
            params: params_map(req_field(obj, "params")?)?,
        }),
        "HIGHLIGHT_POINTS" => {
            let raw = req_field(obj, "points")?
                .as_array()
                .ok_or(RejectReason::WrongType("points"))?;
            let points = raw.iter().map(point).collect::<Result<Vec<_>, _>>()?;
            Ok(Command::HighlightPoints { points })
        }
        "HIGHLIGHT_REGION" => {
            let region = req_field(obj, "region")?
                .as_object()
                .ok_or(RejectReason::WrongType("region"))?;
            Ok(Command::HighlightRegion {
                region: RegionSpec {
                    from_time: req_time(region, "fromTime")?,
                    to_time: req_time(region, "toTime")?,
                    pane: opt_pane(region)?,
                    label: opt_string(region, "label")?,
                },
            })
        }
        "ADD_ANNOTATION" => {
            let ann = req_field(obj, "annotation")?
                .as_object()
                .ok_or(RejectReason::WrongType("annotation"))?;
            Ok(Command::AddAnnotation {
                annotation: AnnotationSpec {
                    time: req_time(ann, "time")?,
                    price: opt_num(ann, "price")?,
                    text: nonempty(req_str(ann, "text")?, "text")?,
                    pane: opt_pane(ann)?,
                },
            })
        }
        "FOCUS_RANGE" => {
            let range = req_field(obj, "range")?
                .as_object()
                .ok_or(RejectReason::WrongType("range"))?;
            Ok(Command::FocusRange {
                range: RangeSpec {
                    from_time: req_time(range, "fromTime")?,
                    to_time: req_time(range, "toTime")?,
                },
            })
        }
        "CLEAR_HIGHLIGHTS" => Ok(Command::ClearHighlights),
        "CLEAR_INDICATORS" => Ok(Command::ClearIndicators),
        other => Err(RejectReason::UnknownType(other.to_string())),
    }
}

// ---------- field extraction helpers -----------------------------------------

/// `null` counts as absent everywhere.
fn field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Option<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

fn req_field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, RejectReason> {
    field(obj, key).ok_or(RejectReason::MissingField(key))
}

fn req_str<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, RejectReason> {
    req_field(obj, key)?
        .as_str()
        .ok_or(RejectReason::WrongType(key))
}

fn nonempty(s: &str, key: &'static str) -> Result<String, RejectReason> {
    if s.trim().is_empty() {
        Err(RejectReason::EmptyValue(key))
    } else {
        Ok(s.to_string())
    }
}

fn req_symbol(obj: &Map<String, Value>, key: &'static str) -> Result<String, RejectReason> {
    nonempty(req_str(obj, key)?, key)
}

fn finite(value: &Value, key: &'static str) -> Result<f64, RejectReason> {
    let n = value.as_f64().ok_or(RejectReason::WrongType(key))?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(RejectReason::NonFinite(key))
    }
}

fn req_time(obj: &Map<String, Value>, key: &'static str) -> Result<Timestamp, RejectReason> {
    Ok(finite(req_field(obj, key)?, key)? as Timestamp)
}

fn opt_time(obj: &Map<String, Value>, key: &'static str) -> Result<Option<Timestamp>, RejectReason> {
    match field(obj, key) {
        None => Ok(None),
        Some(v) => Ok(Some(finite(v, key)? as Timestamp)),
    }
}

fn opt_num(obj: &Map<String, Value>, key: &'static str) -> Result<Option<f64>, RejectReason> {
    match field(obj, key) {
        None => Ok(None),
        Some(v) => Ok(Some(finite(v, key)?)),
    }
}

fn opt_string(obj: &Map<String, Value>, key: &'static str) -> Result<Option<String>, RejectReason> {
    match field(obj, key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or(RejectReason::WrongType(key)),
    }
}

fn opt_pane(obj: &Map<String, Value>) -> Result<Option<Pane>, RejectReason> {
    match field(obj, "pane") {
        None => Ok(None),
        Some(v) => {
            let raw = v.as_str().ok_or(RejectReason::WrongType("pane"))?;
            raw.parse()
                .map(Some)
                .map_err(|_| RejectReason::OutOfSet("pane", raw.to_string()))
        }
    }
}

fn req_indicator(obj: &Map<String, Value>) -> Result<IndicatorKind, RejectReason> {
    let raw = req_str(obj, "indicator")?;
    raw.parse()
        .map_err(|_| RejectReason::OutOfSet("indicator", raw.to_string()))
}

fn params_map(value: &Value) -> Result<BTreeMap<String, f64>, RejectReason> {
    let obj = value.as_object().ok_or(RejectReason::WrongType("params"))?;
    let mut out = BTreeMap::new();
    for (key, v) in obj {
        out.insert(key.clone(), finite(v, "params")?);
    }
    Ok(out)
}

fn point(value: &Value) -> Result<PointSpec, RejectReason> {
    let obj = value.as_object().ok_or(RejectReason::WrongType("points"))?;
    Ok(PointSpec {
        time: req_time(obj, "time")?,
        price: opt_num(obj, "price")?,
        pane: opt_pane(obj)?,
        label: opt_string(obj, "label")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_every_wire_variant() {
        let batch = vec![
            json!({"type": "SET_SYMBOL", "symbol": "ETHUSDT"}),
            json!({"type": "SET_TIMEFRAME", "timeframe": "4h"}),
            json!({"type": "LOAD_CANDLES", "symbol": "BTCUSDT", "timeframe": "15m", "from": 100, "to": 200}),
            json!({"type": "ADD_INDICATOR", "indicator": "MACD"}),
            json!({"type": "ADD_INDICATOR", "indicator": "EMA", "params": {"period": 50}}),
            json!({"type": "UPDATE_INDICATOR_PARAMS", "indicator": "RSI", "params": {"period": 7}}),
            json!({"type": "HIGHLIGHT_POINTS", "points": [{"time": 100, "price": 1.5, "pane": "price", "label": "entry"}]}),
            json!({"type": "HIGHLIGHT_REGION", "region": {"fromTime": 100, "toTime": 200, "label": "squeeze"}}),
            json!({"type": "ADD_ANNOTATION", "annotation": {"time": 100, "text": "note", "pane": "indicator"}}),
            json!({"type": "FOCUS_RANGE", "range": {"fromTime": 100, "toTime": 200}}),
            json!({"type": "CLEAR_HIGHLIGHTS"}),
            json!({"type": "CLEAR_INDICATORS"}),
        ];
        for raw in batch {
            assert!(validate(&raw).is_ok(), "rejected: {raw}");
        }
    }

    #[test]
    fn rejects_missing_or_unknown_type() {
        assert_eq!(validate(&json!({"symbol": "X"})), Err(RejectReason::MissingType));
        assert_eq!(validate(&json!(42)), Err(RejectReason::MissingType));
        assert_eq!(validate(&json!({"type": 7})), Err(RejectReason::MissingType));
        assert_eq!(
            validate(&json!({"type": "DROP_TABLES"})),
            Err(RejectReason::UnknownType("DROP_TABLES".into()))
        );
    }

    #[test]
    fn rejects_out_of_set_enums() {
        assert_eq!(
            validate(&json!({"type": "SET_TIMEFRAME", "timeframe": "5m"})),
            Err(RejectReason::OutOfSet("timeframe", "5m".into()))
        );
        assert_eq!(
            validate(&json!({"type": "ADD_INDICATOR", "indicator": "VWAP"})),
            Err(RejectReason::OutOfSet("indicator", "VWAP".into()))
        );
        assert_eq!(
            validate(&json!({
                "type": "HIGHLIGHT_POINTS",
                "points": [{"time": 1, "pane": "overlay"}]
            })),
            Err(RejectReason::OutOfSet("pane", "overlay".into()))
        );
    }

    #[test]
    fn rejects_wrong_types_and_missing_fields() {
        assert_eq!(
            validate(&json!({"type": "SET_SYMBOL"})),
            Err(RejectReason::MissingField("symbol"))
        );
        assert_eq!(
            validate(&json!({"type": "SET_SYMBOL", "symbol": 42})),
            Err(RejectReason::WrongType("symbol"))
        );
        assert_eq!(
            validate(&json!({"type": "SET_SYMBOL", "symbol": "  "})),
            Err(RejectReason::EmptyValue("symbol"))
        );
        assert_eq!(
            validate(&json!({"type": "FOCUS_RANGE", "range": {"fromTime": 100}})),
            Err(RejectReason::MissingField("toTime"))
        );
        assert_eq!(
            validate(&json!({"type": "ADD_ANNOTATION", "annotation": {"time": 1}})),
            Err(RejectReason::MissingField("text"))
        );
    }

    #[test]
    fn rejects_non_numeric_params() {
        assert_eq!(
            validate(&json!({
                "type": "UPDATE_INDICATOR_PARAMS",
                "indicator": "EMA",
                "params": {"period": "fast"}
            })),
            Err(RejectReason::WrongType("params"))
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let cmd = validate(&json!({
            "type": "LOAD_CANDLES",
            "symbol": "BTCUSDT",
            "timeframe": "1d",
            "from": null
        }))
        .unwrap();
        assert_eq!(
            cmd,
            Command::LoadCandles {
                symbol: "BTCUSDT".into(),
                timeframe: "1d".into(),
                from: None,
                to: None
            }
        );
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let cmd = validate(&json!({
            "type": "SET_SYMBOL",
            "symbol": "BTCUSDT",
            "callback": "javascript:alert(1)",
            "nested": {"anything": [1, 2, 3]}
        }))
        .unwrap();
        assert_eq!(
            cmd,
            Command::SetSymbol {
                symbol: "BTCUSDT".into()
            }
        );
    }

    #[test]
    fn fractional_timestamps_truncate_to_seconds() {
        let cmd = validate(&json!({
            "type": "FOCUS_RANGE",
            "range": {"fromTime": 100.9, "toTime": 200.2}
        }))
        .unwrap();
        assert_eq!(
            cmd,
            Command::FocusRange {
                range: RangeSpec {
                    from_time: 100,
                    to_time: 200
                }
            }
        );
    }
}
