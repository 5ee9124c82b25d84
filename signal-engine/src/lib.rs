use chart_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Direction of a crossing between two series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossDirection {
    Bullish,
    Bearish,
}

/// A discrete crossing, stamped with the time of the sample that completed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossEvent {
    pub time: Timestamp,
    pub direction: CrossDirection,
}

/// Detect crossings of series `a` over/under series `b`.
///
/// A transition is classified on the adjacent pair `(i-1, i)`: inclusive
/// comparison on the previous sample, strict on the current one. Bullish when
/// `prev_a <= prev_b` and `cur_a > cur_b`; bearish when `prev_a >= prev_b`
/// and `cur_a < cur_b`. Any pair touching an undefined (`None`) sample is
/// skipped, never treated as a crossing. At most one event per transition,
/// output in time order.
pub fn crossovers(
    a: &[Option<f64>],
    b: &[Option<f64>],
    times: &[Timestamp],
) -> Vec<CrossEvent> {
    let len = a.len().min(b.len()).min(times.len());
    let mut out = Vec::new();
    for i in 1..len {
        if let (Some(pa), Some(pb), Some(ca), Some(cb)) = (a[i - 1], b[i - 1], a[i], b[i]) {
            if pa <= pb && ca > cb {
                out.push(CrossEvent {
                    time: times[i],
                    direction: CrossDirection::Bullish,
                });
            } else if pa >= pb && ca < cb {
                out.push(CrossEvent {
                    time: times[i],
                    direction: CrossDirection::Bearish,
                });
            }
        }
    }
    out
}

/// Crossings of a series through the zero line: the same algorithm with the
/// second series replaced by the constant `0`.
pub fn zero_crossings(series: &[Option<f64>], times: &[Timestamp]) -> Vec<CrossEvent> {
    let zero = vec![Some(0.0); series.len()];
    crossovers(series, &zero, times)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn detects_bullish_and_bearish_crossings() {
        let a = seq(&[1.0, 3.0, 3.0, 1.0]);
        let b = seq(&[2.0, 2.0, 2.0, 2.0]);
        let times = vec![10, 20, 30, 40];
        let events = crossovers(&a, &b, &times);
        assert_eq!(
            events,
            vec![
                CrossEvent {
                    time: 20,
                    direction: CrossDirection::Bullish
                },
                CrossEvent {
                    time: 40,
                    direction: CrossDirection::Bearish
                },
            ]
        );
    }

    #[test]
    fn touch_then_break_counts_once() {
        // prev samples equal: inclusive comparison admits the crossing.
        let a = seq(&[2.0, 3.0]);
        let b = seq(&[2.0, 2.0]);
        let events = crossovers(&a, &b, &[1, 2]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, CrossDirection::Bullish);
    }

    #[test]
    fn equal_current_samples_are_not_a_crossing() {
        let a = seq(&[1.0, 2.0]);
        let b = seq(&[2.0, 2.0]);
        assert!(crossovers(&a, &b, &[1, 2]).is_empty());
    }

    #[test]
    fn undefined_samples_never_produce_events() {
        let a = vec![None, Some(3.0), Some(1.0), None];
        let b = seq(&[2.0, 2.0, 2.0, 2.0]);
        let times = vec![1, 2, 3, 4];
        // (0,1) and (3,4) touch None; only (1,2) is classified.
        let events = crossovers(&a, &b, &times);
        assert_eq!(
            events,
            vec![CrossEvent {
                time: 3,
                direction: CrossDirection::Bearish
            }]
        );
    }

    #[test]
    fn events_come_out_in_time_order() {
        let a = seq(&[1.0, 3.0, 1.0, 3.0, 1.0]);
        let b = seq(&[2.0; 5]);
        let times = vec![1, 2, 3, 4, 5];
        let events = crossovers(&a, &b, &times);
        assert_eq!(events.len(), 4);
        assert!(events.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn zero_line_matches_constant_comparison() {
        let series = seq(&[-1.0, 1.0, -0.5]);
        let times = vec![1, 2, 3];
        let events = zero_crossings(&series, &times);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].direction, CrossDirection::Bullish);
        assert_eq!(events[1].direction, CrossDirection::Bearish);
    }
}
