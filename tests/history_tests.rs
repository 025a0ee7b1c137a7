// HistoryBuffer: bounded FIFO series, invalid-value rejection, reset, trend check

use hostpulse::history::{HistoryBuffer, HistoryPoint, HistorySeries};
use hostpulse::models::MetricSample;

fn points(buffer: &HistoryBuffer, name: &str) -> Vec<(u64, f64)> {
    buffer
        .series_for(name)
        .map(|s| s.points().map(|p| (p.timestamp, p.value)).collect())
        .unwrap_or_default()
}

#[test]
fn capacity_three_keeps_last_three_of_five() {
    let mut buffer = HistoryBuffer::new(3);
    for (t, v) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0), (5, 50.0)] {
        assert!(buffer.append("cpu.usage", t, v));
    }
    assert_eq!(
        points(&buffer, "cpu.usage"),
        vec![(3, 30.0), (4, 40.0), (5, 50.0)]
    );
}

#[test]
fn length_never_exceeds_capacity() {
    let mut buffer = HistoryBuffer::new(4);
    for t in 0..50u64 {
        buffer.append("s", t, t as f64);
        let len = buffer.series_for("s").map(HistorySeries::len).unwrap_or(0);
        assert!(len <= 4, "len {} after append {}", len, t);
    }
    let kept: Vec<u64> = points(&buffer, "s").iter().map(|p| p.0).collect();
    assert_eq!(kept, vec![46, 47, 48, 49]);
}

#[test]
fn one_past_capacity_drops_only_the_first_point() {
    let cap = 5;
    let mut buffer = HistoryBuffer::new(cap);
    for t in 1..=(cap as u64 + 1) {
        buffer.append("s", t, t as f64 * 1.5);
    }
    let ts: Vec<u64> = points(&buffer, "s").iter().map(|p| p.0).collect();
    assert_eq!(ts, vec![2, 3, 4, 5, 6]);
}

#[test]
fn non_finite_values_are_rejected_without_mutation() {
    let mut buffer = HistoryBuffer::new(3);
    buffer.append("s", 1, 1.0);
    assert!(!buffer.append("s", 2, f64::NAN));
    assert!(!buffer.append("s", 3, f64::INFINITY));
    assert!(!buffer.append("s", 4, f64::NEG_INFINITY));
    assert_eq!(points(&buffer, "s"), vec![(1, 1.0)]);
}

#[test]
fn rejected_first_value_does_not_create_a_series() {
    let mut buffer = HistoryBuffer::new(3);
    assert!(!buffer.append("s", 1, f64::NAN));
    assert!(buffer.series_for("s").is_none());
}

#[test]
fn older_timestamp_is_rejected() {
    let mut buffer = HistoryBuffer::new(3);
    buffer.append("s", 10, 1.0);
    assert!(!buffer.append("s", 9, 2.0));
    assert!(buffer.append("s", 10, 3.0));
    assert_eq!(points(&buffer, "s"), vec![(10, 1.0), (10, 3.0)]);
}

#[test]
fn reset_clears_points_but_keeps_capacity() {
    let mut buffer = HistoryBuffer::new(2);
    buffer.append("a", 1, 1.0);
    buffer.append("b", 1, 2.0);
    buffer.reset();
    assert_eq!(buffer.capacity(), 2);
    assert!(buffer.series_for("a").is_some_and(HistorySeries::is_empty));
    for t in 2..6 {
        buffer.append("a", t, t as f64);
    }
    assert_eq!(points(&buffer, "a"), vec![(4, 4.0), (5, 5.0)]);
}

#[test]
fn zero_capacity_is_clamped_to_one() {
    let mut buffer = HistoryBuffer::new(0);
    buffer.append("s", 1, 1.0);
    buffer.append("s", 2, 2.0);
    assert_eq!(points(&buffer, "s"), vec![(2, 2.0)]);
}

#[test]
fn append_sample_skips_untracked_and_missing_fields() {
    let mut b = MetricSample::builder(7);
    b.push("tracked", 1.0)
        .push("other", 2.0)
        .push("bad", f64::NAN);
    let (sample, _) = b.build();

    let mut buffer = HistoryBuffer::new(10);
    let added = buffer.append_sample(&sample, &["tracked", "bad", "absent"]);
    assert_eq!(added, 1);
    assert_eq!(buffer.series_names().collect::<Vec<_>>(), vec!["tracked"]);
    assert_eq!(
        buffer.snapshot().get("tracked"),
        Some(&vec![HistoryPoint {
            timestamp: 7,
            value: 1.0
        }])
    );
}

#[test]
fn strictly_increasing_needs_more_points_than_window() {
    let mut series = HistorySeries::new(100);
    for t in 0..10u64 {
        series.append(t, t as f64);
    }
    assert!(!series.is_strictly_increasing(10));
    series.append(10, 10.0);
    assert!(series.is_strictly_increasing(10));
}

#[test]
fn strictly_increasing_only_looks_inside_the_window() {
    let mut series = HistorySeries::new(100);
    // Older drop outside the window does not matter
    series.append(0, 50.0);
    series.append(1, 1.0);
    for t in 2..12u64 {
        series.append(t, t as f64);
    }
    assert!(series.is_strictly_increasing(10));

    // A flat step inside the window breaks the trend
    series.append(12, 11.0);
    assert!(!series.is_strictly_increasing(10));
}
