//! Date range and chart series behaviour.

mod common;

use common::date;
use pandash_lib::core::{CurrentStats, DashError, HistoricalSeries};
use pandash_lib::series::{self, DateRange, RangeBound};
use pandash_lib::stats;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn daily(start_day: u32, values: &[u64]) -> HashMap<String, u64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("1/{}/21", start_day + i as u32), *v))
        .collect()
}

fn history(cases: &[u64]) -> HistoricalSeries {
    HistoricalSeries::from_raw(&daily(1, cases), &HashMap::new(), &HashMap::new())
}

#[test]
fn test_start_after_end_leaves_range_unchanged() {
    let today = date(2023, 6, 1);
    let mut range = DateRange::new(date(2021, 1, 1), date(2021, 6, 1), today).unwrap();

    assert!(!range.set(RangeBound::Start, date(2021, 7, 1), today));
    assert_eq!((range.start(), range.end()), (date(2021, 1, 1), date(2021, 6, 1)));
}

#[test]
fn test_future_edit_leaves_range_unchanged() {
    let today = date(2023, 6, 1);
    let mut range = DateRange::new(date(2021, 1, 1), date(2021, 6, 1), today).unwrap();

    assert!(!range.set(RangeBound::End, date(2023, 6, 2), today));
    assert!(!range.shift_months(RangeBound::End, 30, today));
    assert_eq!(range.end(), date(2021, 6, 1));
}

#[test]
fn test_requested_window_clamps_to_data() {
    let series = history(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    let range = DateRange::new(date(2020, 1, 1), date(2022, 1, 1), date(2023, 1, 1)).unwrap();

    let chart = series::transform(&series, &range).unwrap();
    assert_eq!(chart.effective_start, date(2021, 1, 1));
    assert_eq!(chart.effective_end, date(2021, 1, 10));
    assert_eq!(chart.dates.len(), 10);
}

#[test]
fn test_window_outside_data_is_no_data() {
    let series = history(&[1, 2, 3]);
    let range = DateRange::new(date(2022, 1, 1), date(2022, 2, 1), date(2023, 1, 1)).unwrap();

    let err = series::transform(&series, &range).unwrap_err();
    assert!(matches!(err, DashError::NoDataForRange { .. }));
    assert_eq!(
        err.user_message(),
        "No data available for the selected date range. Please select a different range."
    );
}

#[test]
fn test_peak_in_millions() {
    let series = history(&[100_000, 500_000, 300_000]);
    let range = DateRange::new(date(2021, 1, 1), date(2021, 1, 3), date(2023, 1, 1)).unwrap();

    let chart = series::transform(&series, &range).unwrap();
    assert_eq!(chart.cases_m, vec![0.1, 0.5, 0.3]);
    assert_eq!(chart.peak.index, 1);
    assert_eq!(chart.peak.value_label(), "0.5");
    assert_eq!(chart.peak.date, date(2021, 1, 2));
}

#[test]
fn test_y_axis_rules() {
    assert_eq!(series::y_axis(0.83), (1.0, 0.2));
    assert_eq!(series::y_axis(5.2), (7.0, 0.5));
}

#[test]
fn test_percentages_and_estimate() {
    assert_eq!(stats::calculate_percentage(Some(0), Some(100)), "0.00%");
    assert_eq!(stats::calculate_percentage(Some(50), Some(200)), "25.00%");

    let only_cases = CurrentStats {
        cases: 1000,
        ..CurrentStats::default()
    };
    assert_eq!(stats::recovered(&only_cases).count(), 970);
    assert!(stats::stat_cards(&only_cases)[1].estimated);
}

#[test]
fn test_peak_label_matches_fixed_point_rounding() {
    let label = |cases: u64| {
        let range = DateRange::new(date(2021, 1, 1), date(2021, 1, 1), date(2023, 1, 1)).unwrap();
        series::transform(&history(&[cases]), &range).unwrap().peak.value_label()
    };

    assert_eq!(label(350_000), "0.3");
    assert_eq!(label(150_000), "0.1");
    assert_eq!(label(2_650_000), "2.6");
    assert_eq!(label(250_000), "0.3");
}

#[test]
fn test_percentage_ties_round_up() {
    assert_eq!(stats::calculate_percentage(Some(1), Some(800)), "0.13%");
    assert_eq!(stats::calculate_percentage(Some(5), Some(800)), "0.63%");
    assert_eq!(stats::format_grouped(Some(125_584_838)), "125,584,838");
}
