//! Historical series → chart-ready series.
//!
//! [`transform`] clamps the requested window to the dates actually present
//! in the fetched data, scales the cumulative counts to millions and finds
//! the peak. The output is rebuilt from scratch whenever the data or the
//! window changes; nothing here is patched in place.

pub mod range;

use crate::core::{DashError, HistoricalSeries, Result, SeriesKind};
use crate::stats;
use chrono::NaiveDate;
pub use range::{DateRange, RangeBound};

const MILLION: f64 = 1_000_000.0;

/// Headroom above the highest cases value on the Y axis.
const Y_AXIS_HEADROOM: f64 = 1.2;

/// The highest cases point in the effective window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPoint {
    /// Index into [`ChartSeries::dates`]
    pub index: usize,
    /// Cases in millions
    pub value: f64,
    /// Day of the peak
    pub date: NaiveDate,
}

impl PeakPoint {
    /// Value as shown on the chart, e.g. `"0.5"`.
    pub fn value_label(&self) -> String {
        stats::to_fixed(self.value, 1)
    }
}

/// Chart-ready series for one snapshot and one window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Days in ascending order
    pub dates: Vec<NaiveDate>,
    /// Cumulative cases in millions, parallel to `dates`
    pub cases_m: Vec<f64>,
    /// Cumulative deaths in millions, parallel to `dates`
    pub deaths_m: Vec<f64>,
    /// Cumulative recoveries in millions, parallel to `dates`
    pub recovered_m: Vec<f64>,
    /// Requested window intersected with the available data
    pub effective_start: NaiveDate,
    /// See `effective_start`
    pub effective_end: NaiveDate,
    /// `ceil(max cases * 1.2)`
    pub y_axis_max: f64,
    /// Tick spacing: 0.5 above one million, 0.2 otherwise
    pub step_size: f64,
    /// Highest cases point
    pub peak: PeakPoint,
}

/// Clamp, filter, scale and summarise a historical series for charting.
///
/// Fails with [`DashError::NoDataForRange`] when no case dates fall inside
/// the effective window, including when the series is empty.
pub fn transform(history: &HistoricalSeries, requested: &DateRange) -> Result<ChartSeries> {
    let no_data = || DashError::NoDataForRange {
        start: requested.start(),
        end: requested.end(),
    };

    if history.is_empty() {
        return Err(no_data());
    }
    let (earliest, latest) = history.available_range().ok_or_else(no_data)?;
    let effective_start = requested.start().max(earliest);
    let effective_end = requested.end().min(latest);

    // BTreeMap keys are already in calendar order.
    let dates: Vec<NaiveDate> = history
        .cases
        .range(effective_start..=effective_end.max(effective_start))
        .map(|(date, _)| *date)
        .filter(|date| *date <= effective_end)
        .collect();

    if dates.is_empty() {
        return Err(no_data());
    }

    let scaled = |kind: SeriesKind| -> Vec<f64> {
        dates
            .iter()
            .map(|date| to_millions(history.count(kind, *date)))
            .collect()
    };
    let cases_m = scaled(SeriesKind::Cases);
    let deaths_m = scaled(SeriesKind::Deaths);
    let recovered_m = scaled(SeriesKind::Recovered);

    let peak_index = peak_index(&cases_m).unwrap_or(0);
    let max_cases = cases_m[peak_index];
    let (y_axis_max, step_size) = y_axis(max_cases);

    tracing::debug!(
        "Transformed {} points for {} .. {} (peak {:.1}M)",
        dates.len(),
        effective_start,
        effective_end,
        max_cases
    );

    Ok(ChartSeries {
        peak: PeakPoint {
            index: peak_index,
            value: max_cases,
            date: dates[peak_index],
        },
        dates,
        cases_m,
        deaths_m,
        recovered_m,
        effective_start,
        effective_end,
        y_axis_max,
        step_size,
    })
}

/// Index of the largest value, first occurrence on ties.
pub fn peak_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, max)) if v <= max => {},
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Y-axis upper bound and tick step for a maximum cases value in millions.
pub fn y_axis(max_value: f64) -> (f64, f64) {
    let upper = (max_value * Y_AXIS_HEADROOM).ceil();
    let step = if upper > 1.0 { 0.5 } else { 0.2 };
    (upper, step)
}

#[inline]
fn to_millions(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    count / MILLION
}

impl ChartSeries {
    /// Values for one series kind.
    pub fn values(&self, kind: SeriesKind) -> &[f64] {
        match kind {
            SeriesKind::Cases => &self.cases_m,
            SeriesKind::Deaths => &self.deaths_m,
            SeriesKind::Recovered => &self.recovered_m,
        }
    }

    /// `(days since effective start, value)` pairs for plotting.
    pub fn points(&self, kind: SeriesKind) -> Vec<(f64, f64)> {
        self.dates
            .iter()
            .zip(self.values(kind))
            .map(|(date, value)| (self.x_of(*date), *value))
            .collect()
    }

    /// X coordinate of a date.
    #[allow(clippy::cast_precision_loss)]
    pub fn x_of(&self, date: NaiveDate) -> f64 {
        (date - self.effective_start).num_days() as f64
    }

    /// X-axis span in days.
    pub fn x_span(&self) -> f64 {
        self.x_of(self.effective_end).max(1.0)
    }

    /// Y-axis bound to draw with; an all-zero series still gets a unit axis.
    pub fn axis_upper(&self) -> f64 {
        if self.y_axis_max > 0.0 {
            self.y_axis_max
        } else {
            1.0
        }
    }

    /// Tick values from zero to the axis bound, thinned to `max_labels`.
    pub fn y_ticks(&self, max_labels: usize) -> Vec<f64> {
        let upper = self.axis_upper();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (upper / self.step_size).round() as usize;
        let all: Vec<f64> = (0..=count).map(|i| i as f64 * self.step_size).collect();
        if max_labels < 2 || all.len() <= max_labels {
            return all;
        }
        let stride = (all.len() - 1).div_ceil(max_labels - 1);
        let mut thinned: Vec<f64> = all.iter().copied().step_by(stride).collect();
        if thinned.last().copied() != all.last().copied() {
            if let Some(last) = all.last() {
                thinned.push(*last);
            }
        }
        thinned
    }
}
