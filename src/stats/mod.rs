//! Derived metrics for the summary cards and the composition chart.
//!
//! Pure functions of one [`CurrentStats`] snapshot.

use crate::core::CurrentStats;
use num_format::{Locale, ToFormattedString};

/// Share of cases assumed recovered when the source has no recovery count.
pub const ESTIMATED_RECOVERY_RATE: f64 = 0.97;

const COMPACT_UNITS: [(u64, &str); 4] = [
    (1_000, "K"),
    (1_000_000, "M"),
    (1_000_000_000, "B"),
    (1_000_000_000_000, "T"),
];

/// Recovery count together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovered {
    /// Reported by the statistics source
    Reported(u64),
    /// Heuristic `round(cases * 0.97)`; not a measured value
    Estimated(u64),
}

impl Recovered {
    /// The count regardless of origin.
    pub fn count(self) -> u64 {
        match self {
            Recovered::Reported(n) | Recovered::Estimated(n) => n,
        }
    }

    /// True for the heuristic fallback.
    pub fn is_estimate(self) -> bool {
        matches!(self, Recovered::Estimated(_))
    }
}

/// Recovered count, estimated as 97% of cases when the source reports none.
///
/// Upstream reports `0` for countries that stopped tracking recoveries, so
/// zero is treated like a missing field.
pub fn recovered(stats: &CurrentStats) -> Recovered {
    match stats.recovered {
        Some(n) if n > 0 => Recovered::Reported(n),
        _ => Recovered::Estimated(estimate_recovered(stats.cases)),
    }
}

/// `round(cases * 0.97)`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn estimate_recovered(cases: u64) -> u64 {
    (cases as f64 * ESTIMATED_RECOVERY_RATE).round() as u64
}

/// `value / total * 100` with two decimals, `"0.00%"` if either side is zero or absent.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_percentage(value: Option<u64>, total: Option<u64>) -> String {
    match (value, total) {
        (Some(v), Some(t)) if v > 0 && t > 0 => format!("{}%", to_fixed(v as f64 / t as f64 * 100.0, 2)),
        _ => "0.00%".to_string(),
    }
}

/// en-US compact notation with at most one fractional digit: `1.2M`, `950`, `12.3K`.
pub fn format_compact(value: Option<u64>) -> String {
    let n = match value {
        Some(n) if n > 0 => n,
        _ => return "0".to_string(),
    };

    if n < COMPACT_UNITS[0].0 {
        return n.to_string();
    }

    let mut idx = COMPACT_UNITS
        .iter()
        .rposition(|(unit, _)| n >= *unit)
        .unwrap_or(0);

    loop {
        let (unit, suffix) = COMPACT_UNITS[idx];
        let tenths = round_half_up(u128::from(n) * 10, u128::from(unit));
        // 999_950 rounds to 1000.0K; show it as 1M instead
        if tenths >= 10_000 && idx + 1 < COMPACT_UNITS.len() {
            idx += 1;
            continue;
        }
        let whole = tenths / 10;
        let frac = tenths % 10;
        return if frac == 0 {
            format!("{}{}", whole, suffix)
        } else {
            format!("{}.{}{}", whole, frac, suffix)
        };
    }
}

/// Thousands-separated integer: `1,234,567`. Absent → `"0"`.
pub fn format_grouped(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

/// Fixed-point text for a non-negative value, rounding the exact binary
/// value to nearest with exact ties going up: `to_fixed(0.125, 2)` is
/// `"0.13"`, `to_fixed(0.35, 1)` is `"0.3"` (0.35 is stored just below).
pub fn to_fixed(value: f64, digits: usize) -> String {
    let plain = format!("{:.*}", digits, value);
    if !value.is_finite() || value < 0.0 {
        return plain;
    }

    // `{:.N}` only differs on exact ties, which it sends to even.
    let wider = format!("{:.*}", digits + 1, value);
    if !wider.ends_with('5') {
        return plain;
    }
    let Ok(scaled) = wider.replace('.', "").parse::<u128>() else {
        return plain;
    };
    let Some(five_pow) = u32::try_from(digits + 1).ok().and_then(|exp| 5u128.checked_pow(exp)) else {
        return plain;
    };
    // Only dyadic decimals are exactly representable, and only then can
    // the parsed text equal the value bit for bit.
    let exact = scaled % five_pow == 0 && wider.parse::<f64>().is_ok_and(|w| w == value);
    if !exact {
        return plain;
    }

    let rounded = scaled / 10 + 1;
    if digits == 0 {
        return rounded.to_string();
    }
    let Some(unit) = u32::try_from(digits).ok().and_then(|exp| 10u128.checked_pow(exp)) else {
        return plain;
    };
    format!("{}.{:0width$}", rounded / unit, rounded % unit, width = digits)
}

#[inline]
fn round_half_up(numerator: u128, denominator: u128) -> u128 {
    (numerator + denominator / 2) / denominator
}

/// Which summary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// Total cases vs population
    Total,
    /// Recoveries vs cases
    Recovered,
    /// Deaths vs cases
    Deaths,
}

/// One summary card, fully formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    /// Card kind, drives colour
    pub kind: CardKind,
    /// Card title
    pub label: &'static str,
    /// Compact value, e.g. `103.4M`
    pub value: String,
    /// Percentage text, e.g. `30.53%`
    pub percentage: String,
    /// What the percentage is relative to
    pub percentage_label: &'static str,
    /// Value is the recovery heuristic, not a reported count
    pub estimated: bool,
}

/// The three summary cards: total cases, recoveries, deaths.
pub fn stat_cards(stats: &CurrentStats) -> [StatCard; 3] {
    let recovered = recovered(stats);
    let cases = Some(stats.cases);
    [
        StatCard {
            kind: CardKind::Total,
            label: "Total Cases",
            value: format_compact(cases),
            percentage: calculate_percentage(cases, stats.population),
            percentage_label: "of Population",
            estimated: false,
        },
        StatCard {
            kind: CardKind::Recovered,
            label: "Recoveries",
            value: format_compact(Some(recovered.count())),
            percentage: calculate_percentage(Some(recovered.count()), cases),
            percentage_label: "Recovery Rate",
            estimated: recovered.is_estimate(),
        },
        StatCard {
            kind: CardKind::Deaths,
            label: "Deaths",
            value: format_compact(Some(stats.deaths)),
            percentage: calculate_percentage(Some(stats.deaths), cases),
            percentage_label: "Mortality Rate",
            estimated: false,
        },
    ]
}

/// One doughnut slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Legend label
    pub label: &'static str,
    /// Raw count
    pub value: u64,
}

/// Doughnut slices in legend order: population, cases, recoveries, deaths.
pub fn composition(stats: &CurrentStats) -> [Slice; 4] {
    [
        Slice {
            label: "Total Population",
            value: stats.population.unwrap_or(0),
        },
        Slice {
            label: "Cases",
            value: stats.cases,
        },
        Slice {
            label: "Recoveries",
            value: recovered(stats).count(),
        },
        Slice {
            label: "Deaths",
            value: stats.deaths,
        },
    ]
}
