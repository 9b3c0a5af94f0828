//! Colours, the doughnut geometry and small layout helpers.

use crate::stats::{CardKind, Slice};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Palette shared by cards, lines and slices.
pub mod colors {
    use ratatui::style::Color;

    pub const CASES: Color = Color::Rgb(129, 140, 248);
    pub const DEATHS: Color = Color::Rgb(248, 113, 113);
    pub const RECOVERED: Color = Color::Rgb(74, 222, 128);
    pub const POPULATION: Color = Color::Rgb(250, 204, 21);
    pub const MUTED: Color = Color::Rgb(107, 114, 128);
    pub const BORDER: Color = Color::Rgb(75, 85, 99);
    pub const TEXT: Color = Color::Rgb(243, 244, 246);
    pub const ERROR: Color = Color::Rgb(220, 38, 38);
}

/// Card accent colour.
pub fn card_color(kind: CardKind) -> Color {
    match kind {
        CardKind::Total => colors::CASES,
        CardKind::Recovered => colors::RECOVERED,
        CardKind::Deaths => colors::DEATHS,
    }
}

/// Slice colours in composition order: population, cases, recoveries, deaths.
pub const SLICE_COLORS: [Color; 4] = [colors::POPULATION, colors::CASES, colors::RECOVERED, colors::DEATHS];

/// Inner radius of the ring as a share of the outer radius.
pub const DOUGHNUT_CUTOUT: f64 = 0.65;

/// Angular extent of each slice, clockwise from twelve o'clock.
///
/// Returns `(start, end)` angles in radians in the usual maths orientation
/// (counter-clockwise from three o'clock); empty slices get `start == end`.
pub fn slice_angles(slices: &[Slice]) -> Vec<(f64, f64)> {
    #[allow(clippy::cast_precision_loss)]
    let total: f64 = slices.iter().map(|s| s.value as f64).sum();
    let mut cursor = FRAC_PI_2;
    slices
        .iter()
        .map(|s| {
            #[allow(clippy::cast_precision_loss)]
            let sweep = if total > 0.0 { s.value as f64 / total * TAU } else { 0.0 };
            let start = cursor;
            cursor -= sweep;
            (start, cursor)
        })
        .collect()
}

/// Canvas points filling each slice of the ring, `rings` concentric
/// circles from the cutout to the outer edge, `samples` points per turn.
pub fn doughnut_points(slices: &[Slice], rings: usize, samples: usize) -> Vec<Vec<(f64, f64)>> {
    slice_angles(slices)
        .into_iter()
        .map(|(start, end)| {
            let sweep = start - end;
            if sweep <= 0.0 {
                return Vec::new();
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let steps = ((sweep / TAU) * samples as f64).ceil().max(1.0) as usize;
            let mut points = Vec::with_capacity(steps * rings.max(1));
            for ring in 0..rings.max(1) {
                #[allow(clippy::cast_precision_loss)]
                let radius = DOUGHNUT_CUTOUT + (1.0 - DOUGHNUT_CUTOUT) * ring as f64 / rings.max(2).saturating_sub(1) as f64;
                for step in 0..=steps {
                    #[allow(clippy::cast_precision_loss)]
                    let angle = start - sweep * step as f64 / steps as f64;
                    points.push((radius * angle.cos(), radius * angle.sin()));
                }
            }
            points
        })
        .collect()
}

/// Rectangle of `percent_x` by `height` rows centred in `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x.min(100)) / 2),
            Constraint::Percentage(percent_x.min(100)),
            Constraint::Percentage((100 - percent_x.min(100)) / 2),
        ])
        .split(vertical[1])[1]
}
