//! Dashboard drawing.
//!
//! Stateless apart from recording where the date picker landed, so mouse
//! clicks can be tested against it.

use super::state::{CatalogState, DashboardState, Overlay, Phase, SELECTOR_PAGE};
use super::widgets::{self, card_color, colors, centered_rect, SLICE_COLORS};
use crate::core::{CountrySnapshot, SeriesKind};
use crate::series::{ChartSeries, RangeBound};
use crate::stats::{self, format_grouped, StatCard};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Axis, Block, BorderType, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Wrap,
    },
    Frame,
};

/// Draw the whole screen.
pub fn draw(frame: &mut Frame, state: &mut DashboardState) {
    let area = frame.area();

    if let Phase::Failed(message) = state.phase() {
        draw_error_view(frame, area, message);
        state.set_picker_area(None);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Length(5), // Stat cards
            Constraint::Min(12),   // Charts
            Constraint::Length(2), // Footer
        ])
        .split(area);

    draw_header(frame, chunks[0], state);

    match state.phase() {
        Phase::Ready { snapshot, chart } => {
            draw_cards(frame, chunks[1], snapshot);
            draw_charts(frame, chunks[2], snapshot, chart);
        },
        _ => {
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(colors::MUTED));
            frame.render_widget(loading, chunks[1]);
        },
    }

    draw_footer(frame, chunks[3]);

    let picker_area = match state.overlay().clone() {
        Overlay::DatePicker { field } => {
            let popup = picker_rect(chunks[0], area);
            draw_date_picker(frame, popup, state, field);
            Some(popup)
        },
        Overlay::Selector { query, cursor } => {
            draw_selector(frame, area, state, &query, cursor);
            None
        },
        Overlay::None => None,
    };
    state.set_picker_area(picker_area);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let status = match state.phase() {
        Phase::Loading => Span::styled(" loading ", Style::default().fg(colors::POPULATION)),
        _ => Span::raw(""),
    };

    let updated = match state.phase() {
        Phase::Ready { snapshot, .. } => snapshot
            .stats
            .updated
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
            .map(|t| format!("  |  Updated {}", t.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_default(),
        _ => String::new(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                " COVID-19 and Population Dashboard ",
                Style::default().fg(colors::TEXT).add_modifier(Modifier::BOLD),
            ),
            status,
        ]),
        Line::from(vec![
            Span::styled(" Country: ", Style::default().fg(colors::MUTED)),
            Span::styled(
                state.country_label(),
                Style::default().fg(colors::CASES).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  |  Date Range: ", Style::default().fg(colors::MUTED)),
            Span::styled(state.range().to_string(), Style::default().fg(colors::TEXT)),
            Span::styled(updated, Style::default().fg(colors::MUTED)),
        ]),
    ];

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::BORDER)),
    );
    frame.render_widget(header, area);
}

fn draw_cards(frame: &mut Frame, area: Rect, snapshot: &CountrySnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (card, chunk) in stats::stat_cards(&snapshot.stats).iter().zip(chunks.iter()) {
        draw_card(frame, *chunk, card);
    }
}

fn draw_card(frame: &mut Frame, area: Rect, card: &StatCard) {
    let accent = card_color(card.kind);
    let block = Block::default()
        .title(Span::styled(format!(" {} ", card.label), Style::default().fg(colors::MUTED)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent));

    let mut value = vec![Span::styled(
        card.value.clone(),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )];
    if card.estimated {
        value.push(Span::styled(" (est.)", Style::default().fg(colors::MUTED)));
    }

    let text = vec![
        Line::from(value),
        Line::from(vec![
            Span::styled(card.percentage.clone(), Style::default().fg(colors::TEXT)),
            Span::styled(format!(" {}", card.percentage_label), Style::default().fg(colors::MUTED)),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
}

fn draw_charts(frame: &mut Frame, area: Rect, snapshot: &CountrySnapshot, chart: &ChartSeries) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_line_chart(frame, chunks[0], chart);
    draw_doughnut(frame, chunks[1], snapshot);
}

fn series_color(kind: SeriesKind) -> Color {
    match kind {
        SeriesKind::Cases => colors::CASES,
        SeriesKind::Deaths => colors::DEATHS,
        SeriesKind::Recovered => colors::RECOVERED,
    }
}

fn draw_line_chart(frame: &mut Frame, area: Rect, chart: &ChartSeries) {
    let lines: Vec<(SeriesKind, Vec<(f64, f64)>)> =
        SeriesKind::ALL.iter().map(|kind| (*kind, chart.points(*kind))).collect();
    let peak = [(chart.x_of(chart.peak.date), chart.peak.value)];

    let mut datasets: Vec<Dataset> = lines
        .iter()
        .map(|(kind, points)| {
            Dataset::default()
                .name(kind.label())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(*kind)))
                .data(points)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(colors::TEXT))
            .data(&peak),
    );

    let mid = chart.effective_start + (chart.effective_end - chart.effective_start) / 2;
    let x_labels = vec![
        Span::styled(chart.effective_start.format("%b %Y").to_string(), Style::default().fg(colors::MUTED)),
        Span::styled(mid.format("%b %Y").to_string(), Style::default().fg(colors::MUTED)),
        Span::styled(chart.effective_end.format("%b %Y").to_string(), Style::default().fg(colors::MUTED)),
    ];
    let y_labels: Vec<Span> = chart
        .y_ticks(6)
        .into_iter()
        .map(|v| Span::styled(format!("{:.1}", v), Style::default().fg(colors::MUTED)))
        .collect();

    let title = Line::from(vec![
        Span::styled(" Line Chart (millions) ", Style::default().fg(colors::TEXT).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" {}M Cases ", chart.peak.value_label()),
            Style::default().fg(colors::CASES).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", chart.peak.date.format("%Y")), Style::default().fg(colors::MUTED)),
    ]);

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors::BORDER)),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, chart.x_span()])
                .labels(x_labels)
                .style(Style::default().fg(colors::BORDER)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, chart.axis_upper()])
                .labels(y_labels)
                .style(Style::default().fg(colors::BORDER)),
        );

    frame.render_widget(widget, area);
}

fn draw_doughnut(frame: &mut Frame, area: Rect, snapshot: &CountrySnapshot) {
    let block = Block::default()
        .title(Span::styled(
            " Pie Chart ",
            Style::default().fg(colors::TEXT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors::BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let slices = stats::composition(&snapshot.stats);
    let estimated = stats::recovered(&snapshot.stats).is_estimate();

    // Cells are roughly twice as tall as wide.
    let ring = chunks[0];
    let aspect = if ring.height > 0 {
        f64::from(ring.width) / (2.0 * f64::from(ring.height))
    } else {
        1.0
    };
    let points = widgets::doughnut_points(&slices, 6, 240);
    let population = snapshot.stats.population;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.1 * aspect, 1.1 * aspect])
        .y_bounds([-1.1, 1.1])
        .paint(move |ctx| {
            for (coords, color) in points.iter().zip(SLICE_COLORS) {
                ctx.draw(&Points { coords, color });
            }
            if let Some(population) = population {
                let label = format_grouped(Some(population));
                #[allow(clippy::cast_precision_loss)]
                let half = label.len() as f64 / 2.0 * (2.2 * aspect / f64::from(ring.width.max(1)));
                ctx.print(-half, 0.0, Span::styled(label, Style::default().fg(colors::TEXT)));
            }
        });
    frame.render_widget(canvas, ring);

    let legend: Vec<Line> = slices
        .iter()
        .zip(SLICE_COLORS)
        .map(|(slice, color)| {
            let mut spans = vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(format!("{}: ", slice.label), Style::default().fg(colors::MUTED)),
                Span::styled(format_grouped(Some(slice.value)), Style::default().fg(colors::TEXT)),
            ];
            if estimated && slice.label == "Recoveries" {
                spans.push(Span::styled(" (est.)", Style::default().fg(colors::MUTED)));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(legend).wrap(Wrap { trim: true }), chunks[1]);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let help = " [q]uit  [/]search country  [d]ate range ";
    let footer = Paragraph::new(help)
        .style(Style::default().fg(colors::MUTED))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

fn draw_error_view(frame: &mut Frame, area: Rect, message: &str) {
    frame.render_widget(Clear, area);
    let popup = centered_rect(60, 7, area);
    let text = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(colors::ERROR).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [Enter] ", Style::default().fg(Color::Black).bg(colors::TEXT)),
            Span::styled(" Back to Dashboard   ", Style::default().fg(colors::TEXT)),
            Span::styled(" [q] ", Style::default().fg(Color::Black).bg(colors::MUTED)),
            Span::styled(" Quit ", Style::default().fg(colors::MUTED)),
        ]),
    ];
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors::ERROR)),
        );
    frame.render_widget(widget, popup);
}

fn picker_rect(header: Rect, screen: Rect) -> Rect {
    let width = 44.min(screen.width);
    let height = 7.min(screen.height.saturating_sub(header.bottom()));
    Rect::new(screen.right().saturating_sub(width), header.bottom(), width, height)
}

fn draw_date_picker(frame: &mut Frame, area: Rect, state: &DashboardState, field: RangeBound) {
    let row = |label: &str, bound: RangeBound| {
        let focused = bound == field;
        let style = if focused {
            Style::default().fg(Color::Black).bg(colors::CASES).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::TEXT)
        };
        Line::from(vec![
            Span::styled(format!(" {:<11}", label), Style::default().fg(colors::MUTED)),
            Span::styled(format!(" {} ", state.range().bound(bound).format("%Y-%m-%d")), style),
        ])
    };

    let text = vec![
        row("Start Date", RangeBound::Start),
        row("End Date", RangeBound::End),
        Line::from(""),
        Line::from(Span::styled(
            " ←/→ day  ↑/↓ month  PgUp/PgDn year",
            Style::default().fg(colors::MUTED),
        )),
        Line::from(Span::styled(" Tab switch  Esc close", Style::default().fg(colors::MUTED))),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .title(" Filter by Date Range ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors::CASES)),
        ),
        area,
    );
}

fn draw_selector(frame: &mut Frame, screen: Rect, state: &DashboardState, query: &str, cursor: usize) {
    #[allow(clippy::cast_possible_truncation)]
    let area = centered_rect(50, SELECTOR_PAGE as u16 + 5, screen);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Search Country ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors::CASES));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let input = Paragraph::new(Line::from(vec![
        Span::styled(" > ", Style::default().fg(colors::CASES)),
        Span::styled(format!("{}_", query), Style::default().fg(colors::TEXT)),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(colors::BORDER)));
    frame.render_widget(input, chunks[0]);

    match state.catalog() {
        CatalogState::Loading => {
            frame.render_widget(
                Paragraph::new(" Loading countries...").style(Style::default().fg(colors::MUTED)),
                chunks[1],
            );
        },
        CatalogState::Failed(message) => {
            frame.render_widget(
                Paragraph::new(format!(" {}", message)).style(Style::default().fg(colors::ERROR)),
                chunks[1],
            );
        },
        CatalogState::Ready(_) => {
            let matches = state.selector_matches();
            if matches.is_empty() {
                frame.render_widget(
                    Paragraph::new(" No matching countries").style(Style::default().fg(colors::MUTED)),
                    chunks[1],
                );
                return;
            }
            let items: Vec<ListItem> = matches
                .iter()
                .map(|o| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!(" {:<4}", o.code.to_ascii_uppercase()), Style::default().fg(colors::MUTED)),
                        Span::styled(o.display_name.clone(), Style::default().fg(colors::TEXT)),
                    ]))
                })
                .collect();
            let list = List::new(items).highlight_style(
                Style::default().bg(colors::CASES).fg(Color::Black).add_modifier(Modifier::BOLD),
            );
            let mut list_state = ListState::default().with_selected(Some(cursor));
            frame.render_stateful_widget(list, chunks[1], &mut list_state);
        },
    }
}
