use std::collections::HashMap;
use std::sync::Arc;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;
use souk_engine::{ChartKind, ChartSpec, Section};

/// Colors cycled across series and pie slices.
const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::Red,
    Color::LightGreen,
    Color::LightBlue,
];

/// Render one page slot: a chart spec or the warning standing in for it.
pub fn render_section(f: &mut Frame, section: &Section, area: Rect) {
    if area.width < 4 || area.height < 3 {
        return;
    }

    match section {
        Section::Warning(message) => render_warning(f, message, area),
        Section::Chart(spec) if spec.data.is_empty() => render_empty(f, spec, area),
        Section::Chart(spec) => match spec.kind {
            ChartKind::Bar => render_bar(f, spec, area),
            ChartKind::Pie => render_pie(f, spec, area),
        },
    }
}

fn render_warning(f: &mut Frame, message: &str, area: Rect) {
    let paragraph = Paragraph::new(message.to_owned())
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Warning ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(paragraph, area);
}

fn render_empty(f: &mut Frame, spec: &ChartSpec, area: Rect) {
    let paragraph = Paragraph::new("no rows match the current filters")
        .style(Style::default().fg(Color::DarkGray))
        .block(chart_block(&spec.title));
    f.render_widget(paragraph, area);
}

fn chart_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_bar(f: &mut Frame, spec: &ChartSpec, area: Rect) {
    let block = chart_block(&spec.title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let category_idx = spec.data.key_index(&spec.category).unwrap_or(0);
    let series_idx = spec
        .series
        .as_deref()
        .and_then(|name| spec.data.key_index(name));

    match series_idx {
        Some(series_idx) => render_grouped_bars(f, spec, inner, category_idx, series_idx),
        None => render_simple_bars(f, spec, inner, category_idx),
    }
}

/// One bar per group row, in the order the aggregation produced.
fn render_simple_bars(f: &mut Frame, spec: &ChartSpec, area: Rect, category_idx: usize) {
    let count = spec.data.rows.len().max(1) as u16;
    let bar_width = (area.width / count).saturating_sub(1).clamp(3, 12);

    let bars: Vec<Bar> = spec
        .data
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let name = row
                .keys
                .get(category_idx)
                .map(|k| k.as_ref())
                .unwrap_or("");
            Bar::default()
                .value(bar_value(row.value))
                .text_value(fmt_value(row.value))
                .label(Line::from(truncated(name, bar_width as usize)))
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
        })
        .collect();

    let chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

/// Grouped bars: one group per category, one colored bar per series value.
fn render_grouped_bars(
    f: &mut Frame,
    spec: &ChartSpec,
    area: Rect,
    category_idx: usize,
    series_idx: usize,
) {
    let mut categories: Vec<Arc<str>> = Vec::new();
    let mut series: Vec<Arc<str>> = Vec::new();
    let mut values: HashMap<(Arc<str>, Arc<str>), f64> = HashMap::new();
    for row in &spec.data.rows {
        let (Some(category), Some(series_key)) =
            (row.keys.get(category_idx), row.keys.get(series_idx))
        else {
            continue;
        };
        if !categories.contains(category) {
            categories.push(category.clone());
        }
        if !series.contains(series_key) {
            series.push(series_key.clone());
        }
        values.insert((category.clone(), series_key.clone()), row.value);
    }
    categories.sort();
    series.sort();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let group_count = categories.len().max(1) as u16;
    let per_group = series.len().max(1) as u16;
    let usable = chunks[0]
        .width
        .saturating_sub(group_count.saturating_sub(1) * 2);
    let bar_width = (usable / (group_count * per_group))
        .saturating_sub(1)
        .clamp(2, 10);

    let mut chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .group_gap(2);
    for category in &categories {
        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .filter_map(|(i, series_key)| {
                values
                    .get(&(category.clone(), series_key.clone()))
                    .map(|&value| {
                        Bar::default()
                            .value(bar_value(value))
                            .text_value(fmt_value(value))
                            .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    })
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(category.to_string()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, chunks[0]);

    // Series legend under the chart.
    let mut spans: Vec<Span> = Vec::new();
    for (i, series_key) in series.iter().enumerate() {
        spans.push(Span::styled(
            "■ ",
            Style::default().fg(PALETTE[i % PALETTE.len()]),
        ));
        spans.push(Span::raw(format!("{series_key}  ")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
}

/// Terminal stand-in for a pie chart: one share gauge per slice, largest
/// first.
fn render_pie(f: &mut Frame, spec: &ChartSpec, area: Rect) {
    let block = chart_block(&spec.title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let category_idx = spec.data.key_index(&spec.category).unwrap_or(0);
    let mut slices = spec.data.rows.clone();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));

    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    let visible = slices.len().min(inner.height as usize);
    let hidden = slices.len() - visible;

    for (i, slice) in slices.iter().take(visible).enumerate() {
        let row = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };

        // Truncated slices borrow the last line for the overflow note.
        if hidden > 0 && i == visible - 1 {
            let note = Paragraph::new(format!("… and {} more", hidden + 1))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(note, row);
            break;
        }

        let ratio = if total > 0.0 {
            (slice.value.max(0.0) / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let name = slice
            .keys
            .get(category_idx)
            .map(|k| k.as_ref())
            .unwrap_or("");
        let gauge = Gauge::default()
            .ratio(ratio)
            .label(Span::styled(
                format!("{name}  {:.1}%  ({})", ratio * 100.0, fmt_value(slice.value)),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .gauge_style(Style::default().fg(PALETTE[i % PALETTE.len()]));
        f.render_widget(gauge, row);
    }
}

fn bar_value(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

fn truncated(s: &str, width: usize) -> String {
    s.chars().take(width.max(1)).collect()
}

/// Compact magnitude formatting for bar captions and pie labels.
fn fmt_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 10_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fmt_value_scales_magnitudes() {
        assert_eq!(fmt_value(42.0), "42");
        assert_eq!(fmt_value(149.5), "149.50");
        assert_eq!(fmt_value(12_500.0), "12.5k");
        assert_eq!(fmt_value(3_400_000.0), "3.4M");
    }

    #[test]
    fn bar_value_clamps_negative_sums() {
        assert_eq!(bar_value(-12.0), 0);
        assert_eq!(bar_value(12.4), 12);
    }

    #[test]
    fn truncated_respects_width() {
        assert_eq!(truncated("Abu Dhabi", 3), "Abu");
        assert_eq!(truncated("Ajman", 10), "Ajman");
    }
}
