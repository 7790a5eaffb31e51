use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use souk_engine::Page;

use crate::app::{App, Focus};
use crate::charts;

const SIDEBAR_WIDTH: u16 = 32;
/// Visible rows per filter list before it scrolls.
const FILTER_LIST_ROWS: u16 = 7;

pub fn draw(f: &mut Frame, app: &App<'_>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(f.area());

    draw_sidebar(f, app, cols[0]);
    draw_main(f, app, cols[1]);
}

fn draw_sidebar(f: &mut Frame, app: &App<'_>, area: Rect) {
    let mut constraints: Vec<Constraint> = vec![Constraint::Length(1)];
    constraints.extend(
        app.controls
            .iter()
            .map(|c| Constraint::Length((c.options.len() as u16).min(FILTER_LIST_ROWS) + 2)),
    );
    constraints.push(Constraint::Length(Page::ALL.len() as u16 + 2));
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(2));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let header = Paragraph::new(Line::styled(
        "Filters",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    f.render_widget(header, rows[0]);

    for (i, control) in app.controls.iter().enumerate() {
        let focused = app.focus == Focus::Filter(i);
        let items: Vec<ListItem> = control
            .options
            .iter()
            .zip(control.selected.iter())
            .map(|(value, &on)| {
                let mark = if on { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {value}"))
            })
            .collect();

        let list = List::new(items)
            .block(section_block(control.dimension.label, focused))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if focused {
            state.select(Some(control.cursor));
        }
        f.render_stateful_widget(list, rows[i + 1], &mut state);
    }

    draw_nav(f, app, rows[app.controls.len() + 1]);

    let footer = Paragraph::new(vec![
        Line::from("Retail Sales Dashboard v2.0"),
        Line::from(format!(
            "{}/{} rows · q quits",
            app.filtered_rows,
            app.table().row_count()
        )),
    ])
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, rows[app.controls.len() + 3]);
}

fn draw_nav(f: &mut Frame, app: &App<'_>, area: Rect) {
    let focused = app.focus == Focus::Nav;
    let items: Vec<ListItem> = Page::ALL
        .iter()
        .map(|page| {
            let mark = if *page == app.page { "(*)" } else { "( )" };
            let style = if *page == app.page {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::styled(format!("{mark} {}", page.label()), style))
        })
        .collect();

    let list = List::new(items)
        .block(section_block("Navigate to", focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.nav_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn section_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn draw_main(f: &mut Frame, app: &App<'_>, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let title = Paragraph::new(Line::styled(
        app.page.label(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    f.render_widget(title, rows[0]);

    let areas = section_areas(app.page, rows[1]);
    for (section, slot) in app.sections.iter().zip(areas) {
        charts::render_section(f, section, slot);
    }
}

/// Chart slots for a page, matching the fixed layouts: full-width for the
/// breakdown page, two-column splits on Customer Insights and Operational
/// Metrics, stacked rows on Marketing.
fn section_areas(page: Page, area: Rect) -> Vec<Rect> {
    match page {
        Page::ChannelCity => vec![area],
        Page::CustomerInsights => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            let top = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[0]);
            vec![top[0], top[1], rows[1]]
        }
        Page::Marketing => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            vec![rows[0], rows[1]]
        }
        Page::Operations => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            let top = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[0]);
            let bottom = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[1]);
            // Left column carries returns + stock-outs, right column the
            // delivery and payment charts.
            vec![top[0], bottom[0], top[1], bottom[1]]
        }
    }
}
