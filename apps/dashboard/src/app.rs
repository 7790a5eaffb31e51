use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use souk_engine::{
    build_sections, filter_options, DimensionFilter, FilterSet, Page, Section, TableView,
};
use souk_model::RecordTable;

use crate::ui;

/// A sidebar filter dimension: the governing column and its control label.
pub struct Dimension {
    pub column: &'static str,
    pub label: &'static str,
}

/// The three optional filter dimensions, in sidebar order.
pub static DIMENSIONS: [Dimension; 3] = [
    Dimension {
        column: "city",
        label: "City",
    },
    Dimension {
        column: "channel",
        label: "Channel",
    },
    Dimension {
        column: "order_month",
        label: "Month",
    },
];

/// One multi-select control over a dimension's distinct values.
pub struct FilterControl {
    pub dimension: &'static Dimension,
    pub options: Vec<Arc<str>>,
    pub selected: Vec<bool>,
    pub cursor: usize,
}

impl FilterControl {
    fn to_filter(&self) -> DimensionFilter {
        DimensionFilter::new(
            self.dimension.column,
            self.options
                .iter()
                .zip(self.selected.iter())
                .filter(|(_, &on)| on)
                .map(|(value, _)| value.clone()),
        )
    }

    fn toggle_current(&mut self) {
        if let Some(on) = self.selected.get_mut(self.cursor) {
            *on = !*on;
        }
    }

    /// `a` key: clear the selection if everything is on, else select all.
    fn toggle_all(&mut self) {
        let target = !self.selected.iter().all(|&on| on);
        self.selected.fill(target);
    }
}

/// Which sidebar control receives key input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Filter(usize),
    Nav,
}

pub struct App<'a> {
    table: &'a RecordTable,
    pub controls: Vec<FilterControl>,
    pub page: Page,
    pub focus: Focus,
    pub nav_cursor: usize,
    pub sections: Vec<Section>,
    pub filtered_rows: usize,
    running: bool,
}

impl<'a> App<'a> {
    pub fn new(table: &'a RecordTable) -> Self {
        // Dimensions whose column is absent get no control and no
        // restriction.
        let controls: Vec<FilterControl> = DIMENSIONS
            .iter()
            .filter_map(|dimension| {
                filter_options(table, dimension.column).map(|options| FilterControl {
                    dimension,
                    selected: vec![true; options.len()],
                    options,
                    cursor: 0,
                })
            })
            .collect();

        let focus = if controls.is_empty() {
            Focus::Nav
        } else {
            Focus::Filter(0)
        };

        let mut app = Self {
            table,
            controls,
            page: Page::ALL[0],
            focus,
            nav_cursor: 0,
            sections: Vec::new(),
            filtered_rows: 0,
            running: true,
        };
        app.recompute();
        app
    }

    pub fn table(&self) -> &RecordTable {
        self.table
    }

    /// Re-run the filter, page, and aggregation pipeline for the current
    /// interaction state. Prior sections are discarded wholesale; the table
    /// itself is never touched.
    fn recompute(&mut self) {
        let mut filters = FilterSet::new();
        for control in &self.controls {
            filters.push(control.to_filter());
        }

        let mask = filters.apply(self.table);
        let view = TableView::with_mask(self.table, mask);
        self.filtered_rows = view.len();
        self.sections = build_sections(self.page, &view);

        tracing::debug!(
            page = self.page.label(),
            rows = self.filtered_rows,
            "recomputed sections"
        );
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while self.running {
            terminal.draw(|f| ui::draw(f, self))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => self.cycle_focus(1),
            KeyCode::BackTab => self.cycle_focus(-1),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => self.activate(),
            KeyCode::Char('a') => {
                if let Focus::Filter(i) = self.focus {
                    self.controls[i].toggle_all();
                    self.recompute();
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.nav_cursor = idx;
                self.set_page(Page::ALL[idx]);
            }
            _ => {}
        }
    }

    fn cycle_focus(&mut self, step: isize) {
        // Focus order: each filter control, then navigation, wrapping.
        let stops = self.controls.len() + 1;
        let current = match self.focus {
            Focus::Filter(i) => i,
            Focus::Nav => self.controls.len(),
        };
        let next = (current as isize + step).rem_euclid(stops as isize) as usize;
        self.focus = if next < self.controls.len() {
            Focus::Filter(next)
        } else {
            Focus::Nav
        };
    }

    fn move_cursor(&mut self, step: isize) {
        match self.focus {
            Focus::Filter(i) => {
                let control = &mut self.controls[i];
                let len = control.options.len();
                if len > 0 {
                    control.cursor =
                        (control.cursor as isize + step).rem_euclid(len as isize) as usize;
                }
            }
            Focus::Nav => {
                let len = Page::ALL.len();
                self.nav_cursor =
                    (self.nav_cursor as isize + step).rem_euclid(len as isize) as usize;
                // Navigation acts like a radio control: moving the cursor
                // switches the page.
                self.set_page(Page::ALL[self.nav_cursor]);
            }
        }
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Filter(i) => {
                self.controls[i].toggle_current();
                self.recompute();
            }
            Focus::Nav => self.set_page(Page::ALL[self.nav_cursor]),
        }
    }

    fn set_page(&mut self, page: Page) {
        self.page = page;
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use souk_model::{ColumnSchema, ColumnType, TableBuilder};

    fn table() -> RecordTable {
        let mut builder = TableBuilder::new(vec![
            ColumnSchema {
                name: "city".to_owned(),
                column_type: ColumnType::String,
            },
            ColumnSchema {
                name: "channel".to_owned(),
                column_type: ColumnType::String,
            },
            ColumnSchema {
                name: "line_value_aed".to_owned(),
                column_type: ColumnType::Number,
            },
        ]);
        for (city, channel, value) in [
            ("Dubai", "Online", 100.0),
            ("Dubai", "Store", 50.0),
            ("Abu Dhabi", "Online", 30.0),
        ] {
            builder.append_row(&[city.into(), channel.into(), value.into()]);
        }
        builder.finish()
    }

    fn press(app: &mut App<'_>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn controls_exist_only_for_present_dimensions() {
        let table = table();
        let app = App::new(&table);

        let labels: Vec<&str> = app
            .controls
            .iter()
            .map(|c| c.dimension.label)
            .collect();
        // order_month is absent from this table, so no Month control.
        assert_eq!(labels, vec!["City", "Channel"]);
        assert!(app.controls.iter().all(|c| c.selected.iter().all(|&on| on)));
        assert_eq!(app.filtered_rows, 3);
    }

    #[test]
    fn toggling_a_value_narrows_the_row_set() {
        let table = table();
        let mut app = App::new(&table);

        // City options are sorted: Abu Dhabi first. Deselect it.
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.filtered_rows, 2);

        // Toggle back restores the full set.
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.filtered_rows, 3);
    }

    #[test]
    fn navigation_switches_pages_and_recomputes() {
        let table = table();
        let mut app = App::new(&table);
        assert_eq!(app.page, Page::ChannelCity);
        assert_eq!(app.sections.len(), 1);

        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.page, Page::Operations);
        // Operational metrics has four slots, all warnings on this table.
        assert_eq!(app.sections.len(), 4);
        assert!(app
            .sections
            .iter()
            .all(|s| matches!(s, Section::Warning(_))));
    }

    #[test]
    fn select_all_toggle_round_trips() {
        let table = table();
        let mut app = App::new(&table);

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.filtered_rows, 0);

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.filtered_rows, 3);
    }
}
