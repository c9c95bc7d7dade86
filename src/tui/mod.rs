//! Ratatui-based interactive dashboard.
//!
//! The TUI shows the selected day range, a bar chart of total sales per article, and
//! a line chart of total sales per hour. Start/end days can be shifted or typed in;
//! every change reruns the dashboard pipeline against the store.

use std::io;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Terminal,
};

use crate::app::pipeline::{run_dashboard, DashboardRun};
use crate::domain::{parse_day, DateRange, SalesSummary};
use crate::error::AppError;
use crate::store::StoreLayout;

mod plotters_chart;

use plotters_chart::SalesLineChart;

/// Start the TUI on `range`.
pub fn run(layout: StoreLayout, range: DateRange) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(layout, range.start_day(), range.end_day())?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    layout: StoreLayout,
    start: NaiveDate,
    end: NaiveDate,
    selected_field: usize,
    editing: bool,
    date_input: String,
    status: String,
    run: Option<DashboardRun>,
}

impl App {
    fn new(layout: StoreLayout, start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        let mut app = Self {
            layout,
            start,
            end,
            selected_field: 0,
            editing: false,
            date_input: String::new(),
            status: String::new(),
            run: None,
        };
        app.reload()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing {
            return self.handle_date_edit(code);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => self.selected_field = 0,
            KeyCode::Down => self.selected_field = 1,
            KeyCode::Left => self.shift_selected(-1)?,
            KeyCode::Right => self.shift_selected(1)?,
            KeyCode::Enter => {
                self.editing = true;
                self.date_input.clear();
                self.status = "Editing date (YYYYMMDD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('r') => self.reload()?,
            _ => {}
        }

        Ok(false)
    }

    fn handle_date_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_date_input()?;
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() && self.date_input.len() < 8 {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn shift_selected(&mut self, days: i64) -> Result<(), AppError> {
        let field = if self.selected_field == 0 { &mut self.start } else { &mut self.end };
        *field = shift_day(*field, days);
        self.reload()
    }

    fn apply_date_input(&mut self) -> Result<(), AppError> {
        let day = match parse_day(&self.date_input) {
            Ok(day) => day,
            Err(e) => {
                self.status = e;
                return Ok(());
            }
        };
        if self.selected_field == 0 {
            self.start = day;
        } else {
            self.end = day;
        }
        self.reload()
    }

    fn reload(&mut self) -> Result<(), AppError> {
        let range = DateRange::from_days(self.start, self.end);
        self.run = run_dashboard(&self.layout, &range, None)?;
        self.status = match &self.run {
            Some(run) => format!(
                "{} file(s), {} row(s), {} skipped",
                run.dataset.files.len(),
                run.dataset.records.len(),
                run.dataset.skipped.len()
            ),
            None => "No data found for the selected period.".to_string(),
        };
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {} .. {}", self.start, self.end)),
        ]));

        let total = self
            .run
            .as_ref()
            .map(|r| format!("{:.2}", r.summary.grand_total()))
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(Span::styled(
            format!("store: {} | total: {total}", self.layout.output_root.display()),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(area);
        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[0]);

        self.draw_bars(frame, charts[0]);
        self.draw_line(frame, charts[1]);
        self.draw_settings(frame, rows[1]);
    }

    fn draw_bars(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Total sales by article").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(no_data(block), area);
            return;
        };

        let bars = article_bars(&run.summary);
        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_line(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Total sales over time").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(no_data(block), area);
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (series, x_bounds, y_bounds) = time_series(&run.summary);
        let widget = SalesLineChart {
            series: &series,
            x_bounds,
            y_bounds,
            x_label: "hour",
            y_label: "sales",
            fmt_x: fmt_axis_hour,
            fmt_y: fmt_axis_total,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Start: {}", self.start.format("%Y%m%d"))),
            ListItem::new(format!("End:   {}", self.end.format("%Y%m%d"))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Range").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing {
            let hint = Paragraph::new(format!("New date: {}_", self.date_input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + area.width / 2,
                y: area.y + 1,
                width: area.width.saturating_sub(area.width / 2 + 1),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ ±1 day  Enter type date  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn no_data(block: Block<'_>) -> Paragraph<'_> {
    Paragraph::new("No data found for the selected period.")
        .style(Style::default().fg(Color::Yellow))
        .block(block)
}

fn shift_day(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_add_signed(chrono::Duration::days(days)).unwrap_or(day)
}

/// One bar per article, in summary order. Bar heights are cents so small totals still show.
fn article_bars(summary: &SalesSummary) -> Vec<Bar<'static>> {
    summary
        .by_article
        .iter()
        .map(|a| {
            Bar::default()
                .label(Line::from(a.article.clone()))
                .value((a.total_sales.max(0.0) * 100.0).round() as u64)
                .text_value(format!("{:.2}", a.total_sales))
        })
        .collect()
}

/// Line series in unix seconds plus padded bounds.
fn time_series(summary: &SalesSummary) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let series: Vec<(f64, f64)> = summary
        .by_time
        .iter()
        .map(|h| (h.hour.and_utc().timestamp() as f64, h.total_sales))
        .collect();

    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &series {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y0 = y0.min(y);
        y1 = y1.max(y);
    }

    if !x0.is_finite() || !x1.is_finite() {
        (x0, x1) = (0.0, 3600.0);
    } else if x1 <= x0 {
        // Single hour: give it an hour either side.
        (x0, x1) = (x0 - 3600.0, x1 + 3600.0);
    }
    if !y0.is_finite() || !y1.is_finite() {
        (y0, y1) = (0.0, 1.0);
    }

    let pad = ((y1 - y0).abs() * 0.05).max(y1.abs().max(1.0) * 0.05);
    (series, [x0, x1], [y0 - pad, y1 + pad])
}

fn fmt_axis_hour(v: f64) -> String {
    DateTime::from_timestamp(v as i64, 0)
        .map(|dt| dt.format("%m/%d %Hh").to_string())
        .unwrap_or_default()
}

fn fmt_axis_total(v: f64) -> String {
    format!("{v:.0}")
}
