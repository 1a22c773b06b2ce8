//! Ratatui-based terminal UI.
//!
//! The side panel is the input form (eight selectors, year/month/day and the
//! predict action); the main panel shows the prediction message and the
//! historical price trend.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::{APP_TITLE, AppState, pipeline};
use crate::data::OptionCatalog;
use crate::domain::{DateInput, Field, Selection, TrendSeries};
use crate::error::AppError;
use crate::plot::svg::{chart_bounds, day_number, fmt_day};
use crate::report::{CaptureSink, NO_HISTORY_MESSAGE};

mod plotters_chart;

use plotters_chart::TrendPlottersChart;

/// Start the TUI.
pub fn run(state: &AppState) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(state);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

const FOCUS_YEAR: usize = Field::ALL.len();
const FOCUS_MONTH: usize = FOCUS_YEAR + 1;
const FOCUS_DAY: usize = FOCUS_YEAR + 2;
const FOCUS_PREDICT: usize = FOCUS_YEAR + 3;
const FOCUS_COUNT: usize = FOCUS_PREDICT + 1;

/// Form state: an option index per selector, the raw date and the focused row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Form {
    choices: [usize; Field::ALL.len()],
    date: DateInput,
    focus: usize,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            choices: [0; Field::ALL.len()],
            date: DateInput::default(),
            focus: 0,
        }
    }
}

impl Form {
    fn focus_up(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    fn focus_down(&mut self) {
        if self.focus + 1 < FOCUS_COUNT {
            self.focus += 1;
        }
    }

    /// Cycle the focused selector or step the focused date component.
    fn adjust(&mut self, catalog: &OptionCatalog, delta: i32) {
        match self.focus {
            i if i < FOCUS_YEAR => {
                let n = catalog.options(Field::ALL[i]).len();
                if n > 0 {
                    let next = (self.choices[i] as i64 + i64::from(delta)).rem_euclid(n as i64);
                    self.choices[i] = next as usize;
                }
            }
            FOCUS_YEAR => self.date.year = self.date.year.saturating_add(delta),
            FOCUS_MONTH => self.date.month = self.date.month.saturating_add_signed(delta),
            FOCUS_DAY => self.date.day = self.date.day.saturating_add_signed(delta),
            _ => {}
        }
        self.date = self.date.clamped();
    }

    fn selection(&self, catalog: &OptionCatalog) -> Selection {
        let mut selection = Selection::default();
        for (i, field) in Field::ALL.into_iter().enumerate() {
            if let Some(value) = catalog.options(field).get(self.choices[i]) {
                selection.set(field, value.clone());
            }
        }
        selection
    }

    fn rows(&self, catalog: &OptionCatalog) -> Vec<String> {
        let selection = self.selection(catalog);
        let mut rows: Vec<String> = Field::ALL
            .into_iter()
            .map(|f| {
                let value = selection.get(f);
                let value = if value.is_empty() { "-" } else { value };
                format!("{}: {value}", f.display_name())
            })
            .collect();
        rows.push(format!("Year: {}", self.date.year));
        rows.push(format!("Month: {}", self.date.month));
        rows.push(format!("Day: {}", self.date.day));
        rows.push("[ Predict Price ]".to_string());
        rows
    }
}

/// Result of the last successful submission.
struct Shown {
    message: String,
    series: Option<TrendSeries>,
}

struct App<'a> {
    state: &'a AppState,
    form: Form,
    shown: Option<Shown>,
    status: String,
    status_is_error: bool,
}

impl<'a> App<'a> {
    fn new(state: &'a AppState) -> Self {
        let summary = &state.dataset.summary;
        Self {
            state,
            form: Form::default(),
            shown: None,
            status: format!(
                "Loaded {} rows ({} skipped).",
                summary.rows_kept, summary.rows_skipped
            ),
            status_is_error: false,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.form.focus_up(),
            KeyCode::Down | KeyCode::Tab => self.form.focus_down(),
            KeyCode::Left => self.form.adjust(&self.state.catalog, -1),
            KeyCode::Right => self.form.adjust(&self.state.catalog, 1),
            KeyCode::PageDown => self.form.adjust(&self.state.catalog, -10),
            KeyCode::PageUp => self.form.adjust(&self.state.catalog, 10),
            KeyCode::Enter if self.form.focus == FOCUS_PREDICT => self.submit(),
            KeyCode::Char('p') => self.submit(),
            _ => {}
        }
        false
    }

    fn submit(&mut self) {
        let selection = self.form.selection(&self.state.catalog);
        let mut sink = CaptureSink::default();

        match pipeline::run_prediction(self.state, &selection, self.form.date, &mut sink) {
            Ok(outcome) => {
                self.status = if outcome.notices.is_empty() {
                    "Prediction complete.".to_string()
                } else {
                    outcome.notices.join(" | ")
                };
                self.status_is_error = false;
                self.shown = Some(Shown {
                    message: outcome.message,
                    series: sink.series,
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "prediction failed");
                self.status = err.to_string();
                self.status_is_error = true;
                self.shown = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_form(frame, body[0]);
        self.draw_chart(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            APP_TITLE,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));

        match &self.shown {
            Some(shown) => lines.push(Line::from(Span::styled(
                shown.message.as_str(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Choose inputs, then press Enter on Predict Price.",
                Style::default().fg(Color::Gray),
            ))),
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .form
            .rows(&self.state.catalog)
            .into_iter()
            .map(ListItem::new)
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Inputs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.form.focus));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .shown
            .as_ref()
            .and_then(|s| s.series.as_ref())
            .map(|s| s.title.clone())
            .unwrap_or_else(|| "Price Trend".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(shown) = &self.shown else {
            let msg = Paragraph::new("Waiting for a prediction...")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };
        let Some(series) = &shown.series else {
            let msg = Paragraph::new(NO_HISTORY_MESSAGE).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let history = chart_points(series);
        let (x_bounds, y_bounds) = chart_bounds(&history, series.reference);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendPlottersChart {
            history: &history,
            reference: series.reference,
            x_bounds,
            y_bounds,
            x_label: "Date",
            y_label: &series.y_label,
            fmt_x: fmt_day,
            fmt_y: fmt_axis_price,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, &series.y_label);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ change  PgUp/PgDn ±10  Enter/p predict  q quit";
        let status_color = if self.status_is_error { Color::Red } else { Color::Yellow };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(status_color)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn chart_points(series: &TrendSeries) -> Vec<(f64, f64)> {
    series
        .points
        .iter()
        .map(|p| (day_number(p.date), p.price))
        .collect()
}

fn fmt_axis_price(v: f64) -> String {
    format!("{v:.0}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 6,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: &str,
) {
    let ticks = 4usize;
    let style = Style::default().fg(Color::Gray);
    let right_edge = inner.x + inner.width;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_day(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2).min(right_edge.saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_price(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.min(insets.left + chart.width),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Categories, PriceRecord};

    fn catalog() -> OptionCatalog {
        let records: Vec<PriceRecord> = ["Maize", "Beans", "Rice"]
            .into_iter()
            .enumerate()
            .map(|(i, commodity)| {
                let mut categories = Categories::default();
                categories.set(Field::Commodity, Some(commodity.to_string()));
                categories.set(Field::Market, Some("Arusha".to_string()));
                PriceRecord {
                    line: i + 2,
                    categories,
                    price: None,
                    date: None,
                }
            })
            .collect();
        OptionCatalog::from_records(&records)
    }

    #[test]
    fn selectors_cycle_through_catalog_options() {
        let catalog = catalog();
        let mut form = Form {
            focus: Field::Commodity.index(),
            ..Form::default()
        };
        assert_eq!(form.selection(&catalog).get(Field::Commodity), "Beans");

        form.adjust(&catalog, -1);
        assert_eq!(form.selection(&catalog).get(Field::Commodity), "Rice");
        form.adjust(&catalog, 2);
        assert_eq!(form.selection(&catalog).get(Field::Commodity), "Maize");

        // Fields without options stay empty and never panic.
        form.focus = Field::Unit.index();
        form.adjust(&catalog, 1);
        assert_eq!(form.selection(&catalog).get(Field::Unit), "");
    }

    #[test]
    fn date_components_clamp_but_do_not_validate() {
        let catalog = catalog();
        let mut form = Form {
            focus: FOCUS_YEAR,
            ..Form::default()
        };
        form.adjust(&catalog, 100);
        assert_eq!(form.date.year, 2050);

        form.focus = FOCUS_MONTH;
        form.adjust(&catalog, -5);
        assert_eq!(form.date.month, 1);
        form.adjust(&catalog, 1);

        form.focus = FOCUS_DAY;
        form.adjust(&catalog, 29);
        assert_eq!(form.date, DateInput::new(2050, 2, 30));
        assert!(form.date.to_date().is_err());
    }

    #[test]
    fn focus_stops_at_the_ends() {
        let mut form = Form::default();
        form.focus_up();
        assert_eq!(form.focus, 0);
        for _ in 0..20 {
            form.focus_down();
        }
        assert_eq!(form.focus, FOCUS_PREDICT);
        assert_eq!(form.rows(&catalog()).len(), FOCUS_COUNT);
    }
}
