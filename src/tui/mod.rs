//! Ratatui-based terminal UI.
//!
//! The TUI provides a company search box with live suggestions (or manual
//! entry of the two statement URLs), then renders the fetched Balance Sheet /
//! Profit & Loss tables with the Total Assets and Net Profit trend charts.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::app::pipeline::{self, Selection};
use crate::catalog::Catalog;
use crate::data::StatementClient;
use crate::domain::{StatementKind, StatementRefs, Statements, Suggestion};
use crate::error::AppError;
use crate::plot::ChartStyle;
use crate::resolve::DEFAULT_SUGGEST_LIMIT;

mod plotters_chart;

use plotters_chart::{TrendChart, trend_bounds};

/// Start the TUI.
pub fn run(catalog: Catalog, client: StatementClient, query: Option<String>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(catalog, client, query.unwrap_or_default());
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

/// Which text box receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Search,
    ManualBalanceSheet,
    ManualProfitLoss,
}

/// A fetch queued by a key press; run after the "Fetching..." frame is drawn.
#[derive(Debug, Clone, PartialEq)]
struct PendingFetch {
    company: Option<String>,
    refs: StatementRefs,
}

struct App {
    catalog: Catalog,
    client: StatementClient,
    input: Input,
    query: String,
    suggestions: Vec<Suggestion>,
    selected: usize,
    manual_bs: String,
    manual_pl: String,
    pending: Option<PendingFetch>,
    statements: Option<Statements>,
    view: StatementKind,
    scroll: usize,
    status: String,
}

impl App {
    fn new(catalog: Catalog, client: StatementClient, query: String) -> Self {
        let status = format!("{} companies loaded. Type a name and press Enter.", catalog.len());
        let mut app = Self {
            catalog,
            client,
            input: Input::Search,
            query,
            suggestions: Vec::new(),
            selected: 0,
            manual_bs: String::new(),
            manual_pl: String::new(),
            pending: None,
            statements: None,
            view: StatementKind::BalanceSheet,
            scroll: 0,
            status,
        };
        app.refresh_suggestions();
        app
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

            if let Some(pending) = self.pending.take() {
                self.perform_fetch(pending);
                needs_redraw = true;
                continue;
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        // Keys that work in every input mode.
        match code {
            KeyCode::F(2) => {
                self.export();
                return false;
            }
            KeyCode::F(3) => {
                self.toggle_manual();
                return false;
            }
            KeyCode::F(5) => {
                let dropped = self.client.clear_cache();
                self.status = format!("Cleared {dropped} cached page(s); the next fetch goes to the network.");
                return false;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(5).min(self.max_scroll());
                return false;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(5);
                return false;
            }
            _ => {}
        }

        match self.input {
            Input::Search => self.handle_search_key(code),
            Input::ManualBalanceSheet | Input::ManualProfitLoss => {
                self.handle_manual_key(code);
                false
            }
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Char(c) => {
                self.query.push(c);
                self.refresh_suggestions();
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.refresh_suggestions();
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.suggestions.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Tab => {
                self.view = self.view.other();
                self.scroll = 0;
            }
            KeyCode::Enter => self.submit_search(),
            _ => {}
        }
        false
    }

    fn handle_manual_key(&mut self, code: KeyCode) {
        let field = match self.input {
            Input::ManualProfitLoss => &mut self.manual_pl,
            _ => &mut self.manual_bs,
        };
        match code {
            KeyCode::Esc => {
                self.input = Input::Search;
                self.status = "Back to search.".to_string();
            }
            KeyCode::Char(c) => field.push(c),
            KeyCode::Backspace => {
                field.pop();
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.input = match self.input {
                    Input::ManualBalanceSheet => Input::ManualProfitLoss,
                    _ => Input::ManualBalanceSheet,
                };
            }
            KeyCode::Enter => self.submit_manual(),
            _ => {}
        }
    }

    fn refresh_suggestions(&mut self) {
        self.suggestions = crate::resolve::suggest(&self.query, self.catalog.names(), DEFAULT_SUGGEST_LIMIT);
        self.selected = 0;
    }

    fn submit_search(&mut self) {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            self.status = "Type a company name first.".to_string();
            return;
        }

        // An explicitly highlighted suggestion wins over re-resolving the text.
        let picked = self
            .suggestions
            .get(self.selected)
            .and_then(|s| self.catalog.get(&s.name).map(|refs| (s.name.clone(), refs.clone())));
        if let Some((company, refs)) = picked {
            self.queue_fetch(Some(company), refs);
            return;
        }

        match pipeline::select_company(&self.catalog, &query) {
            Selection::Matched { company, refs, .. } => self.queue_fetch(Some(company), refs),
            Selection::Unmatched { .. } => {
                self.status = format!("No company matched '{query}'. Press F3 to enter the URLs manually.");
            }
        }
    }

    fn submit_manual(&mut self) {
        let bs = self.manual_bs.trim();
        let pl = self.manual_pl.trim();
        if bs.is_empty() || pl.is_empty() {
            self.input = if bs.is_empty() {
                Input::ManualBalanceSheet
            } else {
                Input::ManualProfitLoss
            };
            self.status = "Enter both the Balance Sheet and the Profit & Loss URL.".to_string();
            return;
        }
        let refs = StatementRefs {
            balance_sheet: bs.to_string(),
            profit_loss: pl.to_string(),
        };
        self.queue_fetch(None, refs);
    }

    fn toggle_manual(&mut self) {
        self.input = match self.input {
            Input::Search => Input::ManualBalanceSheet,
            _ => Input::Search,
        };
        self.status = match self.input {
            Input::Search => "Search mode.".to_string(),
            _ => "Manual mode: paste both statement URLs, Tab to switch, Enter to fetch.".to_string(),
        };
    }

    fn queue_fetch(&mut self, company: Option<String>, refs: StatementRefs) {
        let label = company.as_deref().unwrap_or("custom URLs").to_string();
        self.status = format!("Fetching statements for {label}...");
        self.pending = Some(PendingFetch { company, refs });
    }

    fn perform_fetch(&mut self, pending: PendingFetch) {
        match pipeline::fetch_statements(&mut self.client, pending.company.as_deref(), &pending.refs) {
            Ok(statements) => {
                let cache = self.client.cache();
                self.status = format!(
                    "Loaded {} ({} / {} rows, cache {} hit / {} miss). Tab switches statement, F2 exports.",
                    statements.display_name(),
                    statements.balance_sheet.rows.len(),
                    statements.profit_loss.rows.len(),
                    cache.hits(),
                    cache.misses(),
                );
                self.statements = Some(statements);
                self.scroll = 0;
            }
            Err(err) => {
                self.status = err.to_string();
            }
        }
    }

    fn export(&mut self) {
        let Some(statements) = &self.statements else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        let path = PathBuf::from(statements.export_file_name());
        self.status = match crate::io::write_financials_xlsx(&path, statements) {
            Ok(()) => format!("Exported to {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn max_scroll(&self) -> usize {
        self.statements
            .as_ref()
            .map(|s| s.table(self.view).rows.len().saturating_sub(1))
            .unwrap_or(0)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let company = self
            .statements
            .as_ref()
            .map(|s| {
                format!(
                    "{} (fetched {})",
                    s.display_name(),
                    s.fetched_at.format("%Y-%m-%d %H:%M")
                )
            })
            .unwrap_or_else(|| "-".to_string());

        let line = Line::from(vec![
            Span::styled("lv", Style::default().fg(Color::Cyan)),
            Span::raw(" Company Financials Explorer | "),
            Span::styled(
                format!("catalog: {} | company: {company}", self.catalog.len()),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(38), Constraint::Min(0)])
            .split(area);

        self.draw_search(frame, cols[0]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(cols[1]);
        self.draw_table(frame, rows[0]);
        self.draw_charts(frame, rows[1]);
    }

    fn draw_search(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        let active = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let idle = Style::default().fg(Color::Gray);
        let style_for = |input: Input| if self.input == input { active } else { idle };

        let search = Paragraph::new(self.query.as_str()).block(
            Block::default()
                .title("Company")
                .borders(Borders::ALL)
                .border_style(style_for(Input::Search)),
        );
        frame.render_widget(search, chunks[0]);

        let items: Vec<ListItem> = if self.suggestions.is_empty() {
            vec![ListItem::new(Span::styled("(no suggestions)", idle))]
        } else {
            self.suggestions
                .iter()
                .map(|s| ListItem::new(format!("{:<28} {:>3}", s.name, s.score)))
                .collect()
        };
        let list = List::new(items)
            .block(Block::default().title("Did you mean").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        if !self.suggestions.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);

        let manual = vec![
            Line::from(vec![
                Span::styled("BS: ", style_for(Input::ManualBalanceSheet)),
                Span::raw(self.manual_bs.as_str()),
            ]),
            Line::from(vec![
                Span::styled("PL: ", style_for(Input::ManualProfitLoss)),
                Span::raw(self.manual_pl.as_str()),
            ]),
        ];
        let manual = Paragraph::new(manual).block(Block::default().title("Manual URLs (F3)").borders(Borders::ALL));
        frame.render_widget(manual, chunks[2]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("{} (Tab to switch)", self.view.display_name());
        let block = Block::default().title(title).borders(Borders::ALL);

        let Some(statements) = &self.statements else {
            let msg = Paragraph::new("No company loaded.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let table = statements.table(self.view);
        if table.headers.is_empty() {
            frame.render_widget(Paragraph::new("(no data)").block(block), area);
            return;
        }

        let header = Row::new(table.headers.iter().map(String::as_str))
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = table.rows.iter().skip(self.scroll).map(|r| {
            Row::new(
                (0..table.width()).map(|col| r.get(col).cloned().flatten().unwrap_or_default()),
            )
        });
        let widths: Vec<Constraint> = (0..table.width())
            .map(|col| if col == 0 { Constraint::Min(24) } else { Constraint::Length(12) })
            .collect();

        frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for ((kind, style), rect) in [
            (StatementKind::BalanceSheet, ChartStyle::Bars),
            (StatementKind::ProfitLoss, ChartStyle::Line),
        ]
        .into_iter()
        .zip(cols.iter())
        {
            let block = Block::default().title(kind.trend_keyword()).borders(Borders::ALL);
            let inner = block.inner(*rect);
            frame.render_widget(block, *rect);

            let series = self
                .statements
                .as_ref()
                .map(|s| s.trend(kind))
                .unwrap_or_default();
            let periods: Vec<String> = series.iter().map(|p| p.period.clone()).collect();
            let values: Vec<Option<f64>> = series.iter().map(|p| p.numeric()).collect();

            let Some(y_bounds) = trend_bounds(&values) else {
                let msg = Paragraph::new("Nothing to chart.").style(Style::default().fg(Color::Gray));
                frame.render_widget(msg, inner);
                continue;
            };

            let chart = TrendChart {
                periods: &periods,
                values: &values,
                style,
                y_bounds,
                fmt_y: fmt_axis_y,
            };
            frame.render_widget(chart, inner);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Enter fetch  ↑/↓ pick  Tab statement  PgUp/PgDn scroll  F2 export  F3 manual  F5 refetch  Esc quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Compact y tick labels (statement values are large).
fn fmt_axis_y(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e5 {
        format!("{:.1}L", v / 1e5)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
