use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState,
};

use corner_dashboard::aggregator::{MatchRecord, TeamCornerSummary, Tier};
use corner_dashboard::config::DashboardConfig;
use corner_dashboard::dashboard::TeamRow;
use corner_dashboard::export::export_report;
use corner_dashboard::provider::{ProviderSettings, open_source, spawn_provider};
use corner_dashboard::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

const MIN_PCT_STEP: f64 = 5.0;
const DEFAULT_EXPORT_PATH: &str = "corner_report.xlsx";

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    export_path: PathBuf,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let export_path = std::env::var("CORNER_EXPORT_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
        Self {
            state,
            should_quit: false,
            cmd_tx,
            export_path,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') | KeyCode::Enter => {
                if !self.state.open_detail() {
                    self.state.push_log("[INFO] No team selected");
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.back(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.state.cycle_country();
                self.state.back();
                self.request_scan(true);
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.state.toggle_line();
                self.request_scan(true);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.state.adjust_min(MIN_PCT_STEP),
            KeyCode::Char('-') => self.state.adjust_min(-MIN_PCT_STEP),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_scan(true),
            KeyCode::Char('/') => {
                self.state.search_active = true;
                self.state.search_input.clear();
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.search_active = false;
                self.state.search_input.clear();
            }
            KeyCode::Enter => {
                self.state.search_active = false;
                let query = self.state.search_input.trim().to_string();
                if query.len() < 3 {
                    self.state.push_log("[INFO] Team search needs at least 3 characters");
                    return;
                }
                self.state.back();
                self.send(ProviderCommand::SearchTeam {
                    query,
                    line: self.state.line,
                });
            }
            KeyCode::Backspace => {
                self.state.search_input.pop();
            }
            KeyCode::Char(ch) => self.state.search_input.push(ch),
            _ => {}
        }
    }

    fn request_scan(&mut self, announce: bool) {
        let Some(country) = self.state.current_country().map(|s| s.to_string()) else {
            if announce {
                self.state.push_log("[WARN] League catalog is empty");
            }
            return;
        };
        self.send(ProviderCommand::ScanCountry {
            country,
            line: self.state.line,
        });
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Data provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Data provider stopped");
        }
    }

    fn export(&mut self) {
        let Some(report) = self.state.report.as_ref() else {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        };
        let line = self.state.report_line.unwrap_or(self.state.line);
        match export_report(
            &self.export_path,
            report,
            line,
            self.state.min_over_percentage,
        ) {
            Ok(summary) => {
                let msg = format!(
                    "[INFO] Exported {} teams / {} matches / {} failures to {}",
                    summary.teams,
                    summary.matches,
                    summary.failures,
                    self.export_path.display()
                );
                self.state.push_log(msg);
            }
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> Result<()> {
    let cfg = DashboardConfig::load().context("load configuration")?;
    let force_demo = std::env::args().skip(1).any(|arg| arg == "--demo");
    let (source, note) = open_source(&cfg, force_demo);

    let mut state = AppState::new(
        cfg.league_catalog.country_names(),
        cfg.line,
        cfg.min_over_percentage,
    );
    state.source_name = source.name().to_string();
    if let Some(note) = note {
        state.push_log(note);
    }

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(source, ProviderSettings::from_config(&cfg), tx, cmd_rx);

    let mut app = App::new(state, Some(cmd_tx));
    app.request_scan(false);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
        Screen::Detail { .. } => render_detail(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let scope = state
        .report_label
        .clone()
        .or_else(|| state.current_country().map(|s| s.to_string()))
        .unwrap_or_else(|| "-".to_string());
    let mut title = format!(
        "CORNERS | {} | {} | min {:.0}% | source: {}",
        scope,
        state.line.label(),
        state.min_over_percentage,
        state.source_name
    );
    if state.scanning {
        title.push_str(" | scanning...");
    }
    if state.report_is_stale() {
        title.push_str(" | stale (r to rescan)");
    }
    let failures = state.failure_count();
    if failures > 0 {
        title.push_str(&format!(" | {failures} failed"));
    }
    if state.search_active {
        title.push_str(&format!(" | search: {}_", state.search_input));
    }
    title
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Teams => {
            "Enter/d Detail | j/k Move | c Country | t Line | +/- Min % | / Search | r Rescan | e Export | ? Help | q Quit".to_string()
        }
        Screen::Detail { .. } => "b/Esc Back | t Line | e Export | ? Help | q Quit".to_string(),
    }
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = state.visible_rows();
    if rows.is_empty() {
        let text = if state.scanning {
            "Loading teams and statistics...".to_string()
        } else if state.report.is_none() {
            "No scan yet (r to scan)".to_string()
        } else if state.failure_count() > 0 && state.report.as_ref().is_some_and(|r| r.rows.is_empty()) {
            "Data fetch failed for every team (see console)".to_string()
        } else {
            format!(
                "No teams reach {:.0}% {} (lower with -)",
                state.min_over_percentage,
                state.line.label()
            )
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Teams").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let line = state.report_line.unwrap_or(state.line);
    let header = Row::new(vec![
        Cell::from("Team"),
        Cell::from(format!("% {}", line.label())),
        Cell::from("Mean"),
        Cell::from("Weighted"),
        Cell::from("Valid"),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let body: Vec<Row> = rows.iter().map(|row| team_row(row)).collect();
    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(7),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().title("Teams").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected.min(rows.len() - 1)));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn team_row(row: &TeamRow) -> Row<'static> {
    let s = &row.summary;
    Row::new(vec![
        Cell::from(row.team.display_name()),
        Cell::from(format!("{:.1}", s.over_percentage)),
        Cell::from(format!("{:.2}", s.mean_corners)),
        Cell::from(format!("{:.2}", s.weighted_mean_corners)),
        Cell::from(format!("{}/{}", s.valid_count, s.fixtures_returned)),
    ])
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(row) = state.detail_row() else {
        let empty = Paragraph::new("Team no longer in the current scan")
            .block(Block::default().title("Detail").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_history_table(frame, columns[0], row);
    render_trend_chart(frame, columns[1], &row.summary);
}

fn render_history_table(frame: &mut Frame, area: Rect, row: &TeamRow) {
    let s = &row.summary;
    let title = format!(
        "{} | mean {:.2} | weighted {:.2} | {:.1}% {}",
        row.team.display_name(),
        s.mean_corners,
        s.weighted_mean_corners,
        s.over_percentage,
        s.line.label()
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    if !s.has_data() {
        let empty = Paragraph::new("No matches with complete corner data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Opponent"),
        Cell::from("Corners"),
        Cell::from(format!("Odds {}", s.line.label())),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let body: Vec<Row> = s.history.iter().map(history_row).collect();
    let widths = [
        Constraint::Length(10),
        Constraint::Min(14),
        Constraint::Length(8),
        Constraint::Length(13),
    ];
    let table = Table::new(body, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn history_row(m: &MatchRecord) -> Row<'static> {
    let odds = m
        .odds
        .map(|o| format!("{o:.2}"))
        .unwrap_or_else(|| "-".to_string());
    Row::new(vec![
        Cell::from(m.date.clone()),
        Cell::from(m.opponent.clone()),
        Cell::from(format!("{} {}", tier_marker(m.tier), m.corners))
            .style(Style::default().fg(Color::Black).bg(tier_color(m.tier))),
        Cell::from(odds),
    ])
}

fn render_trend_chart(frame: &mut Frame, area: Rect, summary: &TeamCornerSummary) {
    let block = Block::default()
        .title(format!("Trend (oldest first) | line {}", summary.line.threshold()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let trend = summary.trend();
    if trend.is_empty() || inner.width == 0 || inner.height < 3 {
        return;
    }

    let bars: Vec<Bar> = trend
        .iter()
        .map(|m| {
            Bar::default()
                .value(u64::from(m.corners))
                .text_value(m.corners.to_string())
                .label(Line::from(short_date(&m.date)))
                .style(Style::default().fg(tier_color(m.tier)))
        })
        .collect();

    let max = trend
        .iter()
        .map(|m| u64::from(m.corners))
        .max()
        .unwrap_or(0)
        .max(summary.line.threshold().ceil() as u64 + 2);
    let count = trend.len() as u16;
    let bar_width = (inner.width.saturating_sub(count) / count.max(1)).clamp(1, 7);

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(max);
    frame.render_widget(chart, inner);

    // Dashed reference line at the threshold; the bottom row holds labels.
    let bars_height = inner.height.saturating_sub(1);
    let filled = (summary.line.threshold() / max as f64 * f64::from(bars_height)).round() as u16;
    if filled == 0 || filled > bars_height {
        return;
    }
    let line_area = Rect {
        x: inner.x,
        y: inner.y + bars_height - filled,
        width: inner.width,
        height: 1,
    };
    let dashes: String = (0..inner.width)
        .map(|i| if i % 2 == 0 { '-' } else { ' ' })
        .collect();
    let reference = Paragraph::new(dashes).style(Style::default().fg(Color::Gray));
    frame.render_widget(reference, line_area);
}

fn short_date(date: &str) -> String {
    // YYYY-MM-DD -> MM-DD
    date.get(5..).unwrap_or(date).to_string()
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Green => Color::Green,
        Tier::Yellow => Color::Yellow,
        Tier::Red => Color::Red,
    }
}

fn tier_marker(tier: Tier) -> &'static str {
    match tier {
        Tier::Green => "G",
        Tier::Yellow => "Y",
        Tier::Red => "R",
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Corner Dashboard - Help",
        "",
        "Teams:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Team detail",
        "  c            Next country",
        "  t            Toggle Over 7.5 / 8.5",
        "  + / -        Raise / lower minimum %",
        "  /            Search team by name",
        "  r            Rescan",
        "  e            Export XLSX",
        "",
        "Detail:",
        "  b / Esc      Back",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
