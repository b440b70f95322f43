use std::io;
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
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use quiniela_terminal::catalog::{Catalog, MatchDescriptor};
use quiniela_terminal::config::{Config, SinkKind};
use quiniela_terminal::entry::SelectionValue;
use quiniela_terminal::serialize::entry_line;
use quiniela_terminal::sink::{DeepLinkSink, SqliteSink, SubmissionSink, spawn_submission_worker};
use quiniela_terminal::state::{
    Delta, Focus, NoticeKind, SessionState, SinkCommand, apply_delta,
};

const TEAM_COL_WIDTH: usize = 14;

struct App {
    state: SessionState,
    sink_name: &'static str,
    should_quit: bool,
    cmd_tx: mpsc::Sender<SinkCommand>,
}

impl App {
    fn new(state: SessionState, sink_name: &'static str, cmd_tx: mpsc::Sender<SinkCommand>) -> Self {
        Self {
            state,
            sink_name,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.state.cycle_focus(),
            KeyCode::Enter if self.state.focus != Focus::Matches => self.state.cycle_focus(),
            _ if self.state.focus != Focus::Matches => self.on_text_key(key),
            _ => self.on_match_key(key),
        }
    }

    fn on_text_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Down {
            self.state.cycle_focus();
            return;
        }
        let Some(input) = self.state.focused_input_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(ch) => input.push(ch),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => {}
        }
    }

    fn on_match_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.select_value_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.state.select_value_next(),
            KeyCode::Char(' ') | KeyCode::Enter => self.state.toggle_selected(),
            KeyCode::Char(ch @ '1'..='3') => {
                self.state.selected_value = (ch as usize) - ('1' as usize);
                self.state.toggle_selected();
            }
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
                if let Some(id) = self.state.selected_match_id() {
                    self.state.clear_selection(&id);
                }
            }
            KeyCode::Char('m') => self.state.toggle_mode(),
            KeyCode::Char('a') => {
                let _ = self.state.add_active_to_saved();
            }
            KeyCode::Char('r') => {
                if self.state.remove_last_saved().is_none() {
                    self.state.push_log("[INFO] No saved predictions to remove");
                }
            }
            KeyCode::Char('s') => self.submit(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Ok(payload) = self.state.begin_submit() else {
            return;
        };
        if self.cmd_tx.send(SinkCommand::Submit(payload)).is_err() {
            self.state.finish_submit(quiniela_terminal::sink::SinkOutcome::Rejected(
                "submission worker is not running".to_string(),
            ));
        }
    }
}

fn build_sink(cfg: &Config, catalog: &Catalog) -> Box<dyn SubmissionSink> {
    match cfg.sink {
        SinkKind::Store => Box::new(SqliteSink::new(catalog.clone(), cfg.db_path.clone())),
        SinkKind::WhatsApp => Box::new(DeepLinkSink::new(
            catalog.clone(),
            &cfg.whatsapp_phone,
            cfg.open_cmd.clone(),
        )),
    }
}

fn load_catalog(cfg: &Config) -> Result<Catalog> {
    match &cfg.catalog_path {
        Some(path) => Catalog::load(path),
        None => Catalog::embedded().cloned().context("load embedded catalog"),
    }
}

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let catalog = load_catalog(&cfg)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let sink = build_sink(&cfg, &catalog);
    let sink_name = sink.name();
    let _worker = spawn_submission_worker(sink, tx, cmd_rx);

    let mut state = SessionState::new(catalog, cfg.mode);
    state.push_log(&format!(
        "[INFO] Loaded {} matches, sink: {sink_name}",
        state.catalog.len()
    ));
    let mut app = App::new(state, sink_name, cmd_tx);

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
        app.state.expire_notice(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
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
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_form(frame, chunks[1], &app.state);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    render_notice(frame, chunks[1], &app.state);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let pending = if state.submission_pending {
        " | Sending..."
    } else {
        ""
    };
    let line1 = format!(
        "  QUINIELA | Mode: {} | Sink: {} | Saved: {}{pending}",
        state.mode.label(),
        app.sink_name,
        state.saved.len()
    );
    let line2 = "  Fill your predictions for this round".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &SessionState) -> String {
    match state.focus {
        Focus::Name | Focus::Phone => {
            "Type to edit | Tab/Enter Next field | Esc Quit".to_string()
        }
        Focus::Matches => {
            let submit = if state.submission_pending {
                "s (sending)"
            } else {
                "s Submit"
            };
            format!(
                "Tab Focus | j/k Match | h/l Outcome | Space Toggle | 1/2/3 L/E/V | x Clear | m Mode | a Add | r Remove last | {submit} | ? Help | q Quit"
            )
        }
    }
}

fn render_form(frame: &mut Frame, area: Rect, state: &SessionState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(7),
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(44)])
        .split(rows[1]);

    render_participant(frame, rows[0], state);
    render_matches(frame, columns[0], state);

    let saved = Paragraph::new(saved_text(state))
        .block(Block::default().title("Saved Predictions").borders(Borders::ALL));
    frame.render_widget(saved, columns[1]);

    let console = Paragraph::new(console_text(state, rows[2].height.saturating_sub(2)))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_participant(frame: &mut Frame, area: Rect, state: &SessionState) {
    let field = |label: &str, value: &str, focused: bool| {
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::styled(format!("{label}: {value}{cursor}"), style)
    };
    let lines = vec![
        field("Name ", &state.participant_name, state.focus == Focus::Name),
        field("Phone", &state.participant_phone, state.focus == Focus::Phone),
    ];
    let panel = Paragraph::new(lines)
        .block(Block::default().title("Participant").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_matches(frame: &mut Frame, area: Rect, state: &SessionState) {
    let title = format!(
        "Prediction {} ({}/{})",
        state.saved.len() + 1,
        state.active.filled_count(),
        state.catalog.len()
    );
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }
    if state.catalog.is_empty() {
        let empty =
            Paragraph::new("No matches in this round").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let focused = state.focus == Focus::Matches;
    let visible = inner.height as usize;
    let (start, end) = visible_range(state.selected_match, state.catalog.len(), visible);
    let mut lines = Vec::with_capacity(end - start);
    for idx in start..end {
        let m = &state.catalog.matches()[idx];
        let selected_row = focused && idx == state.selected_match;
        lines.push(match_line(state, m, selected_row));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn match_line(state: &SessionState, m: &MatchDescriptor, selected_row: bool) -> Line<'static> {
    let selection = state.active.get(&m.id);
    let mut spans = vec![Span::raw(format!(
        "{} {} vs {}  ",
        if selected_row { ">" } else { " " },
        team_cell(&m.home_name),
        team_cell(&m.away_name)
    ))];
    for (col, value) in SelectionValue::ALL.into_iter().enumerate() {
        let chosen = selection.is_some_and(|sel| sel.contains(value));
        let mark = if chosen { "x" } else { " " };
        let mut style = if chosen {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if selected_row && col == state.selected_value {
            style = style.bg(Color::DarkGray);
        }
        spans.push(Span::styled(format!("[{mark}] {} ", value.label()), style));
    }
    Line::from(spans)
}

fn team_cell(name: &str) -> String {
    let label = if name.chars().count() > TEAM_COL_WIDTH {
        MatchDescriptor::short(name)
    } else {
        name.to_string()
    };
    format!("{label:>width$}", width = TEAM_COL_WIDTH)
}

fn saved_text(state: &SessionState) -> String {
    if state.saved.is_empty() {
        return "No saved predictions yet".to_string();
    }
    state
        .saved
        .iter()
        .enumerate()
        .map(|(idx, entry)| entry_line(idx + 1, entry))
        .collect::<Vec<_>>()
        .join("\n")
}

fn console_text(state: &SessionState, height: u16) -> String {
    if state.logs.is_empty() {
        return "No logs yet".to_string();
    }
    let take = (height as usize).max(1);
    let start = state.logs.len().saturating_sub(take);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_notice(frame: &mut Frame, area: Rect, state: &SessionState) {
    let Some(notice) = &state.notice else {
        return;
    };
    if area.height < 3 || area.width < 10 {
        return;
    }
    let color = match notice.kind {
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
        NoticeKind::Info => Color::Cyan,
    };
    let width = area.width.min(72);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.saturating_sub(3),
        width,
        height: 3,
    };
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(notice.message.clone())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .title(notice.title.clone())
                .borders(Borders::ALL),
        );
    frame.render_widget(paragraph, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(10).min(64);
    let height = 16.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    let text = [
        "Tab        cycle Name / Phone / Matches",
        "j/k        move between matches",
        "h/l        move between Local / Empate / Visita",
        "Space      choose (Single) or toggle (Multi)",
        "1/2/3      pick Local / Empate / Visita",
        "x          clear the current match",
        "m          switch Single / Multi mode",
        "a          save the current prediction",
        "r          remove the last saved prediction",
        "s          submit all predictions",
        "q/Esc      quit",
        "",
        "Any key closes this help",
    ]
    .join("\n");
    frame.render_widget(Clear, popup);
    let help = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, popup);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }
    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}
