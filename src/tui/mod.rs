mod help;
mod state;

use crate::cli::Cli;
use crate::client::{HttpTransport, StatsTransport};
use crate::model::{ClientConfig, StatisticType};
use crate::orchestrator::{self, UiCommand, UiEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Terminal,
};
use state::{Focus, KeyAction, UiState};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli, cfg: ClientConfig) -> Result<()> {
    // Read any prefill input before the terminal switches to raw mode.
    let form = crate::cli::initial_form(&args)?;
    let transport: Arc<dyn StatsTransport> = Arc::new(HttpTransport::new(&cfg)?);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let state = UiState::new(form, cfg.endpoint.as_str());
    let ui_handle = std::thread::spawn(move || run_threaded(state, event_rx, cmd_tx));

    let res = orchestrator::run_controller(transport, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<UiEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
            dirty = true;
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                dirty = true;
                match state.handle_key(k) {
                    KeyAction::None => {}
                    KeyAction::Submit(request) => {
                        if cmd_tx.send(UiCommand::Submit(request)).is_err() {
                            break Err(anyhow::anyhow!("request controller stopped"));
                        }
                    }
                    KeyAction::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn field_block(title: &'static str, focused: bool, error: bool) -> Block<'static> {
    let color = if error {
        Color::Red
    } else if focused {
        Color::Cyan
    } else {
        Color::Gray
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color))
}

fn error_line(msg: Option<&str>) -> Line<'static> {
    match msg {
        Some(m) => Line::from(Span::styled(
            m.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Count the number of times biological entities are mentioned in the C. elegans literature",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw("Powered by "),
            Span::styled("TextpressoCentral", Style::default().fg(Color::Cyan)),
        ]),
    ]);
    f.render_widget(header, rows[0]);

    let errors = state.form.errors();
    draw_entities(rows[1], f, state, errors.entities.is_some());
    f.render_widget(Paragraph::new(error_line(errors.entities.as_deref())), rows[2]);

    let email_focused = state.focus == Focus::Email;
    let mut email = state.form.email().to_string();
    if email_focused {
        email.push('▏');
    }
    let email_widget = Paragraph::new(email).block(field_block(
        "Send results to",
        email_focused,
        errors.email.is_some(),
    ));
    f.render_widget(email_widget, rows[3]);
    f.render_widget(Paragraph::new(error_line(errors.email.as_deref())), rows[4]);

    draw_statistic_selector(rows[5], f, state);
    draw_button(rows[6], f, state);

    let status = if state.info.is_empty() {
        format!("Endpoint: {}   F1 help", state.endpoint)
    } else {
        state.info.clone()
    };
    f.render_widget(
        Paragraph::new(Span::styled(status, Style::default().fg(Color::Gray))),
        rows[7],
    );

    if state.show_help {
        help::draw_help(centered(area, 72, 17), f);
    }
    if let Some(msg) = state.submission.outcome() {
        draw_outcome_dialog(area, f, msg);
    }
}

fn draw_entities(area: Rect, f: &mut ratatui::Frame, state: &UiState, error: bool) {
    let focused = state.focus == Focus::Entities;
    let mut lines: Vec<Line> = state
        .entities_text
        .split('\n')
        .map(|l| Line::from(l.to_string()))
        .collect();
    if focused {
        if let Some(last) = lines.last_mut() {
            last.push_span(Span::raw("▏"));
        }
    }
    // Keep the line being typed visible.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;
    let title = if state.form.entities().is_empty() {
        "Insert entities, one per line".to_string()
    } else {
        format!(
            "Insert entities, one per line ({})",
            state.form.entities().len()
        )
    };
    let p = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(if error {
                    Color::Red
                } else if focused {
                    Color::Cyan
                } else {
                    Color::Gray
                })),
        );
    f.render_widget(p, area);
}

fn draw_statistic_selector(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let focused = state.focus == Focus::StatisticType;
    let current = state.form.statistic_type();
    let mut spans = Vec::new();
    for (i, t) in StatisticType::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if *t == current {
            Style::default()
                .fg(Color::Black)
                .bg(if focused { Color::Cyan } else { Color::Gray })
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {} ", t.label()), style));
    }
    let p = Paragraph::new(Line::from(spans)).block(field_block("Statistics", focused, false));
    f.render_widget(p, area);
}

fn draw_button(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let focused = state.focus == Focus::Submit;
    let label = if state.pending {
        "Calculating…"
    } else {
        "Calculate"
    };
    let style = if state.pending {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let width = (label.chars().count() as u16 + 4).min(area.width);
    let button_area = Rect {
        x: area.x,
        y: area.y,
        width,
        height: area.height,
    };
    let p = Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(field_block("", focused, false));
    f.render_widget(p, button_area);
}

fn draw_outcome_dialog(area: Rect, f: &mut ratatui::Frame, msg: &str) {
    let rect = centered(area, 64, 7);
    let p = Paragraph::new(vec![
        Line::from(msg.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter / Esc to close",
            Style::default().fg(Color::Gray),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Request status")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// A rectangle of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
