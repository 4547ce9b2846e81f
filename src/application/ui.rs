use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::services::events::EventsService;
use crate::domain::services::help_text;
use crate::domain::services::AppState;
use crate::domain::services::BubbleTitles;
use crate::domain::services::TurnUpdate;
use crate::infrastructure::backends::BackendManager;

enum LoopInput {
    Terminal(Event),
    Turn(TurnUpdate),
}

fn draw(frame: &mut Frame, app_state: &mut AppState<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Max(4),
        ])
        .split(frame.size());

    if usize::from(layout[0].width) != app_state.last_known_width
        || usize::from(layout[0].height) != app_state.last_known_height
    {
        app_state.set_rect(layout[0]);
    }

    if app_state.show_help {
        frame.render_widget(
            Paragraph::new(help_text())
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .title("Help"),
                ),
            layout[0],
        );
    } else {
        app_state
            .bubble_list
            .render(frame, layout[0], app_state.scroll.position);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            layout[0].inner(&Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app_state.scroll.scrollbar_state,
        );
    }

    if let Some(status) = app_state.current_status() {
        let mut style = Style::default().fg(Color::DarkGray);
        if status.is_error {
            style = Style::default().fg(Color::Red);
        }
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(status.text, style))),
            layout[1],
        );
    }

    frame.render_widget(app_state.textarea.widget(), layout[2]);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
) -> Result<()> {
    let mut events = EventsService::new();

    loop {
        terminal.draw(|frame| {
            draw(frame, app_state);
        })?;

        let input = tokio::select! {
            event = events.next() => LoopInput::Terminal(event?),
            Some(update) = app_state.session.next_update() => LoopInput::Turn(update),
        };

        let event = match input {
            LoopInput::Turn(update) => {
                app_state.handle_update(update);
                continue;
            }
            LoopInput::Terminal(event) => event,
        };

        match event {
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardEnter() => {
                if app_state.submit().await? {
                    break;
                }
            }
            Event::KeyboardPaste(text) => {
                app_state.paste(&text).await;
            }
            Event::KeyboardCharInput(input) => {
                app_state.textarea.input(input);
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UIResize() | Event::UITick() => (),
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start() -> Result<()> {
    let backend = BackendManager::get()?;
    let health = backend.health_check().await;

    let mut app_state = AppState::new(
        backend,
        BubbleTitles {
            user: Config::get(ConfigKey::Username),
            model: Config::get(ConfigKey::Model),
        },
    );
    if let Err(err) = health {
        tracing::warn!(error = ?err, "backend health check failed");
        app_state.set_error(&format!(
            "Gemini isn't reachable, requests will likely fail. {err}"
        ));
    }

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
