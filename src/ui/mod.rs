//! Terminal UI components
//!
//! Built with ratatui. Every screen is drawn from [`App`] state only, so the
//! renderers can be exercised against a `TestBackend`.

pub mod detail;
pub mod home;
pub mod login;
pub mod search;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, InputMode};

/// Main render function - dispatches to view-specific renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    // Main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    match app.state {
        AppState::Login => login::render(frame, chunks[1], &app.login),
        AppState::Home => home::render(frame, chunks[1], &app.home),
        AppState::Search => search::render(frame, chunks[1], &app.search),
        AppState::Detail => detail::render(frame, chunks[1], app.detail.as_ref()),
    }
    render_status_bar(frame, chunks[2], app);

    if let Some(ref error) = app.error {
        render_error_popup(frame, area, error, app.retry.is_some());
    }
}

/// Logo plus the search box (or the screen name on login)
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(16), Constraint::Min(1)])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![
        Span::styled(
            "Wil",
            Style::default()
                .fg(Theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "TV",
            Style::default()
                .fg(Theme::SECONDARY)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(logo, header_chunks[0]);

    if app.state == AppState::Login {
        let title = Paragraph::new(Span::styled("Sign in to continue", Theme::dimmed())).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Theme::border()),
        );
        frame.render_widget(title, header_chunks[1]);
        return;
    }

    let editing = app.input_mode == InputMode::Editing;
    let input = &app.search.input;
    let search_text = if editing {
        let (before, after) = input.split();
        format!("⌕ {}│{}", before, after)
    } else if input.value.is_empty() {
        "⌕ Type / to search...".to_string()
    } else {
        format!("⌕ {}", input.value)
    };

    let search_box = Paragraph::new(search_text)
        .style(if editing {
            Theme::input().fg(Theme::PRIMARY)
        } else {
            Theme::input()
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(if editing {
                    Theme::border_focused()
                } else {
                    Theme::border()
                })
                .title(Span::styled(
                    format!(" SEARCH {} ", app.search.media).to_uppercase(),
                    Theme::title(),
                )),
        );
    frame.render_widget(search_box, header_chunks[1]);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode_indicator = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::PRIMARY),
        ),
        InputMode::Editing => Span::styled(
            " INSERT ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::ACCENT),
        ),
    };

    let state_indicator = Span::styled(
        format!(" {} ", format!("{:?}", app.state).to_uppercase()),
        Style::default().fg(Theme::DIM),
    );

    let account = match &app.customer_name {
        Some(name) => Span::styled(format!(" {} ", name), Theme::secondary()),
        None => Span::styled(" Signed out ", Theme::dimmed()),
    };

    let help = match app.state {
        AppState::Login => " tab:next field  enter:sign in  esc:quit ",
        AppState::Home => " q:quit  /:search  m:movies/tv  enter:open  L:logout ",
        AppState::Search => " q:quit  /:edit  m:movies/tv  enter:open  esc:back ",
        AppState::Detail => " enter:play  ↑↓:episode  esc:back ",
    };

    let mut spans = vec![mode_indicator, state_indicator, account, Span::raw(" │ ")];
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("{} │ ", status), Theme::accent()));
    }
    spans.push(Span::styled(help, Theme::dimmed()));

    let status = Paragraph::new(Line::from(spans)).style(Theme::status_bar());
    frame.render_widget(status, area);
}

/// Render error popup overlay
fn render_error_popup(frame: &mut Frame, area: Rect, error: &str, can_retry: bool) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height);

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let hint = if can_retry {
        "r: retry   any key: dismiss"
    } else {
        "any key: dismiss"
    };

    let error_block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error, Theme::error())),
        Line::from(""),
        Line::from(Span::styled(hint, Theme::keybind())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::error())
            .title(Span::styled(" ✗ ERROR ", Theme::error()))
            .style(Style::default().bg(Theme::BACKGROUND)),
    );

    frame.render_widget(error_block, popup_area);
}

/// Centered one-line message inside `area`
pub(crate) fn render_notice(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let notice = Paragraph::new(text.to_string())
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(notice, area);
}
