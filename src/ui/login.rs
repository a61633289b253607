//! Login form
//!
//! Access code on top, email/password below; whichever is filled in is used.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::{LoadingState, LoginField, LoginState, TextInput};
use crate::ui::Theme;

pub fn render(frame: &mut Frame, area: Rect, login: &LoginState) {
    let width = 50.min(area.width);
    let form_area = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(" SIGN IN ", Theme::title()));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    render_field(frame, chunks[0], "Access code", &login.access_code, login.field == LoginField::AccessCode, false);
    frame.render_widget(
        Paragraph::new(Span::styled("or", Theme::dimmed())).alignment(Alignment::Center),
        chunks[1],
    );
    render_field(frame, chunks[2], "Email", &login.email, login.field == LoginField::Email, false);
    render_field(frame, chunks[3], "Password", &login.password, login.field == LoginField::Password, true);

    let status = match &login.loading {
        LoadingState::Loading(msg) => Line::from(Span::styled(
            format!("⟳ {}", msg.as_deref().unwrap_or("Signing in...")),
            Theme::loading(),
        )),
        LoadingState::Error(msg) => Line::from(Span::styled(msg.clone(), Theme::error())),
        LoadingState::Idle => Line::from(vec![
            Span::styled(" tab ", Theme::keybind()),
            Span::styled("next field  ", Theme::keybind_desc()),
            Span::styled(" ↵ ", Theme::keybind()),
            Span::styled("sign in", Theme::keybind_desc()),
        ]),
    };
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[4]);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, input: &TextInput, focused: bool, masked: bool) {
    let shown = if masked {
        "•".repeat(input.value.chars().count())
    } else {
        input.value.clone()
    };
    let text = if focused {
        let cursor = if masked {
            input.value[..input.cursor].chars().count()
        } else {
            input.cursor
        };
        let (before, after) = shown.split_at(byte_index(&shown, cursor, masked));
        format!("{}│{}", before, after)
    } else {
        shown
    };

    let field = Paragraph::new(text).style(Theme::input()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                Theme::border_focused()
            } else {
                Theme::border()
            })
            .title(Span::styled(format!(" {} ", label), Theme::title())),
    );
    frame.render_widget(field, area);
}

/// Byte offset in the displayed text; masked text counts in chars
fn byte_index(shown: &str, cursor: usize, masked: bool) -> usize {
    if !masked {
        return cursor.min(shown.len());
    }
    shown
        .char_indices()
        .nth(cursor)
        .map_or(shown.len(), |(idx, _)| idx)
}
