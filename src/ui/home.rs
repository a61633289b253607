//! Home browse grid
//!
//! One bordered band per row; cards scroll horizontally inside it and the
//! band list scrolls vertically to keep the focused row on screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::{HomeRow, HomeState, LoadingState};
use crate::ui::{render_notice, Theme};

/// Height of one row band including borders
pub const ROW_HEIGHT: u16 = 5;
/// Width of one card including its gap
pub const CARD_WIDTH: u16 = 24;

/// Cards that fit in a row band of `width` columns
pub fn visible_cards(width: u16) -> usize {
    (width.saturating_sub(2) / CARD_WIDTH).max(1) as usize
}

pub fn render(frame: &mut Frame, area: Rect, home: &HomeState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(format!(" {} ", home.media).to_uppercase(), Theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &home.loading {
        LoadingState::Loading(msg) => {
            render_notice(frame, inner, &format!("⟳ {}", msg.as_deref().unwrap_or("Loading...")), Theme::loading());
            return;
        }
        LoadingState::Error(msg) if home.rows.is_empty() => {
            render_notice(frame, inner, msg, Theme::error());
            return;
        }
        _ => {}
    }

    if home.rows.is_empty() {
        render_notice(frame, inner, "Nothing to browse yet", Theme::dimmed());
        return;
    }

    let fit = (inner.height / ROW_HEIGHT).max(1) as usize;
    let first = home.row.saturating_sub(fit - 1);
    let shown: Vec<(usize, &HomeRow)> = home.rows.iter().enumerate().skip(first).take(fit).collect();

    let bands = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(ROW_HEIGHT); shown.len()])
        .split(inner);

    for ((index, row), band) in shown.into_iter().zip(bands.iter()) {
        render_row(frame, *band, row, index == home.row);
    }
}

fn render_row(frame: &mut Frame, area: Rect, row: &HomeRow, focused: bool) {
    let title = if row.loading && !row.items.is_empty() {
        format!(" {} ⟳ ", row.title)
    } else {
        format!(" {} ", row.title)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .title(Span::styled(title, if focused { Theme::accent() } else { Theme::title() }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if row.items.is_empty() {
        let (text, style) = if row.loading {
            ("⟳ Loading...", Theme::loading())
        } else {
            ("Nothing here", Theme::dimmed())
        };
        render_notice(frame, inner, text, style);
        return;
    }

    let visible = visible_cards(area.width);
    let selected = row.list.selected;
    // Keep the selection in view even before the state's offset catches up
    let offset = if selected < row.list.offset {
        selected
    } else if selected >= row.list.offset + visible {
        selected + 1 - visible
    } else {
        row.list.offset
    };

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Length(CARD_WIDTH); visible])
        .split(inner);

    for (slot, (index, item)) in row.items.iter().enumerate().skip(offset).take(visible).enumerate() {
        let is_focused = focused && index == selected;
        let style = if is_focused {
            Theme::card_focused()
        } else if index == selected {
            Theme::selected()
        } else {
            Theme::card()
        };
        let card_area = Rect {
            width: cards[slot].width.saturating_sub(1),
            ..cards[slot]
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(truncate(&item.label(), card_area.width as usize), style)),
        ])
        .style(style);
        frame.render_widget(card, card_area);
    }
}

/// Cut `text` to `width` columns with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_cards() {
        assert_eq!(visible_cards(10), 1);
        assert_eq!(visible_cards(2 + CARD_WIDTH * 3), 3);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Heat", 10), "Heat");
        assert_eq!(truncate("The Long Goodbye", 8), "The Lon…");
    }
}
