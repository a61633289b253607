//! Search results list

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::app::{LoadingState, SearchState};
use crate::models::{MediaItem, MediaType};
use crate::ui::{render_notice, Theme};

pub fn render(frame: &mut Frame, area: Rect, search: &SearchState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(
            format!(" RESULTS ({}) ", search.results.len()),
            Theme::title(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if search.results.is_empty() {
        let (text, style) = match &search.loading {
            LoadingState::Loading(_) => ("⟳ Searching...".to_string(), Theme::loading()),
            LoadingState::Error(msg) => (msg.clone(), Theme::error()),
            LoadingState::Idle if search.submitted.is_empty() => (
                format!("Type / to search {}", search.media.to_string().to_lowercase()),
                Theme::dimmed(),
            ),
            LoadingState::Idle => ("No results found".to_string(), Theme::dimmed()),
        };
        render_notice(frame, inner, &text, style);
        return;
    }

    let visible = inner.height as usize;
    let offset = search.list.selected.saturating_sub(visible.saturating_sub(1));

    let items: Vec<ListItem> = search
        .results
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, result)| result_item(result, i == search.list.selected))
        .collect();

    frame.render_widget(List::new(items).style(Theme::text()), inner);
}

/// Format: ▸ Title (Year) [MOVIE] ★ 8.5
fn result_item(result: &MediaItem, is_selected: bool) -> ListItem<'static> {
    let marker = if is_selected { "▸ " } else { "  " };
    let year_str = result.year().map(|y| format!(" ({})", y)).unwrap_or_default();
    let type_str = match result.media_type() {
        MediaType::Movie => "MOVIE",
        MediaType::Tv => "TV",
    };

    let mut spans = vec![
        Span::styled(marker, if is_selected { Theme::accent() } else { Theme::dimmed() }),
        Span::styled(
            result.title().to_string(),
            if is_selected {
                Theme::highlighted()
            } else {
                Theme::text()
            },
        ),
        Span::styled(year_str, Theme::year()),
        Span::raw(" "),
        Span::styled(format!("[{}]", type_str), Theme::secondary()),
    ];
    if let Some(rating) = result.rating() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("★ {:.1}", rating), Theme::rating(rating)));
    }

    ListItem::new(Line::from(spans))
}
