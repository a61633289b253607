//! Detail view
//!
//! Info panel for a movie or show; shows also get an episode list on the
//! right whose selection decides what "play" starts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{DetailState, LoadingState};
use crate::models::MediaItem;
use crate::ui::{render_notice, Theme};

pub fn render(frame: &mut Frame, area: Rect, detail: Option<&DetailState>) {
    let Some(detail) = detail else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border())
            .title(Span::styled(" DETAIL ", Theme::title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_notice(frame, inner, "No title selected", Theme::dimmed());
        return;
    };

    match &detail.item {
        MediaItem::Movie(_) => render_info(frame, area, detail),
        MediaItem::Tv(_) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(area);
            render_info(frame, chunks[0], detail);
            render_episodes(frame, chunks[1], detail);
        }
    }
}

fn render_info(frame: &mut Frame, area: Rect, detail: &DetailState) {
    let item = &detail.item;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_focused())
        .title(Span::styled(" INFO ", Theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();

    let year_str = item.year().map(|y| format!(" ({})", y)).unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled("▶ ", Theme::accent()),
        Span::styled(item.title().to_string(), Theme::title()),
        Span::styled(year_str, Theme::secondary()),
    ]));

    let mut meta = Vec::new();
    if let Some(rating) = item.rating() {
        meta.push(Span::styled(format!("★ {:.1}", rating), Theme::rating(rating)));
    }
    match item {
        MediaItem::Movie(movie) => {
            if let Some(runtime) = movie.format_duration() {
                if !meta.is_empty() {
                    meta.push(Span::styled(" │ ", Theme::dimmed()));
                }
                meta.push(Span::styled(runtime, Theme::duration()));
            }
        }
        MediaItem::Tv(show) => {
            if !meta.is_empty() {
                meta.push(Span::styled(" │ ", Theme::dimmed()));
            }
            meta.push(Span::styled(format!("{} seasons", show.seasons.len()), Theme::secondary()));
        }
    }
    lines.push(Line::from(meta));

    let genres = match item {
        MediaItem::Movie(m) => &m.genres,
        MediaItem::Tv(s) => &s.genres,
    };
    if !genres.is_empty() {
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(Line::from(vec![
            Span::styled("Genre: ", Theme::dimmed()),
            Span::styled(names.join(", "), Theme::genre()),
        ]));
    }

    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Theme::dimmed(),
    )));

    match &detail.loading {
        LoadingState::Loading(msg) => lines.push(Line::from(Span::styled(
            format!("⟳ {}", msg.as_deref().unwrap_or("Loading...")),
            Theme::loading(),
        ))),
        LoadingState::Error(msg) => lines.push(Line::from(Span::styled(msg.clone(), Theme::error()))),
        LoadingState::Idle => {}
    }

    if let Some(description) = item.description().filter(|d| !d.is_empty()) {
        lines.push(Line::from(Span::styled("OVERVIEW", Theme::accent())));
        for line in description.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), Theme::text())));
        }
    }

    lines.push(Line::from(""));
    let play_hint = if detail.playable().is_some() {
        vec![
            Span::styled(" ↵ ", Theme::keybind()),
            Span::styled("Play  ", Theme::keybind_desc()),
            Span::styled(" ESC ", Theme::keybind()),
            Span::styled("Back", Theme::keybind_desc()),
        ]
    } else {
        vec![Span::styled("No playable stream", Theme::dimmed())]
    };
    lines.push(Line::from(play_hint));

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn render_episodes(frame: &mut Frame, area: Rect, detail: &DetailState) {
    let episodes = detail.episode_list();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(format!(" EPISODES ({}) ", episodes.len()), Theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if episodes.is_empty() {
        render_notice(frame, inner, "No episodes", Theme::dimmed());
        return;
    }

    let visible = inner.height as usize;
    let selected = detail.episodes.selected;
    let offset = selected.saturating_sub(visible.saturating_sub(1));

    let items: Vec<ListItem> = episodes
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, episode)| {
            let is_selected = i == selected;
            let style = if is_selected {
                Theme::list_item_selected()
            } else if episode.video_url.is_none() {
                Theme::dimmed()
            } else {
                Theme::list_item()
            };
            ListItem::new(Line::from(vec![
                Span::styled(if is_selected { "▸ " } else { "  " }, Theme::accent()),
                Span::styled(episode.to_string(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}
