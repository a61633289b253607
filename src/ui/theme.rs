//! Color theme for the WilTV TUI
//!
//! Navy background with a coral focus color. The focused card has to be
//! findable at a glance from a couch, so it is the only filled coral cell on
//! screen.

use ratatui::style::{Color, Modifier, Style};

/// Color palette and style helpers
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Screen background: #0e111a
    pub const BACKGROUND: Color = Color::Rgb(0x0e, 0x11, 0x1a);

    /// Raised surfaces (cards, input fields, status bar): #1a1f2c
    pub const SURFACE: Color = Color::Rgb(0x1a, 0x1f, 0x2c);

    /// Headings and active borders: #4fc3f7
    pub const PRIMARY: Color = Color::Rgb(0x4f, 0xc3, 0xf7);

    /// Metadata such as years: #b39ddb
    pub const SECONDARY: Color = Color::Rgb(0xb3, 0x9d, 0xdb);

    /// Key hints and mid ratings: #ffc107
    pub const ACCENT: Color = Color::Rgb(0xff, 0xc1, 0x07);

    /// Focus fill: #ff7043
    pub const HIGHLIGHT: Color = Color::Rgb(0xff, 0x70, 0x43);

    pub const TEXT: Color = Color::Rgb(0xe6, 0xe9, 0xef);
    pub const DIM: Color = Color::Rgb(0x6b, 0x72, 0x80);
    pub const SUCCESS: Color = Color::Rgb(0x66, 0xbb, 0x6a);
    pub const ERROR: Color = Color::Rgb(0xff, 0x53, 0x70);
    pub const BORDER: Color = Color::Rgb(0x2f, 0x4a, 0x5e);

    // ═══════════════════════════════════════════════════════════════════════
    // SCREEN CHROME
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Screen and section headings
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn secondary() -> Style {
        Style::default().fg(Self::SECONDARY)
    }

    pub fn accent() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    /// Border of the panel that owns keyboard input
    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn keybind() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    pub fn keybind_desc() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::SURFACE)
    }

    pub fn loading() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Error popup text and failed-login messages
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BROWSE GRID AND LISTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Unfocused card in a home row
    pub fn card() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::SURFACE)
    }

    /// The card under the cursor in the focused row
    pub fn card_focused() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Remembered card in a row that does not have focus
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn list_item() -> Style {
        Style::default().fg(Self::TEXT)
    }

    pub fn list_item_selected() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Inline emphasis inside a selected search result
    pub fn highlighted() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn year() -> Style {
        Style::default().fg(Self::SECONDARY)
    }

    pub fn genre() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn duration() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Rating color by score out of 10
    pub fn rating(score: f32) -> Style {
        let color = if score >= 7.5 {
            Self::SUCCESS
        } else if score >= 6.0 {
            Self::ACCENT
        } else {
            Self::DIM
        };
        Style::default().fg(color)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOGIN FORM
    // ═══════════════════════════════════════════════════════════════════════

    pub fn input() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::SURFACE)
    }
}

/// Contrast ratio between two sRGB colors, from 1 (same) to 21 (black on white)
///
/// Luminance follows https://www.w3.org/TR/WCAG20/#relativeluminancedef
pub fn contrast_ratio(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> f64 {
    fn luminance((r, g, b): (u8, u8, u8)) -> f64 {
        let channel = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }

    let (l1, l2) = (luminance(fg), luminance(bg));
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// WCAG AA for normal-size text (4.5:1)
pub fn meets_wcag_aa(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
    contrast_ratio(fg, bg) >= 4.5
}

/// RGB tuple of a `Color::Rgb`; other variants have no fixed value
pub fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    match color {
        Color::Rgb(r, g, b) => Some((r, g, b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Foreground and background of a style, both as RGB
    fn pair(style: Style) -> ((u8, u8, u8), (u8, u8, u8)) {
        let fg = style.fg.and_then(color_to_rgb).unwrap();
        let bg = style.bg.and_then(color_to_rgb).unwrap();
        (fg, bg)
    }

    #[test]
    fn test_focused_card_is_readable() {
        let (fg, bg) = pair(Theme::card_focused());
        assert!(meets_wcag_aa(fg, bg), "ratio {:.2}", contrast_ratio(fg, bg));
        assert!(Theme::card_focused().add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_focused_card_differs_from_resting_card() {
        assert_ne!(Theme::card().bg, Theme::card_focused().bg);
        assert_ne!(Theme::card().bg, Some(Theme::BACKGROUND));
        // The remembered card in another row uses the focus hue without the fill
        assert_eq!(Theme::selected().fg, Theme::card_focused().bg);
        assert_eq!(Theme::selected().bg, None);
    }

    #[test]
    fn test_cards_and_inputs_are_readable() {
        for (name, style) in [
            ("card", Theme::card()),
            ("input", Theme::input()),
            ("status_bar", Theme::status_bar()),
            ("list_item_selected", Theme::list_item_selected()),
        ] {
            let (fg, bg) = pair(style);
            assert!(
                meets_wcag_aa(fg, bg),
                "{} has ratio {:.2}",
                name,
                contrast_ratio(fg, bg)
            );
        }
    }

    #[test]
    fn test_popup_error_is_readable_on_surface() {
        let fg = color_to_rgb(Theme::ERROR).unwrap();
        let bg = color_to_rgb(Theme::SURFACE).unwrap();
        assert!(meets_wcag_aa(fg, bg), "ratio {:.2}", contrast_ratio(fg, bg));
    }

    #[test]
    fn test_rating_style_thresholds() {
        assert_eq!(Theme::rating(8.1).fg, Some(Theme::SUCCESS));
        assert_eq!(Theme::rating(7.5).fg, Some(Theme::SUCCESS));
        assert_eq!(Theme::rating(6.5).fg, Some(Theme::ACCENT));
        assert_eq!(Theme::rating(3.0).fg, Some(Theme::DIM));
    }

    #[test]
    fn test_contrast_ratio_bounds() {
        let black = (0, 0, 0);
        let white = (255, 255, 255);
        assert!((contrast_ratio(black, white) - 21.0).abs() < 0.01);
        assert!((contrast_ratio(white, black) - 21.0).abs() < 0.01);
        let text = color_to_rgb(Theme::TEXT).unwrap();
        assert!((contrast_ratio(text, text) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_named_colors_have_no_rgb() {
        assert_eq!(color_to_rgb(Color::Reset), None);
        assert_eq!(color_to_rgb(Color::Rgb(1, 2, 3)), Some((1, 2, 3)));
    }
}
