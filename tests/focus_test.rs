//! Focus restoration tests against a scripted grid host

use wiltv::{FocusHost, FocusOutcome, FocusPosition, FocusSettings, FocusTracker, RowKey};

/// Grid double: rows of (key, loaded items); items become focusable after
/// `refuse_focus` rejected attempts
#[derive(Default)]
struct MockGrid {
    rows: Vec<(RowKey, usize)>,
    refuse_focus: u32,
    first_visible: Option<usize>,
    scrolled_to: Option<(usize, usize)>,
    focused: Option<(usize, usize)>,
    focus_attempts: u32,
    default_focused: bool,
}

impl MockGrid {
    fn with_rows(rows: Vec<(RowKey, usize)>) -> Self {
        Self {
            rows,
            first_visible: Some(0),
            ..Self::default()
        }
    }
}

impl FocusHost for MockGrid {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_key(&self, row: usize) -> Option<RowKey> {
        self.rows.get(row).map(|(key, _)| *key)
    }

    fn loaded_items(&self, row: usize) -> usize {
        self.rows.get(row).map(|(_, n)| *n).unwrap_or(0)
    }

    fn scroll_to_item(&mut self, row: usize, item: usize) {
        self.scrolled_to = Some((row, item));
    }

    fn request_focus(&mut self, row: usize, item: usize) -> bool {
        self.focus_attempts += 1;
        if self.refuse_focus > 0 {
            self.refuse_focus -= 1;
            return false;
        }
        self.focused = Some((row, item));
        true
    }

    fn first_visible_item(&self, _row: usize) -> Option<usize> {
        self.first_visible
    }

    fn focus_default(&mut self) {
        self.default_focused = true;
    }
}

fn tracker() -> FocusTracker {
    FocusTracker::new(FocusSettings::immediate())
}

#[tokio::test]
async fn test_restores_recorded_item() {
    let mut grid = MockGrid::with_rows(vec![
        (RowKey::Providers, 4),
        (RowKey::Hero, 6),
        (RowKey::Catalog(3), 10),
    ]);
    let mut focus = tracker();
    focus.record_focus(2, 5);

    let outcome = focus.restore_focus(&mut grid).await;

    assert_eq!(outcome, FocusOutcome::Restored(FocusPosition::new(2, 5)));
    assert_eq!(grid.scrolled_to, Some((2, 5)));
    assert_eq!(grid.focused, Some((2, 5)));
}

#[tokio::test]
async fn test_item_clamped_to_loaded_count() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Providers, 4), (RowKey::Hero, 3)]);
    let mut focus = tracker();
    focus.record_focus(1, 5);

    let outcome = focus.restore_focus(&mut grid).await;
    assert_eq!(outcome, FocusOutcome::Restored(FocusPosition::new(1, 2)));
}

#[tokio::test]
async fn test_nothing_recorded_skips() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Hero, 3)]);
    let outcome = tracker().restore_focus(&mut grid).await;

    assert_eq!(outcome, FocusOutcome::Skipped);
    assert_eq!(grid.focus_attempts, 0);
}

#[tokio::test]
async fn test_row_out_of_range_skips() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Providers, 4), (RowKey::Hero, 3)]);
    let mut focus = tracker();
    focus.record_focus(5, 0);

    let outcome = focus.restore_focus(&mut grid).await;
    assert_eq!(outcome, FocusOutcome::Skipped);
    assert!(grid.scrolled_to.is_none());
}

#[tokio::test]
async fn test_empty_provider_row_focuses_default() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Providers, 0), (RowKey::Hero, 3)]);
    let mut focus = tracker();
    focus.record_focus(0, 2);

    let outcome = focus.restore_focus(&mut grid).await;
    assert_eq!(outcome, FocusOutcome::DefaultHandle);
    assert!(grid.default_focused);
}

#[tokio::test]
async fn test_empty_title_row_skips() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Providers, 2), (RowKey::Hero, 0)]);
    let mut focus = tracker();
    focus.record_focus(1, 0);

    assert_eq!(focus.restore_focus(&mut grid).await, FocusOutcome::Skipped);
    assert!(!grid.default_focused);
}

#[tokio::test]
async fn test_retries_until_item_is_laid_out() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Hero, 8)]);
    grid.refuse_focus = 2;
    let mut focus = tracker();
    focus.record_focus(0, 6);

    let outcome = focus.restore_focus(&mut grid).await;
    assert_eq!(outcome, FocusOutcome::Restored(FocusPosition::new(0, 6)));
    assert_eq!(grid.focus_attempts, 3);
}

#[tokio::test]
async fn test_falls_back_to_first_visible_item() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Hero, 8)]);
    // Initial try plus three retries all refused
    grid.refuse_focus = 4;
    grid.first_visible = Some(3);
    let mut focus = tracker();
    focus.record_focus(0, 6);

    let outcome = focus.restore_focus(&mut grid).await;
    assert_eq!(outcome, FocusOutcome::FirstVisible(FocusPosition::new(0, 3)));
    assert_eq!(grid.focused, Some((0, 3)));
}

#[tokio::test]
async fn test_fails_without_visible_fallback() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Hero, 8)]);
    grid.refuse_focus = u32::MAX;
    grid.first_visible = None;
    let mut focus = tracker();
    focus.record_focus(0, 1);

    assert_eq!(focus.restore_focus(&mut grid).await, FocusOutcome::Failed);
    assert!(grid.focused.is_none());
}

#[tokio::test]
async fn test_keyed_row_follows_layout_change() {
    // Recorded while an extra catalog row sat above the target
    let mut focus = tracker();
    focus.record_row_focus(RowKey::Catalog(9), 3, 1);

    // Catalog 4 came back empty and was dropped, shifting catalog 9 up
    let mut grid = MockGrid::with_rows(vec![
        (RowKey::Providers, 2),
        (RowKey::Hero, 5),
        (RowKey::Catalog(9), 4),
    ]);

    let outcome = focus.restore_focus(&mut grid).await;
    assert_eq!(outcome, FocusOutcome::Restored(FocusPosition::new(2, 1)));
}

#[tokio::test]
async fn test_keyed_row_gone_skips() {
    let mut focus = tracker();
    focus.record_row_focus(RowKey::Genre(11), 2, 0);

    let mut grid = MockGrid::with_rows(vec![(RowKey::Providers, 2), (RowKey::Hero, 5), (RowKey::Catalog(1), 3)]);
    assert_eq!(focus.restore_focus(&mut grid).await, FocusOutcome::Skipped);
}

#[tokio::test]
async fn test_waits_for_settle_delay() {
    let mut grid = MockGrid::with_rows(vec![(RowKey::Hero, 3)]);
    let mut focus = FocusTracker::new(FocusSettings::default());
    focus.record_focus(0, 1);

    let started = std::time::Instant::now();
    let outcome = focus.restore_focus(&mut grid).await;

    assert_eq!(outcome, FocusOutcome::Restored(FocusPosition::new(0, 1)));
    assert!(started.elapsed() >= FocusSettings::default().settle_delay);
}
