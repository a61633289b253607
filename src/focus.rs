//! Focus restoration for the browse grid
//!
//! A remote (or the arrow keys) has no pointer, so when the grid is rebuilt
//! after leaving a detail screen the selection has to come back to the item
//! the user last had focused. The tracker remembers that coordinate and, on
//! restore, scrolls the row, waits for it to settle, then asks the host for
//! focus, retrying a few times while the item is still being laid out.
//!
//! Rows are remembered by [`RowKey`] so that a row appearing or disappearing
//! above the focused one does not shift the restore target.

use std::time::Duration;
use tracing::{debug, warn};

/// Row/item coordinate in the browse grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusPosition {
    pub row_index: usize,
    pub item_index: usize,
}

impl FocusPosition {
    pub fn new(row_index: usize, item_index: usize) -> Self {
        Self {
            row_index,
            item_index,
        }
    }
}

/// Identity of a row in the browse grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    Providers,
    Hero,
    Catalog(u64),
    /// Genre listing; the home grid has no genre band, so only hosts that
    /// lay out genre rows themselves produce this key
    Genre(u64),
}

/// UI surface the tracker restores focus into
pub trait FocusHost {
    fn row_count(&self) -> usize;

    fn row_key(&self, row: usize) -> Option<RowKey>;

    /// Current index of the row identified by `key`
    fn row_index(&self, key: RowKey) -> Option<usize> {
        (0..self.row_count()).find(|&row| self.row_key(row) == Some(key))
    }

    /// Number of items loaded so far in `row`
    fn loaded_items(&self, row: usize) -> usize;

    fn scroll_to_item(&mut self, row: usize, item: usize);

    /// Move input focus; `false` when the item is not laid out yet
    fn request_focus(&mut self, row: usize, item: usize) -> bool;

    fn first_visible_item(&self, row: usize) -> Option<usize>;

    /// Focus the screen's fallback element
    fn focus_default(&mut self);
}

/// Result of a restore attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    Restored(FocusPosition),
    /// Target never became focusable; the row's first visible item took focus
    FirstVisible(FocusPosition),
    /// Provider row was empty; the default element took focus
    DefaultHandle,
    /// Nothing recorded, or the row is gone
    Skipped,
    Failed,
}

/// What a restore will do given the current layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePlan {
    Skip,
    Default,
    Item(FocusPosition),
}

/// Timing of the scroll-then-focus sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSettings {
    pub settle_delay: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(150),
            retry_delay: Duration::from_millis(50),
            max_retries: 3,
        }
    }
}

impl FocusSettings {
    /// No delays, same retry budget
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Remembers the last focused grid coordinate for one screen
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    last: Option<FocusPosition>,
    last_key: Option<RowKey>,
    settings: FocusSettings,
}

impl FocusTracker {
    pub fn new(settings: FocusSettings) -> Self {
        Self {
            last: None,
            last_key: None,
            settings,
        }
    }

    pub fn settings(&self) -> FocusSettings {
        self.settings
    }

    /// Record a focus change by raw coordinate
    pub fn record_focus(&mut self, row: usize, item: usize) {
        self.last = Some(FocusPosition::new(row, item));
        self.last_key = None;
    }

    /// Record a focus change together with the row's identity
    pub fn record_row_focus(&mut self, key: RowKey, row: usize, item: usize) {
        self.last = Some(FocusPosition::new(row, item));
        self.last_key = Some(key);
    }

    pub fn last_focus(&self) -> Option<FocusPosition> {
        self.last
    }

    pub fn last_row_key(&self) -> Option<RowKey> {
        self.last_key
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.last_key = None;
    }

    /// Work out the restore target against the host's current layout
    pub fn plan<H: FocusHost + ?Sized>(&self, host: &H) -> RestorePlan {
        let Some(last) = self.last else {
            return RestorePlan::Skip;
        };

        // A keyed row that no longer exists is not restored by index
        let row = match self.last_key {
            Some(key) => match host.row_index(key) {
                Some(row) => row,
                None => return RestorePlan::Skip,
            },
            None => last.row_index,
        };

        if row >= host.row_count() {
            return RestorePlan::Skip;
        }

        let loaded = host.loaded_items(row);
        if loaded == 0 {
            return if host.row_key(row) == Some(RowKey::Providers) {
                RestorePlan::Default
            } else {
                RestorePlan::Skip
            };
        }

        RestorePlan::Item(FocusPosition::new(row, last.item_index.min(loaded - 1)))
    }

    /// Scroll the remembered row into view and move focus back to its item
    pub async fn restore_focus<H: FocusHost + ?Sized>(&self, host: &mut H) -> FocusOutcome {
        let target = match self.plan(host) {
            RestorePlan::Skip => {
                debug!(last = ?self.last, "focus restore skipped");
                return FocusOutcome::Skipped;
            }
            RestorePlan::Default => {
                host.focus_default();
                return FocusOutcome::DefaultHandle;
            }
            RestorePlan::Item(target) => target,
        };

        host.scroll_to_item(target.row_index, target.item_index);
        pause(self.settings.settle_delay).await;

        for attempt in 0..=self.settings.max_retries {
            if host.request_focus(target.row_index, target.item_index) {
                debug!(?target, attempt, "focus restored");
                return FocusOutcome::Restored(target);
            }
            if attempt < self.settings.max_retries {
                pause(self.settings.retry_delay).await;
            }
        }

        if let Some(first) = host.first_visible_item(target.row_index) {
            if host.request_focus(target.row_index, first) {
                let fallback = FocusPosition::new(target.row_index, first);
                debug!(?target, ?fallback, "focus fell back to first visible item");
                return FocusOutcome::FirstVisible(fallback);
            }
        }

        warn!(?target, "focus restore failed");
        FocusOutcome::Failed
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_focus_overwrites() {
        let mut tracker = FocusTracker::default();
        assert!(tracker.last_focus().is_none());

        tracker.record_row_focus(RowKey::Hero, 1, 4);
        tracker.record_focus(2, 5);
        assert_eq!(tracker.last_focus(), Some(FocusPosition::new(2, 5)));
        assert_eq!(tracker.last_row_key(), None);

        tracker.clear();
        assert!(tracker.last_focus().is_none());
    }

    #[test]
    fn test_default_settings() {
        let settings = FocusSettings::default();
        assert_eq!(settings.max_retries, 3);
        assert!(settings.settle_delay > settings.retry_delay);
        assert!(FocusSettings::immediate().settle_delay.is_zero());
    }
}
