//! App state and core application logic
//!
//! Manages the screen state machine, navigation stack and the browse grid.
//! Key handlers never touch the network: they emit [`AppCommand`]s on a
//! channel and the results come back through [`App::handle_message`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::focus::{FocusHost, FocusOutcome, FocusSettings, FocusTracker, RowKey};
use crate::models::{Catalog, Customer, Episode, MediaItem, MediaType, StreamingProvider};
use crate::paging::Page;
use crate::session::Credentials;

/// Items left in a row before the next page is requested
const LOAD_AHEAD: usize = 3;

/// Cards assumed visible per row until the first render
const DEFAULT_VISIBLE_ITEMS: usize = 5;

// =============================================================================
// App State Enum
// =============================================================================

/// Application state enum representing current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Sign-in form
    Login,
    /// Browse grid of provider, hero and catalog rows
    #[default]
    Home,
    /// Search results view
    Search,
    /// Detail view for a movie or TV show
    Detail,
}

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Text input mode (search box focused)
    Editing,
}

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for async operations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Commands and Messages
// =============================================================================

/// Work requested by the UI, executed off the render loop
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Login(Credentials),
    Logout,
    /// Fetch the catalog list that shapes the home grid
    LoadHome(MediaType),
    LoadRow {
        media: MediaType,
        key: RowKey,
        page: u32,
    },
    Search {
        query: String,
        media: MediaType,
        page: u32,
    },
    OpenDetail {
        media: MediaType,
        id: u64,
    },
    Play {
        title: String,
        url: String,
    },
}

/// Result of an [`AppCommand`]
#[derive(Debug)]
pub enum AppMessage {
    LoggedIn(Customer),
    LoggedOut,
    HomeLayout {
        media: MediaType,
        catalogs: Vec<Catalog>,
    },
    RowLoaded {
        media: MediaType,
        key: RowKey,
        page: Page<RowItem>,
    },
    SearchResults {
        query: String,
        media: MediaType,
        page: Page<MediaItem>,
    },
    DetailLoaded(MediaItem),
    PlaybackFinished(String),
    Failed {
        command: AppCommand,
        error: String,
        /// Session could not be recovered; the user has to sign in again
        auth: bool,
    },
}

// =============================================================================
// Selection State (per-view)
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Scroll offset for viewport
    pub offset: usize,
    /// Total number of items
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            len,
        }
    }

    /// Move selection up (or left in a row)
    pub fn up(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        if self.selected < self.offset {
            self.offset = self.selected;
        }
        true
    }

    /// Move selection down (or right in a row)
    pub fn down(&mut self) -> bool {
        if self.len == 0 || self.selected >= self.len - 1 {
            return false;
        }
        self.selected += 1;
        true
    }

    /// Jump to first item
    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// Jump to last item
    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// Scroll so that `item` is inside a window of `visible` entries
    pub fn scroll_to(&mut self, item: usize, visible: usize) {
        let visible = visible.max(1);
        if item < self.offset {
            self.offset = item;
        } else if item >= self.offset + visible {
            self.offset = item + 1 - visible;
        }
    }

    /// Update length (e.g., when new results come in)
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
            self.offset = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Single-line text field with a byte cursor kept on char boundaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.value.remove(idx);
            self.cursor = idx;
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Text before and after the cursor
    pub fn split(&self) -> (&str, &str) {
        self.value.split_at(self.cursor.min(self.value.len()))
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Route an editing key; `false` when the key is not an edit
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }
}

// =============================================================================
// Login State
// =============================================================================

/// Field of the login form that receives input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    AccessCode,
    Email,
    Password,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            LoginField::AccessCode => LoginField::Email,
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::AccessCode,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub access_code: TextInput,
    pub email: TextInput,
    pub password: TextInput,
    pub field: LoginField,
    pub loading: LoadingState,
}

impl LoginState {
    pub fn input_mut(&mut self) -> &mut TextInput {
        match self.field {
            LoginField::AccessCode => &mut self.access_code,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// Credentials from the form; an access code wins over email/password
    pub fn credentials(&self) -> Option<Credentials> {
        if !self.access_code.is_blank() {
            return Some(Credentials::AccessCode(
                self.access_code.value.trim().to_string(),
            ));
        }
        if !self.email.is_blank() && !self.password.value.is_empty() {
            return Some(Credentials::Password {
                email: self.email.value.trim().to_string(),
                password: self.password.value.clone(),
            });
        }
        None
    }

    /// Forget typed secrets once they have been used
    pub fn clear_secrets(&mut self) {
        self.access_code.clear();
        self.password.clear();
        self.loading = LoadingState::Idle;
    }
}

// =============================================================================
// Home Grid
// =============================================================================

/// Entry in a home row
#[derive(Debug, Clone, PartialEq)]
pub enum RowItem {
    Provider(StreamingProvider),
    Title(MediaItem),
}

impl RowItem {
    pub fn label(&self) -> String {
        match self {
            RowItem::Provider(p) => p.name.clone(),
            RowItem::Title(item) => match item.year() {
                Some(year) => format!("{} ({})", item.title(), year),
                None => item.title().to_string(),
            },
        }
    }

    pub fn as_title(&self) -> Option<&MediaItem> {
        match self {
            RowItem::Title(item) => Some(item),
            RowItem::Provider(_) => None,
        }
    }
}

/// One horizontally scrolling row of the browse grid
#[derive(Debug, Clone)]
pub struct HomeRow {
    pub key: RowKey,
    pub title: String,
    pub items: Vec<RowItem>,
    pub list: ListState,
    /// Page to request next, `None` once the last page arrived
    pub next_page: Option<u32>,
    pub loading: bool,
}

impl HomeRow {
    pub fn new(key: RowKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            items: Vec::new(),
            list: ListState::new(0),
            next_page: Some(1),
            loading: false,
        }
    }

    /// Add a fetched page; page 1 replaces whatever was loaded before
    pub fn append(&mut self, page: Page<RowItem>) {
        if page.current_page <= 1 {
            self.items.clear();
            self.list.first();
        }
        self.next_page = page.next_page();
        self.items.extend(page.items);
        self.list.set_len(self.items.len());
        self.loading = false;
    }

    /// Selection is close enough to the end that the next page should load
    pub fn wants_more(&self) -> bool {
        !self.loading
            && self.next_page.is_some()
            && self.list.selected + LOAD_AHEAD >= self.items.len()
    }

    pub fn selected_item(&self) -> Option<&RowItem> {
        self.items.get(self.list.selected)
    }
}

/// Home view state
#[derive(Debug, Clone)]
pub struct HomeState {
    pub media: MediaType,
    pub rows: Vec<HomeRow>,
    /// Focused row
    pub row: usize,
    pub loading: LoadingState,
    /// Cards that fit in one row at the current terminal width
    pub visible_items: usize,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            media: MediaType::default(),
            rows: Vec::new(),
            row: 0,
            loading: LoadingState::Idle,
            visible_items: DEFAULT_VISIBLE_ITEMS,
        }
    }
}

impl HomeState {
    /// Rebuild the grid: providers, featured, then one row per catalog
    ///
    /// Genres are browsed from the CLI (`movies --genre`), not as home rows.
    pub fn set_layout(&mut self, catalogs: Vec<Catalog>) {
        let mut rows = vec![
            HomeRow::new(RowKey::Providers, "Streaming Providers"),
            HomeRow::new(RowKey::Hero, "Featured"),
        ];
        rows.extend(
            catalogs
                .into_iter()
                .map(|c| HomeRow::new(RowKey::Catalog(c.id), c.name)),
        );
        self.rows = rows;
        self.row = 0;
        self.loading = LoadingState::Idle;
    }

    pub fn row_by_key_mut(&mut self, key: RowKey) -> Option<&mut HomeRow> {
        self.rows.iter_mut().find(|r| r.key == key)
    }

    /// Drop a row, keeping focus on the same row where possible
    pub fn remove_row(&mut self, key: RowKey) {
        let Some(index) = self.rows.iter().position(|r| r.key == key) else {
            return;
        };
        self.rows.remove(index);
        if self.row > index || self.row >= self.rows.len() {
            self.row = self.row.saturating_sub(1);
        }
    }

    pub fn current_row(&self) -> Option<&HomeRow> {
        self.rows.get(self.row)
    }

    pub fn current_row_mut(&mut self) -> Option<&mut HomeRow> {
        self.rows.get_mut(self.row)
    }

    pub fn selected_item(&self) -> Option<&RowItem> {
        self.current_row().and_then(HomeRow::selected_item)
    }

    fn move_row(&mut self, down: bool) -> bool {
        if down && self.row + 1 < self.rows.len() {
            self.row += 1;
            true
        } else if !down && self.row > 0 {
            self.row -= 1;
            true
        } else {
            false
        }
    }

    fn move_item(&mut self, right: bool) -> bool {
        let visible = self.visible_items;
        let Some(row) = self.current_row_mut() else {
            return false;
        };
        let moved = if right { row.list.down() } else { row.list.up() };
        let selected = row.list.selected;
        row.list.scroll_to(selected, visible);
        moved
    }
}

impl FocusHost for HomeState {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_key(&self, row: usize) -> Option<RowKey> {
        self.rows.get(row).map(|r| r.key)
    }

    fn loaded_items(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |r| r.items.len())
    }

    fn scroll_to_item(&mut self, row: usize, item: usize) {
        let visible = self.visible_items;
        if let Some(r) = self.rows.get_mut(row) {
            r.list.scroll_to(item, visible);
        }
    }

    fn request_focus(&mut self, row: usize, item: usize) -> bool {
        match self.rows.get_mut(row) {
            Some(r) if item < r.items.len() => {
                r.list.selected = item;
                self.row = row;
                true
            }
            _ => false,
        }
    }

    fn first_visible_item(&self, row: usize) -> Option<usize> {
        let r = self.rows.get(row)?;
        (!r.items.is_empty()).then(|| r.list.offset.min(r.items.len() - 1))
    }

    fn focus_default(&mut self) {
        self.row = 0;
        if let Some(r) = self.rows.first_mut() {
            r.list.first();
        }
    }
}

// =============================================================================
// Search and Detail State
// =============================================================================

/// Search view state
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub input: TextInput,
    pub media: MediaType,
    /// Query the current results belong to
    pub submitted: String,
    pub results: Vec<MediaItem>,
    pub list: ListState,
    pub next_page: Option<u32>,
    pub loading: LoadingState,
}

impl SearchState {
    /// Add a page of results; page 1 replaces the list
    pub fn append(&mut self, page: Page<MediaItem>) {
        if page.current_page <= 1 {
            self.results.clear();
            self.list.first();
        }
        self.next_page = page.next_page();
        self.results.extend(page.items);
        self.list.set_len(self.results.len());
        self.loading = LoadingState::Idle;
    }

    pub fn selected_result(&self) -> Option<&MediaItem> {
        self.results.get(self.list.selected)
    }

    fn wants_more(&self) -> bool {
        !self.loading.is_loading()
            && self.next_page.is_some()
            && self.list.selected + LOAD_AHEAD >= self.results.len()
    }
}

/// Detail view state
#[derive(Debug, Clone)]
pub struct DetailState {
    pub item: MediaItem,
    /// Episode selection (TV only)
    pub episodes: ListState,
    pub loading: LoadingState,
}

impl DetailState {
    /// Start from the summary shown in a row while the full record loads
    pub fn new(item: MediaItem) -> Self {
        let mut detail = Self {
            item,
            episodes: ListState::new(0),
            loading: LoadingState::Loading(Some("Loading details...".into())),
        };
        let count = detail.episode_list().len();
        detail.episodes.set_len(count);
        detail
    }

    pub fn set_item(&mut self, item: MediaItem) {
        self.item = item;
        let count = self.episode_list().len();
        self.episodes.set_len(count);
        self.loading = LoadingState::Idle;
    }

    /// All episodes of a show in season order
    pub fn episode_list(&self) -> Vec<&Episode> {
        match &self.item {
            MediaItem::Tv(show) => show.seasons.iter().flat_map(|s| s.episodes.iter()).collect(),
            MediaItem::Movie(_) => Vec::new(),
        }
    }

    /// Title and stream URL of whatever "play" would start
    pub fn playable(&self) -> Option<(String, String)> {
        match &self.item {
            MediaItem::Movie(movie) => movie
                .video_url
                .clone()
                .map(|url| (movie.title.clone(), url)),
            MediaItem::Tv(show) => {
                let episodes = self.episode_list();
                let episode = episodes.get(self.episodes.selected)?;
                episode
                    .video_url
                    .clone()
                    .map(|url| (format!("{} - {}", show.title, episode.title), url))
            }
        }
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug, Default)]
pub struct App {
    /// Current state/screen
    pub state: AppState,
    /// Navigation history stack
    pub nav_stack: Vec<AppState>,
    pub running: bool,
    pub input_mode: InputMode,
    /// Error shown in the popup
    pub error: Option<String>,
    /// Command re-issued when the popup is retried
    pub retry: Option<AppCommand>,
    /// One-line notice in the status bar
    pub status: Option<String>,
    pub customer_name: Option<String>,

    // View-specific states
    pub login: LoginState,
    pub home: HomeState,
    pub search: SearchState,
    pub detail: Option<DetailState>,

    pub focus: FocusTracker,
    restore_pending: bool,
    commands: Option<UnboundedSender<AppCommand>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    /// Send commands to a worker instead of dropping them
    pub fn with_commands(mut self, commands: UnboundedSender<AppCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_focus_settings(mut self, settings: FocusSettings) -> Self {
        self.focus = FocusTracker::new(settings);
        self
    }

    /// Open on the home grid when a session exists, otherwise on login
    pub fn start(&mut self, signed_in: bool, customer_name: Option<String>) {
        self.nav_stack.clear();
        if signed_in {
            self.customer_name = customer_name;
            self.state = AppState::Home;
            self.load_home();
        } else {
            self.state = AppState::Login;
        }
    }

    /// Navigate to a new state, pushing current to stack
    pub fn navigate(&mut self, state: AppState) {
        if self.state != state {
            self.nav_stack.push(self.state);
            self.state = state;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Go back to previous state
    pub fn back(&mut self) -> bool {
        // If in editing mode, exit editing first
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return true;
        }

        let Some(prev) = self.nav_stack.pop() else {
            return false;
        };
        if self.state == AppState::Detail {
            self.detail = None;
            if prev == AppState::Home {
                self.restore_pending = true;
            }
        }
        self.state = prev;
        true
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.retry = None;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
        self.retry = None;
    }

    /// Focus search input
    pub fn focus_search(&mut self) {
        if self.state == AppState::Home || self.state == AppState::Search {
            if self.state == AppState::Home {
                self.search.media = self.home.media;
                self.navigate(AppState::Search);
            }
            self.input_mode = InputMode::Editing;
        }
    }

    /// Whether a focus restore is waiting for [`App::settle_focus`]
    pub fn restore_pending(&self) -> bool {
        self.restore_pending
    }

    /// Run a pending focus restore against the home grid
    pub async fn settle_focus(&mut self) -> Option<FocusOutcome> {
        if !std::mem::take(&mut self.restore_pending) || self.state != AppState::Home {
            return None;
        }
        let outcome = self.focus.restore_focus(&mut self.home).await;
        debug!(?outcome, "home focus settled");
        Some(outcome)
    }

    fn dispatch(&self, command: AppCommand) {
        match &self.commands {
            Some(tx) => {
                if tx.send(command).is_err() {
                    warn!("command channel closed");
                }
            }
            None => debug!(?command, "no worker attached, command dropped"),
        }
    }

    fn record_home_focus(&mut self) {
        if let Some(row) = self.home.current_row() {
            self.focus
                .record_row_focus(row.key, self.home.row, row.list.selected);
        }
    }

    fn load_home(&mut self) {
        self.home.loading = LoadingState::Loading(Some(format!("Loading {}...", self.home.media)));
        self.dispatch(AppCommand::LoadHome(self.home.media));
    }

    fn load_row_page(&mut self, key: RowKey) {
        let media = self.home.media;
        let Some(row) = self.home.row_by_key_mut(key) else {
            return;
        };
        let Some(page) = row.next_page else {
            return;
        };
        row.loading = true;
        self.dispatch(AppCommand::LoadRow { media, key, page });
    }

    fn submit_search(&mut self) {
        if self.search.input.is_blank() {
            return;
        }
        let query = self.search.input.value.trim().to_string();
        self.search.submitted = query.clone();
        self.search.results.clear();
        self.search.list.set_len(0);
        self.search.next_page = None;
        self.search.loading = LoadingState::Loading(Some(format!("Searching for {}...", query)));
        self.dispatch(AppCommand::Search {
            query,
            media: self.search.media,
            page: 1,
        });
    }

    fn open_detail(&mut self, item: MediaItem) {
        let command = AppCommand::OpenDetail {
            media: item.media_type(),
            id: item.id(),
        };
        self.detail = Some(DetailState::new(item));
        self.navigate(AppState::Detail);
        self.dispatch(command);
    }

    fn play_selected(&mut self) {
        let Some(detail) = &self.detail else {
            return;
        };
        match detail.playable() {
            Some((title, url)) => {
                self.status = Some(format!("Playing {}", title));
                self.dispatch(AppCommand::Play { title, url });
            }
            None => self.set_error(format!("'{}' has no playable stream", detail.item.title())),
        }
    }

    fn retry_failed(&mut self) {
        self.error = None;
        let Some(command) = self.retry.take() else {
            return;
        };
        match &command {
            AppCommand::LoadHome(_) => {
                self.home.loading = LoadingState::Loading(Some("Retrying...".into()));
            }
            AppCommand::LoadRow { key, .. } => {
                if let Some(row) = self.home.row_by_key_mut(*key) {
                    row.loading = true;
                }
            }
            AppCommand::Search { .. } => {
                self.search.loading = LoadingState::Loading(Some("Retrying...".into()));
            }
            _ => {}
        }
        self.dispatch(command);
    }

    // -------------------------------------------------------------------------
    // Async Results
    // -------------------------------------------------------------------------

    /// Apply the result of a finished command
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::LoggedIn(customer) => {
                self.customer_name = customer.name.clone().or(customer.email.clone());
                self.login.clear_secrets();
                self.home = HomeState::default();
                self.focus.clear();
                self.start(true, self.customer_name.clone());
            }
            AppMessage::LoggedOut => {
                self.home = HomeState::default();
                self.search = SearchState::default();
                self.detail = None;
                self.focus.clear();
                self.customer_name = None;
                self.status = Some("Signed out".into());
                self.start(false, None);
            }
            AppMessage::HomeLayout { media, catalogs } => {
                if media != self.home.media {
                    debug!(%media, "stale home layout ignored");
                    return;
                }
                self.home.set_layout(catalogs);
                let keys: Vec<RowKey> = self.home.rows.iter().map(|r| r.key).collect();
                for key in keys {
                    self.load_row_page(key);
                }
            }
            AppMessage::RowLoaded { media, key, page } => {
                if media != self.home.media {
                    return;
                }
                let first_page = page.current_page <= 1;
                let empty = page.items.is_empty();
                match self.home.row_by_key_mut(key) {
                    Some(row) => row.append(page),
                    None => return,
                }
                if first_page && empty && key != RowKey::Providers {
                    self.home.remove_row(key);
                } else if first_page && self.focus.last_row_key() == Some(key) {
                    self.restore_pending = true;
                }
            }
            AppMessage::SearchResults { query, media, page } => {
                if query != self.search.submitted || media != self.search.media {
                    return;
                }
                self.search.append(page);
            }
            AppMessage::DetailLoaded(item) => {
                if let Some(detail) = &mut self.detail {
                    if detail.item.id() == item.id() && detail.item.media_type() == item.media_type() {
                        detail.set_item(item);
                    }
                }
            }
            AppMessage::PlaybackFinished(title) => {
                self.status = Some(format!("Finished {}", title));
            }
            AppMessage::Failed {
                command,
                error,
                auth,
            } => self.handle_failure(command, error, auth),
        }
    }

    fn handle_failure(&mut self, command: AppCommand, error: String, auth: bool) {
        match &command {
            AppCommand::Login(_) => {
                self.login.loading = LoadingState::Error(error);
                return;
            }
            AppCommand::LoadHome(_) => self.home.loading = LoadingState::Error(error.clone()),
            AppCommand::LoadRow { key, .. } => {
                if let Some(row) = self.home.row_by_key_mut(*key) {
                    row.loading = false;
                }
            }
            AppCommand::Search { .. } => self.search.loading = LoadingState::Error(error.clone()),
            AppCommand::OpenDetail { .. } => {
                if let Some(detail) = &mut self.detail {
                    detail.loading = LoadingState::Error(error.clone());
                }
            }
            AppCommand::Logout | AppCommand::Play { .. } => {}
        }

        if auth {
            self.start(false, None);
            self.set_error(format!("{} - please sign in again", error));
            return;
        }

        self.error = Some(error);
        self.retry = Some(command);
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returns true if event was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        // The error popup swallows the key: `r` retries, anything else dismisses
        if self.error.is_some() {
            if key.code == KeyCode::Char('r') {
                self.retry_failed();
            } else {
                self.clear_error();
            }
            return true;
        }

        if self.state == AppState::Login {
            return self.handle_login_key(key);
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key)
        } else {
            self.handle_normal_key(key)
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> bool {
        if self.login.loading.is_loading() {
            return false;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.login.field = self.login.field.next();
                true
            }
            KeyCode::Esc => {
                self.quit();
                true
            }
            KeyCode::Enter => {
                match self.login.credentials() {
                    Some(credentials) => {
                        self.login.loading = LoadingState::Loading(Some("Signing in...".into()));
                        self.dispatch(AppCommand::Login(credentials));
                    }
                    None => {
                        self.login.loading = LoadingState::Error(
                            "Enter an access code, or email and password".into(),
                        );
                    }
                }
                true
            }
            code => self.login.input_mut().handle_key(code),
        }
    }

    /// Handle keys in editing (text input) mode
    fn handle_editing_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                true
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.submit_search();
                true
            }
            code => self.search.input.handle_key(code),
        }
    }

    /// Handle keys in normal navigation mode
    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Char('/') => {
                self.focus_search();
                return true;
            }
            KeyCode::Char('L') => {
                self.dispatch(AppCommand::Logout);
                return true;
            }
            KeyCode::Esc | KeyCode::Backspace => {
                return self.back();
            }
            _ => {}
        }

        match self.state {
            AppState::Login => false,
            AppState::Home => self.handle_home_key(key),
            AppState::Search => self.handle_search_key(key),
            AppState::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> bool {
        let moved = match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.home.move_row(false),
            KeyCode::Down | KeyCode::Char('j') => self.home.move_row(true),
            KeyCode::Left | KeyCode::Char('h') => self.home.move_item(false),
            KeyCode::Right | KeyCode::Char('l') => {
                let moved = self.home.move_item(true);
                if let Some(row) = self.home.current_row() {
                    if row.wants_more() {
                        let key = row.key;
                        self.load_row_page(key);
                    }
                }
                moved
            }
            KeyCode::Enter => {
                if let Some(item) = self.home.selected_item().and_then(RowItem::as_title) {
                    let item = item.clone();
                    self.open_detail(item);
                }
                return true;
            }
            KeyCode::Char('m') | KeyCode::Char('t') => {
                self.home.media = self.home.media.toggle();
                self.home.rows.clear();
                self.home.row = 0;
                self.focus.clear();
                self.load_home();
                return true;
            }
            KeyCode::Char('r') => {
                self.load_home();
                return true;
            }
            _ => return false,
        };

        if moved {
            self.record_home_focus();
        }
        true
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.search.list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.search.list.down();
                if self.search.wants_more() {
                    if let Some(page) = self.search.next_page {
                        self.search.loading = LoadingState::Loading(None);
                        self.dispatch(AppCommand::Search {
                            query: self.search.submitted.clone(),
                            media: self.search.media,
                            page,
                        });
                    }
                }
                true
            }
            KeyCode::Home => {
                self.search.list.first();
                true
            }
            KeyCode::End => {
                self.search.list.last();
                true
            }
            KeyCode::Enter => {
                if let Some(item) = self.search.selected_result().cloned() {
                    self.open_detail(item);
                }
                true
            }
            KeyCode::Char('m') | KeyCode::Char('t') => {
                self.search.media = self.search.media.toggle();
                self.submit_search();
                true
            }
            _ => false,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(detail) = &mut self.detail {
                    detail.episodes.up();
                }
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(detail) = &mut self.detail {
                    detail.episodes.down();
                }
                true
            }
            KeyCode::Enter | KeyCode::Char('p') => {
                self.play_selected();
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
