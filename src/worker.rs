//! Background worker for the TUI
//!
//! Receives [`AppCommand`]s from the event loop, runs each one on its own task
//! against the API client and reports back with an [`AppMessage`].

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, ListFilter};
use crate::app::{AppCommand, AppMessage, RowItem};
use crate::focus::RowKey;
use crate::models::MediaType;
use crate::paging::Page;
use crate::player::{LocalPlayer, PlayerType};
use crate::session::Credentials;

/// Settings the worker needs from the config
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub page_size: u32,
    pub player: PlayerType,
}

/// Run until the command channel closes
pub async fn run(
    client: ApiClient,
    settings: WorkerSettings,
    mut commands: UnboundedReceiver<AppCommand>,
    messages: UnboundedSender<AppMessage>,
) {
    while let Some(command) = commands.recv().await {
        debug!(?command, "executing command");
        let client = client.clone();
        let messages = messages.clone();
        tokio::spawn(async move {
            let message = execute(&client, settings, command).await;
            if messages.send(message).is_err() {
                debug!("event loop gone, result dropped");
            }
        });
    }
}

/// Execute one command and turn its outcome into a message
pub async fn execute(client: &ApiClient, settings: WorkerSettings, command: AppCommand) -> AppMessage {
    let result = match &command {
        AppCommand::Login(Credentials::AccessCode(code)) => {
            client.login_with_access_code(code).await.map(AppMessage::LoggedIn)
        }
        AppCommand::Login(Credentials::Password { email, password }) => client
            .login_with_password(email, password)
            .await
            .map(AppMessage::LoggedIn),
        AppCommand::Logout => client.logout().map(|()| AppMessage::LoggedOut),
        AppCommand::LoadHome(media) => client
            .catalogs(*media)
            .await
            .map(|catalogs| AppMessage::HomeLayout {
                media: *media,
                catalogs,
            }),
        AppCommand::LoadRow { media, key, page } => {
            load_row(client, *media, *key, *page, settings.page_size)
                .await
                .map(|page| AppMessage::RowLoaded {
                    media: *media,
                    key: *key,
                    page,
                })
        }
        AppCommand::Search { query, media, page } => client
            .search(query, *media, *page, settings.page_size)
            .await
            .map(|page| AppMessage::SearchResults {
                query: query.clone(),
                media: *media,
                page,
            }),
        AppCommand::OpenDetail { media, id } => {
            client.title(*media, *id).await.map(AppMessage::DetailLoaded)
        }
        AppCommand::Play { title, url } => {
            let player = LocalPlayer::new(settings.player);
            return match player.play_and_wait(url, title).await {
                Ok(()) => AppMessage::PlaybackFinished(title.clone()),
                Err(e) => {
                    warn!(title = %title, "playback failed: {}", e);
                    AppMessage::Failed {
                        error: e.to_string(),
                        auth: false,
                        command: command.clone(),
                    }
                }
            };
        }
    };

    match result {
        Ok(message) => message,
        Err(e) => {
            warn!(?command, "command failed: {}", e);
            AppMessage::Failed {
                error: e.to_string(),
                auth: e.is_auth_failure(),
                command,
            }
        }
    }
}

/// Fetch one page of a home row
async fn load_row(
    client: &ApiClient,
    media: MediaType,
    key: RowKey,
    page: u32,
    per_page: u32,
) -> Result<Page<RowItem>, ApiError> {
    let filter = match key {
        RowKey::Providers => {
            return Ok(client
                .streaming_providers(page, per_page)
                .await?
                .map(RowItem::Provider));
        }
        RowKey::Hero => ListFilter::Hero,
        RowKey::Catalog(id) => ListFilter::Catalog(id),
        RowKey::Genre(id) => ListFilter::Genre(id),
    };
    Ok(client
        .titles(media, filter, page, per_page)
        .await?
        .map(RowItem::Title))
}
