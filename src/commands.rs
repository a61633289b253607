//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the API client.
//! Each handler takes CLI args and Output, returns ExitCode.

use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::cli::{
    ChannelAuthCmd, ExitCode, IdCmd, ListCmd, LoginCmd, LoginMethod, Output, PageCmd, PageOutput,
    PlayCmd, SearchCmd, StatusOk, SwitchCustomerCmd, TypeCmd,
};
use crate::config::Config;
use crate::models::{MediaType, Movie, StreamingProvider, TvShow};
use crate::paging::PageQuery;
use crate::player::{LocalPlayer, PlayerError};
use crate::session::SessionStore;

/// Open the session store and build a client for `config`
pub fn connect(config: &Config) -> anyhow::Result<ApiClient> {
    let session = SessionStore::open_default()?;
    session.ensure_device_identity(&config.device_name)?;
    Ok(ApiClient::new(config.api_base_url.clone(), Arc::new(session)))
}

/// Report an API failure with the matching exit code
fn api_failure(output: &Output, context: &str, e: ApiError) -> ExitCode {
    let code = match &e {
        e if e.is_auth_failure() => ExitCode::Unauthorized,
        ApiError::NotFound | ApiError::EmptyBody => ExitCode::NotFound,
        ApiError::Session(_) => ExitCode::Error,
        _ => ExitCode::NetworkError,
    };
    let hint = if code == ExitCode::Unauthorized {
        " (run `wiltv login`)"
    } else {
        ""
    };
    output.error(format!("{}: {}{}", context, e, hint), code)
}

fn printed(output: &Output, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

// =============================================================================
// Account Commands
// =============================================================================

pub async fn login_cmd(cmd: LoginCmd, client: &ApiClient, output: &Output) -> ExitCode {
    let method = match cmd.method() {
        Ok(method) => method,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    let result = match method {
        LoginMethod::AccessCode(code) => {
            output.info("Signing in with access code...");
            client.login_with_access_code(code).await
        }
        LoginMethod::Password { email, password } => {
            output.info(format!("Signing in as {}...", email));
            client.login_with_password(email, password).await
        }
    };

    match result {
        Ok(customer) => {
            output.info(format!("Signed in: {}", customer));
            printed(output, output.print(&customer))
        }
        Err(e) => api_failure(output, "Login failed", e),
    }
}

pub fn logout_cmd(client: &ApiClient, output: &Output) -> ExitCode {
    match client.logout() {
        Ok(()) => {
            output.info("Signed out");
            printed(output, output.print(StatusOk::default()))
        }
        Err(e) => api_failure(output, "Logout failed", e),
    }
}

pub async fn whoami_cmd(client: &ApiClient, output: &Output) -> ExitCode {
    if !client.session().snapshot().is_authenticated() {
        return output.error("Not signed in (run `wiltv login`)", ExitCode::Unauthorized);
    }

    match client.customer().await {
        Ok(customer) => printed(output, output.print(&customer)),
        Err(e) => api_failure(output, "Customer lookup failed", e),
    }
}

pub async fn switch_customer_cmd(cmd: SwitchCustomerCmd, client: &ApiClient, output: &Output) -> ExitCode {
    if !client.session().snapshot().is_authenticated() {
        return output.error("Not signed in (run `wiltv login`)", ExitCode::Unauthorized);
    }

    output.info(format!("Switching to customer {}...", cmd.customer_id));
    if let Err(e) = client.token_for_customer(cmd.customer_id).await {
        return api_failure(output, "Customer switch failed", e);
    }

    let customer = match client.customer().await {
        Ok(customer) => customer,
        Err(e) => return api_failure(output, "Customer lookup failed", e),
    };
    let stored = client.session().update(|s| {
        s.user_id = Some(customer.id.to_string());
        s.customer_name = customer.name.clone();
        s.profile_photo_path = customer.profile_photo.clone();
    });
    if let Err(e) = stored {
        return api_failure(output, "Customer switch failed", e.into());
    }

    output.info(format!("Now using: {}", customer));
    printed(output, output.print(&customer))
}

pub async fn channel_auth_cmd(cmd: ChannelAuthCmd, client: &ApiClient, output: &Output) -> ExitCode {
    match client.authorize_channel(&cmd.socket_id, &cmd.channel).await {
        Ok(auth) => printed(output, output.print(&auth)),
        Err(e) => api_failure(output, "Channel authorization failed", e),
    }
}

// =============================================================================
// Browse Commands
// =============================================================================

pub async fn catalogs_cmd(cmd: TypeCmd, client: &ApiClient, output: &Output) -> ExitCode {
    let media: MediaType = cmd.media_type.into();
    output.info(format!("Fetching {} catalogs...", media));

    match client.catalogs(media).await {
        Ok(catalogs) => printed(output, output.print_list(&catalogs)),
        Err(e) => api_failure(output, "Catalog fetch failed", e),
    }
}

pub async fn genres_cmd(cmd: TypeCmd, client: &ApiClient, output: &Output) -> ExitCode {
    let media: MediaType = cmd.media_type.into();
    output.info(format!("Fetching {} genres...", media));

    match client.genres(media).await {
        Ok(genres) => printed(output, output.print_list(&genres)),
        Err(e) => api_failure(output, "Genre fetch failed", e),
    }
}

pub async fn movies_cmd(cmd: ListCmd, client: &ApiClient, config: &Config, output: &Output) -> ExitCode {
    let query = PageQuery::Movies(cmd.filter());
    list_pages::<Movie>(client, query, &cmd.paging, config, output).await
}

pub async fn shows_cmd(cmd: ListCmd, client: &ApiClient, config: &Config, output: &Output) -> ExitCode {
    let query = PageQuery::TvShows(cmd.filter());
    list_pages::<TvShow>(client, query, &cmd.paging, config, output).await
}

pub async fn search_cmd(cmd: SearchCmd, client: &ApiClient, config: &Config, output: &Output) -> ExitCode {
    if cmd.query.trim().is_empty() {
        return output.error("Search query is empty", ExitCode::InvalidArgs);
    }

    let media: MediaType = cmd.media_type.into();
    output.info(format!("Searching {} for: {}", media, cmd.query));

    let query = PageQuery::Search {
        query: cmd.query.trim().to_string(),
        media,
    };
    match media {
        MediaType::Movie => list_pages::<Movie>(client, query, &cmd.paging, config, output).await,
        MediaType::Tv => list_pages::<TvShow>(client, query, &cmd.paging, config, output).await,
    }
}

pub async fn providers_cmd(cmd: PageCmd, client: &ApiClient, config: &Config, output: &Output) -> ExitCode {
    list_pages::<StreamingProvider>(client, PageQuery::StreamingProviders, &cmd, config, output).await
}

pub async fn movie_cmd(cmd: IdCmd, client: &ApiClient, output: &Output) -> ExitCode {
    match client.movie(cmd.id).await {
        Ok(movie) => printed(output, output.print(&movie)),
        Err(e) => api_failure(output, "Movie lookup failed", e),
    }
}

pub async fn show_cmd(cmd: IdCmd, client: &ApiClient, output: &Output) -> ExitCode {
    match client.tv_show(cmd.id).await {
        Ok(show) => printed(output, output.print(&show)),
        Err(e) => api_failure(output, "TV show lookup failed", e),
    }
}

/// Print one page, or every page with `--all`
async fn list_pages<T>(
    client: &ApiClient,
    query: PageQuery,
    paging: &PageCmd,
    config: &Config,
    output: &Output,
) -> ExitCode
where
    T: DeserializeOwned + Serialize + Display,
{
    let per_page = paging.limit.unwrap_or(config.page_size);

    if paging.all {
        return match client
            .pager::<T>(query, per_page)
            .into_stream()
            .try_concat()
            .await
        {
            Ok(items) => printed(output, output.print_list(&items)),
            Err(e) => api_failure(output, "Listing failed", e),
        };
    }

    match client.fetch_page::<T>(&query, paging.page.max(1), per_page).await {
        Ok(page) => {
            if output.json {
                let page_output = PageOutput {
                    page: page.current_page,
                    last_page: page.last_page,
                    total: page.total,
                    items: page.items,
                };
                return printed(output, output.print(page_output));
            }
            output.info(format!("Page {} of {}", page.current_page, page.last_page));
            printed(output, output.print_list(&page.items))
        }
        Err(e) => api_failure(output, "Listing failed", e),
    }
}

// =============================================================================
// Play Command
// =============================================================================

pub async fn play_cmd(cmd: PlayCmd, client: &ApiClient, config: &Config, output: &Output) -> ExitCode {
    let media: MediaType = cmd.media_type.into();

    let resolved = match media {
        MediaType::Movie => client
            .movie(cmd.id)
            .await
            .map(|m| (m.title.clone(), m.video_url)),
        MediaType::Tv => client.tv_show(cmd.id).await.map(|show| {
            let episode = match cmd.episode {
                Some(id) => show
                    .seasons
                    .iter()
                    .flat_map(|s| s.episodes.iter())
                    .find(|e| e.id == id),
                None => show.first_episode(),
            };
            match episode {
                Some(e) => (format!("{} - {}", show.title, e.title), e.video_url.clone()),
                None => (show.title.clone(), None),
            }
        }),
    };

    let (title, url) = match resolved {
        Ok(resolved) => resolved,
        Err(e) => return api_failure(output, "Title lookup failed", e),
    };
    let Some(url) = url else {
        return output.error(PlayerError::NoStream(title).to_string(), ExitCode::NotFound);
    };

    let player = LocalPlayer::new(cmd.player.unwrap_or(config.player));
    output.info(format!("Playing {} in {}...", title, player.player_type()));

    let result = if cmd.detach {
        player.play(&url, &title).map(|_| ())
    } else {
        player.play_and_wait(&url, &title).await
    };

    match result {
        Ok(()) => printed(output, output.print(StatusOk::default())),
        Err(e) => output.error(e.to_string(), ExitCode::PlayerFailed),
    }
}
