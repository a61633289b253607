//! Catalog, genre, title, search and provider fetchers
//!
//! Thin parameter marshaling over [`ApiClient::send_authorized`]; each one maps
//! a browse need (hero row, catalog row, genre row, search) to an endpoint.

use serde::Deserialize;

use super::client::{ApiClient, ApiError, ApiRequest, DataEnvelope};
use crate::models::{Catalog, Genre, MediaItem, MediaType, Movie, StreamingProvider, TvShow};
use crate::paging::{Page, PageQuery};

/// Filter applied to the movie / TV show listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListFilter {
    #[default]
    All,
    /// Featured titles for the hero carousel
    Hero,
    Catalog(u64),
    Genre(u64),
}

impl ListFilter {
    pub(crate) fn apply(&self, req: ApiRequest) -> ApiRequest {
        match self {
            ListFilter::All => req,
            ListFilter::Hero => req.param("hero_section", 1),
            ListFilter::Catalog(id) => req.param("catalog_id", id),
            ListFilter::Genre(id) => req.param("genre_id", id),
        }
    }
}

/// `{"data": [...]}` list wrapper
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Option<Vec<T>>,
}

impl ApiClient {
    /// Catalogs for movies or TV
    pub async fn catalogs(&self, media: MediaType) -> Result<Vec<Catalog>, ApiError> {
        let req = ApiRequest::get("/catalogs").param("type", media.as_param());
        let envelope: ListEnvelope<Catalog> = self.send_authorized(&req).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Genres for movies or TV
    pub async fn genres(&self, media: MediaType) -> Result<Vec<Genre>, ApiError> {
        let req = ApiRequest::get("/genres").param("type", media.as_param());
        let envelope: ListEnvelope<Genre> = self.send_authorized(&req).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn movies(&self, filter: ListFilter, page: u32, per_page: u32) -> Result<Page<Movie>, ApiError> {
        self.fetch_page(&PageQuery::Movies(filter), page, per_page).await
    }

    pub async fn tv_shows(&self, filter: ListFilter, page: u32, per_page: u32) -> Result<Page<TvShow>, ApiError> {
        self.fetch_page(&PageQuery::TvShows(filter), page, per_page).await
    }

    /// One page of movies or shows as [`MediaItem`]s
    pub async fn titles(
        &self,
        media: MediaType,
        filter: ListFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<MediaItem>, ApiError> {
        match media {
            MediaType::Movie => Ok(self.movies(filter, page, per_page).await?.map(MediaItem::from)),
            MediaType::Tv => Ok(self.tv_shows(filter, page, per_page).await?.map(MediaItem::from)),
        }
    }

    pub async fn movie(&self, id: u64) -> Result<Movie, ApiError> {
        let envelope: DataEnvelope<Movie> =
            self.send_authorized(&ApiRequest::get(format!("/movies/{}", id))).await?;
        envelope.data.ok_or(ApiError::EmptyBody)
    }

    pub async fn tv_show(&self, id: u64) -> Result<TvShow, ApiError> {
        let envelope: DataEnvelope<TvShow> =
            self.send_authorized(&ApiRequest::get(format!("/tv-shows/{}", id))).await?;
        envelope.data.ok_or(ApiError::EmptyBody)
    }

    /// Full record for a title of either kind
    pub async fn title(&self, media: MediaType, id: u64) -> Result<MediaItem, ApiError> {
        match media {
            MediaType::Movie => Ok(self.movie(id).await?.into()),
            MediaType::Tv => Ok(self.tv_show(id).await?.into()),
        }
    }

    /// Search titles of one media type
    pub async fn search(
        &self,
        query: &str,
        media: MediaType,
        page: u32,
        per_page: u32,
    ) -> Result<Page<MediaItem>, ApiError> {
        let page_query = PageQuery::Search {
            query: query.to_string(),
            media,
        };
        match media {
            MediaType::Movie => Ok(self
                .fetch_page::<Movie>(&page_query, page, per_page)
                .await?
                .map(MediaItem::from)),
            MediaType::Tv => Ok(self
                .fetch_page::<TvShow>(&page_query, page, per_page)
                .await?
                .map(MediaItem::from)),
        }
    }

    pub async fn streaming_providers(&self, page: u32, per_page: u32) -> Result<Page<StreamingProvider>, ApiError> {
        self.fetch_page(&PageQuery::StreamingProviders, page, per_page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params() {
        let base = || ApiRequest::get("/movies");
        assert!(ListFilter::All.apply(base()).query.is_empty());
        assert_eq!(
            ListFilter::Catalog(9).apply(base()).query,
            vec![("catalog_id".to_string(), "9".to_string())]
        );
        assert_eq!(
            ListFilter::Hero.apply(base()).query,
            vec![("hero_section".to_string(), "1".to_string())]
        );
    }
}
