//! Incremental page loading
//!
//! List endpoints return a Laravel-style paginator. [`Pager`] walks it page by
//! page for the scrolling rows, and can be turned into a `futures::Stream`.

use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ApiRequest, ListFilter};
use crate::models::MediaType;

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page of results plus the continuation cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// Page number to request next, `None` once the last page was served
    pub fn next_page(&self) -> Option<u32> {
        (self.current_page < self.last_page).then(|| self.current_page + 1)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            last_page: self.last_page,
            total: self.total,
        }
    }
}

/// Wire form of a paginated response
#[derive(Debug, Deserialize)]
pub(crate) struct Paginated<T> {
    data: Option<Vec<T>>,
    #[serde(default = "first_page")]
    current_page: u32,
    #[serde(default = "first_page")]
    last_page: u32,
    total: Option<u64>,
}

fn first_page() -> u32 {
    1
}

impl<T> Paginated<T> {
    // A null `data` is an empty page rather than an error
    pub(crate) fn into_page(self) -> Page<T> {
        Page {
            items: self.data.unwrap_or_default(),
            current_page: self.current_page,
            last_page: self.last_page.max(self.current_page),
            total: self.total,
        }
    }
}

/// Which paginated endpoint a pager walks
#[derive(Debug, Clone, PartialEq)]
pub enum PageQuery {
    Movies(ListFilter),
    TvShows(ListFilter),
    Search { query: String, media: MediaType },
    StreamingProviders,
}

impl PageQuery {
    /// Listing of `media` titles under `filter`
    pub fn titles(media: MediaType, filter: ListFilter) -> Self {
        match media {
            MediaType::Movie => PageQuery::Movies(filter),
            MediaType::Tv => PageQuery::TvShows(filter),
        }
    }

    pub(crate) fn request(&self, page: u32, per_page: u32) -> ApiRequest {
        let req = match self {
            PageQuery::Movies(filter) => filter.apply(ApiRequest::get("/movies")),
            PageQuery::TvShows(filter) => filter.apply(ApiRequest::get("/tv-shows")),
            PageQuery::Search { query, media } => ApiRequest::get("/search")
                .param("query", query)
                .param("type", media.as_param()),
            PageQuery::StreamingProviders => ApiRequest::get("/streaming-providers"),
        };
        req.param("page", page).param("per_page", per_page)
    }
}

/// Walks a paginated endpoint from page 1 until the cursor runs out
#[derive(Debug)]
pub struct Pager<T> {
    client: ApiClient,
    query: PageQuery,
    per_page: u32,
    next: Option<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Pager<T> {
    pub fn new(client: ApiClient, query: PageQuery, per_page: u32) -> Self {
        Self {
            client,
            query,
            per_page: per_page.max(1),
            next: Some(1),
            _marker: PhantomData,
        }
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Fetch the next page, `Ok(None)` once exhausted
    ///
    /// A failed fetch leaves the cursor in place so the same page can be
    /// requested again.
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>, ApiError> {
        let Some(page) = self.next else {
            return Ok(None);
        };

        let result: Page<T> = self.client.fetch_page(&self.query, page, self.per_page).await?;
        debug!(
            query = ?self.query,
            page,
            items = result.items.len(),
            last_page = result.last_page,
            "page loaded"
        );
        self.next = result.next_page();
        Ok(Some(result))
    }

    /// Stream of page contents; ends after the last page or the first error
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>, ApiError>> {
        stream::unfold(Some(self), |state| async move {
            let mut pager = state?;
            match pager.next_page().await {
                Ok(Some(page)) => Some((Ok(page.items), Some(pager))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

impl ApiClient {
    /// Fetch one page of `query`
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        query: &PageQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Page<T>, ApiError> {
        let req = query.request(page, per_page);
        let response: Paginated<T> = self.send_authorized(&req).await?;
        Ok(response.into_page())
    }

    /// Pager over `query` starting at page 1
    pub fn pager<T: DeserializeOwned>(&self, query: PageQuery, per_page: u32) -> Pager<T> {
        Pager::new(self.clone(), query, per_page)
    }
}
