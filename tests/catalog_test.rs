//! Catalog fetcher tests
//!
//! Verifies query parameters for each browse listing and how null or missing
//! payloads are treated.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use tempfile::TempDir;
use wiltv::{ApiClient, ListFilter, MediaItem, MediaType, SessionStore};

async fn signed_in_client(server: &ServerGuard, dir: &TempDir) -> ApiClient {
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();
    store.set_token("token-1").unwrap();
    ApiClient::new(server.url(), Arc::new(store))
}

#[tokio::test]
async fn test_catalogs_by_type() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let mock = server
        .mock("GET", "/catalogs")
        .match_header("authorization", "Bearer token-1")
        .match_query(Matcher::UrlEncoded("type".into(), "tv".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"id": 3, "name": "Kids"}, {"id": 8, "name": "Drama"}]}"#)
        .create_async()
        .await;

    let catalogs = client.catalogs(MediaType::Tv).await.unwrap();
    mock.assert_async().await;

    assert_eq!(catalogs.len(), 2);
    assert_eq!(catalogs[0].name, "Kids");
    assert_eq!(catalogs[1].id, 8);
}

#[tokio::test]
async fn test_null_genre_list_is_empty() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let _mock = server
        .mock("GET", "/genres")
        .match_query(Matcher::UrlEncoded("type".into(), "movie".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": null}"#)
        .create_async()
        .await;

    let genres = client.genres(MediaType::Movie).await.unwrap();
    assert!(genres.is_empty());
}

#[tokio::test]
async fn test_hero_movies_page() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let mock = server
        .mock("GET", "/movies")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("hero_section".into(), "1".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("per_page".into(), "5".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "data": [
                    {"id": 381, "title": "Heat", "year": 1995, "rating": 8.3, "duration": 170},
                    {"id": 12, "title": "Ronin", "year": 1998}
                ],
                "current_page": 1,
                "last_page": 4,
                "total": 18
            }"#,
        )
        .create_async()
        .await;

    let page = client.movies(ListFilter::Hero, 1, 5).await.unwrap();
    mock.assert_async().await;

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "Heat");
    assert_eq!(page.items[0].format_duration().as_deref(), Some("2h 50m"));
    assert_eq!(page.next_page(), Some(2));
    assert_eq!(page.total, Some(18));
}

#[tokio::test]
async fn test_catalog_row_titles_as_media_items() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let mock = server
        .mock("GET", "/tv-shows")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("catalog_id".into(), "3".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": [{"id": 77, "title": "Dark", "seasons": []}], "current_page": 2, "last_page": 2}"#,
        )
        .create_async()
        .await;

    let page = client
        .titles(MediaType::Tv, ListFilter::Catalog(3), 2, 20)
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(page.items.len(), 1);
    assert!(matches!(&page.items[0], MediaItem::Tv(show) if show.title == "Dark"));
    assert_eq!(page.next_page(), None);
}

#[tokio::test]
async fn test_show_detail_with_episodes() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let _mock = server
        .mock("GET", "/tv-shows/77")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": {
                "id": 77,
                "title": "Dark",
                "seasons": [
                    {"id": 1, "number": 1, "episodes": [
                        {"id": 101, "number": 1, "title": "Secrets", "video_url": "https://cdn.example/dark/101.m3u8"}
                    ]}
                ]
            }}"#,
        )
        .create_async()
        .await;

    let item = client.title(MediaType::Tv, 77).await.unwrap();
    let MediaItem::Tv(show) = item else {
        panic!("expected a TV show");
    };
    let first = show.first_episode().unwrap();
    assert_eq!(first.id, 101);
    assert_eq!(first.video_url.as_deref(), Some("https://cdn.example/dark/101.m3u8"));
}

#[tokio::test]
async fn test_search_sends_query_and_type() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "the thing".into()),
            Matcher::UrlEncoded("type".into(), "movie".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"id": 9, "title": "The Thing", "year": 1982}], "current_page": 1, "last_page": 1}"#)
        .create_async()
        .await;

    let page = client.search("the thing", MediaType::Movie, 1, 20).await.unwrap();
    mock.assert_async().await;

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title(), "The Thing");
    assert_eq!(page.items[0].media_type(), MediaType::Movie);
}

#[tokio::test]
async fn test_streaming_providers_page() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = signed_in_client(&server, &dir).await;

    let _mock = server
        .mock("GET", "/streaming-providers")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"id": 2, "name": "Cinemax"}], "current_page": 1, "last_page": 1}"#)
        .create_async()
        .await;

    let page = client.streaming_providers(1, 20).await.unwrap();
    assert_eq!(page.items[0].to_string(), "Cinemax #2");
}
