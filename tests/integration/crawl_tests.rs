//! Integration tests for the votes crawl
//!
//! These tests replay saved pages through the fixture fetcher and use
//! wiremock to create mock HTTP servers for the full export cycle.

use kpvotes::config::{Config, HttpConfig};
use kpvotes::crawler::{votes_page_url, FetchError, FixtureFetcher, HttpFetcher, PageError, VoteCrawler};
use kpvotes::domain::{TitleId, UserId};
use kpvotes::resolver::{search_url, ImdbResolver, MemoryCache, TitleCache};
use kpvotes::runner::run_with_fetcher;
use kpvotes::KpError;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOST: &str = "https://www.kinopoisk.ru";
const FIND_URL: &str = "https://www.imdb.com/find/";

const RESOLVED_TITLE: &str = "Anatomie d'une chute (2023)";
const UNRESOLVED_TITLE: &str = "Unresolvable Movie (1901)";

const VOTES_PAGE1: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/votes_page1.html");
const VOTES_PAGE2: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/votes_page2.html");
const VOTES_EMPTY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/votes_empty.html");
const IMDB_FIND: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/imdb_find.html");
const IMDB_FIND_EMPTY: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/imdb_find_empty.html");

fn user() -> UserId {
    UserId::new(12345)
}

fn find_url() -> Url {
    Url::parse(FIND_URL).unwrap()
}

fn page_url(page: u32) -> String {
    votes_page_url(HOST, user(), page)
}

fn find_page_url(title: &str) -> String {
    search_url(&find_url(), title).to_string()
}

/// Fixture fetcher serving two votes pages and both search results
fn two_page_fetcher() -> FixtureFetcher {
    FixtureFetcher::new()
        .with_page(page_url(1), VOTES_PAGE1)
        .with_page(page_url(2), VOTES_PAGE2)
        .with_page(find_page_url(RESOLVED_TITLE), IMDB_FIND)
        .with_page(find_page_url(UNRESOLVED_TITLE), IMDB_FIND_EMPTY)
}

fn create_test_config(host: &str, find_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.kinopoisk.host = host.to_string();
    config.imdb.find_url = find_url.to_string();
    config.output.target_path = dir.join("votes.csv");
    config.output.cache_path = Some(dir.join("cache.jsonl"));
    config
}

fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(path).expect("Failed to read fixture")
}

#[tokio::test]
async fn test_fixture_crawl_end_to_end() {
    let fetcher = Arc::new(two_page_fetcher());
    let cache = Arc::new(MemoryCache::new());
    let resolver = Arc::new(ImdbResolver::new(fetcher.clone(), cache.clone(), find_url()));
    let crawler = VoteCrawler::new(fetcher.clone(), resolver, HOST);

    let votes = crawler
        .read_votes(user(), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(votes.len(), 1);

    let vote = &votes.as_slice()[0];
    assert_eq!(vote.movie_url, "/film/4985498/");
    assert_eq!(vote.movie_name_ru, "Анатомия падения");
    assert_eq!(vote.movie_name_original.as_deref(), Some("Anatomie d'une chute"));
    assert_eq!(vote.movie_year.as_deref(), Some("2023"));
    assert_eq!(vote.rate, 8);
    assert_eq!(vote.imdb_id, TitleId::from("tt17009710"));
    assert_eq!(
        vote.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        "2023-11-12 21:37"
    );

    // The duplicate item is answered from the cache, page 3 is never requested
    assert_eq!(
        fetcher.requested(),
        vec![
            page_url(1),
            find_page_url(RESOLVED_TITLE),
            find_page_url(UNRESOLVED_TITLE),
            page_url(2),
        ]
    );
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached() {
    let fetcher = Arc::new(two_page_fetcher());
    let cache = Arc::new(MemoryCache::new());
    let resolver = Arc::new(ImdbResolver::new(fetcher.clone(), cache.clone(), find_url()));
    let crawler = VoteCrawler::new(fetcher, resolver, HOST);

    crawler
        .read_votes(user(), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get_title_id(RESOLVED_TITLE),
        Some(TitleId::from("tt17009710"))
    );
    assert_eq!(cache.get_title_id(UNRESOLVED_TITLE), None);
}

#[tokio::test]
async fn test_empty_first_page_ends_crawl() {
    let fetcher = Arc::new(FixtureFetcher::new().with_page(page_url(1), VOTES_EMPTY));
    let resolver = Arc::new(ImdbResolver::new(
        fetcher.clone(),
        Arc::new(MemoryCache::new()),
        find_url(),
    ));
    let crawler = VoteCrawler::new(fetcher.clone(), resolver, HOST);

    let votes = crawler
        .read_votes(user(), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(votes.is_empty());
    assert_eq!(fetcher.requested(), vec![page_url(1)]);
}

#[tokio::test]
async fn test_nothing_found_first_page_ends_crawl() {
    let fetcher = Arc::new(FixtureFetcher::new().with_page(page_url(1), VOTES_PAGE2));
    let resolver = Arc::new(ImdbResolver::new(
        fetcher.clone(),
        Arc::new(MemoryCache::new()),
        find_url(),
    ));
    let crawler = VoteCrawler::new(fetcher.clone(), resolver, HOST);

    let votes = crawler
        .read_votes(user(), &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(votes.is_empty());
    assert_eq!(fetcher.requested(), vec![page_url(1)]);
}

#[tokio::test]
async fn test_first_page_error_is_reported_with_page() {
    let fetcher = Arc::new(FixtureFetcher::new());
    let resolver = Arc::new(ImdbResolver::new(
        fetcher.clone(),
        Arc::new(MemoryCache::new()),
        find_url(),
    ));
    let crawler = VoteCrawler::new(fetcher, resolver, HOST);

    let err = crawler
        .read_votes(user(), &CancellationToken::new())
        .await
        .err()
        .expect("Crawl should fail");

    match &err {
        KpError::ReadPage { page, user: u, source } => {
            assert_eq!(*page, 1);
            assert_eq!(*u, user());
            assert!(matches!(source, PageError::Fetch(FetchError::NotFound { .. })));
        }
        other => panic!("unexpected error: {}", other),
    }

    let message = err.to_string();
    assert!(message.contains("#1"));
    assert!(message.contains("12345"));
}

#[tokio::test]
async fn test_cancelled_crawl() {
    let fetcher = Arc::new(two_page_fetcher());
    let resolver = Arc::new(ImdbResolver::new(
        fetcher.clone(),
        Arc::new(MemoryCache::new()),
        find_url(),
    ));
    let crawler = VoteCrawler::new(fetcher.clone(), resolver, HOST);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = crawler
        .read_votes(user(), &cancel)
        .await
        .err()
        .expect("Crawl should be cancelled");

    assert!(err.is_cancelled());
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn test_run_writes_csv_and_cache() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(HOST, FIND_URL, dir.path());
    let fetcher = Arc::new(two_page_fetcher());

    let summary = run_with_fetcher(&config, user(), fetcher, &CancellationToken::new())
        .await
        .expect("Run failed");

    assert_eq!(summary.votes, 1);
    assert_eq!(summary.files, vec![dir.path().join("votes.csv")]);

    let csv = std::fs::read_to_string(dir.path().join("votes.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Const,Your Rating,Date Rated,Title,URL,"));
    assert_eq!(
        lines[1],
        "tt17009710,8,2023-11-12,Anatomie d'une chute (2023),https://www.imdb.com/title/tt17009710,,,,,,,,"
    );

    let cache = std::fs::read_to_string(dir.path().join("cache.jsonl")).unwrap();
    assert_eq!(
        cache,
        "{\"title\":\"Anatomie d'une chute (2023)\",\"id\":\"tt17009710\"}\n"
    );
}

#[tokio::test]
async fn test_run_uses_imported_cache() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(HOST, FIND_URL, dir.path());
    std::fs::write(
        dir.path().join("cache.jsonl"),
        "{\"title\":\"Anatomie d'une chute (2023)\",\"id\":\"tt17009710\"}\n\
         {\"title\":\"Solaris (1972)\",\"id\":\"tt0069293\"}\n",
    )
    .unwrap();

    let fetcher = Arc::new(two_page_fetcher());

    let summary = run_with_fetcher(&config, user(), fetcher.clone(), &CancellationToken::new())
        .await
        .expect("Run failed");

    assert_eq!(summary.votes, 1);
    assert!(!fetcher
        .requested()
        .contains(&find_page_url(RESOLVED_TITLE)));

    // Entries not seen during the run are kept
    let cache = std::fs::read_to_string(dir.path().join("cache.jsonl")).unwrap();
    assert_eq!(cache.lines().count(), 2);
    assert!(cache.contains("tt0069293"));
}

#[tokio::test]
async fn test_run_saves_cache_when_crawl_fails() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(HOST, FIND_URL, dir.path());

    // Page 2 is missing, so the crawl fails after page 1 was resolved
    let fetcher = Arc::new(
        FixtureFetcher::new()
            .with_page(page_url(1), VOTES_PAGE1)
            .with_page(find_page_url(RESOLVED_TITLE), IMDB_FIND)
            .with_page(find_page_url(UNRESOLVED_TITLE), IMDB_FIND_EMPTY),
    );

    let result = run_with_fetcher(&config, user(), fetcher, &CancellationToken::new()).await;

    assert!(matches!(result, Err(KpError::ReadPage { page: 2, .. })));
    assert!(!dir.path().join("votes.csv").exists());

    let cache = std::fs::read_to_string(dir.path().join("cache.jsonl")).unwrap();
    assert!(cache.contains("tt17009710"));
}

#[tokio::test]
async fn test_run_chunked_output() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(HOST, FIND_URL, dir.path());
    config.output.chunk_size = 100;

    let summary = run_with_fetcher(
        &config,
        user(),
        Arc::new(two_page_fetcher()),
        &CancellationToken::new(),
    )
    .await
    .expect("Run failed");

    assert_eq!(summary.files, vec![dir.path().join("votes.0.csv")]);
    assert!(!dir.path().join("votes.csv").exists());
}

#[tokio::test]
async fn test_full_export_over_http() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let votes_path = |page: u32| format!("/user/12345/votes/list/vs/vote/perpage/200/page/{}", page);

    Mock::given(method("GET"))
        .and(path(votes_path(1)))
        .and(header("accept", "text/html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(read_fixture(VOTES_PAGE1))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(votes_path(2)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(read_fixture(VOTES_PAGE2))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(votes_path(3)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    // One search per distinct title; the duplicate comes from the cache
    Mock::given(method("GET"))
        .and(path("/find/"))
        .and(query_param("s", "all"))
        .and(query_param("q", RESOLVED_TITLE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(read_fixture(IMDB_FIND))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/find/"))
        .and(query_param("q", UNRESOLVED_TITLE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(read_fixture(IMDB_FIND_EMPTY))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &format!("{}/find/", base_url), dir.path());
    let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).expect("Failed to build client"));

    let summary = run_with_fetcher(&config, user(), fetcher, &CancellationToken::new())
        .await
        .expect("Export failed");

    assert_eq!(summary.votes, 1);

    let csv = std::fs::read_to_string(&summary.files[0]).unwrap();
    assert!(csv.contains("tt17009710,8,2023-11-12"));
}

#[tokio::test]
async fn test_http_error_aborts_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &mock_server.uri(),
        &format!("{}/find/", mock_server.uri()),
        dir.path(),
    );
    let fetcher = Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap());

    let result = run_with_fetcher(&config, user(), fetcher, &CancellationToken::new()).await;

    match result {
        Err(KpError::ReadPage {
            page: 1,
            source: PageError::Fetch(FetchError::Status { status, .. }),
            ..
        }) => assert_eq!(status, 503),
        other => panic!("unexpected result: {:?}", other.map(|s| s.votes)),
    }
}
