use crate::{create_test_config, html, page, page_paths, start_url, LONG_TEXT};
use site_harvest::crawler::Crawler;
use site_harvest::{CrawlError, StopReason};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, at: &str, title: &str, text: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(page(title, text, links)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_breadth_first_acceptance_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "A", LONG_TEXT, &["/b", "/c"]).await;
    mount_page(&server, "/b", "B", LONG_TEXT, &["/d"]).await;
    mount_page(&server, "/c", "C", LONG_TEXT, &[]).await;
    mount_page(&server, "/d", "D", LONG_TEXT, &[]).await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/b", "/c", "/d"]);
    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.fetch_count, 4);
    assert_eq!(outcome.pages[0].title, "A");
    assert_eq!(outcome.pages[0].content, LONG_TEXT);
    assert_eq!(
        outcome.pages[0].word_count,
        LONG_TEXT.split_whitespace().count()
    );
}

#[tokio::test]
async fn test_cycles_fetch_each_url_once() {
    let server = MockServer::start().await;
    for (at, links) in [
        ("/", vec!["/x", "/y", "/"]),
        ("/x", vec!["/y", "/", "/x"]),
        ("/y", vec!["/x", "/"]),
    ] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html(page(at, LONG_TEXT, &links)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/x", "/y"]);
    assert_eq!(outcome.fetch_count, 3);
    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
}

#[tokio::test]
async fn test_page_cap_limits_fetches() {
    let server = MockServer::start().await;
    let links: Vec<String> = (1..=9).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(|s| s.as_str()).collect();
    mount_page(&server, "/", "Home", LONG_TEXT, &link_refs).await;
    for link in &links {
        mount_page(&server, link, link, LONG_TEXT, &[]).await;
    }

    let mut config = create_test_config(&server);
    config.crawler.max_pages = 3;
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(outcome.fetch_count, 3);
    assert_eq!(page_paths(&outcome.pages), vec!["/", "/p1", "/p2"]);
    assert_eq!(outcome.stop_reason, StopReason::PageCapReached);
}

#[tokio::test]
async fn test_links_per_page_cap() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", LONG_TEXT, &["/a", "/b", "/c", "/d"]).await;
    for at in ["/a", "/b"] {
        mount_page(&server, at, at, LONG_TEXT, &[]).await;
    }
    for at in ["/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html(page(at, LONG_TEXT, &[])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&server);
    config.crawler.links_per_page_cap = 2;
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_content_threshold_is_strictly_greater() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", LONG_TEXT, &["/short", "/exact", "/long"]).await;
    mount_page(&server, "/short", "Short", &"a".repeat(49), &[]).await;
    mount_page(&server, "/exact", "Exact", &"b".repeat(50), &[]).await;
    mount_page(&server, "/long", "Long", &"c".repeat(51), &[]).await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/long"]);
    assert!(outcome
        .trace
        .iter()
        .any(|line| line == "✗ Skipped: Short (only 49 chars)"));
    assert!(outcome
        .trace
        .iter()
        .any(|line| line == "✗ Skipped: Exact (only 50 chars)"));
}

#[tokio::test]
async fn test_forced_seed_accepted_when_short() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Index", "tiny", &["/child"]).await;
    mount_page(&server, "/child", "Child", "also tiny", &[]).await;

    let mut config = create_test_config(&server);
    config.crawler.force_include_seed = true;
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/"]);
    assert_eq!(outcome.pages[0].content, "tiny");
}

#[tokio::test]
async fn test_short_seed_skipped_by_default_but_links_followed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Index", "tiny", &["/child"]).await;
    mount_page(&server, "/child", "Child", LONG_TEXT, &[]).await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/child"]);
}

#[tokio::test]
async fn test_page_errors_do_not_abort_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", LONG_TEXT, &["/missing", "/ok"]).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "Ok", LONG_TEXT, &[]).await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/ok"]);
    assert!(outcome
        .trace
        .iter()
        .any(|line| line.starts_with("✗ Error scraping") && line.contains("/missing")));
}

#[tokio::test]
async fn test_seed_failure_fails_run_with_trace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let failure = crawler.run(start_url(&server)).await.unwrap_err();

    assert!(matches!(failure.error, CrawlError::Seed { .. }));
    assert!(failure.trace.iter().any(|line| line.contains("HTTP 503")));
}

#[tokio::test]
async fn test_utility_and_foreign_links_not_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Home",
        LONG_TEXT,
        &[
            "/login",
            "/search?q=x",
            "/sitemap",
            "/agenda.pdf",
            "https://www.facebook.com/example",
            "/about",
        ],
    )
    .await;
    mount_page(&server, "/about", "About", LONG_TEXT, &[]).await;
    for at in ["/login", "/search", "/sitemap", "/agenda.pdf"] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html(page(at, LONG_TEXT, &[])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/about"]);
}

#[tokio::test]
async fn test_redirect_records_final_url_and_marks_it_visited() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", LONG_TEXT, &["/old", "/new"]).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(page("New", LONG_TEXT, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/new"]);
}

#[tokio::test]
async fn test_time_budget_stops_crawl() {
    let server = MockServer::start().await;
    let links: Vec<String> = (1..=9).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(|s| s.as_str()).collect();
    Mock::given(method("GET"))
        .respond_with(
            html(page("Slow", LONG_TEXT, &link_refs)).set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.crawler.max_wall_clock_ms = 1_000;
    config.crawler.fetch_timeout_ms = 1_000;
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();

    let started = Instant::now();
    let outcome = crawler.run(start_url(&server)).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome.stop_reason, StopReason::TimeBudgetExceeded);
    assert!(outcome.fetch_count >= 2 && outcome.fetch_count < 10);
    assert!(elapsed < Duration::from_millis(2_000 + 500));
}

#[tokio::test]
async fn test_politeness_delay_between_fetches() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", LONG_TEXT, &["/a", "/b"]).await;
    mount_page(&server, "/a", "A", LONG_TEXT, &[]).await;
    mount_page(&server, "/b", "B", LONG_TEXT, &[]).await;

    let mut config = create_test_config(&server);
    config.crawler.inter_request_delay_ms = 150;
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();

    let started = Instant::now();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(outcome.fetch_count, 3);
    // Two delays: none before the first fetch, none after the last
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_off_domain_redirect_not_recorded() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    // Same port space, different host name, so the scope check decides
    let foreign = format!("http://localhost:{}/elsewhere", elsewhere.address().port());

    mount_page(&server, "/", "Home", LONG_TEXT, &["/out", "/stay"]).await;
    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", foreign.as_str()))
        .mount(&server)
        .await;
    mount_page(&server, "/stay", "Stay", LONG_TEXT, &[]).await;
    mount_page(&elsewhere, "/elsewhere", "Elsewhere", LONG_TEXT, &["/more"]).await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/", "/stay"]);
    assert!(outcome
        .pages
        .iter()
        .all(|page| page.url.starts_with(&server.uri())));
    assert!(outcome
        .trace
        .iter()
        .any(|line| line.contains("redirects off-domain to") && line.contains("/elsewhere")));
}

#[tokio::test]
async fn test_legacy_charset_page_is_kept() {
    let server = MockServer::start().await;
    let mut body = b"<html><head><title>Caf".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b"</title></head><body><main><p>");
    body.extend_from_slice(LONG_TEXT.as_bytes());
    body.extend_from_slice(b"</p></main></body></html>");
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let crawler = Crawler::from_config(&config, &start_url(&server)).unwrap();
    let outcome = crawler.run(start_url(&server)).await.unwrap();

    assert_eq!(page_paths(&outcome.pages), vec!["/"]);
    assert_eq!(outcome.pages[0].title, "Caf\u{fffd}");
    assert_eq!(outcome.pages[0].content, LONG_TEXT);
}
