//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitewalk::config::Config;
use sitewalk::crawler::{crawl, run_crawl, CancelHandle, Coordinator};
use sitewalk::output::OutputFormat;
use sitewalk::state::PageState;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &TempDir, max_depth: u32, format: OutputFormat) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.request_timeout = 5;
    config.output.directory = dir.path().to_path_buf();
    config.output.format = format;
    config
}

/// An HTML page linking to each of `links`
fn html_page(links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect::<Vec<_>>()
        .join("\n");

    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            anchors
        ))
        .insert_header("content-type", "text/html")
}

fn seed_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse mock server URI")
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(str::to_string)
        .collect()
}

fn sorted(mut urls: Vec<String>) -> Vec<String> {
    urls.sort();
    urls
}

#[tokio::test]
async fn test_depth_one_records_only_seed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            "c".to_string(),
        ]))
        .expect(1)
        .mount(&mock_server)
        .await;

    for child in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(child))
            .respond_with(html_page(&[]))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");

    assert_eq!(read_lines(&report.output_path), vec![seed.to_string()]);
    assert_eq!(report.count(PageState::Fetched), 1);
    assert_eq!(report.links_discovered, 3);
    assert_eq!(report.skipped_depth, 3);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_forbidden_seed_is_recorded_without_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403).set_body_string(format!(
            r#"<a href="{}/hidden">hidden</a>"#,
            mock_server.uri()
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 3, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");

    assert_eq!(read_lines(&report.output_path), vec![seed.to_string()]);
    assert_eq!(report.count(PageState::Denied), 1);
    assert_eq!(report.links_discovered, 0);
}

#[tokio::test]
async fn test_robots_disallowed_page_recorded_but_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            format!("{}/private/page", base_url),
            format!("{}/public/page", base_url),
        ]))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Should never be called
    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public/page"))
        .respond_with(html_page(&[format!("{}/public/deeper", base_url)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Depth 2 with max_depth 2: discovered but never fetched
    Mock::given(method("GET"))
        .and(path("/public/deeper"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");

    assert_eq!(
        sorted(read_lines(&report.output_path)),
        sorted(vec![
            seed.to_string(),
            format!("{}/private/page", base_url),
            format!("{}/public/page", base_url),
        ])
    );
    assert_eq!(report.count(PageState::RobotsDisallowed), 1);
    assert_eq!(report.count(PageState::Fetched), 2);
    assert_eq!(report.skipped_depth, 1);
}

#[tokio::test]
async fn test_url_reached_twice_written_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            format!("{}/a", base_url),
            format!("{}/b", base_url),
        ]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(&[
            format!("{}/b", base_url),
            format!("{}/c", base_url),
            format!("{}/", base_url),
        ]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(&[format!("{}/a", base_url)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 3, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");
    let lines = read_lines(&report.output_path);

    assert_eq!(lines.len(), 4);
    assert_eq!(
        sorted(lines),
        sorted(vec![
            seed.to_string(),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/c", base_url),
        ])
    );
    assert_eq!(report.records_written, 4);
    // /b from /a, / from /a, /a from /b
    assert_eq!(report.skipped_duplicates, 3);
}

#[tokio::test]
async fn test_missing_robots_is_fail_open() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[format!("{}/page", base_url)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Text);

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(PageState::Fetched), 2);
    assert_eq!(report.count(PageState::RobotsDisallowed), 0);
}

#[tokio::test]
async fn test_unreachable_origin_is_recorded_and_not_fatal() {
    let mock_server = MockServer::start().await;

    // Nothing listens on port 1: robots.txt and the page both fail to connect
    let unreachable = "http://127.0.0.1:1/nowhere";

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[unreachable.to_string()]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");

    assert_eq!(
        read_lines(&report.output_path),
        vec![seed.to_string(), unreachable.to_string()]
    );
    assert_eq!(report.count(PageState::Failed), 1);
    assert_eq!(report.robots_origins, 2);
}

#[tokio::test]
async fn test_server_error_page_still_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[format!("{}/broken", base_url)]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Text);

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_visited(), 2);
    assert_eq!(report.count(PageState::Failed), 1);
    assert_eq!(report.records_written, 2);
}

#[tokio::test]
async fn test_relative_links_resolve_against_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/index.html"))
        .respond_with(html_page(&["guide.html".to_string(), "../about".to_string()]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/guide.html"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Text);
    let seed = Url::parse(&format!("{}/docs/index.html", mock_server.uri())).unwrap();

    let report = crawl(seed, &config).await.expect("Crawl failed");
    assert_eq!(report.count(PageState::Fetched), 3);
}

#[tokio::test]
async fn test_robots_fetched_once_per_origin() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            format!("{}/one", base_url),
            format!("{}/two", base_url),
            format!("{}/three", base_url),
        ]))
        .mount(&mock_server)
        .await;

    for page in ["/one", "/two", "/three"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(&[]))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Text);

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");
    assert_eq!(report.count(PageState::Fetched), 4);
    assert_eq!(report.robots_origins, 1);
}

#[tokio::test]
async fn test_user_agent_sent_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "sitewalk-test/1.0"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, 1, OutputFormat::Text);
    config.crawler.user_agent = Some("sitewalk-test/1.0".to_string());

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");
    assert_eq!(report.count(PageState::Fetched), 1);
}

#[tokio::test]
async fn test_user_agent_omitted_by_default() {
    let mock_server = MockServer::start().await;

    // Mounted first so it wins if a User-Agent header shows up
    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1, OutputFormat::Text);

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");
    assert_eq!(report.count(PageState::Fetched), 1);
}

#[tokio::test]
async fn test_delay_applied_before_each_request() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[format!("{}/next", base_url)]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html_page(&[]))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, 2, OutputFormat::Text);
    config.crawler.delay = 0.2;

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_visited(), 2);
    assert!(report.elapsed >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_json_output_is_single_document() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[format!("{}/page", base_url)]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page(&[]))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 2, OutputFormat::Json);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");
    assert_eq!(
        report.output_path.extension().and_then(|e| e.to_str()),
        Some("json")
    );

    let content = std::fs::read_to_string(&report.output_path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");
    let urls: Vec<&str> = doc["urls"]
        .as_array()
        .expect("urls array")
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();

    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&seed.as_str()));
    assert!(urls.contains(&format!("{}/page", base_url).as_str()));
}

#[tokio::test]
async fn test_csv_and_jsonl_outputs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[]))
        .mount(&mock_server)
        .await;

    let seed = seed_url(&mock_server);
    let dir = TempDir::new().unwrap();

    let csv_config = create_test_config(&dir, 1, OutputFormat::Csv);
    let csv_report = crawl(seed.clone(), &csv_config).await.expect("Crawl failed");
    assert_eq!(
        read_lines(&csv_report.output_path),
        vec!["url".to_string(), seed.to_string()]
    );

    let jsonl_config = create_test_config(&dir, 1, OutputFormat::JsonLines);
    let jsonl_report = crawl(seed.clone(), &jsonl_config)
        .await
        .expect("Crawl failed");
    let lines = read_lines(&jsonl_report.output_path);
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["url"], seed.as_str());

    // Both files live side by side in the same directory
    assert_ne!(csv_report.output_path, jsonl_report.output_path);
}

#[tokio::test]
async fn test_output_named_after_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[]))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1, OutputFormat::Text);

    let report = crawl(seed_url(&mock_server), &config)
        .await
        .expect("Crawl failed");

    let name = report
        .output_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap()
        .to_string();
    assert!(name.starts_with("127.0.0.1_"), "unexpected name {}", name);
    assert!(name.ends_with(".txt"));
    assert_eq!(report.output_path.parent(), Some(dir.path()));
}

#[tokio::test]
async fn test_visited_set_matches_output() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            format!("{}/x", base_url),
            format!("{}/x", base_url),
            format!("{}/y", base_url),
        ]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html_page(&[format!("{}/y", base_url)]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/y"))
        .respond_with(html_page(&[format!("{}/x", base_url)]))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 5, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let mut coordinator = Coordinator::new(seed, &config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    let lines = read_lines(&report.output_path);
    assert_eq!(lines.len(), coordinator.frontier().visited_count());
    for line in &lines {
        assert!(coordinator.frontier().is_visited(line));
    }
    assert!(coordinator.frontier().is_empty());
}

#[tokio::test]
async fn test_cancel_during_fetch_finishes_current_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html_page(&[format!("{}/child", base_url)]).set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 3, OutputFormat::Json);
    let seed = seed_url(&mock_server);

    let cancel = CancelHandle::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let report = run_crawl(seed.clone(), &config, cancel)
        .await
        .expect("Crawl failed");

    assert!(report.cancelled);
    assert_eq!(report.count(PageState::Fetched), 1);
    assert_eq!(report.links_discovered, 1);

    // The sink was closed normally, so the document parses
    let content = std::fs::read_to_string(&report.output_path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");
    assert_eq!(doc["urls"], serde_json::json!([seed.as_str()]));
}

#[tokio::test]
async fn test_non_html_page_recorded_without_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[format!("{}/report.pdf", base_url)]))
        .mount(&mock_server)
        .await;

    // Looks like HTML, but the Content-Type says otherwise
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(r#"<a href="{}/hidden">x</a>"#, base_url))
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 3, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");

    assert_eq!(
        read_lines(&report.output_path),
        vec![seed.to_string(), format!("{}/report.pdf", base_url)]
    );
    assert_eq!(report.count(PageState::NotHtml), 1);
    assert_eq!(report.links_discovered, 1);
}

#[tokio::test]
async fn test_fragment_links_fetch_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            format!("{}/about#team", base_url),
            format!("{}/about", base_url),
            format!("{}/about#history", base_url),
        ]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(&[format!("{}/#top", base_url)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 3, OutputFormat::Text);
    let seed = seed_url(&mock_server);

    let report = crawl(seed.clone(), &config).await.expect("Crawl failed");

    assert_eq!(
        read_lines(&report.output_path),
        vec![seed.to_string(), format!("{}/about", base_url)]
    );
    assert_eq!(report.skipped_duplicates, 1);
}
