//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for both the catalog site and the
//! ingestion service, and run full harvests end-to-end.

use serde_json::{json, Value};
use shelf_harvest::config::{
    CatalogConfig, Config, CrawlerConfig, FailurePolicy, IngestConfig, SelectorConfig,
    UserAgentConfig,
};
use shelf_harvest::crawler::Harvester;
use shelf_harvest::output::PageOutcome;
use shelf_harvest::{ErrorKind, HarvestError};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "Mozilla/5.0 (TestHarvest)";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, page_count: u32, policy: FailurePolicy) -> Config {
    Config {
        catalog: CatalogConfig {
            list_url: format!("{}/top250", base_url),
            offset_param: "start".to_string(),
            page_count,
            page_size: 25,
        },
        crawler: CrawlerConfig {
            launch_interval_ms: 10, // Very short for testing
            detail_interval_ms: 0,
            request_timeout_secs: 5,
            failure_policy: policy,
        },
        user_agent: UserAgentConfig {
            header: USER_AGENT.to_string(),
        },
        ingest: IngestConfig {
            endpoint: format!("{}/stock/addbook", base_url),
        },
        selectors: SelectorConfig::default(),
    }
}

/// One listed item: (title, detail path, info line)
type Item<'a> = (&'a str, &'a str, &'a str);

fn list_page_html(items: &[Item<'_>]) -> String {
    let rows: String = items
        .iter()
        .map(|(title, detail, info)| {
            format!(
                r#"<table width="100%"><tr class="item">
                  <td><a class="nbg" href="{detail}"><img src="https://img.example.com{detail}cover.jpg"></a></td>
                  <td>
                    <div class="pl2"><a href="{detail}">{title}</a></div>
                    <p class="pl">{info}</p>
                    <div class="star clearfix">
                      <span class="rating_nums">8.8</span>
                      <span class="pl">(
                          1024人评价
                      )</span>
                    </div>
                    <p class="quote"><span class="inq">Worth reading.</span></p>
                  </td>
                </tr></table>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Top 250</title></head><body><div class="indent">{}</div></body></html>"#,
        rows
    )
}

fn detail_page_html(identifier_line: &str, description: &str) -> String {
    format!(
        r#"<html><body>
          <div id="info">
            <span class="pl">作者:</span> Someone<br/>
            {identifier_line}<br/>
          </div>
          <div class="related_info"><div class="indent"><div class="intro">
            <p>{description}</p><p>Second paragraph.</p>
          </div></div></div>
        </body></html>"#
    )
}

async fn mount_list_page(server: &MockServer, offset: &str, items: &[Item<'_>]) {
    Mock::given(method("GET"))
        .and(path("/top250"))
        .and(query_param("start", offset))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(list_page_html(items))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail_page(server: &MockServer, detail: &str, isbn: &str, description: &str) {
    let identifier_line = format!(r#"<span class="pl">ISBN:</span> {}"#, isbn);
    Mock::given(method("GET"))
        .and(path(detail))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page_html(&identifier_line, description))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_ingest_ok(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/stock/addbook"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":0}"#))
        .expect(expected)
        .mount(server)
        .await;
}

/// Bodies of every ingestion request received so far
async fn ingested_records(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|request| request.url.path() == "/stock/addbook")
        .map(|request| serde_json::from_slice(&request.body).expect("ingest body is JSON"))
        .collect()
}

#[tokio::test]
async fn test_full_harvest_two_pages() {
    let server = MockServer::start().await;

    mount_list_page(
        &server,
        "0",
        &[
            (
                "\"Red Chamber\"",
                "/subject/1/",
                "张三 著/重要文学出版社/2020/45.00元",
            ),
            (
                "Kite Runner",
                "/subject/2/",
                "Jane Doe 著/John Smith 译/Big Press/2019/$19.99",
            ),
        ],
    )
    .await;
    mount_list_page(
        &server,
        "25",
        &[("Third Book", "/subject/3/", "Li 著/Press/2001/12.50")],
    )
    .await;

    mount_detail_page(
        &server,
        "/subject/1/",
        "978-0-00-000000-0",
        "  A classic novel. ",
    )
    .await;
    mount_detail_page(&server, "/subject/2/", "9787208061644", "About kites.").await;
    mount_detail_page(&server, "/subject/3/", "9787020002207", "Third.").await;
    mount_ingest_ok(&server, 3).await;

    let config = create_test_config(&server.uri(), 2, FailurePolicy::Isolate);
    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let report = harvester.run().await.expect("Harvest failed");

    // Barrier: both page tasks and all three submissions completed
    assert_eq!(report.pages_completed(), 2);
    assert_eq!(report.submissions_completed(), 3);
    assert_eq!(report.submissions_succeeded(), 3);
    assert!(report.is_clean());

    assert_eq!(report.pages[0].index, 0);
    assert_eq!(report.pages[0].items_found, 2);
    assert_eq!(report.pages[1].index, 1);
    assert_eq!(report.pages[1].records_built, 1);

    let records = ingested_records(&server).await;
    assert_eq!(records.len(), 3);

    let red = records
        .iter()
        .find(|r| r["name"] == "RedChamber")
        .expect("Red Chamber submitted");
    assert_eq!(
        red,
        &json!({
            "ISBN": "978-0-00-000000-0",
            "name": "RedChamber",
            "author": "张三",
            "publishHouse": "重要文学出版社",
            "price": 45.0,
            "described": "Aclassicnovel.",
            "imgUrl": "https://img.example.com/subject/1/cover.jpg"
        })
    );

    let kite = records
        .iter()
        .find(|r| r["name"] == "KiteRunner")
        .expect("Kite Runner submitted");
    assert_eq!(kite["author"], "JaneDoe");
    assert_eq!(kite["publishHouse"], "BigPress");
    assert_eq!(kite["price"], 19.99);
}

#[tokio::test]
async fn test_missing_identifier_is_submitted_empty() {
    let server = MockServer::start().await;

    mount_list_page(
        &server,
        "0",
        &[("No Isbn", "/subject/7/", "Author 著/Press/1999/8.00")],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/subject/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page_html(
            r#"<span class="pl">页数:</span> 300"#,
            "No identifier here.",
        )))
        .mount(&server)
        .await;
    mount_ingest_ok(&server, 1).await;

    let config = create_test_config(&server.uri(), 1, FailurePolicy::FailFast);
    let report = Harvester::new(config).unwrap().run().await.unwrap();
    assert!(report.is_clean());

    let records = ingested_records(&server).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["ISBN"], "");
    assert_eq!(records[0]["described"], "Noidentifierhere.");
}

#[tokio::test]
async fn test_malformed_item_is_isolated() {
    let server = MockServer::start().await;

    mount_list_page(
        &server,
        "0",
        &[
            ("Good One", "/subject/1/", "A 著/Press/2020/10.00"),
            ("Broken", "/subject/2/", "Press/10.00"),
            ("Good Two", "/subject/3/", "B 著/Press/2021/11.00"),
        ],
    )
    .await;
    mount_detail_page(&server, "/subject/1/", "111", "One.").await;
    mount_detail_page(&server, "/subject/3/", "333", "Three.").await;
    mount_ingest_ok(&server, 2).await;

    let config = create_test_config(&server.uri(), 1, FailurePolicy::Isolate);
    let report = Harvester::new(config).unwrap().run().await.unwrap();

    let page = &report.pages[0];
    assert!(page.is_completed());
    assert_eq!(page.items_found, 3);
    assert_eq!(page.records_built, 2);
    assert_eq!(page.item_failures.len(), 1);
    assert_eq!(page.item_failures[0].position, 1);
    assert_eq!(page.item_failures[0].kind, ErrorKind::Structural);
    assert_eq!(report.submissions_succeeded(), 2);
}

#[tokio::test]
async fn test_detail_failure_isolated_and_fail_fast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page_html(&[
            ("Fine", "/subject/1/", "A 著/Press/2020/10.00"),
            ("Gone", "/subject/404/", "B 著/Press/2020/10.00"),
        ])))
        .mount(&server)
        .await;
    mount_detail_page_any(&server, "/subject/1/").await;
    Mock::given(method("GET"))
        .and(path("/subject/404/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/stock/addbook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    // Isolate: the missing detail page only costs its own item
    let config = create_test_config(&server.uri(), 1, FailurePolicy::Isolate);
    let report = Harvester::new(config).unwrap().run().await.unwrap();
    let page = &report.pages[0];
    assert_eq!(page.records_built, 1);
    assert_eq!(page.item_failures.len(), 1);
    assert_eq!(page.item_failures[0].title.as_deref(), Some("Gone"));
    assert_eq!(page.item_failures[0].kind, ErrorKind::Transient);
    assert_eq!(page.submissions.succeeded, 1);

    // Fail-fast: the same failure aborts the run
    let config = create_test_config(&server.uri(), 1, FailurePolicy::FailFast);
    let err = Harvester::new(config).unwrap().run().await.unwrap_err();
    assert!(matches!(err, HarvestError::Status { status: 404, .. }));
}

async fn mount_detail_page_any(server: &MockServer, detail: &str) {
    Mock::given(method("GET"))
        .and(path(detail))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page_html(
            r#"<span class="pl">ISBN:</span> 9780000000001"#,
            "Fine book.",
        )))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_second_submission_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page_html(&[
            ("First", "/subject/1/", "A 著/Press/2020/10.00"),
            ("Second", "/subject/2/", "B 著/Press/2020/20.00"),
            ("Third", "/subject/3/", "C 著/Press/2020/30.00"),
        ])))
        .mount(&server)
        .await;
    for detail in ["/subject/1/", "/subject/2/", "/subject/3/"] {
        mount_detail_page_any(&server, detail).await;
    }

    // Mounted first so it takes precedence over the catch-all below
    Mock::given(method("POST"))
        .and(path("/stock/addbook"))
        .and(body_partial_json(json!({ "name": "Second" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/stock/addbook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    // Isolate: two records land, the failure is reported
    let config = create_test_config(&server.uri(), 1, FailurePolicy::Isolate);
    let report = Harvester::new(config).unwrap().run().await.unwrap();
    let submissions = &report.pages[0].submissions;
    assert_eq!(submissions.attempted, 3);
    assert_eq!(submissions.completed, 3);
    assert_eq!(submissions.succeeded, 2);
    assert_eq!(submissions.failures.len(), 1);
    assert_eq!(submissions.failures[0].title, "Second");
    assert_eq!(submissions.failures[0].kind, ErrorKind::Transient);
    assert!(submissions.failures[0].message.contains("500"));

    // Fail-fast: the run returns the ingestion failure
    let config = create_test_config(&server.uri(), 1, FailurePolicy::FailFast);
    let err = Harvester::new(config).unwrap().run().await.unwrap_err();
    match err {
        HarvestError::Ingest { title, reason } => {
            assert_eq!(title, "Second");
            assert!(reason.contains("database down"));
        }
        other => panic!("expected ingest failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_list_page_does_not_block_barrier() {
    let server = MockServer::start().await;

    mount_list_page(
        &server,
        "0",
        &[("Only", "/subject/1/", "A 著/Press/2020/10.00")],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/top250"))
        .and(query_param("start", "25"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_list_page(&server, "50", &[]).await;
    mount_detail_page(&server, "/subject/1/", "111", "One.").await;
    mount_ingest_ok(&server, 1).await;

    let config = create_test_config(&server.uri(), 3, FailurePolicy::Isolate);
    let report = Harvester::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.pages_completed(), 3);
    assert_eq!(report.pages_failed(), 1);
    assert!(matches!(
        report.pages[1].outcome,
        PageOutcome::Failed {
            kind: ErrorKind::Transient,
            ..
        }
    ));
    assert!(report.pages[2].is_completed());
    assert_eq!(report.pages[2].items_found, 0);
    assert_eq!(report.submissions_succeeded(), 1);
}

#[tokio::test]
async fn test_list_requests_are_spaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page_html(&[])))
        .expect(4)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 4, FailurePolicy::Isolate);
    config.crawler.launch_interval_ms = 100;

    let started = Instant::now();
    let report = Harvester::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.pages_completed(), 4);
    // Four requests: immediate, +100ms, +200ms, +300ms
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_cancel_token_releases_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(list_page_html(&[]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 2, FailurePolicy::FailFast);
    let harvester = Harvester::new(config).unwrap();
    let cancel = harvester.cancel_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let err = harvester.run().await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_refused_submission_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page_html(&[
            ("First", "/subject/1/", "A 著/Press/2020/10.00"),
            ("Second", "/subject/2/", "B 著/Press/2020/20.00"),
        ])))
        .mount(&server)
        .await;
    for detail in ["/subject/1/", "/subject/2/"] {
        mount_detail_page_any(&server, detail).await;
    }

    Mock::given(method("POST"))
        .and(path("/stock/addbook"))
        .and(body_partial_json(json!({ "name": "Second" })))
        .respond_with(ResponseTemplate::new(422).set_body_string("missing ISBN"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/stock/addbook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), 1, FailurePolicy::Isolate);
    let report = Harvester::new(config).unwrap().run().await.unwrap();

    let submissions = &report.pages[0].submissions;
    assert_eq!(submissions.succeeded, 1);
    assert_eq!(submissions.failures.len(), 1);
    assert_eq!(submissions.failures[0].title, "Second");
    assert_eq!(submissions.failures[0].kind, ErrorKind::Terminal);
    assert!(submissions.failures[0].message.contains("422"));
}

#[tokio::test]
async fn test_slow_list_page_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(list_page_html(&[]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 1, FailurePolicy::Isolate);
    config.crawler.request_timeout_secs = 1;

    let started = Instant::now();
    let report = Harvester::new(config).unwrap().run().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.pages_failed(), 1);
    match &report.pages[0].outcome {
        PageOutcome::Failed { kind, message } => {
            assert_eq!(*kind, ErrorKind::Transient);
            assert!(message.contains("timeout"));
        }
        PageOutcome::Completed => panic!("slow page should have timed out"),
    }
}

#[tokio::test]
async fn test_detail_requests_are_spaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page_html(&[
            ("First", "/subject/1/", "A 著/Press/2020/10.00"),
            ("Second", "/subject/2/", "B 著/Press/2020/20.00"),
            ("Third", "/subject/3/", "C 著/Press/2020/30.00"),
        ])))
        .mount(&server)
        .await;
    for detail in ["/subject/1/", "/subject/2/", "/subject/3/"] {
        mount_detail_page_any(&server, detail).await;
    }
    mount_ingest_ok(&server, 3).await;

    let mut config = create_test_config(&server.uri(), 1, FailurePolicy::Isolate);
    config.crawler.detail_interval_ms = 150;

    let started = Instant::now();
    let report = Harvester::new(config).unwrap().run().await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.records_built(), 3);
    // Three detail fetches: immediate, +150ms, +300ms
    assert!(started.elapsed() >= Duration::from_millis(300));
}
