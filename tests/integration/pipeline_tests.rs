//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve company pages and run the full
//! load → scrape → checkpoint → assemble cycle end-to-end.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yc_harvest::checkpoint::{load_checkpoint, save_checkpoint, ResultSet};
use yc_harvest::input::InputError;
use yc_harvest::output::{write_output, write_records, COLUMNS, SHEET_NAME};
use yc_harvest::pipeline::{run_scrape, RunOptions};
use yc_harvest::{CompanyRecord, Config, ScrapeError};

/// Creates a configuration that keeps pacing and backoff short
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.scraper.concurrency = 3;
    config.scraper.requests_per_minute = 6000; // 10ms base delay
    config.scraper.max_retries = 1;
    config.scraper.request_timeout_secs = 5;
    config
}

/// Writes an input CSV with a "YC Link" column holding `links`
fn write_input(dir: &Path, links: &[String]) -> PathBuf {
    let path = dir.join("companies.csv");
    let mut content = String::from("Name,YC Link\n");
    for (i, link) in links.iter().enumerate() {
        content.push_str(&format!("Company {},{}\n", i, link));
    }
    std::fs::write(&path, content).expect("Failed to write input CSV");
    path
}

fn options(dir: &Path, input: PathBuf, resume: bool) -> RunOptions {
    RunOptions {
        input,
        checkpoint: dir.join("out.csv.ckpt.json"),
        resume,
    }
}

fn company_page(name: &str, batch: &str) -> String {
    format!(
        r#"<html><head>
        <script id="__NEXT_DATA__" type="application/json">
        {{"props": {{"pageProps": {{"company": {{
            "name": "{name}",
            "website": "https://{name}.example",
            "status": "Active",
            "batch": "{batch}",
            "founded": "2019",
            "teamSize": "25 employees",
            "location": "San Francisco, CA",
            "founders": [
                {{"name": "Ada One", "is_active": true, "linkedin_url": "https://www.linkedin.com/in/ada"}},
                {{"name": "Bob Gone", "is_active": false}}
            ]
        }}}}}}}}
        </script></head><body><h1>{name}</h1></body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_preserves_input_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/companies/alpha", company_page("alpha", "W20")).await;
    mount_page(&server, "/companies/beta", company_page("beta", "S21")).await;
    Mock::given(method("GET"))
        .and(path("/companies/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let links = vec![
        format!("{}/companies/beta", server.uri()),
        format!("{}/companies/gone", server.uri()),
        format!("{}/companies/alpha", server.uri()),
    ];
    let input = write_input(dir.path(), &links);

    let outcome = run_scrape(create_test_config(), &options(dir.path(), input, false))
        .await
        .expect("Scrape should succeed");

    let output_links: Vec<&str> = outcome.records.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(output_links, links.iter().map(String::as_str).collect::<Vec<_>>());

    let beta = &outcome.records[0];
    assert_eq!(beta.status.as_deref(), Some("Active"));
    assert_eq!(beta.batch.as_deref(), Some("S21"));
    assert_eq!(beta.website.as_deref(), Some("https://beta.example"));
    assert_eq!(beta.founded_year, Some(2019));
    assert_eq!(beta.team_size, Some(25));
    assert_eq!(beta.active_founders.as_deref(), Some("Ada One"));
    assert_eq!(
        beta.founders_linkedin.as_deref(),
        Some("https://www.linkedin.com/in/ada")
    );

    assert_eq!(outcome.records[1], CompanyRecord::placeholder(&links[1]));
    assert_eq!(outcome.records[2].batch.as_deref(), Some("W20"));

    assert_eq!(outcome.stats.total_targets, 3);
    assert_eq!(outcome.stats.with_data, 2);
    assert_eq!(outcome.stats.placeholders, 1);

    // The final checkpoint holds every target
    let checkpoint = load_checkpoint(&dir.path().join("out.csv.ckpt.json"));
    assert_eq!(checkpoint.len(), 3);
    assert_eq!(checkpoint[&links[0]], outcome.records[0]);
}

#[tokio::test]
async fn test_unreachable_targets_are_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let links = vec![
        format!("{}/companies/down", server.uri()),
        "http://127.0.0.1:9/companies/refused".to_string(),
    ];
    let input = write_input(dir.path(), &links);

    let first = run_scrape(create_test_config(), &options(dir.path(), input.clone(), false))
        .await
        .unwrap();
    let second = run_scrape(create_test_config(), &options(dir.path(), input, false))
        .await
        .unwrap();

    let expected: Vec<CompanyRecord> = links.iter().map(|l| CompanyRecord::placeholder(l)).collect();
    assert_eq!(first.records, expected);
    assert_eq!(second.records, expected);

    // One attempt plus one retry for the mock-served target, per run
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_slow_responses_time_out_and_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(company_page("slow", "W20"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let link = format!("{}/companies/slow", server.uri());
    let input = write_input(dir.path(), &[link.clone()]);

    let mut config = create_test_config();
    config.scraper.request_timeout_secs = 1;
    let max_retries = config.scraper.max_retries as usize;

    let outcome = run_scrape(config, &options(dir.path(), input, false))
        .await
        .unwrap();

    assert_eq!(outcome.records, vec![CompanyRecord::placeholder(&link)]);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), max_retries + 1);
}

#[tokio::test]
async fn test_resume_skips_checkpointed_targets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies/done"))
        .respond_with(ResponseTemplate::new(200).set_body_string(company_page("done", "W99")))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/companies/new", company_page("new", "S22")).await;

    let dir = TempDir::new().unwrap();
    let done = format!("{}/companies/done", server.uri());
    let new = format!("{}/companies/new", server.uri());
    let input = write_input(dir.path(), &[done.clone(), new.clone()]);

    let previous = CompanyRecord {
        status: Some("Acquired".to_string()),
        batch: Some("W12".to_string()),
        ..CompanyRecord::placeholder(&done)
    };
    let mut checkpoint = ResultSet::new();
    checkpoint.insert(done.clone(), previous.clone());
    save_checkpoint(&dir.path().join("out.csv.ckpt.json"), &checkpoint).unwrap();

    let outcome = run_scrape(create_test_config(), &options(dir.path(), input, true))
        .await
        .unwrap();

    assert_eq!(outcome.records[0], previous);
    assert_eq!(outcome.records[1].batch.as_deref(), Some("S22"));
    assert_eq!(outcome.stats.resumed, 1);
    assert_eq!(outcome.stats.scraped, 1);
}

#[tokio::test]
async fn test_resume_without_checkpoint_scrapes_everything() {
    let server = MockServer::start().await;
    mount_page(&server, "/companies/solo", company_page("solo", "W21")).await;

    let dir = TempDir::new().unwrap();
    let link = format!("{}/companies/solo", server.uri());
    let input = write_input(dir.path(), &[link]);

    let outcome = run_scrape(create_test_config(), &options(dir.path(), input, true))
        .await
        .unwrap();

    assert_eq!(outcome.stats.resumed, 0);
    assert_eq!(outcome.records[0].batch.as_deref(), Some("W21"));
}

#[tokio::test]
async fn test_missing_link_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("companies.csv");
    std::fs::write(&input, "Name,Link\nAcme,https://example.com/acme\n").unwrap();

    let result = run_scrape(create_test_config(), &options(dir.path(), input, false)).await;

    match result {
        Err(ScrapeError::Input(InputError::MissingColumn { column })) => {
            assert_eq!(column, "YC Link");
        }
        other => panic!("expected a missing column error, got {:?}", other.map(|o| o.records)),
    }
    assert!(!dir.path().join("out.csv.ckpt.json").exists());
}

#[tokio::test]
async fn test_output_csv_has_one_row_per_target() {
    let server = MockServer::start().await;
    mount_page(&server, "/companies/alpha", company_page("alpha", "W20")).await;

    let dir = TempDir::new().unwrap();
    let link = format!("{}/companies/alpha", server.uri());
    let input = write_input(dir.path(), &[link.clone(), link.clone()]);

    let outcome = run_scrape(create_test_config(), &options(dir.path(), input, false))
        .await
        .unwrap();
    let output = dir.path().join("out.csv");
    write_records(&output, &outcome.records).unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, COLUMNS.to_vec());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], link);
    assert_eq!(&rows[0][8], "W20");
    assert_eq!(rows[0], rows[1]);

    // Duplicate links are fetched once
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_xlsx_output_writes_workbook() {
    use calamine::{open_workbook, Data, Reader, Xlsx};

    let server = MockServer::start().await;
    mount_page(&server, "/companies/alpha", company_page("alpha", "W20")).await;

    let dir = TempDir::new().unwrap();
    let link = format!("{}/companies/alpha", server.uri());
    let input = write_input(dir.path(), &[link.clone()]);

    let outcome = run_scrape(create_test_config(), &options(dir.path(), input, false))
        .await
        .unwrap();
    let output = dir.path().join("out.xlsx");
    write_output(&output, &outcome.records).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], Data::String(link));
    assert_eq!(rows[1][6], Data::Float(2019.0));
    assert_eq!(rows[1][7], Data::Float(25.0));
    assert_eq!(rows[1][8], Data::String("W20".to_string()));
}
