//! End-to-end orchestrator runs against a mock search service, mock
//! pages, and a scripted generation client.

mod common;

use common::ScriptedClient;
use delver::state::STATE_FILE;
use delver::types::{AppError, ResearchTask, TaskStatus};
use delver::{Orchestrator, TracingNotifier};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_search_hit(server: &MockServer, query: &str, page_path: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "url": format!("{}{page_path}", server.uri()), "title": title }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, text: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(format!("<html><body><p>{text}</p></body></html>")),
        )
        .mount(server)
        .await;
}

fn archived_task(data_dir: &Path) -> ResearchTask {
    let archived = data_dir.join(format!("{STATE_FILE}.001"));
    serde_json::from_str(&fs::read_to_string(archived).unwrap()).unwrap()
}

#[tokio::test]
async fn test_single_iteration_run_completes_and_archives() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_search_hit(&server, "AI journalism 2024 impact", "/impact", "Impact").await;
    mount_search_hit(
        &server,
        "newsroom AI adoption statistics",
        "/adoption",
        "Adoption",
    )
    .await;
    mount_page(&server, "/impact", "newsrooms adopted generative tools").await;
    mount_page(&server, "/adoption", "surveys show rising adoption").await;

    let llm = Arc::new(ScriptedClient::new(&[
        ("research plan with steps", "1. Find impact studies\n2. Summarize"),
        (
            "covering the first steps",
            r#"["AI journalism 2024 impact", "newsroom AI adoption statistics"]"#,
        ),
        ("page content for the search query", "page notes"),
        ("one research round", "combined round notes"),
        ("completed research task", "overall findings"),
        ("brief conclusion", "closing thoughts"),
        ("single digit", "2. Research complete"),
    ]));
    let orchestrator = Orchestrator::new(
        common::test_config(&server.uri(), dir.path()),
        llm,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    let task = orchestrator
        .run("operator", "AI in journalism", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(task.iterations.len(), 1);
    assert_eq!(task.iterations[0].results.len(), 2);
    assert_eq!(task.used_urls.len(), 2);
    assert_eq!(task.final_summary.as_deref(), Some("overall findings"));

    // Active slot released, state archived under the first free number.
    assert!(!dir.path().join(STATE_FILE).exists());
    let archived = archived_task(dir.path());
    assert_eq!(archived.status, TaskStatus::Complete);
    assert_eq!(archived.iterations.len(), 1);

    let report =
        fs::read_to_string(dir.path().join("research_ai_in_journalism.txt")).unwrap();
    assert!(report.contains("### Findings"));
    assert!(report.contains("Iteration 1:"));
    assert!(report.contains(&format!("1. {}/impact", server.uri())));
    assert!(report.contains(&format!("2. {}/adoption", server.uri())));
    assert!(!report.contains("\n3. "));
}

#[tokio::test]
async fn test_empty_initial_batch_finalizes_without_iterating() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let llm = Arc::new(ScriptedClient::new(&[
        ("research plan with steps", "1. Summarize"),
        ("covering the first steps", "[]"),
        ("completed research task", "nothing was gathered"),
        ("brief conclusion", "no sources were needed"),
    ]));
    let orchestrator = Orchestrator::new(
        common::test_config(&server.uri(), dir.path()),
        llm,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    let task = orchestrator
        .run("operator", "empty batch case", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Complete);
    assert!(task.iterations.is_empty());
    assert!(task.used_urls.is_empty());
    assert_eq!(archived_task(dir.path()).status, TaskStatus::Complete);
    assert!(dir.path().join("research_empty_batch_case.txt").exists());
}

#[tokio::test]
async fn test_barren_iteration_fails_with_no_results() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_search_hit(&server, "round one query", "/alive", "Alive").await;
    mount_page(&server, "/alive", "useful text").await;
    mount_search_hit(&server, "broken query", "/dead", "Dead").await;
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let llm = Arc::new(ScriptedClient::new(&[
        ("research plan with steps", "1. Search\n2. Summarize"),
        ("covering the first steps", r#"["round one query"]"#),
        ("focusing on missing data", r#"["broken query"]"#),
        ("page content for the search query", "page notes"),
        ("one research round", "combined round notes"),
        ("single digit", "1. More research needed"),
    ]));
    let orchestrator = Orchestrator::new(
        common::test_config(&server.uri(), dir.path()),
        llm,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    match orchestrator
        .run("operator", "failure case", CancellationToken::new())
        .await
    {
        Err(AppError::NoResults(2)) => {}
        other => panic!("expected NoResults(2), got {other:?}"),
    }

    // Failed state is archived too, and the diagnostic log survives.
    assert!(!dir.path().join(STATE_FILE).exists());
    let archived = archived_task(dir.path());
    assert_eq!(archived.status, TaskStatus::Error);
    assert_eq!(archived.iterations.len(), 1);
    assert!(dir.path().join("research_failure_case.log").exists());
}

#[tokio::test]
async fn test_running_task_blocks_a_second_start() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let state_file = dir.path().join(STATE_FILE);
    fs::write(&state_file, "sentinel").unwrap();

    let llm = Arc::new(ScriptedClient::new(&[]));
    let orchestrator = Orchestrator::new(
        common::test_config(&server.uri(), dir.path()),
        llm,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    match orchestrator
        .run("operator", "second task", CancellationToken::new())
        .await
    {
        Err(AppError::TaskActive) => {}
        other => panic!("expected TaskActive, got {other:?}"),
    }

    // The in-flight task's state is untouched and not archived.
    assert_eq!(fs::read_to_string(&state_file).unwrap(), "sentinel");
    assert!(!dir.path().join(format!("{STATE_FILE}.001")).exists());
}

#[tokio::test]
async fn test_empty_query_is_rejected_before_locking() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let llm = Arc::new(ScriptedClient::new(&[]));
    let orchestrator = Orchestrator::new(
        common::test_config(&server.uri(), dir.path()),
        llm,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    match orchestrator
        .run("operator", "   ", CancellationToken::new())
        .await
    {
        Err(AppError::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(!dir.path().join(STATE_FILE).exists());
}

#[tokio::test]
async fn test_iteration_cap_bounds_a_never_satisfied_judge() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_search_hit(&server, "first round q", "/one", "One").await;
    mount_search_hit(&server, "second round q", "/two", "Two").await;
    mount_page(&server, "/one", "first round text").await;
    mount_page(&server, "/two", "second round text").await;

    let llm = Arc::new(ScriptedClient::new(&[
        ("research plan with steps", "1. Search\n2. Summarize"),
        ("covering the first steps", r#"["first round q"]"#),
        ("focusing on missing data", r#"["second round q"]"#),
        ("page content for the search query", "page notes"),
        ("one research round", "combined round notes"),
        ("completed research task", "overall findings"),
        ("brief conclusion", "closing thoughts"),
        ("single digit", "1. Keep going"),
    ]));
    let mut config = common::test_config(&server.uri(), dir.path());
    config.max_iterations = 2;
    let orchestrator =
        Orchestrator::new(config, llm, Arc::new(TracingNotifier)).unwrap();

    let task = orchestrator
        .run("operator", "cap case", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(task.iterations.len(), 2);
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(
        task.completion_status_text.as_deref(),
        Some("1. Keep going")
    );
}

#[tokio::test]
async fn test_cancellation_stops_before_the_next_iteration() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let llm = Arc::new(ScriptedClient::new(&[
        ("research plan with steps", "1. Search\n2. Summarize"),
        ("covering the first steps", r#"["never issued"]"#),
        ("completed research task", "cut short"),
        ("brief conclusion", "stopped on request"),
    ]));
    let orchestrator = Orchestrator::new(
        common::test_config(&server.uri(), dir.path()),
        llm,
        Arc::new(TracingNotifier),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let task = orchestrator
        .run("operator", "cancelled case", cancel)
        .await
        .unwrap();

    // No search ever ran; the task still finalizes and archives cleanly.
    assert!(task.iterations.is_empty());
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(archived_task(dir.path()).status, TaskStatus::Complete);
}
