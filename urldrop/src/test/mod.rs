//! End-to-end: the real client transport and orchestrator against a bound server, with Notion mocked.

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::api::models::submissions::SubmitRequest;
use crate::{AppState, build_router};
use crate::client::{Field, HttpTransport, Locale, Orchestrator, UiStatus, UrlForm};
use crate::config::Config;
use crate::test_utils::*;

/// Serve the router on an ephemeral loopback port; returns the submission endpoint.
async fn spawn_server(config: Config) -> (url::Url, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(AppState::from_config(config).unwrap());

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}/api/submit").parse().unwrap(), handle)
}

fn orchestrator(endpoint: url::Url) -> Orchestrator<HttpTransport> {
    Orchestrator::new(HttpTransport::new(endpoint).unwrap(), Locale::En)
}

#[test_log::test(tokio::test)]
async fn test_round_trip_success_reports_page_id() {
    let notion = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(page_created("1a2b3c4d-0000-4000-8000-00000000beef"))
        .expect(1)
        .mount(&notion)
        .await;
    let (endpoint, server) = spawn_server(test_config(&notion)).await;

    let mut form = UrlForm::new(Locale::En);
    form.edit(Field::Url, "https://www.rust-lang.org/");
    form.edit(Field::Categories, "rust");
    let request = form.submit().expect("valid URL");

    let orchestrator = orchestrator(endpoint);
    let status = orchestrator.submit(request).await.unwrap();

    assert_eq!(status, UiStatus::Success);
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.page_id.as_deref(), Some("1a2b3c4d-0000-4000-8000-00000000beef"));
    assert_eq!(snapshot.message, Locale::En.sent());
    assert!(!snapshot.in_flight);

    server.abort();
}

#[test_log::test(tokio::test)]
async fn test_round_trip_notion_failure_shows_server_detail() {
    let notion = MockServer::start().await;
    let detail = r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find database."}"#;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(404).set_body_string(detail))
        .expect(1)
        .mount(&notion)
        .await;
    let (endpoint, server) = spawn_server(test_config(&notion)).await;

    let orchestrator = orchestrator(endpoint);
    let request = SubmitRequest {
        url: "https://example.com".to_string(),
        ..Default::default()
    };
    let status = orchestrator.submit(request).await.unwrap();

    assert_eq!(status, UiStatus::Error);
    assert_eq!(orchestrator.snapshot().message, detail);

    server.abort();
}

#[tokio::test]
async fn test_round_trip_missing_configuration() {
    let (endpoint, server) = spawn_server(unconfigured_config()).await;

    let orchestrator = orchestrator(endpoint);
    let request = SubmitRequest {
        url: "https://example.com".to_string(),
        notes: Some("no credentials yet".to_string()),
        ..Default::default()
    };
    orchestrator.submit(request).await.unwrap();

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status, UiStatus::Error);
    assert_eq!(snapshot.message, "NOTION_TOKEN / NOTION_DATABASE_ID required");

    server.abort();
}

#[tokio::test]
async fn test_invalid_url_never_reaches_the_server() {
    let notion = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&notion).await;

    let mut form = UrlForm::new(Locale::En);
    form.edit(Field::Url, "www.example.com");

    assert!(form.submit().is_none());
    assert_eq!(form.error(), Some(Locale::En.invalid_url()));
}
