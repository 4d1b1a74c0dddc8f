//! Test utilities: configurations pointed at mock servers, and a test server over the real router.

use axum_test::TestServer;
use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

use crate::config::Config;
use crate::{AppState, build_router};

pub const TEST_NOTION_TOKEN: &str = "secret_test_token";
pub const TEST_DATABASE_ID: &str = "4f1c2d3e-0000-4000-8000-00000000db01";
pub const TEST_BOT_TOKEN: &str = "123456:test-bot";
pub const TEST_CHAT_ID: &str = "-1001234567890";

/// Defaults with no credentials at all, bound to a loopback ephemeral port.
pub fn unconfigured_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        enable_metrics: false,
        enable_otel_export: false,
        ..Default::default()
    }
}

/// Notion credentials set, API base pointing at `notion`. Telegram stays off.
pub fn test_config(notion: &MockServer) -> Config {
    test_config_with_notion_base(&notion.uri())
}

pub fn test_config_with_notion_base(api_base: &str) -> Config {
    let mut config = unconfigured_config();
    config.notion.token = Some(TEST_NOTION_TOKEN.to_string());
    config.notion.database_id = Some(TEST_DATABASE_ID.to_string());
    config.notion.api_base = api_base.parse().expect("valid mock URL");
    config
}

/// Turn on Telegram notifications, sent to `telegram`.
pub fn with_telegram(mut config: Config, telegram: &MockServer) -> Config {
    config.telegram.bot_token = Some(TEST_BOT_TOKEN.to_string());
    config.telegram.chat_id = Some(TEST_CHAT_ID.to_string());
    config.telegram.api_base = telegram.uri().parse().expect("valid mock URL");
    config
}

pub fn create_test_server(config: Config) -> TestServer {
    let state = AppState::from_config(config).expect("Failed to build app state");
    TestServer::new(build_router(state)).expect("Failed to create test server")
}

/// Notion's answer to a successful create-page call.
pub fn page_created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "object": "page",
        "id": id,
        "url": format!("https://www.notion.so/{}", id.replace('-', "")),
    }))
}
