//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `URLDROP_CONFIG`
//! environment variable. A missing file is fine: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `URLDROP_` override YAML values
//! 3. **Deployment variables** - `NOTION_TOKEN`, `NOTION_DATABASE_ID`, `TELEGRAM_TOKEN` and
//!    `TELEGRAM_CHAT_ID` map onto the credential fields
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `URLDROP_NOTION__VERSION=2022-06-28` sets the `notion.version` field.
//!
//! ## Credentials
//!
//! Missing Notion credentials do not stop the server from starting: every submission is answered
//! with `missing_env` instead. Missing Telegram credentials just turn notifications off.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! URLDROP_PORT=8080
//!
//! # Notion integration
//! NOTION_TOKEN=secret_...
//! NOTION_DATABASE_ID=0f3c...
//!
//! # Rename the properties written to the database
//! URLDROP_NOTION__PROPERTIES__TITLE=Name
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::errors::Error;

/// Notion API version pinned in the `Notion-Version` header
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "URLDROP_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    /// Primary destination: Notion page creation
    pub notion: NotionConfig,
    /// Best-effort chat notification after a page is created
    pub telegram: TelegramConfig,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotionConfig {
    /// Integration token, sent as a bearer token
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Database new pages are created in
    #[serde(deserialize_with = "string_or_number")]
    pub database_id: Option<String>,
    /// Base URL of the Notion API (overridable for testing)
    pub api_base: Url,
    /// Value of the `Notion-Version` header
    pub version: String,
    /// Database property names the submission is written to
    pub properties: NotionProperties,
}

/// Names of the database properties a submission fills in.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotionProperties {
    /// Title property (the database's title column)
    pub title: String,
    /// URL property
    pub url: String,
    /// Rich-text property holding the notes
    pub notes: String,
    /// Multi-select property holding the categories
    pub category: String,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,
    /// Chat (user, group or `@channel`) the bot posts to
    #[serde(deserialize_with = "string_or_number")]
    pub chat_id: Option<String>,
    /// Base URL of the Bot API (overridable for testing)
    pub api_base: Url,
    /// `parse_mode` sent with every message
    pub parse_mode: String,
}

/// Notion credentials, present only when both halves are configured.
#[derive(Debug, Clone, Copy)]
pub struct NotionCredentials<'a> {
    pub token: &'a str,
    pub database_id: &'a str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            enable_metrics: true,
            enable_otel_export: false,
            notion: NotionConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            api_base: Url::parse("https://api.notion.com/v1").unwrap(),
            version: DEFAULT_NOTION_VERSION.to_string(),
            properties: NotionProperties::default(),
        }
    }
}

impl Default for NotionProperties {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            url: "URL".to_string(),
            notes: "Notes".to_string(),
            category: "Category".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: Url::parse("https://api.telegram.org").unwrap(),
            parse_mode: "Markdown".to_string(),
        }
    }
}

// Hand-written so tokens never end up in logs.
impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("database_id", &self.database_id)
            .field("api_base", &self.api_base.as_str())
            .field("version", &self.version)
            .field("properties", &self.properties)
            .finish()
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base.as_str())
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}

/// Identifiers such as Telegram chat ids are numeric-looking, and both YAML and figment's env
/// provider turn `-100123` into a number.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    }))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl NotionConfig {
    /// Token and database id, or the `missing_env` error naming what is absent.
    pub fn credentials(&self) -> Result<NotionCredentials<'_>, Error> {
        let token = non_blank(self.token.as_deref());
        let database_id = non_blank(self.database_id.as_deref());

        match (token, database_id) {
            (Some(token), Some(database_id)) => Ok(NotionCredentials { token, database_id }),
            _ => {
                let missing: Vec<&str> = [
                    token.is_none().then_some("NOTION_TOKEN"),
                    database_id.is_none().then_some("NOTION_DATABASE_ID"),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(Error::MissingConfiguration {
                    missing: missing.join(" / "),
                })
            }
        }
    }
}

impl TelegramConfig {
    /// Bot token and chat id, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((non_blank(self.bot_token.as_deref())?, non_blank(self.chat_id.as_deref())?))
    }

    /// Exactly one of bot token / chat id is set: almost certainly a deployment mistake.
    pub fn is_partial(&self) -> bool {
        non_blank(self.bot_token.as_deref()).is_some() != non_blank(self.chat_id.as_deref()).is_some()
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(format!("{e:#}")))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, base) in [("notion.api_base", &self.notion.api_base), ("telegram.api_base", &self.telegram.api_base)] {
            if !matches!(base.scheme(), "http" | "https") {
                anyhow::bail!("Config validation: {name} must be an http(s) URL, got '{base}'");
            }
        }

        if self.notion.version.trim().is_empty() {
            anyhow::bail!("Config validation: notion.version cannot be empty (default: {DEFAULT_NOTION_VERSION})");
        }

        let properties = &self.notion.properties;
        for (name, value) in [
            ("title", &properties.title),
            ("url", &properties.url),
            ("notes", &properties.notes),
            ("category", &properties.category),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("Config validation: notion.properties.{name} cannot be empty");
            }
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Prefixed environment variables override specific values.
            // URLDROP_CONFIG and URLDROP_SUBMIT_ENDPOINT belong to the CLIs, not to this struct.
            .merge(Env::prefixed("URLDROP_").ignore(&["config", "submit_endpoint"]).split("__"))
            // The plain variable names used by typical serverless deployments
            .merge(
                Env::raw()
                    .only(&["NOTION_TOKEN", "NOTION_DATABASE_ID", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"])
                    .map(|key| {
                        let key = key.as_str();
                        if key.eq_ignore_ascii_case("NOTION_TOKEN") {
                            "notion.token".into()
                        } else if key.eq_ignore_ascii_case("NOTION_DATABASE_ID") {
                            "notion.database_id".into()
                        } else if key.eq_ignore_ascii_case("TELEGRAM_TOKEN") {
                            "telegram.bot_token".into()
                        } else {
                            "telegram.chat_id".into()
                        }
                    }),
            )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args() -> Args {
        Args {
            config: "test.yaml".to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args())?;

            assert_eq!(config.port, 3001);
            assert_eq!(config.notion.version, "2022-06-28");
            assert_eq!(config.notion.api_base.as_str(), "https://api.notion.com/v1");
            assert_eq!(config.notion.properties.title, "Title");
            assert!(config.notion.credentials().is_err());
            assert!(config.telegram.credentials().is_none());

            Ok(())
        });
    }

    #[test]
    fn test_yaml_with_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 4000
notion:
  database_id: from-yaml
  properties:
    title: Name
telegram:
  chat_id: -100123
"#,
            )?;

            jail.set_env("URLDROP_HOST", "127.0.0.1");
            jail.set_env("URLDROP_NOTION__VERSION", "2025-09-03");

            let config = Config::load(&args())?;

            // Env vars should override
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.notion.version, "2025-09-03");

            // YAML values should be preserved
            assert_eq!(config.port, 4000);
            assert_eq!(config.notion.database_id.as_deref(), Some("from-yaml"));
            assert_eq!(config.notion.properties.title, "Name");
            assert_eq!(config.notion.properties.url, "URL");
            assert_eq!(config.telegram.chat_id.as_deref(), Some("-100123"));

            Ok(())
        });
    }

    #[test]
    fn test_deployment_variables_fill_credentials() {
        Jail::expect_with(|jail| {
            jail.set_env("NOTION_TOKEN", "secret_abc");
            jail.set_env("NOTION_DATABASE_ID", "db-123");
            jail.set_env("TELEGRAM_TOKEN", "123:bot");
            jail.set_env("TELEGRAM_CHAT_ID", "42");

            let config = Config::load(&args())?;

            let notion = config.notion.credentials().expect("notion credentials");
            assert_eq!(notion.token, "secret_abc");
            assert_eq!(notion.database_id, "db-123");
            assert_eq!(config.telegram.credentials(), Some(("123:bot", "42")));

            Ok(())
        });
    }

    #[test]
    fn test_config_path_variable_is_not_a_field() {
        Jail::expect_with(|jail| {
            jail.set_env("URLDROP_CONFIG", "elsewhere.yaml");
            jail.set_env("URLDROP_SUBMIT_ENDPOINT", "http://localhost:3001/api/submit");

            assert!(Config::load(&args()).is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "notoin:\n  token: typo\n")?;

            assert!(Config::load(&args()).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_non_http_base() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "notion:\n  api_base: ftp://example.com\n")?;

            let err = Config::load(&args()).unwrap_err();
            assert!(err.to_string().contains("notion.api_base"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_credentials_are_named() {
        let config = NotionConfig {
            token: Some("secret".to_string()),
            database_id: Some("   ".to_string()),
            ..Default::default()
        };

        match config.credentials() {
            Err(Error::MissingConfiguration { missing }) => assert_eq!(missing, "NOTION_DATABASE_ID"),
            other => panic!("expected missing configuration, got {other:?}"),
        }

        let empty = NotionConfig::default();
        match empty.credentials() {
            Err(Error::MissingConfiguration { missing }) => assert_eq!(missing, "NOTION_TOKEN / NOTION_DATABASE_ID"),
            other => panic!("expected missing configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_telegram_detected() {
        let partial = TelegramConfig {
            bot_token: Some("123:bot".to_string()),
            ..Default::default()
        };
        assert!(partial.is_partial());
        assert!(partial.credentials().is_none());
        assert!(!TelegramConfig::default().is_partial());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = Config {
            notion: NotionConfig {
                token: Some("secret_abc".to_string()),
                ..Default::default()
            },
            telegram: TelegramConfig {
                bot_token: Some("123:bot".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret_abc"));
        assert!(!rendered.contains("123:bot"));
        assert!(rendered.contains("<redacted>"));
    }
}
