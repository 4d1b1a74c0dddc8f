//! Best-effort Telegram notification sent after a page has been created.
//!
//! Nothing here can fail a submission: [`TelegramNotifier::send`] returns an error for the caller
//! to log, and the caller moves on.

use anyhow::Context;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::api::models::submissions::Submission;
use crate::config::TelegramConfig;

/// Text of the chat message, built from an already validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub notes: Option<String>,
    pub url: String,
}

impl From<&Submission> for NotificationMessage {
    fn from(submission: &Submission) -> Self {
        Self {
            title: submission.title.clone(),
            notes: submission.notes.clone(),
            url: submission.url.clone(),
        }
    }
}

impl NotificationMessage {
    /// Render for Telegram's legacy `Markdown` parse mode.
    pub fn render(&self) -> String {
        let notes = self.notes.as_deref().map(escape_markdown).unwrap_or_else(|| "none".to_string());
        format!(
            "🚀 *Saved to Notion*\n\n📌 *Title*: {}\n📝 *Notes*: {}\n🔗 [Open link]({})",
            escape_markdown(&self.title),
            notes,
            link_target(&self.url)
        )
    }
}

/// Legacy Markdown ends a link target at the first `)`, so parentheses are percent-encoded.
fn link_target(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}

/// Escape the characters legacy Markdown treats as entity delimiters.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: Url,
    bot_token: String,
    chat_id: String,
    parse_mode: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base.as_str())
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// `None` unless both bot token and chat id are configured.
    pub fn from_config(http: reqwest::Client, config: &TelegramConfig) -> Option<Self> {
        let (bot_token, chat_id) = config.credentials()?;
        Some(Self {
            http,
            api_base: config.api_base.clone(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.as_str().trim_end_matches('/'),
            self.bot_token
        )
    }

    /// Post `message` to the configured chat.
    ///
    /// Errors never include the request URL, since it embeds the bot token.
    #[instrument(skip_all, fields(chat_id = %self.chat_id))]
    pub async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()> {
        let text = message.render();
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: &self.parse_mode,
        };

        let response = self
            .http
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Telegram sendMessage request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage returned {status}: {detail}");
        }

        Ok(())
    }
}
