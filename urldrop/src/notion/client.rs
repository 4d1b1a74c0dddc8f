use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error as ThisError;
use tracing::{debug, instrument};
use url::Url;

use crate::config::NotionConfig;
use crate::notion::payload::PageCreateRequest;

#[derive(ThisError, Debug)]
pub enum NotionError {
    /// Notion answered, but not with a 2xx
    #[error("Notion rejected the page with status {status}")]
    Rejected { status: StatusCode, body: String },

    /// The request never completed, or a response body could not be read or decoded
    #[error("Notion request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The part of Notion's page object this service reads back.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    api_base: Url,
    version: String,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, config: &NotionConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            version: config.version.clone(),
        }
    }

    fn pages_url(&self) -> String {
        format!("{}/pages", self.api_base.as_str().trim_end_matches('/'))
    }

    /// Create one page. No retries: a rejection is returned with Notion's status and body intact.
    #[instrument(skip_all, fields(database_id = %request.parent.database_id))]
    pub async fn create_page(&self, token: &str, request: &PageCreateRequest) -> Result<CreatedPage, NotionError> {
        let response = self
            .http
            .post(self.pages_url())
            .bearer_auth(token)
            .header("Notion-Version", self.version.as_str())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            debug!(status = %status, body = %body, "Notion returned an error");
            return Err(NotionError::Rejected { status, body });
        }

        Ok(response.json::<CreatedPage>().await?)
    }
}
