//! HTTP handler for `/api/submit`.
//!
//! ```text
//! submit()
//!   ├─ OPTIONS → 204, nothing else runs
//!   ├─ not POST → 405
//!   ├─ Notion credentials configured?       else 500 missing_env
//!   ├─ Submission::from_json()               else 400 naming the field
//!   ├─ NotionClient::create_page()           else relayed status, notion_error
//!   ├─ TelegramNotifier::send()              failures logged and dropped
//!   └─ 200 { ok: true, page_id }
//! ```

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    AppState,
    api::models::submissions::{Submission, SubmitResponse},
    errors::{Error, Result},
    notion::PageCreateRequest,
    telegram::{NotificationMessage, TelegramNotifier},
};

/// Accept a URL submission and create a Notion page for it.
///
/// Routed for every method; the method gate lives here so that preflight and rejection share the
/// CORS headers applied to the router.
#[instrument(skip_all, fields(method = %method))]
pub async fn submit(State(state): State<AppState>, method: Method, body: Bytes) -> Result<Response> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    if method != Method::POST {
        return Err(Error::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let result = create_page(&state, &body).await;

    let outcome = match &result {
        Ok(_) => "created",
        Err(e) => e.tag(),
    };
    counter!("urldrop_submissions_total", "outcome" => outcome).increment(1);

    let page_id = result?;
    Ok(Json(SubmitResponse::accepted(page_id)).into_response())
}

async fn create_page(state: &AppState, body: &[u8]) -> Result<String> {
    let credentials = state.config.notion.credentials()?;

    let body = parse_body(body)?;
    let submission = Submission::from_json(&body)?;
    debug!(
        url = %submission.url,
        has_notes = submission.notes.is_some(),
        categories = submission.categories.len(),
        "Validated submission"
    );

    let request = PageCreateRequest::build(&submission, credentials.database_id, &state.config.notion.properties);
    let page = state.notion.create_page(credentials.token, &request).await?;
    info!(page_id = %page.id, url = %submission.url, "Created Notion page");

    if let Some(notifier) = &state.notifier {
        notify(notifier, &submission).await;
    }

    Ok(page.id)
}

/// An empty body reads as `{}` so it fails on the missing url rather than as malformed JSON.
fn parse_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| Error::Other(anyhow::anyhow!("malformed JSON body: {e}")))
}

/// Send the chat notification. Any failure is logged and swallowed.
async fn notify(notifier: &TelegramNotifier, submission: &Submission) {
    let message = NotificationMessage::from(submission);
    match notifier.send(&message).await {
        Ok(()) => {
            counter!("urldrop_notifications_total", "outcome" => "sent").increment(1);
            debug!("Sent Telegram notification");
        }
        Err(e) => {
            counter!("urldrop_notifications_total", "outcome" => "failed").increment(1);
            warn!(error = %format!("{e:#}"), "Telegram notification failed");
        }
    }
}
