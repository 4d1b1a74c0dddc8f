//! Drives one submission at a time through the status machine.
//!
//! ```text
//!   Idle ──submit──▶ Loading ──ok: true──────────────▶ Success
//!                      │                                  │
//!                      └─ok: false / fault / garbage─▶ Error
//!   Success | Error ──submit──▶ Loading
//! ```
//!
//! There is no automatic return to `Idle`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error as ThisError;
use tracing::{debug, warn};

use crate::api::models::submissions::{SubmitRequest, SubmitResponse};
use crate::client::locale::Locale;
use crate::client::status::UiStatus;
use crate::client::transport::{Delivery, SubmitTransport};

/// A submit arrived while another one was still in flight. No request was sent.
#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
#[error("a submission is already in flight")]
pub struct Busy;

/// What a status view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub status: UiStatus,
    pub message: String,
    pub page_id: Option<String>,
    pub in_flight: bool,
}

pub struct Orchestrator<T> {
    transport: T,
    locale: Locale,
    state: Mutex<Snapshot>,
}

impl<T: SubmitTransport> Orchestrator<T> {
    pub fn new(transport: T, locale: Locale) -> Self {
        Self {
            transport,
            locale,
            state: Mutex::new(Snapshot::default()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and settle the status from the outcome.
    ///
    /// The in-flight flag is cleared however this future ends, including being dropped; a
    /// dropped submission settles as an unknown error.
    pub async fn submit(&self, request: SubmitRequest) -> Result<UiStatus, Busy> {
        {
            let mut state = self.lock();
            if state.in_flight {
                return Err(Busy);
            }
            *state = Snapshot {
                status: UiStatus::Loading,
                message: self.locale.sending().to_string(),
                page_id: None,
                in_flight: true,
            };
        }

        let _in_flight = scopeguard::guard((), |()| {
            let mut state = self.lock();
            state.in_flight = false;
            if state.status == UiStatus::Loading {
                state.status = UiStatus::Error;
                state.message = self.locale.unknown_error().to_string();
            }
        });

        let outcome = self.transport.send(&request).await;

        let mut state = self.lock();
        self.settle(&mut state, outcome);
        Ok(state.status)
    }

    fn settle(&self, state: &mut Snapshot, outcome: anyhow::Result<Delivery>) {
        match outcome {
            Ok(Delivery::Answered(SubmitResponse {
                ok: true, page_id, ..
            })) => {
                debug!(page_id = ?page_id, "Submission saved");
                state.status = UiStatus::Success;
                state.message = self.locale.sent().to_string();
                state.page_id = page_id;
            }
            Ok(Delivery::Answered(SubmitResponse { error, detail, .. })) => {
                state.status = UiStatus::Error;
                state.message = detail
                    .filter(|d| !d.is_empty())
                    .or(error.filter(|e| !e.is_empty()))
                    .unwrap_or_else(|| self.locale.unknown_error().to_string());
            }
            Ok(Delivery::Unrecognized) => {
                state.status = UiStatus::Error;
                state.message = self.locale.unknown_error().to_string();
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Submission request failed");
                state.status = UiStatus::Error;
                state.message = format!("{e:#}");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
