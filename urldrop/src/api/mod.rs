//! HTTP API: the submission endpoint and its wire models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response bodies shared with [`crate::client`], plus the validated
//!   [`models::submissions::Submission`] the handler works from

pub mod handlers;
pub mod models;
