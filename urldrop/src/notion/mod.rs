//! Notion page creation.
//!
//! - [`payload`]: builds the `POST /v1/pages` body from a validated submission
//! - [`client`]: sends it with the configured integration token

pub mod client;
pub mod payload;

pub use client::{CreatedPage, NotionClient, NotionError};
pub use payload::PageCreateRequest;
