//! HTTP request handlers.
//!
//! - [`submit`]: `/api/submit`, forwards a URL to Notion and mirrors it to Telegram

pub mod submit;
