//! Submission bodies: the wire contract of `/api/submit` and the validated form the handler uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::errors::{Error, Result};

/// Notion rejects rich-text content longer than this many UTF-16 code units.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Body accepted by `POST /api/submit`.
///
/// The server validates the raw JSON itself (see [`Submission::from_json`]) so that type errors
/// can name the offending field; this struct is what well-behaved clients send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, rename = "category", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// Envelope returned by `POST /api/submit`, for success and failure alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub ok: bool,
    /// Identifier of the created Notion page (success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    /// Error tag such as `invalid_url` or `notion_error` (failure only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SubmitResponse {
    pub fn accepted(page_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            page_id: Some(page_id.into()),
            error: None,
            detail: None,
        }
    }

    pub fn rejected(tag: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            ok: false,
            page_id: None,
            error: Some(tag.into()),
            detail,
        }
    }
}

/// A submission that passed validation.
///
/// Text is already trimmed and clipped to [`MAX_TEXT_CHARS`]; optional parts are `None`/empty
/// exactly when nothing non-blank was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The submitted URL, trimmed. Guaranteed to parse as an absolute URL.
    pub url: String,
    /// Trimmed title, or the URL when no title was given
    pub title: String,
    pub notes: Option<String>,
    pub categories: Vec<String>,
}

impl Submission {
    /// Validate a decoded request body.
    ///
    /// `null` is treated like an absent field. Nothing is partially accepted: the first violation
    /// is returned.
    pub fn from_json(body: &Value) -> Result<Self> {
        let url = match body.get("url") {
            None | Some(Value::Null) => return Err(Error::UrlRequired),
            Some(Value::String(url)) if url.is_empty() => return Err(Error::UrlRequired),
            Some(Value::String(url)) => url.trim(),
            Some(_) => {
                return Err(Error::InvalidField {
                    field: "url",
                    expected: "a string",
                });
            }
        };
        Url::parse(url).map_err(|reason| Error::InvalidUrl { reason })?;

        let title = optional_str(body, "title")?
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(url);

        let notes = optional_str(body, "notes")?
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(|notes| clip(notes).to_string());

        let categories = match body.get("category") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let names = items
                    .iter()
                    .map(|item| {
                        item.as_str().ok_or(Error::InvalidField {
                            field: "category",
                            expected: "an array of strings",
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                clean_categories(names)
            }
            Some(_) => {
                return Err(Error::InvalidField {
                    field: "category",
                    expected: "an array of strings",
                });
            }
        };

        Ok(Self {
            url: url.to_string(),
            title: clip(title).to_string(),
            notes,
            categories,
        })
    }
}

fn optional_str<'a>(body: &'a Value, field: &'static str) -> Result<Option<&'a str>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(Error::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

/// Trim every name and drop the blank ones. Order and duplicates are kept.
pub fn clean_categories<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cut `text` down to at most [`MAX_TEXT_CHARS`] UTF-16 code units, on a char boundary.
///
/// Notion measures rich-text length in UTF-16 units, so a character outside the BMP counts twice
/// and is dropped whole when only one unit is left.
pub fn clip(text: &str) -> &str {
    let mut units = 0;
    for (index, c) in text.char_indices() {
        units += c.len_utf16();
        if units > MAX_TEXT_CHARS {
            return &text[..index];
        }
    }
    text
}
