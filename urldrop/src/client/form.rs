//! The input form: raw text per field, a local URL check, and a disabled state while sending.

use url::Url;

use crate::api::models::submissions::{SubmitRequest, clean_categories};
use crate::client::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Url,
    Title,
    Notes,
    /// Comma-separated category names
    Categories,
}

#[derive(Debug, Clone, Default)]
pub struct UrlForm {
    url: String,
    title: String,
    notes: String,
    categories: String,
    error: Option<String>,
    disabled: bool,
    locale: Locale,
}

impl UrlForm {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Default::default()
        }
    }

    /// Replace the text of `field`. Ignored while disabled; otherwise clears any local error.
    ///
    /// Returns whether the edit was applied.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.disabled {
            return false;
        }
        let slot = match field {
            Field::Url => &mut self.url,
            Field::Title => &mut self.title,
            Field::Notes => &mut self.notes,
            Field::Categories => &mut self.categories,
        };
        *slot = value.into();
        self.error = None;
        true
    }

    /// Set while a submission is in flight. Values are kept either way.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Check the URL and, if it parses as an absolute URL, emit the request and clear the inputs.
    ///
    /// On a bad URL nothing is emitted, the inputs are left as typed and [`UrlForm::error`] holds a
    /// localized message.
    pub fn submit(&mut self) -> Option<SubmitRequest> {
        if self.disabled {
            return None;
        }

        let url = self.url.trim();
        if Url::parse(url).is_err() {
            self.error = Some(self.locale.invalid_url().to_string());
            return None;
        }

        let request = SubmitRequest {
            url: url.to_string(),
            title: non_blank(&self.title),
            notes: non_blank(&self.notes),
            categories: clean_categories(self.categories.split(',')),
        };

        self.url.clear();
        self.title.clear();
        self.notes.clear();
        self.categories.clear();
        self.error = None;

        Some(request)
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Url => &self.url,
            Field::Title => &self.title,
            Field::Notes => &self.notes,
            Field::Categories => &self.categories,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
