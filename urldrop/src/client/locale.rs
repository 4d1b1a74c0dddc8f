use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Language of the messages the client shows. Server-provided text is shown as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

impl Locale {
    pub fn sending(self) -> &'static str {
        match self {
            Locale::En => "Sending the URL to Notion...",
            Locale::Ko => "Notion으로 URL을 전송하는 중...",
        }
    }

    pub fn sent(self) -> &'static str {
        match self {
            Locale::En => "The URL was saved to Notion!",
            Locale::Ko => "URL이 Notion에 성공적으로 전송되었습니다!",
        }
    }

    pub fn unknown_error(self) -> &'static str {
        match self {
            Locale::En => "An unknown error occurred.",
            Locale::Ko => "알 수 없는 오류가 발생했습니다.",
        }
    }

    pub fn invalid_url(self) -> &'static str {
        match self {
            Locale::En => "Please enter a valid URL (e.g. https://example.com).",
            Locale::Ko => "유효한 URL을 입력해주세요. (예: https://example.com)",
        }
    }
}
