//! Status of the current submission and how it is presented.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Spinner,
    CheckCircle,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Info,
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub icon: Option<Icon>,
    pub tone: Tone,
}

impl UiStatus {
    /// Idle has no icon and is not normally rendered at all.
    pub fn presentation(self) -> Presentation {
        let (icon, tone) = match self {
            UiStatus::Idle => (None, Tone::Muted),
            UiStatus::Loading => (Some(Icon::Spinner), Tone::Info),
            UiStatus::Success => (Some(Icon::CheckCircle), Tone::Positive),
            UiStatus::Error => (Some(Icon::Warning), Tone::Negative),
        };
        Presentation { icon, tone }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UiStatus::Success | UiStatus::Error)
    }
}

impl Icon {
    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Spinner => "⏳",
            Icon::CheckCircle => "✅",
            Icon::Warning => "⚠️",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_status_has_a_distinct_presentation() {
        let all = [UiStatus::Idle, UiStatus::Loading, UiStatus::Success, UiStatus::Error];
        let presentations: Vec<_> = all.iter().map(|s| s.presentation()).collect();

        for (i, a) in presentations.iter().enumerate() {
            for b in &presentations[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(UiStatus::Idle.presentation().icon, None);
        assert_eq!(UiStatus::Error.presentation().icon, Some(Icon::Warning));
    }
}
