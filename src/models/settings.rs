use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Robot Battle";

/// Event-wide display settings mirrored to the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    pub title: String,
    pub overlay_mode: OverlayMode,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            overlay_mode: OverlayMode::Match,
        }
    }
}

/// What the stream overlay is showing.
///
/// - `Match`: the current pairing and timer
/// - `Bracket`: the full tournament tree
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    #[default]
    Match,
    Bracket,
}

impl OverlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Bracket => "bracket",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "match" => Some(Self::Match),
            "bracket" => Some(Self::Bracket),
            _ => None,
        }
    }
}

/// Input for renaming the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTitleInput {
    pub title: String,
}

/// Input for switching the overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetOverlayModeInput {
    pub mode: OverlayMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayModeResponse {
    pub mode: OverlayMode,
}
