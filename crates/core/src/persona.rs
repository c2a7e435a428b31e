//! Persona and visitor profile types.

use serde::{Deserialize, Serialize};

/// Prebuilt voices offered by the duplex speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    Aoede,
    Charon,
    Fenrir,
    Kore,
    Leda,
    Orus,
    Puck,
    Zephyr,
}

impl Voice {
    pub const ALL: [Voice; 8] = [
        Voice::Aoede,
        Voice::Charon,
        Voice::Fenrir,
        Voice::Kore,
        Voice::Leda,
        Voice::Orus,
        Voice::Puck,
        Voice::Zephyr,
    ];

    /// Name as the speech service expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Aoede => "Aoede",
            Voice::Charon => "Charon",
            Voice::Fenrir => "Fenrir",
            Voice::Kore => "Kore",
            Voice::Leda => "Leda",
            Voice::Orus => "Orus",
            Voice::Puck => "Puck",
            Voice::Zephyr => "Zephyr",
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Voice {
    type Err = String;

    /// Case-insensitive voice name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown voice '{s}'"))
    }
}

/// An assistant persona: display name, personality text, and voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    pub id: String,
    pub name: String,
    pub personality: String,
    pub voice: Voice,
    /// CSS-style color used by the rendering surface.
    pub color: String,
}

/// The visitor talking to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl UserProfile {
    /// The generic evaluator profile used until the visitor says otherwise.
    pub fn evaluator() -> Self {
        Self {
            name: Some("Visitor".into()),
            info: Some("A professional evaluating the engineering portfolio.".into()),
        }
    }

    /// A profile with no name or info.
    pub fn anonymous() -> Self {
        Self {
            name: None,
            info: None,
        }
    }

    /// The name, if present and not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::evaluator()
    }
}
