use serde::{Deserialize, Serialize};

use crate::error::AssistantError;

/// Normalized, immutable snapshot of current conditions for one location.
/// Only ever constructed from a successful weather API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: String,
    /// Two-letter country code as reported by the API.
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub description: String,
    pub wind_speed_mps: f64,
}

impl WeatherRecord {
    /// Compact text form handed between tools.
    pub fn to_payload(&self) -> String {
        // A plain struct with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_payload(payload: &str) -> Result<Self, AssistantError> {
        serde_json::from_str(payload)
            .map_err(|e| AssistantError::DataFormat(format!("weather payload: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

/// One entry in the append-only conversation history.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Assistant, text: text.into() }
    }
}
