//! The fixed set of AI model identifiers the processing endpoint accepts.
//!
//! The endpoint forwards the identifier verbatim to its extraction backend,
//! so the client only ever sends one of the values in [`ModelId::ALL`].

use crate::error::UploadError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// An allowed model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ModelId {
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    /// Recommended default.
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
    #[serde(rename = "gemini-3-pro")]
    Gemini3Pro,
}

impl ModelId {
    /// Every allowed identifier, in display order.
    pub const ALL: [ModelId; 5] = [
        ModelId::Gemini20Flash,
        ModelId::Gemini25FlashLite,
        ModelId::Gemini25Flash,
        ModelId::Gemini25Pro,
        ModelId::Gemini3Pro,
    ];

    /// The model selected when a session starts.
    pub const DEFAULT: ModelId = ModelId::Gemini25Flash;

    /// Wire value sent in the `model` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Gemini20Flash => "gemini-2.0-flash",
            ModelId::Gemini25FlashLite => "gemini-2.5-flash-lite",
            ModelId::Gemini25Flash => "gemini-2.5-flash",
            ModelId::Gemini25Pro => "gemini-2.5-pro",
            ModelId::Gemini3Pro => "gemini-3-pro",
        }
    }

    pub fn is_recommended(self) -> bool {
        self == Self::DEFAULT
    }

    /// Comma-separated list of allowed identifiers, for error messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UploadError::UnknownModel {
                model: s.to_string(),
                allowed: Self::allowed_list(),
            })
    }
}
