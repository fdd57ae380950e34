use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Client-side correlation id for one command submission. Diagnostic only,
/// never serialized onto the wire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeMode {
    On,
    Off,
}

impl SafeMode {
    pub fn is_on(self) -> bool {
        matches!(self, SafeMode::On)
    }
}

impl fmt::Display for SafeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafeMode::On => f.write_str("ON"),
            SafeMode::Off => f.write_str("OFF"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unrecognized safe mode text: {text:?}")]
pub struct ParseSafeModeError {
    pub text: String,
}

/// The executor reports safe mode as a plain-text sentence ending in
/// "ON" or "OFF" rather than as JSON.
impl FromStr for SafeMode {
    type Err = ParseSafeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.ends_with("ON") {
            Ok(SafeMode::On)
        } else if trimmed.ends_with("OFF") {
            Ok(SafeMode::Off)
        } else {
            Err(ParseSafeModeError {
                text: s.to_string(),
            })
        }
    }
}
