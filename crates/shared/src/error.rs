use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure taxonomy exposed to views.
///
/// Transport failures, non-2xx responses and payload mismatches all collapse
/// into the same kind; callers are not expected to branch on subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkOrDecodeFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkOrDecodeFailure => f.write_str("network or decode failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    /// User-facing explanation chosen by whoever knew the concrete failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
        }
    }

    pub fn network_or_decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkOrDecodeFailure, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let info = ErrorInfo::network_or_decode("connection refused");
        assert_eq!(
            info.to_string(),
            "network or decode failure: connection refused"
        );
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let info = ErrorInfo::network_or_decode("boom");
        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["kind"], "network_or_decode_failure");
        assert_eq!(json["message"], "boom");
        assert!(json.get("hint").is_none());
    }

    #[test]
    fn hint_does_not_change_display() {
        let info = ErrorInfo::network_or_decode("HTTP 404").with_hint("Character not found.");
        assert_eq!(info.hint.as_deref(), Some("Character not found."));
        assert_eq!(info.to_string(), "network or decode failure: HTTP 404");
    }
}
