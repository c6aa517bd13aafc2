//! Screens: each owns a load controller and turns its state into a text view.

pub mod detail;
pub mod home;

pub use detail::DetailScreen;
pub use home::HomeScreen;

use client_core::ClientError;
use shared::error::ErrorInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed { hint: String, detail: String },
}

impl ViewStatus {
    fn failed(error: &ErrorInfo) -> Self {
        let hint = error
            .hint
            .clone()
            .unwrap_or_else(|| format!("Request failed: {}", error.message));
        Self::Failed {
            hint,
            detail: error.message.clone(),
        }
    }
}

/// Normalizes a client failure and attaches a hint a user can act on.
///
/// `not_found` is the screen's own wording for a 404.
pub fn failure_info(error: &ClientError, not_found: &str) -> ErrorInfo {
    let hint = match error {
        _ if error.is_not_found() => not_found,
        ClientError::Status { status, .. } if *status >= 500 => {
            "The character service is having trouble; try again later."
        }
        ClientError::Status { .. } => "The character service rejected the request.",
        ClientError::Decode { .. } => "The server sent data this client does not understand.",
        ClientError::Transport { .. }
        | ClientError::Build(_)
        | ClientError::InvalidBaseUrl { .. } => {
            "Server unreachable; check the API URL or network and retry."
        }
    };
    ErrorInfo::from(error).with_hint(hint)
}

/// Fits `text` into `width` columns, marking truncation with `~`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return format!("{text:<width$}");
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

#[cfg(test)]
#[path = "tests/screens_tests.rs"]
mod tests;
