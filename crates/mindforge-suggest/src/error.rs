use serde::Serialize;
use std::fmt;

/// Diagnostic class of a failed remote call. Every class routes to the same
/// fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureClass {
    InsufficientCredits,
    RateLimited,
    MalformedResponse,
    TransportError,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureClass::InsufficientCredits => "insufficient-credits",
            FailureClass::RateLimited => "rate-limited",
            FailureClass::MalformedResponse => "malformed-response",
            FailureClass::TransportError => "transport-error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("insufficient credits: {0}")]
    InsufficientCredits(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn class(&self) -> FailureClass {
        match self {
            RemoteError::InsufficientCredits(_) => FailureClass::InsufficientCredits,
            RemoteError::RateLimited(_) => FailureClass::RateLimited,
            RemoteError::MalformedResponse(_) => FailureClass::MalformedResponse,
            RemoteError::Transport(_) => FailureClass::TransportError,
        }
    }

    /// Map a non-2xx HTTP status to a failure.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = format!("HTTP {status}: {}", truncate(body, 200));
        match status {
            402 => RemoteError::InsufficientCredits(detail),
            429 => RemoteError::RateLimited(detail),
            _ => RemoteError::Transport(detail),
        }
    }

    /// Classify a provider error that only carries a message.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("402") || lower.contains("insufficient") || lower.contains("credits") {
            RemoteError::InsufficientCredits(message.to_string())
        } else if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests") {
            RemoteError::RateLimited(message.to_string())
        } else {
            RemoteError::Transport(message.to_string())
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
