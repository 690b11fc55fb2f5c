//! Error types for registry operations and form validation.
//!
//! Every failure a registry call can produce is a [`RegistryError`]. The
//! stores never propagate these to their callers; they fold them into a
//! single human-readable message via [`RegistryError::describe`].

use thiserror::Error;

/// Fallback reason when neither the server nor the transport supplied one.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure of a single registry API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The request never reached the server, or no response came back.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The server answered with success but the body could not be decoded.
    #[error("invalid response body: {reason}")]
    Decode { reason: String },

    /// The response decoded but breaks an invariant the stores rely on.
    #[error("invalid response: {reason}")]
    Invalid { reason: String },
}

impl RegistryError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// The underlying reason, with blank reasons replaced by [`UNKNOWN_ERROR`].
    pub fn reason(&self) -> &str {
        let reason = match self {
            Self::Transport { reason }
            | Self::Status { reason, .. }
            | Self::Decode { reason }
            | Self::Invalid { reason } => reason.trim(),
        };
        if reason.is_empty() {
            UNKNOWN_ERROR
        } else {
            reason
        }
    }

    /// HTTP status, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message stored in a store's `error` field: `"Failed to <operation>: <reason>"`.
    pub fn describe(&self, operation: &str) -> String {
        format!("Failed to {}: {}", operation, self.reason())
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

/// Rejection of user input before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("a URL is required")]
    MissingUrl,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("max depth must be a non-negative integer, got '{0}'")]
    InvalidDepth(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_operation_and_reason() {
        let err = RegistryError::status(409, "Duplicate detected");
        assert_eq!(
            err.describe("add source"),
            "Failed to add source: Duplicate detected"
        );
        assert_eq!(err.status_code(), Some(409));
    }

    #[test]
    fn test_blank_reason_falls_back_to_unknown() {
        let err = RegistryError::transport("   ");
        assert_eq!(err.reason(), UNKNOWN_ERROR);
        assert_eq!(
            err.describe("fetch sources"),
            "Failed to fetch sources: Unknown error"
        );
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_form_error_messages() {
        assert_eq!(FormError::MissingUrl.to_string(), "a URL is required");
        assert_eq!(
            FormError::InvalidDepth("deep".into()).to_string(),
            "max depth must be a non-negative integer, got 'deep'"
        );
    }
}
