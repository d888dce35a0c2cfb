//! Error Types
//!
//! Transport failures are retried by the poller; a cycle that exhausts its
//! attempts surfaces as [`PollError`], which is logged and never stops the
//! process. Configuration problems are reported through
//! [`crate::config::ConfigError`] at construction time instead.

use thiserror::Error;

/// Failure talking to the status source
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be sent or the connection failed
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Source answered with a non-success status
    #[error("status source returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Response body was not the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Source is not reachable for a non-HTTP reason (used by test doubles)
    #[error("status source unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a whole poll cycle
#[derive(Debug, Error)]
pub enum PollError {
    /// Every attempt of the cycle failed
    #[error("status poll failed after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        last: TransportError,
    },

    /// Shutdown was requested while the cycle was still retrying
    #[error("status poll cancelled by shutdown")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_includes_cause() {
        let err = PollError::Exhausted {
            attempts: 3,
            last: TransportError::Unavailable("connection refused".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("3 attempts"));
        assert!(text.contains("connection refused"));
    }
}
