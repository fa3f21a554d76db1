//! Error types for the Hetzner Cloud API client.

use thiserror::Error;

/// Errors raised by the Hetzner Cloud API client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HetznerApiError {
    /// Raised when the HTTP request cannot be sent or its body read.
    #[error("transport error: {message}")]
    Transport {
        /// Message describing the transport failure.
        message: String,
    },
    /// Raised when a successful response body cannot be decoded.
    #[error("failed to decode API response: {message}")]
    Decode {
        /// Message from the JSON decoder.
        message: String,
    },
    /// Raised when the API rejects a request with a structured error.
    #[error("API error {code}: {message}")]
    Api {
        /// Machine-readable error code reported by the API.
        code: String,
        /// Human-readable message reported by the API.
        message: String,
    },
    /// Wrapper for unstructured provider failures.
    #[error("provider error: {message}")]
    Provider {
        /// Raw response body or failure description.
        message: String,
    },
}
