//! Error types for the DDNS client
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS client
#[derive(Error, Debug)]
pub enum Error {
    /// A request did not complete within the client timeout
    #[error("Request to {service} timed out: {detail}")]
    Timeout {
        /// Which endpoint was being called
        service: String,
        /// Error detail from the HTTP client
        detail: String,
    },

    /// Connection, DNS or transport failure
    #[error("Network error ({service}): {detail}")]
    Network {
        /// Which endpoint was being called
        service: String,
        /// Error detail from the HTTP client
        detail: String,
    },

    /// A lookup endpoint answered with a non-success status
    #[error("HTTP error ({service}): status {status}")]
    HttpStatus {
        /// Which endpoint was being called
        service: String,
        /// HTTP status code
        status: u16,
    },

    /// A lookup endpoint answered with something that is not usable
    #[error("Invalid response from {service}: {detail}")]
    InvalidResponse {
        /// Which endpoint was being called
        service: String,
        /// What was wrong with the body
        detail: String,
    },

    /// The record listing could not be decoded
    #[error("Failed to decode domain records: {0}")]
    Json(#[from] serde_json::Error),

    /// The named record exists but is not an A record
    #[error("record {record} type is {record_type}, type must be A")]
    RecordTypeMismatch {
        /// Record label
        record: String,
        /// Type reported by the provider
        record_type: String,
    },

    /// No record with the given label exists on the domain
    #[error("record {record} not found on domain {domain}, you need to create it manually")]
    RecordNotFound {
        /// Record label
        record: String,
        /// Domain that was listed
        domain: String,
    },

    /// The provider reply did not contain the success marker.
    ///
    /// Displays as the raw reply body, unmodified.
    #[error("{0}")]
    UpdateRejected(String),

    /// Provider reported a failure status
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Start/stop called in the wrong state
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),
}

impl Error {
    /// Create a timeout error
    pub fn timeout(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Timeout {
            service: service.into(),
            detail: detail.into(),
        }
    }

    /// Create a network error
    pub fn network(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Network {
            service: service.into(),
            detail: detail.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(service: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            service: service.into(),
            status,
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.into(),
            detail: detail.into(),
        }
    }

    /// Create a "not found" error for a record label on a domain
    pub fn record_not_found(record: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::RecordNotFound {
            record: record.into(),
            domain: domain.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(record: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self::RecordTypeMismatch {
            record: record.into(),
            record_type: record_type.into(),
        }
    }

    /// Create an update-rejected error from the raw reply body
    pub fn update_rejected(body: impl Into<String>) -> Self {
        Self::UpdateRejected(body.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a lifecycle error
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }
}
