//! Error types for audience dispatch.
//!
//! Only [`AudienceError::InvalidArgument`] and [`AudienceError::InvalidTarget`]
//! ever reach a caller of the public API. Every other variant is produced and
//! consumed inside the dispatch layers, where it is logged and dropped.

use thiserror::Error;
use uuid::Uuid;

use crate::host::RecipientKind;

/// Failures reported by a host collaborator (directory, permission lookup,
/// feature probe, or a primitive output call).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host could not answer the query.
    #[error("Host query failed: {0}")]
    Unavailable(String),

    /// The host refused a primitive it does not implement.
    #[error("Host rejected primitive `{primitive}`")]
    Rejected { primitive: &'static str },

    /// The recipient left between lookup and delivery.
    #[error("Recipient {0} is no longer connected")]
    Disconnected(Uuid),
}

/// Errors raised by handlers, audiences and the platform entry points.
#[derive(Debug, Error)]
pub enum AudienceError {
    /// A handler passed `is_available` but the recipient cannot take the call.
    #[error("Handler `{handler}` cannot serve a {kind} recipient")]
    UnsupportedOperation {
        handler: &'static str,
        kind: RecipientKind,
    },

    /// A host query failed while resolving or delivering.
    #[error(transparent)]
    HostLookup(#[from] HostError),

    /// A required argument was missing or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A target selector string could not be parsed.
    #[error("Invalid target selector: {0}")]
    InvalidTarget(String),
}

/// Errors from loading a [`PlatformConfig`](crate::config::PlatformConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
