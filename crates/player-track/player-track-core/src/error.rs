//! Error types for player-track-core.
//!
//! Only the parsing and configuration helpers are fallible. The per-frame path
//! never surfaces these: a payload that fails to resolve is dropped by the
//! dispatcher.

/// Errors raised while resolving payloads, identifiers, or configuration.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PlayerTrackError {
    /// Event kind is not one this crate handles.
    #[error("Unsupported event kind: {kind}")]
    UnsupportedEvent { kind: String },

    /// Payload is missing fields or has the wrong shape.
    #[error("Invalid event payload: {reason}")]
    InvalidPayload { reason: String },

    /// Player object name did not match any known object.
    #[error("Unknown player object: {name}")]
    UnknownPlayerObject { name: String },

    /// Track name is not registered in the store.
    #[error("Track not found: {name}")]
    TrackNotFound { name: String },

    /// Configuration failed validation.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Player-track result type
pub type Result<T> = core::result::Result<T, PlayerTrackError>;
