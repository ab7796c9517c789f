//! Signaling controller error types.
//!
//! Client-triggered failures are fully recoverable at single-request
//! granularity: request/response operations surface them as structured
//! `{ success: false, error }` replies built from [`SignalingError::client_message`],
//! fire-and-forget messages drop them silently. Internal details are logged
//! server-side and never exposed to clients.

use thiserror::Error;

/// Signaling controller error type.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Room does not exist.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Supplied password does not match the room's password.
    #[error("Invalid password")]
    InvalidPassword,

    /// Username was empty or whitespace-only.
    #[error("Username is required")]
    UsernameRequired,

    /// Connection is already bound to a room; re-binding is not allowed.
    #[error("Connection already bound to a room")]
    AlreadyBound,

    /// Participant does not exist in the room.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// Admission failed after room creation/lookup succeeded.
    #[error("Admission failed for room {0}")]
    AdmissionFailed(String),

    /// Internal error (channel failures, shutdown races).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SignalingError {
    /// Returns a client-safe, human-readable error message.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            SignalingError::RoomNotFound(_) => "Room not found".to_string(),
            SignalingError::InvalidPassword => "Invalid password".to_string(),
            SignalingError::UsernameRequired => "Username is required".to_string(),
            SignalingError::AlreadyBound => "Already in a room".to_string(),
            SignalingError::ParticipantNotFound(_) => "Participant not found".to_string(),
            SignalingError::AdmissionFailed(_) => "Failed to join room".to_string(),
            SignalingError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_distinguish_join_failures() {
        assert_eq!(
            SignalingError::RoomNotFound("abc".to_string()).client_message(),
            "Room not found"
        );
        assert_eq!(
            SignalingError::InvalidPassword.client_message(),
            "Invalid password"
        );
        assert_ne!(
            SignalingError::RoomNotFound("abc".to_string()).client_message(),
            SignalingError::InvalidPassword.client_message()
        );
    }

    #[test]
    fn test_client_messages_hide_internal_details() {
        let err = SignalingError::Internal("mpsc channel closed at relay.rs".to_string());
        assert!(!err.client_message().contains("mpsc"));
        assert_eq!(err.client_message(), "An internal error occurred");

        let err = SignalingError::RoomNotFound("room-with-secret-name".to_string());
        assert!(!err.client_message().contains("secret"));
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!("{}", SignalingError::RoomNotFound("ab12".to_string())),
            "Room not found: ab12"
        );
        assert_eq!(
            format!("{}", SignalingError::InvalidPassword),
            "Invalid password"
        );
    }
}
