//! Error types for the lobby mirror.

use thiserror::Error;

use crate::schema::Violation;

/// Errors that can occur while constructing a lobby mirror.
///
/// Every variant is fatal to the construction attempt that produced it —
/// a [`LobbyMirror`](crate::LobbyMirror) is never partially built. Ingestion
/// never returns these: malformed updates degrade event generation instead
/// (see [`LobbyMirror::ingest_update`](crate::LobbyMirror::ingest_update)).
#[derive(Debug, Error)]
pub enum LobbyError {
    /// The supplied region code is not one of the recognized regions.
    #[error("invalid region: {0:?}")]
    InvalidRegion(String),

    /// The first-contact client payload failed schema validation.
    ///
    /// Carries the first violation; every violation is logged at `error`
    /// level before this is returned.
    #[error("invalid lobby payload at `{path}`: {message}")]
    InvalidPayload {
        /// Dotted path of the offending field.
        path: String,
        /// Human-readable constraint message.
        message: String,
    },

    /// The client payload does not contain a slot marked as self.
    #[error("no slot in the payload is marked as self")]
    NotSelfPresent,

    /// A previously exported snapshot failed validation on load.
    ///
    /// Unlike [`InvalidPayload`](LobbyError::InvalidPayload), this aggregates
    /// every violation found across slots, teams, chat and player records.
    #[error("invalid snapshot: {} violation(s)", violations.len())]
    InvalidSnapshot {
        /// All violations collected across the snapshot.
        violations: Vec<Violation>,
    },

    /// Neither a client payload nor an exported snapshot was supplied.
    #[error("either a client payload or an exported snapshot must be provided")]
    MissingInput,
}

/// A specialized [`Result`] type for lobby mirror operations.
pub type Result<T> = std::result::Result<T, LobbyError>;

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn invalid_payload_display_names_the_field() {
        let err = LobbyError::InvalidPayload {
            path: "players.0.handicap".into(),
            message: "must be between 50 and 100".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid lobby payload at `players.0.handicap`: must be between 50 and 100"
        );
    }

    #[test]
    fn invalid_snapshot_display_counts_violations() {
        let err = LobbyError::InvalidSnapshot {
            violations: vec![
                Violation {
                    path: "slots.0.handicap".into(),
                    message: "must be between 50 and 100".into(),
                },
                Violation {
                    path: "playerData.X".into(),
                    message: "player name too long".into(),
                },
            ],
        };
        assert_eq!(err.to_string(), "invalid snapshot: 2 violation(s)");
    }

    #[test]
    fn invalid_region_display_quotes_the_code() {
        assert_eq!(
            LobbyError::InvalidRegion("na".into()).to_string(),
            "invalid region: \"na\""
        );
    }
}
