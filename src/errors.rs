//! Unified error types for `Wayfarer`.
//!
//! Combat-engine failures are typed so that callers can branch on them
//! programmatically instead of matching message strings. [`Error::kind`]
//! classifies every variant into the three-bucket taxonomy the bot layer
//! uses to pick a response: user-correctable, session-fatal, or internal.

use thiserror::Error;

/// How a failure should be treated by the layer that talks to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user can fix this themselves (wrong name, nothing equipped,
    /// acting out of turn). No state was changed.
    UserCorrectable,
    /// The session is unrecoverable and has been cleared, but the process
    /// keeps running.
    SessionFatal,
    /// Unexpected - adapter failures, broken invariants. Logged and surfaced
    /// as a generic error response.
    Internal,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No adventure with this name exists in the catalog.
    #[error("Adventure '{name}' does not exist")]
    AdventureNotFound {
        /// The name the user asked for.
        name: String,
    },

    /// No enemy with this name exists in the catalog.
    #[error("Enemy '{name}' does not exist")]
    EnemyNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// The user tried to start an adventure without any attack item equipped.
    #[error("No attack items equipped")]
    NoWeaponEquipped,

    /// The user does not meet an adventure's entry requirements.
    #[error("Requirements not met: {reason}")]
    RequirementsNotMet {
        /// Human-readable description of the failed requirement.
        reason: String,
    },

    /// The action is not valid for the user's current session state.
    #[error("'{action}' is not a valid move right now")]
    InvalidTurn {
        /// The action that was attempted.
        action: &'static str,
    },

    /// A persisted state references an adventure that no longer exists in the
    /// catalog. The stale state has been cleared by the time this is returned.
    #[error("The adventure '{name}' no longer exists; your session was cleared")]
    AdventureVanished {
        /// The dangling adventure key.
        name: String,
    },

    /// A compare-and-swap write lost the race against another command from
    /// the same user. Callers retry by re-reading current state.
    #[error("State was modified concurrently, please retry")]
    ConcurrentModification,

    /// Configuration error (missing or malformed settings).
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong.
        message: String,
    },

    /// Broken internal invariant. Should not be reachable by user input.
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },

    /// Database error from the SeaORM backend.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// State (de)serialization error for JSON document columns.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error.
    #[error("Discord framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Classifies this error for presentation purposes.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AdventureNotFound { .. }
            | Self::EnemyNotFound { .. }
            | Self::NoWeaponEquipped
            | Self::RequirementsNotMet { .. }
            | Self::InvalidTurn { .. }
            | Self::ConcurrentModification => ErrorKind::UserCorrectable,
            Self::AdventureVanished { .. } => ErrorKind::SessionFatal,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_is_programmatic() {
        assert_eq!(
            Error::NoWeaponEquipped.kind(),
            ErrorKind::UserCorrectable
        );
        assert_eq!(
            Error::AdventureVanished {
                name: "gone".to_string()
            }
            .kind(),
            ErrorKind::SessionFatal
        );
        assert_eq!(
            Error::Internal {
                message: "missing member".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            Error::ConcurrentModification.kind(),
            ErrorKind::UserCorrectable
        );
    }
}
