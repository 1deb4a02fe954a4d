//! Error taxonomy for the rules engine.
//!
//! Every phase operation either returns a fully formed new phase or one of
//! these errors; the phase it was called on stays valid either way.

/// Errors raised by phase operations and character effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The caller is not the player allowed to act right now.
    #[error("player '{player}' is not allowed to {action} right now")]
    Unauthorized { player: String, action: &'static str },

    /// The update would break a game-state invariant.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// A character step carried malformed or out-of-range content.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The operation does not exist in the current phase.
    #[error("'{operation}' is not supported during the {phase} phase")]
    Unsupported {
        operation: &'static str,
        phase: &'static str,
    },

    /// An argument was out of range at an entry point.
    #[error("precondition violated: {0}")]
    Precondition(String),
}

impl GameError {
    pub(crate) fn unauthorized(player: impl Into<String>, action: &'static str) -> Self {
        GameError::Unauthorized { player: player.into(), action }
    }

    pub(crate) fn invalid_update(msg: impl Into<String>) -> Self {
        GameError::InvalidUpdate(msg.into())
    }

    pub(crate) fn invalid_parameter(msg: impl Into<String>) -> Self {
        GameError::InvalidParameter(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        GameError::Precondition(msg.into())
    }

    /// Returns true for errors caused by the caller's protocol rather than
    /// by the player's choice.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, GameError::Unsupported { .. } | GameError::Precondition(_))
    }
}

/// Errors raised while loading or validating game parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported player count {0} (expected 2 or 3)")]
    PlayerCount(usize),

    #[error("invalid parameter '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("malformed parameters: {0}")]
    Json(#[from] serde_json::Error),
}
