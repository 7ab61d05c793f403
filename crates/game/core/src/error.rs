//! Common error infrastructure for game-core.
//!
//! [`ErrorSeverity`] is shared with the crates built on top of game-core so
//! every error in the workspace can be classified the same way.

use crate::state::{EntityId, Position};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input that should be rejected without retry.
    ///
    /// Examples: unknown evaluator name, malformed level text
    Validation,

    /// The operation cannot proceed with the current configuration or state.
    ///
    /// Examples: an empty evaluator set, a stale target
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("level has no cells")]
    EmptyLevel,

    #[error("level row {row} does not have the expected width {expected}")]
    RaggedRow { row: usize, expected: usize },

    #[error("unknown level glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("position {0} is outside the level")]
    OutOfBounds(Position),

    #[error("actor {0} already exists")]
    DuplicateActor(EntityId),

    #[error("actor {0} does not exist")]
    UnknownActor(EntityId),
}

impl WorldError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyLevel | Self::RaggedRow { .. } | Self::UnknownGlyph { .. } => {
                ErrorSeverity::Validation
            }
            Self::OutOfBounds(_) | Self::DuplicateActor(_) | Self::UnknownActor(_) => {
                ErrorSeverity::Fatal
            }
        }
    }
}
