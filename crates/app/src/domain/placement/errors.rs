//! Placement errors.

use thiserror::Error;

use crate::domain::placement::models::PlacementState;

/// Why a placement or one of its queries failed.
///
/// Each variant carries a human message, a stable machine readable reason and
/// the state the placement ended in. Errors are built as `REJECTED` and moved
/// to `FAILED` once anything was committed.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("{message}")]
    Validation {
        message: String,
        reason: &'static str,
        state: PlacementState,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        reason: &'static str,
        state: PlacementState,
    },

    #[error("{message}")]
    Authorization {
        message: String,
        reason: &'static str,
        state: PlacementState,
    },

    #[error("{message}")]
    Conflict {
        message: String,
        reason: &'static str,
        state: PlacementState,
    },

    #[error("{message}")]
    ExternalService {
        message: String,
        reason: &'static str,
        state: PlacementState,
    },

    #[error("{message}")]
    Internal {
        message: String,
        reason: &'static str,
        state: PlacementState,
    },
}

impl PlacementError {
    pub(crate) fn validation(message: &str, reason: &'static str) -> Self {
        Self::Validation {
            message: message.to_string(),
            reason,
            state: PlacementState::Rejected,
        }
    }

    pub(crate) fn not_found(message: &str, reason: &'static str) -> Self {
        Self::NotFound {
            message: message.to_string(),
            reason,
            state: PlacementState::Rejected,
        }
    }

    pub(crate) fn authorization(message: &str, reason: &'static str) -> Self {
        Self::Authorization {
            message: message.to_string(),
            reason,
            state: PlacementState::Rejected,
        }
    }

    pub(crate) fn conflict(message: &str, reason: &'static str) -> Self {
        Self::Conflict {
            message: message.to_string(),
            reason,
            state: PlacementState::Rejected,
        }
    }

    pub(crate) fn external_service(message: &str, reason: &'static str) -> Self {
        Self::ExternalService {
            message: message.to_string(),
            reason,
            state: PlacementState::Rejected,
        }
    }

    pub(crate) fn internal(reason: &'static str) -> Self {
        Self::Internal {
            message: "Something went wrong!".to_string(),
            reason,
            state: PlacementState::Rejected,
        }
    }

    /// Stable machine readable reason.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation { reason, .. }
            | Self::NotFound { reason, .. }
            | Self::Authorization { reason, .. }
            | Self::Conflict { reason, .. }
            | Self::ExternalService { reason, .. }
            | Self::Internal { reason, .. } => reason,
        }
    }

    /// State the placement ended in.
    #[must_use]
    pub fn state(&self) -> PlacementState {
        match self {
            Self::Validation { state, .. }
            | Self::NotFound { state, .. }
            | Self::Authorization { state, .. }
            | Self::Conflict { state, .. }
            | Self::ExternalService { state, .. }
            | Self::Internal { state, .. } => *state,
        }
    }

    /// Overrides the final state, used once compensations have run.
    #[must_use]
    pub(crate) fn in_state(mut self, new_state: PlacementState) -> Self {
        match &mut self {
            Self::Validation { state, .. }
            | Self::NotFound { state, .. }
            | Self::Authorization { state, .. }
            | Self::Conflict { state, .. }
            | Self::ExternalService { state, .. }
            | Self::Internal { state, .. } => *state = new_state,
        }

        self
    }
}
