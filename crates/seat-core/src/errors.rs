//! Errores del orquestador.
//!
//! `PipelineError` es lo que devuelven los puertos y las operaciones de la
//! sesión. `SessionError` es lo que la vista expone: un kind estable, el stage
//! involucrado (si aplica) y un mensaje legible.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::InvariantViolation;
use crate::stage::Stage;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum PipelineError {
    #[error("asset snapshot unavailable: {0}")] Fetch(String),
    #[error("launch of {stage} rejected: {reason}")] LaunchRejected { stage: Stage, reason: String },
    #[error("progress query failed: {0}")] Poll(String),
    #[error("cancel rejected: {0}")] CancelRejected(String),
    #[error("asset snapshot violates stage ordering: {0}")] InvariantViolation(InvariantViolation),
    #[error("internal: {0}")] Internal(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::LaunchRejected { .. } => ErrorKind::LaunchRejected,
            Self::Poll(_) => ErrorKind::Poll,
            Self::CancelRejected(_) => ErrorKind::CancelRejected,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stage al que el error queda atribuido, cuando lo hay.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::LaunchRejected { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Clasificación estable de errores visibles para el usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Fetch,
    LaunchRejected,
    Poll,
    CancelRejected,
    InvariantViolation,
    RunFailed,
    RunCancelled,
    Internal,
}

/// Error expuesto en `SessionView`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub stage: Option<Stage>,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: ErrorKind, stage: Option<Stage>, message: impl Into<String>) -> Self {
        Self { kind, stage, message: message.into() }
    }
}

impl From<&PipelineError> for SessionError {
    fn from(err: &PipelineError) -> Self { Self::new(err.kind(), err.stage(), err.to_string()) }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "[{:?}] {}: {}", self.kind, stage, self.message),
            None => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_rejected_carries_its_stage() {
        let err = PipelineError::LaunchRejected { stage: Stage::Depths, reason: "HTTP 500".into() };
        let view: SessionError = (&err).into();
        assert_eq!(view.kind, ErrorKind::LaunchRejected);
        assert_eq!(view.stage, Some(Stage::Depths));
        assert!(view.message.contains("HTTP 500"));
    }

    #[test]
    fn fetch_error_has_no_stage() {
        let err = PipelineError::Fetch("timeout".into());
        assert_eq!(err.stage(), None);
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }
}
