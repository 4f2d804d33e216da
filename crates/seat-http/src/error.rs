//! Errores HTTP.
//! Mapea errores de reqwest / respuestas no exitosas a variantes semánticas, y
//! de ahí a `PipelineError` según la operación.

use reqwest::StatusCode;
use seat_core::{PipelineError, Stage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status { status: status.as_u16(), detail: err.to_string() }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self { Self::Decode(err.to_string()) }
}

impl HttpError {
    /// Transitorio: timeout, transporte o 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { status, .. } => StatusCode::from_u16(*status).is_ok_and(|s| s.is_server_error()),
            Self::Decode(_) | Self::Remote(_) | Self::Config(_) => false,
        }
    }

    pub fn into_launch(self, stage: Stage) -> PipelineError { PipelineError::LaunchRejected { stage, reason: self.to_string() } }

    pub fn into_poll(self) -> PipelineError { PipelineError::Poll(self.to_string()) }

    pub fn into_cancel(self) -> PipelineError { PipelineError::CancelRejected(self.to_string()) }

    pub fn into_fetch(self) -> PipelineError { PipelineError::Fetch(self.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        assert!(HttpError::Status { status: 503, detail: "Temporal not available".into() }.is_retryable());
        assert!(!HttpError::Status { status: 404, detail: "Workflow not found".into() }.is_retryable());
        assert!(HttpError::Timeout.is_retryable());
        assert!(!HttpError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn launch_errors_keep_the_stage() {
        let err = HttpError::Status { status: 500, detail: "boom".into() }.into_launch(Stage::Images);
        assert!(matches!(err, PipelineError::LaunchRejected { stage: Stage::Images, ref reason } if reason.contains("500")));
    }
}
