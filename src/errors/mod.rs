//! Errores de la aplicación (binarios y fachada).
use thiserror::Error;

use seat_core::PipelineError;
use seat_http::HttpError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    /// Código de salida para los binarios.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 1,
            AppError::Http(HttpError::Config(_)) => 1,
            AppError::Http(_) => 2,
            AppError::Pipeline(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_variant_format() {
        let err = AppError::Config("SEATFLOW_MAX_POLL_FAILURES must be >= 1".into());
        assert_eq!(err.to_string(), "Error de configuración: SEATFLOW_MAX_POLL_FAILURES must be >= 1");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn pipeline_errors_keep_their_message() {
        let err: AppError = PipelineError::Fetch("asset store down".into()).into();
        assert_eq!(err.to_string(), PipelineError::Fetch("asset store down".into()).to_string());
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_environment_exits_with_config_code() {
        let err: AppError = HttpError::Config("SEATFLOW_POLL_INTERVAL_MS must be > 0".into()).into();
        assert_eq!(err.exit_code(), 1);
    }
}
