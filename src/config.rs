//! Configuración central de la aplicación.
//! Combina la configuración de la API (`seat_http::ApiConfig`) con los
//! parámetros de sesión (`seat_http::config::session_from_env`). El archivo
//! `.env` se carga una sola vez.
use seat_core::SessionConfig;
use seat_http::ApiConfig;

use crate::errors::AppError;

/// Configuración global (API remota + sesión).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        seat_http::init_dotenv();
        let api = ApiConfig::from_env()?;
        let session = session_from_env()?;
        Ok(Self { api, session })
    }
}

/// Lee los parámetros de sesión; variables ausentes usan los defaults.
pub fn session_from_env() -> Result<SessionConfig, AppError> { Ok(seat_http::config::session_from_env()?) }

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.poll_interval, Duration::from_secs(2));
        assert_eq!(cfg.session.max_consecutive_poll_failures, 5);
        assert_eq!(cfg.api.base_url, seat_http::config::DEFAULT_API_URL);
    }
}
